//! Contract of the proof environment the agent drives.
//!
//! The environment owns transition semantics, success/failure detection, rendering and
//! proof dumping. The agent only calls the methods below.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::action::ProofAction;
use crate::state::ProofState;

/// String-keyed statistics passed to the stop predicate and to `dump_proof`.
pub type ProofStats = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("environment backend: {0}")]
    Backend(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Progress classification of the last step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressState {
    Starting,
    StateChanged,
    StateUnchanged,
    Failed,
    Running,
    Done,
}

/// Environment feedback attached to every step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofEnvInfo {
    pub progress: ProgressState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ProofEnvInfo {
    pub fn new(progress: ProgressState) -> Self {
        Self {
            progress,
            error_message: None,
        }
    }

    pub fn failed(msg: impl Into<String>) -> Self {
        Self {
            progress: ProgressState::Failed,
            error_message: Some(msg.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.progress == ProgressState::Failed
    }
}

/// Outcome of one environment step.
///
/// `action` is the action the environment actually applied. It may differ from the
/// requested one and is authoritative for learning and logging.
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: ProofState,
    pub action: ProofAction,
    pub next_state: ProofState,
    pub reward: f64,
    pub done: bool,
    pub info: ProofEnvInfo,
}

pub trait ProofEnv {
    /// Restart from the theorem's initial state.
    fn reset(&mut self) -> Result<(), EnvError>;

    /// Apply `action`. Tactic failures are reported through `info.progress`, not `Err`.
    fn step(&mut self, action: &ProofAction) -> Result<Transition, EnvError>;

    fn render(&self);

    /// Persist the proof found so far (if any) together with run statistics.
    fn dump_proof(&mut self, path: Option<&str>, stats: &ProofStats) -> Result<(), EnvError>;

    /// Current state.
    fn state(&self) -> &ProofState;
}
