use qg_core::{ProofAction, ProofState, ProofStats, Transition};
use qg_tree::TreeError;
use thiserror::Error;

use crate::strategy::PromptError;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("policy is not open")]
    NotOpen,
    #[error("policy is already open")]
    AlreadyOpen,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    #[error("search graph: {0}")]
    Tree(#[from] TreeError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Prompt(#[from] PromptError),
}

/// What the episode runner needs from a policy.
pub trait Policy {
    fn next_action(&mut self, state: &ProofState) -> Result<ProofAction, PolicyError>;

    fn update(&mut self, transition: &Transition) -> Result<(), PolicyError>;

    fn checkpoint(&mut self) -> Result<(), PolicyError>;

    /// Counters reported to stop predicates and proof dumps.
    fn efficiency_info(&self) -> ProofStats;
}
