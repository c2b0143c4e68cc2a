//! Actions a policy can request from a proof environment.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::state::Language;

/// Chat message that produced an action (kept for prompting/audit, not identity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    /// Run one or more tactic strings against the current goal.
    RunTactic {
        language: Language,
        tactics: Vec<String>,
    },
    /// Undo the last applied tactic.
    Backtrack,
    /// Abandon the episode.
    Exit,
}

/// An operation against the proof state.
///
/// Equality and hashing only look at [`ActionKind`]; `original_message` is metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofAction {
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_message: Option<ChatMessage>,
}

impl ProofAction {
    pub fn run_tactic<I, S>(language: Language, tactics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: ActionKind::RunTactic {
                language,
                tactics: tactics.into_iter().map(Into::into).collect(),
            },
            original_message: None,
        }
    }

    pub fn backtrack() -> Self {
        Self {
            kind: ActionKind::Backtrack,
            original_message: None,
        }
    }

    pub fn exit() -> Self {
        Self {
            kind: ActionKind::Exit,
            original_message: None,
        }
    }

    pub fn with_message(mut self, msg: ChatMessage) -> Self {
        self.original_message = Some(msg);
        self
    }

    pub fn is_exit(&self) -> bool {
        matches!(self.kind, ActionKind::Exit)
    }

    pub fn is_backtrack(&self) -> bool {
        matches!(self.kind, ActionKind::Backtrack)
    }

    /// Tactic payload for `RunTactic`, `None` otherwise.
    pub fn tactics(&self) -> Option<&[String]> {
        match &self.kind {
            ActionKind::RunTactic { tactics, .. } => Some(tactics),
            _ => None,
        }
    }

    /// Short lowercase name of the action kind, for logs.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ActionKind::RunTactic { .. } => "run_tactic",
            ActionKind::Backtrack => "backtrack",
            ActionKind::Exit => "exit",
        }
    }
}

impl PartialEq for ProofAction {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for ProofAction {}

impl Hash for ProofAction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
    }
}
