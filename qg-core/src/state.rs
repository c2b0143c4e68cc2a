//! Proof states as reported by a proof environment.

use serde::{Deserialize, Serialize};

/// Goal description an environment reports once every obligation is discharged.
pub const PROOF_FINISHED_DESCRIPTION: &str = "Proof finished";

/// Formal language a tactic is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Lean,
    Lean4,
    Coq,
    Isabelle,
}

/// One open obligation: hypotheses in scope plus the target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Goal {
    #[serde(default)]
    pub hypotheses: Vec<String>,
    pub goal: String,
}

impl Goal {
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            hypotheses: Vec::new(),
            goal: goal.into(),
        }
    }

    pub fn with_hypotheses<I, S>(goal: impl Into<String>, hyps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hypotheses: hyps.into_iter().map(Into::into).collect(),
            goal: goal.into(),
        }
    }
}

/// A proof obligation snapshot.
///
/// States are compared and hashed by value: two states reached along different
/// paths with the same goals are the same node in the search graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProofState {
    pub language: Language,
    #[serde(default)]
    pub goals: Vec<Goal>,
    /// Free-form status line from the environment (e.g. [`PROOF_FINISHED_DESCRIPTION`]).
    #[serde(default)]
    pub goal_description: Option<String>,
}

impl ProofState {
    pub fn new(language: Language, goals: Vec<Goal>) -> Self {
        Self {
            language,
            goals,
            goal_description: None,
        }
    }

    /// The state an environment reports after the last goal is closed.
    pub fn finished(language: Language) -> Self {
        Self {
            language,
            goals: Vec::new(),
            goal_description: Some(PROOF_FINISHED_DESCRIPTION.to_string()),
        }
    }

    pub fn is_proof_finished(&self) -> bool {
        self.goal_description.as_deref() == Some(PROOF_FINISHED_DESCRIPTION)
    }
}
