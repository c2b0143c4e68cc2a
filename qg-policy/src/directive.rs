//! Moves a search strategy can ask the policy to make.

use qg_core::{ProofAction, ProofState};
use serde::{Deserialize, Serialize};

/// Context handed to the model prompter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSummary {
    /// Actions already tried from `state` that the model should not propose again.
    pub actions_to_avoid: Vec<ProofAction>,
    pub state: ProofState,
}

impl PromptSummary {
    pub fn new(state: ProofState) -> Self {
        Self {
            actions_to_avoid: Vec::new(),
            state,
        }
    }

    pub fn avoiding(state: ProofState, actions_to_avoid: Vec<ProofAction>) -> Self {
        Self {
            actions_to_avoid,
            state,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "directive", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchDirective {
    /// Ask the model for the next action.
    NextActionPrompt(PromptSummary),
    /// The last action failed; ask the model with a summary of the failure.
    FailedActionPrompt(PromptSummary),
    /// The state is harder than the one it came from.
    HarderStatePrompt(PromptSummary),
    /// The state was seen before on the current path.
    CyclicStatePrompt(PromptSummary),
    Backtrack,
    Stop,
}

impl SearchDirective {
    /// True for the directives that are forwarded to the model prompter.
    pub fn is_prompt(&self) -> bool {
        self.prompt_summary().is_some()
    }

    pub fn prompt_summary(&self) -> Option<&PromptSummary> {
        match self {
            SearchDirective::NextActionPrompt(s)
            | SearchDirective::FailedActionPrompt(s)
            | SearchDirective::HarderStatePrompt(s)
            | SearchDirective::CyclicStatePrompt(s) => Some(s),
            SearchDirective::Backtrack | SearchDirective::Stop => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SearchDirective::NextActionPrompt(_) => "next_action_prompt",
            SearchDirective::FailedActionPrompt(_) => "failed_action_prompt",
            SearchDirective::HarderStatePrompt(_) => "harder_state_prompt",
            SearchDirective::CyclicStatePrompt(_) => "cyclic_state_prompt",
            SearchDirective::Backtrack => "backtrack",
            SearchDirective::Stop => "stop",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qg_core::{Goal, Language};

    #[test]
    fn only_prompt_directives_carry_a_summary() {
        let s = PromptSummary::new(ProofState::new(Language::Lean, vec![Goal::new("True")]));
        assert!(SearchDirective::NextActionPrompt(s.clone()).is_prompt());
        assert!(SearchDirective::FailedActionPrompt(s.clone()).is_prompt());
        assert!(SearchDirective::HarderStatePrompt(s.clone()).is_prompt());
        assert!(SearchDirective::CyclicStatePrompt(s).is_prompt());
        assert!(!SearchDirective::Backtrack.is_prompt());
        assert!(!SearchDirective::Stop.is_prompt());
    }
}
