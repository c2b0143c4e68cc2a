//! Plug-in points of the guided policy.

use qg_core::{ProofAction, ProofState, Transition};
use qg_tree::SearchGraph;
use thiserror::Error;

use crate::directive::SearchDirective;

#[derive(Debug, Error)]
#[error("model prompter: {0}")]
pub struct PromptError(pub String);

/// Tree-search algorithm driving the policy.
///
/// The policy calls `on_new_node` and then `estimate_q_value` after the edge for the
/// transition has been inserted, so both can inspect sibling and child edges.
pub trait SearchStrategy {
    fn choose(&mut self, graph: &SearchGraph, state: &ProofState) -> SearchDirective;

    /// Bookkeeping hook (visit counts, frontier updates) for a freshly recorded edge.
    fn on_new_node(&mut self, graph: &SearchGraph, transition: &Transition);

    fn estimate_q_value(&mut self, graph: &SearchGraph, transition: &Transition) -> f64;
}

/// Turns a prompt directive into one concrete action, typically via a language model.
///
/// Only called with directives for which [`SearchDirective::is_prompt`] holds.
pub trait ModelPrompter {
    fn prompt(&mut self, directive: &SearchDirective) -> Result<ProofAction, PromptError>;
}
