//! Guided tree-search policy.
//!
//! [`GuidedSearchPolicy`] is the decision façade the agent talks to. It owns the
//! [`qg_tree::SearchGraph`] and delegates:
//! - move selection and Q-value estimation to a [`SearchStrategy`]
//! - turning "ask the model" directives into concrete actions to a [`ModelPrompter`]
//!
//! Neither collaborator has a shipped implementation; they are the plug-in points
//! for concrete search algorithms and language-model clients.

pub mod checkpoint;
pub mod directive;
pub mod guided;
pub mod policy;
pub mod strategy;

pub use directive::{PromptSummary, SearchDirective};
pub use guided::GuidedSearchPolicy;
pub use policy::{Policy, PolicyError};
pub use strategy::{ModelPrompter, PromptError, SearchStrategy};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_nonempty() {
        assert!(!VERSION.is_empty());
    }
}
