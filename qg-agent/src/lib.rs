//! Proof agent: drives episodes against a proof environment using a policy.
//!
//! Two execution protocols:
//! - simple: one policy action per environment step
//! - block: tactic payloads are split into atomic units (see [`tactics`]) and run one
//!   step each, followed by a single catch-all fallback tactic if the goal is still open

pub mod agent;
pub mod tactics;

pub use agent::{AgentError, EpisodeSummary, ProofAgent};
pub use tactics::{split_tactic_blocks, TacticBlockParser, COMMENT_MARKER};

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

#[cfg(test)]
mod tactics_tests;
