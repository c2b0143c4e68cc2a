//! qg-core: proof states, actions, the environment contract, and configuration.

pub mod action;
pub mod config;
pub mod env;
pub mod state;
pub mod state_key;

pub use action::{ActionKind, ChatMessage, ProofAction};
pub use config::{AgentConfig, Config, ConfigError, LoggingConfig, PolicyConfig};
pub use env::{EnvError, ProgressState, ProofEnv, ProofEnvInfo, ProofStats, Transition};
pub use state::{Goal, Language, ProofState, PROOF_FINISHED_DESCRIPTION};
pub use state_key::{state_key, StateKey};

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
