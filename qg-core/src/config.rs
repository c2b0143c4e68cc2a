//! YAML configuration for a qguide run.
//!
//! Every section has serde defaults, so an empty document is a valid config.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Search graph checkpoint settings.
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Episode runner settings.
    #[serde(default)]
    pub agent: AgentConfig,
    /// Log sinks.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the guided-search policy keeps its checkpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PolicyConfig {
    #[serde(default = "default_checkpoint_dir")]
    pub checkpoint_dir: String,
    #[serde(default = "default_checkpoint_filename")]
    pub checkpoint_filename: String,
    /// Persist the graph when the policy is closed.
    #[serde(default = "default_true")]
    pub checkpoint_on_exit: bool,
}

fn default_checkpoint_dir() -> String {
    ".checkpoints".to_string()
}

fn default_checkpoint_filename() -> String {
    "q_tree.json".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: default_checkpoint_dir(),
            checkpoint_filename: default_checkpoint_filename(),
            checkpoint_on_exit: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentConfig {
    #[serde(default = "default_agent_name")]
    pub name: String,
    #[serde(default = "default_max_steps")]
    pub max_steps_per_episode: u32,
    #[serde(default = "default_episodes")]
    pub episodes: u32,
    #[serde(default)]
    pub render: bool,
    /// Checkpoint the policy at the end of every episode.
    #[serde(default)]
    pub should_checkpoint: bool,
    /// Passed to the environment's `dump_proof`.
    #[serde(default)]
    pub proof_dump_file: Option<String>,
    /// Split tactic payloads into atomic units and run them one step each.
    #[serde(default = "default_true")]
    pub block_execution: bool,
    /// Catch-all closing tactic tried once after a block leaves the goal open.
    #[serde(default = "default_fallback_tactic")]
    pub fallback_tactic: String,
}

fn default_agent_name() -> String {
    "proof-agent".to_string()
}

fn default_max_steps() -> u32 {
    50
}

fn default_episodes() -> u32 {
    1
}

fn default_fallback_tactic() -> String {
    "nlinarith,".to_string()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            max_steps_per_episode: default_max_steps(),
            episodes: default_episodes(),
            render: false,
            should_checkpoint: false,
            proof_dump_file: None,
            block_execution: true,
            fallback_tactic: default_fallback_tactic(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive; `RUST_LOG` wins when set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Optional NDJSON file for step/episode events.
    #[serde(default)]
    pub events_path: Option<String>,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            events_path: None,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.policy.checkpoint_dir.trim().is_empty() {
            return Err(ConfigError::Invalid("policy.checkpoint_dir must be non-empty"));
        }
        if self.policy.checkpoint_filename.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "policy.checkpoint_filename must be non-empty",
            ));
        }
        if self.agent.max_steps_per_episode == 0 {
            return Err(ConfigError::Invalid("agent.max_steps_per_episode must be > 0"));
        }
        if self.agent.fallback_tactic.trim().is_empty() {
            return Err(ConfigError::Invalid("agent.fallback_tactic must be non-empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_string() {
        let yaml = r#"
policy:
  checkpoint_dir: "/tmp/qg"
  checkpoint_filename: "lean_tree.json"
  checkpoint_on_exit: false

agent:
  name: "miniF2F"
  max_steps_per_episode: 12
  block_execution: false
"#;

        let config = Config::from_yaml(yaml).expect("Failed to parse YAML");
        assert_eq!(config.policy.checkpoint_dir, "/tmp/qg");
        assert!(!config.policy.checkpoint_on_exit);
        assert_eq!(config.agent.max_steps_per_episode, 12);
        assert!(!config.agent.block_execution);
        // Check defaults are applied
        assert_eq!(config.agent.fallback_tactic, "nlinarith,");
        assert_eq!(config.agent.episodes, 1);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.policy.checkpoint_filename, "q_tree.json");
        assert!(config.policy.checkpoint_on_exit);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let r = Config::from_yaml("agent:\n  max_steps_per_episode: 0\n");
        assert!(matches!(r, Err(ConfigError::Invalid(_))));
        let r = Config::from_yaml("policy:\n  checkpoint_filename: \"\"\n");
        assert!(matches!(r, Err(ConfigError::Invalid(_))));
        let r = Config::from_yaml("agent:\n  fallback_tactic: \"  \"\n");
        assert!(matches!(r, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_invalid_yaml_fails() {
        let invalid_yaml = "this is not: valid: yaml: {{{}}}";
        let result = Config::from_yaml(invalid_yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("run.yaml");
        std::fs::write(&p, "agent:\n  episodes: 3\n").unwrap();
        let config = Config::load(&p).unwrap();
        assert_eq!(config.agent.episodes, 3);
    }
}
