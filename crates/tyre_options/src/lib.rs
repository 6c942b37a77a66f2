//! tyre_options: solver and checker configuration.
//!
//! Configuration is read from JSON with camelCase keys. Every field has a
//! default, so `{}` is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default bound on the number of search steps for one unit.
pub const DEFAULT_MAX_STEPS: u64 = 100_000;

/// Limits and policies for a single solver run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SolverOptions {
    /// Simplification and branching steps allowed before the search gives up.
    pub max_steps: u64,
    /// Alternatives whose accumulated penalty exceeds this are pruned.
    pub max_penalty: Option<u32>,
    /// Bind variables that only carry a literal conversion to the literal's
    /// default type instead of reporting them as uninferred.
    pub literal_defaulting: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            max_penalty: None,
            literal_defaulting: false,
        }
    }
}

/// Configuration of a whole checking run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckerConfig {
    pub solver: SolverOptions,
    /// Check independent units on worker threads.
    pub parallel: bool,
    /// Size of a dedicated worker pool; the global pool is used when unset.
    pub threads: Option<usize>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            solver: SolverOptions::default(),
            parallel: true,
            threads: None,
        }
    }
}

impl CheckerConfig {
    /// Reject settings that parse but cannot be honored.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.solver.max_steps == 0 {
            return Err(ConfigError::Invalid {
                field: "solver.maxSteps",
                reason: "must be at least 1",
            });
        }
        if self.threads == Some(0) {
            return Err(ConfigError::Invalid {
                field: "threads",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value for '{field}': {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Parse a configuration from a JSON string.
pub fn parse_config(content: &str) -> Result<CheckerConfig, ConfigError> {
    let config: CheckerConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Parse a configuration file.
pub fn parse_config_file(path: impl AsRef<Path>) -> Result<CheckerConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}
