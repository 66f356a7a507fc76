//! Configuration loaded from `verity.toml`.
//!
//! Every section is `#[serde(default)]`: a missing section or field falls back
//! to defaults, read through the `effective_*` accessors.

pub mod matcher_config;
pub mod rule_config;
pub mod runner_config;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

pub use matcher_config::{MatcherConfig, MessageMatch};
pub use rule_config::{FixtureBinding, RuleConfig};
pub use runner_config::{RunnerConfig, SyntaxErrorPolicy};

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VerityConfig {
    pub runner: RunnerConfig,
    pub matcher: MatcherConfig,
    /// Per-rule settings keyed by rule id.
    pub rules: BTreeMap<String, RuleConfig>,
    /// Explicit fixture → rule bindings, in addition to filename discovery.
    pub fixtures: Vec<FixtureBinding>,
}

impl VerityConfig {
    /// Load config from a TOML string, falling back to defaults for missing fields.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a file on disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml(&text)?;
        tracing::debug!(path = %path.display(), rules = config.rules.len(), "config loaded");
        Ok(config)
    }

    /// Settings for one rule, or defaults when the rule has no section.
    pub fn rule(&self, rule_id: &str) -> RuleConfig {
        self.rules.get(rule_id).cloned().unwrap_or_default()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.runner.unit_timeout_ms == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "runner.unit_timeout_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if let Some(ext) = &self.runner.extension {
            if ext.is_empty() || ext.starts_with('.') {
                return Err(ConfigError::InvalidValue {
                    field: "runner.extension".to_string(),
                    reason: format!("'{ext}' must be a bare extension such as 'java'"),
                });
            }
        }
        for binding in &self.fixtures {
            if binding.rule.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "fixtures.rule".to_string(),
                    reason: format!("empty rule id for {}", binding.path.display()),
                });
            }
            if binding.expect_no_issues && binding.expect_file_issue.is_some() {
                return Err(ConfigError::InvalidValue {
                    field: "fixtures.expect_file_issue".to_string(),
                    reason: format!(
                        "{} cannot expect no issues and a file issue at once",
                        binding.path.display()
                    ),
                });
            }
        }
        Ok(())
    }
}
