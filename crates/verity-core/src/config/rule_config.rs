//! Per-rule settings and explicit fixture bindings.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// `[rules.<RuleId>]` section.
///
/// `options` configure the rule for every fixture; `variants.<name>` tables are
/// overlaid on top of them for fixtures named `<RuleId>_<name>`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RuleConfig {
    pub enabled: Option<bool>,
    pub ordered_secondaries: Option<bool>,
    pub options: toml::Table,
    pub variants: BTreeMap<String, toml::Table>,
}

impl RuleConfig {
    pub fn effective_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    /// Options for a fixture variant: base options with the variant table laid over.
    ///
    /// `default` is always accepted and means the base options. Any other name must
    /// have a `variants` entry.
    pub fn options_for_variant(
        &self,
        rule_id: &str,
        variant: Option<&str>,
    ) -> Result<toml::Table, ConfigError> {
        let mut merged = self.options.clone();
        match variant {
            None | Some("default") => {}
            Some(name) => {
                let overlay = self.variants.get(name).ok_or_else(|| ConfigError::UnknownVariant {
                    rule: rule_id.to_string(),
                    variant: name.to_string(),
                })?;
                for (key, value) in overlay {
                    merged.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(merged)
    }
}

/// `[[fixtures]]` entry binding one fixture file to one rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FixtureBinding {
    pub path: PathBuf,
    pub rule: String,
    #[serde(default)]
    pub variant: Option<String>,
    /// The fixture must carry no markers and the rule must report nothing.
    #[serde(default)]
    pub expect_no_issues: bool,
    /// The fixture must carry no markers and the rule must report exactly one
    /// file-level issue with this message.
    #[serde(default)]
    pub expect_file_issue: Option<String>,
}
