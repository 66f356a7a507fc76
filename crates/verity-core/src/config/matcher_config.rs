//! Matcher configuration.

use serde::{Deserialize, Serialize};

/// How a `{{message}}` expectation is compared with the reported message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageMatch {
    /// The expected text must occur somewhere in the actual message.
    #[default]
    Substring,
    /// The expected text must equal the actual message.
    Exact,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MatcherConfig {
    pub message_match: Option<MessageMatch>,
    /// Default for rules that do not set `ordered_secondaries` themselves.
    pub ordered_secondaries: Option<bool>,
}

impl MatcherConfig {
    pub fn effective_message_match(&self) -> MessageMatch {
        self.message_match.unwrap_or_default()
    }

    pub fn effective_ordered_secondaries(&self) -> bool {
        self.ordered_secondaries.unwrap_or(false)
    }
}
