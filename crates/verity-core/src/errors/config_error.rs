//! Configuration errors: unreadable files, bad TOML, and rule options that
//! do not fit the rule's declared schema.

use super::error_code::{self, VerityErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {message}")]
    Io { path: String, message: String },

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unknown rule '{rule}'")]
    UnknownRule { rule: String },

    #[error("rule '{rule}' has no option '{key}'")]
    UnknownOption { rule: String, key: String },

    #[error("rule '{rule}' option '{key}' expects {expected}, got {found}")]
    OptionType {
        rule: String,
        key: String,
        expected: &'static str,
        found: String,
    },

    #[error("rule '{rule}' has no variant '{variant}'")]
    UnknownVariant { rule: String, variant: String },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl VerityErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => error_code::IO_ERROR,
            Self::UnknownRule { .. } => error_code::CONFIG_UNKNOWN_RULE,
            _ => error_code::CONFIG_INVALID,
        }
    }
}
