//! Infrastructure failures of a single (fixture, rule) unit.
//!
//! These mean "could not evaluate" and are reported apart from assertion
//! failures, so a parser or harness problem never reads as a rule regression.

use serde::{Deserialize, Serialize};

use super::error_code::{self, VerityErrorCode};
use super::{ConfigError, OracleError, SyntaxError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InfraError {
    #[error("fixture unreadable: {message}")]
    Io { message: String },

    #[error("oracle could not be parsed: {message}")]
    Oracle { message: String },

    #[error("fixture could not be parsed: {message}")]
    Syntax { message: String },

    #[error("rule '{rule_id}' failed: {message}")]
    RuleFailure { rule_id: String, message: String },

    #[error("unit exceeded its {timeout_ms}ms budget")]
    Timeout { timeout_ms: u64 },

    #[error("run cancelled before the unit finished")]
    Cancelled,

    #[error("unit crashed outside any rule: {message}")]
    Crashed { message: String },

    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl From<OracleError> for InfraError {
    fn from(e: OracleError) -> Self {
        Self::Oracle {
            message: e.to_string(),
        }
    }
}

impl From<SyntaxError> for InfraError {
    fn from(e: SyntaxError) -> Self {
        Self::Syntax {
            message: e.to_string(),
        }
    }
}

impl From<ConfigError> for InfraError {
    fn from(e: ConfigError) -> Self {
        Self::Config {
            message: e.to_string(),
        }
    }
}

impl VerityErrorCode for InfraError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => error_code::IO_ERROR,
            Self::Oracle { .. } => error_code::ORACLE_MALFORMED,
            Self::Syntax { .. } => error_code::SYNTAX_UNRECOVERABLE,
            Self::RuleFailure { .. } => error_code::RULE_FAILURE,
            Self::Timeout { .. } => error_code::UNIT_TIMEOUT,
            Self::Cancelled => error_code::RUN_CANCELLED,
            Self::Crashed { .. } => error_code::UNIT_CRASHED,
            Self::Config { .. } => error_code::CONFIG_INVALID,
        }
    }
}
