//! Errors raised while extracting expectations from fixture comments.
//!
//! Any of these invalidates the whole oracle of a fixture: a half-read oracle
//! would let a rule pass against expectations that were never recorded.

use super::error_code::{self, VerityErrorCode};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OracleError {
    #[error("line {line}: unknown // Noncompliant attribute '{name}'")]
    UnknownAttribute { line: u32, name: String },

    #[error("line {line}: attribute '{name}' given more than once")]
    DuplicateAttribute { line: u32, name: String },

    #[error("line {line}: invalid value '{value}' for attribute '{name}': {reason}")]
    InvalidValue {
        line: u32,
        name: String,
        value: String,
        reason: String,
    },

    #[error("line {line}: '{delimiter}' is never closed")]
    Unterminated { line: u32, delimiter: &'static str },

    #[error("line {line}: invalid line shift '{shift}', use '@+N', '@-N' or '@N'")]
    InvalidShift { line: u32, shift: String },

    #[error("line {line}: expectation shifted to line {target}, outside the file")]
    ShiftOutOfRange { line: u32, target: i64 },

    #[error("line {line}: invalid issue count '{value}'")]
    InvalidCount { line: u32, value: String },

    #[error("line {line}: unexpected '{text}' in marker")]
    UnexpectedToken { line: u32, text: String },

    #[error("flow '{id}': {reason}")]
    InvalidFlow { id: String, reason: String },
}

impl OracleError {
    /// Comment line the error was raised on, when it belongs to one line.
    pub fn line(&self) -> Option<u32> {
        match self {
            Self::UnknownAttribute { line, .. }
            | Self::DuplicateAttribute { line, .. }
            | Self::InvalidValue { line, .. }
            | Self::Unterminated { line, .. }
            | Self::InvalidShift { line, .. }
            | Self::ShiftOutOfRange { line, .. }
            | Self::InvalidCount { line, .. }
            | Self::UnexpectedToken { line, .. } => Some(*line),
            Self::InvalidFlow { .. } => None,
        }
    }
}

impl VerityErrorCode for OracleError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidFlow { .. } => error_code::ORACLE_FLOW,
            _ => error_code::ORACLE_MALFORMED,
        }
    }
}
