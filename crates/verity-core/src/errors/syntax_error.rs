//! Errors raised when a fixture cannot be turned into a usable syntax tree.

use super::error_code::{self, VerityErrorCode};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    #[error("Java grammar could not be loaded: {message}")]
    GrammarUnavailable { message: String },

    #[error("{file}: parser produced no tree")]
    NoTree { file: String },

    #[error("{file}: nothing recoverable ({error_count} error regions)")]
    Unrecoverable { file: String, error_count: usize },

    #[error("{file}:{line}:{column}: syntax error")]
    Rejected { file: String, line: u32, column: u32 },
}

impl VerityErrorCode for SyntaxError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::GrammarUnavailable { .. } => error_code::GRAMMAR_UNAVAILABLE,
            Self::NoTree { .. } | Self::Unrecoverable { .. } => error_code::SYNTAX_UNRECOVERABLE,
            Self::Rejected { .. } => error_code::SYNTAX_REJECTED,
        }
    }
}
