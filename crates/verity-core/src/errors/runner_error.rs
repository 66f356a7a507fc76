//! Errors that stop a whole run before any unit executes.

use super::config_error::ConfigError;
use super::error_code::{self, VerityErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("fixture discovery failed under {root}: {message}")]
    Discovery { root: String, message: String },

    #[error("worker pool could not be built: {message}")]
    WorkerPool { message: String },

    #[error("run cancelled during fixture discovery")]
    Cancelled,

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl VerityErrorCode for RunnerError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Discovery { .. } => error_code::IO_ERROR,
            Self::WorkerPool { .. } => error_code::WORKER_POOL,
            Self::Cancelled => error_code::RUN_CANCELLED,
            Self::Config(e) => e.error_code(),
        }
    }
}
