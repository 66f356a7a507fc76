//! Error types for every layer of the engine, one `thiserror` enum per layer.

pub mod config_error;
pub mod error_code;
pub mod infra_error;
pub mod oracle_error;
pub mod runner_error;
pub mod syntax_error;

pub use config_error::ConfigError;
pub use infra_error::InfraError;
pub use oracle_error::OracleError;
pub use runner_error::RunnerError;
pub use syntax_error::SyntaxError;
