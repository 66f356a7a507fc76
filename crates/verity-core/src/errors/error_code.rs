//! Stable, machine-readable error codes shared by every error enum.

pub const ORACLE_MALFORMED: &str = "ORACLE_MALFORMED";
pub const ORACLE_FLOW: &str = "ORACLE_FLOW";
pub const SYNTAX_UNRECOVERABLE: &str = "SYNTAX_UNRECOVERABLE";
pub const SYNTAX_REJECTED: &str = "SYNTAX_REJECTED";
pub const GRAMMAR_UNAVAILABLE: &str = "GRAMMAR_UNAVAILABLE";
pub const CONFIG_INVALID: &str = "CONFIG_INVALID";
pub const CONFIG_UNKNOWN_RULE: &str = "CONFIG_UNKNOWN_RULE";
pub const IO_ERROR: &str = "IO_ERROR";
pub const RULE_FAILURE: &str = "RULE_FAILURE";
pub const UNIT_TIMEOUT: &str = "UNIT_TIMEOUT";
pub const UNIT_CRASHED: &str = "UNIT_CRASHED";
pub const RUN_CANCELLED: &str = "RUN_CANCELLED";
pub const WORKER_POOL: &str = "WORKER_POOL";

/// Implemented by every error type so reports can carry a stable code.
pub trait VerityErrorCode {
    fn error_code(&self) -> &'static str;
}
