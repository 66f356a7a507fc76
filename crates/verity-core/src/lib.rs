//! # verity-core
//!
//! Foundation crate for the Verity rule verification engine.
//! Defines source/position types, identifiers, errors, config, and tracing setup.
//! The analysis crate depends on this for every shared type.

pub mod config;
pub mod errors;
pub mod tracing;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::VerityConfig;
pub use errors::error_code::VerityErrorCode;
pub use errors::InfraError;
pub use types::collections::{FxHashMap, FxHashSet};
pub use types::identifiers::{CommentId, NodeId, ScopeId, SymbolId};
pub use types::source::{Position, SourceFile, TextRange};
