//! Oracle extraction: expected findings declared in fixture comments
//! (`// Noncompliant ...`, `// flow@...`).

mod extract;
pub mod lexer;
mod marker;
pub mod types;

pub use extract::extract;
pub use lexer::{scan_comments, RawComment, RawCommentStyle};
pub use types::{ExpectedFinding, ExpectedFlowStep, Oracle};
