//! Syntax model: tree-sitter Java parse converted to an index arena with kind
//! tags, exact ranges, and comment trivia.

pub mod kind;
pub mod parser;
pub mod tree;

pub use kind::SyntaxKind;
pub use parser::{parse, JavaParser};
pub use tree::{Comment, CommentStyle, ErrorRegion, SyntaxNode, SyntaxTree};
