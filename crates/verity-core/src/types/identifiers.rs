//! Arena indices. Plain `u32` newtypes; they never own what they point at.

use serde::{Deserialize, Serialize};

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            pub fn new(index: usize) -> Self {
                Self(index as u32)
            }

            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

arena_id!(
    /// Index of a node in a `SyntaxTree` arena.
    NodeId
);
arena_id!(
    /// Index of a comment in a `SyntaxTree`'s trivia list.
    CommentId
);
arena_id!(
    /// Index of a declared symbol in a `SemanticModel`.
    SymbolId
);
arena_id!(
    /// Index of a lexical scope in a `SemanticModel`.
    ScopeId
);
