pub mod collections;
pub mod identifiers;
pub mod source;
