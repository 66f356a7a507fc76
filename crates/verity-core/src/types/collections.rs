//! Hash collections used across the workspace.
//!
//! Iteration order of these maps is unspecified; anything that ends up in a
//! verdict or report is sorted or kept in a `BTreeMap` first.

pub use rustc_hash::{FxHashMap, FxHashSet};
