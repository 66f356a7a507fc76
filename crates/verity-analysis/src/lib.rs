//! # verity-analysis
//!
//! Verification engine for Java rule fixtures.
//! Contains the syntax and semantic models, rule engine, oracle extraction,
//! matcher, fixture runner, and the built-in reference checks.

#![allow(clippy::module_inception)]

pub mod checks;
pub mod engine;
pub mod matcher;
pub mod oracle;
pub mod runner;
pub mod semantic;
pub mod syntax;
