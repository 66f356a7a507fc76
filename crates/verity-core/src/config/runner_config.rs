//! Runner configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What to do when a fixture contains syntax errors the parser recovered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyntaxErrorPolicy {
    /// Keep the partial tree and run rules over it.
    #[default]
    Recover,
    /// Treat any syntax error as an infrastructure error for the unit.
    Fail,
}

/// Configuration for the fixture runner.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RunnerConfig {
    /// Worker threads. 0 = available parallelism.
    pub threads: Option<usize>,
    /// Per-unit time budget in milliseconds. Default: 10_000.
    pub unit_timeout_ms: Option<u64>,
    /// Directories searched for fixtures.
    pub fixture_roots: Vec<PathBuf>,
    /// Fixture file extension, without the dot. Default: "java".
    pub extension: Option<String>,
    /// Syntax error handling. Default: recover.
    pub syntax_errors: Option<SyntaxErrorPolicy>,
}

impl RunnerConfig {
    /// Returns the effective thread count, defaulting to 0 (auto-detect).
    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or(0)
    }

    /// Returns the per-unit timeout, defaulting to 10 seconds.
    pub fn effective_unit_timeout(&self) -> Duration {
        Duration::from_millis(self.unit_timeout_ms.unwrap_or(10_000))
    }

    pub fn effective_extension(&self) -> &str {
        self.extension.as_deref().unwrap_or("java")
    }

    pub fn effective_syntax_errors(&self) -> SyntaxErrorPolicy {
        self.syntax_errors.unwrap_or_default()
    }
}
