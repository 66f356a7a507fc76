//! Findings produced by rules.

use serde::{Deserialize, Serialize};
use verity_core::{InfraError, TextRange};

/// A source location attached to a finding: a secondary location or one step
/// of a flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub range: Option<TextRange>,
    pub message: Option<String>,
}

impl Location {
    pub fn at_range(range: TextRange, message: Option<String>) -> Self {
        Self {
            line: range.start.line,
            range: Some(range),
            message,
        }
    }

    pub fn at_line(line: u32, message: Option<String>) -> Self {
        Self {
            line,
            range: None,
            message,
        }
    }
}

/// An issue emitted by a rule. `line` is `None` only for a file-level issue;
/// `range` is set when the rule reported on a node or an explicit range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualFinding {
    pub rule_id: String,
    pub line: Option<u32>,
    pub range: Option<TextRange>,
    pub message: String,
    pub secondaries: Vec<Location>,
    /// Each flow is an ordered list of steps.
    pub flows: Vec<Vec<Location>>,
    pub cost: Option<f64>,
}

impl ActualFinding {
    pub fn is_file_level(&self) -> bool {
        self.line.is_none()
    }
}

/// Result of one rule over one file.
#[derive(Debug, Clone)]
pub struct RuleRun {
    pub rule_id: String,
    /// Findings in emission order, or the failure that stopped the rule.
    pub result: Result<Vec<ActualFinding>, InfraError>,
}

impl RuleRun {
    pub fn findings(&self) -> &[ActualFinding] {
        match &self.result {
            Ok(findings) => findings,
            Err(_) => &[],
        }
    }
}
