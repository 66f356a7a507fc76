//! Verdicts and the discrepancies they enumerate.

use std::fmt;

use serde::{Deserialize, Serialize};
use verity_core::InfraError;

use crate::engine::ActualFinding;
use crate::oracle::ExpectedFinding;

/// Finding attributes a marker can constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    StartColumn,
    EndColumn,
    EndLine,
    Message,
    Secondary,
    EffortToFix,
    Flows,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StartColumn => "sc",
            Self::EndColumn => "ec",
            Self::EndLine => "el",
            Self::Message => "message",
            Self::Secondary => "secondary",
            Self::EffortToFix => "effortToFix",
            Self::Flows => "flows",
        };
        f.write_str(name)
    }
}

/// One reason a unit did not pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Discrepancy {
    /// Reported, but no expectation left on its line.
    FalsePositive { line: u32, finding: ActualFinding },
    /// Expected, but nothing reported for it. One record per missing issue.
    FalseNegative { line: u32, expected: ExpectedFinding },
    /// The line carries an explicit count and the number of findings differs.
    CountMismatch { line: u32, expected: u32, actual: u32 },
    /// A finding paired with an expectation whose constraint it breaks.
    AttributeMismatch {
        line: u32,
        attribute: Attribute,
        expected: String,
        actual: String,
    },
    /// A declared flow that no matched finding referenced.
    UnreferencedFlow { flow_id: String, lines: Vec<u32> },
    /// A file-level finding in a fixture checked line by line.
    UnexpectedFileIssue { finding: ActualFinding },
    /// A fixture bound with `expect_file_issue` did not get exactly that issue.
    FileIssueMismatch { expected: String, reason: String },
}

impl Discrepancy {
    /// Line used to order discrepancies; a flow sorts by its earliest step and
    /// file-level records sort first, as line 0.
    pub fn line(&self) -> u32 {
        match self {
            Self::FalsePositive { line, .. }
            | Self::FalseNegative { line, .. }
            | Self::CountMismatch { line, .. }
            | Self::AttributeMismatch { line, .. } => *line,
            Self::UnreferencedFlow { lines, .. } => lines.iter().copied().min().unwrap_or(0),
            Self::UnexpectedFileIssue { .. } | Self::FileIssueMismatch { .. } => 0,
        }
    }
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FalsePositive { line, finding } => {
                write!(f, "line {line}: unexpected issue \"{}\"", finding.message)
            }
            Self::FalseNegative { line, expected } => match &expected.message {
                Some(message) => write!(f, "line {line}: missing issue \"{message}\""),
                None => write!(f, "line {line}: missing issue"),
            },
            Self::CountMismatch {
                line,
                expected,
                actual,
            } => write!(f, "line {line}: expected {expected} issues, got {actual}"),
            Self::AttributeMismatch {
                line,
                attribute,
                expected,
                actual,
            } => write!(f, "line {line}: {attribute} expected {expected}, got {actual}"),
            Self::UnreferencedFlow { flow_id, lines } => {
                write!(f, "flow@{flow_id} on lines {lines:?} was never reported")
            }
            Self::UnexpectedFileIssue { finding } => {
                write!(f, "file: unexpected file-level issue \"{}\"", finding.message)
            }
            Self::FileIssueMismatch { expected, reason } => {
                write!(f, "file: expected issue \"{expected}\": {reason}")
            }
        }
    }
}

/// An actual finding paired with the expectation slot it filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedPair {
    pub line: u32,
    pub expected: ExpectedFinding,
    pub actual: ActualFinding,
    /// False when the pair carries attribute mismatches.
    pub exact: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    /// The rule was evaluated and disagrees with the oracle.
    Failed,
    /// The unit could not be evaluated.
    Error { error: InfraError },
}

/// Result of one (fixture, rule) unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub fixture: String,
    pub rule_id: String,
    pub variant: Option<String>,
    pub outcome: Outcome,
    pub matched: Vec<MatchedPair>,
    pub discrepancies: Vec<Discrepancy>,
}

impl Verdict {
    pub fn error(
        fixture: impl Into<String>,
        rule_id: impl Into<String>,
        variant: Option<String>,
        error: InfraError,
    ) -> Self {
        Self {
            fixture: fixture.into(),
            rule_id: rule_id.into(),
            variant,
            outcome: Outcome::Error { error },
            matched: Vec::new(),
            discrepancies: Vec::new(),
        }
    }

    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }

    pub fn failed(&self) -> bool {
        self.outcome == Outcome::Failed
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, Outcome::Error { .. })
    }

    pub fn false_positives(&self) -> impl Iterator<Item = &Discrepancy> + '_ {
        self.discrepancies
            .iter()
            .filter(|d| matches!(d, Discrepancy::FalsePositive { .. }))
    }

    pub fn false_negatives(&self) -> impl Iterator<Item = &Discrepancy> + '_ {
        self.discrepancies
            .iter()
            .filter(|d| matches!(d, Discrepancy::FalseNegative { .. }))
    }
}
