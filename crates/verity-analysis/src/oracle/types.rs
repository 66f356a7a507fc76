//! Expectations read from fixture comments.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One `// Noncompliant` marker, resolved to absolute lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedFinding {
    /// Line the finding is expected on, after the `@` shift.
    pub line: u32,
    /// Line the marker comment sits on.
    pub comment_line: u32,
    /// `line - comment_line`.
    pub line_offset: i64,
    /// 1-based, inclusive.
    pub start_column: Option<u32>,
    /// 1-based, exclusive.
    pub end_column: Option<u32>,
    pub end_line: Option<u32>,
    pub message: Option<String>,
    /// Absolute secondary lines. `None` leaves secondaries unchecked.
    pub secondary: Option<Vec<u32>>,
    pub count: u32,
    /// True when the count was written out (`// Noncompliant 2`).
    pub explicit_count: bool,
    pub effort_to_fix: Option<f64>,
    /// Flow ids the finding must carry.
    pub flows: Vec<String>,
}

impl ExpectedFinding {
    /// A bare marker: any single finding on `line` satisfies it.
    pub fn bare(line: u32) -> Self {
        Self {
            line,
            comment_line: line,
            line_offset: 0,
            start_column: None,
            end_column: None,
            end_line: None,
            message: None,
            secondary: None,
            count: 1,
            explicit_count: false,
            effort_to_fix: None,
            flows: Vec::new(),
        }
    }

    pub fn has_constraints(&self) -> bool {
        self.start_column.is_some()
            || self.end_column.is_some()
            || self.end_line.is_some()
            || self.message.is_some()
            || self.secondary.is_some()
            || self.effort_to_fix.is_some()
            || !self.flows.is_empty()
    }
}

/// One step of an expected flow, declared by a `flow@id` comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedFlowStep {
    pub flow_id: String,
    pub line: u32,
    /// Column of the `flow@` token; orders steps declared on the same line.
    pub declared_column: u32,
    pub start_column: Option<u32>,
    pub end_column: Option<u32>,
    pub message: Option<String>,
    pub order: Option<u32>,
}

/// Everything a fixture expects. Sparse: lines without markers have no entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Oracle {
    /// Expectations keyed by expected line, in comment order within a line.
    pub expectations: BTreeMap<u32, Vec<ExpectedFinding>>,
    /// Flow id → steps in flow order.
    pub flows: BTreeMap<String, Vec<ExpectedFlowStep>>,
}

impl Oracle {
    pub fn is_empty(&self) -> bool {
        self.expectations.is_empty() && self.flows.is_empty()
    }

    /// Total number of expected issues, counts included.
    pub fn expected_issue_count(&self) -> usize {
        self.expectations
            .values()
            .flatten()
            .map(|e| e.count as usize)
            .sum()
    }

    pub fn expectations_on(&self, line: u32) -> &[ExpectedFinding] {
        self.expectations.get(&line).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExpectedFinding> + '_ {
        self.expectations.values().flatten()
    }
}
