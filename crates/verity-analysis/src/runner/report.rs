//! Run report: every verdict in input order, with totals.

use serde::{Deserialize, Serialize};

use crate::matcher::{Outcome, Verdict};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTotals {
    pub units: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub verdicts: Vec<Verdict>,
    pub totals: RunTotals,
    pub duration_ms: u64,
}

impl RunReport {
    pub fn from_verdicts(verdicts: Vec<Verdict>, duration_ms: u64) -> Self {
        let mut totals = RunTotals {
            units: verdicts.len(),
            ..RunTotals::default()
        };
        for verdict in &verdicts {
            match verdict.outcome {
                Outcome::Passed => totals.passed += 1,
                Outcome::Failed => totals.failed += 1,
                Outcome::Error { .. } => totals.errors += 1,
            }
        }
        Self {
            verdicts,
            totals,
            duration_ms,
        }
    }

    /// True when every unit passed.
    pub fn is_success(&self) -> bool {
        self.totals.passed == self.totals.units
    }

    pub fn failures(&self) -> impl Iterator<Item = &Verdict> + '_ {
        self.verdicts.iter().filter(|v| v.failed())
    }

    pub fn errors(&self) -> impl Iterator<Item = &Verdict> + '_ {
        self.verdicts.iter().filter(|v| v.is_error())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
