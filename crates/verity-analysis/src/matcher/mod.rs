//! Oracle matching: compares a rule's findings with a fixture's expectations.

mod matcher;
pub mod verdict;

pub use matcher::{match_file_issue, match_findings, MatchOptions, MatchResult};
pub use verdict::{Attribute, Discrepancy, MatchedPair, Outcome, Verdict};
