//! Line-grouped slot matching of actual findings against an oracle.

use std::collections::{BTreeMap, BTreeSet};

use verity_core::config::{MatcherConfig, MessageMatch, RuleConfig};
use verity_core::FxHashSet;

use super::verdict::{Attribute, Discrepancy, MatchedPair, Outcome, Verdict};
use crate::engine::{ActualFinding, Location};
use crate::oracle::{ExpectedFinding, ExpectedFlowStep, Oracle};

const COST_EPSILON: f64 = 1e-9;

/// Comparison knobs for one (fixture, rule) unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchOptions {
    pub message_match: MessageMatch,
    /// Compare secondary lines positionally instead of as a multiset.
    pub ordered_secondaries: bool,
}

impl MatchOptions {
    /// Global matcher settings, with the rule's own `ordered_secondaries` taking precedence.
    pub fn from_config(matcher: &MatcherConfig, rule: &RuleConfig) -> Self {
        Self {
            message_match: matcher.effective_message_match(),
            ordered_secondaries: rule
                .ordered_secondaries
                .unwrap_or_else(|| matcher.effective_ordered_secondaries()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchResult {
    pub matched: Vec<MatchedPair>,
    /// Sorted by line.
    pub discrepancies: Vec<Discrepancy>,
}

impl MatchResult {
    pub fn is_pass(&self) -> bool {
        self.discrepancies.is_empty()
    }

    pub fn into_verdict(
        self,
        fixture: impl Into<String>,
        rule_id: impl Into<String>,
        variant: Option<String>,
    ) -> Verdict {
        let outcome = if self.is_pass() {
            Outcome::Passed
        } else {
            Outcome::Failed
        };
        Verdict {
            fixture: fixture.into(),
            rule_id: rule_id.into(),
            variant,
            outcome,
            matched: self.matched,
            discrepancies: self.discrepancies,
        }
    }
}

/// Compare `actual` (in emission order) with `oracle`.
///
/// Pure: the same inputs always give the same result.
pub fn match_findings(
    actual: &[ActualFinding],
    oracle: &Oracle,
    options: &MatchOptions,
) -> MatchResult {
    let mut by_line: BTreeMap<u32, Vec<&ActualFinding>> = BTreeMap::new();
    let mut file_level: Vec<&ActualFinding> = Vec::new();
    for finding in actual {
        match finding.line {
            Some(line) => by_line.entry(line).or_default().push(finding),
            None => file_level.push(finding),
        }
    }
    let lines: BTreeSet<u32> = by_line
        .keys()
        .chain(oracle.expectations.keys())
        .copied()
        .collect();

    let mut result = MatchResult::default();
    result.discrepancies.extend(
        file_level
            .into_iter()
            .map(|finding| Discrepancy::UnexpectedFileIssue {
                finding: finding.clone(),
            }),
    );
    let mut referenced: FxHashSet<&str> = FxHashSet::default();
    for line in lines {
        let findings = by_line.get(&line).map(Vec::as_slice).unwrap_or(&[]);
        match_line(
            line,
            oracle.expectations_on(line),
            findings,
            oracle,
            options,
            &mut result,
            &mut referenced,
        );
    }

    for (id, steps) in &oracle.flows {
        if !referenced.contains(id.as_str()) {
            result.discrepancies.push(Discrepancy::UnreferencedFlow {
                flow_id: id.clone(),
                lines: steps.iter().map(|s| s.line).collect(),
            });
        }
    }

    // Stable: records on the same line keep the order they were produced in.
    result.discrepancies.sort_by_key(Discrepancy::line);
    result
}

/// Check a fixture bound with `expect_file_issue`: exactly one finding, on the
/// file itself, whose message equals `expected_message`.
pub fn match_file_issue(actual: &[ActualFinding], expected_message: &str) -> MatchResult {
    let reason = match actual {
        [] => Some("no issue was raised".to_string()),
        [single] => match single.line {
            Some(line) => Some(format!("the issue was raised on line {line}, not on the file")),
            None if single.message != expected_message => {
                Some(format!("the message was \"{}\"", single.message))
            }
            None => None,
        },
        many => Some(format!("{} issues were raised instead of one", many.len())),
    };
    MatchResult {
        matched: Vec::new(),
        discrepancies: reason
            .into_iter()
            .map(|reason| Discrepancy::FileIssueMismatch {
                expected: expected_message.to_string(),
                reason,
            })
            .collect(),
    }
}

fn match_line<'o>(
    line: u32,
    expected: &'o [ExpectedFinding],
    findings: &[&ActualFinding],
    oracle: &Oracle,
    options: &MatchOptions,
    result: &mut MatchResult,
    referenced: &mut FxHashSet<&'o str>,
) {
    let slots: Vec<&ExpectedFinding> = expected
        .iter()
        .flat_map(|e| std::iter::repeat(e).take(e.count as usize))
        .collect();

    if expected.iter().any(|e| e.explicit_count) && findings.len() != slots.len() {
        result.discrepancies.push(Discrepancy::CountMismatch {
            line,
            expected: slots.len() as u32,
            actual: findings.len() as u32,
        });
        return;
    }

    // A finding takes a slot it satisfies whenever some assignment allows it;
    // only the findings left over fall back to the first open slot.
    let clean: Vec<Vec<bool>> = findings
        .iter()
        .map(|&f| slots.iter().map(|&e| check(e, f, oracle, options).is_empty()).collect())
        .collect();
    let mut owner: Vec<Option<usize>> = vec![None; slots.len()];
    for f in 0..findings.len() {
        let mut visited = vec![false; slots.len()];
        augment(f, &clean, &mut owner, &mut visited);
    }

    let mut assigned: Vec<Option<usize>> = vec![None; findings.len()];
    for (slot, f) in owner.iter().enumerate() {
        if let Some(f) = *f {
            assigned[f] = Some(slot);
        }
    }

    let mut open: Vec<bool> = owner.iter().map(Option::is_none).collect();
    for (f, &finding) in findings.iter().enumerate() {
        let (slot, mismatches) = match assigned[f] {
            Some(slot) => (slot, Vec::new()),
            None => match open.iter().position(|&o| o) {
                Some(slot) => {
                    open[slot] = false;
                    (slot, check(slots[slot], finding, oracle, options))
                }
                None => {
                    result.discrepancies.push(Discrepancy::FalsePositive {
                        line,
                        finding: finding.clone(),
                    });
                    continue;
                }
            },
        };

        let expectation = slots[slot];
        referenced.extend(expectation.flows.iter().map(String::as_str));
        result.matched.push(MatchedPair {
            line,
            expected: expectation.clone(),
            actual: finding.clone(),
            exact: mismatches.is_empty(),
        });
        result
            .discrepancies
            .extend(mismatches.into_iter().map(|m| Discrepancy::AttributeMismatch {
                line,
                attribute: m.attribute,
                expected: m.expected,
                actual: m.actual,
            }));
    }

    for (slot, is_open) in open.iter().enumerate() {
        if *is_open {
            result.discrepancies.push(Discrepancy::FalseNegative {
                line,
                expected: slots[slot].clone(),
            });
        }
    }
}

/// Augmenting-path step of a maximum bipartite matching between findings and
/// the slots they satisfy. Lower slot indices are tried first.
fn augment(
    finding: usize,
    clean: &[Vec<bool>],
    owner: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    for slot in 0..owner.len() {
        if !clean[finding][slot] || visited[slot] {
            continue;
        }
        visited[slot] = true;
        let free = match owner[slot] {
            None => true,
            Some(other) => augment(other, clean, owner, visited),
        };
        if free {
            owner[slot] = Some(finding);
            return true;
        }
    }
    false
}

#[derive(Debug, Clone, PartialEq)]
struct Mismatch {
    attribute: Attribute,
    expected: String,
    actual: String,
}

impl Mismatch {
    fn new(attribute: Attribute, expected: impl ToString, actual: impl ToString) -> Self {
        Self {
            attribute,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

fn or_none<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "none".to_string(), |v| v.to_string())
}

/// Every constraint of `expected` that `actual` breaks, in attribute order.
fn check(
    expected: &ExpectedFinding,
    actual: &ActualFinding,
    oracle: &Oracle,
    options: &MatchOptions,
) -> Vec<Mismatch> {
    let mut out = Vec::new();

    if let Some(sc) = expected.start_column {
        let got = actual.range.map(|r| r.start.column);
        if got != Some(sc) {
            out.push(Mismatch::new(Attribute::StartColumn, sc, or_none(got)));
        }
    }
    if let Some(ec) = expected.end_column {
        let got = actual.range.map(|r| r.end.column);
        if got != Some(ec) {
            out.push(Mismatch::new(Attribute::EndColumn, ec, or_none(got)));
        }
    }
    if let Some(el) = expected.end_line {
        let got = actual.range.map(|r| r.end.line);
        if got != Some(el) {
            out.push(Mismatch::new(Attribute::EndLine, el, or_none(got)));
        }
    }
    if let Some(message) = &expected.message {
        if !message_matches(message, &actual.message, options.message_match) {
            out.push(Mismatch::new(Attribute::Message, message, &actual.message));
        }
    }
    if let Some(lines) = &expected.secondary {
        let got: Vec<u32> = actual.secondaries.iter().map(|s| s.line).collect();
        if !secondaries_match(lines, &got, options.ordered_secondaries) {
            out.push(Mismatch::new(
                Attribute::Secondary,
                format!("{lines:?}"),
                format!("{got:?}"),
            ));
        }
    }
    if let Some(effort) = expected.effort_to_fix {
        let ok = actual.cost.is_some_and(|c| (c - effort).abs() < COST_EPSILON);
        if !ok {
            out.push(Mismatch::new(Attribute::EffortToFix, effort, or_none(actual.cost)));
        }
    }
    if !expected.flows.is_empty() && !flows_match(&expected.flows, &actual.flows, oracle, options) {
        let got: Vec<Vec<u32>> = actual
            .flows
            .iter()
            .map(|flow| flow.iter().map(|s| s.line).collect())
            .collect();
        out.push(Mismatch::new(
            Attribute::Flows,
            expected.flows.join(","),
            format!("{got:?}"),
        ));
    }
    out
}

fn message_matches(expected: &str, actual: &str, mode: MessageMatch) -> bool {
    match mode {
        MessageMatch::Substring => actual.contains(expected),
        MessageMatch::Exact => actual == expected,
    }
}

fn secondaries_match(expected: &[u32], actual: &[u32], ordered: bool) -> bool {
    if ordered {
        return expected == actual;
    }
    let mut a = expected.to_vec();
    let mut b = actual.to_vec();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

/// One-to-one assignment of actual flows to the expected flow ids.
fn flows_match(ids: &[String], actual: &[Vec<Location>], oracle: &Oracle, options: &MatchOptions) -> bool {
    if ids.len() != actual.len() {
        return false;
    }
    let mut used = vec![false; ids.len()];
    actual.iter().all(|flow| {
        let hit = ids.iter().enumerate().find(|(i, id)| {
            !used[*i]
                && oracle
                    .flows
                    .get(id.as_str())
                    .is_some_and(|steps| flow_matches(steps, flow, options))
        });
        match hit {
            Some((i, _)) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

fn flow_matches(expected: &[ExpectedFlowStep], actual: &[Location], options: &MatchOptions) -> bool {
    expected.len() == actual.len()
        && expected.iter().zip(actual).all(|(e, a)| {
            e.line == a.line
                && e.message.as_deref().map_or(true, |m| {
                    a.message
                        .as_deref()
                        .is_some_and(|got| message_matches(m, got, options.message_match))
                })
                && e.start_column.map_or(true, |sc| a.range.map(|r| r.start.column) == Some(sc))
                && e.end_column.map_or(true, |ec| a.range.map(|r| r.end.column) == Some(ec))
        })
}
