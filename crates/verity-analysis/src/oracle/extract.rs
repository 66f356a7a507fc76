//! Builds the `Oracle` of a fixture from its comments.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use verity_core::errors::OracleError;
use verity_core::SourceFile;

use super::lexer::{scan_comments, RawCommentStyle};
use super::marker::{parse_flows, parse_marker, LineRef, ParsedFlowStep, ParsedMarker};
use super::types::{ExpectedFinding, ExpectedFlowStep, Oracle};

static MARKER: OnceLock<Option<Regex>> = OnceLock::new();
static FLOW_COMMENT: OnceLock<Option<Regex>> = OnceLock::new();

fn marker_regex() -> Option<&'static Regex> {
    MARKER
        .get_or_init(|| Regex::new(r"//\s+Noncompliant\b").ok())
        .as_ref()
}

fn flow_comment_regex() -> Option<&'static Regex> {
    FLOW_COMMENT
        .get_or_init(|| Regex::new(r"//\s+flow@").ok())
        .as_ref()
}

/// Read every marker and flow comment of `source`.
///
/// Fails on the first malformed comment; a partial oracle is never returned.
pub fn extract(source: &SourceFile) -> Result<Oracle, OracleError> {
    let mut oracle = Oracle::default();
    let mut steps: Vec<ExpectedFlowStep> = Vec::new();

    for comment in scan_comments(source.text()) {
        if comment.style != RawCommentStyle::Line {
            continue;
        }
        let comment_line = source.position_of(comment.start_byte).line;

        if let Some(found) = marker_regex().and_then(|re| re.find(comment.text)) {
            if is_false_negative_note(&comment.text[..found.start()]) {
                tracing::debug!(
                    fixture = source.name(),
                    line = comment_line,
                    "skipping documented false negative"
                );
                continue;
            }
            let body_start = found.end();
            let parsed = parse_marker(&comment.text[body_start..], comment_line)?;
            for step in &parsed.flow_steps {
                let byte = comment.start_byte + body_start + step.offset;
                steps.push(flow_step(step, comment_line, source.position_of(byte).column));
            }
            let expected = resolve_marker(parsed, comment_line, source.line_count())?;
            oracle.expectations.entry(expected.line).or_default().push(expected);
        } else if let Some(found) = flow_comment_regex().and_then(|re| re.find(comment.text)) {
            let flow_start = found.end() - "flow@".len();
            for step in parse_flows(&comment.text[flow_start..], comment_line)? {
                let byte = comment.start_byte + flow_start + step.offset;
                steps.push(flow_step(&step, comment_line, source.position_of(byte).column));
            }
        }
    }

    oracle.flows = order_flows(steps)?;
    check_flow_references(&oracle)?;

    tracing::debug!(
        fixture = source.name(),
        expectations = oracle.expected_issue_count(),
        flows = oracle.flows.len(),
        "oracle extracted"
    );
    Ok(oracle)
}

fn is_false_negative_note(prefix: &str) -> bool {
    prefix.to_ascii_lowercase().contains("false negative")
}

fn resolve_marker(
    parsed: ParsedMarker,
    comment_line: u32,
    line_count: u32,
) -> Result<ExpectedFinding, OracleError> {
    let target = parsed.shift.resolve(comment_line);
    if target < 1 || target > line_count as i64 {
        return Err(OracleError::ShiftOutOfRange {
            line: comment_line,
            target,
        });
    }
    let line = target as u32;
    let attrs = parsed.attributes;

    let end_line = match attrs.end_line {
        Some(r) => {
            let resolved = r.resolve(comment_line);
            if resolved > i64::from(line_count) {
                return Err(OracleError::InvalidValue {
                    line: comment_line,
                    name: "el".to_string(),
                    value: resolved.to_string(),
                    reason: "end line is outside the file".to_string(),
                });
            }
            if resolved < line as i64 {
                return Err(OracleError::InvalidValue {
                    line: comment_line,
                    name: "el".to_string(),
                    value: resolved.to_string(),
                    reason: format!("end line is before the issue line {line}"),
                });
            }
            Some(resolved as u32)
        }
        None => None,
    };

    if let (Some(sc), Some(ec)) = (attrs.start_column, attrs.end_column) {
        if end_line.map_or(true, |el| el == line) && ec < sc {
            return Err(OracleError::InvalidValue {
                line: comment_line,
                name: "ec".to_string(),
                value: ec.to_string(),
                reason: format!("end column is before start column {sc}"),
            });
        }
    }

    let secondary = attrs
        .secondary
        .map(|refs| resolve_lines(&refs, comment_line, line_count))
        .transpose()?;

    Ok(ExpectedFinding {
        line,
        comment_line,
        line_offset: line as i64 - comment_line as i64,
        start_column: attrs.start_column,
        end_column: attrs.end_column,
        end_line,
        message: attrs.message,
        secondary,
        count: parsed.count.unwrap_or(1),
        explicit_count: parsed.count.is_some(),
        effort_to_fix: attrs.effort_to_fix,
        flows: attrs.flows.unwrap_or_default(),
    })
}

fn resolve_lines(refs: &[LineRef], anchor: u32, line_count: u32) -> Result<Vec<u32>, OracleError> {
    refs.iter()
        .map(|r| {
            let line = r.resolve(anchor);
            if line < 1 || line > line_count as i64 {
                Err(OracleError::InvalidValue {
                    line: anchor,
                    name: "secondary".to_string(),
                    value: line.to_string(),
                    reason: "secondary line is outside the file".to_string(),
                })
            } else {
                Ok(line as u32)
            }
        })
        .collect()
}

fn flow_step(step: &ParsedFlowStep, line: u32, declared_column: u32) -> ExpectedFlowStep {
    ExpectedFlowStep {
        flow_id: step.id.clone(),
        line,
        declared_column,
        start_column: step.attributes.start_column,
        end_column: step.attributes.end_column,
        message: step.attributes.message.clone(),
        order: step.attributes.order,
    }
}

/// Group steps by flow id and put each flow in reporting order: descending by
/// explicit `order` when every step has one, descending by position when none
/// has. Rules report flows from the issue back towards the source.
fn order_flows(
    steps: Vec<ExpectedFlowStep>,
) -> Result<BTreeMap<String, Vec<ExpectedFlowStep>>, OracleError> {
    let mut flows: BTreeMap<String, Vec<ExpectedFlowStep>> = BTreeMap::new();
    for step in steps {
        flows.entry(step.flow_id.clone()).or_default().push(step);
    }

    for (id, flow) in flows.iter_mut() {
        let explicit = flow.iter().filter(|s| s.order.is_some()).count();
        if explicit == 0 {
            flow.sort_by_key(|s| (s.line, s.declared_column));
            flow.reverse();
            continue;
        }
        if explicit != flow.len() {
            return Err(OracleError::InvalidFlow {
                id: id.clone(),
                reason: "mixes explicit and implicit order".to_string(),
            });
        }
        flow.sort_by_key(|s| s.order);
        if let Some(pair) = flow.windows(2).find(|w| w[0].order == w[1].order) {
            return Err(OracleError::InvalidFlow {
                id: id.clone(),
                reason: format!(
                    "order={} given on lines {} and {}",
                    pair[0].order.unwrap_or_default(),
                    pair[0].line,
                    pair[1].line
                ),
            });
        }
        flow.reverse();
    }
    Ok(flows)
}

/// Every id listed in a `flows=` attribute must be declared by a flow comment.
fn check_flow_references(oracle: &Oracle) -> Result<(), OracleError> {
    for expected in oracle.iter() {
        if let Some(missing) = expected.flows.iter().find(|id| !oracle.flows.contains_key(*id)) {
            return Err(OracleError::InvalidFlow {
                id: missing.clone(),
                reason: format!("referenced on line {} but never declared", expected.comment_line),
            });
        }
    }
    Ok(())
}
