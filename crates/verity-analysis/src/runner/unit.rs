//! One (fixture, rule) unit: read → extract → parse → bind → run → match.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crossbeam_channel::{self as channel, RecvTimeoutError};
use verity_core::config::VerityConfig;
use verity_core::{InfraError, SourceFile};

use super::discovery::FixtureUnit;
use crate::checks::RuleCatalog;
use crate::engine::visitor::panic_message;
use crate::engine::{AnalysisContext, RuleEngine, RunCancellation, UnitBudget};
use crate::matcher::{match_file_issue, match_findings, MatchOptions, MatchResult, Verdict};
use crate::oracle;
use crate::semantic::SemanticModel;
use crate::syntax::JavaParser;

/// Stack of the thread a unit runs on. Deeply nested fixtures recurse in the
/// binder and in rules.
const UNIT_STACK_SIZE: usize = 16 * 1024 * 1024;

/// Verify one unit. Never fails: anything that stops evaluation becomes an
/// `Error` verdict for this unit alone.
pub fn run_unit(
    unit: &FixtureUnit,
    config: &Arc<VerityConfig>,
    catalog: &Arc<RuleCatalog>,
    cancellation: &RunCancellation,
) -> Verdict {
    let fixture = unit.fixture_name();
    let verdict = match evaluate_watched(unit, config, catalog, cancellation) {
        Ok(result) => result.into_verdict(fixture, unit.rule_id.clone(), unit.variant.clone()),
        Err(error) => Verdict::error(fixture, unit.rule_id.clone(), unit.variant.clone(), error),
    };
    tracing::debug!(
        fixture = %verdict.fixture,
        rule_id = %verdict.rule_id,
        passed = verdict.passed(),
        discrepancies = verdict.discrepancies.len(),
        "unit finished"
    );
    verdict
}

/// Run `evaluate` on its own thread and wait at most the unit timeout for it.
///
/// The engine also checks the deadline between dispatch steps; the watchdog
/// covers a hook that never returns. An overrunning thread is abandoned, not
/// joined, so the worker that waits on it is free for the next unit.
fn evaluate_watched(
    unit: &FixtureUnit,
    config: &Arc<VerityConfig>,
    catalog: &Arc<RuleCatalog>,
    cancellation: &RunCancellation,
) -> Result<MatchResult, InfraError> {
    let timeout = config.runner.effective_unit_timeout();
    let (tx, rx) = channel::bounded(1);

    let owned_unit = unit.clone();
    let config = Arc::clone(config);
    let catalog = Arc::clone(catalog);
    let cancellation = cancellation.clone();
    std::thread::Builder::new()
        .name(format!("verity-unit-{}", unit.rule_id))
        .stack_size(UNIT_STACK_SIZE)
        .spawn(move || {
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                evaluate(&owned_unit, &config, &catalog, &cancellation)
            }))
            .unwrap_or_else(|payload| {
                Err(InfraError::Crashed {
                    message: panic_message(payload.as_ref()),
                })
            });
            // The receiver is gone when the watchdog already gave up.
            let _ = tx.send(outcome);
        })
        .map_err(|e| InfraError::Crashed {
            message: format!("unit thread could not start: {e}"),
        })?;

    match rx.recv_timeout(timeout) {
        Ok(outcome) => outcome,
        Err(RecvTimeoutError::Timeout) => {
            tracing::warn!(
                fixture = %unit.fixture_name(),
                rule_id = %unit.rule_id,
                timeout_ms = timeout.as_millis() as u64,
                "unit overran its budget; abandoning its thread"
            );
            Err(InfraError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            })
        }
        Err(RecvTimeoutError::Disconnected) => Err(InfraError::Crashed {
            message: "unit thread exited without a result".to_string(),
        }),
    }
}

fn evaluate(
    unit: &FixtureUnit,
    config: &VerityConfig,
    catalog: &RuleCatalog,
    cancellation: &RunCancellation,
) -> Result<MatchResult, InfraError> {
    let budget = UnitBudget::new(config.runner.effective_unit_timeout(), cancellation.clone());
    budget.check()?;

    let text = std::fs::read_to_string(&unit.fixture).map_err(|e| InfraError::Io {
        message: format!("{}: {e}", unit.fixture.display()),
    })?;
    let source = SourceFile::new(unit.fixture_name(), text);

    let oracle = oracle::extract(&source)?;
    let binding_mode = if unit.expect_no_issues {
        Some("expect_no_issues")
    } else if unit.expect_file_issue.is_some() {
        Some("expect_file_issue")
    } else {
        None
    };
    if let Some(mode) = binding_mode {
        if !oracle.is_empty() {
            return Err(InfraError::Oracle {
                message: format!(
                    "bound with {mode} but declares {} expected issues",
                    oracle.expected_issue_count()
                ),
            });
        }
    }

    let descriptor = catalog.get(&unit.rule_id).ok_or_else(|| InfraError::Config {
        message: format!("unknown rule '{}'", unit.rule_id),
    })?;
    let rule_config = config.rule(&unit.rule_id);
    let table = rule_config.options_for_variant(&unit.rule_id, unit.variant.as_deref())?;
    let rule = descriptor.instantiate(&table)?;

    let tree = JavaParser::new()?.parse_with_policy(&source, config.runner.effective_syntax_errors())?;
    let model = SemanticModel::build(&tree, &source);
    let ctx = AnalysisContext::new(&source, &tree, &model);

    let mut engine = RuleEngine::new();
    engine.register(rule);
    let mut runs = engine.run(&ctx, &budget)?;
    let findings = match runs.pop() {
        Some(run) => run.result?,
        None => Vec::new(),
    };

    if let Some(message) = &unit.expect_file_issue {
        return Ok(match_file_issue(&findings, message));
    }
    let options = MatchOptions::from_config(&config.matcher, &rule_config);
    Ok(match_findings(&findings, &oracle, &options))
}
