//! Single-pass rule dispatch.
//!
//! The engine walks the tree once per file, in pre-order, calling `visit_node` on
//! entry and `leave_node` on exit for every rule subscribed to the node's kind.
//! Each hook call runs under `catch_unwind`: a rule that panics is switched off
//! for the rest of the file and its run ends in `InfraError::RuleFailure`, while
//! the other rules keep going.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use smallvec::SmallVec;
use verity_core::types::collections::FxHashMap;
use verity_core::{InfraError, NodeId};

use super::cancellation::UnitBudget;
use super::collector::FindingCollector;
use super::rule::{AnalysisContext, Rule};
use super::types::RuleRun;
use crate::syntax::SyntaxKind;

enum Step {
    Enter(NodeId),
    Exit(NodeId),
}

/// Registered rules, indexed by subscribed kind.
pub struct RuleEngine {
    rules: Vec<Box<dyn Rule>>,
    /// Kind → indices into `rules`, in registration order.
    by_kind: FxHashMap<SyntaxKind, SmallVec<[usize; 4]>>,
    /// Rules subscribed to every node.
    wildcard: Vec<usize>,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            by_kind: FxHashMap::default(),
            wildcard: Vec::new(),
        }
    }

    pub fn register(&mut self, rule: Box<dyn Rule>) {
        let idx = self.rules.len();
        let kinds = rule.subscriptions();
        if kinds.is_empty() {
            self.wildcard.push(idx);
        } else {
            for &kind in kinds {
                let slot = self.by_kind.entry(kind).or_default();
                if !slot.contains(&idx) {
                    slot.push(idx);
                }
            }
        }
        self.rules.push(rule);
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn rule_ids(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Run every registered rule over one file.
    ///
    /// Returns one `RuleRun` per rule in registration order, or the budget error
    /// if the deadline passed or the run was cancelled mid-traversal.
    pub fn run(
        &mut self,
        ctx: &AnalysisContext<'_>,
        budget: &UnitBudget,
    ) -> Result<Vec<RuleRun>, InfraError> {
        let Self {
            rules,
            by_kind,
            wildcard,
        } = self;
        let mut collectors: Vec<FindingCollector<'_>> = rules
            .iter()
            .map(|r| FindingCollector::new(r.id(), ctx.tree))
            .collect();
        let mut failures: Vec<Option<String>> = vec![None; rules.len()];

        for (i, rule) in rules.iter_mut().enumerate() {
            let out = &mut collectors[i];
            guarded(rule.as_mut(), &mut failures[i], |r| r.scan_file(ctx, out));
        }

        let mut stack = vec![Step::Enter(ctx.tree.root())];
        while let Some(step) = stack.pop() {
            budget.check()?;
            let (id, entering) = match step {
                Step::Enter(id) => (id, true),
                Step::Exit(id) => (id, false),
            };
            let kind = ctx.tree.kind(id);
            let subscribed = by_kind.get(&kind).map(|v| v.as_slice()).unwrap_or(&[]);
            let mut targets: SmallVec<[usize; 8]> =
                subscribed.iter().chain(wildcard.iter()).copied().collect();
            targets.sort_unstable();
            for i in targets {
                let out = &mut collectors[i];
                if entering {
                    guarded(rules[i].as_mut(), &mut failures[i], |r| r.visit_node(id, ctx, out));
                } else {
                    guarded(rules[i].as_mut(), &mut failures[i], |r| r.leave_node(id, ctx, out));
                }
            }
            if entering {
                stack.push(Step::Exit(id));
                stack.extend(ctx.tree.children(id).iter().rev().map(|&c| Step::Enter(c)));
            }
        }

        for (i, rule) in rules.iter_mut().enumerate() {
            let out = &mut collectors[i];
            guarded(rule.as_mut(), &mut failures[i], |r| r.leave_file(ctx, out));
        }

        let runs = rules
            .iter()
            .zip(collectors)
            .zip(failures)
            .map(|((rule, collector), failure)| RuleRun {
                rule_id: rule.id().to_string(),
                result: match failure {
                    None => Ok(collector.into_findings()),
                    Some(message) => Err(InfraError::RuleFailure {
                        rule_id: rule.id().to_string(),
                        message,
                    }),
                },
            })
            .collect();
        Ok(runs)
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Call one hook unless the rule already failed; record a panic as its failure.
fn guarded(rule: &mut dyn Rule, failure: &mut Option<String>, call: impl FnOnce(&mut dyn Rule)) {
    if failure.is_some() {
        return;
    }
    if let Err(payload) = catch_unwind(AssertUnwindSafe(|| call(&mut *rule))) {
        let message = panic_message(payload.as_ref());
        tracing::error!(rule_id = rule.id(), %message, "rule panicked during traversal");
        *failure = Some(message);
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "rule panicked".to_string()
    }
}
