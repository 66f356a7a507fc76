//! Rule-scoped finding sink.
//!
//! The rule id is fixed when the collector is built, and the location of each
//! finding is computed from the tree at report time. Emitted findings are owned
//! values; the rule keeps no handle on them.

use verity_core::{NodeId, TextRange};

use super::types::{ActualFinding, Location};
use crate::syntax::SyntaxTree;

/// Where a finding or location points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Node(NodeId),
    Range(TextRange),
    /// Whole line, no column information.
    Line(u32),
    /// The file itself. Only meaningful as a primary location.
    File,
}

impl From<NodeId> for Target {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<TextRange> for Target {
    fn from(range: TextRange) -> Self {
        Self::Range(range)
    }
}

pub struct FindingCollector<'t> {
    rule_id: String,
    tree: &'t SyntaxTree,
    findings: Vec<ActualFinding>,
}

impl<'t> FindingCollector<'t> {
    pub fn new(rule_id: impl Into<String>, tree: &'t SyntaxTree) -> Self {
        Self {
            rule_id: rule_id.into(),
            tree,
            findings: Vec::new(),
        }
    }

    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }

    pub fn report(&mut self, target: impl Into<Target>, message: impl Into<String>) {
        self.issue(target, message).emit();
    }

    /// Report an issue on the file as a whole, with no line.
    pub fn report_on_file(&mut self, message: impl Into<String>) {
        self.issue(Target::File, message).emit();
    }

    pub fn report_with_secondaries<T: Into<Target>>(
        &mut self,
        target: impl Into<Target>,
        message: impl Into<String>,
        secondaries: impl IntoIterator<Item = (T, Option<String>)>,
    ) {
        let mut builder = self.issue(target, message);
        for (location, note) in secondaries {
            builder = builder.secondary(location, note);
        }
        builder.emit();
    }

    /// Builder for findings with flows or a cost.
    pub fn issue(&mut self, target: impl Into<Target>, message: impl Into<String>) -> IssueBuilder<'_, 't> {
        let (line, range) = match self.locate(target.into(), None) {
            Some(primary) => (Some(primary.line), primary.range),
            None => (None, None),
        };
        IssueBuilder {
            collector: self,
            finding: ActualFinding {
                rule_id: String::new(),
                line,
                range,
                message: message.into(),
                secondaries: Vec::new(),
                flows: Vec::new(),
                cost: None,
            },
        }
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn into_findings(self) -> Vec<ActualFinding> {
        self.findings
    }

    /// `None` for `Target::File`, which has no line to point at.
    fn locate(&self, target: Target, message: Option<String>) -> Option<Location> {
        match target {
            Target::Node(id) => Some(Location::at_range(self.tree.range(id), message)),
            Target::Range(range) => Some(Location::at_range(range, message)),
            Target::Line(line) => Some(Location::at_line(line, message)),
            Target::File => None,
        }
    }
}

#[must_use = "an issue is only recorded by `emit`"]
pub struct IssueBuilder<'c, 't> {
    collector: &'c mut FindingCollector<'t>,
    finding: ActualFinding,
}

impl IssueBuilder<'_, '_> {
    /// Adds a secondary location. A `Target::File` secondary is dropped.
    pub fn secondary(mut self, target: impl Into<Target>, message: Option<String>) -> Self {
        match self.collector.locate(target.into(), message) {
            Some(location) => self.finding.secondaries.push(location),
            None => tracing::warn!(rule_id = %self.collector.rule_id, "file target ignored as a secondary location"),
        }
        self
    }

    /// Adds one flow; steps are kept in the given order. `Target::File` steps
    /// are dropped.
    pub fn flow<T: Into<Target>>(mut self, steps: impl IntoIterator<Item = (T, Option<String>)>) -> Self {
        let flow = steps
            .into_iter()
            .filter_map(|(target, message)| self.collector.locate(target.into(), message))
            .collect();
        self.finding.flows.push(flow);
        self
    }

    pub fn cost(mut self, cost: f64) -> Self {
        self.finding.cost = Some(cost);
        self
    }

    pub fn emit(self) {
        let mut finding = self.finding;
        finding.rule_id = self.collector.rule_id.clone();
        self.collector.findings.push(finding);
    }
}
