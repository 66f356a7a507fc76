//! The rule interface and the read-only context rules see.

use verity_core::{NodeId, SourceFile};

use super::collector::FindingCollector;
use crate::semantic::typing::Typer;
use crate::semantic::{Resolution, SemanticModel, TypeRef};
use crate::syntax::{SyntaxKind, SyntaxTree};

/// Everything a rule may read while analysing one file.
#[derive(Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub source: &'a SourceFile,
    pub tree: &'a SyntaxTree,
    pub model: &'a SemanticModel,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(source: &'a SourceFile, tree: &'a SyntaxTree, model: &'a SemanticModel) -> Self {
        Self { source, tree, model }
    }

    pub fn file_name(&self) -> &'a str {
        self.source.name()
    }

    pub fn text(&self, node: NodeId) -> &'a str {
        self.tree.text(node, self.source)
    }

    pub fn kind(&self, node: NodeId) -> SyntaxKind {
        self.tree.kind(node)
    }

    pub fn resolution(&self, node: NodeId) -> Option<&'a Resolution> {
        self.model.resolution(node)
    }

    pub fn typer(&self) -> Typer<'a> {
        Typer::new(self.tree, self.source, self.model)
    }

    pub fn expression_type(&self, node: NodeId) -> TypeRef {
        self.typer().expression_type(node)
    }
}

/// A pluggable check.
///
/// The engine calls `visit_node`/`leave_node` only for the kinds listed in
/// `subscriptions` (all nodes when empty), in one shared pre-order traversal.
/// A rule instance analyses exactly one file.
pub trait Rule: Send {
    /// Stable rule id, e.g. `AssignmentInCondition`.
    fn id(&self) -> &str;

    fn subscriptions(&self) -> &[SyntaxKind];

    fn scan_file(&mut self, _ctx: &AnalysisContext<'_>, _out: &mut FindingCollector<'_>) {}

    fn visit_node(&mut self, _node: NodeId, _ctx: &AnalysisContext<'_>, _out: &mut FindingCollector<'_>) {}

    fn leave_node(&mut self, _node: NodeId, _ctx: &AnalysisContext<'_>, _out: &mut FindingCollector<'_>) {}

    fn leave_file(&mut self, _ctx: &AnalysisContext<'_>, _out: &mut FindingCollector<'_>) {}
}
