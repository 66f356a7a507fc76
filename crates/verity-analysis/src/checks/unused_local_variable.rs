//! UnusedLocalVariable: locals that are declared but never read.

use verity_core::NodeId;

use crate::engine::{AnalysisContext, FindingCollector, Rule, RuleOptions};
use crate::semantic::SymbolKind;
use crate::syntax::SyntaxKind;

pub const ID: &str = "UnusedLocalVariable";

const KINDS: &[SyntaxKind] = &[SyntaxKind::VariableDeclarator];

pub struct UnusedLocalVariable;

impl UnusedLocalVariable {
    pub fn create(_options: &RuleOptions) -> Box<dyn Rule> {
        Box::new(Self)
    }
}

impl Rule for UnusedLocalVariable {
    fn id(&self) -> &str {
        ID
    }

    fn subscriptions(&self) -> &[SyntaxKind] {
        KINDS
    }

    fn visit_node(&mut self, node: NodeId, ctx: &AnalysisContext<'_>, out: &mut FindingCollector<'_>) {
        let Some(name) = ctx.tree.child_by_field(node, "name") else {
            return;
        };
        let Some(symbol) = ctx.model.declared_by(name) else {
            return;
        };
        let symbol = ctx.model.symbol(symbol);
        if symbol.kind != SymbolKind::LocalVariable {
            return;
        }
        if symbol.references.iter().any(|&r| is_read(ctx, r)) {
            return;
        }
        let variable = ctx.model.name(symbol.id);
        if variable == "_" {
            return;
        }
        out.report(name, format!("Remove this unused \"{variable}\" local variable."));
    }
}

/// A reference is a write only when it is the target of a plain assignment
/// statement; `x += 1` and `y = x = 1` still read or propagate the value.
fn is_read(ctx: &AnalysisContext<'_>, reference: NodeId) -> bool {
    let tree = ctx.tree;
    let Some(parent) = tree.parent(reference) else {
        return true;
    };
    if tree.kind(parent) != SyntaxKind::AssignmentExpression
        || tree.child_by_field(parent, "left") != Some(reference)
    {
        return true;
    }
    let plain = tree
        .child_by_field(parent, "operator")
        .is_some_and(|op| ctx.text(op) == "=");
    let statement = tree
        .parent(parent)
        .is_some_and(|p| tree.kind(p) == SyntaxKind::ExpressionStatement);
    !(plain && statement)
}
