//! AssignmentInCondition: `if (x = 1)` and friends.

use verity_core::NodeId;

use crate::engine::{AnalysisContext, FindingCollector, Rule, RuleOptions};
use crate::syntax::SyntaxKind;

pub const ID: &str = "AssignmentInCondition";
pub const MESSAGE: &str = "Add parentheses to make the operator precedence explicit.";

const KINDS: &[SyntaxKind] = &[
    SyntaxKind::IfStatement,
    SyntaxKind::WhileStatement,
    SyntaxKind::DoStatement,
    SyntaxKind::ForStatement,
];

/// Reports an assignment used directly as a loop or branch condition.
/// An extra pair of parentheses, `if ((x = next()) != null)` style, is accepted.
pub struct AssignmentInCondition;

impl AssignmentInCondition {
    pub fn create(_options: &RuleOptions) -> Box<dyn Rule> {
        Box::new(Self)
    }
}

impl Rule for AssignmentInCondition {
    fn id(&self) -> &str {
        ID
    }

    fn subscriptions(&self) -> &[SyntaxKind] {
        KINDS
    }

    fn visit_node(&mut self, node: NodeId, ctx: &AnalysisContext<'_>, out: &mut FindingCollector<'_>) {
        let tree = ctx.tree;
        let Some(condition) = tree.child_by_field(node, "condition") else {
            return;
        };
        // if/while/do wrap the condition in the statement's own parentheses.
        let inner = match tree.kind(condition) {
            SyntaxKind::ParenthesizedExpression if tree.kind(node) != SyntaxKind::ForStatement => {
                match tree.named_children(condition).next() {
                    Some(inner) => inner,
                    None => return,
                }
            }
            _ => condition,
        };
        if tree.kind(inner) == SyntaxKind::AssignmentExpression {
            out.report(inner, MESSAGE);
        }
    }
}
