//! StringReferenceEquality: `==`/`!=` between two strings.

use verity_core::NodeId;

use crate::engine::{AnalysisContext, FindingCollector, Rule, RuleOptions};
use crate::syntax::SyntaxKind;

pub const ID: &str = "StringReferenceEquality";
pub const MESSAGE: &str = "Strings should be compared using \"equals()\".";

const KINDS: &[SyntaxKind] = &[SyntaxKind::BinaryExpression];

/// Reports only when both operand types are known to be `java.lang.String`.
/// An operand whose type cannot be resolved makes the rule abstain.
pub struct StringReferenceEquality;

impl StringReferenceEquality {
    pub fn create(_options: &RuleOptions) -> Box<dyn Rule> {
        Box::new(Self)
    }
}

impl Rule for StringReferenceEquality {
    fn id(&self) -> &str {
        ID
    }

    fn subscriptions(&self) -> &[SyntaxKind] {
        KINDS
    }

    fn visit_node(&mut self, node: NodeId, ctx: &AnalysisContext<'_>, out: &mut FindingCollector<'_>) {
        let tree = ctx.tree;
        let Some(operator) = tree.child_by_field(node, "operator") else {
            return;
        };
        if !matches!(ctx.text(operator), "==" | "!=") {
            return;
        }
        let (Some(left), Some(right)) = (
            tree.child_by_field(node, "left"),
            tree.child_by_field(node, "right"),
        ) else {
            return;
        };
        let left_type = ctx.expression_type(left);
        let right_type = ctx.expression_type(right);
        if left_type.is_unknown() || right_type.is_unknown() {
            tracing::trace!(
                rule_id = ID,
                line = tree.range(node).start.line,
                "operand type unresolved, abstaining"
            );
            return;
        }
        if left_type.is_string() && right_type.is_string() {
            out.report(node, MESSAGE);
        }
    }
}
