//! MethodTooLong: methods and constructors with too many lines of code.

use verity_core::{FxHashSet, NodeId};

use crate::engine::{AnalysisContext, FindingCollector, OptionSpec, Rule, RuleOptions};
use crate::syntax::SyntaxKind;

pub const ID: &str = "MethodTooLong";

pub const OPTIONS: &[OptionSpec] = &[OptionSpec::integer(
    "max",
    6,
    "Maximum authorized lines of code in a method body",
)];

const KINDS: &[SyntaxKind] = &[
    SyntaxKind::MethodDeclaration,
    SyntaxKind::ConstructorDeclaration,
    SyntaxKind::CompactConstructorDeclaration,
];

/// Counts the lines between a body's braces that hold at least one token.
/// Blank and comment-only lines do not count.
pub struct MethodTooLong {
    max: u32,
}

impl MethodTooLong {
    pub fn create(options: &RuleOptions) -> Box<dyn Rule> {
        let max = options.integer("max").unwrap_or(6).clamp(0, u32::MAX as i64) as u32;
        Box::new(Self { max })
    }
}

impl Rule for MethodTooLong {
    fn id(&self) -> &str {
        ID
    }

    fn subscriptions(&self) -> &[SyntaxKind] {
        KINDS
    }

    fn visit_node(&mut self, node: NodeId, ctx: &AnalysisContext<'_>, out: &mut FindingCollector<'_>) {
        let tree = ctx.tree;
        let Some(body) = tree.child_by_field(node, "body") else {
            return;
        };
        let lines = lines_of_code(ctx, body);
        if lines <= self.max {
            return;
        }
        let target = tree.child_by_field(node, "name").unwrap_or(node);
        out.issue(
            target,
            format!(
                "This method has {lines} lines, which is greater than the {} lines authorized. Split it into smaller methods.",
                self.max
            ),
        )
        .cost(f64::from(lines - self.max))
        .emit();
    }
}

fn lines_of_code(ctx: &AnalysisContext<'_>, body: NodeId) -> u32 {
    let tree = ctx.tree;
    let span = tree.range(body);
    let mut lines = FxHashSet::default();
    for id in tree.descendants(body) {
        let node = tree.node(id);
        if !node.is_leaf() || node.is_missing || id == body {
            continue;
        }
        let line = node.range.start.line;
        // The opening and closing braces of the body itself.
        if node.range.start == span.start || node.range.end == span.end {
            continue;
        }
        lines.insert(line);
    }
    lines.len() as u32
}
