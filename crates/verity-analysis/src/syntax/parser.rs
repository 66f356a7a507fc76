//! Java parsing via tree-sitter, converted into the arena `SyntaxTree`.

use smallvec::SmallVec;
use tree_sitter::{Node, Parser, Tree};
use verity_core::config::SyntaxErrorPolicy;
use verity_core::errors::SyntaxError;
use verity_core::{CommentId, NodeId, SourceFile};

use super::kind::{is_comment_kind, SyntaxKind};
use super::tree::{Comment, CommentStyle, ErrorRegion, SyntaxNode, SyntaxTree};

/// Owns a tree-sitter parser configured for Java.
///
/// Not `Sync`: every unit builds its own parser, so nothing is shared or cached
/// between units.
pub struct JavaParser {
    parser: Parser,
}

impl JavaParser {
    pub fn new() -> Result<Self, SyntaxError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .map_err(|e| SyntaxError::GrammarUnavailable {
                message: e.to_string(),
            })?;
        Ok(Self { parser })
    }

    /// Parse and recover. Error regions are kept in the tree; only a file with
    /// nothing usable in it is rejected.
    pub fn parse(&mut self, source: &SourceFile) -> Result<SyntaxTree, SyntaxError> {
        let ts_tree = self
            .parser
            .parse(source.text(), None)
            .ok_or_else(|| SyntaxError::NoTree {
                file: source.name().to_string(),
            })?;
        let tree = convert(&ts_tree, source);

        if tree.has_errors() {
            if !has_usable_content(&tree) {
                return Err(SyntaxError::Unrecoverable {
                    file: source.name().to_string(),
                    error_count: tree.errors().len(),
                });
            }
            tracing::warn!(
                fixture = source.name(),
                errors = tree.errors().len(),
                "recovered from syntax errors"
            );
        }
        Ok(tree)
    }

    /// Parse under a syntax error policy. With `Fail`, any error region rejects
    /// the file at the first error's position.
    pub fn parse_with_policy(
        &mut self,
        source: &SourceFile,
        policy: SyntaxErrorPolicy,
    ) -> Result<SyntaxTree, SyntaxError> {
        let tree = self.parse(source)?;
        match (policy, tree.errors().first()) {
            (SyntaxErrorPolicy::Fail, Some(first)) => Err(SyntaxError::Rejected {
                file: source.name().to_string(),
                line: first.range.start.line,
                column: first.range.start.column,
            }),
            _ => Ok(tree),
        }
    }
}

/// One-shot helper: fresh parser, recovering policy.
pub fn parse(source: &SourceFile) -> Result<SyntaxTree, SyntaxError> {
    JavaParser::new()?.parse(source)
}

/// A tree is usable when the root is a compilation unit with at least one child
/// that is neither an error region nor a stray token.
fn has_usable_content(tree: &SyntaxTree) -> bool {
    let root = tree.root();
    if tree.kind(root) != SyntaxKind::CompilationUnit {
        return false;
    }
    tree.children(root)
        .iter()
        .any(|&c| !matches!(tree.kind(c), SyntaxKind::Error | SyntaxKind::Token))
}

/// Iterative pre-order conversion. Comments are pulled out of the node stream and
/// attached afterwards.
fn convert(ts_tree: &Tree, source: &SourceFile) -> SyntaxTree {
    let mut nodes: Vec<SyntaxNode> = Vec::new();
    let mut raw_comments: Vec<(CommentStyle, usize, usize)> = Vec::new();
    let mut errors: Vec<ErrorRegion> = Vec::new();
    // Arena id of the node the cursor currently sits on, one entry per depth.
    let mut stack: Vec<NodeId> = Vec::new();

    let mut cursor = ts_tree.walk();
    let mut descend = true;
    loop {
        if descend {
            let node = cursor.node();
            if is_comment_kind(node.kind()) {
                raw_comments.push((comment_style(&node, source), node.start_byte(), node.end_byte()));
                descend = false;
                continue;
            }
            let id = NodeId::new(nodes.len());
            let parent = stack.last().copied();
            nodes.push(make_node(&node, cursor.field_name(), parent, source));
            if let Some(p) = parent {
                nodes[p.index()].children.push(id);
            }
            if node.is_error() || node.is_missing() {
                errors.push(ErrorRegion {
                    node: id,
                    range: nodes[id.index()].range,
                    missing: node.is_missing(),
                });
            }
            if cursor.goto_first_child() {
                stack.push(id);
                continue;
            }
            descend = false;
            continue;
        }
        if cursor.goto_next_sibling() {
            descend = true;
            continue;
        }
        if !cursor.goto_parent() {
            break;
        }
        stack.pop();
    }

    let comments = attach_comments(&nodes, raw_comments, source);
    SyntaxTree::from_parts(source.name().to_string(), nodes, comments, errors)
}

fn make_node(
    node: &Node<'_>,
    field: Option<&'static str>,
    parent: Option<NodeId>,
    source: &SourceFile,
) -> SyntaxNode {
    let (start_byte, end_byte) = (node.start_byte(), node.end_byte());
    SyntaxNode {
        kind: SyntaxKind::from_grammar(node.kind(), node.is_named()),
        grammar_kind: node.kind(),
        field,
        range: source.range_of(start_byte, end_byte),
        start_byte,
        end_byte,
        parent,
        children: SmallVec::new(),
        is_named: node.is_named(),
        is_missing: node.is_missing(),
    }
}

fn comment_style(node: &Node<'_>, source: &SourceFile) -> CommentStyle {
    match node.kind() {
        "line_comment" => CommentStyle::Line,
        "block_comment" => CommentStyle::Block,
        _ if source.slice(node.start_byte(), node.end_byte()).starts_with("//") => {
            CommentStyle::Line
        }
        _ => CommentStyle::Block,
    }
}

/// Attach every comment to the first leaf that starts at or after the comment's
/// end; comments after the last token go to the root.
fn attach_comments(
    nodes: &[SyntaxNode],
    mut raw: Vec<(CommentStyle, usize, usize)>,
    source: &SourceFile,
) -> Vec<Comment> {
    raw.sort_by_key(|&(_, start, _)| start);
    // Pre-order leaves are already sorted by start byte.
    let leaves: Vec<(usize, NodeId)> = nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| n.is_leaf() && !(n.is_missing && n.start_byte == n.end_byte))
        .map(|(i, n)| (n.start_byte, NodeId::new(i)))
        .collect();
    let root = NodeId::new(0);

    raw.into_iter()
        .enumerate()
        .map(|(i, (style, start, end))| {
            let idx = leaves.partition_point(|&(leaf_start, _)| leaf_start < end);
            let attached_to = leaves.get(idx).map(|&(_, id)| id).unwrap_or(root);
            Comment {
                id: CommentId::new(i),
                style,
                range: source.range_of(start, end),
                start_byte: start,
                end_byte: end,
                text: source.slice(start, end).to_string(),
                attached_to,
            }
        })
        .collect()
}
