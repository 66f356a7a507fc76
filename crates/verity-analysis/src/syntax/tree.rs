//! Arena-backed syntax tree.
//!
//! All nodes live in one `Vec` owned by the tree; children, parents, and comment
//! attachments are `NodeId` indices. Nodes are stored in pre-order, so a node's
//! id is always smaller than the ids of its descendants.

use serde::Serialize;
use smallvec::SmallVec;
use verity_core::types::collections::FxHashMap;
use verity_core::{CommentId, NodeId, Position, SourceFile, TextRange};

use super::kind::SyntaxKind;

/// One syntactic construct.
#[derive(Debug, Clone, Serialize)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    /// Kind string from the grammar (`"if_statement"`, `"("`, ...).
    pub grammar_kind: &'static str,
    /// Grammar field this node fills in its parent (`"condition"`, `"body"`, ...).
    pub field: Option<&'static str>,
    pub range: TextRange,
    pub start_byte: usize,
    pub end_byte: usize,
    pub parent: Option<NodeId>,
    pub children: SmallVec<[NodeId; 4]>,
    pub is_named: bool,
    /// Zero-width node the parser inserted to recover from an error.
    pub is_missing: bool,
}

impl SyntaxNode {
    /// True when the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommentStyle {
    Line,
    Block,
}

/// A comment, kept outside the node tree and attached to the next token.
#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub style: CommentStyle,
    pub range: TextRange,
    pub start_byte: usize,
    pub end_byte: usize,
    pub text: String,
    pub attached_to: NodeId,
}

/// A region the parser could not make sense of.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRegion {
    pub node: NodeId,
    pub range: TextRange,
    /// True for an inserted (missing) token, false for skipped input.
    pub missing: bool,
}

#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source_name: String,
    pub(crate) nodes: Vec<SyntaxNode>,
    pub(crate) comments: Vec<Comment>,
    pub(crate) trivia: FxHashMap<NodeId, SmallVec<[CommentId; 1]>>,
    pub(crate) errors: Vec<ErrorRegion>,
}

impl SyntaxTree {
    pub(crate) fn from_parts(
        source_name: String,
        nodes: Vec<SyntaxNode>,
        comments: Vec<Comment>,
        errors: Vec<ErrorRegion>,
    ) -> Self {
        let mut trivia: FxHashMap<NodeId, SmallVec<[CommentId; 1]>> = FxHashMap::default();
        for comment in &comments {
            trivia.entry(comment.attached_to).or_default().push(comment.id);
        }
        Self {
            source_name,
            nodes,
            comments,
            trivia,
            errors,
        }
    }

    /// Name of the file this tree was parsed from.
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// The `program` node.
    pub fn root(&self) -> NodeId {
        NodeId::new(0)
    }

    /// Number of nodes, named and anonymous.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True only for a tree with no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Panics on an id that did not come from this tree.
    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    /// `None` for an id outside this tree.
    pub fn get(&self, id: NodeId) -> Option<&SyntaxNode> {
        self.nodes.get(id.index())
    }

    /// Kind of `id`.
    pub fn kind(&self, id: NodeId) -> SyntaxKind {
        self.node(id).kind
    }

    /// Source range of `id`.
    pub fn range(&self, id: NodeId) -> TextRange {
        self.node(id).range
    }

    /// `None` for the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// All children of `id`, anonymous tokens included, in source order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Children of `id` that are named grammar nodes.
    pub fn named_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&c| self.node(c).is_named)
    }

    /// First child filling the grammar field `field`.
    pub fn child_by_field(&self, id: NodeId, field: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.node(c).field == Some(field))
    }

    /// Every child filling the grammar field `field`.
    pub fn children_by_field<'a>(
        &'a self,
        id: NodeId,
        field: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&c| self.node(c).field == Some(field))
    }

    /// First direct child of `kind`.
    pub fn first_child_of_kind(&self, id: NodeId, kind: SyntaxKind) -> Option<NodeId> {
        self.children(id).iter().copied().find(|&c| self.kind(c) == kind)
    }

    fn sibling_index(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let idx = self.children(parent).iter().position(|&c| c == id)?;
        Some((parent, idx))
    }

    /// Following sibling under the same parent.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, idx) = self.sibling_index(id)?;
        self.children(parent).get(idx + 1).copied()
    }

    /// Preceding sibling under the same parent.
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, idx) = self.sibling_index(id)?;
        idx.checked_sub(1).map(|i| self.children(parent)[i])
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// Nearest strict ancestor satisfying `pred`.
    pub fn find_ancestor(&self, id: NodeId, pred: impl Fn(SyntaxKind) -> bool) -> Option<NodeId> {
        self.ancestors(id).find(|&a| pred(self.kind(a)))
    }

    /// `id` and everything below it, in pre-order.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![id],
        }
    }

    /// Every node of `kind`, in pre-order.
    pub fn nodes_of_kind(&self, kind: SyntaxKind) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, n)| n.kind == kind)
            .map(|(i, _)| NodeId::new(i))
    }

    /// Smallest node whose range contains `pos`.
    pub fn node_at(&self, pos: Position) -> Option<NodeId> {
        let mut current = self.root();
        if !self.range(current).contains_position(pos) {
            return None;
        }
        'descend: loop {
            for &child in self.children(current) {
                if self.range(child).contains_position(pos) {
                    current = child;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }

    /// Source text covered by `id`.
    pub fn text<'s>(&self, id: NodeId, source: &'s SourceFile) -> &'s str {
        let node = self.node(id);
        source.slice(node.start_byte, node.end_byte)
    }

    /// Every comment in the file, in source order.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Panics on an id that did not come from this tree.
    pub fn comment(&self, id: CommentId) -> &Comment {
        &self.comments[id.index()]
    }

    /// Comments attached to `id` (those immediately preceding it).
    pub fn trivia_of(&self, id: NodeId) -> impl Iterator<Item = &Comment> + '_ {
        self.trivia
            .get(&id)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .map(move |&c| self.comment(c))
    }

    /// Regions the parser recovered from.
    pub fn errors(&self) -> &[ErrorRegion] {
        &self.errors
    }

    /// True when the parse needed any recovery.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Checks the range invariants: children inside parents, siblings disjoint.
    pub fn check_ranges(&self) -> Result<(), String> {
        for (i, node) in self.nodes.iter().enumerate() {
            let mut previous: Option<&SyntaxNode> = None;
            for &child in &node.children {
                let c = self.node(child);
                if !node.range.contains(&c.range) {
                    return Err(format!(
                        "node {} {} does not contain child {} {}",
                        i,
                        node.range,
                        child.index(),
                        c.range
                    ));
                }
                if let Some(prev) = previous {
                    if prev.end_byte > c.start_byte {
                        return Err(format!(
                            "children of node {} overlap at {} and {}",
                            i, prev.range, c.range
                        ));
                    }
                }
                previous = Some(c);
            }
        }
        Ok(())
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
