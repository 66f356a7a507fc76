//! Best-effort symbol layer over the syntax tree.
//!
//! Scopes, declarations, and a resolution for every identifier-like node. Names
//! that cannot be bound carry `Resolution::Unresolved`; that is a state rules
//! inspect, never an error.

mod binder;
pub mod scope;
pub mod symbols;
pub mod typing;

use lasso::RodeoReader;
use verity_core::types::collections::FxHashMap;
use verity_core::{NodeId, ScopeId, SourceFile, SymbolId};

use crate::syntax::SyntaxTree;

pub use scope::{Scope, ScopeKind};
pub use symbols::{Namespace, Resolution, Symbol, SymbolKind, TypeRef};

/// Read-only semantic view of one fixture.
#[derive(Debug)]
pub struct SemanticModel {
    names: RodeoReader,
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
    node_scopes: Vec<ScopeId>,
    scope_nodes: FxHashMap<NodeId, ScopeId>,
    declared_names: FxHashMap<NodeId, SymbolId>,
    resolutions: FxHashMap<NodeId, Resolution>,
}

impl SemanticModel {
    /// Bind every declaration and reference in `tree`.
    pub fn build(tree: &SyntaxTree, source: &SourceFile) -> Self {
        binder::Binder::new(tree, source).bind()
    }

    /// All symbols, indexed by `SymbolId`.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Panics on an id from another model.
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    /// Interned name of symbol `id`.
    pub fn name(&self, id: SymbolId) -> &str {
        self.names.resolve(&self.symbol(id).name)
    }

    /// All scopes, indexed by `ScopeId`; the compilation unit first.
    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Panics on an id from another model.
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    /// Innermost scope the node sits in. A scope-opening node belongs to the
    /// scope around it, not the one it opens.
    pub fn scope_of(&self, node: NodeId) -> ScopeId {
        self.node_scopes
            .get(node.index())
            .copied()
            .unwrap_or_else(|| ScopeId::new(0))
    }

    /// Scope opened by `node`, if it opens one.
    pub fn scope_opened_by(&self, node: NodeId) -> Option<ScopeId> {
        self.scope_nodes.get(&node).copied()
    }

    /// How the identifier `node` resolved, if it was bound.
    pub fn resolution(&self, node: NodeId) -> Option<&Resolution> {
        self.resolutions.get(&node)
    }

    /// Symbol an identifier refers to (or declares).
    pub fn symbol_at(&self, node: NodeId) -> Option<SymbolId> {
        self.resolution(node).and_then(Resolution::symbol)
    }

    /// Symbol whose declaration name is `node`.
    pub fn declared_by(&self, name_node: NodeId) -> Option<SymbolId> {
        self.declared_names.get(&name_node).copied()
    }

    /// Symbols of `kind`, in declaration order.
    pub fn symbols_of_kind(&self, kind: SymbolKind) -> impl Iterator<Item = &Symbol> + '_ {
        self.symbols.iter().filter(move |s| s.kind == kind)
    }

    /// Symbols declared with `name`, in declaration order.
    pub fn lookup_name(&self, name: &str) -> Vec<SymbolId> {
        match self.names.get(name) {
            Some(spur) => self
                .symbols
                .iter()
                .filter(|s| s.name == spur)
                .map(|s| s.id)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Number of identifiers that resolved to nothing.
    pub fn unresolved_count(&self) -> usize {
        self.resolutions.values().filter(|r| r.is_unresolved()).count()
    }
}
