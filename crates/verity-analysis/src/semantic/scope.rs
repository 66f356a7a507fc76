//! Lexical scopes.

use lasso::Spur;
use smallvec::SmallVec;
use verity_core::types::collections::FxHashMap;
use verity_core::{NodeId, ScopeId, SymbolId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    CompilationUnit,
    /// Body of a named or anonymous type.
    Type,
    Method,
    Block,
    Lambda,
    For,
    Catch,
    Resources,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    /// Node that opens the scope.
    pub node: NodeId,
    pub parent: Option<ScopeId>,
    /// Declarations in declaration order.
    pub symbols: Vec<SymbolId>,
    pub(crate) by_name: FxHashMap<Spur, SmallVec<[SymbolId; 1]>>,
}

impl Scope {
    pub(crate) fn new(id: ScopeId, kind: ScopeKind, node: NodeId, parent: Option<ScopeId>) -> Self {
        Self {
            id,
            kind,
            node,
            parent,
            symbols: Vec::new(),
            by_name: FxHashMap::default(),
        }
    }

    pub(crate) fn declare(&mut self, name: Spur, symbol: SymbolId) {
        self.symbols.push(symbol);
        self.by_name.entry(name).or_default().push(symbol);
    }

    pub(crate) fn named(&self, name: Spur) -> &[SymbolId] {
        self.by_name.get(&name).map(|s| s.as_slice()).unwrap_or(&[])
    }
}
