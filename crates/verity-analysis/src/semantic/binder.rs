//! Two-pass binder.
//!
//! Pass 1 walks the tree once, opening scopes and declaring every symbol, so
//! members are visible throughout their type regardless of order. Pass 2 visits
//! each identifier-like node and resolves it against the scope chain, then the
//! file's imports, then `java.lang`.

use lasso::{Rodeo, Spur};
use verity_core::types::collections::FxHashMap;
use verity_core::{NodeId, ScopeId, SourceFile, SymbolId};

use super::scope::{Scope, ScopeKind};
use super::symbols::{Namespace, Resolution, Symbol, SymbolKind};
use super::SemanticModel;
use crate::syntax::{SyntaxKind, SyntaxTree};

/// Simple names of `java.lang` types that need no import.
const JAVA_LANG: &[&str] = &[
    "ArithmeticException",
    "ArrayIndexOutOfBoundsException",
    "AutoCloseable",
    "Boolean",
    "Byte",
    "CharSequence",
    "Character",
    "Class",
    "ClassCastException",
    "Cloneable",
    "Comparable",
    "Deprecated",
    "Double",
    "Enum",
    "Error",
    "Exception",
    "Float",
    "FunctionalInterface",
    "IllegalArgumentException",
    "IllegalStateException",
    "IndexOutOfBoundsException",
    "Integer",
    "InterruptedException",
    "Iterable",
    "Long",
    "Math",
    "NullPointerException",
    "Number",
    "Object",
    "Override",
    "Record",
    "Runnable",
    "RuntimeException",
    "SafeVarargs",
    "Short",
    "StrictMath",
    "String",
    "StringBuffer",
    "StringBuilder",
    "SuppressWarnings",
    "System",
    "Thread",
    "Throwable",
    "UnsupportedOperationException",
    "Void",
];

enum Step {
    Enter(NodeId),
    Exit,
}

pub(crate) struct Binder<'a> {
    tree: &'a SyntaxTree,
    source: &'a SourceFile,
    names: Rodeo,
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
    node_scopes: Vec<ScopeId>,
    scope_nodes: FxHashMap<NodeId, ScopeId>,
    declared_names: FxHashMap<NodeId, SymbolId>,
    resolutions: FxHashMap<NodeId, Resolution>,
    type_imports: FxHashMap<String, String>,
    static_imports: FxHashMap<String, String>,
}

impl<'a> Binder<'a> {
    pub(crate) fn new(tree: &'a SyntaxTree, source: &'a SourceFile) -> Self {
        Self {
            tree,
            source,
            names: Rodeo::default(),
            scopes: Vec::new(),
            symbols: Vec::new(),
            node_scopes: vec![ScopeId::new(0); tree.len()],
            scope_nodes: FxHashMap::default(),
            declared_names: FxHashMap::default(),
            resolutions: FxHashMap::default(),
            type_imports: FxHashMap::default(),
            static_imports: FxHashMap::default(),
        }
    }

    pub(crate) fn bind(mut self) -> SemanticModel {
        self.collect_imports();
        self.declare_all();
        self.resolve_all();

        tracing::debug!(
            fixture = self.source.name(),
            scopes = self.scopes.len(),
            symbols = self.symbols.len(),
            resolutions = self.resolutions.len(),
            "semantic model built"
        );

        SemanticModel {
            names: self.names.into_reader(),
            scopes: self.scopes,
            symbols: self.symbols,
            node_scopes: self.node_scopes,
            scope_nodes: self.scope_nodes,
            declared_names: self.declared_names,
            resolutions: self.resolutions,
        }
    }

    fn text(&self, id: NodeId) -> &'a str {
        self.tree.text(id, self.source)
    }

    // ---- imports ----

    fn collect_imports(&mut self) {
        let tree = self.tree;
        for import in tree.nodes_of_kind(SyntaxKind::ImportDeclaration) {
            let children = tree.children(import);
            let is_static = children.iter().any(|&c| tree.node(c).grammar_kind == "static");
            let is_wildcard = children.iter().any(|&c| tree.node(c).grammar_kind == "asterisk");
            if is_wildcard {
                continue;
            }
            let Some(path) = children.iter().copied().find(|&c| {
                matches!(tree.kind(c), SyntaxKind::ScopedIdentifier | SyntaxKind::Identifier)
            }) else {
                continue;
            };
            let qualified: String = self.text(path).split_whitespace().collect();
            let Some(simple) = qualified.rsplit('.').next().map(str::to_string) else {
                continue;
            };
            if is_static {
                self.static_imports.insert(simple, qualified);
            } else {
                self.type_imports.insert(simple, qualified);
            }
        }
    }

    // ---- pass 1: scopes and declarations ----

    fn declare_all(&mut self) {
        let root = self.tree.root();
        let unit = self.open_scope(ScopeKind::CompilationUnit, root, None);
        let mut scope_stack = vec![unit];
        let mut stack = vec![Step::Enter(root)];

        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(id) => {
                    let current = scope_stack.last().copied().unwrap_or(unit);
                    self.node_scopes[id.index()] = current;
                    self.declare_in_enclosing(id, current);

                    if id != root {
                        if let Some(kind) = self.scope_kind_opened_by(id) {
                            let inner = self.open_scope(kind, id, Some(current));
                            self.declare_in_opened(id, inner);
                            scope_stack.push(inner);
                            stack.push(Step::Exit);
                        }
                    }
                    stack.extend(
                        self.tree.children(id).iter().rev().map(|&c| Step::Enter(c)),
                    );
                }
                Step::Exit => {
                    scope_stack.pop();
                }
            }
        }
    }

    fn open_scope(&mut self, kind: ScopeKind, node: NodeId, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId::new(self.scopes.len());
        self.scopes.push(Scope::new(id, kind, node, parent));
        self.scope_nodes.insert(node, id);
        id
    }

    fn scope_kind_opened_by(&self, id: NodeId) -> Option<ScopeKind> {
        let kind = self.tree.kind(id);
        match kind {
            k if k.is_type_declaration() => Some(ScopeKind::Type),
            k if k.is_method_like() => Some(ScopeKind::Method),
            // Anonymous class bodies and enum constant bodies.
            SyntaxKind::ClassBody => {
                let parent = self.tree.parent(id).map(|p| self.tree.kind(p));
                matches!(parent, Some(SyntaxKind::NewClass | SyntaxKind::EnumConstant))
                    .then_some(ScopeKind::Type)
            }
            SyntaxKind::Block | SyntaxKind::SwitchBlock => Some(ScopeKind::Block),
            SyntaxKind::LambdaExpression => Some(ScopeKind::Lambda),
            SyntaxKind::ForStatement | SyntaxKind::ForEachStatement => Some(ScopeKind::For),
            SyntaxKind::CatchClause => Some(ScopeKind::Catch),
            SyntaxKind::TryWithResourcesStatement => Some(ScopeKind::Resources),
            _ => None,
        }
    }

    /// Declarations that belong to the scope around `id`.
    fn declare_in_enclosing(&mut self, id: NodeId, scope: ScopeId) {
        let tree = self.tree;
        let field = |name: &str| tree.child_by_field(id, name);
        match tree.kind(id) {
            SyntaxKind::ClassDeclaration | SyntaxKind::LocalClassDeclaration => {
                self.declare_named(SymbolKind::Class, id, field("name"), scope, None, None);
            }
            SyntaxKind::InterfaceDeclaration => {
                self.declare_named(SymbolKind::Interface, id, field("name"), scope, None, None);
            }
            SyntaxKind::EnumDeclaration => {
                self.declare_named(SymbolKind::Enum, id, field("name"), scope, None, None);
            }
            SyntaxKind::RecordDeclaration => {
                self.declare_named(SymbolKind::Record, id, field("name"), scope, None, None);
            }
            SyntaxKind::AnnotationTypeDeclaration => {
                self.declare_named(SymbolKind::Annotation, id, field("name"), scope, None, None);
            }
            SyntaxKind::MethodDeclaration | SyntaxKind::AnnotationTypeElement => {
                self.declare_named(SymbolKind::Method, id, field("name"), scope, field("type"), None);
            }
            SyntaxKind::ConstructorDeclaration | SyntaxKind::CompactConstructorDeclaration => {
                self.declare_named(SymbolKind::Constructor, id, field("name"), scope, None, None);
            }
            SyntaxKind::EnumConstant => {
                self.declare_named(SymbolKind::EnumConstant, id, field("name"), scope, None, None);
            }
            SyntaxKind::TypeParameter => {
                let name = tree.children(id).iter().copied().find(|&c| {
                    matches!(tree.kind(c), SyntaxKind::TypeIdentifier | SyntaxKind::Identifier)
                });
                self.declare_named(SymbolKind::TypeParameter, id, name, scope, None, None);
            }
            SyntaxKind::VariableDeclarator => {
                let parent = tree.parent(id);
                let parent_kind = parent.map(|p| tree.kind(p));
                let kind = match parent_kind {
                    Some(SyntaxKind::FieldDeclaration) => SymbolKind::Field,
                    Some(SyntaxKind::SpreadParameter) => SymbolKind::Parameter,
                    _ => SymbolKind::LocalVariable,
                };
                let type_node = parent.and_then(|p| match parent_kind {
                    Some(SyntaxKind::SpreadParameter) => tree
                        .named_children(p)
                        .find(|&c| !matches!(tree.kind(c), SyntaxKind::Modifiers | SyntaxKind::Annotation)),
                    _ => tree.child_by_field(p, "type"),
                });
                self.declare_named(kind, id, field("name"), scope, type_node, field("value"));
            }
            SyntaxKind::FormalParameter => {
                // Record components are fields of the record.
                let kind = if self.scopes[scope.index()].kind == ScopeKind::Type {
                    SymbolKind::Field
                } else {
                    SymbolKind::Parameter
                };
                self.declare_named(kind, id, field("name"), scope, field("type"), None);
            }
            SyntaxKind::CatchParameter => {
                let type_node = tree
                    .children(id)
                    .iter()
                    .copied()
                    .find(|&c| tree.node(c).grammar_kind == "catch_type");
                self.declare_named(SymbolKind::CatchParameter, id, field("name"), scope, type_node, None);
            }
            SyntaxKind::Resource => {
                self.declare_named(SymbolKind::Resource, id, field("name"), scope, field("type"), field("value"));
            }
            SyntaxKind::InstanceofExpression => {
                self.declare_named(SymbolKind::LocalVariable, id, field("name"), scope, field("right"), None);
            }
            _ => {}
        }
    }

    /// Declarations that live inside the scope `id` itself opens.
    fn declare_in_opened(&mut self, id: NodeId, scope: ScopeId) {
        let tree = self.tree;
        match tree.kind(id) {
            SyntaxKind::ForEachStatement => {
                let name = tree.child_by_field(id, "name");
                let type_node = tree.child_by_field(id, "type");
                self.declare_named(SymbolKind::LocalVariable, id, name, scope, type_node, None);
            }
            SyntaxKind::LambdaExpression => {
                let Some(params) = tree.child_by_field(id, "parameters") else {
                    return;
                };
                match tree.kind(params) {
                    SyntaxKind::Identifier => {
                        self.declare_named(SymbolKind::Parameter, id, Some(params), scope, None, None);
                    }
                    _ if tree.node(params).grammar_kind == "inferred_parameters" => {
                        let names: Vec<NodeId> = tree
                            .named_children(params)
                            .filter(|&c| tree.kind(c) == SyntaxKind::Identifier)
                            .collect();
                        for name in names {
                            self.declare_named(SymbolKind::Parameter, id, Some(name), scope, None, None);
                        }
                    }
                    // formal_parameters: declared as the children are entered.
                    _ => {}
                }
            }
            _ => {}
        }
    }

    fn declare_named(
        &mut self,
        kind: SymbolKind,
        declaration: NodeId,
        name_node: Option<NodeId>,
        scope: ScopeId,
        type_node: Option<NodeId>,
        initializer: Option<NodeId>,
    ) {
        let Some(name_node) = name_node else {
            return;
        };
        let text = self.text(name_node);
        if text.is_empty() || self.tree.node(name_node).is_missing {
            return;
        }
        let name = self.names.get_or_intern(text);
        let id = SymbolId::new(self.symbols.len());
        self.symbols.push(Symbol {
            id,
            kind,
            name,
            declaration,
            name_node,
            scope,
            type_node,
            initializer,
            visible_from: self.tree.node(name_node).start_byte,
            references: Vec::new(),
        });
        self.scopes[scope.index()].declare(name, id);
        self.declared_names.insert(name_node, id);
    }

    // ---- pass 2: resolution ----

    fn resolve_all(&mut self) {
        let tree = self.tree;
        for index in 0..tree.len() {
            let id = NodeId::new(index);
            if !matches!(tree.kind(id), SyntaxKind::Identifier | SyntaxKind::TypeIdentifier) {
                continue;
            }
            if let Some(&symbol) = self.declared_names.get(&id) {
                self.resolutions.insert(id, Resolution::Resolved(symbol));
                continue;
            }
            let Some(resolution) = self.resolve_identifier(id) else {
                continue;
            };
            if let Resolution::Resolved(symbol) = resolution {
                self.symbols[symbol.index()].references.push(id);
            }
            self.resolutions.insert(id, resolution);
        }
    }

    /// `None` for identifiers that are not name uses at all (labels, package
    /// paths, annotation keys).
    fn resolve_identifier(&self, id: NodeId) -> Option<Resolution> {
        let tree = self.tree;
        let node = tree.node(id);
        let name = self.text(id);
        let parent = node.parent?;
        let parent_kind = tree.kind(parent);

        if tree.ancestors(id).any(|a| {
            matches!(
                tree.kind(a),
                SyntaxKind::ImportDeclaration | SyntaxKind::PackageDeclaration
            )
        }) {
            return None;
        }
        match parent_kind {
            SyntaxKind::ScopedIdentifier | SyntaxKind::ScopedTypeIdentifier => return None,
            SyntaxKind::LabeledStatement | SyntaxKind::BreakStatement | SyntaxKind::ContinueStatement => {
                return None
            }
            _ => {}
        }
        if tree.node(parent).grammar_kind == "element_value_pair" && node.field == Some("key") {
            return None;
        }

        let scope = self.node_scopes[id.index()];
        let at = node.start_byte;
        let unresolved = || Resolution::Unresolved(name.to_string());

        let resolution = match (parent_kind, node.field) {
            (SyntaxKind::MethodInvocation, Some("name")) => {
                match tree.child_by_field(parent, "object").map(|o| tree.kind(o)) {
                    None => self
                        .lookup(name, Namespace::Method, scope, at)
                        .map(Resolution::Resolved)
                        .or_else(|| self.external(name, Namespace::Method))
                        .unwrap_or_else(unresolved),
                    Some(SyntaxKind::This) => self
                        .lookup_in_enclosing_type(name, Namespace::Method, scope)
                        .map(Resolution::Resolved)
                        .unwrap_or_else(unresolved),
                    Some(_) => unresolved(),
                }
            }
            (SyntaxKind::FieldAccess, Some("field")) => {
                match tree.child_by_field(parent, "object").map(|o| tree.kind(o)) {
                    Some(SyntaxKind::This) => self
                        .lookup_in_enclosing_type(name, Namespace::Value, scope)
                        .map(Resolution::Resolved)
                        .unwrap_or_else(unresolved),
                    _ => unresolved(),
                }
            }
            (SyntaxKind::MethodReference, _) if tree.named_children(parent).next() != Some(id) => {
                unresolved()
            }
            _ if node.kind == SyntaxKind::TypeIdentifier || parent_kind == SyntaxKind::Annotation => {
                if name == "var" {
                    return None;
                }
                self.lookup(name, Namespace::Type, scope, at)
                    .map(Resolution::Resolved)
                    .or_else(|| self.external(name, Namespace::Type))
                    .unwrap_or_else(unresolved)
            }
            _ => self
                .lookup(name, Namespace::Value, scope, at)
                .or_else(|| self.lookup(name, Namespace::Type, scope, at))
                .map(Resolution::Resolved)
                .or_else(|| self.external(name, Namespace::Value))
                .or_else(|| self.external(name, Namespace::Type))
                .unwrap_or_else(unresolved),
        };
        Some(resolution)
    }

    fn lookup(&self, name: &str, ns: Namespace, from: ScopeId, at: usize) -> Option<SymbolId> {
        let spur = self.names.get(name)?;
        let mut scope = Some(from);
        while let Some(s) = scope {
            if let Some(found) = self.lookup_in(spur, ns, s, at) {
                return Some(found);
            }
            scope = self.scopes[s.index()].parent;
        }
        None
    }

    fn lookup_in(&self, name: Spur, ns: Namespace, scope: ScopeId, at: usize) -> Option<SymbolId> {
        self.scopes[scope.index()]
            .named(name)
            .iter()
            .copied()
            .find(|&sym| {
                let symbol = &self.symbols[sym.index()];
                ns.admits(symbol.kind) && (!symbol.kind.is_flow_scoped() || symbol.visible_from <= at)
            })
    }

    fn lookup_in_enclosing_type(&self, name: &str, ns: Namespace, from: ScopeId) -> Option<SymbolId> {
        let spur = self.names.get(name)?;
        let mut scope = Some(from);
        while let Some(s) = scope {
            if self.scopes[s.index()].kind == ScopeKind::Type {
                return self.lookup_in(spur, ns, s, usize::MAX);
            }
            scope = self.scopes[s.index()].parent;
        }
        None
    }

    fn external(&self, name: &str, ns: Namespace) -> Option<Resolution> {
        let qualified = match ns {
            Namespace::Type => self.type_imports.get(name).cloned().or_else(|| {
                JAVA_LANG
                    .binary_search(&name)
                    .ok()
                    .map(|_| format!("java.lang.{name}"))
            }),
            Namespace::Value | Namespace::Method => self.static_imports.get(name).cloned(),
        };
        qualified.map(Resolution::External)
    }
}
