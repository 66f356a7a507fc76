//! Declared symbols, name resolutions, and type references.

use lasso::Spur;
use serde::Serialize;
use verity_core::{NodeId, ScopeId, SymbolId};

/// What a declaration declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SymbolKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
    TypeParameter,
    Method,
    Constructor,
    Field,
    EnumConstant,
    Parameter,
    LocalVariable,
    Resource,
    CatchParameter,
}

impl SymbolKind {
    pub fn is_type(self) -> bool {
        matches!(
            self,
            Self::Class
                | Self::Interface
                | Self::Enum
                | Self::Record
                | Self::Annotation
                | Self::TypeParameter
        )
    }

    pub fn is_method(self) -> bool {
        matches!(self, Self::Method | Self::Constructor)
    }

    /// Variables of any flavour: fields, parameters, locals.
    pub fn is_variable(self) -> bool {
        matches!(
            self,
            Self::Field
                | Self::EnumConstant
                | Self::Parameter
                | Self::LocalVariable
                | Self::Resource
                | Self::CatchParameter
        )
    }

    /// Visible only from its declaration onwards, not from the whole scope.
    pub fn is_flow_scoped(self) -> bool {
        matches!(self, Self::LocalVariable | Self::Resource)
    }
}

/// Name lookup namespace: Java keeps types, values, and methods apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Type,
    Value,
    Method,
}

impl Namespace {
    pub fn admits(self, kind: SymbolKind) -> bool {
        match self {
            Self::Type => kind.is_type(),
            Self::Value => kind.is_variable(),
            Self::Method => kind.is_method(),
        }
    }
}

/// A declaration and every site that refers to it.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub id: SymbolId,
    pub kind: SymbolKind,
    pub name: Spur,
    /// The declaring node (`variable_declarator`, `method_declaration`, ...).
    pub declaration: NodeId,
    pub name_node: NodeId,
    pub scope: ScopeId,
    /// Node holding the declared type, if the declaration spells one out.
    pub type_node: Option<NodeId>,
    /// Initializer expression of a variable.
    pub initializer: Option<NodeId>,
    /// Byte offset from which the name is in scope (flow-scoped kinds only).
    pub visible_from: usize,
    /// Reference sites, in source order. The declaration name is not included.
    pub references: Vec<NodeId>,
}

/// How an identifier-like node was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Resolution {
    Resolved(SymbolId),
    /// Known from an import or `java.lang`, carrying the qualified name.
    External(String),
    /// Best effort failed; the simple name is kept.
    Unresolved(String),
}

impl Resolution {
    pub fn symbol(&self) -> Option<SymbolId> {
        match self {
            Self::Resolved(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::Unresolved(_))
    }
}

/// Static type of a declaration or expression, as far as it can be told.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TypeRef {
    Primitive(String),
    /// A reference type: qualified name for external types, simple name for
    /// types declared in the file.
    Reference(String),
    Array(Box<TypeRef>),
    Null,
    /// A type name that could not be resolved.
    Unresolved(String),
    Unknown,
}

impl TypeRef {
    pub fn is_string(&self) -> bool {
        matches!(self, Self::Reference(name) if name == "java.lang.String")
    }

    /// True when nothing reliable is known about the type.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown | Self::Unresolved(_))
    }
}
