//! Static types of declarations and expressions, as far as the file tells.
//!
//! Anything that would need classpath knowledge (method return types, inherited
//! fields) is `TypeRef::Unknown`; callers abstain rather than guess.

use verity_core::{NodeId, SourceFile, SymbolId};

use super::symbols::{Resolution, SymbolKind, TypeRef};
use super::SemanticModel;
use crate::syntax::{SyntaxKind, SyntaxTree};

/// Bound on `var` inference chains.
const MAX_DEPTH: u8 = 8;

const STRING: &str = "java.lang.String";

/// Typing queries over a tree and its semantic model.
#[derive(Clone, Copy)]
pub struct Typer<'a> {
    tree: &'a SyntaxTree,
    source: &'a SourceFile,
    model: &'a SemanticModel,
}

impl<'a> Typer<'a> {
    pub fn new(tree: &'a SyntaxTree, source: &'a SourceFile, model: &'a SemanticModel) -> Self {
        Self { tree, source, model }
    }

    pub fn expression_type(&self, node: NodeId) -> TypeRef {
        self.expression(node, 0)
    }

    pub fn symbol_type(&self, symbol: SymbolId) -> TypeRef {
        self.symbol(symbol, 0)
    }

    /// Type spelled by a type node (`int`, `String[]`, `List<T>`, ...).
    pub fn type_of_type_node(&self, node: NodeId) -> TypeRef {
        let tree = self.tree;
        match tree.kind(node) {
            SyntaxKind::PrimitiveType => TypeRef::Primitive(self.text(node).to_string()),
            SyntaxKind::ArrayType => match tree.child_by_field(node, "element") {
                Some(element) => TypeRef::Array(Box::new(self.type_of_type_node(element))),
                None => TypeRef::Unknown,
            },
            SyntaxKind::TypeIdentifier => match self.model.resolution(node) {
                Some(Resolution::Resolved(symbol)) => {
                    TypeRef::Reference(self.model.name(*symbol).to_string())
                }
                Some(Resolution::External(qualified)) => TypeRef::Reference(qualified.clone()),
                Some(Resolution::Unresolved(name)) => TypeRef::Unresolved(name.clone()),
                None => TypeRef::Unknown,
            },
            SyntaxKind::ScopedTypeIdentifier => {
                TypeRef::Reference(self.text(node).split_whitespace().collect())
            }
            SyntaxKind::GenericType => tree
                .named_children(node)
                .find(|&c| {
                    matches!(
                        tree.kind(c),
                        SyntaxKind::TypeIdentifier | SyntaxKind::ScopedTypeIdentifier
                    )
                })
                .map(|c| self.type_of_type_node(c))
                .unwrap_or(TypeRef::Unknown),
            // catch_type: a single alternative has a type, a union does not.
            _ => {
                let alternatives: Vec<NodeId> = tree.named_children(node).collect();
                match alternatives.as_slice() {
                    [single] if tree.node(node).grammar_kind == "catch_type" => {
                        self.type_of_type_node(*single)
                    }
                    _ => TypeRef::Unknown,
                }
            }
        }
    }

    fn text(&self, node: NodeId) -> &'a str {
        self.tree.text(node, self.source)
    }

    fn symbol(&self, id: SymbolId, depth: u8) -> TypeRef {
        if depth > MAX_DEPTH {
            return TypeRef::Unknown;
        }
        let symbol = self.model.symbol(id);
        if symbol.kind.is_type() {
            return TypeRef::Reference(self.model.name(id).to_string());
        }
        if !symbol.kind.is_variable() && symbol.kind != SymbolKind::Method {
            return TypeRef::Unknown;
        }
        match symbol.type_node {
            Some(t) if self.text(t) == "var" => symbol
                .initializer
                .map(|init| self.expression(init, depth + 1))
                .unwrap_or(TypeRef::Unknown),
            Some(t) => self.type_of_type_node(t),
            None => TypeRef::Unknown,
        }
    }

    fn expression(&self, node: NodeId, depth: u8) -> TypeRef {
        if depth > MAX_DEPTH {
            return TypeRef::Unknown;
        }
        let tree = self.tree;
        match tree.kind(node) {
            SyntaxKind::StringLiteral => TypeRef::Reference(STRING.to_string()),
            SyntaxKind::NumberLiteral => TypeRef::Primitive(number_type(self.text(node)).to_string()),
            SyntaxKind::CharLiteral => TypeRef::Primitive("char".to_string()),
            SyntaxKind::BooleanLiteral => TypeRef::Primitive("boolean".to_string()),
            SyntaxKind::NullLiteral => TypeRef::Null,
            SyntaxKind::Identifier => match self.model.resolution(node) {
                Some(Resolution::Resolved(symbol))
                    if self.model.symbol(*symbol).kind.is_variable() =>
                {
                    self.symbol(*symbol, depth + 1)
                }
                _ => TypeRef::Unknown,
            },
            SyntaxKind::FieldAccess => {
                let field = tree.child_by_field(node, "field");
                match field.and_then(|f| self.model.symbol_at(f)) {
                    Some(symbol) => self.symbol(symbol, depth + 1),
                    None => TypeRef::Unknown,
                }
            }
            SyntaxKind::ParenthesizedExpression => tree
                .named_children(node)
                .next()
                .map(|inner| self.expression(inner, depth + 1))
                .unwrap_or(TypeRef::Unknown),
            SyntaxKind::NewClass | SyntaxKind::CastExpression => tree
                .child_by_field(node, "type")
                .map(|t| self.type_of_type_node(t))
                .unwrap_or(TypeRef::Unknown),
            SyntaxKind::AssignmentExpression => tree
                .child_by_field(node, "left")
                .map(|left| self.expression(left, depth + 1))
                .unwrap_or(TypeRef::Unknown),
            SyntaxKind::InstanceofExpression => TypeRef::Primitive("boolean".to_string()),
            SyntaxKind::BinaryExpression => self.binary(node, depth),
            SyntaxKind::TernaryExpression => {
                let branch = |name| {
                    tree.child_by_field(node, name)
                        .map(|b| self.expression(b, depth + 1))
                        .unwrap_or(TypeRef::Unknown)
                };
                let (then, otherwise) = (branch("consequence"), branch("alternative"));
                if then == otherwise {
                    then
                } else {
                    TypeRef::Unknown
                }
            }
            SyntaxKind::This => tree
                .ancestors(node)
                .find(|&a| tree.kind(a).is_type_declaration())
                .and_then(|decl| tree.child_by_field(decl, "name"))
                .map(|name| TypeRef::Reference(self.text(name).to_string()))
                .unwrap_or(TypeRef::Unknown),
            _ => TypeRef::Unknown,
        }
    }

    fn binary(&self, node: NodeId, depth: u8) -> TypeRef {
        let tree = self.tree;
        let operator = tree
            .child_by_field(node, "operator")
            .map(|op| tree.node(op).grammar_kind)
            .unwrap_or("");
        match operator {
            "==" | "!=" | "<" | ">" | "<=" | ">=" | "&&" | "||" => {
                TypeRef::Primitive("boolean".to_string())
            }
            _ => {
                let side = |name| {
                    tree.child_by_field(node, name)
                        .map(|s| self.expression(s, depth + 1))
                        .unwrap_or(TypeRef::Unknown)
                };
                let (left, right) = (side("left"), side("right"));
                if operator == "+" && (left.is_string() || right.is_string()) {
                    TypeRef::Reference(STRING.to_string())
                } else if left == right {
                    left
                } else {
                    TypeRef::Unknown
                }
            }
        }
    }
}

fn number_type(literal: &str) -> &'static str {
    let lower = literal.to_ascii_lowercase();
    let is_hex = lower.starts_with("0x");
    if lower.ends_with('l') {
        "long"
    } else if !is_hex && lower.ends_with('f') {
        "float"
    } else if (!is_hex && (lower.contains('.') || lower.contains('e') || lower.ends_with('d')))
        || (is_hex && lower.contains('p'))
    {
        "double"
    } else {
        "int"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_literal_types() {
        assert_eq!(number_type("42"), "int");
        assert_eq!(number_type("42L"), "long");
        assert_eq!(number_type("1.5f"), "float");
        assert_eq!(number_type("1e3"), "double");
        assert_eq!(number_type("0xFF"), "int");
        assert_eq!(number_type("0x1p3"), "double");
    }
}
