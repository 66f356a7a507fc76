//! Node kind tags.
//!
//! Grammar node kinds are folded into one closed enum so rules subscribe to a
//! fixed set of tags instead of matching grammar strings. The raw grammar kind
//! stays available on every node for anything the enum does not distinguish.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SyntaxKind {
    CompilationUnit,
    PackageDeclaration,
    ImportDeclaration,
    // Type declarations
    ClassDeclaration,
    InterfaceDeclaration,
    EnumDeclaration,
    RecordDeclaration,
    AnnotationTypeDeclaration,
    ClassBody,
    EnumConstant,
    AnnotationTypeElement,
    // Members
    MethodDeclaration,
    ConstructorDeclaration,
    CompactConstructorDeclaration,
    StaticInitializer,
    FieldDeclaration,
    FormalParameters,
    FormalParameter,
    SpreadParameter,
    ReceiverParameter,
    TypeParameters,
    TypeParameter,
    Modifiers,
    Annotation,
    // Statements
    Block,
    LocalVariableDeclaration,
    VariableDeclarator,
    ExpressionStatement,
    IfStatement,
    ForStatement,
    ForEachStatement,
    WhileStatement,
    DoStatement,
    Switch,
    SwitchBlock,
    SwitchCase,
    SwitchLabel,
    TryStatement,
    TryWithResourcesStatement,
    ResourceSpecification,
    Resource,
    CatchClause,
    CatchParameter,
    FinallyClause,
    SynchronizedStatement,
    ReturnStatement,
    ThrowStatement,
    BreakStatement,
    ContinueStatement,
    LabeledStatement,
    YieldStatement,
    AssertStatement,
    EmptyStatement,
    ExplicitConstructorInvocation,
    LocalClassDeclaration,
    // Expressions
    AssignmentExpression,
    BinaryExpression,
    UnaryExpression,
    UpdateExpression,
    TernaryExpression,
    LambdaExpression,
    MethodReference,
    CastExpression,
    InstanceofExpression,
    MethodInvocation,
    ArgumentList,
    NewClass,
    NewArray,
    ArrayInitializer,
    ArrayAccess,
    FieldAccess,
    ParenthesizedExpression,
    ClassLiteral,
    This,
    Super,
    Identifier,
    // Literals
    StringLiteral,
    NumberLiteral,
    CharLiteral,
    BooleanLiteral,
    NullLiteral,
    // Types
    TypeIdentifier,
    ScopedTypeIdentifier,
    GenericType,
    ArrayType,
    PrimitiveType,
    TypeArguments,
    ScopedIdentifier,
    // Recovery and leftovers
    Error,
    /// Anonymous grammar token (punctuation, keyword, operator).
    Token,
    /// Named grammar node with no dedicated tag.
    Other,
}

impl SyntaxKind {
    /// Maps a tree-sitter Java node kind to a tag.
    pub fn from_grammar(kind: &str, named: bool) -> Self {
        if !named {
            return Self::Token;
        }
        match kind {
            "program" => Self::CompilationUnit,
            "package_declaration" => Self::PackageDeclaration,
            "import_declaration" => Self::ImportDeclaration,
            "class_declaration" => Self::ClassDeclaration,
            "interface_declaration" => Self::InterfaceDeclaration,
            "enum_declaration" => Self::EnumDeclaration,
            "record_declaration" => Self::RecordDeclaration,
            "annotation_type_declaration" => Self::AnnotationTypeDeclaration,
            "class_body" | "interface_body" | "enum_body" | "annotation_type_body" => {
                Self::ClassBody
            }
            "enum_constant" => Self::EnumConstant,
            "annotation_type_element_declaration" => Self::AnnotationTypeElement,
            "method_declaration" => Self::MethodDeclaration,
            "constructor_declaration" => Self::ConstructorDeclaration,
            "compact_constructor_declaration" => Self::CompactConstructorDeclaration,
            "static_initializer" => Self::StaticInitializer,
            "field_declaration" | "constant_declaration" => Self::FieldDeclaration,
            "formal_parameters" => Self::FormalParameters,
            "formal_parameter" => Self::FormalParameter,
            "spread_parameter" => Self::SpreadParameter,
            "receiver_parameter" => Self::ReceiverParameter,
            "type_parameters" => Self::TypeParameters,
            "type_parameter" => Self::TypeParameter,
            "modifiers" => Self::Modifiers,
            "annotation" | "marker_annotation" => Self::Annotation,
            "block" | "constructor_body" => Self::Block,
            "local_variable_declaration" => Self::LocalVariableDeclaration,
            "variable_declarator" => Self::VariableDeclarator,
            "expression_statement" => Self::ExpressionStatement,
            "if_statement" => Self::IfStatement,
            "for_statement" => Self::ForStatement,
            "enhanced_for_statement" => Self::ForEachStatement,
            "while_statement" => Self::WhileStatement,
            "do_statement" => Self::DoStatement,
            "switch_expression" | "switch_statement" => Self::Switch,
            "switch_block" => Self::SwitchBlock,
            "switch_block_statement_group" | "switch_rule" => Self::SwitchCase,
            "switch_label" => Self::SwitchLabel,
            "try_statement" => Self::TryStatement,
            "try_with_resources_statement" => Self::TryWithResourcesStatement,
            "resource_specification" => Self::ResourceSpecification,
            "resource" => Self::Resource,
            "catch_clause" => Self::CatchClause,
            "catch_formal_parameter" => Self::CatchParameter,
            "finally_clause" => Self::FinallyClause,
            "synchronized_statement" => Self::SynchronizedStatement,
            "return_statement" => Self::ReturnStatement,
            "throw_statement" => Self::ThrowStatement,
            "break_statement" => Self::BreakStatement,
            "continue_statement" => Self::ContinueStatement,
            "labeled_statement" => Self::LabeledStatement,
            "yield_statement" => Self::YieldStatement,
            "assert_statement" => Self::AssertStatement,
            "explicit_constructor_invocation" => Self::ExplicitConstructorInvocation,
            "local_class_declaration" => Self::LocalClassDeclaration,
            "assignment_expression" => Self::AssignmentExpression,
            "binary_expression" => Self::BinaryExpression,
            "unary_expression" => Self::UnaryExpression,
            "update_expression" => Self::UpdateExpression,
            "ternary_expression" => Self::TernaryExpression,
            "lambda_expression" => Self::LambdaExpression,
            "method_reference" => Self::MethodReference,
            "cast_expression" => Self::CastExpression,
            "instanceof_expression" => Self::InstanceofExpression,
            "method_invocation" => Self::MethodInvocation,
            "argument_list" => Self::ArgumentList,
            "object_creation_expression" => Self::NewClass,
            "array_creation_expression" => Self::NewArray,
            "array_initializer" => Self::ArrayInitializer,
            "array_access" => Self::ArrayAccess,
            "field_access" => Self::FieldAccess,
            "parenthesized_expression" => Self::ParenthesizedExpression,
            "class_literal" => Self::ClassLiteral,
            "this" => Self::This,
            "super" => Self::Super,
            "identifier" => Self::Identifier,
            "string_literal" | "text_block" => Self::StringLiteral,
            "decimal_integer_literal"
            | "hex_integer_literal"
            | "octal_integer_literal"
            | "binary_integer_literal"
            | "decimal_floating_point_literal"
            | "hex_floating_point_literal" => Self::NumberLiteral,
            "character_literal" => Self::CharLiteral,
            "true" | "false" => Self::BooleanLiteral,
            "null_literal" => Self::NullLiteral,
            "type_identifier" => Self::TypeIdentifier,
            "scoped_type_identifier" => Self::ScopedTypeIdentifier,
            "generic_type" => Self::GenericType,
            "array_type" => Self::ArrayType,
            "integral_type" | "floating_point_type" | "boolean_type" | "void_type" => {
                Self::PrimitiveType
            }
            "type_arguments" => Self::TypeArguments,
            "scoped_identifier" => Self::ScopedIdentifier,
            "ERROR" => Self::Error,
            _ => Self::Other,
        }
    }

    pub fn is_type_declaration(self) -> bool {
        matches!(
            self,
            Self::ClassDeclaration
                | Self::InterfaceDeclaration
                | Self::EnumDeclaration
                | Self::RecordDeclaration
                | Self::AnnotationTypeDeclaration
        )
    }

    pub fn is_method_like(self) -> bool {
        matches!(
            self,
            Self::MethodDeclaration
                | Self::ConstructorDeclaration
                | Self::CompactConstructorDeclaration
        )
    }

    pub fn is_loop(self) -> bool {
        matches!(
            self,
            Self::ForStatement | Self::ForEachStatement | Self::WhileStatement | Self::DoStatement
        )
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::StringLiteral
                | Self::NumberLiteral
                | Self::CharLiteral
                | Self::BooleanLiteral
                | Self::NullLiteral
        )
    }

    pub fn is_primitive_type(self) -> bool {
        self == Self::PrimitiveType
    }
}

/// Grammar kinds that are comments; these become trivia, not tree nodes.
pub fn is_comment_kind(kind: &str) -> bool {
    matches!(kind, "line_comment" | "block_comment" | "comment")
}
