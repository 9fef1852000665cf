//! Abstract Syntax Tree (AST) types for expressions
//!
//! This module defines the node types produced by the parser. The tree follows the
//! ESTree shapes for the expression subset, with patterns kept in a separate enum so
//! that the grammar reinterpretation between the two is an explicit conversion.

mod display;
mod expr;
mod factory;
mod pattern;

pub use expr::*;
pub use pattern::*;

use crate::error::SourceLocation;
use std::fmt;

/// A span in the source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Start location
    pub start: SourceLocation,
    /// End location
    pub end: SourceLocation,
}

impl Span {
    /// Create a new span
    pub fn new(start: SourceLocation, end: SourceLocation) -> Self {
        Self { start, end }
    }

    /// Merge two spans into one covering both
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: if self.start.offset < other.start.offset {
                self.start
            } else {
                other.start
            },
            end: if self.end.offset > other.end.offset {
                self.end
            } else {
                other.end
            },
        }
    }
}

/// An identifier, used both as a reference and as a binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    /// The name of the identifier
    pub name: String,
    /// Span in source
    pub span: Span,
}

impl Identifier {
    /// Create a new identifier
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// Discriminant of every node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Identifier,
    Literal,
    RegExpLiteral,
    ArrayExpression,
    ObjectExpression,
    Property,
    MemberExpression,
    CallExpression,
    NewExpression,
    BinaryExpression,
    LogicalExpression,
    ConditionalExpression,
    AssignmentExpression,
    ArrowFunctionExpression,
    TemplateLiteral,
    TaggedTemplateExpression,
    UnaryExpression,
    UpdateExpression,
    SequenceExpression,
    SpreadElement,
    ChainExpression,
    ParenthesizedExpression,
    ThisExpression,
    ArrayPattern,
    ObjectPattern,
    AssignmentPattern,
    AssignmentProperty,
    RestElement,
}

impl NodeType {
    /// ESTree name of the node kind
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Identifier => "Identifier",
            NodeType::Literal => "Literal",
            NodeType::RegExpLiteral => "RegExpLiteral",
            NodeType::ArrayExpression => "ArrayExpression",
            NodeType::ObjectExpression => "ObjectExpression",
            NodeType::Property => "Property",
            NodeType::MemberExpression => "MemberExpression",
            NodeType::CallExpression => "CallExpression",
            NodeType::NewExpression => "NewExpression",
            NodeType::BinaryExpression => "BinaryExpression",
            NodeType::LogicalExpression => "LogicalExpression",
            NodeType::ConditionalExpression => "ConditionalExpression",
            NodeType::AssignmentExpression => "AssignmentExpression",
            NodeType::ArrowFunctionExpression => "ArrowFunctionExpression",
            NodeType::TemplateLiteral => "TemplateLiteral",
            NodeType::TaggedTemplateExpression => "TaggedTemplateExpression",
            NodeType::UnaryExpression => "UnaryExpression",
            NodeType::UpdateExpression => "UpdateExpression",
            NodeType::SequenceExpression => "SequenceExpression",
            NodeType::SpreadElement => "SpreadElement",
            NodeType::ChainExpression => "ChainExpression",
            NodeType::ParenthesizedExpression => "ParenthesizedExpression",
            NodeType::ThisExpression => "ThisExpression",
            NodeType::ArrayPattern => "ArrayPattern",
            NodeType::ObjectPattern => "ObjectPattern",
            NodeType::AssignmentPattern => "AssignmentPattern",
            NodeType::AssignmentProperty => "AssignmentProperty",
            NodeType::RestElement => "RestElement",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Property key in object literals and object patterns
#[derive(Debug, Clone)]
pub enum PropertyKey {
    /// Identifier key `{ a: 1 }`
    Identifier(Identifier),
    /// String literal key `{ "a": 1 }`
    String(String),
    /// Number literal key `{ 1: 1 }`
    Number(f64),
    /// Computed key `{ [expr]: 1 }`
    Computed(Box<Expression>),
}

impl PropertyKey {
    /// Whether the key is `[expr]`
    pub fn is_computed(&self) -> bool {
        matches!(self, PropertyKey::Computed(_))
    }

    /// Static name of a non-computed key
    pub fn static_name(&self) -> Option<String> {
        match self {
            PropertyKey::Identifier(id) => Some(id.name.clone()),
            PropertyKey::String(s) => Some(s.clone()),
            PropertyKey::Number(n) => Some(crate::runtime::number_to_string(*n)),
            PropertyKey::Computed(_) => None,
        }
    }
}
