//! Pattern AST node types for destructuring

use super::*;

/// A binding pattern (arrow function parameters)
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Simple identifier binding
    Identifier(Identifier),

    /// Array destructuring pattern [a, b, c]
    Array(ArrayPattern),

    /// Object destructuring pattern {a, b, c}
    Object(ObjectPattern),

    /// Assignment pattern with default value a = 1
    Assignment(Box<AssignmentPattern>),

    /// Rest parameter ...rest
    Rest(Box<RestElement>),
}

impl Pattern {
    /// Get the span of this pattern
    pub fn span(&self) -> Span {
        match self {
            Pattern::Identifier(id) => id.span,
            Pattern::Array(a) => a.span,
            Pattern::Object(o) => o.span,
            Pattern::Assignment(a) => a.span,
            Pattern::Rest(r) => r.span,
        }
    }

    /// Discriminant tag of this node
    pub fn node_type(&self) -> NodeType {
        match self {
            Pattern::Identifier(_) => NodeType::Identifier,
            Pattern::Array(_) => NodeType::ArrayPattern,
            Pattern::Object(_) => NodeType::ObjectPattern,
            Pattern::Assignment(_) => NodeType::AssignmentPattern,
            Pattern::Rest(_) => NodeType::RestElement,
        }
    }

    /// Get all bound identifiers in this pattern
    pub fn bound_names(&self) -> Vec<&Identifier> {
        let mut names = Vec::new();
        self.collect_bound_names(&mut names);
        names
    }

    fn collect_bound_names<'a>(&'a self, names: &mut Vec<&'a Identifier>) {
        match self {
            Pattern::Identifier(id) => names.push(id),
            Pattern::Array(arr) => {
                for elem in arr.elements.iter().flatten() {
                    elem.collect_bound_names(names);
                }
                if let Some(rest) = &arr.rest {
                    rest.argument.collect_bound_names(names);
                }
            }
            Pattern::Object(obj) => {
                for prop in &obj.properties {
                    prop.value.collect_bound_names(names);
                }
                if let Some(rest) = &obj.rest {
                    rest.argument.collect_bound_names(names);
                }
            }
            Pattern::Assignment(a) => a.left.collect_bound_names(names),
            Pattern::Rest(r) => r.argument.collect_bound_names(names),
        }
    }
}

/// First identifier bound twice across a parameter list
pub fn find_duplicate_binding(params: &[Pattern]) -> Option<&Identifier> {
    let mut seen = rustc_hash::FxHashSet::default();
    params
        .iter()
        .flat_map(|param| param.bound_names())
        .find(|id| !seen.insert(id.name.as_str()))
}

/// Array destructuring pattern
#[derive(Debug, Clone)]
pub struct ArrayPattern {
    /// Pattern elements (None for holes)
    pub elements: Vec<Option<Pattern>>,
    /// Trailing rest element
    pub rest: Option<Box<RestElement>>,
    /// Span in source
    pub span: Span,
}

/// Object destructuring pattern
#[derive(Debug, Clone)]
pub struct ObjectPattern {
    /// Pattern properties
    pub properties: Vec<AssignmentProperty>,
    /// Trailing rest element, always an identifier
    pub rest: Option<Box<RestElement>>,
    /// Span in source
    pub span: Span,
}

/// Property of an object pattern, `{key: value}` or shorthand `{key}`
#[derive(Debug, Clone)]
pub struct AssignmentProperty {
    /// Property key
    pub key: PropertyKey,
    /// Value pattern
    pub value: Pattern,
    /// Is this a shorthand property?
    pub shorthand: bool,
    /// Span in source
    pub span: Span,
}

/// Assignment pattern with default value
#[derive(Debug, Clone)]
pub struct AssignmentPattern {
    /// Left-hand side pattern
    pub left: Pattern,
    /// Default value expression
    pub right: Expression,
    /// Span in source
    pub span: Span,
}

/// Rest element
#[derive(Debug, Clone)]
pub struct RestElement {
    /// Rest argument pattern
    pub argument: Pattern,
    /// Span in source
    pub span: Span,
}
