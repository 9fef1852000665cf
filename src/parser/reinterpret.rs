//! Cover grammar reinterpretation
//!
//! Arrow parameters share their prefix with parenthesized expressions, so they are
//! parsed as expressions first and converted here once `=>` shows up.

use crate::ast::*;
use crate::error::{messages, SourceLocation};

/// Why an expression cannot stand in for a binding pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diagnostic {
    /// Message from [`messages`]
    pub message: &'static str,
    /// Location of the offending node
    pub location: SourceLocation,
}

impl Diagnostic {
    fn new(message: &'static str, span: Span) -> Self {
        Self {
            message,
            location: span.start,
        }
    }
}

/// Convert an expression parsed under the cover grammar into a binding pattern
pub fn expression_to_pattern(expr: Expression) -> Result<Pattern, Diagnostic> {
    match expr {
        Expression::Identifier(id) => Ok(Pattern::Identifier(id)),
        Expression::Array(array) => array_to_pattern(array),
        Expression::Object(object) => object_to_pattern(object),
        Expression::Assignment(assign) => {
            let AssignmentExpression {
                operator,
                left,
                right,
                span,
            } = *assign;
            if operator != AssignmentOperator::Assign {
                return Err(Diagnostic::new(messages::INVALID_DESTRUCTURING_TARGET, span));
            }
            let left = match left {
                AssignmentTarget::Identifier(id) => Pattern::Identifier(id),
                AssignmentTarget::Member(m) => {
                    return Err(Diagnostic::new(
                        messages::ILLEGAL_PROPERTY_IN_DECLARATION,
                        m.span,
                    ))
                }
                AssignmentTarget::Pattern(p) => *p,
            };
            Ok(Pattern::Assignment(Box::new(AssignmentPattern { left, right, span })))
        }
        Expression::Member(m) => Err(Diagnostic::new(
            messages::ILLEGAL_PROPERTY_IN_DECLARATION,
            m.span,
        )),
        other => Err(Diagnostic::new(
            messages::INVALID_DESTRUCTURING_TARGET,
            other.span(),
        )),
    }
}

/// Convert the argument of `...x` into a rest element
pub fn spread_to_rest(spread: SpreadElement) -> Result<RestElement, Diagnostic> {
    let argument = expression_to_pattern(spread.argument)?;
    if let Pattern::Assignment(a) = &argument {
        return Err(Diagnostic::new(messages::INVALID_DESTRUCTURING_TARGET, a.span));
    }
    Ok(RestElement {
        argument,
        span: spread.span,
    })
}

fn array_to_pattern(array: ArrayExpression) -> Result<Pattern, Diagnostic> {
    let count = array.elements.len();
    let mut elements = Vec::with_capacity(count);
    let mut rest = None;

    for (i, element) in array.elements.into_iter().enumerate() {
        match element {
            None => elements.push(None),
            Some(Expression::Spread(spread)) => {
                if i + 1 != count {
                    return Err(Diagnostic::new(
                        messages::REST_PARAMETER_MUST_BE_LAST,
                        spread.span,
                    ));
                }
                if let Some(comma) = array.comma_after_spread {
                    return Err(Diagnostic::new(messages::REST_PARAMETER_MUST_BE_LAST, comma));
                }
                rest = Some(Box::new(spread_to_rest(*spread)?));
            }
            Some(expr) => elements.push(Some(expression_to_pattern(expr)?)),
        }
    }

    Ok(Pattern::Array(ArrayPattern {
        elements,
        rest,
        span: array.span,
    }))
}

fn object_to_pattern(object: ObjectExpression) -> Result<Pattern, Diagnostic> {
    let count = object.properties.len();
    let mut properties = Vec::with_capacity(count);
    let mut rest = None;

    for (i, property) in object.properties.into_iter().enumerate() {
        match property {
            ObjectProperty::Property(prop) => {
                let value = expression_to_pattern(prop.value)?;
                properties.push(AssignmentProperty {
                    key: prop.key,
                    value,
                    shorthand: prop.shorthand,
                    span: prop.span,
                });
            }
            ObjectProperty::Spread(spread) => {
                if i + 1 != count {
                    return Err(Diagnostic::new(
                        messages::REST_PARAMETER_MUST_BE_LAST,
                        spread.span,
                    ));
                }
                if !matches!(spread.argument, Expression::Identifier(_)) {
                    return Err(Diagnostic::new(
                        messages::INVALID_DESTRUCTURING_TARGET,
                        spread.argument.span(),
                    ));
                }
                rest = Some(Box::new(spread_to_rest(spread)?));
            }
        }
    }

    Ok(Pattern::Object(ObjectPattern {
        properties,
        rest,
        span: object.span,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_and_default() {
        let pattern = expression_to_pattern(Expression::identifier("a")).unwrap();
        assert_eq!(pattern.node_type(), NodeType::Identifier);

        let assign = Expression::assignment(
            AssignmentOperator::Assign,
            Expression::identifier("a"),
            Expression::number(1.0),
        )
        .unwrap();
        let pattern = expression_to_pattern(assign).unwrap();
        assert_eq!(pattern.node_type(), NodeType::AssignmentPattern);
        assert_eq!(pattern.to_string(), "a = 1");
    }

    #[test]
    fn test_nested_destructuring() {
        let key = PropertyKey::Identifier(Identifier::new("b", Span::default()));
        let object = Expression::object(vec![
            Expression::property(
                PropertyKey::Identifier(Identifier::new("a", Span::default())),
                None,
            )
            .unwrap(),
            Expression::property(
                key,
                Some(Expression::array(vec![
                    Some(Expression::identifier("c")),
                    Some(Expression::spread(Expression::identifier("d"))),
                ])),
            )
            .unwrap(),
        ]);
        let pattern = expression_to_pattern(object).unwrap();
        assert_eq!(pattern.to_string(), "{ a, b: [c, ...d] }");
    }

    #[test]
    fn test_rejections() {
        let err = expression_to_pattern(Expression::number(1.0)).unwrap_err();
        assert_eq!(err.message, messages::INVALID_DESTRUCTURING_TARGET);

        let member = Expression::member(
            Expression::identifier("a"),
            Expression::identifier("b"),
            false,
            false,
        )
        .unwrap();
        let err = expression_to_pattern(member).unwrap_err();
        assert_eq!(err.message, messages::ILLEGAL_PROPERTY_IN_DECLARATION);

        let compound = Expression::assignment(
            AssignmentOperator::AddAssign,
            Expression::identifier("a"),
            Expression::number(1.0),
        )
        .unwrap();
        let err = expression_to_pattern(compound).unwrap_err();
        assert_eq!(err.message, messages::INVALID_DESTRUCTURING_TARGET);

        let array = Expression::array(vec![
            Some(Expression::spread(Expression::identifier("a"))),
            Some(Expression::identifier("b")),
        ]);
        let err = expression_to_pattern(array).unwrap_err();
        assert_eq!(err.message, messages::REST_PARAMETER_MUST_BE_LAST);
    }
}
