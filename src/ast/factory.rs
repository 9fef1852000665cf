//! Builder API for synthesizing trees without a parser
//!
//! Every node kind has an associated constructor. Builders that can violate a tree
//! invariant (assignment targets, parameter lists, template shapes) return `Result`.
//! Binary and logical builders wrap their result in a parenthesized node so the
//! printed form keeps the grouping the caller built, whatever it is embedded in.

use super::*;
use crate::error::{messages, Error, Result};
use crate::lexer::{RegexFlags, RegexLiteral};
use crate::parser::reinterpret::expression_to_pattern;
use num_bigint::BigInt;

impl Expression {
    /// `name`
    pub fn identifier(name: impl Into<String>) -> Expression {
        Expression::Identifier(Identifier::new(name, Span::default()))
    }

    /// `null`
    pub fn null() -> Expression {
        Expression::literal(LiteralValue::Null)
    }

    /// `true` / `false`
    pub fn boolean(value: bool) -> Expression {
        Expression::literal(LiteralValue::Boolean(value))
    }

    /// Numeric literal
    pub fn number(value: f64) -> Expression {
        Expression::literal(LiteralValue::Number(value))
    }

    /// BigInt literal
    pub fn bigint(value: impl Into<BigInt>) -> Expression {
        Expression::literal(LiteralValue::BigInt(value.into()))
    }

    /// String literal
    pub fn string(value: impl Into<String>) -> Expression {
        Expression::literal(LiteralValue::String(value.into()))
    }

    /// Any literal value
    pub fn literal(value: LiteralValue) -> Expression {
        Expression::Literal(Literal {
            value,
            span: Span::default(),
        })
    }

    /// `/pattern/flags`
    pub fn regex(pattern: &str, flags: &str) -> Result<Expression> {
        let flags =
            RegexFlags::parse(flags).ok_or_else(|| Error::syntax_error(messages::INVALID_REGEXP_FLAGS))?;
        let value = RegexLiteral::compile(pattern, flags).map_err(|e| {
            Error::syntax_error(format!("Invalid regular expression: /{}/: {}", pattern, e))
        })?;
        Ok(Expression::RegExp(Box::new(RegExpLiteral {
            value,
            span: Span::default(),
        })))
    }

    /// `[a, , ...b]`
    pub fn array(elements: Vec<Option<Expression>>) -> Expression {
        Expression::Array(ArrayExpression {
            elements,
            comma_after_spread: None,
            span: Span::default(),
        })
    }

    /// `{ a: 1, ...b }`
    pub fn object(properties: Vec<ObjectProperty>) -> Expression {
        Expression::Object(ObjectExpression {
            properties,
            span: Span::default(),
        })
    }

    /// Object literal entry; without a value the key doubles as a shorthand reference
    pub fn property(key: PropertyKey, value: Option<Expression>) -> Result<ObjectProperty> {
        let (value, shorthand) = match (value, &key) {
            (Some(value), _) => (value, false),
            (None, PropertyKey::Identifier(id)) => (Expression::Identifier(id.clone()), true),
            (None, _) => {
                return Err(Error::syntax_error(messages::unexpected_token(
                    &key.static_name().unwrap_or_else(|| "[".to_string()),
                )))
            }
        };
        Ok(ObjectProperty::Property(Property {
            key,
            value,
            shorthand,
            span: Span::default(),
        }))
    }

    /// `...argument` inside an object literal
    pub fn spread_property(argument: Expression) -> ObjectProperty {
        ObjectProperty::Spread(SpreadElement {
            argument,
            span: Span::default(),
        })
    }

    /// `...argument` inside an array literal or argument list
    pub fn spread(argument: Expression) -> Expression {
        Expression::Spread(Box::new(SpreadElement {
            argument,
            span: Span::default(),
        }))
    }

    /// `object.property`, `object[property]`, `object?.property`
    pub fn member(
        object: Expression,
        property: Expression,
        computed: bool,
        optional: bool,
    ) -> Result<Expression> {
        let property = match (computed, property) {
            (true, property) => MemberProperty::Expression(Box::new(property)),
            (false, Expression::Identifier(id)) => MemberProperty::Identifier(id),
            (false, other) => {
                return Err(Error::syntax_error(messages::unexpected_token(
                    &other.to_string(),
                )))
            }
        };
        Ok(Expression::Member(Box::new(MemberExpression {
            object,
            property,
            optional,
            span: Span::default(),
        })))
    }

    /// `callee(arguments)`, `callee?.(arguments)`
    pub fn call(callee: Expression, arguments: Vec<Expression>, optional: bool) -> Expression {
        Expression::Call(Box::new(CallExpression {
            callee,
            arguments,
            optional,
            span: Span::default(),
        }))
    }

    /// `new callee(arguments)`
    pub fn construct(callee: Expression, arguments: Vec<Expression>) -> Expression {
        Expression::New(Box::new(NewExpression {
            callee,
            arguments,
            span: Span::default(),
        }))
    }

    /// `operator argument`
    pub fn unary(operator: UnaryOperator, argument: Expression) -> Expression {
        Expression::Unary(Box::new(UnaryExpression {
            operator,
            argument,
            span: Span::default(),
        }))
    }

    /// `++argument`, `argument--`
    pub fn update(operator: UpdateOperator, argument: Expression, prefix: bool) -> Result<Expression> {
        let message = if prefix {
            messages::INVALID_LHS_IN_PREFIX_OP
        } else {
            messages::INVALID_LHS_IN_POSTFIX_OP
        };
        let argument = argument
            .into_assignment_target()
            .map_err(|_| Error::syntax_error(message))?;
        Ok(Expression::Update(Box::new(UpdateExpression {
            operator,
            argument,
            prefix,
            span: Span::default(),
        })))
    }

    /// `(left operator right)`
    pub fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Expression {
        Expression::parenthesized(Expression::Binary(Box::new(BinaryExpression {
            operator,
            left,
            right,
            span: Span::default(),
        })))
    }

    /// `(left operator right)` for `&&`, `||` and `??`
    pub fn logical(operator: LogicalOperator, left: Expression, right: Expression) -> Expression {
        Expression::parenthesized(Expression::Logical(Box::new(LogicalExpression {
            operator,
            left,
            right,
            span: Span::default(),
        })))
    }

    /// `test ? consequent : alternate`
    pub fn conditional(test: Expression, consequent: Expression, alternate: Expression) -> Expression {
        Expression::Conditional(Box::new(ConditionalExpression {
            test,
            consequent,
            alternate,
            span: Span::default(),
        }))
    }

    /// `left operator right`
    ///
    /// The target must be an identifier or member expression; with `=` an array or
    /// object literal is converted to a destructuring pattern.
    pub fn assignment(
        operator: AssignmentOperator,
        left: Expression,
        right: Expression,
    ) -> Result<Expression> {
        let left = match left {
            Expression::Array(_) | Expression::Object(_) if operator == AssignmentOperator::Assign => {
                let pattern = expression_to_pattern(left)
                    .map_err(|d| Error::syntax_error(d.message))?;
                AssignmentTarget::Pattern(Box::new(pattern))
            }
            left => left
                .into_assignment_target()
                .map_err(|_| Error::syntax_error(messages::INVALID_LHS_IN_ASSIGNMENT))?,
        };
        Ok(Expression::Assignment(Box::new(AssignmentExpression {
            operator,
            left,
            right,
            span: Span::default(),
        })))
    }

    /// `(params) => body`
    ///
    /// Rejects duplicate bound names and a rest parameter anywhere but last.
    pub fn arrow_function(params: Vec<Pattern>, body: Expression) -> Result<Expression> {
        if let Some(position) = params.iter().position(|p| matches!(p, Pattern::Rest(_))) {
            if position + 1 != params.len() {
                return Err(Error::syntax_error(messages::REST_PARAMETER_MUST_BE_LAST));
            }
        }
        if find_duplicate_binding(&params).is_some() {
            return Err(Error::syntax_error(messages::DUPLICATE_PARAMETER));
        }
        Ok(Expression::Arrow(Box::new(ArrowFunction {
            params,
            body,
            span: Span::default(),
        })))
    }

    /// `` `quasi${expression}quasi` ``
    pub fn template_literal(
        quasis: Vec<TemplateElement>,
        expressions: Vec<Expression>,
    ) -> Result<Expression> {
        Ok(Expression::TemplateLiteral(build_template(quasis, expressions)?))
    }

    /// ``tag`quasi${expression}quasi` ``
    pub fn tagged_template(
        tag: Expression,
        quasis: Vec<TemplateElement>,
        expressions: Vec<Expression>,
    ) -> Result<Expression> {
        let quasi = build_template(quasis, expressions)?;
        Ok(Expression::TaggedTemplate(Box::new(TaggedTemplate {
            tag,
            quasi,
            span: Span::default(),
        })))
    }

    /// `a, b, c`
    pub fn sequence(expressions: Vec<Expression>) -> Expression {
        Expression::Sequence(Box::new(SequenceExpression {
            expressions,
            span: Span::default(),
        }))
    }

    /// Optional chain wrapper around a member or call expression
    pub fn chain(expression: Expression) -> Expression {
        Expression::Chain(Box::new(ChainExpression {
            expression,
            span: Span::default(),
        }))
    }

    /// `(expression)`
    pub fn parenthesized(expression: Expression) -> Expression {
        Expression::Parenthesized(Box::new(ParenthesizedExpression {
            expression,
            span: Span::default(),
        }))
    }

    /// `this`
    pub fn this() -> Expression {
        Expression::This(Span::default())
    }
}

impl TemplateElement {
    /// Template segment; `raw` defaults to the cooked text
    pub fn new(cooked: impl Into<String>, raw: Option<String>, tail: bool) -> Self {
        let cooked = cooked.into();
        Self {
            raw: raw.unwrap_or_else(|| cooked.clone()),
            cooked,
            tail,
            span: Span::default(),
        }
    }
}

fn build_template(
    mut quasis: Vec<TemplateElement>,
    expressions: Vec<Expression>,
) -> Result<TemplateLiteral> {
    if quasis.len() != expressions.len() + 1 {
        return Err(Error::syntax_error(messages::UNTERMINATED_TEMPLATE));
    }
    let last = quasis.len() - 1;
    for (i, quasi) in quasis.iter_mut().enumerate() {
        quasi.tail = i == last;
    }
    Ok(TemplateLiteral {
        quasis,
        expressions,
        span: Span::default(),
    })
}

impl Pattern {
    /// Identifier binding
    pub fn identifier(name: impl Into<String>) -> Pattern {
        Pattern::Identifier(Identifier::new(name, Span::default()))
    }

    /// `[a, , b, ...rest]`
    pub fn array(elements: Vec<Option<Pattern>>, rest: Option<Pattern>) -> Pattern {
        Pattern::Array(ArrayPattern {
            elements,
            rest: rest.map(rest_element),
            span: Span::default(),
        })
    }

    /// `{a, b: c, ...rest}`
    pub fn object(properties: Vec<AssignmentProperty>, rest: Option<Pattern>) -> Pattern {
        Pattern::Object(ObjectPattern {
            properties,
            rest: rest.map(rest_element),
            span: Span::default(),
        })
    }

    /// `left = right`
    pub fn assignment(left: Pattern, right: Expression) -> Pattern {
        Pattern::Assignment(Box::new(AssignmentPattern {
            left,
            right,
            span: Span::default(),
        }))
    }

    /// `...argument` as a trailing parameter
    pub fn rest(argument: Pattern) -> Pattern {
        Pattern::Rest(rest_element(argument))
    }

    /// Object pattern entry; without a value the key doubles as the binding name
    pub fn property(key: PropertyKey, value: Option<Pattern>) -> Result<AssignmentProperty> {
        match (value, &key) {
            (Some(value), _) => Ok(AssignmentProperty::new(key, value)),
            (None, PropertyKey::Identifier(id)) => Ok(AssignmentProperty::shorthand(id.name.clone())),
            (None, _) => Err(Error::syntax_error(messages::INVALID_DESTRUCTURING_TARGET)),
        }
    }
}

fn rest_element(argument: Pattern) -> Box<RestElement> {
    Box::new(RestElement {
        argument,
        span: Span::default(),
    })
}

impl AssignmentProperty {
    /// `key: value`
    pub fn new(key: PropertyKey, value: Pattern) -> Self {
        Self {
            key,
            value,
            shorthand: false,
            span: Span::default(),
        }
    }

    /// `{name}`
    pub fn shorthand(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            key: PropertyKey::Identifier(Identifier::new(name.clone(), Span::default())),
            value: Pattern::identifier(name),
            shorthand: true,
            span: Span::default(),
        }
    }
}
