//! Source serialization of the tree
//!
//! Printing re-serializes literals instead of echoing the original text, so the output
//! is equivalent to the input rather than identical. Grouping survives because
//! parentheses are nodes of their own.

use super::*;
use crate::runtime::number_to_string;

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(id) => f.write_str(&id.name),
            Expression::Literal(lit) => write!(f, "{}", lit.value),
            Expression::RegExp(r) => write!(f, "/{}/{}", r.value.pattern, r.value.flags),
            Expression::TemplateLiteral(t) => write!(f, "{}", t),
            Expression::TaggedTemplate(t) => write!(f, "{}{}", t.tag, t.quasi),
            Expression::Array(a) => {
                f.write_str("[")?;
                write_holey_list(f, &a.elements)?;
                f.write_str("]")
            }
            Expression::Object(o) => {
                if o.properties.is_empty() {
                    return f.write_str("{ }");
                }
                f.write_str("{ ")?;
                for (i, prop) in o.properties.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match prop {
                        ObjectProperty::Property(p) if p.shorthand => write!(f, "{}", p.key)?,
                        ObjectProperty::Property(p) => write!(f, "{}: {}", p.key, p.value)?,
                        ObjectProperty::Spread(s) => write!(f, "...{}", s.argument)?,
                    }
                }
                f.write_str(" }")
            }
            Expression::Arrow(arrow) => {
                f.write_str("(")?;
                write_list(f, &arrow.params)?;
                f.write_str(") => ")?;
                match &arrow.body {
                    body @ Expression::Object(_) => write!(f, "({})", body),
                    body => write!(f, "{}", body),
                }
            }
            Expression::This(_) => f.write_str("this"),
            Expression::Member(m) => {
                if needs_parens_as_object(&m.object) {
                    write!(f, "({})", m.object)?;
                } else {
                    write!(f, "{}", m.object)?;
                }
                match (&m.property, m.optional) {
                    (MemberProperty::Identifier(id), false) => write!(f, ".{}", id.name),
                    (MemberProperty::Identifier(id), true) => write!(f, "?.{}", id.name),
                    (MemberProperty::Expression(e), false) => write!(f, "[{}]", e),
                    (MemberProperty::Expression(e), true) => write!(f, "?.[{}]", e),
                }
            }
            Expression::Call(c) => {
                write!(f, "{}", c.callee)?;
                f.write_str(if c.optional { "?.(" } else { "(" })?;
                write_list(f, &c.arguments)?;
                f.write_str(")")
            }
            Expression::New(n) => {
                write!(f, "new {}(", n.callee)?;
                write_list(f, &n.arguments)?;
                f.write_str(")")
            }
            Expression::Unary(u) => {
                let argument = u.argument.to_string();
                let op = u.operator.as_str();
                let needs_space = match u.operator {
                    UnaryOperator::Typeof | UnaryOperator::Void | UnaryOperator::Delete => true,
                    // `- -a` and `+ +a` must not collapse into `--a` / `++a`
                    UnaryOperator::Minus | UnaryOperator::Plus => argument.starts_with(op),
                    _ => false,
                };
                if needs_space {
                    write!(f, "{} {}", op, argument)
                } else {
                    write!(f, "{}{}", op, argument)
                }
            }
            Expression::Update(u) => {
                if u.prefix {
                    write!(f, "{}{}", u.operator.as_str(), u.argument)
                } else {
                    write!(f, "{}{}", u.argument, u.operator.as_str())
                }
            }
            Expression::Binary(b) => {
                write!(f, "{} {} {}", b.left, b.operator.as_str(), b.right)
            }
            Expression::Logical(l) => {
                write!(f, "{} {} {}", l.left, l.operator.as_str(), l.right)
            }
            Expression::Assignment(a) => {
                write!(f, "{} {} {}", a.left, a.operator.as_str(), a.right)
            }
            Expression::Conditional(c) => {
                write!(f, "{} ? {} : {}", c.test, c.consequent, c.alternate)
            }
            Expression::Sequence(s) => write_list(f, &s.expressions),
            Expression::Spread(s) => write!(f, "...{}", s.argument),
            Expression::Chain(c) => write!(f, "{}", c.expression),
            Expression::Parenthesized(p) => write!(f, "({})", p.expression),
        }
    }
}

/// Integer literals would swallow the following `.` as a decimal point
fn needs_parens_as_object(object: &Expression) -> bool {
    match object {
        Expression::Literal(Literal {
            value: LiteralValue::Number(n),
            ..
        }) => {
            let source = number_source(*n);
            source.starts_with(|c: char| c.is_ascii_digit()) && !source.contains(['.', 'e'])
        }
        _ => false,
    }
}

/// Source text that scans back to `n`
///
/// Infinities overflow a literal, NaN has no literal form, and negative values
/// are parenthesized so they stay a single operand.
fn number_source(n: f64) -> String {
    if n.is_nan() {
        "(0 / 0)".to_string()
    } else if n.is_infinite() {
        let source = if n > 0.0 { "1e999" } else { "(-1e999)" };
        source.to_string()
    } else if n < 0.0 {
        format!("(-{})", number_to_string(-n))
    } else {
        number_to_string(n)
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Null => f.write_str("null"),
            LiteralValue::Boolean(b) => write!(f, "{}", b),
            LiteralValue::Number(n) => f.write_str(&number_source(*n)),
            LiteralValue::BigInt(n) => write!(f, "{}n", n),
            LiteralValue::String(s) => write_string_literal(f, s),
        }
    }
}

fn write_string_literal(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    let quoted = serde_json::to_string(s).map_err(|_| fmt::Error)?;
    f.write_str(&quoted)
}

impl fmt::Display for TemplateLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("`")?;
        for (i, quasi) in self.quasis.iter().enumerate() {
            f.write_str(&quasi.raw)?;
            if let Some(expr) = self.expressions.get(i) {
                write!(f, "${{{}}}", expr)?;
            }
        }
        f.write_str("`")
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::Identifier(id) => f.write_str(&id.name),
            PropertyKey::String(s) => write_string_literal(f, s),
            PropertyKey::Number(n) => f.write_str(&number_to_string(*n)),
            PropertyKey::Computed(e) => write!(f, "[{}]", e),
        }
    }
}

impl fmt::Display for AssignmentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentTarget::Identifier(id) => f.write_str(&id.name),
            AssignmentTarget::Member(m) => write!(f, "{}", Expression::Member(m.clone())),
            AssignmentTarget::Pattern(p) => write!(f, "{}", p),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Identifier(id) => f.write_str(&id.name),
            Pattern::Array(a) => {
                f.write_str("[")?;
                write_holey_list(f, &a.elements)?;
                if let Some(rest) = &a.rest {
                    if !a.elements.is_empty() {
                        f.write_str(", ")?;
                    }
                    write!(f, "...{}", rest.argument)?;
                }
                f.write_str("]")
            }
            Pattern::Object(o) => {
                if o.properties.is_empty() && o.rest.is_none() {
                    return f.write_str("{ }");
                }
                f.write_str("{ ")?;
                for (i, prop) in o.properties.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", prop)?;
                }
                if let Some(rest) = &o.rest {
                    if !o.properties.is_empty() {
                        f.write_str(", ")?;
                    }
                    write!(f, "...{}", rest.argument)?;
                }
                f.write_str(" }")
            }
            Pattern::Assignment(a) => write!(f, "{} = {}", a.left, a.right),
            Pattern::Rest(r) => write!(f, "...{}", r.argument),
        }
    }
}

impl fmt::Display for AssignmentProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.shorthand {
            // `{a = 1}` keeps the default after the shorthand key
            match &self.value {
                Pattern::Assignment(a) => write!(f, "{} = {}", self.key, a.right),
                _ => write!(f, "{}", self.key),
            }
        } else {
            write!(f, "{}: {}", self.key, self.value)
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Elements with holes; a trailing hole needs an extra comma to survive reparsing
fn write_holey_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[Option<T>]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        if let Some(item) = item {
            write!(f, "{}", item)?;
        }
    }
    if matches!(items.last(), Some(None)) {
        f.write_str(",")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_literals() {
        assert_eq!(Expression::number(1.5).to_string(), "1.5");
        assert_eq!(Expression::number(1e21).to_string(), "1e+21");
        assert_eq!(Expression::bigint(42).to_string(), "42n");
        assert_eq!(Expression::string("a\"b\n").to_string(), r#""a\"b\n""#);
        assert_eq!(Expression::null().to_string(), "null");
    }

    #[test]
    fn test_non_finite_literals() {
        assert_eq!(Expression::number(f64::INFINITY).to_string(), "1e999");
        assert_eq!(Expression::number(f64::NEG_INFINITY).to_string(), "(-1e999)");
        assert_eq!(Expression::number(f64::NAN).to_string(), "(0 / 0)");
        assert_eq!(Expression::number(-2.5).to_string(), "(-2.5)");
        let member = Expression::member(
            Expression::number(f64::INFINITY),
            Expression::identifier("x"),
            false,
            false,
        )
        .unwrap();
        assert_eq!(member.to_string(), "1e999.x");
    }

    #[test]
    fn test_unary_spacing() {
        let inner = Expression::unary(UnaryOperator::Minus, Expression::identifier("a"));
        let outer = Expression::unary(UnaryOperator::Minus, inner);
        assert_eq!(outer.to_string(), "- -a");
        let typeof_expr = Expression::unary(UnaryOperator::Typeof, Expression::identifier("a"));
        assert_eq!(typeof_expr.to_string(), "typeof a");
        let not = Expression::unary(UnaryOperator::Not, Expression::identifier("a"));
        assert_eq!(not.to_string(), "!a");
    }

    #[test]
    fn test_arrow_with_object_body() {
        let arrow = Expression::arrow_function(
            vec![Pattern::identifier("a")],
            Expression::object(vec![]),
        )
        .unwrap();
        assert_eq!(arrow.to_string(), "(a) => ({ })");
    }

    #[test]
    fn test_array_holes() {
        let array = Expression::array(vec![Some(Expression::number(1.0)), None]);
        assert_eq!(array.to_string(), "[1, ,]");
        let array = Expression::array(vec![None, Some(Expression::number(1.0))]);
        assert_eq!(array.to_string(), "[, 1]");
    }

    #[test]
    fn test_patterns() {
        let pattern = Pattern::object(
            vec![
                AssignmentProperty::shorthand("a"),
                AssignmentProperty::new(
                    PropertyKey::Identifier(Identifier::new("b", Span::default())),
                    Pattern::array(
                        vec![Some(Pattern::identifier("c"))],
                        Some(Pattern::identifier("d")),
                    ),
                ),
            ],
            Some(Pattern::identifier("e")),
        );
        assert_eq!(pattern.to_string(), "{ a, b: [c, ...d], ...e }");
    }

    #[test]
    fn test_number_member_object() {
        let member = Expression::member(
            Expression::number(1.0),
            Expression::identifier("toFixed"),
            false,
            false,
        )
        .unwrap();
        assert_eq!(member.to_string(), "(1).toFixed");
    }
}
