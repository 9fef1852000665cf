//! Expression AST node types

use super::*;
use crate::lexer::RegexLiteral;
use num_bigint::BigInt;

/// An expression
#[derive(Debug, Clone)]
pub enum Expression {
    /// Identifier reference
    Identifier(Identifier),

    /// Literal value
    Literal(Literal),

    /// Regular expression literal /ab+c/g
    RegExp(Box<RegExpLiteral>),

    /// Template literal `hello ${name}`
    TemplateLiteral(TemplateLiteral),

    /// Tagged template literal tag`hello`
    TaggedTemplate(Box<TaggedTemplate>),

    /// Array literal [1, 2, 3]
    Array(ArrayExpression),

    /// Object literal {a: 1, b: 2}
    Object(ObjectExpression),

    /// Arrow function expression (a, b) => a + b
    Arrow(Box<ArrowFunction>),

    /// this expression
    This(Span),

    /// Member expression obj.prop, obj[prop], obj?.prop
    Member(Box<MemberExpression>),

    /// Call expression func(args), func?.(args)
    Call(Box<CallExpression>),

    /// new expression new Foo(args)
    New(Box<NewExpression>),

    /// Unary expression !x, -x, typeof x
    Unary(Box<UnaryExpression>),

    /// Update expression ++x, x++
    Update(Box<UpdateExpression>),

    /// Binary expression x + y, x === y
    Binary(Box<BinaryExpression>),

    /// Logical expression x && y, x || y, x ?? y
    Logical(Box<LogicalExpression>),

    /// Assignment expression x = y, x += y
    Assignment(Box<AssignmentExpression>),

    /// Conditional expression x ? y : z
    Conditional(Box<ConditionalExpression>),

    /// Sequence expression x, y, z
    Sequence(Box<SequenceExpression>),

    /// Spread element ...x
    Spread(Box<SpreadElement>),

    /// Outermost member/call chain containing `?.`
    Chain(Box<ChainExpression>),

    /// Parenthesized expression (x)
    Parenthesized(Box<ParenthesizedExpression>),
}

impl Expression {
    /// Get the span of this expression
    pub fn span(&self) -> Span {
        match self {
            Expression::Identifier(id) => id.span,
            Expression::Literal(lit) => lit.span,
            Expression::RegExp(r) => r.span,
            Expression::TemplateLiteral(t) => t.span,
            Expression::TaggedTemplate(t) => t.span,
            Expression::Array(a) => a.span,
            Expression::Object(o) => o.span,
            Expression::Arrow(f) => f.span,
            Expression::This(span) => *span,
            Expression::Member(m) => m.span,
            Expression::Call(c) => c.span,
            Expression::New(n) => n.span,
            Expression::Unary(u) => u.span,
            Expression::Update(u) => u.span,
            Expression::Binary(b) => b.span,
            Expression::Logical(l) => l.span,
            Expression::Assignment(a) => a.span,
            Expression::Conditional(c) => c.span,
            Expression::Sequence(s) => s.span,
            Expression::Spread(s) => s.span,
            Expression::Chain(c) => c.span,
            Expression::Parenthesized(p) => p.span,
        }
    }

    /// Discriminant tag of this node
    pub fn node_type(&self) -> NodeType {
        match self {
            Expression::Identifier(_) => NodeType::Identifier,
            Expression::Literal(_) => NodeType::Literal,
            Expression::RegExp(_) => NodeType::RegExpLiteral,
            Expression::TemplateLiteral(_) => NodeType::TemplateLiteral,
            Expression::TaggedTemplate(_) => NodeType::TaggedTemplateExpression,
            Expression::Array(_) => NodeType::ArrayExpression,
            Expression::Object(_) => NodeType::ObjectExpression,
            Expression::Arrow(_) => NodeType::ArrowFunctionExpression,
            Expression::This(_) => NodeType::ThisExpression,
            Expression::Member(_) => NodeType::MemberExpression,
            Expression::Call(_) => NodeType::CallExpression,
            Expression::New(_) => NodeType::NewExpression,
            Expression::Unary(_) => NodeType::UnaryExpression,
            Expression::Update(_) => NodeType::UpdateExpression,
            Expression::Binary(_) => NodeType::BinaryExpression,
            Expression::Logical(_) => NodeType::LogicalExpression,
            Expression::Assignment(_) => NodeType::AssignmentExpression,
            Expression::Conditional(_) => NodeType::ConditionalExpression,
            Expression::Sequence(_) => NodeType::SequenceExpression,
            Expression::Spread(_) => NodeType::SpreadElement,
            Expression::Chain(_) => NodeType::ChainExpression,
            Expression::Parenthesized(_) => NodeType::ParenthesizedExpression,
        }
    }

    /// Convert into an assignment target, looking through parentheses
    ///
    /// Only identifiers and plain member expressions qualify.
    pub fn into_assignment_target(self) -> std::result::Result<AssignmentTarget, Expression> {
        match self {
            Expression::Identifier(id) => Ok(AssignmentTarget::Identifier(id)),
            Expression::Member(m) => Ok(AssignmentTarget::Member(m)),
            Expression::Parenthesized(p) => {
                let ParenthesizedExpression { expression, span } = *p;
                match expression {
                    Expression::Identifier(_) | Expression::Member(_) => {
                        expression.into_assignment_target()
                    }
                    other => Err(Expression::Parenthesized(Box::new(
                        ParenthesizedExpression {
                            expression: other,
                            span,
                        },
                    ))),
                }
            }
            other => Err(other),
        }
    }
}

/// A literal value
#[derive(Debug, Clone)]
pub struct Literal {
    /// The literal value
    pub value: LiteralValue,
    /// Span in source
    pub span: Span,
}

/// Literal value types
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// null
    Null,
    /// true or false
    Boolean(bool),
    /// Number (integer or float)
    Number(f64),
    /// BigInt
    BigInt(BigInt),
    /// String
    String(String),
}

/// Regular expression literal
#[derive(Debug, Clone)]
pub struct RegExpLiteral {
    /// Pattern, flags and compiled matcher
    pub value: RegexLiteral,
    /// Span in source
    pub span: Span,
}

/// Template literal element
#[derive(Debug, Clone)]
pub struct TemplateElement {
    /// Raw string value
    pub raw: String,
    /// Cooked (processed) string value
    pub cooked: String,
    /// Is this the last element?
    pub tail: bool,
    /// Span in source
    pub span: Span,
}

/// Template literal
#[derive(Debug, Clone)]
pub struct TemplateLiteral {
    /// String parts (quasis), always one more than expressions
    pub quasis: Vec<TemplateElement>,
    /// Expression parts
    pub expressions: Vec<Expression>,
    /// Span in source
    pub span: Span,
}

/// Tagged template literal
#[derive(Debug, Clone)]
pub struct TaggedTemplate {
    /// Tag expression
    pub tag: Expression,
    /// Template literal
    pub quasi: TemplateLiteral,
    /// Span in source
    pub span: Span,
}

/// Array expression
#[derive(Debug, Clone)]
pub struct ArrayExpression {
    /// Array elements (None for holes like [1,,3])
    pub elements: Vec<Option<Expression>>,
    /// A comma closing a trailing spread, as in `[...a,]`
    pub comma_after_spread: Option<Span>,
    /// Span in source
    pub span: Span,
}

/// Object expression
#[derive(Debug, Clone)]
pub struct ObjectExpression {
    /// Object properties
    pub properties: Vec<ObjectProperty>,
    /// Span in source
    pub span: Span,
}

/// Object literal entry
#[derive(Debug, Clone)]
pub enum ObjectProperty {
    /// Regular property {a: 1} or shorthand {a}
    Property(Property),
    /// Spread property {...obj}
    Spread(SpreadElement),
}

/// A `key: value` entry of an object literal
#[derive(Debug, Clone)]
pub struct Property {
    /// Property key
    pub key: PropertyKey,
    /// Property value
    pub value: Expression,
    /// Is this a shorthand property?
    pub shorthand: bool,
    /// Span in source
    pub span: Span,
}

/// Arrow function expression
#[derive(Debug, Clone)]
pub struct ArrowFunction {
    /// Parameters, a rest element may only come last
    pub params: Vec<Pattern>,
    /// Expression body
    pub body: Expression,
    /// Span in source
    pub span: Span,
}

/// Member expression
#[derive(Debug, Clone)]
pub struct MemberExpression {
    /// Object being accessed
    pub object: Expression,
    /// Property being accessed
    pub property: MemberProperty,
    /// Accessed with `?.`
    pub optional: bool,
    /// Span in source
    pub span: Span,
}

impl MemberExpression {
    /// Is this a computed property access? (obj[prop])
    pub fn is_computed(&self) -> bool {
        matches!(self.property, MemberProperty::Expression(_))
    }
}

/// Member property (can be identifier or computed)
#[derive(Debug, Clone)]
pub enum MemberProperty {
    /// obj.prop
    Identifier(Identifier),
    /// obj[expr]
    Expression(Box<Expression>),
}

/// Call expression
#[derive(Debug, Clone)]
pub struct CallExpression {
    /// Callee expression
    pub callee: Expression,
    /// Arguments
    pub arguments: Vec<Expression>,
    /// Called with `?.(`
    pub optional: bool,
    /// Span in source
    pub span: Span,
}

/// New expression
#[derive(Debug, Clone)]
pub struct NewExpression {
    /// Constructor expression
    pub callee: Expression,
    /// Arguments
    pub arguments: Vec<Expression>,
    /// Span in source
    pub span: Span,
}

/// Unary expression
#[derive(Debug, Clone)]
pub struct UnaryExpression {
    /// Operator
    pub operator: UnaryOperator,
    /// Argument
    pub argument: Expression,
    /// Span in source
    pub span: Span,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// -
    Minus,
    /// +
    Plus,
    /// !
    Not,
    /// ~
    BitwiseNot,
    /// typeof
    Typeof,
    /// void
    Void,
    /// delete
    Delete,
}

impl UnaryOperator {
    /// Source text of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOperator::Minus => "-",
            UnaryOperator::Plus => "+",
            UnaryOperator::Not => "!",
            UnaryOperator::BitwiseNot => "~",
            UnaryOperator::Typeof => "typeof",
            UnaryOperator::Void => "void",
            UnaryOperator::Delete => "delete",
        }
    }
}

/// Update expression (++, --)
#[derive(Debug, Clone)]
pub struct UpdateExpression {
    /// Operator
    pub operator: UpdateOperator,
    /// Argument
    pub argument: AssignmentTarget,
    /// Is prefix (++x) or postfix (x++)
    pub prefix: bool,
    /// Span in source
    pub span: Span,
}

/// Update operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOperator {
    /// ++
    Increment,
    /// --
    Decrement,
}

impl UpdateOperator {
    /// Source text of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateOperator::Increment => "++",
            UpdateOperator::Decrement => "--",
        }
    }
}

/// Binary expression
#[derive(Debug, Clone)]
pub struct BinaryExpression {
    /// Operator
    pub operator: BinaryOperator,
    /// Left operand
    pub left: Expression,
    /// Right operand
    pub right: Expression,
    /// Span in source
    pub span: Span,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    /// +
    Add,
    /// -
    Sub,
    /// *
    Mul,
    /// /
    Div,
    /// %
    Mod,
    /// **
    Pow,
    /// ==
    Eq,
    /// !=
    Ne,
    /// ===
    StrictEq,
    /// !==
    StrictNe,
    /// <
    Lt,
    /// <=
    Le,
    /// >
    Gt,
    /// >=
    Ge,
    /// <<
    Shl,
    /// >>
    Shr,
    /// >>>
    UShr,
    /// &
    BitwiseAnd,
    /// |
    BitwiseOr,
    /// ^
    BitwiseXor,
    /// in
    In,
    /// instanceof
    Instanceof,
}

impl BinaryOperator {
    /// Source text of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::Pow => "**",
            BinaryOperator::Eq => "==",
            BinaryOperator::Ne => "!=",
            BinaryOperator::StrictEq => "===",
            BinaryOperator::StrictNe => "!==",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Ge => ">=",
            BinaryOperator::Shl => "<<",
            BinaryOperator::Shr => ">>",
            BinaryOperator::UShr => ">>>",
            BinaryOperator::BitwiseAnd => "&",
            BinaryOperator::BitwiseOr => "|",
            BinaryOperator::BitwiseXor => "^",
            BinaryOperator::In => "in",
            BinaryOperator::Instanceof => "instanceof",
        }
    }
}

/// Logical expression
#[derive(Debug, Clone)]
pub struct LogicalExpression {
    /// Operator
    pub operator: LogicalOperator,
    /// Left operand
    pub left: Expression,
    /// Right operand
    pub right: Expression,
    /// Span in source
    pub span: Span,
}

/// Logical operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    /// &&
    And,
    /// ||
    Or,
    /// ??
    NullishCoalescing,
}

impl LogicalOperator {
    /// Source text of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOperator::And => "&&",
            LogicalOperator::Or => "||",
            LogicalOperator::NullishCoalescing => "??",
        }
    }
}

/// Assignment expression
#[derive(Debug, Clone)]
pub struct AssignmentExpression {
    /// Operator
    pub operator: AssignmentOperator,
    /// Left-hand side (assignment target)
    pub left: AssignmentTarget,
    /// Right-hand side
    pub right: Expression,
    /// Span in source
    pub span: Span,
}

/// Assignment target (left-hand side of assignment or update)
#[derive(Debug, Clone)]
pub enum AssignmentTarget {
    /// Scope binding `a = 1`
    Identifier(Identifier),
    /// Property `a.b = 1`, `a[b] = 1`
    Member(Box<MemberExpression>),
    /// Destructuring `[a, b] = [b, a]`, only with `=`
    Pattern(Box<Pattern>),
}

impl AssignmentTarget {
    /// Get the span of this target
    pub fn span(&self) -> Span {
        match self {
            AssignmentTarget::Identifier(id) => id.span,
            AssignmentTarget::Member(m) => m.span,
            AssignmentTarget::Pattern(p) => p.span(),
        }
    }
}

/// Assignment operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOperator {
    /// =
    Assign,
    /// +=
    AddAssign,
    /// -=
    SubAssign,
    /// *=
    MulAssign,
    /// /=
    DivAssign,
    /// %=
    ModAssign,
    /// **=
    PowAssign,
    /// <<=
    ShlAssign,
    /// >>=
    ShrAssign,
    /// >>>=
    UShrAssign,
    /// &=
    BitwiseAndAssign,
    /// |=
    BitwiseOrAssign,
    /// ^=
    BitwiseXorAssign,
    /// &&=
    AndAssign,
    /// ||=
    OrAssign,
    /// ??=
    NullishAssign,
}

impl AssignmentOperator {
    /// All assignment operators, in source order of the grammar
    pub const ALL: [AssignmentOperator; 16] = [
        AssignmentOperator::Assign,
        AssignmentOperator::AddAssign,
        AssignmentOperator::SubAssign,
        AssignmentOperator::MulAssign,
        AssignmentOperator::DivAssign,
        AssignmentOperator::ModAssign,
        AssignmentOperator::PowAssign,
        AssignmentOperator::ShlAssign,
        AssignmentOperator::ShrAssign,
        AssignmentOperator::UShrAssign,
        AssignmentOperator::BitwiseAndAssign,
        AssignmentOperator::BitwiseOrAssign,
        AssignmentOperator::BitwiseXorAssign,
        AssignmentOperator::AndAssign,
        AssignmentOperator::OrAssign,
        AssignmentOperator::NullishAssign,
    ];

    /// Source text of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentOperator::Assign => "=",
            AssignmentOperator::AddAssign => "+=",
            AssignmentOperator::SubAssign => "-=",
            AssignmentOperator::MulAssign => "*=",
            AssignmentOperator::DivAssign => "/=",
            AssignmentOperator::ModAssign => "%=",
            AssignmentOperator::PowAssign => "**=",
            AssignmentOperator::ShlAssign => "<<=",
            AssignmentOperator::ShrAssign => ">>=",
            AssignmentOperator::UShrAssign => ">>>=",
            AssignmentOperator::BitwiseAndAssign => "&=",
            AssignmentOperator::BitwiseOrAssign => "|=",
            AssignmentOperator::BitwiseXorAssign => "^=",
            AssignmentOperator::AndAssign => "&&=",
            AssignmentOperator::OrAssign => "||=",
            AssignmentOperator::NullishAssign => "??=",
        }
    }

    /// Arithmetic/bitwise operator applied by a compound assignment
    pub fn binary_operator(&self) -> Option<BinaryOperator> {
        match self {
            AssignmentOperator::AddAssign => Some(BinaryOperator::Add),
            AssignmentOperator::SubAssign => Some(BinaryOperator::Sub),
            AssignmentOperator::MulAssign => Some(BinaryOperator::Mul),
            AssignmentOperator::DivAssign => Some(BinaryOperator::Div),
            AssignmentOperator::ModAssign => Some(BinaryOperator::Mod),
            AssignmentOperator::PowAssign => Some(BinaryOperator::Pow),
            AssignmentOperator::ShlAssign => Some(BinaryOperator::Shl),
            AssignmentOperator::ShrAssign => Some(BinaryOperator::Shr),
            AssignmentOperator::UShrAssign => Some(BinaryOperator::UShr),
            AssignmentOperator::BitwiseAndAssign => Some(BinaryOperator::BitwiseAnd),
            AssignmentOperator::BitwiseOrAssign => Some(BinaryOperator::BitwiseOr),
            AssignmentOperator::BitwiseXorAssign => Some(BinaryOperator::BitwiseXor),
            _ => None,
        }
    }

    /// Short-circuiting operator applied by a logical assignment
    pub fn logical_operator(&self) -> Option<LogicalOperator> {
        match self {
            AssignmentOperator::AndAssign => Some(LogicalOperator::And),
            AssignmentOperator::OrAssign => Some(LogicalOperator::Or),
            AssignmentOperator::NullishAssign => Some(LogicalOperator::NullishCoalescing),
            _ => None,
        }
    }
}

/// Conditional expression
#[derive(Debug, Clone)]
pub struct ConditionalExpression {
    /// Test expression
    pub test: Expression,
    /// Consequent expression
    pub consequent: Expression,
    /// Alternate expression
    pub alternate: Expression,
    /// Span in source
    pub span: Span,
}

/// Sequence expression
#[derive(Debug, Clone)]
pub struct SequenceExpression {
    /// Expressions in sequence
    pub expressions: Vec<Expression>,
    /// Span in source
    pub span: Span,
}

/// Spread element
#[derive(Debug, Clone)]
pub struct SpreadElement {
    /// Argument being spread
    pub argument: Expression,
    /// Span in source
    pub span: Span,
}

/// Optional chain wrapper
#[derive(Debug, Clone)]
pub struct ChainExpression {
    /// Member or call expression at the end of the chain
    pub expression: Expression,
    /// Span in source
    pub span: Span,
}

/// Parenthesized expression
#[derive(Debug, Clone)]
pub struct ParenthesizedExpression {
    /// Inner expression
    pub expression: Expression,
    /// Span in source, including the parentheses
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_type_tags() {
        let expr = Expression::identifier("a");
        assert_eq!(expr.node_type(), NodeType::Identifier);
        assert_eq!(expr.node_type().to_string(), "Identifier");
        assert_eq!(
            Expression::this().node_type().as_str(),
            "ThisExpression"
        );
    }

    #[test]
    fn test_assignment_target_through_parens() {
        let expr = Expression::parenthesized(Expression::identifier("a"));
        assert!(matches!(
            expr.into_assignment_target(),
            Ok(AssignmentTarget::Identifier(_))
        ));

        let expr = Expression::number(1.0);
        assert!(expr.into_assignment_target().is_err());
    }

    #[test]
    fn test_compound_operator_table() {
        let compound = AssignmentOperator::ALL
            .iter()
            .filter(|op| op.binary_operator().is_some())
            .count();
        let logical = AssignmentOperator::ALL
            .iter()
            .filter(|op| op.logical_operator().is_some())
            .count();
        assert_eq!(compound, 12);
        assert_eq!(logical, 3);
    }
}
