//! Expression parser
//!
//! This module implements a recursive descent parser with a single token of lookahead.
//! Binary and logical operators are handled by an explicit-stack precedence climb;
//! arrow parameters are parsed with the expression grammar and converted afterwards
//! (see [`reinterpret`]).

pub mod reinterpret;

use crate::ast::*;
use crate::error::{messages, Error, Result, SourceLocation};
use crate::lexer::{Keyword, Scanner, Token, TokenKind, TokenValue};
use reinterpret::{expression_to_pattern, spread_to_rest, Diagnostic};

/// A recursive descent parser for expressions
pub struct Parser<'src> {
    /// Source code, kept for error context
    source: &'src str,
    /// Token source
    scanner: Scanner<'src>,
    /// Current lookahead token
    lookahead: Token<'src>,
    /// End location of the lookahead token
    lookahead_end: SourceLocation,
    /// End location of the last consumed token
    last_end: SourceLocation,
    /// Offset where the innermost assignment expression started; arrow functions
    /// may only begin there
    assignment_start: usize,
    /// First `{a = 1}` seen that has not been claimed by a pattern yet
    cover_initializer: Option<SourceLocation>,
}

impl<'src> Parser<'src> {
    /// Create a new parser from source code
    fn new(source: &'src str) -> Result<Self> {
        let mut scanner = Scanner::new(source);
        let lookahead = scanner.next_token()?;
        let lookahead_end = scanner.location();
        Ok(Self {
            source,
            scanner,
            lookahead,
            lookahead_end,
            last_end: SourceLocation::default(),
            assignment_start: 0,
            cover_initializer: None,
        })
    }

    /// Parse a complete expression
    ///
    /// Fails on the first syntax error; trailing tokens after the expression are an
    /// error as well.
    pub fn parse(source: &'src str) -> Result<Expression> {
        tracing::debug!(len = source.len(), "parsing expression");

        let mut parser = Parser::new(source)?;
        let expr = parser.parse_expression()?;

        if parser.peek() != TokenKind::Eof {
            return Err(parser.unexpected(&parser.lookahead));
        }
        if let Some(location) = parser.cover_initializer {
            return Err(parser.error("Invalid shorthand property initializer", location));
        }

        tracing::debug!(node = %expr.node_type(), "parsed expression");
        Ok(expr)
    }

    // ========== Token Access ==========

    fn peek(&self) -> TokenKind {
        self.lookahead.kind
    }

    fn location(&self) -> SourceLocation {
        self.lookahead.location()
    }

    fn span_from(&self, start: SourceLocation) -> Span {
        Span::new(start, self.last_end)
    }

    /// Create a parse error with source context
    fn error(&self, message: impl Into<String>, location: SourceLocation) -> Error {
        Error::parse_error_with_context(message, location, self.source)
    }

    fn diagnostic(&self, diagnostic: Diagnostic) -> Error {
        self.error(diagnostic.message, diagnostic.location)
    }

    /// Error for a token that cannot appear where it was found
    fn unexpected(&self, token: &Token<'src>) -> Error {
        let message = match token.kind {
            TokenKind::Eof => messages::UNEXPECTED_END_OF_INPUT.to_string(),
            TokenKind::NumericLiteral => messages::UNEXPECTED_NUMBER.to_string(),
            TokenKind::StringLiteral => messages::UNEXPECTED_STRING.to_string(),
            TokenKind::Template => messages::UNEXPECTED_TEMPLATE_STRING.to_string(),
            TokenKind::Identifier => messages::UNEXPECTED_IDENTIFIER.to_string(),
            TokenKind::Keyword(Keyword::Enum | Keyword::Await | Keyword::Yield) => {
                messages::UNEXPECTED_RESERVED.to_string()
            }
            _ => messages::unexpected_token(token.raw),
        };
        self.error(message, token.location())
    }

    fn advance(&mut self) -> Result<Token<'src>> {
        let next = self.scanner.next_token()?;
        let next_end = self.scanner.location();
        let token = std::mem::replace(&mut self.lookahead, next);
        self.last_end = std::mem::replace(&mut self.lookahead_end, next_end);
        Ok(token)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token<'src>> {
        if self.peek() == kind {
            self.advance()
        } else {
            Err(self.unexpected(&self.lookahead))
        }
    }

    fn consume(&mut self, kind: TokenKind) -> Result<bool> {
        if self.peek() == kind {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    // ========== Expressions ==========

    /// Expression, including the comma operator
    fn parse_expression(&mut self) -> Result<Expression> {
        let start = self.location();
        let first = self.parse_assignment_expression()?;

        if self.peek() != TokenKind::Comma {
            return Ok(first);
        }

        let mut expressions = vec![first];
        while self.consume(TokenKind::Comma)? {
            expressions.push(self.parse_assignment_expression()?);
        }
        Ok(Expression::Sequence(Box::new(SequenceExpression {
            expressions,
            span: self.span_from(start),
        })))
    }

    fn parse_assignment_expression(&mut self) -> Result<Expression> {
        let start = self.location();
        let outer = std::mem::replace(&mut self.assignment_start, start.offset);
        let result = self.parse_assignment_expression_impl(start);
        self.assignment_start = outer;
        result
    }

    fn parse_assignment_expression_impl(&mut self, start: SourceLocation) -> Result<Expression> {
        let outer_cover = self.cover_initializer.take();
        let left = self.parse_conditional_expression()?;

        // Well-formed arrows are taken by the primary expression; anything else that
        // reaches `=>` has a parameter list that is not a cover of one
        if self.peek() == TokenKind::Arrow {
            return Err(self.error(messages::MALFORMED_ARROW_PARAMETERS, start));
        }

        let operator = match assignment_operator(self.peek()) {
            Some(op) => op,
            None => {
                self.cover_initializer = outer_cover.or(self.cover_initializer);
                return Ok(left);
            }
        };

        let target = match left {
            Expression::Array(_) | Expression::Object(_) if operator == AssignmentOperator::Assign => {
                // `{a = 1} = b` claims the initializers seen inside the literal
                self.cover_initializer = outer_cover;
                let pattern = expression_to_pattern(left).map_err(|d| self.diagnostic(d))?;
                AssignmentTarget::Pattern(Box::new(pattern))
            }
            left => {
                self.cover_initializer = outer_cover.or(self.cover_initializer);
                left.into_assignment_target()
                    .map_err(|_| self.error(messages::INVALID_LHS_IN_ASSIGNMENT, start))?
            }
        };
        self.advance()?;
        let right = self.parse_assignment_expression()?;

        Ok(Expression::Assignment(Box::new(AssignmentExpression {
            operator,
            left: target,
            right,
            span: self.span_from(start),
        })))
    }

    fn parse_conditional_expression(&mut self) -> Result<Expression> {
        let start = self.location();
        let test = self.parse_binary_expression()?;

        if !self.consume(TokenKind::Question)? {
            return Ok(test);
        }

        let consequent = self.parse_assignment_expression()?;
        self.expect(TokenKind::Colon)?;
        let alternate = self.parse_assignment_expression()?;

        Ok(Expression::Conditional(Box::new(ConditionalExpression {
            test,
            consequent,
            alternate,
            span: self.span_from(start),
        })))
    }

    /// Precedence climb over an explicit operand/operator stack
    fn parse_binary_expression(&mut self) -> Result<Expression> {
        let left = self.parse_exponentiation_expression()?;
        if binary_precedence(self.peek()) == 0 {
            return Ok(left);
        }

        let mut operands = vec![left];
        let mut operators: Vec<(TokenKind, u8, SourceLocation)> = Vec::new();

        loop {
            let precedence = binary_precedence(self.peek());
            if precedence == 0 {
                break;
            }

            while let Some(&(_, top, _)) = operators.last() {
                if precedence > top {
                    break;
                }
                self.reduce_binary(&mut operands, &mut operators)?;
            }

            let token = self.advance()?;
            operators.push((token.kind, precedence, token.location()));
            operands.push(self.parse_exponentiation_expression()?);
        }

        while !operators.is_empty() {
            self.reduce_binary(&mut operands, &mut operators)?;
        }

        operands
            .pop()
            .ok_or_else(|| Error::InternalError("empty operand stack".to_string()))
    }

    /// Pop two operands and one operator, push the combined node
    fn reduce_binary(
        &self,
        operands: &mut Vec<Expression>,
        operators: &mut Vec<(TokenKind, u8, SourceLocation)>,
    ) -> Result<()> {
        let (kind, _, location) = operators
            .pop()
            .ok_or_else(|| Error::InternalError("empty operator stack".to_string()))?;
        let (right, left) = match (operands.pop(), operands.pop()) {
            (Some(right), Some(left)) => (right, left),
            _ => return Err(Error::InternalError("empty operand stack".to_string())),
        };
        let span = left.span().merge(right.span());

        let node = if let Some(operator) = logical_operator(kind) {
            if mixes_coalescing(operator, &left) || mixes_coalescing(operator, &right) {
                return Err(self.error(messages::MIXED_COALESCING_AND_LOGICAL, location));
            }
            Expression::Logical(Box::new(LogicalExpression {
                operator,
                left,
                right,
                span,
            }))
        } else {
            let operator = binary_operator(kind)
                .ok_or_else(|| Error::InternalError(format!("{:?} is not binary", kind)))?;
            Expression::Binary(Box::new(BinaryExpression {
                operator,
                left,
                right,
                span,
            }))
        };

        operands.push(node);
        Ok(())
    }

    /// `**` is right-associative and binds tighter than the climb
    fn parse_exponentiation_expression(&mut self) -> Result<Expression> {
        let start = self.location();
        let left = self.parse_unary_expression()?;

        if self.peek() != TokenKind::StarStar {
            return Ok(left);
        }
        if matches!(left, Expression::Unary(_)) {
            let loc = self.location();
            return Err(self.error(messages::UNARY_BEFORE_EXPONENTIATION, loc));
        }

        self.advance()?;
        let right = self.parse_exponentiation_expression()?;
        Ok(Expression::Binary(Box::new(BinaryExpression {
            operator: BinaryOperator::Pow,
            left,
            right,
            span: self.span_from(start),
        })))
    }

    fn parse_unary_expression(&mut self) -> Result<Expression> {
        let start = self.location();

        // Prefix increment/decrement
        if let Some(operator) = update_operator(self.peek()) {
            self.advance()?;
            let argument = self.parse_unary_expression()?;
            let argument = argument
                .into_assignment_target()
                .map_err(|_| self.error(messages::INVALID_LHS_IN_PREFIX_OP, start))?;

            return Ok(Expression::Update(Box::new(UpdateExpression {
                operator,
                argument,
                prefix: true,
                span: self.span_from(start),
            })));
        }

        let operator = match self.peek() {
            TokenKind::Plus => UnaryOperator::Plus,
            TokenKind::Minus => UnaryOperator::Minus,
            TokenKind::Bang => UnaryOperator::Not,
            TokenKind::Tilde => UnaryOperator::BitwiseNot,
            TokenKind::Keyword(Keyword::Typeof) => UnaryOperator::Typeof,
            TokenKind::Keyword(Keyword::Void) => UnaryOperator::Void,
            TokenKind::Keyword(Keyword::Delete) => UnaryOperator::Delete,
            _ => return self.parse_postfix_expression(),
        };

        self.advance()?;
        let argument = self.parse_unary_expression()?;
        Ok(Expression::Unary(Box::new(UnaryExpression {
            operator,
            argument,
            span: self.span_from(start),
        })))
    }

    fn parse_postfix_expression(&mut self) -> Result<Expression> {
        let start = self.location();
        let argument = self.parse_left_hand_side_expression()?;

        // A line break before `++` ends the expression
        let operator = match update_operator(self.peek()) {
            Some(op) if self.lookahead.line_number == self.last_end.line => op,
            _ => return Ok(argument),
        };

        let argument = argument
            .into_assignment_target()
            .map_err(|_| self.error(messages::INVALID_LHS_IN_POSTFIX_OP, start))?;
        self.advance()?;

        Ok(Expression::Update(Box::new(UpdateExpression {
            operator,
            argument,
            prefix: false,
            span: self.span_from(start),
        })))
    }

    /// Calls and member accesses, wrapping any chain with `?.` in a chain node
    fn parse_left_hand_side_expression(&mut self) -> Result<Expression> {
        let start = self.location();
        let mut expr = if self.peek() == TokenKind::Keyword(Keyword::New) {
            self.parse_new_expression()?
        } else {
            self.parse_primary_expression()?
        };
        let mut in_chain = false;

        loop {
            match self.peek() {
                TokenKind::Dot => {
                    self.advance()?;
                    let property = self.parse_identifier_name()?;
                    expr = self.member(expr, MemberProperty::Identifier(property), false, start);
                }
                TokenKind::LeftBracket => {
                    self.advance()?;
                    let property = self.parse_expression()?;
                    self.expect(TokenKind::RightBracket)?;
                    expr = self.member(
                        expr,
                        MemberProperty::Expression(Box::new(property)),
                        false,
                        start,
                    );
                }
                TokenKind::LeftParen => {
                    let arguments = self.parse_arguments()?;
                    expr = Expression::Call(Box::new(CallExpression {
                        callee: expr,
                        arguments,
                        optional: false,
                        span: self.span_from(start),
                    }));
                }
                TokenKind::QuestionDot => {
                    self.advance()?;
                    in_chain = true;
                    match self.peek() {
                        TokenKind::LeftParen => {
                            let arguments = self.parse_arguments()?;
                            expr = Expression::Call(Box::new(CallExpression {
                                callee: expr,
                                arguments,
                                optional: true,
                                span: self.span_from(start),
                            }));
                        }
                        TokenKind::LeftBracket => {
                            self.advance()?;
                            let property = self.parse_expression()?;
                            self.expect(TokenKind::RightBracket)?;
                            expr = self.member(
                                expr,
                                MemberProperty::Expression(Box::new(property)),
                                true,
                                start,
                            );
                        }
                        TokenKind::Template => {
                            let loc = self.location();
                            return Err(self.error(
                                messages::INVALID_TAGGED_TEMPLATE_ON_OPTIONAL_CHAIN,
                                loc,
                            ));
                        }
                        _ => {
                            let property = self.parse_identifier_name()?;
                            expr =
                                self.member(expr, MemberProperty::Identifier(property), true, start);
                        }
                    }
                }
                TokenKind::Template if self.lookahead.is_head => {
                    if in_chain {
                        let loc = self.location();
                        return Err(
                            self.error(messages::INVALID_TAGGED_TEMPLATE_ON_OPTIONAL_CHAIN, loc)
                        );
                    }
                    let quasi = self.parse_template_literal()?;
                    expr = Expression::TaggedTemplate(Box::new(TaggedTemplate {
                        tag: expr,
                        quasi,
                        span: self.span_from(start),
                    }));
                }
                _ => break,
            }
        }

        if in_chain {
            expr = Expression::Chain(Box::new(ChainExpression {
                expression: expr,
                span: self.span_from(start),
            }));
        }
        Ok(expr)
    }

    fn member(
        &self,
        object: Expression,
        property: MemberProperty,
        optional: bool,
        start: SourceLocation,
    ) -> Expression {
        Expression::Member(Box::new(MemberExpression {
            object,
            property,
            optional,
            span: self.span_from(start),
        }))
    }

    /// `new callee(args)`; the callee is a member expression so that a call never
    /// binds to it before `new` does
    fn parse_new_expression(&mut self) -> Result<Expression> {
        let start = self.location();
        self.expect(TokenKind::Keyword(Keyword::New))?;

        let mut callee = if self.peek() == TokenKind::Keyword(Keyword::New) {
            self.parse_new_expression()?
        } else {
            self.parse_primary_expression()?
        };
        let callee_start = callee.span().start;

        loop {
            match self.peek() {
                TokenKind::Dot => {
                    self.advance()?;
                    let property = self.parse_identifier_name()?;
                    callee = self.member(
                        callee,
                        MemberProperty::Identifier(property),
                        false,
                        callee_start,
                    );
                }
                TokenKind::LeftBracket => {
                    self.advance()?;
                    let property = self.parse_expression()?;
                    self.expect(TokenKind::RightBracket)?;
                    callee = self.member(
                        callee,
                        MemberProperty::Expression(Box::new(property)),
                        false,
                        callee_start,
                    );
                }
                TokenKind::Template if self.lookahead.is_head => {
                    let quasi = self.parse_template_literal()?;
                    callee = Expression::TaggedTemplate(Box::new(TaggedTemplate {
                        tag: callee,
                        quasi,
                        span: self.span_from(callee_start),
                    }));
                }
                TokenKind::QuestionDot => {
                    let loc = self.location();
                    return Err(self.error("Invalid optional chain from new expression", loc));
                }
                _ => break,
            }
        }

        let arguments = if self.peek() == TokenKind::LeftParen {
            self.parse_arguments()?
        } else {
            Vec::new()
        };

        Ok(Expression::New(Box::new(NewExpression {
            callee,
            arguments,
            span: self.span_from(start),
        })))
    }

    /// `(a, ...b)` argument list
    fn parse_arguments(&mut self) -> Result<Vec<Expression>> {
        self.expect(TokenKind::LeftParen)?;
        let mut arguments = Vec::new();

        while self.peek() != TokenKind::RightParen {
            let argument = if self.peek() == TokenKind::DotDotDot {
                self.parse_spread_element()?
            } else {
                self.parse_assignment_expression()?
            };
            arguments.push(argument);

            if self.peek() != TokenKind::RightParen {
                self.expect(TokenKind::Comma)?;
            }
        }

        self.expect(TokenKind::RightParen)?;
        Ok(arguments)
    }

    fn parse_spread_element(&mut self) -> Result<Expression> {
        let start = self.location();
        self.expect(TokenKind::DotDotDot)?;
        let argument = self.parse_assignment_expression()?;
        Ok(Expression::Spread(Box::new(SpreadElement {
            argument,
            span: self.span_from(start),
        })))
    }

    fn parse_primary_expression(&mut self) -> Result<Expression> {
        let start = self.location();
        let arrow_allowed = start.offset == self.assignment_start;

        match self.peek() {
            TokenKind::Identifier => {
                let id = self.parse_identifier()?;
                if arrow_allowed && self.peek() == TokenKind::Arrow {
                    return self.parse_arrow_function(vec![Pattern::Identifier(id)], start);
                }
                Ok(Expression::Identifier(id))
            }
            TokenKind::Keyword(Keyword::This) => {
                self.advance()?;
                Ok(Expression::This(self.span_from(start)))
            }
            TokenKind::NumericLiteral
            | TokenKind::StringLiteral
            | TokenKind::BooleanLiteral
            | TokenKind::NullLiteral => {
                let token = self.advance()?;
                let value = match token.value {
                    TokenValue::Number(n) => LiteralValue::Number(n),
                    TokenValue::BigInt(n) => LiteralValue::BigInt(n),
                    TokenValue::String(s) => LiteralValue::String(s),
                    TokenValue::Boolean(b) => LiteralValue::Boolean(b),
                    _ => LiteralValue::Null,
                };
                Ok(Expression::Literal(Literal {
                    value,
                    span: self.span_from(start),
                }))
            }
            TokenKind::Slash | TokenKind::SlashEquals => self.parse_regex_literal(),
            TokenKind::Template if self.lookahead.is_head => {
                Ok(Expression::TemplateLiteral(self.parse_template_literal()?))
            }
            TokenKind::LeftParen => self.parse_group_expression(arrow_allowed),
            TokenKind::LeftBracket => self.parse_array_literal(),
            TokenKind::LeftBrace => self.parse_object_literal(),
            _ => Err(self.unexpected(&self.lookahead)),
        }
    }

    /// Re-scan the `/` or `/=` lookahead as a regular expression
    fn parse_regex_literal(&mut self) -> Result<Expression> {
        let start = self.location();
        let steps = self.lookahead.raw.chars().count();
        self.scanner.backtrack(steps);

        let regex = self.scanner.scan_regex()?;
        self.lookahead = regex;
        self.lookahead_end = self.scanner.location();

        let token = self.advance()?;
        match token.value {
            TokenValue::Regex(value) => Ok(Expression::RegExp(Box::new(RegExpLiteral {
                value,
                span: self.span_from(start),
            }))),
            _ => Err(self.unexpected(&token)),
        }
    }

    /// Parenthesized expression or arrow parameter list
    fn parse_group_expression(&mut self, arrow_allowed: bool) -> Result<Expression> {
        let start = self.location();
        self.expect(TokenKind::LeftParen)?;
        let outer_cover = self.cover_initializer.take();

        if self.peek() == TokenKind::RightParen {
            let close = self.advance()?;
            if !(arrow_allowed && self.peek() == TokenKind::Arrow) {
                return Err(self.unexpected(&close));
            }
            self.cover_initializer = outer_cover;
            return self.parse_arrow_function(Vec::new(), start);
        }

        let mut items = Vec::new();
        let mut rest = None;
        let mut trailing_comma = None;

        loop {
            if self.peek() == TokenKind::DotDotDot {
                let spread = self.parse_spread_element()?;
                if self.peek() != TokenKind::RightParen {
                    let loc = self.location();
                    return Err(self.error(messages::REST_PARAMETER_MUST_BE_LAST, loc));
                }
                rest = Some(spread);
                break;
            }

            items.push(self.parse_assignment_expression()?);

            if self.peek() != TokenKind::Comma {
                break;
            }
            let comma = self.advance()?;
            if self.peek() == TokenKind::RightParen {
                trailing_comma = Some(comma);
                break;
            }
        }

        let close = self.expect(TokenKind::RightParen)?;

        if arrow_allowed && self.peek() == TokenKind::Arrow {
            // Initializers inside the list belong to patterns now
            self.cover_initializer = outer_cover;

            let mut params = Vec::with_capacity(items.len() + 1);
            for item in items {
                params.push(expression_to_pattern(item).map_err(|d| self.diagnostic(d))?);
            }
            if let Some(Expression::Spread(spread)) = rest {
                let rest = spread_to_rest(*spread).map_err(|d| self.diagnostic(d))?;
                params.push(Pattern::Rest(Box::new(rest)));
            }
            return self.parse_arrow_function(params, start);
        }

        if rest.is_some() {
            return Err(self.unexpected(&self.lookahead));
        }
        if trailing_comma.is_some() {
            return Err(self.unexpected(&close));
        }
        if let Some(location) = self.cover_initializer {
            return Err(self.error("Invalid shorthand property initializer", location));
        }
        self.cover_initializer = outer_cover;

        let expression = if items.len() == 1 {
            items.remove(0)
        } else {
            let span = items[0].span().merge(items[items.len() - 1].span());
            Expression::Sequence(Box::new(SequenceExpression {
                expressions: items,
                span,
            }))
        };

        Ok(Expression::Parenthesized(Box::new(ParenthesizedExpression {
            expression,
            span: self.span_from(start),
        })))
    }

    /// `=> body` after a converted parameter list
    fn parse_arrow_function(
        &mut self,
        params: Vec<Pattern>,
        start: SourceLocation,
    ) -> Result<Expression> {
        if let Some(duplicate) = find_duplicate_binding(&params) {
            return Err(self.error(messages::DUPLICATE_PARAMETER, duplicate.span.start));
        }

        self.expect(TokenKind::Arrow)?;
        let body = self.parse_assignment_expression()?;

        Ok(Expression::Arrow(Box::new(ArrowFunction {
            params,
            body,
            span: self.span_from(start),
        })))
    }

    fn parse_array_literal(&mut self) -> Result<Expression> {
        let start = self.location();
        self.expect(TokenKind::LeftBracket)?;

        let mut elements = Vec::new();
        let mut comma_after_spread = None;
        loop {
            match self.peek() {
                TokenKind::RightBracket => break,
                TokenKind::Comma => {
                    self.advance()?;
                    elements.push(None);
                }
                _ => {
                    let is_spread = self.peek() == TokenKind::DotDotDot;
                    let element = if is_spread {
                        self.parse_spread_element()?
                    } else {
                        self.parse_assignment_expression()?
                    };
                    elements.push(Some(element));
                    if self.peek() != TokenKind::RightBracket {
                        let comma = self.location();
                        self.expect(TokenKind::Comma)?;
                        if is_spread && self.peek() == TokenKind::RightBracket {
                            comma_after_spread = Some(self.span_from(comma));
                        }
                    }
                }
            }
        }

        self.expect(TokenKind::RightBracket)?;
        Ok(Expression::Array(ArrayExpression {
            elements,
            comma_after_spread,
            span: self.span_from(start),
        }))
    }

    fn parse_object_literal(&mut self) -> Result<Expression> {
        let start = self.location();
        self.expect(TokenKind::LeftBrace)?;

        let mut properties = Vec::new();
        while self.peek() != TokenKind::RightBrace {
            properties.push(self.parse_object_property()?);
            if self.peek() != TokenKind::RightBrace {
                self.expect(TokenKind::Comma)?;
            }
        }

        self.expect(TokenKind::RightBrace)?;
        Ok(Expression::Object(ObjectExpression {
            properties,
            span: self.span_from(start),
        }))
    }

    fn parse_object_property(&mut self) -> Result<ObjectProperty> {
        let start = self.location();

        if self.peek() == TokenKind::DotDotDot {
            self.advance()?;
            let argument = self.parse_assignment_expression()?;
            return Ok(ObjectProperty::Spread(SpreadElement {
                argument,
                span: self.span_from(start),
            }));
        }

        let (key, is_reference) = self.parse_property_key()?;

        if self.consume(TokenKind::Colon)? {
            let value = self.parse_assignment_expression()?;
            return Ok(ObjectProperty::Property(Property {
                key,
                value,
                shorthand: false,
                span: self.span_from(start),
            }));
        }

        let id = match (&key, is_reference) {
            (PropertyKey::Identifier(id), true) => id.clone(),
            _ => return Err(self.unexpected(&self.lookahead)),
        };

        // `{a = 1}` is only valid once the object becomes a pattern
        let value = if self.peek() == TokenKind::Equals {
            if self.cover_initializer.is_none() {
                self.cover_initializer = Some(self.location());
            }
            self.advance()?;
            let right = self.parse_assignment_expression()?;
            Expression::Assignment(Box::new(AssignmentExpression {
                operator: AssignmentOperator::Assign,
                left: AssignmentTarget::Identifier(id),
                right,
                span: self.span_from(start),
            }))
        } else {
            Expression::Identifier(id)
        };

        Ok(ObjectProperty::Property(Property {
            key,
            value,
            shorthand: true,
            span: self.span_from(start),
        }))
    }

    /// Property key, and whether it may double as a shorthand reference
    fn parse_property_key(&mut self) -> Result<(PropertyKey, bool)> {
        let start = self.location();
        match self.peek() {
            TokenKind::Identifier => Ok((PropertyKey::Identifier(self.parse_identifier()?), true)),
            TokenKind::Keyword(_) | TokenKind::BooleanLiteral | TokenKind::NullLiteral => {
                let token = self.advance()?;
                let id = Identifier::new(token.raw, self.span_from(start));
                Ok((PropertyKey::Identifier(id), false))
            }
            TokenKind::StringLiteral => {
                let token = self.advance()?;
                let value = match token.value {
                    TokenValue::String(s) => s,
                    _ => String::new(),
                };
                Ok((PropertyKey::String(value), false))
            }
            TokenKind::NumericLiteral => {
                let token = self.advance()?;
                let key = match token.value {
                    TokenValue::Number(n) => PropertyKey::Number(n),
                    TokenValue::BigInt(n) => PropertyKey::String(n.to_string()),
                    _ => return Err(self.unexpected(&token)),
                };
                Ok((key, false))
            }
            TokenKind::LeftBracket => {
                self.advance()?;
                let key = self.parse_assignment_expression()?;
                self.expect(TokenKind::RightBracket)?;
                Ok((PropertyKey::Computed(Box::new(key)), false))
            }
            _ => Err(self.unexpected(&self.lookahead)),
        }
    }

    /// Template literal starting at a head segment
    fn parse_template_literal(&mut self) -> Result<TemplateLiteral> {
        let start = self.location();
        let mut quasis = Vec::new();
        let mut expressions = Vec::new();

        let mut token = self.expect(TokenKind::Template)?;
        loop {
            let span = Span::new(token.location(), self.last_end);
            let tail = token.is_tail;
            let (cooked, raw) = match token.value {
                TokenValue::Template { cooked, raw } => (cooked, raw),
                _ => return Err(self.error(messages::UNTERMINATED_TEMPLATE, span.start)),
            };
            quasis.push(TemplateElement {
                raw,
                cooked,
                tail,
                span,
            });
            if tail {
                break;
            }

            expressions.push(self.parse_expression()?);
            if self.peek() != TokenKind::Template || self.lookahead.is_head {
                return Err(self.unexpected(&self.lookahead));
            }
            token = self.advance()?;
        }

        Ok(TemplateLiteral {
            quasis,
            expressions,
            span: self.span_from(start),
        })
    }

    fn parse_identifier(&mut self) -> Result<Identifier> {
        let start = self.location();
        let token = self.expect(TokenKind::Identifier)?;
        let name = token.value.as_str().unwrap_or(token.raw).to_string();
        Ok(Identifier::new(name, self.span_from(start)))
    }

    /// Identifier after `.`; reserved words are allowed here
    fn parse_identifier_name(&mut self) -> Result<Identifier> {
        match self.peek() {
            TokenKind::Identifier => self.parse_identifier(),
            TokenKind::Keyword(_) | TokenKind::BooleanLiteral | TokenKind::NullLiteral => {
                let start = self.location();
                let token = self.advance()?;
                Ok(Identifier::new(token.raw, self.span_from(start)))
            }
            _ => Err(self.unexpected(&self.lookahead)),
        }
    }
}

/// Parse source text into an expression tree
pub fn parse(source: &str) -> Result<Expression> {
    Parser::parse(source)
}

/// Binding power of a binary or logical operator, 0 for anything else
fn binary_precedence(kind: TokenKind) -> u8 {
    match kind {
        TokenKind::QuestionQuestion => 1,
        TokenKind::PipePipe => 2,
        TokenKind::AmpersandAmpersand => 3,
        TokenKind::Pipe => 4,
        TokenKind::Caret => 5,
        TokenKind::Ampersand => 6,
        TokenKind::EqualsEquals
        | TokenKind::BangEquals
        | TokenKind::EqualsEqualsEquals
        | TokenKind::BangEqualsEquals => 7,
        TokenKind::Less
        | TokenKind::Greater
        | TokenKind::LessEquals
        | TokenKind::GreaterEquals
        | TokenKind::Keyword(Keyword::In)
        | TokenKind::Keyword(Keyword::Instanceof) => 8,
        TokenKind::LessLess | TokenKind::GreaterGreater | TokenKind::GreaterGreaterGreater => 9,
        TokenKind::Plus | TokenKind::Minus => 10,
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => 11,
        _ => 0,
    }
}

fn binary_operator(kind: TokenKind) -> Option<BinaryOperator> {
    let op = match kind {
        TokenKind::Plus => BinaryOperator::Add,
        TokenKind::Minus => BinaryOperator::Sub,
        TokenKind::Star => BinaryOperator::Mul,
        TokenKind::Slash => BinaryOperator::Div,
        TokenKind::Percent => BinaryOperator::Mod,
        TokenKind::StarStar => BinaryOperator::Pow,
        TokenKind::EqualsEquals => BinaryOperator::Eq,
        TokenKind::BangEquals => BinaryOperator::Ne,
        TokenKind::EqualsEqualsEquals => BinaryOperator::StrictEq,
        TokenKind::BangEqualsEquals => BinaryOperator::StrictNe,
        TokenKind::Less => BinaryOperator::Lt,
        TokenKind::LessEquals => BinaryOperator::Le,
        TokenKind::Greater => BinaryOperator::Gt,
        TokenKind::GreaterEquals => BinaryOperator::Ge,
        TokenKind::LessLess => BinaryOperator::Shl,
        TokenKind::GreaterGreater => BinaryOperator::Shr,
        TokenKind::GreaterGreaterGreater => BinaryOperator::UShr,
        TokenKind::Ampersand => BinaryOperator::BitwiseAnd,
        TokenKind::Pipe => BinaryOperator::BitwiseOr,
        TokenKind::Caret => BinaryOperator::BitwiseXor,
        TokenKind::Keyword(Keyword::In) => BinaryOperator::In,
        TokenKind::Keyword(Keyword::Instanceof) => BinaryOperator::Instanceof,
        _ => return None,
    };
    Some(op)
}

fn logical_operator(kind: TokenKind) -> Option<LogicalOperator> {
    match kind {
        TokenKind::AmpersandAmpersand => Some(LogicalOperator::And),
        TokenKind::PipePipe => Some(LogicalOperator::Or),
        TokenKind::QuestionQuestion => Some(LogicalOperator::NullishCoalescing),
        _ => None,
    }
}

fn update_operator(kind: TokenKind) -> Option<UpdateOperator> {
    match kind {
        TokenKind::PlusPlus => Some(UpdateOperator::Increment),
        TokenKind::MinusMinus => Some(UpdateOperator::Decrement),
        _ => None,
    }
}

fn assignment_operator(kind: TokenKind) -> Option<AssignmentOperator> {
    let op = match kind {
        TokenKind::Equals => AssignmentOperator::Assign,
        TokenKind::PlusEquals => AssignmentOperator::AddAssign,
        TokenKind::MinusEquals => AssignmentOperator::SubAssign,
        TokenKind::StarEquals => AssignmentOperator::MulAssign,
        TokenKind::SlashEquals => AssignmentOperator::DivAssign,
        TokenKind::PercentEquals => AssignmentOperator::ModAssign,
        TokenKind::StarStarEquals => AssignmentOperator::PowAssign,
        TokenKind::LessLessEquals => AssignmentOperator::ShlAssign,
        TokenKind::GreaterGreaterEquals => AssignmentOperator::ShrAssign,
        TokenKind::GreaterGreaterGreaterEquals => AssignmentOperator::UShrAssign,
        TokenKind::AmpersandEquals => AssignmentOperator::BitwiseAndAssign,
        TokenKind::PipeEquals => AssignmentOperator::BitwiseOrAssign,
        TokenKind::CaretEquals => AssignmentOperator::BitwiseXorAssign,
        TokenKind::AmpersandAmpersandEquals => AssignmentOperator::AndAssign,
        TokenKind::PipePipeEquals => AssignmentOperator::OrAssign,
        TokenKind::QuestionQuestionEquals => AssignmentOperator::NullishAssign,
        _ => return None,
    };
    Some(op)
}

/// `??` next to an unparenthesized `&&`/`||` operand (or the reverse)
fn mixes_coalescing(operator: LogicalOperator, operand: &Expression) -> bool {
    let Expression::Logical(inner) = operand else {
        return false;
    };
    let is_coalescing = |op: LogicalOperator| op == LogicalOperator::NullishCoalescing;
    is_coalescing(operator) != is_coalescing(inner.operator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn print(source: &str) -> String {
        parse(source).unwrap().to_string()
    }

    fn error_message(source: &str) -> String {
        parse(source).unwrap_err().message().to_string()
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(parse("42").unwrap().node_type(), NodeType::Literal);
        assert_eq!(parse("'hello'").unwrap().node_type(), NodeType::Literal);
        assert_eq!(parse("true").unwrap().node_type(), NodeType::Literal);
        assert_eq!(parse("null").unwrap().node_type(), NodeType::Literal);
        assert_eq!(parse("undefined").unwrap().node_type(), NodeType::Identifier);
        assert_eq!(parse("this").unwrap().node_type(), NodeType::ThisExpression);
        assert_eq!(parse("10n").unwrap().to_string(), "10n");
    }

    #[test]
    fn test_parse_binary_expression() {
        let expr = parse("1 + 2 * 3").unwrap();
        match expr {
            Expression::Binary(b) => {
                assert_eq!(b.operator, BinaryOperator::Add);
                assert_eq!(b.right.node_type(), NodeType::BinaryExpression);
            }
            other => panic!("Expected binary expression, got {:?}", other),
        }
        assert_eq!(print("a - b - c"), "a - b - c");
        assert_eq!(print("(1 + 2) * 3"), "(1 + 2) * 3");
    }

    #[test]
    fn test_left_associativity() {
        match parse("a - b - c").unwrap() {
            Expression::Binary(b) => {
                assert_eq!(b.left.to_string(), "a - b");
                assert_eq!(b.right.to_string(), "c");
            }
            other => panic!("Expected binary expression, got {:?}", other),
        }
    }

    #[test]
    fn test_exponentiation() {
        match parse("2 ** 3 ** 2").unwrap() {
            Expression::Binary(b) => {
                assert_eq!(b.operator, BinaryOperator::Pow);
                assert_eq!(b.right.to_string(), "3 ** 2");
            }
            other => panic!("Expected binary expression, got {:?}", other),
        }
        assert_eq!(error_message("-2 ** 2"), messages::UNARY_BEFORE_EXPONENTIATION);
        assert!(parse("(-2) ** 2").is_ok());
    }

    #[test]
    fn test_mixed_coalescing() {
        assert_eq!(error_message("a ?? b || c"), messages::MIXED_COALESCING_AND_LOGICAL);
        assert_eq!(error_message("a || b ?? c"), messages::MIXED_COALESCING_AND_LOGICAL);
        assert_eq!(error_message("a && b ?? c"), messages::MIXED_COALESCING_AND_LOGICAL);
        assert_eq!(
            error_message("a ?? b && c || d"),
            messages::MIXED_COALESCING_AND_LOGICAL
        );
        assert!(parse("(a ?? b) || c").is_ok());
        assert!(parse("a ?? (b || c)").is_ok());
        assert!(parse("a ?? b ?? c").is_ok());
        assert!(parse("a || b && c").is_ok());
    }

    #[test]
    fn test_parse_arrow_function() {
        let expr = parse("(a, b) => a + b").unwrap();
        match &expr {
            Expression::Arrow(arrow) => {
                assert_eq!(arrow.params.len(), 2);
                assert_eq!(arrow.body.node_type(), NodeType::BinaryExpression);
            }
            other => panic!("Expected arrow, got {:?}", other),
        }
        assert_eq!(print("x => x * 2"), "(x) => x * 2");
        assert_eq!(print("() => 1"), "() => 1");
        assert_eq!(print("(a, ...rest) => rest"), "(a, ...rest) => rest");
        assert_eq!(
            print("({a, b: [c, ...d]}, e = 1) => a"),
            "({ a, b: [c, ...d] }, e = 1) => a"
        );
        assert_eq!(print("({a = 1}) => a"), "({ a = 1 }) => a");
        assert_eq!(print("(a) => ({a})"), "(a) => ({ a })");
    }

    #[test]
    fn test_arrow_errors() {
        assert_eq!(error_message("(x, x) => x"), messages::DUPLICATE_PARAMETER);
        assert_eq!(error_message("([x], {x}) => x"), messages::DUPLICATE_PARAMETER);
        assert_eq!(error_message("(...a, b) => a"), messages::REST_PARAMETER_MUST_BE_LAST);
        assert_eq!(error_message("([...a, b]) => a"), messages::REST_PARAMETER_MUST_BE_LAST);
        assert_eq!(error_message("(1) => 1"), messages::INVALID_DESTRUCTURING_TARGET);
        assert_eq!(error_message("(a.b) => 1"), messages::ILLEGAL_PROPERTY_IN_DECLARATION);
        assert_eq!(error_message("a + b => 1"), messages::MALFORMED_ARROW_PARAMETERS);
        assert_eq!(error_message("()"), messages::unexpected_token(")"));
        assert_eq!(error_message("({a = 1})"), "Invalid shorthand property initializer");
    }

    #[test]
    fn test_duplicate_parameter_location() {
        let err = parse("(x, x) => x").unwrap_err();
        assert_eq!(err.location().map(|l| l.offset), Some(4));
    }

    #[test]
    fn test_parse_assignment() {
        let expr = parse("a.b += 1").unwrap();
        match expr {
            Expression::Assignment(a) => {
                assert_eq!(a.operator, AssignmentOperator::AddAssign);
                assert!(matches!(a.left, AssignmentTarget::Member(_)));
            }
            other => panic!("Expected assignment, got {:?}", other),
        }
        assert_eq!(print("a = b = 1"), "a = b = 1");
        assert_eq!(print("[a, b] = [b, a]"), "[a, b] = [b, a]");
        assert_eq!(print("({a = 1, b} = o)"), "({ a = 1, b } = o)");
        assert_eq!(print("([x] = [1]) => x"), "([x] = [1]) => x");
        assert_eq!(error_message("[a] += 1"), messages::INVALID_LHS_IN_ASSIGNMENT);
        assert_eq!(error_message("[a.b] = c"), messages::ILLEGAL_PROPERTY_IN_DECLARATION);
        assert_eq!(error_message("1 = 2"), messages::INVALID_LHS_IN_ASSIGNMENT);
        assert_eq!(error_message("a + b = 2"), messages::INVALID_LHS_IN_ASSIGNMENT);
        assert_eq!(error_message("a?.b = 2"), messages::INVALID_LHS_IN_ASSIGNMENT);
        assert_eq!(error_message("++1"), messages::INVALID_LHS_IN_PREFIX_OP);
        assert_eq!(error_message("a()++"), messages::INVALID_LHS_IN_POSTFIX_OP);
    }

    #[test]
    fn test_optional_chain() {
        let expr = parse("a?.b.c").unwrap();
        assert_eq!(expr.node_type(), NodeType::ChainExpression);
        assert_eq!(expr.to_string(), "a?.b.c");
        assert_eq!(print("a?.[0]?.(1)"), "a?.[0]?.(1)");
        assert_eq!(
            error_message("a?.b`x`"),
            messages::INVALID_TAGGED_TEMPLATE_ON_OPTIONAL_CHAIN
        );
    }

    #[test]
    fn test_new_expression() {
        match parse("new a.b()").unwrap() {
            Expression::New(n) => {
                assert_eq!(n.callee.node_type(), NodeType::MemberExpression);
                assert!(n.arguments.is_empty());
            }
            other => panic!("Expected new, got {:?}", other),
        }
        match parse("new Foo(1).bar").unwrap() {
            Expression::Member(m) => assert_eq!(m.object.node_type(), NodeType::NewExpression),
            other => panic!("Expected member, got {:?}", other),
        }
        assert_eq!(print("new Date"), "new Date()");
    }

    #[test]
    fn test_template_literal() {
        match parse("`a${b}c${d + 1}`").unwrap() {
            Expression::TemplateLiteral(t) => {
                assert_eq!(t.quasis.len(), 3);
                assert_eq!(t.expressions.len(), 2);
                assert!(t.quasis[2].tail);
            }
            other => panic!("Expected template, got {:?}", other),
        }
        assert_eq!(print("tag`x${y}`"), "tag`x${y}`");
        assert_eq!(print("`${ {a: 1}.a }`"), "`${{ a: 1 }.a}`");
    }

    #[test]
    fn test_regex_literal() {
        assert_eq!(print("/ab+c/gi"), "/ab+c/gi");
        assert_eq!(print("a / b / c"), "a / b / c");
        assert_eq!(print("x.replace(/=/g, '')"), "x.replace(/=/g, \"\")");
    }

    #[test]
    fn test_objects_and_arrays() {
        assert_eq!(print("{a: 1, 'b': 2, [c]: 3, d, ...e}"), "{ a: 1, \"b\": 2, [c]: 3, d, ...e }");
        assert_eq!(print("{ if: 1, true: 2 }.if"), "{ if: 1, true: 2 }.if");
        assert_eq!(print("[1, , 3, ...a]"), "[1, , 3, ...a]");
        assert_eq!(print("[,]"), "[,]");
        assert_eq!(print("{}"), "{ }");
    }

    #[test]
    fn test_unexpected_tokens() {
        assert_eq!(error_message("1 +"), messages::UNEXPECTED_END_OF_INPUT);
        assert_eq!(error_message("a b"), messages::UNEXPECTED_IDENTIFIER);
        assert_eq!(error_message("a 1"), messages::UNEXPECTED_NUMBER);
        assert_eq!(error_message("a 'b'"), messages::UNEXPECTED_STRING);
        assert_eq!(error_message("{`a`: 1}"), messages::UNEXPECTED_TEMPLATE_STRING);
        assert_eq!(error_message("a )"), messages::unexpected_token(")"));
        assert_eq!(error_message(""), messages::UNEXPECTED_END_OF_INPUT);
    }

    #[test]
    fn test_eof_error_offset() {
        let source = "1 + ";
        let err = parse(source).unwrap_err();
        assert!(err.is_syntax_error());
        assert_eq!(err.location().map(|l| l.offset), Some(source.len()));
    }

    #[test]
    fn test_sequence_and_conditional() {
        assert_eq!(print("(a, b, c)"), "(a, b, c)");
        assert_eq!(print("a ? b : c ? d : e"), "a ? b : c ? d : e");
        assert_eq!(print("a ? b => b : c => c"), "a ? (b) => b : (c) => c");
    }

    #[test]
    fn test_unary_operators() {
        assert_eq!(print("typeof a"), "typeof a");
        assert_eq!(print("- -a"), "- -a");
        assert_eq!(print("-(-a)"), "-(-a)");
        assert_eq!(print("!a"), "!a");
        assert_eq!(print("void 0"), "void 0");
    }
}
