//! Expression scanner/tokenizer
//!
//! This module implements a pull-based scanner that produces one token per call.
//! It supports the full literal grammar of the expression language: identifiers
//! with unicode escapes, decimal/hex/octal/binary/BigInt numbers, strings, template
//! segments, regular expressions and every punctuator.
//!
//! `/` is always scanned as a punctuator. When the parser decides from grammatical
//! position that a regular expression was intended, it calls [`Scanner::backtrack`]
//! followed by [`Scanner::scan_regex`].

pub mod chars;
mod token;

pub use token::{Keyword, RegexFlags, RegexLiteral, Token, TokenKind, TokenValue};

use crate::error::{messages, Error, Result, SourceLocation};
use chars::{
    is_binary_digit, is_decimal_digit, is_hex_digit, is_identifier_part, is_identifier_start,
    is_line_terminator, is_octal_digit, is_white_space,
};
use num_bigint::BigInt;
use num_traits::ToPrimitive;

/// Entry on the brace-nesting stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Brace {
    /// `{` of an object literal or block
    Block,
    /// `${` of a template substitution
    Interpolation,
}

/// Saved cursor state
#[derive(Debug, Clone, Copy)]
struct Mark {
    pos: usize,
    line: u32,
    column: u32,
    line_start: usize,
}

impl Mark {
    fn location(&self) -> SourceLocation {
        SourceLocation {
            line: self.line,
            column: self.column,
            offset: self.pos,
        }
    }
}

/// A scanner for expression source text
pub struct Scanner<'src> {
    /// Source code being scanned
    source: &'src str,
    /// Current position in bytes
    pos: usize,
    /// Current line number (1-indexed)
    line: u32,
    /// Current column number (1-indexed)
    column: u32,
    /// Start of current line in bytes
    line_start: usize,
    /// Open braces, used to tell a block `}` from a template `}`
    braces: Vec<Brace>,
}

impl<'src> Scanner<'src> {
    /// Create a new scanner for the given source code
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            column: 1,
            line_start: 0,
            braces: Vec::new(),
        }
    }

    /// The source being scanned
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Get current source location
    pub fn location(&self) -> SourceLocation {
        SourceLocation {
            line: self.line,
            column: self.column,
            offset: self.pos,
        }
    }

    fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            column: self.column,
            line_start: self.line_start,
        }
    }

    fn reset(&mut self, mark: Mark) {
        self.pos = mark.pos;
        self.line = mark.line;
        self.column = mark.column;
        self.line_start = mark.line_start;
    }

    /// Create a scanner error with source context
    fn error(&self, message: impl Into<String>, location: SourceLocation) -> Error {
        Error::lexer_error_with_context(message, location, self.source)
    }

    /// Check if we've reached the end of input
    fn is_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    /// Peek at next character (one ahead)
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.source[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advance and return current character
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\r' && self.peek() == Some('\n') {
            // CRLF is one line break, counted at the LF
            self.column += 1;
        } else if is_line_terminator(c) {
            self.line += 1;
            self.column = 1;
            self.line_start = self.pos;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn make_token(&self, kind: TokenKind, mark: Mark, value: TokenValue) -> Token<'src> {
        Token {
            kind,
            raw: &self.source[mark.pos..self.pos],
            value,
            start: mark.pos,
            end: self.pos,
            line_number: mark.line,
            line_start: mark.line_start,
            column: mark.column,
            is_head: false,
            is_tail: false,
            is_octal: false,
        }
    }

    /// Skip whitespace, line terminators and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<()> {
        loop {
            while let Some(c) = self.peek() {
                if is_white_space(c) || is_line_terminator(c) {
                    self.advance();
                } else {
                    break;
                }
            }

            if self.peek() == Some('/') {
                if self.peek_next() == Some('/') {
                    while let Some(c) = self.peek() {
                        if is_line_terminator(c) {
                            break;
                        }
                        self.advance();
                    }
                    continue;
                } else if self.peek_next() == Some('*') {
                    let start_loc = self.location();
                    self.advance(); // /
                    self.advance(); // *
                    loop {
                        match self.peek() {
                            None => {
                                return Err(
                                    self.error(messages::INVALID_OR_UNEXPECTED_TOKEN, start_loc)
                                );
                            }
                            Some('*') if self.peek_next() == Some('/') => {
                                self.advance(); // *
                                self.advance(); // /
                                break;
                            }
                            _ => {
                                self.advance();
                            }
                        }
                    }
                    continue;
                }
            }

            break;
        }
        Ok(())
    }

    /// Get the next token
    ///
    /// Returns an EOF token once the input is exhausted, as many times as it is called.
    pub fn next_token(&mut self) -> Result<Token<'src>> {
        self.skip_whitespace_and_comments()?;

        let mark = self.mark();
        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(self.make_token(TokenKind::Eof, mark, TokenValue::None)),
        };

        let token = if is_identifier_start(c) || c == '\\' {
            self.scan_identifier()?
        } else if is_decimal_digit(c) || (c == '.' && self.peek_next().is_some_and(is_decimal_digit))
        {
            self.scan_number()?
        } else if c == '"' || c == '\'' {
            self.scan_string(c)?
        } else if c == '`' {
            self.advance();
            self.scan_template(mark)?
        } else if c == '}' && self.braces.last() == Some(&Brace::Interpolation) {
            self.braces.pop();
            self.advance();
            self.scan_template(mark)?
        } else {
            self.scan_punctuator()?
        };

        tracing::trace!(kind = ?token.kind, raw = token.raw, offset = token.start, "token");
        Ok(token)
    }

    /// Rewind the cursor by `steps` characters on the current line
    pub fn backtrack(&mut self, steps: usize) {
        for _ in 0..steps {
            match self.source[..self.pos].chars().next_back() {
                Some(c) => {
                    debug_assert!(!is_line_terminator(c), "backtrack across a line break");
                    self.pos -= c.len_utf8();
                    self.column = self.column.saturating_sub(1).max(1);
                }
                None => break,
            }
        }
    }

    /// Scan a regular expression literal starting at the current `/`
    pub fn scan_regex(&mut self) -> Result<Token<'src>> {
        let mark = self.mark();
        if self.peek() != Some('/') {
            return Err(self.error(messages::INVALID_OR_UNEXPECTED_TOKEN, mark.location()));
        }
        self.advance();

        let mut pattern = String::new();
        let mut in_class = false;
        loop {
            let c = match self.peek() {
                Some(c) if !is_line_terminator(c) => c,
                _ => return Err(self.error(messages::UNTERMINATED_REGEXP, mark.location())),
            };
            self.advance();
            match c {
                '\\' => {
                    pattern.push(c);
                    match self.peek() {
                        Some(next) if !is_line_terminator(next) => {
                            pattern.push(next);
                            self.advance();
                        }
                        _ => {
                            return Err(self.error(messages::UNTERMINATED_REGEXP, mark.location()))
                        }
                    }
                }
                '[' => {
                    in_class = true;
                    pattern.push(c);
                }
                ']' => {
                    in_class = false;
                    pattern.push(c);
                }
                '/' if !in_class => break,
                _ => pattern.push(c),
            }
        }

        let flags_start = self.pos;
        while let Some(c) = self.peek() {
            if is_identifier_part(c) {
                self.advance();
            } else {
                break;
            }
        }
        let flag_text = &self.source[flags_start..self.pos];
        let flags = RegexFlags::parse(flag_text)
            .ok_or_else(|| self.error(messages::INVALID_REGEXP_FLAGS, mark.location()))?;

        let literal = RegexLiteral::compile(&pattern, flags).map_err(|e| {
            self.error(
                format!("Invalid regular expression: /{}/{}: {}", pattern, flag_text, e),
                mark.location(),
            )
        })?;

        let token = self.make_token(TokenKind::RegularExpression, mark, TokenValue::Regex(literal));
        tracing::trace!(raw = token.raw, "regex token");
        Ok(token)
    }

    /// Scan an identifier, keyword or literal identifier
    fn scan_identifier(&mut self) -> Result<Token<'src>> {
        let mark = self.mark();
        let mut name = String::new();
        let mut escaped = false;

        loop {
            match self.peek() {
                Some('\\') => {
                    let loc = self.location();
                    self.advance();
                    if self.peek() != Some('u') {
                        return Err(self.error(messages::INVALID_UNICODE_ESCAPE_SEQUENCE, loc));
                    }
                    self.advance();
                    let code = self.scan_unicode_escape(loc)?;
                    let first = name.is_empty();
                    let c = char::from_u32(code)
                        .filter(|&c| {
                            if first {
                                is_identifier_start(c)
                            } else {
                                is_identifier_part(c)
                            }
                        })
                        .ok_or_else(|| self.error(messages::INVALID_UNICODE_ESCAPE_SEQUENCE, loc))?;
                    name.push(c);
                    escaped = true;
                }
                Some(c) if name.is_empty() && is_identifier_start(c) => {
                    name.push(c);
                    self.advance();
                }
                Some(c) if !name.is_empty() && is_identifier_part(c) => {
                    name.push(c);
                    self.advance();
                }
                _ => break,
            }
        }

        let (kind, value) = match name.as_str() {
            "true" => (TokenKind::BooleanLiteral, TokenValue::Boolean(true)),
            "false" => (TokenKind::BooleanLiteral, TokenValue::Boolean(false)),
            "null" => (TokenKind::NullLiteral, TokenValue::None),
            word => match Keyword::from_str(word) {
                Some(keyword) => (TokenKind::Keyword(keyword), TokenValue::None),
                None => (TokenKind::Identifier, TokenValue::String(name.clone())),
            },
        };

        if escaped && kind != TokenKind::Identifier {
            return Err(self.error(
                "Keyword must not contain escaped characters",
                mark.location(),
            ));
        }

        Ok(self.make_token(kind, mark, value))
    }

    /// Scan the body of a `\u` escape (after the `u`) and return its code point
    fn scan_unicode_escape(&mut self, loc: SourceLocation) -> Result<u32> {
        if self.peek() == Some('{') {
            self.advance();
            let mut value: u32 = 0;
            let mut digits = 0;
            loop {
                match self.peek() {
                    Some('}') if digits > 0 => {
                        self.advance();
                        return Ok(value);
                    }
                    Some(c) if is_hex_digit(c) => {
                        value = value * 16 + c.to_digit(16).unwrap_or(0);
                        if value > 0x10FFFF {
                            return Err(self.error(messages::UNDEFINED_UNICODE_CODE_POINT, loc));
                        }
                        digits += 1;
                        self.advance();
                    }
                    _ => return Err(self.error(messages::INVALID_UNICODE_ESCAPE_SEQUENCE, loc)),
                }
            }
        }

        self.scan_hex_digits(4)
            .ok_or_else(|| self.error(messages::INVALID_UNICODE_ESCAPE_SEQUENCE, loc))
    }

    /// Consume exactly `count` hex digits
    fn scan_hex_digits(&mut self, count: usize) -> Option<u32> {
        let mut value = 0;
        for _ in 0..count {
            let digit = self.peek().and_then(chars::hex_value)?;
            value = value * 16 + digit;
            self.advance();
        }
        Some(value)
    }

    /// Scan a numeric literal
    fn scan_number(&mut self) -> Result<Token<'src>> {
        let mark = self.mark();

        if self.peek() == Some('0') {
            match self.peek_next() {
                Some('x') | Some('X') => return self.scan_radix_number(mark, 16),
                Some('b') | Some('B') => return self.scan_radix_number(mark, 2),
                Some('o') | Some('O') => return self.scan_radix_number(mark, 8),
                Some(c) if is_octal_digit(c) && self.is_implicit_octal() => {
                    return self.scan_legacy_octal(mark);
                }
                Some('_') => {
                    self.advance();
                    let loc = self.location();
                    return Err(
                        self.error("Numeric separator can not be used after leading 0", loc)
                    );
                }
                _ => {}
            }
        }

        let mut digits = String::new();
        let mut is_integer = true;

        if self.peek() != Some('.') {
            self.scan_digits(is_decimal_digit, &mut digits)?;
        }

        if self.peek() == Some('.') {
            is_integer = false;
            self.advance();
            digits.push('.');
            if self.peek().is_some_and(is_decimal_digit) {
                self.scan_digits(is_decimal_digit, &mut digits)?;
            }
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            is_integer = false;
            self.advance();
            digits.push('e');
            if let Some(sign @ ('+' | '-')) = self.peek() {
                digits.push(sign);
                self.advance();
            }
            if !self.peek().is_some_and(is_decimal_digit) {
                let loc = self.location();
                return Err(self.error(messages::INVALID_OR_UNEXPECTED_TOKEN, loc));
            }
            self.scan_digits(is_decimal_digit, &mut digits)?;
        }

        if self.peek() == Some('n') {
            let leading_zero = digits.len() > 1 && digits.starts_with('0');
            if !is_integer || leading_zero {
                return Err(self.error(messages::INVALID_BIGINT_LITERAL, mark.location()));
            }
            self.advance();
            self.check_after_numeric()?;
            let value = BigInt::parse_bytes(digits.as_bytes(), 10)
                .ok_or_else(|| self.error(messages::INVALID_BIGINT_LITERAL, mark.location()))?;
            return Ok(self.make_token(TokenKind::NumericLiteral, mark, TokenValue::BigInt(value)));
        }

        self.check_after_numeric()?;
        let value = parse_decimal(&digits).ok_or_else(|| {
            self.error(messages::INVALID_OR_UNEXPECTED_TOKEN, mark.location())
        })?;
        Ok(self.make_token(TokenKind::NumericLiteral, mark, TokenValue::Number(value)))
    }

    /// `0` followed only by octal digits is a legacy octal literal (`017`)
    fn is_implicit_octal(&self) -> bool {
        self.source[self.pos + 1..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .all(is_octal_digit)
    }

    fn scan_legacy_octal(&mut self, mark: Mark) -> Result<Token<'src>> {
        self.advance(); // 0
        let mut digits = String::new();
        while let Some(c) = self.peek() {
            if is_octal_digit(c) {
                digits.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if self.peek() == Some('n') {
            return Err(self.error(messages::INVALID_BIGINT_LITERAL, mark.location()));
        }
        self.check_after_numeric()?;
        let value = radix_to_f64(&digits, 8)
            .ok_or_else(|| self.error(messages::INVALID_OR_UNEXPECTED_TOKEN, mark.location()))?;
        Ok(self.make_token(TokenKind::NumericLiteral, mark, TokenValue::Number(value)))
    }

    fn scan_radix_number(&mut self, mark: Mark, radix: u32) -> Result<Token<'src>> {
        self.advance(); // 0
        self.advance(); // x, b or o

        let is_digit: fn(char) -> bool = match radix {
            16 => is_hex_digit,
            8 => is_octal_digit,
            _ => is_binary_digit,
        };

        if !self.peek().is_some_and(is_digit) {
            let loc = self.location();
            return Err(self.error(messages::INVALID_OR_UNEXPECTED_TOKEN, loc));
        }

        let mut digits = String::new();
        self.scan_digits(is_digit, &mut digits)?;

        if self.peek() == Some('n') {
            self.advance();
            self.check_after_numeric()?;
            let value = BigInt::parse_bytes(digits.as_bytes(), radix)
                .ok_or_else(|| self.error(messages::INVALID_BIGINT_LITERAL, mark.location()))?;
            return Ok(self.make_token(TokenKind::NumericLiteral, mark, TokenValue::BigInt(value)));
        }

        self.check_after_numeric()?;
        let value = radix_to_f64(&digits, radix)
            .ok_or_else(|| self.error(messages::INVALID_OR_UNEXPECTED_TOKEN, mark.location()))?;
        Ok(self.make_token(TokenKind::NumericLiteral, mark, TokenValue::Number(value)))
    }

    /// Consume digits accepted by `is_digit`, allowing single `_` separators between them
    fn scan_digits(&mut self, is_digit: fn(char) -> bool, out: &mut String) -> Result<()> {
        loop {
            match self.peek() {
                Some(c) if is_digit(c) => {
                    out.push(c);
                    self.advance();
                }
                Some('_') => {
                    let loc = self.location();
                    self.advance();
                    match self.peek() {
                        Some('_') => {
                            let loc = self.location();
                            return Err(self.error(messages::CONTINUOUS_NUMERIC_SEPARATOR, loc));
                        }
                        Some(c) if is_digit(c) => {}
                        _ => return Err(self.error(messages::NUMERIC_SEPARATOR_AT_END, loc)),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// A numeric literal must not be directly followed by an identifier or digit
    fn check_after_numeric(&self) -> Result<()> {
        match self.peek() {
            Some(c) if is_identifier_start(c) || is_decimal_digit(c) || c == '\\' => {
                Err(self.error(messages::INVALID_OR_UNEXPECTED_TOKEN, self.location()))
            }
            _ => Ok(()),
        }
    }

    /// Scan a string literal
    fn scan_string(&mut self, quote: char) -> Result<Token<'src>> {
        let mark = self.mark();
        self.advance(); // Opening quote

        let mut value = String::new();
        let mut is_octal = false;

        loop {
            match self.peek() {
                None | Some('\n') | Some('\r') => {
                    return Err(self.error(messages::INVALID_OR_UNEXPECTED_TOKEN, mark.location()));
                }
                Some('\\') => {
                    self.advance();
                    if self.scan_escape(&mut value, false)? {
                        is_octal = true;
                    }
                }
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }

        let mut token = self.make_token(TokenKind::StringLiteral, mark, TokenValue::String(value));
        token.is_octal = is_octal;
        Ok(token)
    }

    /// Process one escape sequence (the backslash is already consumed)
    ///
    /// Returns whether the escape was a legacy octal escape.
    fn scan_escape(&mut self, out: &mut String, in_template: bool) -> Result<bool> {
        let loc = self.location();
        let c = match self.advance() {
            Some(c) => c,
            None => {
                let message = if in_template {
                    messages::UNTERMINATED_TEMPLATE
                } else {
                    messages::INVALID_OR_UNEXPECTED_TOKEN
                };
                return Err(self.error(message, loc));
            }
        };

        match c {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{0008}'),
            'f' => out.push('\u{000C}'),
            'v' => out.push('\u{000B}'),
            'x' => {
                let code = self
                    .scan_hex_digits(2)
                    .ok_or_else(|| self.error(messages::INVALID_HEX_ESCAPE_SEQUENCE, loc))?;
                out.push(char::from(code as u8));
            }
            'u' => {
                let ch = self.scan_string_unicode_escape(loc)?;
                out.push(ch);
            }
            '\r' => {
                if self.peek() == Some('\n') {
                    self.advance();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            '0' if !self.peek().is_some_and(is_decimal_digit) => out.push('\0'),
            '0'..='7' => {
                if in_template {
                    return Err(self.error(messages::TEMPLATE_OCTAL_LITERAL, loc));
                }
                let mut code = c.to_digit(8).unwrap_or(0);
                let max_len = if c <= '3' { 3 } else { 2 };
                let mut len = 1;
                while len < max_len {
                    match self.peek().and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            self.advance();
                            len += 1;
                        }
                        None => break,
                    }
                }
                out.push(char::from(code as u8));
                return Ok(true);
            }
            '8' | '9' => {
                if in_template {
                    return Err(self.error(messages::TEMPLATE_OCTAL_LITERAL, loc));
                }
                out.push(c);
                return Ok(true);
            }
            other => out.push(other),
        }

        Ok(false)
    }

    /// `\u` escape inside a string, joining surrogate pairs
    fn scan_string_unicode_escape(&mut self, loc: SourceLocation) -> Result<char> {
        let code = self.scan_unicode_escape(loc)?;

        if (0xD800..=0xDBFF).contains(&code) && self.source[self.pos..].starts_with("\\u") {
            let mark = self.mark();
            self.advance(); // \
            self.advance(); // u
            match self.scan_hex_digits(4) {
                Some(low) if (0xDC00..=0xDFFF).contains(&low) => {
                    let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                    return Ok(char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
                _ => self.reset(mark),
            }
        }

        // Lone surrogates cannot live in a Rust string
        Ok(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    /// Scan a template segment after its opening `` ` `` or closing `}`
    fn scan_template(&mut self, mark: Mark) -> Result<Token<'src>> {
        let is_head = self.source[mark.pos..].starts_with('`');
        let mut cooked = String::new();
        let mut raw = String::new();

        let is_tail = loop {
            let c = match self.peek() {
                Some(c) => c,
                None => return Err(self.error(messages::UNTERMINATED_TEMPLATE, mark.location())),
            };
            match c {
                '`' => {
                    self.advance();
                    break true;
                }
                '$' if self.peek_next() == Some('{') => {
                    self.advance(); // $
                    self.advance(); // {
                    self.braces.push(Brace::Interpolation);
                    break false;
                }
                '\\' => {
                    let escape_start = self.pos;
                    self.advance();
                    self.scan_escape(&mut cooked, true)?;
                    let escape = &self.source[escape_start..self.pos];
                    raw.push_str(&escape.replace("\r\n", "\n").replace('\r', "\n"));
                }
                '\r' => {
                    self.advance();
                    if self.peek() == Some('\n') {
                        self.advance();
                    }
                    cooked.push('\n');
                    raw.push('\n');
                }
                _ => {
                    self.advance();
                    cooked.push(c);
                    raw.push(c);
                }
            }
        };

        let mut token = self.make_token(
            TokenKind::Template,
            mark,
            TokenValue::Template { cooked, raw },
        );
        token.is_head = is_head;
        token.is_tail = is_tail;
        Ok(token)
    }

    /// Scan a punctuator, longest match first
    fn scan_punctuator(&mut self) -> Result<Token<'src>> {
        let mark = self.mark();
        let c = match self.advance() {
            Some(c) => c,
            None => return Ok(self.make_token(TokenKind::Eof, mark, TokenValue::None)),
        };

        let kind = match c {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '{' => {
                self.braces.push(Brace::Block);
                TokenKind::LeftBrace
            }
            '}' => {
                if self.braces.last() == Some(&Brace::Block) {
                    self.braces.pop();
                }
                TokenKind::RightBrace
            }
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '~' => TokenKind::Tilde,
            '?' => {
                if self.peek() == Some('.') && !self.peek_next().is_some_and(is_decimal_digit) {
                    self.advance();
                    TokenKind::QuestionDot
                } else if self.peek() == Some('?') {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::QuestionQuestionEquals
                    } else {
                        TokenKind::QuestionQuestion
                    }
                } else {
                    TokenKind::Question
                }
            }
            '.' => {
                if self.peek() == Some('.') && self.peek_next() == Some('.') {
                    self.advance();
                    self.advance();
                    TokenKind::DotDotDot
                } else {
                    TokenKind::Dot
                }
            }
            '+' => {
                if self.peek() == Some('+') {
                    self.advance();
                    TokenKind::PlusPlus
                } else if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::PlusEquals
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                if self.peek() == Some('-') {
                    self.advance();
                    TokenKind::MinusMinus
                } else if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::MinusEquals
                } else {
                    TokenKind::Minus
                }
            }
            '*' => {
                if self.peek() == Some('*') {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::StarStarEquals
                    } else {
                        TokenKind::StarStar
                    }
                } else if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::StarEquals
                } else {
                    TokenKind::Star
                }
            }
            '/' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::SlashEquals
                } else {
                    TokenKind::Slash
                }
            }
            '%' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::PercentEquals
                } else {
                    TokenKind::Percent
                }
            }
            '<' => {
                if self.peek() == Some('<') {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::LessLessEquals
                    } else {
                        TokenKind::LessLess
                    }
                } else if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::LessEquals
                } else {
                    TokenKind::Less
                }
            }
            '>' => {
                if self.peek() == Some('>') {
                    self.advance();
                    if self.peek() == Some('>') {
                        self.advance();
                        if self.peek() == Some('=') {
                            self.advance();
                            TokenKind::GreaterGreaterGreaterEquals
                        } else {
                            TokenKind::GreaterGreaterGreater
                        }
                    } else if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::GreaterGreaterEquals
                    } else {
                        TokenKind::GreaterGreater
                    }
                } else if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::GreaterEquals
                } else {
                    TokenKind::Greater
                }
            }
            '=' => {
                if self.peek() == Some('=') {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::EqualsEqualsEquals
                    } else {
                        TokenKind::EqualsEquals
                    }
                } else if self.peek() == Some('>') {
                    self.advance();
                    TokenKind::Arrow
                } else {
                    TokenKind::Equals
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::BangEqualsEquals
                    } else {
                        TokenKind::BangEquals
                    }
                } else {
                    TokenKind::Bang
                }
            }
            '&' => {
                if self.peek() == Some('&') {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::AmpersandAmpersandEquals
                    } else {
                        TokenKind::AmpersandAmpersand
                    }
                } else if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::AmpersandEquals
                } else {
                    TokenKind::Ampersand
                }
            }
            '|' => {
                if self.peek() == Some('|') {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::PipePipeEquals
                    } else {
                        TokenKind::PipePipe
                    }
                } else if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::PipeEquals
                } else {
                    TokenKind::Pipe
                }
            }
            '^' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::CaretEquals
                } else {
                    TokenKind::Caret
                }
            }
            _ => {
                return Err(self.error(messages::INVALID_OR_UNEXPECTED_TOKEN, mark.location()));
            }
        };

        Ok(self.make_token(kind, mark, TokenValue::None))
    }

    /// Tokenize the entire source into a vector of tokens
    ///
    /// `/` is always reported as a punctuator here; only the parser knows when a
    /// regular expression is expected.
    pub fn tokenize(&mut self) -> Result<Vec<Token<'src>>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    /// Whether the cursor is at the end of the source
    pub fn at_end(&self) -> bool {
        self.is_eof()
    }
}

/// Parse decimal digits (separators already stripped) into a number
fn parse_decimal(digits: &str) -> Option<f64> {
    let mut normalized = String::with_capacity(digits.len() + 2);
    if digits.starts_with('.') {
        normalized.push('0');
    }
    let mut chars = digits.chars().peekable();
    while let Some(c) = chars.next() {
        normalized.push(c);
        if c == '.' && !chars.peek().is_some_and(|n| n.is_ascii_digit()) {
            normalized.push('0');
        }
    }
    lexical_core::parse::<f64>(normalized.as_bytes()).ok()
}

/// Parse digits in the given radix, rounding like a JS numeric literal
fn radix_to_f64(digits: &str, radix: u32) -> Option<f64> {
    BigInt::parse_bytes(digits.as_bytes(), radix).and_then(|n| n.to_f64())
}
