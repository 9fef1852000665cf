//! Error types for the expression engine

use std::fmt;
use thiserror::Error;

/// Source location in expression source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: u32,
    /// Column number (1-indexed)
    pub column: u32,
    /// Byte offset in source
    pub offset: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: u32, column: u32, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Format a source context with caret pointer for errors
pub fn format_error_context(source: &str, location: &SourceLocation) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let line_idx = (location.line.saturating_sub(1)) as usize;

    if line_idx >= lines.len() {
        return String::new();
    }

    let mut result = String::new();
    let line_num_width = format!("{}", location.line + 1).len().max(3);

    // Show 1 line before if available
    if line_idx > 0 {
        result.push_str(&format!(
            "{:>width$} | {}\n",
            location.line - 1,
            lines[line_idx - 1],
            width = line_num_width
        ));
    }

    result.push_str(&format!(
        "{:>width$} | {}\n",
        location.line,
        lines[line_idx],
        width = line_num_width
    ));

    let pointer_offset = (location.column.saturating_sub(1)) as usize;
    result.push_str(&format!(
        "{:>width$} | {}^\n",
        "",
        " ".repeat(pointer_offset),
        width = line_num_width
    ));

    result
}

/// Main error type for the expression engine
#[derive(Error, Debug, Clone)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    /// Scanner error - malformed literal or invalid character
    #[error("SyntaxError: {message} at {location}{}", if source_context.is_empty() { String::new() } else { format!("\n{}", source_context) })]
    LexerError {
        message: String,
        location: SourceLocation,
        source_context: String,
    },

    /// Parser error - invalid syntax
    #[error("SyntaxError: {message} at {location}{}", if source_context.is_empty() { String::new() } else { format!("\n{}", source_context) })]
    ParseError {
        message: String,
        location: SourceLocation,
        source_context: String,
    },

    /// Evaluation error - TypeError, ReferenceError, etc.
    #[error("{kind}: {message}")]
    RuntimeError { kind: ErrorKind, message: String },

    /// Internal engine error
    #[error("InternalError: {0}")]
    InternalError(String),
}

/// Runtime error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::enum_variant_names)]
pub enum ErrorKind {
    /// TypeError - wrong type for operation
    TypeError,
    /// ReferenceError - undefined variable
    ReferenceError,
    /// RangeError - value out of range
    RangeError,
    /// SyntaxError - raised while evaluating (e.g. invalid regex built at runtime)
    SyntaxError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::TypeError => write!(f, "TypeError"),
            ErrorKind::ReferenceError => write!(f, "ReferenceError"),
            ErrorKind::RangeError => write!(f, "RangeError"),
            ErrorKind::SyntaxError => write!(f, "SyntaxError"),
        }
    }
}

impl Error {
    /// Create a new lexer error
    pub fn lexer_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Error::LexerError {
            message: message.into(),
            location,
            source_context: String::new(),
        }
    }

    /// Create a new lexer error with source context
    pub fn lexer_error_with_context(
        message: impl Into<String>,
        location: SourceLocation,
        source: &str,
    ) -> Self {
        Error::LexerError {
            message: message.into(),
            source_context: format_error_context(source, &location),
            location,
        }
    }

    /// Create a new parse error
    pub fn parse_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Error::ParseError {
            message: message.into(),
            location,
            source_context: String::new(),
        }
    }

    /// Create a new parse error with source context
    pub fn parse_error_with_context(
        message: impl Into<String>,
        location: SourceLocation,
        source: &str,
    ) -> Self {
        Error::ParseError {
            message: message.into(),
            source_context: format_error_context(source, &location),
            location,
        }
    }

    /// Create a TypeError
    pub fn type_error(message: impl Into<String>) -> Self {
        Error::RuntimeError {
            kind: ErrorKind::TypeError,
            message: message.into(),
        }
    }

    /// Create a ReferenceError
    pub fn reference_error(message: impl Into<String>) -> Self {
        Error::RuntimeError {
            kind: ErrorKind::ReferenceError,
            message: message.into(),
        }
    }

    /// Create a RangeError
    pub fn range_error(message: impl Into<String>) -> Self {
        Error::RuntimeError {
            kind: ErrorKind::RangeError,
            message: message.into(),
        }
    }

    /// Create a SyntaxError raised during evaluation
    pub fn syntax_error(message: impl Into<String>) -> Self {
        Error::RuntimeError {
            kind: ErrorKind::SyntaxError,
            message: message.into(),
        }
    }

    /// Whether this error came from the scanner or the parser
    pub fn is_syntax_error(&self) -> bool {
        matches!(self, Error::LexerError { .. } | Error::ParseError { .. })
    }

    /// Source location of a syntax error
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            Error::LexerError { location, .. } | Error::ParseError { location, .. } => {
                Some(*location)
            }
            _ => None,
        }
    }

    /// Runtime error kind, if this is an evaluation error
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::RuntimeError { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// The bare message without kind prefix, location or source context
    pub fn message(&self) -> &str {
        match self {
            Error::LexerError { message, .. }
            | Error::ParseError { message, .. }
            | Error::RuntimeError { message, .. }
            | Error::InternalError(message) => message,
        }
    }
}

/// Result type alias for the expression engine
pub type Result<T> = std::result::Result<T, Error>;

/// Standardized error message templates
///
/// Syntax messages follow the wording V8 uses so that diagnostics read the same as the
/// ones users see in a browser console.
pub mod messages {
    // Scanner
    pub const INVALID_OR_UNEXPECTED_TOKEN: &str = "Invalid or unexpected token";
    pub const INVALID_HEX_ESCAPE_SEQUENCE: &str = "Invalid hexadecimal escape sequence";
    pub const INVALID_UNICODE_ESCAPE_SEQUENCE: &str = "Invalid Unicode escape sequence";
    pub const UNDEFINED_UNICODE_CODE_POINT: &str = "Undefined Unicode code-point";
    pub const TEMPLATE_OCTAL_LITERAL: &str =
        "Octal escape sequences are not allowed in template strings";
    pub const UNTERMINATED_TEMPLATE: &str = "Unterminated template literal";
    pub const UNTERMINATED_REGEXP: &str = "Invalid regular expression: missing /";
    pub const NUMERIC_SEPARATOR_AT_END: &str =
        "Numeric separators are not allowed at the end of numeric literals";
    pub const CONTINUOUS_NUMERIC_SEPARATOR: &str =
        "Only one underscore is allowed as numeric separator";
    pub const INVALID_REGEXP_FLAGS: &str = "Invalid regular expression flags";
    pub const INVALID_BIGINT_LITERAL: &str = "Invalid BigInt literal";

    // Parser
    pub const UNEXPECTED_END_OF_INPUT: &str = "Unexpected end of input";
    pub const UNEXPECTED_NUMBER: &str = "Unexpected number";
    pub const UNEXPECTED_STRING: &str = "Unexpected string";
    pub const UNEXPECTED_TEMPLATE_STRING: &str = "Unexpected template string";
    pub const UNEXPECTED_IDENTIFIER: &str = "Unexpected identifier";
    pub const UNEXPECTED_RESERVED: &str = "Unexpected reserved word";
    pub const INVALID_LHS_IN_ASSIGNMENT: &str = "Invalid left-hand side in assignment";
    pub const INVALID_LHS_IN_PREFIX_OP: &str =
        "Invalid left-hand side expression in prefix operation";
    pub const INVALID_LHS_IN_POSTFIX_OP: &str =
        "Invalid left-hand side expression in postfix operation";
    pub const DUPLICATE_PARAMETER: &str =
        "Duplicate parameter name not allowed in this context";
    pub const INVALID_DESTRUCTURING_TARGET: &str = "Invalid destructuring assignment target";
    pub const ILLEGAL_PROPERTY_IN_DECLARATION: &str = "Illegal property in declaration context";
    pub const MALFORMED_ARROW_PARAMETERS: &str = "Malformed arrow function parameter list";
    pub const REST_PARAMETER_MUST_BE_LAST: &str = "Rest parameter must be last formal parameter";
    pub const MIXED_COALESCING_AND_LOGICAL: &str =
        "Nullish coalescing operator(??) requires parens when mixing with logical operators";
    pub const UNARY_BEFORE_EXPONENTIATION: &str = "Unary operator used immediately before exponentiation expression. Parenthesis must be used to disambiguate operator precedence";
    pub const INVALID_TAGGED_TEMPLATE_ON_OPTIONAL_CHAIN: &str =
        "Invalid tagged template on optional chain";

    // Runtime
    pub const IS_NOT_DEFINED: &str = "is not defined";
    pub const NOT_A_FUNCTION: &str = "is not a function";
    pub const NOT_A_CONSTRUCTOR: &str = "is not a constructor";
    pub const NOT_ITERABLE: &str = "is not iterable";
    pub const MIX_BIGINT: &str = "Cannot mix BigInt and other types, use explicit conversions";
    pub const BIGINT_DIVISION_BY_ZERO: &str = "Division by zero";
    pub const BIGINT_TOO_LARGE: &str = "Maximum BigInt size exceeded";
    pub const INVALID_ARRAY_LENGTH: &str = "Invalid array length";
    pub const ARRAY_TOO_LARGE: &str = "Array length exceeds the supported maximum";
    pub const INVALID_STRING_LENGTH: &str = "Invalid string length";

    /// Format an "Unexpected token X" message
    pub fn unexpected_token(token: &str) -> String {
        format!("Unexpected token '{}'", token)
    }

    /// Format a "X is not defined" error message
    pub fn not_defined(name: &str) -> String {
        format!("{} {}", name, IS_NOT_DEFINED)
    }

    /// Format a "X is not a function" error message
    pub fn not_a_function(name: &str) -> String {
        format!("{} {}", name, NOT_A_FUNCTION)
    }

    /// Format a "X is not a constructor" error message
    pub fn not_a_constructor(name: &str) -> String {
        format!("{} {}", name, NOT_A_CONSTRUCTOR)
    }

    /// Format a "X is not iterable" error message
    pub fn not_iterable(name: &str) -> String {
        format!("{} {}", name, NOT_ITERABLE)
    }

    /// Format a "Cannot read properties of X (reading 'Y')" error message
    pub fn cannot_read_property(prop: &str, of: &str) -> String {
        format!("Cannot read properties of {} (reading '{}')", of, prop)
    }

    /// Format a "Cannot set properties of X (setting 'Y')" error message
    pub fn cannot_set_property(prop: &str, of: &str) -> String {
        format!("Cannot set properties of {} (setting '{}')", of, prop)
    }

    /// Format a "Cannot destructure X" error message
    pub fn cannot_destructure(of: &str) -> String {
        format!("Cannot destructure '{}' as it is {}.", of, of)
    }

    /// Format the `in` operator misuse message
    pub fn cannot_use_in(key: &str, target: &str) -> String {
        format!("Cannot use 'in' operator to search for '{}' in {}", key, target)
    }
}
