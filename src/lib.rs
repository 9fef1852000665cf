//! Surface expressions: a JavaScript expression engine written in Rust
//!
//! The crate scans, parses, prints and evaluates a subset of JavaScript made of
//! expressions only. It is meant for data binding: an expression such as
//! `user?.name ?? "anonymous"` is parsed once and evaluated against a scope object
//! many times.
//!
//! # Quick Start
//!
//! ```
//! use surface_expression::{parse, Value};
//!
//! fn main() -> surface_expression::Result<()> {
//!     let scope = Value::from_json(&serde_json::json!({"a": 2, "b": 3}));
//!     let expr = parse("a + b * 2")?;
//!     assert_eq!(expr.evaluate(&scope)?, Value::Number(8.0));
//!     assert_eq!(expr.to_string(), "a + b * 2");
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! The pipeline flows: Source → [`lexer`] → [`parser`] → [`ast`] → [`runtime`] → Value
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`lexer`] | Character classes, tokens, the scanner |
//! | [`parser`] | Operator-precedence parser and pattern reinterpretation |
//! | [`ast`] | Expression and pattern nodes, printing, the node factory |
//! | [`runtime`] | Values, operators, destructuring, the evaluator |
//! | [`error`](Error) | Error type and message templates |

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod runtime;

pub use ast::{Expression, Pattern};
pub use error::{Error, Result};
pub use parser::parse;
pub use runtime::{EvalContext, Value};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse `source` and evaluate it against `scope`
pub fn evaluate(source: &str, scope: &Value) -> Result<Value> {
    parse(source)?.evaluate(scope)
}
