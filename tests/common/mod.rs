//! Shared test helpers for integration tests

use surface_expression::{parse, Value};

/// Build a scope object from JSON
pub fn scope(json: serde_json::Value) -> Value {
    Value::from_json(&json)
}

/// Parse and evaluate an expression against `scope`
pub fn eval(source: &str, scope: &Value) -> surface_expression::Result<Value> {
    parse(source)?.evaluate(scope)
}

/// Evaluate and convert the result to JSON
#[allow(dead_code)]
pub fn eval_json(source: &str, scope: &Value) -> serde_json::Value {
    eval(source, scope)
        .unwrap_or_else(|e| panic!("{} failed: {}", source, e))
        .to_json()
}

/// Parse and print an expression
#[allow(dead_code)]
pub fn print(source: &str) -> String {
    parse(source)
        .unwrap_or_else(|e| panic!("{} failed to parse: {}", source, e))
        .to_string()
}

/// Parse an expression and return the syntax error message
#[allow(dead_code)]
pub fn syntax_error(source: &str) -> String {
    match parse(source) {
        Ok(expr) => panic!("{} parsed as {}", source, expr),
        Err(e) => {
            assert!(e.is_syntax_error(), "{} gave {}", source, e);
            e.message().to_string()
        }
    }
}
