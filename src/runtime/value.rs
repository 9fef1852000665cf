//! Host value types
//!
//! This module defines the runtime representation of the values expressions produce
//! and consume. Objects are reference counted and shared; scopes are ordinary objects
//! whose prototype chain models lexical nesting.

use super::number_to_string;
use crate::ast::ArrowFunction;
use crate::error::{messages, Error, Result};
use crate::lexer::chars::{is_line_terminator, is_white_space};
use crate::lexer::RegexLiteral;
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use rustc_hash::FxHashMap as HashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Type alias for native function implementations, called with `this` and arguments
pub type NativeFn = Rc<dyn Fn(&Value, &[Value]) -> Result<Value>>;

/// A host value
#[derive(Clone)]
pub enum Value {
    /// undefined
    Undefined,
    /// null
    Null,
    /// Boolean value
    Boolean(bool),
    /// Number (IEEE 754 double)
    Number(f64),
    /// BigInt (arbitrary precision integer)
    BigInt(BigInt),
    /// String
    String(String),
    /// Object (includes arrays, functions, etc.)
    Object(Rc<RefCell<Object>>),
}

impl Value {
    /// Check if value is undefined
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Check if value is nullish (null or undefined)
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Check if value can be called
    pub fn is_callable(&self) -> bool {
        match self {
            Value::Object(obj) => obj.borrow().kind.is_callable(),
            _ => false,
        }
    }

    /// Convert to boolean (truthiness)
    pub fn to_boolean(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::BigInt(n) => !n.is_zero(),
            Value::String(s) => !s.is_empty(),
            Value::Object(_) => true,
        }
    }

    /// Convert to number
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Boolean(true) => 1.0,
            Value::Boolean(false) => 0.0,
            Value::Number(n) => *n,
            Value::BigInt(n) => n.to_f64().unwrap_or(f64::NAN),
            Value::String(s) => string_to_number(s),
            Value::Object(_) => string_to_number(&self.to_js_string()),
        }
    }

    /// Convert to string the way `String(value)` does
    pub fn to_js_string(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => number_to_string(*n),
            Value::BigInt(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::Object(obj) => {
                let obj = obj.borrow();
                match &obj.kind {
                    ObjectKind::Array(arr) => arr
                        .iter()
                        .map(|v| if v.is_nullish() { String::new() } else { v.to_js_string() })
                        .collect::<Vec<_>>()
                        .join(","),
                    ObjectKind::RegExp(re) => format!("/{}/{}", re.pattern, re.flags),
                    kind if kind.is_callable() => "function () { [native code] }".to_string(),
                    _ => "[object Object]".to_string(),
                }
            }
        }
    }

    /// Get the typeof string
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Object(obj) => {
                if obj.borrow().kind.is_callable() {
                    "function"
                } else {
                    "object"
                }
            }
        }
    }

    /// Strict equality (===)
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Abstract equality (==)
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null | Value::Undefined, Value::Null | Value::Undefined) => true,
            (Value::Null | Value::Undefined, _) | (_, Value::Null | Value::Undefined) => false,

            (Value::Number(_), Value::String(_)) => {
                self.strict_equals(&Value::Number(other.to_number()))
            }
            (Value::String(_), Value::Number(_)) => {
                Value::Number(self.to_number()).strict_equals(other)
            }

            // BigInt == Number compares mathematical values
            (Value::BigInt(n), Value::Number(m)) | (Value::Number(m), Value::BigInt(n)) => {
                m.is_finite() && m.fract() == 0.0 && n.to_f64() == Some(*m)
            }
            (Value::BigInt(n), Value::String(s)) | (Value::String(s), Value::BigInt(n)) => {
                s.trim().parse::<BigInt>().map(|m| &m == n).unwrap_or(false)
            }

            (Value::Boolean(b), _) => Value::Number(if *b { 1.0 } else { 0.0 }).equals(other),
            (_, Value::Boolean(b)) => self.equals(&Value::Number(if *b { 1.0 } else { 0.0 })),

            // Objects compared with primitives go through their string form
            (Value::Object(_), Value::Object(_)) => self.strict_equals(other),
            (Value::Object(_), _) => Value::String(self.to_js_string()).equals(other),
            (_, Value::Object(_)) => self.equals(&Value::String(other.to_js_string())),

            _ => self.strict_equals(other),
        }
    }

    /// Create a new ordinary object value
    pub fn new_object() -> Value {
        Value::from_object(Object::new(ObjectKind::Ordinary))
    }

    /// Create an ordinary object from key/value pairs, keeping their order
    pub fn new_object_with_properties<K: Into<String>>(
        properties: impl IntoIterator<Item = (K, Value)>,
    ) -> Value {
        let mut object = Object::new(ObjectKind::Ordinary);
        for (key, value) in properties {
            object.insert_property(&key.into(), value);
        }
        Value::from_object(object)
    }

    /// Create a new array value
    pub fn new_array(elements: Vec<Value>) -> Value {
        Value::from_object(Object::new(ObjectKind::Array(elements)))
    }

    /// Create a callable value from a Rust closure
    pub fn new_native_function<F>(name: &str, func: F) -> Value
    where
        F: Fn(&Value, &[Value]) -> Result<Value> + 'static,
    {
        Value::from_object(Object::new(ObjectKind::NativeFunction {
            name: name.to_string(),
            func: Rc::new(func),
            constructor: false,
        }))
    }

    /// Create a native function usable with `new`
    ///
    /// The constructor gets a `prototype` object; objects it returns inherit from
    /// that object so `instanceof` recognizes them.
    pub fn new_native_constructor<F>(name: &str, func: F) -> Value
    where
        F: Fn(&Value, &[Value]) -> Result<Value> + 'static,
    {
        let mut object = Object::new(ObjectKind::NativeFunction {
            name: name.to_string(),
            func: Rc::new(func),
            constructor: true,
        });
        object.insert_property("prototype", Value::new_object());
        Value::from_object(object)
    }

    /// Wrap an object
    pub fn from_object(object: Object) -> Value {
        Value::Object(Rc::new(RefCell::new(object)))
    }

    /// Elements of an array value
    pub fn as_array(&self) -> Option<Vec<Value>> {
        match self {
            Value::Object(obj) => match &obj.borrow().kind {
                ObjectKind::Array(arr) => Some(arr.clone()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Get a property, walking the prototype chain
    ///
    /// Strings expose `length`, indices and their methods; numbers expose their
    /// methods. Returns `None` for missing properties and nullish values.
    pub fn get_property(&self, key: &str) -> Option<Value> {
        match self {
            Value::Object(obj_rc) => {
                if let Some(value) = obj_rc.borrow().get_property(key) {
                    return Some(value);
                }
                super::builtins::builtin_property(obj_rc, key)
            }
            Value::String(s) => match key {
                "length" => Some(Value::Number(s.encode_utf16().count() as f64)),
                _ => match key.parse::<usize>() {
                    Ok(index) if canonical_index(key) => code_unit_at(s, index).map(Value::String),
                    _ => super::builtins::bound_string_method(s, key),
                },
            },
            Value::Number(n) => super::builtins::bound_number_method(*n, key),
            _ => None,
        }
    }

    /// Set property on object; primitives ignore the write and return `false`
    pub fn set_property(&self, key: &str, value: Value) -> Result<bool> {
        match self {
            Value::Object(obj) => {
                // Converting a new array length may read the array itself
                let is_array = matches!(obj.borrow().kind, ObjectKind::Array(_));
                let value = match value {
                    Value::Object(_) if is_array && key == "length" => {
                        Value::Number(value.to_number())
                    }
                    value => value,
                };
                obj.borrow_mut().set_property(key, value)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Serialize to JSON; functions and undefined become null
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Undefined | Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::BigInt(n) => serde_json::Value::String(n.to_string()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Object(obj) => {
                let obj = obj.borrow();
                match &obj.kind {
                    ObjectKind::Array(arr) => {
                        serde_json::Value::Array(arr.iter().map(Value::to_json).collect())
                    }
                    ObjectKind::Ordinary => {
                        let mut map = serde_json::Map::new();
                        for key in obj.own_keys() {
                            if let Some(value) = obj.get_own_property(&key) {
                                map.insert(key, value.to_json());
                            }
                        }
                        serde_json::Value::Object(map)
                    }
                    ObjectKind::RegExp(_) => serde_json::Value::Object(serde_json::Map::new()),
                    _ => serde_json::Value::Null,
                }
            }
        }
    }

    /// Build a value from JSON
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::new_array(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::new_object_with_properties(
                map.iter().map(|(k, v)| (k.as_str(), Value::from_json(v))),
            ),
        }
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    if !n.is_finite() {
        return serde_json::Value::Null;
    }
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return serde_json::Value::from(n as i64);
    }
    serde_json::Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

/// String to number conversion (`Number("...")`)
pub fn string_to_number(s: &str) -> f64 {
    let s = s.trim_matches(|c| is_white_space(c) || is_line_terminator(c));
    if s.is_empty() {
        return 0.0;
    }

    let radix = match s.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return BigInt::parse_bytes(s[2..].as_bytes(), radix)
            .and_then(|n| n.to_f64())
            .unwrap_or(f64::NAN);
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    // Rust accepts `inf` and `nan` spellings that JS does not
    if !s
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
    {
        return f64::NAN;
    }
    s.parse().unwrap_or(f64::NAN)
}

/// `"0"`, `"17"` but not `"017"` or `"+1"`
pub(crate) fn canonical_index(key: &str) -> bool {
    !key.is_empty()
        && key.bytes().all(|b| b.is_ascii_digit())
        && (key == "0" || !key.starts_with('0'))
}

/// The UTF-16 code unit at `index`; a lone surrogate becomes U+FFFD
pub(crate) fn code_unit_at(s: &str, index: usize) -> Option<String> {
    s.encode_utf16()
        .nth(index)
        .map(|unit| String::from_utf16_lossy(&[unit]))
}

/// Array index for `key`: canonical and below 2^32 - 1
fn array_index(key: &str) -> Option<usize> {
    if !canonical_index(key) {
        return None;
    }
    key.parse::<u32>()
        .ok()
        .filter(|i| *i != u32::MAX)
        .map(|i| i as usize)
}

/// Largest dense array the runtime allocates
const MAX_ARRAY_LENGTH: usize = 1 << 24;

fn dense_length(len: usize) -> Result<usize> {
    if len > MAX_ARRAY_LENGTH {
        return Err(Error::range_error(messages::ARRAY_TOO_LARGE));
    }
    Ok(len)
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            // Same-value semantics so NaN compares equal in assertions
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            _ => self.strict_equals(other),
        }
    }
}

impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&self.to_json(), serializer)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => f.write_str(&number_to_string(*n)),
            Value::BigInt(n) => write!(f, "{}n", n),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Object(obj) => {
                let Ok(obj) = obj.try_borrow() else {
                    return f.write_str("[Object]");
                };
                match &obj.kind {
                    ObjectKind::Ordinary => {
                        let keys = obj.own_keys();
                        if keys.is_empty() {
                            return f.write_str("{}");
                        }
                        f.write_str("{ ")?;
                        for (i, key) in keys.iter().enumerate() {
                            if i > 0 {
                                f.write_str(", ")?;
                            }
                            let value = obj.get_own_property(key).unwrap_or(Value::Undefined);
                            write!(f, "{}: {:?}", key, value)?;
                        }
                        f.write_str(" }")
                    }
                    ObjectKind::Array(arr) => f.debug_list().entries(arr.iter()).finish(),
                    ObjectKind::Function(_) => f.write_str("[Function (anonymous)]"),
                    ObjectKind::NativeFunction { name, .. } => write!(f, "[Function: {}]", name),
                    ObjectKind::RegExp(re) => write!(f, "/{}/{}", re.pattern, re.flags),
                    ObjectKind::BoundArrayMethod { method, .. }
                    | ObjectKind::BoundStringMethod { method, .. }
                    | ObjectKind::BoundNumberMethod { method, .. }
                    | ObjectKind::BoundRegExpMethod { method, .. } => {
                        write!(f, "[Function: {}]", method)
                    }
                }
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_js_string())
    }
}

/// An object: properties in insertion order, a kind and an optional prototype
#[derive(Clone)]
pub struct Object {
    /// Object kind
    pub kind: ObjectKind,
    /// Properties
    properties: HashMap<String, Value>,
    /// Property names in insertion order
    keys: Vec<String>,
    /// Prototype
    pub prototype: Option<Rc<RefCell<Object>>>,
}

impl Object {
    /// Create an object of the given kind with no properties
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            properties: HashMap::default(),
            keys: Vec::new(),
            prototype: None,
        }
    }

    /// Create an ordinary object inheriting from `prototype`
    pub fn with_prototype(prototype: Option<Rc<RefCell<Object>>>) -> Self {
        Self {
            prototype,
            ..Self::new(ObjectKind::Ordinary)
        }
    }

    /// Get an own property; arrays also expose `length` and their elements
    pub fn get_own_property(&self, key: &str) -> Option<Value> {
        if let ObjectKind::Array(arr) = &self.kind {
            if key == "length" {
                return Some(Value::Number(arr.len() as f64));
            }
            if let Some(index) = array_index(key) {
                return arr.get(index).cloned();
            }
        }
        self.properties.get(key).cloned()
    }

    /// Get a property, walking the prototype chain
    pub fn get_property(&self, key: &str) -> Option<Value> {
        if let Some(value) = self.get_own_property(key) {
            return Some(value);
        }
        let mut proto = self.prototype.clone();
        while let Some(obj) = proto {
            let obj = obj.borrow();
            if let Some(value) = obj.get_own_property(key) {
                return Some(value);
            }
            proto = obj.prototype.clone();
        }
        None
    }

    /// Set an own property
    ///
    /// Array writes to `length` or past the end resize the elements; lengths outside
    /// `0..2^32-1` or beyond the dense limit are a RangeError.
    pub fn set_property(&mut self, key: &str, value: Value) -> Result<()> {
        if let ObjectKind::Array(arr) = &mut self.kind {
            if key == "length" {
                let len = value.to_number();
                if !(0.0..=u32::MAX as f64).contains(&len) || len.fract() != 0.0 {
                    return Err(Error::range_error(messages::INVALID_ARRAY_LENGTH));
                }
                arr.resize(dense_length(len as usize)?, Value::Undefined);
                return Ok(());
            }
            if let Some(index) = array_index(key) {
                if index >= arr.len() {
                    arr.resize(dense_length(index + 1)?, Value::Undefined);
                }
                arr[index] = value;
                return Ok(());
            }
        }
        self.insert_property(key, value);
        Ok(())
    }

    /// Set a named property, bypassing array index handling
    pub fn insert_property(&mut self, key: &str, value: Value) {
        if self.properties.insert(key.to_string(), value).is_none() {
            self.keys.push(key.to_string());
        }
    }

    /// Remove an own property; array elements become undefined
    pub fn delete_property(&mut self, key: &str) -> bool {
        if let ObjectKind::Array(arr) = &mut self.kind {
            if let Some(index) = array_index(key) {
                if let Some(slot) = arr.get_mut(index) {
                    *slot = Value::Undefined;
                }
                return true;
            }
        }
        if self.properties.remove(key).is_some() {
            self.keys.retain(|k| k != key);
        }
        true
    }

    /// Check for an own property
    pub fn has_own_property(&self, key: &str) -> bool {
        match &self.kind {
            ObjectKind::Array(_) if key == "length" => true,
            ObjectKind::Array(arr) => match array_index(key) {
                Some(index) => index < arr.len(),
                None => self.properties.contains_key(key),
            },
            _ => self.properties.contains_key(key),
        }
    }

    /// Check for a property anywhere on the prototype chain
    pub fn has_property(&self, key: &str) -> bool {
        if self.has_own_property(key) {
            return true;
        }
        let mut proto = self.prototype.clone();
        while let Some(obj) = proto {
            let obj = obj.borrow();
            if obj.has_own_property(key) {
                return true;
            }
            proto = obj.prototype.clone();
        }
        false
    }

    /// Own enumerable keys: array indices first, then properties in insertion order
    pub fn own_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        if let ObjectKind::Array(arr) = &self.kind {
            keys.extend((0..arr.len()).map(|i| i.to_string()));
        }
        keys.extend(self.keys.iter().cloned());
        keys
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new(ObjectKind::Ordinary)
    }
}

/// Closure created by evaluating an arrow function
#[derive(Clone)]
pub struct Closure {
    /// The function node
    pub function: Rc<ArrowFunction>,
    /// Scope the function was created in
    pub scope: Value,
}

/// Object kinds
#[derive(Clone)]
pub enum ObjectKind {
    /// Plain object, also used for scopes
    Ordinary,
    /// Array
    Array(Vec<Value>),
    /// Arrow function closure
    Function(Closure),
    /// Function implemented in Rust
    NativeFunction {
        /// Name reported in errors and debug output
        name: String,
        /// Implementation
        func: NativeFn,
        /// Whether `new` may be applied
        constructor: bool,
    },
    /// Regular expression
    RegExp(RegexLiteral),
    /// Array method bound to its receiver
    BoundArrayMethod {
        /// The array
        receiver: Rc<RefCell<Object>>,
        /// Method name
        method: String,
    },
    /// String method bound to its receiver
    BoundStringMethod {
        /// The string
        receiver: String,
        /// Method name
        method: String,
    },
    /// Number method bound to its receiver
    BoundNumberMethod {
        /// The number
        receiver: f64,
        /// Method name
        method: String,
    },
    /// RegExp method bound to its receiver
    BoundRegExpMethod {
        /// The regular expression
        receiver: RegexLiteral,
        /// Method name
        method: String,
    },
}

impl ObjectKind {
    /// Check if objects of this kind can be called
    pub fn is_callable(&self) -> bool {
        !matches!(
            self,
            ObjectKind::Ordinary | ObjectKind::Array(_) | ObjectKind::RegExp(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_equality() {
        assert!(Value::Number(1.0).strict_equals(&Value::Number(1.0)));
        assert!(!Value::Number(f64::NAN).strict_equals(&Value::Number(f64::NAN)));
        assert!(Value::Null.equals(&Value::Undefined));
        assert!(!Value::Null.equals(&Value::Number(0.0)));
        assert!(Value::String("1".into()).equals(&Value::Number(1.0)));
        assert!(Value::Boolean(true).equals(&Value::Number(1.0)));
        assert!(Value::BigInt(BigInt::from(2)).equals(&Value::Number(2.0)));
        assert!(!Value::BigInt(BigInt::from(2)).strict_equals(&Value::Number(2.0)));
    }

    #[test]
    fn test_serialize() {
        let value = Value::new_object_with_properties([
            ("n", Value::Number(2.0)),
            ("big", Value::BigInt(BigInt::from(7))),
            ("list", Value::new_array(vec![Value::Undefined, Value::Boolean(true)])),
        ]);
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            serde_json::json!({"n": 2, "big": "7", "list": [null, true]})
        );
    }

    #[test]
    fn test_value_conversion() {
        assert_eq!(Value::String("  42  ".into()).to_number(), 42.0);
        assert_eq!(Value::String("".into()).to_number(), 0.0);
        assert_eq!(Value::String("0x1F".into()).to_number(), 31.0);
        assert!(Value::String("inf".into()).to_number().is_nan());
        assert_eq!(Value::String("-Infinity".into()).to_number(), f64::NEG_INFINITY);
        assert_eq!(Value::Null.to_number(), 0.0);
        assert!(Value::Undefined.to_number().is_nan());
        assert_eq!(Value::Number(1.5).to_js_string(), "1.5");
        assert_eq!(
            Value::new_array(vec![Value::Number(1.0), Value::Null, Value::Number(2.0)])
                .to_js_string(),
            "1,,2"
        );
        assert_eq!(Value::new_object().to_js_string(), "[object Object]");
    }

    #[test]
    fn test_type_of() {
        assert_eq!(Value::Null.type_of(), "object");
        assert_eq!(Value::BigInt(BigInt::from(1)).type_of(), "bigint");
        assert_eq!(Value::new_array(vec![]).type_of(), "object");
        let f = Value::new_native_function("f", |_, _| Ok(Value::Undefined));
        assert_eq!(f.type_of(), "function");
    }

    #[test]
    fn test_array_properties() {
        let arr = Value::new_array(vec![Value::Number(1.0), Value::Number(2.0)]);
        assert_eq!(arr.get_property("length"), Some(Value::Number(2.0)));
        assert_eq!(arr.get_property("1"), Some(Value::Number(2.0)));
        assert_eq!(arr.get_property("01"), None);
        arr.set_property("3", Value::Number(4.0)).unwrap();
        assert_eq!(arr.get_property("length"), Some(Value::Number(4.0)));
        assert_eq!(arr.get_property("2"), Some(Value::Undefined));
        assert!(arr.get_property("map").is_some_and(|m| m.is_callable()));
    }

    #[test]
    fn test_array_length_limits() {
        let arr = Value::new_array(vec![Value::Number(1.0)]);
        for bad in [-1.0, 1.5, 4294967296.0, f64::NAN, 1e15] {
            let err = arr.set_property("length", Value::Number(bad)).unwrap_err();
            assert_eq!(err.message(), messages::INVALID_ARRAY_LENGTH);
        }
        let err = arr.set_property("length", Value::Number(4294967295.0)).unwrap_err();
        assert_eq!(err.message(), messages::ARRAY_TOO_LARGE);
        assert!(arr.set_property("4000000000", Value::Null).is_err());
        assert_eq!(arr.get_property("length"), Some(Value::Number(1.0)));

        // 2^32 - 1 and above are ordinary keys
        arr.set_property("4294967295", Value::Boolean(true)).unwrap();
        arr.set_property("10000000000", Value::Number(2.0)).unwrap();
        assert_eq!(arr.get_property("10000000000"), Some(Value::Number(2.0)));
        assert_eq!(arr.get_property("4294967295"), Some(Value::Boolean(true)));
        assert_eq!(arr.get_property("length"), Some(Value::Number(1.0)));

        arr.set_property("length", Value::Number(0.0)).unwrap();
        assert_eq!(arr.get_property("0"), None);

        let self_length = Value::new_array(vec![]);
        self_length.set_property("length", self_length.clone()).unwrap();
        assert_eq!(self_length.get_property("length"), Some(Value::Number(0.0)));
    }

    #[test]
    fn test_string_index_uses_code_units() {
        let s = Value::String("a\u{1F600}b".to_string());
        assert_eq!(s.get_property("length"), Some(Value::Number(4.0)));
        assert_eq!(s.get_property("0"), Some(Value::String("a".to_string())));
        assert_eq!(s.get_property("3"), Some(Value::String("b".to_string())));
        assert_eq!(s.get_property("1"), Some(Value::String("\u{FFFD}".to_string())));
        assert_eq!(s.get_property("4"), None);
    }

    #[test]
    fn test_prototype_chain() {
        let parent = Value::new_object_with_properties([("a", Value::Number(1.0))]);
        let Value::Object(parent_obj) = &parent else {
            unreachable!()
        };
        let child = Value::from_object(Object::with_prototype(Some(parent_obj.clone())));
        assert_eq!(child.get_property("a"), Some(Value::Number(1.0)));
        child.set_property("a", Value::Number(2.0)).unwrap();
        assert_eq!(child.get_property("a"), Some(Value::Number(2.0)));
        assert_eq!(parent.get_property("a"), Some(Value::Number(1.0)));
    }

    #[test]
    fn test_json_round_trip() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"b": [1, 2.5, null], "a": {"c": "x"}, "d": true}"#).unwrap();
        let value = Value::from_json(&json);
        assert_eq!(value.to_json(), json);
    }

    #[test]
    fn test_key_order() {
        let obj = Value::new_object_with_properties([
            ("z", Value::Number(1.0)),
            ("a", Value::Number(2.0)),
        ]);
        let Value::Object(obj) = obj else {
            unreachable!()
        };
        assert_eq!(obj.borrow().own_keys(), vec!["z", "a"]);
        obj.borrow_mut().delete_property("z");
        assert_eq!(obj.borrow().own_keys(), vec!["a"]);
    }
}
