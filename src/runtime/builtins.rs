//! Built-in methods
//!
//! Member access on arrays, strings, numbers and regular expressions resolves these
//! names to methods bound to their receiver, so `items.map(x => x * 2)` or
//! `name.toUpperCase()` work without any globals in scope.

use super::eval::call_function;
use super::number_to_string;
use super::ops::to_property_key;
use super::value::{code_unit_at, Object, ObjectKind, Value};
use crate::error::{messages, Error, Result};
use crate::lexer::{RegexFlags, RegexLiteral};
use num_bigint::BigInt;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

const ARRAY_METHODS: &[&str] = &[
    "at", "concat", "every", "filter", "find", "findIndex", "flat", "forEach", "includes",
    "indexOf", "join", "lastIndexOf", "map", "pop", "push", "reduce", "reverse", "shift", "slice",
    "some", "sort", "unshift",
];

const STRING_METHODS: &[&str] = &[
    "at", "charAt", "charCodeAt", "concat", "endsWith", "includes", "indexOf", "lastIndexOf",
    "match", "padEnd", "padStart", "repeat", "replace", "replaceAll", "slice", "split",
    "startsWith", "substring", "toLowerCase", "toString", "toUpperCase", "trim", "trimEnd",
    "trimStart",
];

const NUMBER_METHODS: &[&str] = &["toFixed", "toString"];

const REGEXP_METHODS: &[&str] = &["test"];

fn bound(kind: ObjectKind) -> Value {
    Value::from_object(Object::new(kind))
}

/// Built-in property of an object that has no own property of that name
pub(crate) fn builtin_property(obj: &Rc<RefCell<Object>>, key: &str) -> Option<Value> {
    let object = obj.borrow();
    match &object.kind {
        ObjectKind::Array(_) if ARRAY_METHODS.contains(&key) => {
            Some(bound(ObjectKind::BoundArrayMethod {
                receiver: obj.clone(),
                method: key.to_string(),
            }))
        }
        ObjectKind::RegExp(re) => match key {
            "source" => Some(Value::String(re.pattern.clone())),
            "flags" => Some(Value::String(re.flags.to_string())),
            "global" => Some(Value::Boolean(re.flags.contains(RegexFlags::GLOBAL))),
            "ignoreCase" => Some(Value::Boolean(re.flags.contains(RegexFlags::IGNORE_CASE))),
            "multiline" => Some(Value::Boolean(re.flags.contains(RegexFlags::MULTILINE))),
            _ if REGEXP_METHODS.contains(&key) => Some(bound(ObjectKind::BoundRegExpMethod {
                receiver: re.clone(),
                method: key.to_string(),
            })),
            _ => None,
        },
        _ => None,
    }
}

/// Method of a string receiver
pub(crate) fn bound_string_method(s: &str, key: &str) -> Option<Value> {
    STRING_METHODS.contains(&key).then(|| {
        bound(ObjectKind::BoundStringMethod {
            receiver: s.to_string(),
            method: key.to_string(),
        })
    })
}

/// Method of a number receiver
pub(crate) fn bound_number_method(n: f64, key: &str) -> Option<Value> {
    NUMBER_METHODS.contains(&key).then(|| {
        bound(ObjectKind::BoundNumberMethod {
            receiver: n,
            method: key.to_string(),
        })
    })
}

fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or(Value::Undefined)
}

/// Integer argument with negative values counted from `len`, clamped to `0..=len`
fn relative_index(value: Option<&Value>, len: usize, default: usize) -> usize {
    let Some(value) = value.filter(|v| !v.is_undefined()) else {
        return default;
    };
    let n = value.to_number();
    let n = if n.is_nan() { 0.0 } else { n.trunc() };
    if n < 0.0 {
        (len as f64 + n).max(0.0) as usize
    } else {
        n.min(len as f64) as usize
    }
}

fn callback(args: &[Value]) -> Result<Value> {
    let callback = arg(args, 0);
    if !callback.is_callable() {
        return Err(Error::type_error(messages::not_a_function(
            &callback.to_js_string(),
        )));
    }
    Ok(callback)
}

fn array_elements(receiver: &Rc<RefCell<Object>>) -> Vec<Value> {
    match &receiver.borrow().kind {
        ObjectKind::Array(arr) => arr.clone(),
        _ => Vec::new(),
    }
}

fn with_array<T>(receiver: &Rc<RefCell<Object>>, f: impl FnOnce(&mut Vec<Value>) -> T) -> Result<T> {
    match &mut receiver.borrow_mut().kind {
        ObjectKind::Array(arr) => Ok(f(arr)),
        _ => Err(Error::type_error("Not an array")),
    }
}

/// Call an array method on its receiver
pub fn call_array_method(
    receiver: &Rc<RefCell<Object>>,
    method: &str,
    args: &[Value],
) -> Result<Value> {
    let this = Value::Object(receiver.clone());

    match method {
        "push" => with_array(receiver, |arr| {
            arr.extend(args.iter().cloned());
            Value::Number(arr.len() as f64)
        }),
        "pop" => with_array(receiver, |arr| arr.pop().unwrap_or(Value::Undefined)),
        "shift" => with_array(receiver, |arr| {
            if arr.is_empty() {
                Value::Undefined
            } else {
                arr.remove(0)
            }
        }),
        "unshift" => with_array(receiver, |arr| {
            arr.splice(0..0, args.iter().cloned());
            Value::Number(arr.len() as f64)
        }),
        "reverse" => {
            with_array(receiver, |arr| arr.reverse())?;
            Ok(this)
        }
        "sort" => {
            let mut arr = array_elements(receiver);
            sort_values(&mut arr, args.first())?;
            with_array(receiver, |target| *target = arr)?;
            Ok(this)
        }
        _ => {
            let arr = array_elements(receiver);
            call_array_query(&this, arr, method, args)
        }
    }
}

/// Non-mutating array methods, working on a snapshot of the elements
fn call_array_query(this: &Value, arr: Vec<Value>, method: &str, args: &[Value]) -> Result<Value> {
    let len = arr.len();

    match method {
        "at" => {
            let n = arg(args, 0).to_number();
            let n = if n.is_nan() { 0.0 } else { n.trunc() };
            let index = if n < 0.0 { len as f64 + n } else { n };
            Ok(if index >= 0.0 && index < len as f64 {
                arr[index as usize].clone()
            } else {
                Value::Undefined
            })
        }
        "indexOf" => {
            let search = arg(args, 0);
            let index = arr.iter().position(|v| v.strict_equals(&search));
            Ok(Value::Number(index.map(|i| i as f64).unwrap_or(-1.0)))
        }
        "lastIndexOf" => {
            let search = arg(args, 0);
            let index = arr.iter().rposition(|v| v.strict_equals(&search));
            Ok(Value::Number(index.map(|i| i as f64).unwrap_or(-1.0)))
        }
        "includes" => {
            // SameValueZero: NaN finds NaN
            let search = arg(args, 0);
            Ok(Value::Boolean(arr.iter().any(|v| {
                v.strict_equals(&search)
                    || matches!((v, &search), (Value::Number(a), Value::Number(b)) if a.is_nan() && b.is_nan())
            })))
        }
        "join" => {
            let separator = match args.first() {
                Some(v) if !v.is_undefined() => v.to_js_string(),
                _ => ",".to_string(),
            };
            let parts: Vec<String> = arr
                .iter()
                .map(|v| if v.is_nullish() { String::new() } else { v.to_js_string() })
                .collect();
            Ok(Value::String(parts.join(&separator)))
        }
        "slice" => {
            let start = relative_index(args.first(), len, 0);
            let end = relative_index(args.get(1), len, len);
            Ok(Value::new_array(arr.get(start..end.max(start)).unwrap_or_default().to_vec()))
        }
        "concat" => {
            let mut result = arr;
            for value in args {
                match value.as_array() {
                    Some(items) => result.extend(items),
                    None => result.push(value.clone()),
                }
            }
            Ok(Value::new_array(result))
        }
        "flat" => {
            let depth = match args.first() {
                Some(v) if !v.is_undefined() => v.to_number().max(0.0) as usize,
                _ => 1,
            };
            let mut result = Vec::new();
            flatten_into(&mut result, arr, depth);
            Ok(Value::new_array(result))
        }
        "map" => {
            let f = callback(args)?;
            let mut results = Vec::with_capacity(len);
            for (i, elem) in arr.into_iter().enumerate() {
                results.push(call_function(
                    &f,
                    Value::Undefined,
                    &[elem, Value::Number(i as f64), this.clone()],
                )?);
            }
            Ok(Value::new_array(results))
        }
        "filter" => {
            let f = callback(args)?;
            let mut results = Vec::new();
            for (i, elem) in arr.into_iter().enumerate() {
                let keep = call_function(
                    &f,
                    Value::Undefined,
                    &[elem.clone(), Value::Number(i as f64), this.clone()],
                )?;
                if keep.to_boolean() {
                    results.push(elem);
                }
            }
            Ok(Value::new_array(results))
        }
        "forEach" => {
            let f = callback(args)?;
            for (i, elem) in arr.into_iter().enumerate() {
                call_function(&f, Value::Undefined, &[elem, Value::Number(i as f64), this.clone()])?;
            }
            Ok(Value::Undefined)
        }
        "reduce" => {
            let f = callback(args)?;
            let mut iter = arr.into_iter().enumerate();
            let mut acc = match args.get(1) {
                Some(initial) => initial.clone(),
                None => match iter.next() {
                    Some((_, first)) => first,
                    None => {
                        return Err(Error::type_error(
                            "Reduce of empty array with no initial value",
                        ))
                    }
                },
            };
            for (i, elem) in iter {
                acc = call_function(
                    &f,
                    Value::Undefined,
                    &[acc, elem, Value::Number(i as f64), this.clone()],
                )?;
            }
            Ok(acc)
        }
        "find" | "findIndex" | "some" | "every" => {
            let f = callback(args)?;
            for (i, elem) in arr.into_iter().enumerate() {
                let hit = call_function(
                    &f,
                    Value::Undefined,
                    &[elem.clone(), Value::Number(i as f64), this.clone()],
                )?
                .to_boolean();
                match (method, hit) {
                    ("find", true) => return Ok(elem),
                    ("findIndex", true) => return Ok(Value::Number(i as f64)),
                    ("some", true) => return Ok(Value::Boolean(true)),
                    ("every", false) => return Ok(Value::Boolean(false)),
                    _ => {}
                }
            }
            Ok(match method {
                "find" => Value::Undefined,
                "findIndex" => Value::Number(-1.0),
                "some" => Value::Boolean(false),
                _ => Value::Boolean(true),
            })
        }
        _ => Err(Error::type_error(messages::not_a_function(method))),
    }
}

fn flatten_into(out: &mut Vec<Value>, items: Vec<Value>, depth: usize) {
    for item in items {
        match item.as_array() {
            Some(inner) if depth > 0 => flatten_into(out, inner, depth - 1),
            _ => out.push(item),
        }
    }
}

/// Stable sort; undefined goes last, the default order compares string forms
fn sort_values(arr: &mut [Value], compare: Option<&Value>) -> Result<()> {
    let compare = compare.filter(|c| !c.is_undefined());
    if let Some(c) = compare {
        if !c.is_callable() {
            return Err(Error::type_error(
                "The comparison function must be either a function or undefined",
            ));
        }
    }

    let mut error = None;
    arr.sort_by(|a, b| {
        if error.is_some() {
            return Ordering::Equal;
        }
        match (a.is_undefined(), b.is_undefined()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            _ => {}
        }
        match compare {
            Some(c) => match call_function(c, Value::Undefined, &[a.clone(), b.clone()]) {
                Ok(result) => result
                    .to_number()
                    .partial_cmp(&0.0)
                    .unwrap_or(Ordering::Equal),
                Err(e) => {
                    error = Some(e);
                    Ordering::Equal
                }
            },
            None => a
                .to_js_string()
                .encode_utf16()
                .cmp(b.to_js_string().encode_utf16()),
        }
    });

    match error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn char_index(s: &str, byte_index: usize) -> f64 {
    s[..byte_index].chars().count() as f64
}

fn byte_offset(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

fn as_regex(value: &Value) -> Option<RegexLiteral> {
    match value {
        Value::Object(obj) => match &obj.borrow().kind {
            ObjectKind::RegExp(re) => Some(re.clone()),
            _ => None,
        },
        _ => None,
    }
}

/// Longest string the string methods will build, in UTF-16 code units
const MAX_STRING_LENGTH: f64 = ((1u32 << 29) - 24) as f64;

fn pad(s: &str, args: &[Value], at_start: bool) -> Result<String> {
    let target = arg(args, 0).to_number();
    let filler = match args.get(1) {
        Some(v) if !v.is_undefined() => v.to_js_string(),
        _ => " ".to_string(),
    };
    let len = s.chars().count();
    if target.is_nan() || target <= len as f64 || filler.is_empty() {
        return Ok(s.to_string());
    }
    if target > MAX_STRING_LENGTH {
        return Err(Error::range_error(messages::INVALID_STRING_LENGTH));
    }
    let padding: String = filler.chars().cycle().take(target as usize - len).collect();
    Ok(if at_start {
        format!("{}{}", padding, s)
    } else {
        format!("{}{}", s, padding)
    })
}

/// Call a string method on its receiver
pub fn call_string_method(s: &str, method: &str, args: &[Value]) -> Result<Value> {
    let len = s.chars().count();
    let search = || arg(args, 0).to_js_string();

    let value = match method {
        "toUpperCase" => Value::String(s.to_uppercase()),
        "toLowerCase" => Value::String(s.to_lowercase()),
        "trim" => Value::String(s.trim().to_string()),
        "trimStart" => Value::String(s.trim_start().to_string()),
        "trimEnd" => Value::String(s.trim_end().to_string()),
        "toString" => Value::String(s.to_string()),
        "at" => {
            let n = arg(args, 0).to_number();
            let n = if n.is_nan() { 0.0 } else { n.trunc() };
            let units = s.encode_utf16().count();
            let index = if n < 0.0 { units as f64 + n } else { n };
            if index >= 0.0 && index < units as f64 {
                code_unit_at(s, index as usize)
                    .map(Value::String)
                    .unwrap_or(Value::Undefined)
            } else {
                Value::Undefined
            }
        }
        "charAt" => {
            let index = arg(args, 0).to_number();
            let index = if index.is_nan() { 0.0 } else { index };
            let c = if index >= 0.0 { code_unit_at(s, index as usize) } else { None };
            Value::String(c.unwrap_or_default())
        }
        "charCodeAt" => {
            let index = arg(args, 0).to_number();
            let index = if index.is_nan() { 0.0 } else { index };
            let unit = if index >= 0.0 {
                s.encode_utf16().nth(index as usize)
            } else {
                None
            };
            Value::Number(unit.map(f64::from).unwrap_or(f64::NAN))
        }
        "indexOf" => {
            let from = byte_offset(s, relative_index(args.get(1), len, 0));
            let found = s[from..].find(&search()).map(|i| char_index(s, from + i));
            Value::Number(found.unwrap_or(-1.0))
        }
        "lastIndexOf" => {
            let found = s.rfind(&search()).map(|i| char_index(s, i));
            Value::Number(found.unwrap_or(-1.0))
        }
        "includes" => Value::Boolean(s.contains(&search())),
        "startsWith" => Value::Boolean(s.starts_with(&search())),
        "endsWith" => Value::Boolean(s.ends_with(&search())),
        "concat" => {
            let mut out = s.to_string();
            for value in args {
                out.push_str(&value.to_js_string());
            }
            Value::String(out)
        }
        "repeat" => {
            let count = arg(args, 0).to_number();
            if count < 0.0 || count.is_infinite() {
                return Err(Error::range_error(format!("Invalid count value: {}", number_to_string(count))));
            }
            let count = if count.is_nan() { 0.0 } else { count.trunc() };
            if s.encode_utf16().count() as f64 * count > MAX_STRING_LENGTH {
                return Err(Error::range_error(messages::INVALID_STRING_LENGTH));
            }
            Value::String(s.repeat(count as usize))
        }
        "padStart" => Value::String(pad(s, args, true)?),
        "padEnd" => Value::String(pad(s, args, false)?),
        "slice" => {
            let start = relative_index(args.first(), len, 0);
            let end = relative_index(args.get(1), len, len);
            Value::String(s.chars().skip(start).take(end.saturating_sub(start)).collect())
        }
        "substring" => {
            let clamp = |v: Option<&Value>, default: usize| match v {
                Some(v) if !v.is_undefined() => {
                    let n = v.to_number();
                    if n.is_nan() || n < 0.0 {
                        0
                    } else {
                        (n as usize).min(len)
                    }
                }
                _ => default,
            };
            let (a, b) = (clamp(args.first(), 0), clamp(args.get(1), len));
            let (start, end) = if a > b { (b, a) } else { (a, b) };
            Value::String(s.chars().skip(start).take(end - start).collect())
        }
        "split" => {
            let parts: Vec<Value> = match args.first() {
                None | Some(Value::Undefined) => vec![Value::String(s.to_string())],
                Some(separator) => match as_regex(separator) {
                    Some(re) => re.regex.split(s).map(|p| Value::String(p.to_string())).collect(),
                    None => {
                        let separator = separator.to_js_string();
                        if separator.is_empty() {
                            s.chars().map(|c| Value::String(c.to_string())).collect()
                        } else {
                            s.split(separator.as_str())
                                .map(|p| Value::String(p.to_string()))
                                .collect()
                        }
                    }
                },
            };
            Value::new_array(parts)
        }
        "replace" | "replaceAll" => {
            let replacement = arg(args, 1);
            let all = method == "replaceAll";
            match as_regex(&arg(args, 0)) {
                Some(re) => {
                    let global = re.flags.contains(RegexFlags::GLOBAL);
                    if all && !global {
                        return Err(Error::type_error(
                            "replaceAll must be called with a global RegExp",
                        ));
                    }
                    let limit = if global { 0 } else { 1 };
                    let out = if replacement.is_callable() {
                        replace_with_callback(&re, s, &replacement, limit)?
                    } else {
                        let replacement = replacement.to_js_string();
                        re.regex.replacen(s, limit, replacement.as_str()).into_owned()
                    };
                    Value::String(out)
                }
                None => {
                    let needle = search();
                    let limit = if all { usize::MAX } else { 1 };
                    let out = if replacement.is_callable() {
                        let mut out = String::new();
                        let mut rest = s;
                        let mut count = 0;
                        while count < limit {
                            let Some(i) = rest.find(&needle) else { break };
                            out.push_str(&rest[..i]);
                            let matched = Value::String(needle.clone());
                            out.push_str(
                                &call_function(&replacement, Value::Undefined, &[matched])?
                                    .to_js_string(),
                            );
                            rest = &rest[i + needle.len()..];
                            count += 1;
                            if needle.is_empty() {
                                break;
                            }
                        }
                        out.push_str(rest);
                        out
                    } else {
                        s.replacen(&needle, &replacement.to_js_string(), limit)
                    };
                    Value::String(out)
                }
            }
        }
        "match" => {
            let re = match as_regex(&arg(args, 0)) {
                Some(re) => re,
                None => RegexLiteral::compile(&regex::escape(&search()), RegexFlags::empty())
                    .map_err(|e| Error::syntax_error(e.to_string()))?,
            };
            if re.flags.contains(RegexFlags::GLOBAL) {
                let matches: Vec<Value> = re
                    .regex
                    .find_iter(s)
                    .map(|m| Value::String(m.as_str().to_string()))
                    .collect();
                if matches.is_empty() {
                    Value::Null
                } else {
                    Value::new_array(matches)
                }
            } else {
                match re.regex.captures(s) {
                    Some(caps) => {
                        let groups = caps
                            .iter()
                            .map(|g| {
                                g.map(|m| Value::String(m.as_str().to_string()))
                                    .unwrap_or(Value::Undefined)
                            })
                            .collect();
                        let mut result = Object::new(ObjectKind::Array(groups));
                        let index = caps.get(0).map(|m| char_index(s, m.start())).unwrap_or(0.0);
                        result.insert_property("index", Value::Number(index));
                        result.insert_property("input", Value::String(s.to_string()));
                        Value::from_object(result)
                    }
                    None => Value::Null,
                }
            }
        }
        _ => return Err(Error::type_error(messages::not_a_function(method))),
    };
    Ok(value)
}

fn replace_with_callback(
    re: &RegexLiteral,
    s: &str,
    replacement: &Value,
    limit: usize,
) -> Result<String> {
    let mut out = String::new();
    let mut last = 0;
    for (count, caps) in re.regex.captures_iter(s).enumerate() {
        if limit != 0 && count >= limit {
            break;
        }
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&s[last..whole.start()]);
        let mut args: Vec<Value> = caps
            .iter()
            .map(|g| {
                g.map(|m| Value::String(m.as_str().to_string()))
                    .unwrap_or(Value::Undefined)
            })
            .collect();
        args.push(Value::Number(char_index(s, whole.start())));
        args.push(Value::String(s.to_string()));
        out.push_str(&call_function(replacement, Value::Undefined, &args)?.to_js_string());
        last = whole.end();
    }
    out.push_str(&s[last..]);
    Ok(out)
}

/// Call a number method on its receiver
pub fn call_number_method(n: f64, method: &str, args: &[Value]) -> Result<Value> {
    match method {
        "toFixed" => {
            let digits = arg(args, 0).to_number();
            let digits = if digits.is_nan() { 0.0 } else { digits.trunc() };
            if !(0.0..=100.0).contains(&digits) {
                return Err(Error::range_error(
                    "toFixed() digits argument must be between 0 and 100",
                ));
            }
            if !n.is_finite() || n.abs() >= 1e21 {
                return Ok(Value::String(number_to_string(n)));
            }
            Ok(Value::String(format!("{:.*}", digits as usize, n)))
        }
        "toString" => {
            let radix = match args.first() {
                Some(v) if !v.is_undefined() => v.to_number(),
                _ => 10.0,
            };
            if !(2.0..=36.0).contains(&radix) || radix.fract() != 0.0 {
                return Err(Error::range_error("toString() radix must be between 2 and 36"));
            }
            if radix == 10.0 || !n.is_finite() || n.fract() != 0.0 {
                return Ok(Value::String(number_to_string(n)));
            }
            // Integral values only; fractional digits in other radixes are not produced
            let digits = format!("{:.0}", n)
                .parse::<BigInt>()
                .map(|b| b.to_str_radix(radix as u32))
                .unwrap_or_else(|_| number_to_string(n));
            Ok(Value::String(digits))
        }
        _ => Err(Error::type_error(messages::not_a_function(method))),
    }
}

/// Call a regular expression method on its receiver
pub fn call_regexp_method(re: &RegexLiteral, method: &str, args: &[Value]) -> Result<Value> {
    match method {
        "test" => {
            let input = to_property_key(&arg(args, 0));
            Ok(Value::Boolean(re.regex.is_match(&input)))
        }
        _ => Err(Error::type_error(messages::not_a_function(method))),
    }
}
