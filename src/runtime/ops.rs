//! Operator semantics
//!
//! Binary operators over host values, shared by binary expressions, compound
//! assignment and update expressions.

use super::value::{Object, ObjectKind, Value};
use crate::ast::BinaryOperator;
use crate::error::{messages, Error, Result};
use num_bigint::{BigInt, BigUint};
use num_traits::{Signed, ToPrimitive, Zero};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

/// A value after ToNumeric
enum Numeric {
    Number(f64),
    BigInt(BigInt),
}

fn to_numeric(value: &Value) -> Numeric {
    match to_primitive(value) {
        Value::BigInt(n) => Numeric::BigInt(n),
        other => Numeric::Number(other.to_number()),
    }
}

/// Objects become their string form; primitives pass through
pub fn to_primitive(value: &Value) -> Value {
    match value {
        Value::Object(_) => Value::String(value.to_js_string()),
        other => other.clone(),
    }
}

/// ToInt32
pub fn to_int32(n: f64) -> i32 {
    to_uint32(n) as i32
}

/// ToUint32
pub fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() || n == 0.0 {
        return 0;
    }
    let n = n.trunc().rem_euclid(4_294_967_296.0);
    n as u32
}

/// Apply a binary operator
pub fn binary_op(op: BinaryOperator, left: &Value, right: &Value) -> Result<Value> {
    use BinaryOperator::*;

    match op {
        Add => add(left, right),
        Sub | Mul | Div | Mod | Pow | Shl | Shr | UShr | BitwiseAnd | BitwiseOr | BitwiseXor => {
            match (to_numeric(left), to_numeric(right)) {
                (Numeric::Number(a), Numeric::Number(b)) => Ok(Value::Number(number_op(op, a, b))),
                (Numeric::BigInt(a), Numeric::BigInt(b)) => bigint_op(op, a, b),
                _ => Err(Error::type_error(messages::MIX_BIGINT)),
            }
        }
        Eq => Ok(Value::Boolean(left.equals(right))),
        Ne => Ok(Value::Boolean(!left.equals(right))),
        StrictEq => Ok(Value::Boolean(left.strict_equals(right))),
        StrictNe => Ok(Value::Boolean(!left.strict_equals(right))),
        Lt => Ok(Value::Boolean(compare(left, right) == Some(Ordering::Less))),
        Gt => Ok(Value::Boolean(compare(left, right) == Some(Ordering::Greater))),
        Le => Ok(Value::Boolean(matches!(
            compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        ))),
        Ge => Ok(Value::Boolean(matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        ))),
        In => match right {
            Value::Object(obj) => {
                let key = to_property_key(left);
                Ok(Value::Boolean(obj.borrow().has_property(&key)))
            }
            _ => Err(Error::type_error(messages::cannot_use_in(
                &left.to_js_string(),
                &right.to_js_string(),
            ))),
        },
        Instanceof => instance_of(left, right),
    }
}

fn add(left: &Value, right: &Value) -> Result<Value> {
    let left = to_primitive(left);
    let right = to_primitive(right);

    match (&left, &right) {
        (Value::String(a), b) => Ok(Value::String(format!("{}{}", a, b.to_js_string()))),
        (a, Value::String(b)) => Ok(Value::String(format!("{}{}", a.to_js_string(), b))),
        (Value::BigInt(a), Value::BigInt(b)) => Ok(Value::BigInt(a + b)),
        (Value::BigInt(_), _) | (_, Value::BigInt(_)) => Err(Error::type_error(messages::MIX_BIGINT)),
        (a, b) => Ok(Value::Number(a.to_number() + b.to_number())),
    }
}

fn number_op(op: BinaryOperator, a: f64, b: f64) -> f64 {
    use BinaryOperator::*;

    match op {
        Sub => a - b,
        Mul => a * b,
        Div => a / b,
        Mod => a % b,
        Pow => pow(a, b),
        Shl => (to_int32(a).wrapping_shl(to_uint32(b) & 31)) as f64,
        Shr => (to_int32(a) >> (to_uint32(b) & 31)) as f64,
        UShr => (to_uint32(a) >> (to_uint32(b) & 31)) as f64,
        BitwiseAnd => (to_int32(a) & to_int32(b)) as f64,
        BitwiseOr => (to_int32(a) | to_int32(b)) as f64,
        BitwiseXor => (to_int32(a) ^ to_int32(b)) as f64,
        _ => f64::NAN,
    }
}

/// `**` differs from `powf` for NaN exponents and for `±1 ** ±Infinity`
fn pow(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
        return f64::NAN;
    }
    base.powf(exponent)
}

fn bigint_op(op: BinaryOperator, a: BigInt, b: BigInt) -> Result<Value> {
    use BinaryOperator::*;

    let result = match op {
        Sub => a - b,
        Mul => a * b,
        Div => {
            if b.is_zero() {
                return Err(Error::range_error(messages::BIGINT_DIVISION_BY_ZERO));
            }
            a / b
        }
        Mod => {
            if b.is_zero() {
                return Err(Error::range_error(messages::BIGINT_DIVISION_BY_ZERO));
            }
            a % b
        }
        Pow => {
            if b.is_negative() {
                return Err(Error::range_error("Exponent must be non-negative"));
            }
            bigint_pow(a, &b)?
        }
        Shl => shift_bigint(a, &b)?,
        Shr => shift_bigint(a, &-b)?,
        UShr => return Err(Error::type_error("BigInts have no unsigned right shift, use >> instead")),
        BitwiseAnd => a & b,
        BitwiseOr => a | b,
        BitwiseXor => a ^ b,
        _ => return Err(Error::InternalError(format!("{} is not arithmetic", op.as_str()))),
    };
    Ok(Value::BigInt(result))
}

/// Largest BigInt result, in bits, that shifts and powers may produce
const MAX_BIGINT_BITS: u64 = 1 << 30;

fn bigint_pow(base: BigInt, exponent: &BigInt) -> Result<BigInt> {
    if exponent.is_zero() {
        return Ok(BigInt::from(1));
    }
    // 0, 1 and -1 stay small for any exponent
    if base.magnitude() <= &BigUint::from(1u8) {
        return Ok(if base.is_negative() && exponent.bit(0) {
            base
        } else {
            base.abs()
        });
    }
    let exponent = exponent
        .to_u64()
        .filter(|e| base.bits().saturating_mul(*e) <= MAX_BIGINT_BITS)
        .ok_or_else(|| Error::range_error(messages::BIGINT_TOO_LARGE))?;
    // bounded by MAX_BIGINT_BITS above
    Ok(num_traits::pow::pow(base, exponent as usize))
}

/// `a << shift`, where a negative shift is an arithmetic right shift
fn shift_bigint(a: BigInt, shift: &BigInt) -> Result<BigInt> {
    if a.is_zero() || shift.is_zero() {
        return Ok(a);
    }
    if shift.is_negative() {
        let bits = a.bits();
        return Ok(match shift.magnitude().to_u64().filter(|n| *n < bits) {
            Some(n) => {
                // Rounds toward negative infinity
                let divisor = BigInt::from(1) << n;
                let (quotient, remainder) = (&a / &divisor, &a % &divisor);
                if remainder.is_negative() {
                    quotient - 1
                } else {
                    quotient
                }
            }
            None if a.is_negative() => BigInt::from(-1),
            None => BigInt::zero(),
        });
    }
    let amount = shift
        .to_u64()
        .filter(|n| a.bits().saturating_add(*n) <= MAX_BIGINT_BITS)
        .ok_or_else(|| Error::range_error(messages::BIGINT_TOO_LARGE))?;
    Ok(a << amount)
}

/// Relational comparison; `None` when either side is NaN
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    let left = to_primitive(left);
    let right = to_primitive(right);

    match (&left, &right) {
        (Value::String(a), Value::String(b)) => Some(a.encode_utf16().cmp(b.encode_utf16())),
        (Value::BigInt(a), Value::BigInt(b)) => Some(a.cmp(b)),
        (Value::BigInt(a), other) | (other, Value::BigInt(a)) => {
            let n = other.to_number();
            if n.is_nan() {
                return None;
            }
            let ordering = a.to_f64()?.partial_cmp(&n)?;
            // `a` may have come from either side
            if matches!(left, Value::BigInt(_)) {
                Some(ordering)
            } else {
                Some(ordering.reverse())
            }
        }
        (a, b) => a.to_number().partial_cmp(&b.to_number()),
    }
}

fn instance_of(left: &Value, right: &Value) -> Result<Value> {
    if !right.is_callable() {
        return Err(Error::type_error(
            "Right-hand side of 'instanceof' is not callable",
        ));
    }
    let prototype = match right.get_property("prototype") {
        Some(Value::Object(proto)) => proto,
        _ => return Ok(Value::Boolean(false)),
    };
    let Value::Object(obj) = left else {
        return Ok(Value::Boolean(false));
    };
    Ok(Value::Boolean(inherits_from(obj, &prototype)))
}

fn inherits_from(obj: &Rc<RefCell<Object>>, prototype: &Rc<RefCell<Object>>) -> bool {
    let mut current = obj.borrow().prototype.clone();
    while let Some(proto) = current {
        if Rc::ptr_eq(&proto, prototype) {
            return true;
        }
        current = proto.borrow().prototype.clone();
    }
    false
}

/// Property key for a computed member or `in`
pub fn to_property_key(value: &Value) -> String {
    to_primitive(value).to_js_string()
}

/// Value incremented or decremented by one, for `++` and `--`
pub fn step(value: &Value, delta: i8) -> Value {
    match to_numeric(value) {
        Numeric::BigInt(n) => Value::BigInt(n + BigInt::from(delta)),
        Numeric::Number(n) => Value::Number(n + f64::from(delta)),
    }
}

/// Numeric value of an update operand, for postfix results
pub fn to_numeric_value(value: &Value) -> Value {
    match to_numeric(value) {
        Numeric::BigInt(n) => Value::BigInt(n),
        Numeric::Number(n) => Value::Number(n),
    }
}

/// Unary minus
pub fn negate(value: &Value) -> Value {
    match to_numeric(value) {
        Numeric::BigInt(n) => Value::BigInt(-n),
        Numeric::Number(n) => Value::Number(-n),
    }
}

/// Unary plus; BigInts cannot convert
pub fn unary_plus(value: &Value) -> Result<Value> {
    match to_numeric(value) {
        Numeric::BigInt(_) => Err(Error::type_error("Cannot convert a BigInt value to a number")),
        Numeric::Number(n) => Ok(Value::Number(n)),
    }
}

/// Bitwise not
pub fn bitwise_not(value: &Value) -> Value {
    match to_numeric(value) {
        Numeric::BigInt(n) => Value::BigInt(-n - 1),
        Numeric::Number(n) => Value::Number(!to_int32(n) as f64),
    }
}

/// Elements produced by spreading or array-destructuring a value
pub fn iterate(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::String(s) => Some(s.chars().map(|c| Value::String(c.to_string())).collect()),
        Value::Object(obj) => match &obj.borrow().kind {
            ObjectKind::Array(arr) => Some(arr.clone()),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BinaryOperator::*;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    fn big(n: i64) -> Value {
        Value::BigInt(BigInt::from(n))
    }

    fn string(s: &str) -> Value {
        Value::String(s.to_string())
    }

    #[test]
    fn test_addition() {
        assert_eq!(binary_op(Add, &num(1.0), &num(2.0)).unwrap(), num(3.0));
        assert_eq!(binary_op(Add, &string("a"), &num(1.0)).unwrap(), string("a1"));
        assert_eq!(binary_op(Add, &num(1.0), &string("a")).unwrap(), string("1a"));
        assert_eq!(binary_op(Add, &big(1), &big(2)).unwrap(), big(3));
        assert_eq!(binary_op(Add, &Value::Null, &num(1.0)).unwrap(), num(1.0));
        let arr = Value::new_array(vec![num(1.0), num(2.0)]);
        assert_eq!(binary_op(Add, &arr, &string("!")).unwrap(), string("1,2!"));
        assert!(binary_op(Add, &big(1), &num(1.0)).is_err());
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(binary_op(Mod, &num(-7.0), &num(3.0)).unwrap(), num(-1.0));
        assert_eq!(binary_op(Pow, &num(2.0), &num(10.0)).unwrap(), num(1024.0));
        assert_eq!(binary_op(Pow, &num(1.0), &num(f64::INFINITY)).unwrap(), num(f64::NAN));
        assert_eq!(binary_op(Div, &num(1.0), &num(0.0)).unwrap(), num(f64::INFINITY));
        assert_eq!(binary_op(Sub, &string("5"), &num(2.0)).unwrap(), num(3.0));
    }

    #[test]
    fn test_bigint_arithmetic() {
        assert_eq!(binary_op(Div, &big(7), &big(2)).unwrap(), big(3));
        assert_eq!(binary_op(Div, &big(-7), &big(2)).unwrap(), big(-3));
        assert_eq!(binary_op(Mod, &big(-7), &big(2)).unwrap(), big(-1));
        assert_eq!(binary_op(Pow, &big(2), &big(64)).unwrap().to_js_string(), "18446744073709551616");
        assert_eq!(binary_op(Shr, &big(-5), &big(1)).unwrap(), big(-3));
        assert_eq!(binary_op(Shl, &big(1), &big(3)).unwrap(), big(8));
        assert!(binary_op(Div, &big(1), &big(0)).is_err());
        assert!(binary_op(UShr, &big(1), &big(0)).is_err());
    }

    #[test]
    fn test_bigint_size_limit() {
        let huge = Value::BigInt(BigInt::from(9007199254740991i64));
        let err = binary_op(Shl, &big(1), &huge).unwrap_err();
        assert_eq!(err.kind(), Some(crate::error::ErrorKind::RangeError));
        assert_eq!(err.message(), messages::BIGINT_TOO_LARGE);
        assert!(binary_op(Pow, &big(2), &big(2_000_000_000)).is_err());
        assert!(binary_op(Pow, &big(3), &huge).is_err());

        assert_eq!(binary_op(Shl, &big(0), &huge).unwrap(), big(0));
        assert_eq!(binary_op(Shr, &big(5), &huge).unwrap(), big(0));
        assert_eq!(binary_op(Shr, &big(-5), &huge).unwrap(), big(-1));
        assert_eq!(binary_op(Shl, &big(-5), &big(-64)).unwrap(), big(-1));
        assert_eq!(binary_op(Shl, &big(12), &big(-2)).unwrap(), big(3));
        assert_eq!(binary_op(Pow, &big(1), &huge).unwrap(), big(1));
        assert_eq!(binary_op(Pow, &big(-1), &huge).unwrap(), big(-1));
        assert_eq!(binary_op(Pow, &big(0), &huge).unwrap(), big(0));
        assert_eq!(binary_op(Pow, &big(0), &big(0)).unwrap(), big(1));
    }

    #[test]
    fn test_bitwise() {
        assert_eq!(binary_op(BitwiseOr, &num(5.5), &num(0.0)).unwrap(), num(5.0));
        assert_eq!(binary_op(Shl, &num(1.0), &num(31.0)).unwrap(), num(-2147483648.0));
        assert_eq!(binary_op(UShr, &num(-1.0), &num(0.0)).unwrap(), num(4294967295.0));
        assert_eq!(binary_op(Shr, &num(-8.0), &num(1.0)).unwrap(), num(-4.0));
        assert_eq!(binary_op(BitwiseXor, &num(6.0), &num(3.0)).unwrap(), num(5.0));
        assert_eq!(bitwise_not(&num(0.0)), num(-1.0));
        assert_eq!(to_int32(4294967297.0), 1);
        assert_eq!(to_int32(-1.5), -1);
    }

    #[test]
    fn test_comparison() {
        assert_eq!(binary_op(Lt, &num(1.0), &num(2.0)).unwrap(), Value::Boolean(true));
        assert_eq!(binary_op(Lt, &string("a"), &string("b")).unwrap(), Value::Boolean(true));
        assert_eq!(binary_op(Lt, &string("10"), &string("9")).unwrap(), Value::Boolean(true));
        assert_eq!(binary_op(Lt, &string("10"), &num(9.0)).unwrap(), Value::Boolean(false));
        assert_eq!(binary_op(Ge, &num(f64::NAN), &num(1.0)).unwrap(), Value::Boolean(false));
        assert_eq!(binary_op(Lt, &num(1.5), &big(2)).unwrap(), Value::Boolean(true));
        assert_eq!(binary_op(Gt, &num(1.5), &big(2)).unwrap(), Value::Boolean(false));
        assert_eq!(binary_op(Le, &big(2), &num(2.0)).unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_in_operator() {
        let obj = Value::new_object_with_properties([("a", num(1.0))]);
        assert_eq!(binary_op(In, &string("a"), &obj).unwrap(), Value::Boolean(true));
        assert_eq!(binary_op(In, &string("b"), &obj).unwrap(), Value::Boolean(false));
        let arr = Value::new_array(vec![num(1.0)]);
        assert_eq!(binary_op(In, &num(0.0), &arr).unwrap(), Value::Boolean(true));
        assert!(binary_op(In, &string("a"), &string("abc")).is_err());
    }

    #[test]
    fn test_step() {
        assert_eq!(step(&num(1.0), 1), num(2.0));
        assert_eq!(step(&big(1), -1), big(0));
        assert_eq!(step(&string("3"), 1), num(4.0));
    }
}
