//! Integration tests for expression evaluation

mod common;
use common::{eval, eval_json, scope};
use num_bigint::BigInt;
use serde_json::json;
use surface_expression::ast::AssignmentOperator;
use surface_expression::error::{messages, ErrorKind};
use surface_expression::{parse, EvalContext, Pattern, Value};

mod optional_chaining {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_short_circuit() {
        let s = scope(json!({"a": null}));
        assert_eq!(eval("a?.b.c", &s).unwrap(), Value::Undefined);
        assert_eq!(eval("a?.b.c()", &s).unwrap(), Value::Undefined);
        assert_eq!(eval("a?.[b.c]", &s).unwrap(), Value::Undefined);
        assert_eq!(eval("a?.()", &s).unwrap(), Value::Undefined);
    }

    #[test]
    fn test_plain_access_throws() {
        let s = scope(json!({"a": null}));
        let err = eval("a.b.c", &s).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::TypeError));
        assert_eq!(err.message(), "Cannot read properties of null (reading 'b')");
    }

    #[test]
    fn test_parentheses_end_the_chain() {
        let s = scope(json!({"a": null}));
        assert!(eval("(a?.b).c", &s).is_err());
        assert_eq!(eval("(a?.b)", &s).unwrap(), Value::Undefined);
    }

    #[test]
    fn test_present_values() {
        let s = scope(json!({"a": {"b": {"c": [10, 20]}}}));
        assert_eq!(eval_json("a?.b?.c?.[1]", &s), json!(20));
        assert_eq!(eval_json("a?.b.c.length", &s), json!(2));
        assert_eq!(eval_json("a?.missing?.c ?? 'fallback'", &s), json!("fallback"));
    }
}

mod destructuring {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pattern(source: &str) -> Pattern {
        match parse(&format!("({}) => 0", source)).unwrap() {
            surface_expression::Expression::Arrow(arrow) => arrow.params.into_iter().next().unwrap(),
            other => panic!("Expected arrow, got {}", other),
        }
    }

    #[test]
    fn test_pattern_evaluation() {
        let bindings = pattern("{a, b: [c, ...d]}")
            .evaluate(&Value::new_object(), scope(json!({"a": 1, "b": [2, 3, 4]})))
            .unwrap();
        assert_eq!(bindings.to_json(), json!({"a": 1, "c": 2, "d": [3, 4]}));
    }

    #[test]
    fn test_parameters() {
        let s = scope(json!({"pairs": [[1, 2], [3, 4]], "user": {"name": "Ada"}}));
        assert_eq!(eval_json("pairs.map(([k, v]) => k * v)", &s), json!([2, 12]));
        assert_eq!(eval_json("(({name, age = 36}) => `${name}:${age}`)(user)", &s), json!("Ada:36"));
        assert_eq!(eval_json("((a, b = a * 2) => b)(4)", &s), json!(8));
        assert_eq!(eval_json("((...rest) => rest.length)(1, 2, 3)", &s), json!(3));
    }

    #[test]
    fn test_assignment() {
        let s = scope(json!({"a": 1, "b": 2}));
        eval("[a, b] = [b, a]", &s).unwrap();
        assert_eq!(s.to_json(), json!({"a": 2, "b": 1}));
        eval("({a, c: b = 5} = {a: 7})", &s).unwrap();
        assert_eq!(s.to_json(), json!({"a": 7, "b": 5}));
    }

    #[test]
    fn test_nullish_source() {
        let s = scope(json!({}));
        let err = eval("(({a}) => a)(null)", &s).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::TypeError));
    }
}

mod assignment_operators {
    use super::*;
    use pretty_assertions::assert_eq;

    fn seeds() -> Vec<Value> {
        vec![
            Value::Number(5.0),
            Value::Number(-7.5),
            Value::Number(0.0),
            Value::String("3".into()),
            Value::Null,
            Value::Undefined,
            Value::Boolean(true),
            Value::BigInt(BigInt::from(9)),
        ]
    }

    fn run(source: &str, seed: &Value) -> (Result<serde_json::Value, String>, serde_json::Value) {
        let s = Value::new_object_with_properties([("a", seed.clone())]);
        let result = eval(source, &s)
            .map(|v| v.to_json())
            .map_err(|e| e.message().to_string());
        (result, s.to_json())
    }

    #[test]
    fn test_compound_matches_two_step_form() {
        assert_eq!(AssignmentOperator::ALL.len(), 16);
        for op in AssignmentOperator::ALL {
            let binary = op.as_str().trim_end_matches('=');
            for seed in seeds() {
                let seed_right = if matches!(seed, Value::BigInt(_)) { "2n" } else { "2" };
                let compound = format!("a {} {}", op.as_str(), seed_right);
                let two_step = if binary.is_empty() {
                    format!("a = {}", seed_right)
                } else {
                    format!("a = a {} {}", binary, seed_right)
                };
                assert_eq!(
                    run(&compound, &seed),
                    run(&two_step, &seed),
                    "{} vs {} with a = {:?}",
                    compound,
                    two_step,
                    seed
                );
            }
        }
    }

    #[test]
    fn test_logical_assignment_skips_write() {
        let s = scope(json!({"a": 1, "calls": 0}));
        eval("a ||= calls = 1", &s).unwrap();
        assert_eq!(s.to_json(), json!({"a": 1, "calls": 0}));
        eval("a &&= calls = 2", &s).unwrap();
        assert_eq!(s.to_json(), json!({"a": 2, "calls": 2}));
    }

    #[test]
    fn test_member_targets() {
        let s = scope(json!({"o": {"n": 1}, "k": "n"}));
        assert_eq!(eval_json("o.n += 4", &s), json!(5));
        assert_eq!(eval_json("o[k] **= 2", &s), json!(25));
        assert_eq!(eval_json("o.m ??= 'new'", &s), json!("new"));
        assert_eq!(eval_json("o.n++", &s), json!(25));
        assert_eq!(eval_json("--o.n", &s), json!(25));
        assert_eq!(s.get_property("o").unwrap().to_json(), json!({"n": 25, "m": "new"}));
    }
}

mod operators {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_coercions() {
        let s = scope(json!({}));
        assert_eq!(eval_json("'3' * '4'", &s), json!(12));
        assert_eq!(eval_json("1 + '2'", &s), json!("12"));
        assert_eq!(eval_json("[1, 2] + ''", &s), json!("1,2"));
        assert_eq!(eval_json("null == undefined", &s), json!(true));
        assert_eq!(eval_json("null === undefined", &s), json!(false));
        assert_eq!(eval_json("'10' < '9'", &s), json!(true));
        assert_eq!(eval_json("10 < '9'", &s), json!(false));
        assert_eq!(eval_json("-1 >>> 28", &s), json!(15));
        assert_eq!(eval_json("typeof null", &s), json!("object"));
        assert_eq!(eval_json("typeof (() => 1)", &s), json!("function"));
    }

    #[test]
    fn test_bigint() {
        let s = scope(json!({}));
        assert_eq!(eval("2n ** 64n", &s).unwrap(), Value::BigInt(BigInt::from(1u128 << 64)));
        assert_eq!(eval("7n / 2n", &s).unwrap(), Value::BigInt(BigInt::from(3)));
        let err = eval("1n + 1", &s).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::TypeError));
        let err = eval("1n / 0n", &s).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::RangeError));
    }

    #[test]
    fn test_short_circuit_evaluation() {
        let s = scope(json!({"hits": 0}));
        eval("false && (hits = 1)", &s).unwrap();
        eval("true || (hits = 2)", &s).unwrap();
        eval("0 ?? (hits = 3)", &s).unwrap();
        assert_eq!(s.to_json(), json!({"hits": 0}));
    }

    #[test]
    fn test_sequence_and_conditional() {
        let s = scope(json!({"n": 1}));
        assert_eq!(eval_json("(n += 1, n * 10)", &s), json!(20));
        assert_eq!(eval_json("n > 1 ? 'big' : 'small'", &s), json!("big"));
    }
}

mod size_limits {
    use super::*;
    use pretty_assertions::assert_eq;

    fn range_error(source: &str, s: &Value) -> String {
        let err = eval(source, s).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::RangeError), "{}", source);
        err.message().to_string()
    }

    #[test]
    fn test_bigint_results_are_bounded() {
        let s = scope(json!({}));
        assert_eq!(range_error("1n << 9007199254740991n", &s), messages::BIGINT_TOO_LARGE);
        assert_eq!(range_error("2n ** 100000000000n", &s), messages::BIGINT_TOO_LARGE);
        assert_eq!(range_error("3n >> -9007199254740991n", &s), messages::BIGINT_TOO_LARGE);
        assert_eq!(eval("-7n >> 9007199254740991n", &s).unwrap(), Value::BigInt(BigInt::from(-1)));
        assert_eq!(eval("7n >> 9007199254740991n", &s).unwrap(), Value::BigInt(BigInt::from(0)));
        assert_eq!(eval("(-1n) ** 9007199254740991n", &s).unwrap(), Value::BigInt(BigInt::from(-1)));
    }

    #[test]
    fn test_array_writes_are_bounded() {
        let s = scope(json!({"a": []}));
        assert_eq!(range_error("a.length = 1e15", &s), messages::INVALID_ARRAY_LENGTH);
        assert_eq!(range_error("a.length = -1", &s), messages::INVALID_ARRAY_LENGTH);
        assert_eq!(range_error("a[4000000000] = 1", &s), messages::ARRAY_TOO_LARGE);
        assert_eq!(eval_json("a.length", &s), json!(0));

        // not an array index, so a plain property
        assert_eq!(eval_json("a[10000000000] = 1", &s), json!(1));
        assert_eq!(eval_json("[a.length, a[10000000000]]", &s), json!([0, 1]));

        assert_eq!(eval_json("(a.length = 2, a)", &s), json!([null, null]));
    }

    #[test]
    fn test_string_results_are_bounded() {
        let s = scope(json!({}));
        assert_eq!(range_error("'ab'.repeat(1e15)", &s), messages::INVALID_STRING_LENGTH);
        assert_eq!(range_error("'a'.padStart(1e15)", &s), messages::INVALID_STRING_LENGTH);
        assert_eq!(range_error("'a'.padEnd(2 ** 40, 'xy')", &s), messages::INVALID_STRING_LENGTH);
        assert_eq!(eval_json("''.repeat(1e15)", &s), json!(""));
        assert_eq!(eval_json("'a'.padStart(1e15, '')", &s), json!("a"));
        assert_eq!(eval_json("'ab'.repeat(3)", &s), json!("ababab"));
        assert_eq!(eval_json("'a'.padEnd(3)", &s), json!("a  "));
    }

    #[test]
    fn test_string_indexing_counts_code_units() {
        let s = scope(json!({"s": "a\u{1F600}b"}));
        assert_eq!(eval_json("s.length", &s), json!(4));
        assert_eq!(eval_json("[s[0], s[3], s.at(-1), s.charAt(3)]", &s), json!(["a", "b", "b", "b"]));
        assert_eq!(eval_json("s.charCodeAt(1)", &s), json!(0xD83D));
    }
}

mod scopes_and_calls {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reference_errors() {
        let s = scope(json!({}));
        let err = eval("missing + 1", &s).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::ReferenceError));
        assert_eq!(err.message(), "missing is not defined");
        assert_eq!(eval_json("typeof missing", &s), json!("undefined"));
    }

    #[test]
    fn test_native_functions() {
        let double = Value::new_native_function("double", |_this, args| {
            Ok(Value::Number(args.first().map(|v| v.to_number()).unwrap_or(0.0) * 2.0))
        });
        let s = Value::new_object_with_properties([("double", double), ("n", Value::Number(4.0))]);
        assert_eq!(eval("double(n) + 1", &s).unwrap(), Value::Number(9.0));
        let err = eval("n()", &s).unwrap_err();
        assert_eq!(err.message(), "n is not a function");
    }

    #[test]
    fn test_closures_capture_scope() {
        let s = scope(json!({"base": 10, "list": [1, 2, 3]}));
        assert_eq!(eval_json("list.map(x => x + base)", &s), json!([11, 12, 13]));
        assert_eq!(eval_json("((a) => (b) => a + b)(1)(2)", &s), json!(3));
        assert_eq!(
            eval_json("list.reduce((acc, x) => ({...acc, [x]: x * x}), {})", &s),
            json!({"1": 1, "2": 4, "3": 9})
        );
    }

    #[test]
    fn test_this_binding() {
        let s = scope(json!({"this": {"name": "outer"}}));
        assert_eq!(eval_json("this.name", &s), json!("outer"));
        assert_eq!(eval_json("(() => this.name)()", &s), json!("outer"));
    }

    #[test]
    fn test_tagged_templates() {
        let tag = Value::new_native_function("tag", |_this, args| {
            let strings = args.first().and_then(|v| v.as_array()).unwrap_or_default();
            let joined: Vec<String> = strings.iter().map(|s| s.to_js_string()).collect();
            Ok(Value::String(format!("{}|{}", joined.join("_"), args.len() - 1)))
        });
        let s = Value::new_object_with_properties([("tag", tag), ("x", Value::Number(1.0))]);
        assert_eq!(eval("tag`a${x}b${x}`", &s).unwrap(), Value::String("a_b_|2".into()));
    }
}

mod caching {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cache_hits_across_passes() {
        let s = scope(json!({"user": {"first": "Ada", "last": "Lovelace"}}));
        let expr = parse("user.first + ' ' + user.last").unwrap();
        let mut ctx = EvalContext::with_cache();
        let first = expr.evaluate_with(&s, &mut ctx).unwrap();
        assert_eq!(ctx.cache_hits(), 0);
        let second = expr.evaluate_with(&s, &mut ctx).unwrap();
        assert_eq!(first, second);
        assert!(ctx.cache_hits() >= 2);
    }

    #[test]
    fn test_cached_results_are_stale_until_cleared() {
        let s = scope(json!({"o": {"n": 1}}));
        let expr = parse("o.n").unwrap();
        let mut ctx = EvalContext::with_cache();
        assert_eq!(expr.evaluate_with(&s, &mut ctx).unwrap(), Value::Number(1.0));

        eval("o.n = 2", &s).unwrap();
        assert_eq!(expr.evaluate_with(&s, &mut ctx).unwrap(), Value::Number(1.0));

        ctx.clear();
        assert_eq!(expr.evaluate_with(&s, &mut ctx).unwrap(), Value::Number(2.0));
    }

    #[test]
    fn test_delete_runs_on_every_pass() {
        let s = scope(json!({"o": {"a": 1}}));
        let expr = parse("delete o.a").unwrap();
        let mut ctx = EvalContext::with_cache();
        assert_eq!(expr.evaluate_with(&s, &mut ctx).unwrap(), Value::Boolean(true));

        eval("o.a = 2", &s).unwrap();
        expr.evaluate_with(&s, &mut ctx).unwrap();
        assert_eq!(s.to_json(), json!({"o": {}}));
    }

    #[test]
    fn test_uncached_context_matches_plain_evaluation() {
        let s = scope(json!({"xs": [3, 1, 2]}));
        let expr = parse("xs.slice().sort().map(x => -x)").unwrap();
        let mut ctx = EvalContext::new();
        assert_eq!(
            expr.evaluate_with(&s, &mut ctx).unwrap().to_json(),
            expr.evaluate(&s).unwrap().to_json()
        );
        assert_eq!(ctx.cache_hits(), 0);
    }
}
