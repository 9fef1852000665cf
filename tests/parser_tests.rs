//! Integration tests for parsing, printing and the node factory

mod common;
use common::{eval, print, scope, syntax_error};
use surface_expression::ast::NodeType;
use surface_expression::error::messages;
use surface_expression::{parse, Expression, Pattern, Value};

fn corpus_scope() -> Value {
    scope(serde_json::json!({
        "a": 2,
        "b": 3,
        "c": 0,
        "x": true,
        "y": "yes",
        "z": false,
        "key": "k",
        "obj": {"k": 7, "b": {"c": 1}},
        "list": [1, 2, 3],
        "items": [{"v": 1}, {"v": 5}],
        "nothing": null
    }))
}

mod round_trip {
    use super::*;
    use pretty_assertions::assert_eq;

    const CORPUS: &[&str] = &[
        "1 + 2 * 3",
        "(1 + 2) * 3",
        "a - (b - c)",
        "a ** b ** 2",
        "(-a) ** 2",
        "x ? y : z ? 1 : 2",
        "nothing?.b.c ?? 'none'",
        "obj?.b?.c",
        "obj[key] + obj.b['c']",
        "`sum: ${a + b}, ${y}`",
        "[...list, a, , b]",
        "({ ...obj, extra: a, [key + 1]: b })",
        "list.map(x => x * a)",
        "((p, q = 2) => p * q)(a)",
        "(({ v }, i) => v + i)(items[1], 1)",
        "items.filter(({ v }) => v > 1).length",
        "typeof missing",
        "!a || b && c",
        "(a, b)",
        "a < b === b > a",
        "'abc'[1]",
        "-a - -b",
        "a + +b",
        "void 0",
        "!!list.length",
        "a & b | c ^ 1 << 2",
        "0x10 >>> 1",
        "10n ** 2n",
        "1.5.toFixed(2)",
        "(1).toString()",
        "'ab'.repeat(2).toUpperCase()",
        "/a+/g.test(y)",
        "a in obj || 'k' in obj",
        "(a ?? b) || c",
        "[a, b] = [b, a]",
        "({ a, b = 9 } = { a: 5 })",
        "1e400",
        "-1e400 < a",
    ];

    #[test]
    fn test_reparse_evaluates_identically() {
        for source in CORPUS {
            let printed = print(source);
            let first = eval(source, &corpus_scope())
                .unwrap_or_else(|e| panic!("{} failed: {}", source, e));
            let second = eval(&printed, &corpus_scope())
                .unwrap_or_else(|e| panic!("{} (printed from {}) failed: {}", printed, source, e));
            assert_eq!(first.to_json(), second.to_json(), "{} vs {}", source, printed);
        }
    }

    #[test]
    fn test_printing_is_stable() {
        for source in CORPUS {
            let once = print(source);
            assert_eq!(print(&once), once);
        }
    }

    #[test]
    fn test_printed_forms() {
        assert_eq!(print("a+b*c"), "a + b * c");
        assert_eq!(print("x=>x"), "(x) => x");
        assert_eq!(print("() => ({a: 1})"), "() => ({ a: 1 })");
        assert_eq!(print("a?.[0]?.(1)"), "a?.[0]?.(1)");
        assert_eq!(print("typeof(a)"), "typeof (a)");
        assert_eq!(print("{}"), "{ }");
        assert_eq!(print("0xff"), "255");
        assert_eq!(print("`a${b}c`"), "`a${b}c`");
    }

    #[test]
    fn test_non_finite_numbers_reparse() {
        assert_eq!(print("1e400"), "1e999");
        assert_eq!(print("-1e400"), "-1e999");
        let empty = Value::new_object();
        assert_eq!(eval(&print("1e400"), &empty).unwrap(), Value::Number(f64::INFINITY));

        let nan = Expression::number(f64::NAN);
        let printed = nan.to_string();
        let reparsed = parse(&printed).unwrap().evaluate(&empty).unwrap();
        assert_eq!(reparsed, Value::Number(f64::NAN));

        let negative = Expression::number(f64::NEG_INFINITY);
        let reparsed = parse(&negative.to_string()).unwrap().evaluate(&empty).unwrap();
        assert_eq!(reparsed, Value::Number(f64::NEG_INFINITY));
    }

    #[test]
    fn test_clone_is_deep() {
        let expr = parse("a.b + f(c)").unwrap();
        let copy = expr.clone();
        drop(expr);
        assert_eq!(copy.to_string(), "a.b + f(c)");
        assert_eq!(copy.node_type(), NodeType::BinaryExpression);
    }
}

mod precedence {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_arithmetic_precedence() {
        let empty = scope(serde_json::json!({}));
        assert_eq!(eval("1 + 2 * 3", &empty).unwrap(), Value::Number(7.0));
        assert_eq!(eval("(1 + 2) * 3", &empty).unwrap(), Value::Number(9.0));
        assert_eq!(eval("2 ** 3 ** 2", &empty).unwrap(), Value::Number(512.0));
        assert_eq!(eval("10 - 4 - 3", &empty).unwrap(), Value::Number(3.0));
    }

    #[test]
    fn test_node_shapes() {
        let expr = parse("a || b && c").unwrap();
        assert_eq!(expr.node_type(), NodeType::LogicalExpression);
        assert_eq!(parse("a = b = c").unwrap().node_type(), NodeType::AssignmentExpression);
        assert_eq!(parse("a ? b : c").unwrap().node_type(), NodeType::ConditionalExpression);
        assert_eq!(parse("a?.b").unwrap().node_type(), NodeType::ChainExpression);
        assert_eq!(parse("(a)").unwrap().node_type(), NodeType::ParenthesizedExpression);
    }

    #[test]
    fn test_unary_before_exponentiation() {
        assert_eq!(syntax_error("-a ** 2"), messages::UNARY_BEFORE_EXPONENTIATION);
        assert!(parse("(-a) ** 2").is_ok());
    }
}

mod nullish_coalescing {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mixing_requires_parens() {
        assert_eq!(syntax_error("a ?? b || c"), messages::MIXED_COALESCING_AND_LOGICAL);
        assert_eq!(syntax_error("a || b ?? c"), messages::MIXED_COALESCING_AND_LOGICAL);
        assert_eq!(syntax_error("a && b ?? c"), messages::MIXED_COALESCING_AND_LOGICAL);
        assert_eq!(syntax_error("a ?? b && c"), messages::MIXED_COALESCING_AND_LOGICAL);
    }

    #[test]
    fn test_parenthesized_mixing() {
        assert!(parse("(a ?? b) || c").is_ok());
        assert!(parse("a ?? (b || c)").is_ok());
        assert!(parse("a ?? b ?? c").is_ok());
        assert!(parse("a ?? b | c").is_ok());
    }

    #[test]
    fn test_mixing_across_longer_chains() {
        assert_eq!(syntax_error("a || b || c ?? d"), messages::MIXED_COALESCING_AND_LOGICAL);
        assert_eq!(syntax_error("a ?? b ?? c || d"), messages::MIXED_COALESCING_AND_LOGICAL);
        assert_eq!(syntax_error("a ?? b == c && d"), messages::MIXED_COALESCING_AND_LOGICAL);
    }
}

mod arrow_functions {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_duplicate_parameters_in_parser() {
        assert_eq!(syntax_error("(x, x) => x"), messages::DUPLICATE_PARAMETER);
        assert_eq!(syntax_error("({x}, [x]) => x"), messages::DUPLICATE_PARAMETER);
        assert_eq!(syntax_error("(x, ...x) => x"), messages::DUPLICATE_PARAMETER);
    }

    #[test]
    fn test_duplicate_parameters_in_factory() {
        let err = Expression::arrow_function(
            vec![Pattern::identifier("x"), Pattern::identifier("x")],
            Expression::identifier("x"),
        )
        .unwrap_err();
        assert!(err.is_syntax_error());
        assert_eq!(err.message(), messages::DUPLICATE_PARAMETER);
    }

    #[test]
    fn test_parameter_forms() {
        assert_eq!(print("(a, [b, c], {d: e = 1}, ...f) => a"), "(a, [b, c], { d: e = 1 }, ...f) => a");
        assert_eq!(print("(...[a, b]) => a"), "(...[a, b]) => a");
        assert_eq!(syntax_error("(...a, b) => a"), messages::REST_PARAMETER_MUST_BE_LAST);
        assert_eq!(syntax_error("([...a,]) => a"), messages::REST_PARAMETER_MUST_BE_LAST);
        assert_eq!(syntax_error("(a.b) => 1"), messages::ILLEGAL_PROPERTY_IN_DECLARATION);
        assert_eq!(syntax_error("(1) => 1"), messages::INVALID_DESTRUCTURING_TARGET);
    }

    #[test]
    fn test_arrow_only_at_assignment_start() {
        assert!(parse("a + (b) => c").is_err());
        assert!(parse("a ? (b) => c : d => e").is_ok());
    }
}

mod errors {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_eof_offset() {
        let source = "1 + ";
        let err = parse(source).unwrap_err();
        assert_eq!(err.message(), messages::UNEXPECTED_END_OF_INPUT);
        assert_eq!(err.location().unwrap().offset, source.len());
    }

    #[test]
    fn test_error_locations() {
        let err = parse("a +\n  )").unwrap_err();
        let location = err.location().unwrap();
        assert_eq!(location.line, 2);
        assert_eq!(location.column, 3);
        assert!(err.to_string().contains("Unexpected token ')'"));
    }

    #[test]
    fn test_invalid_targets() {
        assert_eq!(syntax_error("1 = a"), messages::INVALID_LHS_IN_ASSIGNMENT);
        assert_eq!(syntax_error("a + b = c"), messages::INVALID_LHS_IN_ASSIGNMENT);
        assert_eq!(syntax_error("++a.b()"), messages::INVALID_LHS_IN_PREFIX_OP);
        assert_eq!(syntax_error("f()++"), messages::INVALID_LHS_IN_POSTFIX_OP);
        assert_eq!(syntax_error("({a = 1})"), "Invalid shorthand property initializer");
        assert_eq!(syntax_error("a?.b`c`"), messages::INVALID_TAGGED_TEMPLATE_ON_OPTIONAL_CHAIN);
    }

    #[test]
    fn test_comma_after_rest_element() {
        assert_eq!(syntax_error("[...a,] = x"), messages::REST_PARAMETER_MUST_BE_LAST);
        assert_eq!(syntax_error("[b, ...a,] = x"), messages::REST_PARAMETER_MUST_BE_LAST);
        let err = parse("[...a,] = x").unwrap_err();
        assert_eq!(err.location().unwrap().column, 6);

        // still fine as an array literal or without the comma
        assert_eq!(print("[...a,]"), "[...a]");
        assert_eq!(print("[a,] = x"), "[a] = x");
        assert_eq!(print("[...a] = x"), "[...a] = x");
    }

    #[test]
    fn test_trailing_tokens() {
        assert_eq!(syntax_error("a b"), messages::UNEXPECTED_IDENTIFIER);
        assert_eq!(syntax_error("a 1"), messages::UNEXPECTED_NUMBER);
        assert_eq!(syntax_error("a 'b'"), messages::UNEXPECTED_STRING);
    }
}

mod factory {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_built_tree_evaluates() {
        let expr = Expression::binary(
            surface_expression::ast::BinaryOperator::Add,
            Expression::member(
                Expression::identifier("user"),
                Expression::identifier("age"),
                false,
                false,
            )
            .unwrap(),
            Expression::number(1.0),
        );
        let scope = scope(serde_json::json!({"user": {"age": 41}}));
        assert_eq!(expr.to_string(), "(user.age + 1)");
        assert_eq!(expr.evaluate(&scope).unwrap(), Value::Number(42.0));
    }

    #[test]
    fn test_factory_validates_targets() {
        let err = Expression::assignment(
            surface_expression::ast::AssignmentOperator::Assign,
            Expression::number(1.0),
            Expression::number(2.0),
        )
        .unwrap_err();
        assert_eq!(err.message(), messages::INVALID_LHS_IN_ASSIGNMENT);
    }

    #[test]
    fn test_binary_nodes_are_wrapped() {
        let expr = Expression::binary(
            surface_expression::ast::BinaryOperator::Mul,
            Expression::binary(
                surface_expression::ast::BinaryOperator::Add,
                Expression::number(1.0),
                Expression::number(2.0),
            ),
            Expression::number(3.0),
        );
        assert_eq!(expr.to_string(), "((1 + 2) * 3)");
        assert_eq!(
            expr.evaluate(&Value::new_object()).unwrap(),
            Value::Number(9.0)
        );
    }
}
