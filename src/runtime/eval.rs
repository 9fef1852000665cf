//! Tree-walking evaluator
//!
//! Expressions evaluate against a scope object. Identifier lookup walks the scope's
//! prototype chain; arrow functions capture the scope they were created in and bind
//! their parameters in a child scope whose prototype is the captured one.

use super::context::{is_cacheable, EvalContext};
use super::ops::{self, binary_op, iterate, to_property_key};
use super::value::{Closure, Object, ObjectKind, Value};
use crate::ast::*;
use crate::error::{messages, Error, Result};
use std::rc::Rc;

impl Expression {
    /// Evaluate against `scope` without caching
    pub fn evaluate(&self, scope: &Value) -> Result<Value> {
        self.evaluate_with(scope, &mut EvalContext::new())
    }

    /// Evaluate against `scope` using an explicit context
    pub fn evaluate_with(&self, scope: &Value, ctx: &mut EvalContext) -> Result<Value> {
        tracing::trace!(node = %self.node_type(), cache = ctx.is_caching(), "evaluate");
        self.eval(scope, ctx)
    }

    fn eval(&self, scope: &Value, ctx: &mut EvalContext) -> Result<Value> {
        if ctx.is_caching() && is_cacheable(self) {
            if let Some(value) = ctx.lookup(self) {
                return Ok(value);
            }
            let value = self.eval_uncached(scope, ctx)?;
            ctx.store(self, &value);
            return Ok(value);
        }
        self.eval_uncached(scope, ctx)
    }

    fn eval_uncached(&self, scope: &Value, ctx: &mut EvalContext) -> Result<Value> {
        match self {
            Expression::Identifier(id) => lookup_identifier(scope, &id.name),
            Expression::Literal(lit) => Ok(literal_value(&lit.value)),
            Expression::RegExp(r) => Ok(Value::from_object(Object::new(ObjectKind::RegExp(
                r.value.clone(),
            )))),
            Expression::TemplateLiteral(t) => {
                let mut out = String::new();
                for (i, quasi) in t.quasis.iter().enumerate() {
                    out.push_str(&quasi.cooked);
                    if let Some(expr) = t.expressions.get(i) {
                        out.push_str(&expr.eval(scope, ctx)?.to_js_string());
                    }
                }
                Ok(Value::String(out))
            }
            Expression::TaggedTemplate(t) => {
                let (this, tag) = eval_callee(&t.tag, scope, ctx)?
                    .unwrap_or((Value::Undefined, Value::Undefined));
                let strings = template_strings(&t.quasi);
                let mut args = vec![strings];
                for expr in &t.quasi.expressions {
                    args.push(expr.eval(scope, ctx)?);
                }
                call_value(&tag, this, &args, &t.tag)
            }
            Expression::Array(a) => {
                let mut elements = Vec::with_capacity(a.elements.len());
                for element in &a.elements {
                    match element {
                        None => elements.push(Value::Undefined),
                        Some(expr) => push_element(&mut elements, expr, scope, ctx)?,
                    }
                }
                Ok(Value::new_array(elements))
            }
            Expression::Object(o) => eval_object(o, scope, ctx),
            Expression::Arrow(arrow) => Ok(Value::from_object(Object::new(
                ObjectKind::Function(Closure {
                    function: Rc::new((**arrow).clone()),
                    scope: scope.clone(),
                }),
            ))),
            Expression::This(_) => Ok(lookup_binding(scope, "this").unwrap_or(Value::Undefined)),
            Expression::Member(_) | Expression::Call(_) => {
                Ok(eval_chain(self, scope, ctx)?.unwrap_or(Value::Undefined))
            }
            Expression::New(n) => {
                let callee = n.callee.eval(scope, ctx)?;
                let args = eval_arguments(&n.arguments, scope, ctx)?;
                construct(&callee, &args, &n.callee)
            }
            Expression::Unary(u) => eval_unary(u, scope, ctx),
            Expression::Update(u) => {
                let reference = Reference::resolve(&u.argument, scope, ctx)?;
                let old = ops::to_numeric_value(&reference.get()?);
                let delta = match u.operator {
                    UpdateOperator::Increment => 1,
                    UpdateOperator::Decrement => -1,
                };
                let new = ops::step(&old, delta);
                reference.set(new.clone())?;
                Ok(if u.prefix { new } else { old })
            }
            Expression::Binary(b) => {
                let left = b.left.eval(scope, ctx)?;
                let right = b.right.eval(scope, ctx)?;
                binary_op(b.operator, &left, &right)
            }
            Expression::Logical(l) => {
                let left = l.left.eval(scope, ctx)?;
                let short_circuit = match l.operator {
                    LogicalOperator::And => !left.to_boolean(),
                    LogicalOperator::Or => left.to_boolean(),
                    LogicalOperator::NullishCoalescing => !left.is_nullish(),
                };
                if short_circuit {
                    Ok(left)
                } else {
                    l.right.eval(scope, ctx)
                }
            }
            Expression::Assignment(a) => eval_assignment(a, scope, ctx),
            Expression::Conditional(c) => {
                if c.test.eval(scope, ctx)?.to_boolean() {
                    c.consequent.eval(scope, ctx)
                } else {
                    c.alternate.eval(scope, ctx)
                }
            }
            Expression::Sequence(s) => {
                let mut last = Value::Undefined;
                for expr in &s.expressions {
                    last = expr.eval(scope, ctx)?;
                }
                Ok(last)
            }
            Expression::Spread(_) => Err(Error::syntax_error(messages::unexpected_token("..."))),
            Expression::Chain(c) => Ok(eval_chain(&c.expression, scope, ctx)?.unwrap_or(Value::Undefined)),
            Expression::Parenthesized(p) => p.expression.eval(scope, ctx),
        }
    }
}

fn literal_value(value: &LiteralValue) -> Value {
    match value {
        LiteralValue::Null => Value::Null,
        LiteralValue::Boolean(b) => Value::Boolean(*b),
        LiteralValue::Number(n) => Value::Number(*n),
        LiteralValue::BigInt(n) => Value::BigInt(n.clone()),
        LiteralValue::String(s) => Value::String(s.clone()),
    }
}

/// Object on the scope chain that owns `name`
fn find_owner(scope: &Value, name: &str) -> Option<Value> {
    let Value::Object(obj) = scope else {
        return None;
    };
    let mut current = Some(obj.clone());
    while let Some(obj) = current {
        if obj.borrow().has_own_property(name) {
            return Some(Value::Object(obj));
        }
        current = obj.borrow().prototype.clone();
    }
    None
}

fn lookup_binding(scope: &Value, name: &str) -> Option<Value> {
    find_owner(scope, name).and_then(|owner| owner.get_property(name))
}

fn lookup_identifier(scope: &Value, name: &str) -> Result<Value> {
    if name == "undefined" {
        return Ok(Value::Undefined);
    }
    lookup_binding(scope, name).ok_or_else(|| Error::reference_error(messages::not_defined(name)))
}

fn assign_identifier(scope: &Value, name: &str, value: Value) -> Result<()> {
    let target = find_owner(scope, name).unwrap_or_else(|| scope.clone());
    if !target.set_property(name, value)? {
        return Err(Error::type_error(messages::cannot_set_property(
            name,
            &target.to_js_string(),
        )));
    }
    Ok(())
}

fn member_key(property: &MemberProperty, scope: &Value, ctx: &mut EvalContext) -> Result<String> {
    match property {
        MemberProperty::Identifier(id) => Ok(id.name.clone()),
        MemberProperty::Expression(expr) => Ok(to_property_key(&expr.eval(scope, ctx)?)),
    }
}

fn get_member(object: &Value, key: &str) -> Result<Value> {
    if object.is_nullish() {
        return Err(Error::type_error(messages::cannot_read_property(
            key,
            &object.to_js_string(),
        )));
    }
    Ok(object.get_property(key).unwrap_or(Value::Undefined))
}

/// Evaluate a link of a member/call chain; `None` once an optional link
/// short-circuits, which skips the rest of the chain
fn eval_chain(expr: &Expression, scope: &Value, ctx: &mut EvalContext) -> Result<Option<Value>> {
    match expr {
        Expression::Member(m) => {
            let Some(object) = eval_chain(&m.object, scope, ctx)? else {
                return Ok(None);
            };
            if m.optional && object.is_nullish() {
                return Ok(None);
            }
            let key = member_key(&m.property, scope, ctx)?;
            get_member(&object, &key).map(Some)
        }
        Expression::Call(c) => {
            let Some((this, callee)) = eval_callee(&c.callee, scope, ctx)? else {
                return Ok(None);
            };
            if c.optional && callee.is_nullish() {
                return Ok(None);
            }
            let args = eval_arguments(&c.arguments, scope, ctx)?;
            call_value(&callee, this, &args, &c.callee).map(Some)
        }
        other => other.eval(scope, ctx).map(Some),
    }
}

/// Callee and its `this` value; member callees bind `this` to their base
fn eval_callee(
    expr: &Expression,
    scope: &Value,
    ctx: &mut EvalContext,
) -> Result<Option<(Value, Value)>> {
    match expr {
        Expression::Member(m) => {
            let Some(object) = eval_chain(&m.object, scope, ctx)? else {
                return Ok(None);
            };
            if m.optional && object.is_nullish() {
                return Ok(None);
            }
            let key = member_key(&m.property, scope, ctx)?;
            let callee = get_member(&object, &key)?;
            Ok(Some((object, callee)))
        }
        Expression::Parenthesized(p) if matches!(p.expression, Expression::Member(_)) => {
            eval_callee(&p.expression, scope, ctx)
        }
        other => Ok(eval_chain(other, scope, ctx)?.map(|callee| (Value::Undefined, callee))),
    }
}

fn eval_arguments(
    arguments: &[Expression],
    scope: &Value,
    ctx: &mut EvalContext,
) -> Result<Vec<Value>> {
    let mut values = Vec::with_capacity(arguments.len());
    for argument in arguments {
        push_element(&mut values, argument, scope, ctx)?;
    }
    Ok(values)
}

/// Push an element or the items of a spread
fn push_element(
    out: &mut Vec<Value>,
    expr: &Expression,
    scope: &Value,
    ctx: &mut EvalContext,
) -> Result<()> {
    match expr {
        Expression::Spread(spread) => {
            let value = spread.argument.eval(scope, ctx)?;
            let items = iterate(&value).ok_or_else(|| {
                Error::type_error(messages::not_iterable(&spread.argument.to_string()))
            })?;
            out.extend(items);
        }
        expr => out.push(expr.eval(scope, ctx)?),
    }
    Ok(())
}

fn eval_object(o: &ObjectExpression, scope: &Value, ctx: &mut EvalContext) -> Result<Value> {
    let mut object = Object::new(ObjectKind::Ordinary);
    for property in &o.properties {
        match property {
            ObjectProperty::Property(p) => {
                let key = match &p.key {
                    PropertyKey::Computed(expr) => to_property_key(&expr.eval(scope, ctx)?),
                    key => key.static_name().unwrap_or_default(),
                };
                let value = p.value.eval(scope, ctx)?;
                object.insert_property(&key, value);
            }
            ObjectProperty::Spread(s) => {
                let value = s.argument.eval(scope, ctx)?;
                copy_own_properties(&mut object, &value, &[]);
            }
        }
    }
    Ok(Value::from_object(object))
}

/// Copy own enumerable properties of `source` except `excluded`
pub(crate) fn copy_own_properties(target: &mut Object, source: &Value, excluded: &[String]) {
    match source {
        Value::Object(obj) => {
            let obj = obj.borrow();
            for key in obj.own_keys() {
                if excluded.contains(&key) {
                    continue;
                }
                if let Some(value) = obj.get_own_property(&key) {
                    target.insert_property(&key, value);
                }
            }
        }
        Value::String(s) => {
            for (i, c) in s.chars().enumerate() {
                let key = i.to_string();
                if !excluded.contains(&key) {
                    target.insert_property(&key, Value::String(c.to_string()));
                }
            }
        }
        _ => {}
    }
}

fn template_strings(quasi: &TemplateLiteral) -> Value {
    let cooked = quasi
        .quasis
        .iter()
        .map(|q| Value::String(q.cooked.clone()))
        .collect();
    let raw = quasi
        .quasis
        .iter()
        .map(|q| Value::String(q.raw.clone()))
        .collect();
    let mut strings = Object::new(ObjectKind::Array(cooked));
    strings.insert_property("raw", Value::new_array(raw));
    Value::from_object(strings)
}

fn eval_unary(u: &UnaryExpression, scope: &Value, ctx: &mut EvalContext) -> Result<Value> {
    match u.operator {
        UnaryOperator::Typeof => {
            // Undeclared names are "undefined" rather than an error
            if let Expression::Identifier(id) = &u.argument {
                let value = lookup_identifier(scope, &id.name).unwrap_or(Value::Undefined);
                return Ok(Value::String(value.type_of().to_string()));
            }
            let value = u.argument.eval(scope, ctx)?;
            Ok(Value::String(value.type_of().to_string()))
        }
        UnaryOperator::Delete => match &u.argument {
            Expression::Member(m) => {
                let object = m.object.eval(scope, ctx)?;
                let key = member_key(&m.property, scope, ctx)?;
                match &object {
                    Value::Object(obj) => Ok(Value::Boolean(obj.borrow_mut().delete_property(&key))),
                    v if v.is_nullish() => Err(Error::type_error(messages::cannot_read_property(
                        &key,
                        &v.to_js_string(),
                    ))),
                    _ => Ok(Value::Boolean(true)),
                }
            }
            Expression::Identifier(_) => Ok(Value::Boolean(false)),
            other => {
                other.eval(scope, ctx)?;
                Ok(Value::Boolean(true))
            }
        },
        UnaryOperator::Void => {
            u.argument.eval(scope, ctx)?;
            Ok(Value::Undefined)
        }
        UnaryOperator::Not => Ok(Value::Boolean(!u.argument.eval(scope, ctx)?.to_boolean())),
        UnaryOperator::Minus => Ok(ops::negate(&u.argument.eval(scope, ctx)?)),
        UnaryOperator::Plus => ops::unary_plus(&u.argument.eval(scope, ctx)?),
        UnaryOperator::BitwiseNot => Ok(ops::bitwise_not(&u.argument.eval(scope, ctx)?)),
    }
}

/// Resolved assignment target; member keys are evaluated once
enum Reference {
    Binding { scope: Value, name: String },
    Property { object: Value, key: String },
}

impl Reference {
    fn resolve(target: &AssignmentTarget, scope: &Value, ctx: &mut EvalContext) -> Result<Self> {
        match target {
            AssignmentTarget::Identifier(id) => Ok(Reference::Binding {
                scope: scope.clone(),
                name: id.name.clone(),
            }),
            AssignmentTarget::Member(m) => {
                let object = m.object.eval(scope, ctx)?;
                let key = member_key(&m.property, scope, ctx)?;
                Ok(Reference::Property { object, key })
            }
            AssignmentTarget::Pattern(_) => {
                Err(Error::syntax_error(messages::INVALID_LHS_IN_ASSIGNMENT))
            }
        }
    }

    fn get(&self) -> Result<Value> {
        match self {
            Reference::Binding { scope, name } => lookup_identifier(scope, name),
            Reference::Property { object, key } => get_member(object, key),
        }
    }

    fn set(&self, value: Value) -> Result<()> {
        match self {
            Reference::Binding { scope, name } => assign_identifier(scope, name, value),
            Reference::Property { object, key } => {
                if object.is_nullish() {
                    return Err(Error::type_error(messages::cannot_set_property(
                        key,
                        &object.to_js_string(),
                    )));
                }
                object.set_property(key, value)?;
                Ok(())
            }
        }
    }
}

fn eval_assignment(
    a: &AssignmentExpression,
    scope: &Value,
    ctx: &mut EvalContext,
) -> Result<Value> {
    if let AssignmentTarget::Pattern(pattern) = &a.left {
        if a.operator != AssignmentOperator::Assign {
            return Err(Error::syntax_error(messages::INVALID_LHS_IN_ASSIGNMENT));
        }
        let value = a.right.eval(scope, ctx)?;
        destructure_assign(pattern, scope, value.clone())?;
        return Ok(value);
    }

    let reference = Reference::resolve(&a.left, scope, ctx)?;

    let value = if let Some(op) = a.operator.logical_operator() {
        let current = reference.get()?;
        let short_circuit = match op {
            LogicalOperator::And => !current.to_boolean(),
            LogicalOperator::Or => current.to_boolean(),
            LogicalOperator::NullishCoalescing => !current.is_nullish(),
        };
        if short_circuit {
            return Ok(current);
        }
        a.right.eval(scope, ctx)?
    } else if let Some(op) = a.operator.binary_operator() {
        let current = reference.get()?;
        let right = a.right.eval(scope, ctx)?;
        binary_op(op, &current, &right)?
    } else {
        a.right.eval(scope, ctx)?
    };

    reference.set(value.clone())?;
    Ok(value)
}

/// `[a, b] = value`: bind into a scratch object, then assign each name in scope
fn destructure_assign(pattern: &Pattern, scope: &Value, value: Value) -> Result<()> {
    let bindings = pattern.evaluate(scope, value)?;
    let Value::Object(bindings) = bindings else {
        return Ok(());
    };
    let bindings = bindings.borrow();
    for name in bindings.own_keys() {
        let value = bindings.get_own_property(&name).unwrap_or(Value::Undefined);
        assign_identifier(scope, &name, value)?;
    }
    Ok(())
}

/// Call a function value with an explicit `this`
pub fn call_function(callee: &Value, this: Value, args: &[Value]) -> Result<Value> {
    let Value::Object(obj) = callee else {
        return Err(Error::type_error(messages::not_a_function(&callee.to_js_string())));
    };
    let kind = obj.borrow().kind.clone();

    match kind {
        ObjectKind::Function(closure) => call_closure(&closure, args),
        ObjectKind::NativeFunction { func, .. } => func(&this, args),
        ObjectKind::BoundArrayMethod { receiver, method } => {
            super::builtins::call_array_method(&receiver, &method, args)
        }
        ObjectKind::BoundStringMethod { receiver, method } => {
            super::builtins::call_string_method(&receiver, &method, args)
        }
        ObjectKind::BoundNumberMethod { receiver, method } => {
            super::builtins::call_number_method(receiver, &method, args)
        }
        ObjectKind::BoundRegExpMethod { receiver, method } => {
            super::builtins::call_regexp_method(&receiver, &method, args)
        }
        _ => Err(Error::type_error(messages::not_a_function(&callee.to_js_string()))),
    }
}

fn call_value(callee: &Value, this: Value, args: &[Value], callee_expr: &Expression) -> Result<Value> {
    if !callee.is_callable() {
        return Err(Error::type_error(messages::not_a_function(&callee_expr.to_string())));
    }
    call_function(callee, this, args)
}

/// Bind parameters in a child of the captured scope, then evaluate the body
///
/// Each call is its own evaluation pass, so the body never sees a caller's cache.
fn call_closure(closure: &Closure, args: &[Value]) -> Result<Value> {
    let parent = match &closure.scope {
        Value::Object(obj) => Some(obj.clone()),
        _ => None,
    };
    let frame = Rc::new(std::cell::RefCell::new(Object::with_prototype(parent)));
    let frame_scope = Value::Object(frame.clone());

    for (i, param) in closure.function.params.iter().enumerate() {
        let value = match param {
            Pattern::Rest(_) => Value::new_array(args.get(i..).unwrap_or_default().to_vec()),
            _ => args.get(i).cloned().unwrap_or(Value::Undefined),
        };
        param.bind(&frame_scope, value, &frame)?;
    }

    closure.function.body.evaluate(&frame_scope)
}

fn construct(callee: &Value, args: &[Value], callee_expr: &Expression) -> Result<Value> {
    let not_a_constructor = || Error::type_error(messages::not_a_constructor(&callee_expr.to_string()));
    let Value::Object(obj) = callee else {
        return Err(not_a_constructor());
    };
    let func = match &obj.borrow().kind {
        ObjectKind::NativeFunction {
            func,
            constructor: true,
            ..
        } => func.clone(),
        _ => return Err(not_a_constructor()),
    };

    let instance = func(&Value::Undefined, args)?;
    if let (Value::Object(instance), Some(Value::Object(prototype))) =
        (&instance, callee.get_property("prototype"))
    {
        let mut instance = instance.borrow_mut();
        if instance.prototype.is_none() {
            instance.prototype = Some(prototype);
        }
    }
    Ok(instance)
}
