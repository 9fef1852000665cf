//! Destructuring
//!
//! Patterns bind names from an incoming value. Defaults evaluate against the scope
//! passed in, so for arrow parameters they can see earlier parameters.

use super::eval::copy_own_properties;
use super::ops::{iterate, to_property_key};
use super::value::{Object, ObjectKind, Value};
use crate::ast::*;
use crate::error::{messages, Error, Result};
use std::cell::RefCell;
use std::rc::Rc;

impl Pattern {
    /// Destructure `value`, returning a fresh object of the bound names
    pub fn evaluate(&self, scope: &Value, value: Value) -> Result<Value> {
        let bindings = Rc::new(RefCell::new(Object::new(ObjectKind::Ordinary)));
        self.bind(scope, value, &bindings)?;
        Ok(Value::Object(bindings))
    }

    /// Destructure `value` into `target`
    pub(crate) fn bind(
        &self,
        scope: &Value,
        value: Value,
        target: &Rc<RefCell<Object>>,
    ) -> Result<()> {
        match self {
            Pattern::Identifier(id) => {
                target.borrow_mut().set_property(&id.name, value)
            }
            Pattern::Assignment(a) => {
                let value = if value.is_undefined() {
                    a.right.evaluate(scope)?
                } else {
                    value
                };
                a.left.bind(scope, value, target)
            }
            Pattern::Rest(r) => r.argument.bind(scope, value, target),
            Pattern::Array(a) => {
                let items = iterate(&value)
                    .ok_or_else(|| Error::type_error(messages::not_iterable(&value.to_js_string())))?;
                for (i, element) in a.elements.iter().enumerate() {
                    if let Some(element) = element {
                        let item = items.get(i).cloned().unwrap_or(Value::Undefined);
                        element.bind(scope, item, target)?;
                    }
                }
                if let Some(rest) = &a.rest {
                    let remaining = items.get(a.elements.len()..).unwrap_or_default().to_vec();
                    rest.argument.bind(scope, Value::new_array(remaining), target)?;
                }
                Ok(())
            }
            Pattern::Object(o) => {
                if value.is_nullish() {
                    return Err(Error::type_error(messages::cannot_destructure(
                        &value.to_js_string(),
                    )));
                }
                let mut consumed = Vec::with_capacity(o.properties.len());
                for property in &o.properties {
                    let key = match &property.key {
                        PropertyKey::Computed(expr) => to_property_key(&expr.evaluate(scope)?),
                        key => key.static_name().unwrap_or_default(),
                    };
                    let item = value.get_property(&key).unwrap_or(Value::Undefined);
                    property.value.bind(scope, item, target)?;
                    consumed.push(key);
                }
                if let Some(rest) = &o.rest {
                    let mut remainder = Object::new(ObjectKind::Ordinary);
                    copy_own_properties(&mut remainder, &value, &consumed);
                    rest.argument
                        .bind(scope, Value::from_object(remainder), target)?;
                }
                Ok(())
            }
        }
    }
}
