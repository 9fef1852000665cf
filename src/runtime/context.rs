//! Evaluation context

use super::value::Value;
use crate::ast::{Expression, UnaryOperator};
use rustc_hash::FxHashMap;

/// State carried through one evaluation pass
///
/// With caching enabled, the results of member accesses, `this` and unary
/// expressions are memoized per node for the lifetime of the context. The cache
/// is keyed by node identity, not by scope, so a caching context must not be
/// reused across scopes.
#[derive(Debug, Default)]
pub struct EvalContext {
    cache: Option<FxHashMap<usize, Value>>,
    hits: usize,
}

impl EvalContext {
    /// Create a context without caching
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context that memoizes cacheable nodes
    pub fn with_cache() -> Self {
        Self {
            cache: Some(FxHashMap::default()),
            hits: 0,
        }
    }

    /// Check if results are memoized
    pub fn is_caching(&self) -> bool {
        self.cache.is_some()
    }

    /// Number of evaluations answered from the cache
    pub fn cache_hits(&self) -> usize {
        self.hits
    }

    /// Forget memoized results
    pub fn clear(&mut self) {
        if let Some(cache) = &mut self.cache {
            cache.clear();
        }
        self.hits = 0;
    }

    pub(crate) fn lookup(&mut self, expr: &Expression) -> Option<Value> {
        let value = self.cache.as_ref()?.get(&node_key(expr)).cloned()?;
        self.hits += 1;
        tracing::trace!(node = %expr.node_type(), "evaluation cache hit");
        Some(value)
    }

    pub(crate) fn store(&mut self, expr: &Expression, value: &Value) {
        if let Some(cache) = &mut self.cache {
            cache.insert(node_key(expr), value.clone());
        }
    }
}

fn node_key(expr: &Expression) -> usize {
    expr as *const Expression as usize
}

/// Node kinds whose results may be memoized; `delete` always runs
pub(crate) fn is_cacheable(expr: &Expression) -> bool {
    match expr {
        Expression::Member(_) | Expression::This(_) => true,
        Expression::Unary(u) => u.operator != UnaryOperator::Delete,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_cache() {
        let mut ctx = EvalContext::new();
        let expr = Expression::this();
        ctx.store(&expr, &Value::Number(1.0));
        assert!(ctx.lookup(&expr).is_none());
        assert!(!ctx.is_caching());
    }

    #[test]
    fn test_cache_by_node_identity() {
        let mut ctx = EvalContext::with_cache();
        let a = Expression::this();
        let b = Expression::this();
        ctx.store(&a, &Value::Number(1.0));
        assert_eq!(ctx.lookup(&a), Some(Value::Number(1.0)));
        assert!(ctx.lookup(&b).is_none());
        assert_eq!(ctx.cache_hits(), 1);

        ctx.clear();
        assert!(ctx.lookup(&a).is_none());
        assert_eq!(ctx.cache_hits(), 0);
    }

    #[test]
    fn test_delete_is_not_cacheable() {
        let delete = crate::parse("delete o.a").unwrap();
        assert!(!is_cacheable(&delete));
        assert!(is_cacheable(&crate::parse("-o.a").unwrap()));
        assert!(is_cacheable(&crate::parse("o.a").unwrap()));
        assert!(!is_cacheable(&crate::parse("o.a + 1").unwrap()));
    }
}
