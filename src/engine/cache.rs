//! Committed-result cache
//!
//! Bounded memo of resolved queries, so backspacing to a query typed a
//! moment ago commits instantly instead of re-filtering. Sound because the
//! record collection is frozen for the engine's lifetime; the cache lives
//! and dies with its engine and is never shared.

use moka::sync::Cache;
use std::sync::Arc;

pub(crate) struct ResultCache<T> {
    inner: Option<Cache<String, Arc<[T]>>>,
}

impl<T> ResultCache<T>
where
    T: Send + Sync + 'static,
{
    /// A capacity of 0 disables caching entirely
    pub fn new(capacity: u64) -> Self {
        let inner = (capacity > 0).then(|| Cache::new(capacity));
        Self { inner }
    }

    pub fn get(&self, key: &str) -> Option<Arc<[T]>> {
        self.inner.as_ref()?.get(key)
    }

    pub fn insert(&self, key: String, value: Arc<[T]>) {
        if let Some(cache) = &self.inner {
            cache.insert(key, value);
        }
    }

    /// Keys are namespaced by strategy so a substring query can never
    /// collide with an expression of the same text
    pub fn substring_key(needle_lower: &str) -> String {
        format!("s:{needle_lower}")
    }

    pub fn expr_key(expr: &str) -> String {
        format!("f:{expr}")
    }
}
