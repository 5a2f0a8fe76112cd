use std::sync::Arc;

use dashmap::DashMap;

use crate::compiler::CompiledFunctions;

/// Storage for materialized templates, keyed by delimiters and source.
///
/// Lookups and inserts are independent: two concurrent misses for the same
/// key both compile and the later insert wins.
pub trait TemplateCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Arc<CompiledFunctions>>;
    fn insert(&self, key: String, functions: Arc<CompiledFunctions>);
    fn clear(&self);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, Arc<CompiledFunctions>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TemplateCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Arc<CompiledFunctions>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    fn insert(&self, key: String, functions: Arc<CompiledFunctions>) {
        self.entries.insert(key, functions);
    }

    fn clear(&self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedure::Procedure;

    fn functions() -> Arc<CompiledFunctions> {
        Arc::new(CompiledFunctions {
            render: Procedure::Noop,
            static_render_fns: Vec::new(),
        })
    }

    #[test]
    fn test_insert_get_clear() {
        let cache = MemoryCache::new();
        assert!(cache.is_empty());

        let stored = functions();
        cache.insert("<div/>".to_string(), Arc::clone(&stored));
        let found = cache.get("<div/>").unwrap();
        assert!(Arc::ptr_eq(&found, &stored));
        assert!(cache.get("<span/>").is_none());
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
