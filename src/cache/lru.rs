use crate::core::error::Result;
use crate::graph::EntityGraph;
use crate::walker::{walk, ReferenceTree};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::debug;

/// Identifies one traversal: which response, which root, how deep
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// xxh3 of the response bytes the graph was built from
    pub fingerprint: u64,
    pub root_id: String,
    pub max_level: usize,
}

impl CacheKey {
    pub fn new(source: &[u8], root_id: impl Into<String>, max_level: usize) -> Self {
        Self {
            fingerprint: fingerprint(source),
            root_id: root_id.into(),
            max_level,
        }
    }
}

pub fn fingerprint(source: &[u8]) -> u64 {
    xxhash_rust::xxh3::xxh3_64(source)
}

/// LRU cache of walked trees, so re-rendering the same root skips the walk
pub struct TreeCache {
    cache: Mutex<LruCache<CacheKey, Arc<ReferenceTree>>>,
}

impl TreeCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<ReferenceTree>> {
        self.cache.lock().get(key).cloned()
    }

    /// Return the cached tree for `key`, walking `graph` on a miss
    pub fn get_or_walk(&self, key: CacheKey, graph: &EntityGraph) -> Result<Arc<ReferenceTree>> {
        if let Some(tree) = self.get(&key) {
            debug!(root = %key.root_id, max_level = key.max_level, "Tree cache hit");
            return Ok(tree);
        }

        // Walk without holding the lock
        let tree = Arc::new(walk(graph, &key.root_id, key.max_level)?);
        self.cache.lock().put(key, Arc::clone(&tree));
        Ok(tree)
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    /// Invalidate every cached tree rooted at `root_id`
    pub fn invalidate_root(&self, root_id: &str) {
        let mut cache = self.cache.lock();
        // Collect keys to remove (can't modify while iterating)
        let keys_to_remove: Vec<CacheKey> = cache
            .iter()
            .filter(|(k, _)| k.root_id == root_id)
            .map(|(k, _)| k.clone())
            .collect();

        for key in keys_to_remove {
            cache.pop(&key);
        }
    }
}

impl Default for TreeCache {
    fn default() -> Self {
        Self::new(64)
    }
}
