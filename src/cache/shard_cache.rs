//! Shard cache — LRU cache of loaded [`Shard`]s keyed by range
//! partition.
//!
//! There are only five range keys, so in practice this cache just
//! avoids re-reading and re-deserializing a shard file on every query
//! term that happens to land in the same partition.

use crate::model::{RangeKey, Shard};
use crate::Result;
use lru::LruCache;
use parking_lot::RwLock;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;

/// Cache hit/miss counters, exposed for diagnostics.
#[derive(Debug, Default, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

pub struct ShardCache {
    index_dir: std::path::PathBuf,
    cache: RwLock<LruCache<RangeKey, Arc<Shard>>>,
    stats: RwLock<CacheStats>,
}

impl ShardCache {
    pub fn new(index_dir: impl AsRef<Path>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            index_dir: index_dir.as_ref().to_path_buf(),
            cache: RwLock::new(LruCache::new(capacity)),
            stats: RwLock::new(CacheStats::default()),
        }
    }

    /// Fetch a shard, loading it from disk on a cache miss. Returns an
    /// empty shard if the partition has no file yet.
    pub fn get(&self, range_key: RangeKey) -> Result<Arc<Shard>> {
        if let Some(shard) = self.cache.write().get(&range_key) {
            self.stats.write().hits += 1;
            return Ok(Arc::clone(shard));
        }

        self.stats.write().misses += 1;
        let path = Shard::path_for(&self.index_dir, range_key);
        let shard = Arc::new(Shard::load(&path)?.unwrap_or_default());
        self.cache.write().put(range_key, Arc::clone(&shard));
        Ok(shard)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caches_repeated_loads() {
        let dir = tempfile::tempdir().unwrap();
        let mut shard = Shard::new();
        shard.add_posting("alpha", 1, 1);
        shard.store(&Shard::path_for(dir.path(), RangeKey::AF)).unwrap();

        let cache = ShardCache::new(dir.path(), 5);
        cache.get(RangeKey::AF).unwrap();
        cache.get(RangeKey::AF).unwrap();

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn missing_shard_file_yields_empty_shard() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ShardCache::new(dir.path(), 5);
        let shard = cache.get(RangeKey::SZ).unwrap();
        assert!(shard.is_empty());
    }
}
