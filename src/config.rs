//! Tunable constants for the indexer and search engine
//!
//! All knobs that affect build-time memory/parallelism tradeoffs or
//! near-duplicate sensitivity live here so they can be overridden without
//! touching the algorithms themselves.

use serde::{Deserialize, Serialize};

/// Indexer configuration: a 5-worker offload pool, a 1M-posting flush
/// trigger, and a 0.7 Jaccard near-duplicate threshold by default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Parallelism of per-shard disk merges during offload
    pub max_offload_workers: usize,

    /// Postings-count trigger threshold for offload
    pub max_postings: u64,

    /// Multiplier applied to token occurrences inside an important tag
    pub important_mult: u32,

    /// Jaccard similarity threshold above which documents are near-duplicates
    pub similarity_threshold: f64,

    /// Number of MinHash permutations
    pub num_perm: usize,

    /// Shingle size (in whitespace-split words) used for near-duplicate detection
    pub shingle_n: usize,

    /// Number of LSH bands. `lsh_bands * lsh_rows` must equal `num_perm`.
    pub lsh_bands: usize,

    /// Rows per LSH band.
    pub lsh_rows: usize,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            max_offload_workers: 5,
            max_postings: 1_000_000,
            important_mult: 3,
            similarity_threshold: 0.7,
            num_perm: 128,
            shingle_n: 3,
            lsh_bands: 32,
            lsh_rows: 4,
        }
    }
}

/// Search-side configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Default number of results returned by `search`
    pub default_limit: usize,

    /// Number of posting-list shards kept resident in the LRU cache
    pub shard_cache_size: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            shard_cache_size: 5,
        }
    }
}
