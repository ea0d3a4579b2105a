//! webdex — an inverted-index builder and TF-IDF search engine for a
//! corpus of crawled HTML documents.
//!
//! ## Architecture
//! - indexing: [`indexer::Indexer`] walks a corpus directory, tokenizes
//!   each document's HTML (`tokenize`), folds postings into in-memory
//!   shards guarded by a producer/offloader handoff, and deduplicates
//!   near-identical documents (`dedup`) before they're indexed.
//! - storage: the on-disk contract between indexing and search is the
//!   checksummed shard format in `model::shard` plus the docid -> URL
//!   map in `model::urlmap`.
//! - querying: [`search::SearchEngine`] loads shards lazily through a
//!   small LRU cache (`cache`) and scores conjunctive matches by TF-IDF
//!   cosine similarity.

pub mod cache;
pub mod config;
pub mod dedup;
pub mod indexer;
pub mod model;
pub mod search;
pub mod storage;
pub mod tokenize;

mod error;

pub use config::{IndexerConfig, SearchConfig};
pub use error::{IndexError, Result};
pub use indexer::{BuildStats, Indexer};
pub use search::{EngineStatus, SearchEngine, SearchResult};
