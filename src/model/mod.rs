//! Shared data model: document records, the shard posting format, and
//! the docid -> URL map. Both the indexer and the search engine depend
//! only on this module for the on-disk contract between them.

pub mod document;
pub mod shard;
pub mod urlmap;

pub use document::DocumentRecord;
pub use shard::{Posting, PostingList, RangeKey, Shard, ALL_RANGE_KEYS};
pub use urlmap::UrlMap;
