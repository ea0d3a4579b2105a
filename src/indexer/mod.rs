//! Indexer: walks a corpus directory of JSON document records, builds
//! the on-disk posting-list shards and the docid -> URL map.
//!
//! One producer (this thread) parses documents and accumulates
//! postings in memory; one offloader thread drains accumulated batches
//! to disk once the in-memory posting count crosses
//! [`IndexerConfig::max_postings`], so memory use stays bounded on
//! large corpora.

mod offloader;

use crate::config::IndexerConfig;
use crate::dedup::NearDuplicateIndex;
use crate::model::{DocumentRecord, RangeKey, Shard, UrlMap, ALL_RANGE_KEYS};
use crate::tokenize::html::parse as parse_html;
use crate::tokenize::TokenPipeline;
use crate::{IndexError, Result};
use log::{info, warn};
use offloader::{OffloadHandle, ShardBatch};
use parking_lot::Mutex;
use rayon::ThreadPoolBuilder;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Summary counters for one completed build.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildStats {
    pub documents_seen: u32,
    pub documents_indexed: u32,
    pub duplicates_skipped: u32,
    pub failures: u32,
}

pub struct Indexer {
    config: IndexerConfig,
}

impl Indexer {
    pub fn new(config: IndexerConfig) -> Self {
        Self { config }
    }

    /// Build (or rebuild, from scratch) the index at `index_dir` /
    /// `url_map_path` from the JSON document records under
    /// `corpus_dir`. Any index previously at those paths is deleted
    /// first — a partial rebuild left mixed with a stale one would
    /// corrupt posting lists silently.
    pub fn build(&self, corpus_dir: &Path, index_dir: &Path, url_map_path: &Path) -> Result<BuildStats> {
        clean_index(index_dir, url_map_path)?;
        std::fs::create_dir_all(index_dir)?;

        let dedup = NearDuplicateIndex::new(&self.config);
        let tokenizer = TokenPipeline::new();
        let next_docid = AtomicU32::new(1);
        let url_map = Mutex::new(UrlMap::new());
        let current = Mutex::new(ShardBatch::new());
        let posting_count = Mutex::new(0u64);

        let offload = Arc::new(OffloadHandle::new());
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.config.max_offload_workers)
            .build()
            .map_err(|e| IndexError::Offload(e.to_string()))?;

        let offload_state = Arc::clone(&offload.state);
        let offload_dir = index_dir.to_path_buf();
        let offloader_thread = std::thread::spawn(move || offloader::run(offload_state, offload_dir, pool));

        let mut stats = BuildStats::default();

        for entry in walkdir::WalkDir::new(corpus_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            stats.documents_seen += 1;
            // Assigned unconditionally: a skipped, failed, or duplicate
            // document still consumes a docid, so docids stay a dense
            // sequence over *attempted* documents, not indexed ones.
            let docid = next_docid.fetch_add(1, Ordering::SeqCst);

            let record = match read_document(entry.path()) {
                Ok(record) => record,
                Err(err) => {
                    warn!("skipping {}: {err}", entry.path().display());
                    stats.failures += 1;
                    continue;
                }
            };
            if record.content.is_empty() {
                stats.failures += 1;
                continue;
            }

            let parsed = parse_html(&record.content);
            if dedup.check_and_insert(docid, &parsed.full_text) {
                stats.duplicates_skipped += 1;
                continue;
            }

            url_map.lock().insert(docid, record.url);

            let mut doc_counts: HashMap<String, u32> = HashMap::new();
            for tag in &parsed.tags {
                for token in tokenizer.tokenize_tag(&tag.text, tag.is_important, self.config.important_mult) {
                    *doc_counts.entry(token).or_insert(0) += 1;
                }
            }
            stats.documents_indexed += 1;

            if doc_counts.is_empty() {
                continue;
            }

            let added = doc_counts.len() as u64;
            {
                let mut current = current.lock();
                for (token, weighted_count) in doc_counts {
                    let range_key = RangeKey::of(token.chars().next().unwrap_or('0'));
                    current.entry(range_key).or_default().add_posting(&token, docid, weighted_count);
                }
            }

            let mut count = posting_count.lock();
            *count += added;
            if *count >= self.config.max_postings {
                *count = 0;
                drop(count);
                let batch = std::mem::take(&mut *current.lock());
                offload.submit(batch);
            }
        }

        let remainder = std::mem::take(&mut *current.lock());
        if !remainder.is_empty() {
            offload.submit(remainder);
        }
        offload.finish();
        offloader_thread
            .join()
            .map_err(|_| IndexError::Offload("offloader thread panicked".into()))??;

        url_map.into_inner().store(url_map_path)?;
        info!(
            "build complete: {} seen, {} indexed, {} duplicates, {} failures",
            stats.documents_seen, stats.documents_indexed, stats.duplicates_skipped, stats.failures
        );
        Ok(stats)
    }
}

fn read_document(path: &Path) -> Result<DocumentRecord> {
    let bytes = std::fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| IndexError::InvalidDocument(e.to_string()))
}

fn clean_index(index_dir: &Path, url_map_path: &Path) -> Result<()> {
    for range_key in ALL_RANGE_KEYS {
        let path = Shard::path_for(index_dir, range_key);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
    }
    if url_map_path.exists() {
        std::fs::remove_file(url_map_path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Shard as ShardModel;

    fn write_doc(dir: &Path, name: &str, url: &str, content: &str) {
        let body = serde_json::json!({ "url": url, "content": content });
        std::fs::write(dir.join(name), body.to_string()).unwrap();
    }

    #[test]
    fn builds_shards_and_url_map_from_corpus() {
        let corpus = tempfile::tempdir().unwrap();
        let index_dir = tempfile::tempdir().unwrap();
        let url_map_path = index_dir.path().join("urls.bin");

        write_doc(
            corpus.path(),
            "a.json",
            "http://example.com/a",
            "<html><body><h1>Rust</h1><p>systems programming</p></body></html>",
        );
        write_doc(
            corpus.path(),
            "b.json",
            "http://example.com/b",
            "<html><body><p>ocean biology plankton</p></body></html>",
        );

        let indexer = Indexer::new(IndexerConfig::default());
        let stats = indexer.build(corpus.path(), index_dir.path(), &url_map_path).unwrap();

        assert_eq!(stats.documents_seen, 2);
        assert_eq!(stats.documents_indexed, 2);
        assert_eq!(stats.duplicates_skipped, 0);

        let url_map = UrlMap::load(&url_map_path).unwrap().unwrap();
        assert_eq!(url_map.len(), 2);

        let rf_path = ShardModel::path_for(index_dir.path(), RangeKey::MR);
        let shard = ShardModel::load(&rf_path).unwrap();
        assert!(shard.is_some());
    }

    #[test]
    fn skips_near_duplicate_documents() {
        let corpus = tempfile::tempdir().unwrap();
        let index_dir = tempfile::tempdir().unwrap();
        let url_map_path = index_dir.path().join("urls.bin");

        let content = "<html><body><p>the quick brown fox jumps over the lazy dog repeatedly</p></body></html>";
        write_doc(corpus.path(), "a.json", "http://example.com/a", content);
        write_doc(corpus.path(), "b.json", "http://example.com/b", content);

        let indexer = Indexer::new(IndexerConfig::default());
        let stats = indexer.build(corpus.path(), index_dir.path(), &url_map_path).unwrap();

        assert_eq!(stats.documents_seen, 2);
        assert_eq!(stats.duplicates_skipped, 1);
    }
}
