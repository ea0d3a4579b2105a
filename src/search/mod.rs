//! Search engine: conjunctive (AND) multi-term queries ranked by
//! TF-IDF cosine similarity against the on-disk index.

use crate::cache::ShardCache;
use crate::config::SearchConfig;
use crate::model::{RangeKey, Shard, UrlMap, ALL_RANGE_KEYS};
use crate::tokenize::TokenPipeline;
use crate::{IndexError, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// One ranked hit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub url: String,
    pub score: f64,
}

/// Whether the engine found a usable index at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    Ready,
    IndexNotCreated,
}

pub struct SearchEngine {
    config: SearchConfig,
    tokenizer: TokenPipeline,
    shards: ShardCache,
    url_map: UrlMap,
    url_map_path: PathBuf,
    status: EngineStatus,
}

impl SearchEngine {
    /// Load the URL map and prepare the shard cache. The index is
    /// considered absent (and every [`search`](Self::search) call fails)
    /// unless the URL map is present and non-empty *and* all five shard
    /// files exist on disk.
    pub fn new(index_dir: impl AsRef<Path>, url_map_path: impl AsRef<Path>, config: SearchConfig) -> Result<Self> {
        let index_dir: PathBuf = index_dir.as_ref().to_path_buf();
        let url_map_path = url_map_path.as_ref();

        let shards_present = ALL_RANGE_KEYS.iter().all(|&range_key| Shard::path_for(&index_dir, range_key).exists());

        let (url_map, status) = match UrlMap::load(url_map_path)? {
            Some(map) if !map.is_empty() && shards_present => (map, EngineStatus::Ready),
            _ => (UrlMap::new(), EngineStatus::IndexNotCreated),
        };

        Ok(Self {
            shards: ShardCache::new(&index_dir, config.shard_cache_size),
            tokenizer: TokenPipeline::new(),
            config,
            url_map,
            url_map_path: url_map_path.to_path_buf(),
            status,
        })
    }

    pub fn status(&self) -> EngineStatus {
        self.status
    }

    /// Run a query, returning up to `limit` results ranked by
    /// descending score (`None` uses [`SearchConfig::default_limit`]).
    pub fn search(&self, query: &str, limit: Option<usize>) -> Result<Vec<SearchResult>> {
        if self.status != EngineStatus::Ready {
            return Err(IndexError::IndexNotCreated(self.url_map_path.clone()));
        }

        let terms = self.tokenizer.tokenize_query(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut query_tf: HashMap<String, u32> = HashMap::new();
        for term in &terms {
            *query_tf.entry(term.clone()).or_insert(0) += 1;
        }

        let num_docs = self.url_map.len() as f64;

        // doc_tf[term] maps docid -> summed weighted occurrence count,
        // collapsing any duplicate (docid, term) postings left behind
        // by the offload merge protocol.
        let mut doc_tf: HashMap<&str, HashMap<u32, u32>> = HashMap::new();
        let mut idf: HashMap<&str, f64> = HashMap::new();

        for term in query_tf.keys() {
            let range_key = RangeKey::of(term.chars().next().unwrap_or('0'));
            let shard = self.shards.get(range_key)?;
            let mut counts: HashMap<u32, u32> = HashMap::new();
            if let Some(postings) = shard.postings.get(term) {
                for posting in postings.iter() {
                    *counts.entry(posting.docid).or_insert(0) += posting.weighted_count;
                }
            }
            let df = counts.len() as f64;
            idf.insert(term.as_str(), if df > 0.0 { num_docs / df } else { 0.0 });
            doc_tf.insert(term.as_str(), counts);
        }

        // Conjunctive AND: a document must carry every query term.
        let mut candidates: Option<HashSet<u32>> = None;
        for counts in doc_tf.values() {
            let docids: HashSet<u32> = counts.keys().copied().collect();
            candidates = Some(match candidates {
                None => docids,
                Some(existing) => existing.intersection(&docids).copied().collect(),
            });
        }
        let candidates = candidates.unwrap_or_default();
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let query_vec: HashMap<&str, f64> = query_tf
            .iter()
            .map(|(term, &tf)| (term.as_str(), tf_weight(tf) * idf.get(term.as_str()).copied().unwrap_or(0.0)))
            .collect();
        let query_norm = vector_norm(query_vec.values().copied());

        let mut scored: Vec<SearchResult> = Vec::with_capacity(candidates.len());
        for docid in candidates {
            let doc_vec: Vec<f64> = query_tf
                .keys()
                .map(|term| {
                    let tf = doc_tf[term.as_str()].get(&docid).copied().unwrap_or(0);
                    tf_weight(tf) * idf.get(term.as_str()).copied().unwrap_or(0.0)
                })
                .collect();
            let doc_norm = vector_norm(doc_vec.iter().copied());

            let dot: f64 = query_tf
                .keys()
                .zip(doc_vec.iter())
                .map(|(term, &d)| query_vec[term.as_str()] * d)
                .sum();

            let score = if query_norm > 0.0 && doc_norm > 0.0 { dot / (query_norm * doc_norm) } else { 0.0 };

            let url = self.url_map.get(docid).ok_or(IndexError::DanglingDocId(docid))?;
            scored.push(SearchResult { url: url.clone(), score });
        }

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        let limit = limit.unwrap_or(self.config.default_limit);
        scored.truncate(limit);
        Ok(scored)
    }
}

/// `1 + log10(x)` for `x > 0`, else `0`. Paired with the ratio-form
/// `N / df` IDF below rather than a logarithmic IDF — ranking depends
/// on this exact pairing, not just "some TF-IDF variant".
fn tf_weight(x: u32) -> f64 {
    if x > 0 {
        1.0 + (x as f64).log10()
    } else {
        0.0
    }
}

fn vector_norm(values: impl Iterator<Item = f64>) -> f64 {
    values.map(|v| v * v).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexerConfig;
    use crate::indexer::Indexer;

    fn write_doc(dir: &Path, name: &str, url: &str, content: &str) {
        let body = serde_json::json!({ "url": url, "content": content });
        std::fs::write(dir.join(name), body.to_string()).unwrap();
    }

    #[test]
    fn status_is_index_not_created_without_a_build() {
        let dir = tempfile::tempdir().unwrap();
        let engine = SearchEngine::new(dir.path(), dir.path().join("urls.bin"), SearchConfig::default()).unwrap();
        assert_eq!(engine.status(), EngineStatus::IndexNotCreated);
        assert!(engine.search("anything", None).is_err());
    }

    #[test]
    fn conjunctive_query_requires_all_terms() {
        let corpus = tempfile::tempdir().unwrap();
        let index_dir = tempfile::tempdir().unwrap();
        let url_map_path = index_dir.path().join("urls.bin");

        write_doc(
            corpus.path(),
            "a.json",
            "http://example.com/a",
            "<html><body><p>rust systems programming</p></body></html>",
        );
        write_doc(
            corpus.path(),
            "b.json",
            "http://example.com/b",
            "<html><body><p>rust web framework</p></body></html>",
        );

        Indexer::new(IndexerConfig::default())
            .build(corpus.path(), index_dir.path(), &url_map_path)
            .unwrap();

        let engine = SearchEngine::new(index_dir.path(), &url_map_path, SearchConfig::default()).unwrap();
        assert_eq!(engine.status(), EngineStatus::Ready);

        let both = engine.search("rust systems", None).unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].url, "http://example.com/a");

        let either = engine.search("rust", None).unwrap();
        assert_eq!(either.len(), 2);
    }

    #[test]
    fn dangling_docid_is_a_hard_error() {
        let corpus = tempfile::tempdir().unwrap();
        let index_dir = tempfile::tempdir().unwrap();
        let url_map_path = index_dir.path().join("urls.bin");

        write_doc(
            corpus.path(),
            "a.json",
            "http://example.com/a",
            "<html><body><p>rust systems programming</p></body></html>",
        );

        Indexer::new(IndexerConfig::default())
            .build(corpus.path(), index_dir.path(), &url_map_path)
            .unwrap();

        // Simulate corruption: a docid present in the shard postings but
        // dropped from the URL map.
        let mut url_map = UrlMap::load(&url_map_path).unwrap().unwrap();
        url_map.urls.clear();
        url_map.insert(9999, "http://example.com/placeholder".to_string());
        url_map.store(&url_map_path).unwrap();

        let engine = SearchEngine::new(index_dir.path(), &url_map_path, SearchConfig::default()).unwrap();
        let err = engine.search("rust", None).unwrap_err();
        assert!(matches!(err, IndexError::DanglingDocId(1)));
    }
}
