//! Near-duplicate detection via MinHash + LSH banding.
//!
//! No MinHash/LSH crate sits in the pack's dependency stack, so both
//! are implemented here directly from the primitives the rest of the
//! crate already depends on (`ahash` for seeded hashing, `parking_lot`
//! for the shared bucket map).

use crate::config::IndexerConfig;
use ahash::{AHasher, RandomState};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::hash::{BuildHasher, Hash, Hasher};

pub type Signature = Vec<u64>;

/// Computes MinHash signatures over word shingles using `num_perm`
/// independently seeded universal hash functions.
pub struct MinHasher {
    seeds: Vec<RandomState>,
    shingle_n: usize,
}

impl MinHasher {
    pub fn new(config: &IndexerConfig) -> Self {
        let seeds = (0..config.num_perm)
            .map(|i| {
                let base = 0x9E37_79B9_7F4A_7C15u64.wrapping_mul(i as u64 + 1);
                RandomState::with_seeds(base, base ^ 0xA5A5_A5A5_A5A5_A5A5, i as u64, !(i as u64))
            })
            .collect();
        Self { seeds, shingle_n: config.shingle_n }
    }

    /// MinHash signature of `text`: shingle the whitespace-split words
    /// into overlapping `shingle_n`-grams, join each back into a
    /// string, and hash those. Documents shorter than one shingle hash
    /// to a constant signature, so two such documents are always
    /// flagged as near-duplicates of each other — there isn't enough
    /// content to distinguish them.
    pub fn signature(&self, text: &str) -> Signature {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.len() < self.shingle_n {
            return vec![u64::MAX; self.seeds.len()];
        }
        let shingles: Vec<String> = words.windows(self.shingle_n).map(|w| w.join(" ")).collect();

        self.seeds
            .iter()
            .map(|seed| shingles.iter().map(|s| seed.hash_one(s)).min().unwrap_or(u64::MAX))
            .collect()
    }
}

/// LSH-banded index of previously seen documents. Candidate pairs are
/// found via banding, then confirmed with an exact signature-match
/// Jaccard estimate against `similarity_threshold`.
pub struct NearDuplicateIndex {
    minhasher: MinHasher,
    bands: usize,
    rows: usize,
    threshold: f64,
    buckets: Mutex<HashMap<(usize, u64), Vec<u32>>>,
    signatures: Mutex<HashMap<u32, Signature>>,
}

impl NearDuplicateIndex {
    pub fn new(config: &IndexerConfig) -> Self {
        assert_eq!(
            config.lsh_bands * config.lsh_rows,
            config.num_perm,
            "lsh_bands * lsh_rows must equal num_perm"
        );
        Self {
            minhasher: MinHasher::new(config),
            bands: config.lsh_bands,
            rows: config.lsh_rows,
            threshold: config.similarity_threshold,
            buckets: Mutex::new(HashMap::new()),
            signatures: Mutex::new(HashMap::new()),
        }
    }

    /// If `text` is a near-duplicate of a previously inserted document,
    /// return `true` and leave the index untouched. Otherwise insert it
    /// under `docid` and return `false`.
    pub fn check_and_insert(&self, docid: u32, text: &str) -> bool {
        let sig = self.minhasher.signature(text);

        let mut buckets = self.buckets.lock();
        let mut signatures = self.signatures.lock();

        let mut candidates = HashSet::new();
        for band in 0..self.bands {
            let key = self.band_key(band, &sig);
            if let Some(members) = buckets.get(&(band, key)) {
                candidates.extend(members.iter().copied());
            }
        }

        for candidate in candidates {
            if let Some(other_sig) = signatures.get(&candidate) {
                if estimated_jaccard(&sig, other_sig) >= self.threshold {
                    return true;
                }
            }
        }

        for band in 0..self.bands {
            let key = self.band_key(band, &sig);
            buckets.entry((band, key)).or_default().push(docid);
        }
        signatures.insert(docid, sig);
        false
    }

    fn band_key(&self, band: usize, sig: &Signature) -> u64 {
        let start = band * self.rows;
        let mut hasher = AHasher::default();
        sig[start..start + self.rows].hash(&mut hasher);
        hasher.finish()
    }
}

fn estimated_jaccard(a: &Signature, b: &Signature) -> f64 {
    let matches = a.iter().zip(b.iter()).filter(|(x, y)| x == y).count();
    matches as f64 / a.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> IndexerConfig {
        IndexerConfig::default()
    }

    #[test]
    fn identical_text_is_flagged_duplicate() {
        let index = NearDuplicateIndex::new(&config());
        let text = "the quick brown fox jumps over the lazy dog ".repeat(5);
        assert!(!index.check_and_insert(1, &text));
        assert!(index.check_and_insert(2, &text));
    }

    #[test]
    fn distinct_text_is_not_flagged() {
        let index = NearDuplicateIndex::new(&config());
        assert!(!index.check_and_insert(1, "rust systems programming language memory safety concurrency"));
        assert!(!index.check_and_insert(
            2,
            "deep sea marine biology coral reefs ocean ecosystem plankton"
        ));
    }

    #[test]
    fn mostly_overlapping_text_is_flagged() {
        let index = NearDuplicateIndex::new(&config());
        let base = "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu nu xi omicron pi "
            .repeat(4);
        let mut near = base.clone();
        near.push_str("trailing unique suffix words here");
        assert!(!index.check_and_insert(1, &base));
        assert!(index.check_and_insert(2, &near));
    }
}
