//! On-disk shard format: token -> ordered posting list, partitioned by
//! the first character of the token into one of five disjoint ranges.

use crate::storage::checksum::{Checksum, ChecksumType};
use crate::{IndexError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// One of the five disjoint vocabulary partitions a token's first
/// character is routed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeKey {
    AF,
    GL,
    MR,
    SZ,
    Digit,
}

pub const ALL_RANGE_KEYS: [RangeKey; 5] = [
    RangeKey::AF,
    RangeKey::GL,
    RangeKey::MR,
    RangeKey::SZ,
    RangeKey::Digit,
];

impl RangeKey {
    /// Pure function of a token's first character. Everything outside
    /// `a..=z` (digits, non-ASCII, punctuation-leading tokens) lands in
    /// the catch-all `0-9` partition.
    pub fn of(first_char: char) -> RangeKey {
        match first_char {
            'a'..='f' => RangeKey::AF,
            'g'..='l' => RangeKey::GL,
            'm'..='r' => RangeKey::MR,
            's'..='z' => RangeKey::SZ,
            _ => RangeKey::Digit,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RangeKey::AF => "a-f",
            RangeKey::GL => "g-l",
            RangeKey::MR => "m-r",
            RangeKey::SZ => "s-z",
            RangeKey::Digit => "0-9",
        }
    }

    pub fn file_name(&self) -> String {
        format!("index_range_{}.bin", self.as_str())
    }
}

/// A single occurrence record: how many (weighted) times a token showed
/// up in one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub docid: u32,
    pub weighted_count: u32,
}

/// Ordered sequence of postings for one token. Ordering corresponds to
/// insertion order, which is docid-ascending as a consequence of
/// sequential docid assignment. Merges extend rather than deduplicate,
/// so a (docid, token) pair may appear more than once if it was split
/// across offload batches upstream of us.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingList(pub Vec<Posting>);

impl PostingList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, docid: u32, weighted_count: u32) {
        self.0.push(Posting { docid, weighted_count });
    }

    /// Extend with another posting list's entries, preserving order and
    /// performing no deduplication.
    pub fn extend_from(&mut self, other: &PostingList) {
        self.0.extend_from_slice(&other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Posting> {
        self.0.iter()
    }

    pub fn docids(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().map(|p| p.docid)
    }
}

/// In-memory or on-disk mapping from token to posting list, restricted
/// to one [`RangeKey`] partition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Shard {
    pub postings: HashMap<String, PostingList>,
}

impl Shard {
    pub fn new() -> Self {
        Self { postings: HashMap::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Append a posting for `token`, creating its posting list if absent.
    pub fn add_posting(&mut self, token: &str, docid: u32, weighted_count: u32) {
        self.postings
            .entry(token.to_string())
            .or_insert_with(PostingList::new)
            .push(docid, weighted_count);
    }

    /// Merge `other` into `self`, extending (not replacing) any
    /// overlapping posting lists. Order is preserved; duplicates across
    /// the merge boundary are not collapsed, matching the on-disk merge
    /// protocol the offloader performs.
    pub fn merge_from(&mut self, other: &Shard) {
        for (token, postings) in &other.postings {
            self.postings
                .entry(token.clone())
                .or_insert_with(PostingList::new)
                .extend_from(postings);
        }
    }

    pub fn path_for(index_dir: &Path, range_key: RangeKey) -> PathBuf {
        index_dir.join(range_key.file_name())
    }

    /// Read a shard from disk if present, otherwise `None`.
    pub fn load(path: &Path) -> Result<Option<Shard>> {
        if !path.exists() {
            return Ok(None);
        }
        let mut file = File::open(path)?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        if buf.is_empty() {
            return Ok(Some(Shard::new()));
        }
        let data = Checksum::decode_with_checksum(ChecksumType::CRC32C, &buf)
            .map_err(|_| IndexError::CorruptedShard(path.to_path_buf()))?;
        let shard: Shard = bincode::deserialize(&data)?;
        Ok(Some(shard))
    }

    /// Serialize and write this shard to `path`, overwriting any prior
    /// contents.
    pub fn store(&self, path: &Path) -> Result<()> {
        let data = bincode::serialize(self)?;
        let encoded = Checksum::encode_with_checksum(ChecksumType::CRC32C, &data);
        let mut file = File::create(path)?;
        file.write_all(&encoded)?;
        file.sync_all()?;
        Ok(())
    }

    /// Look up a single token's posting list, loading the whole shard
    /// into memory to do so (callers that repeatedly query the same
    /// shard should cache the loaded [`Shard`] themselves).
    pub fn load_postings(path: &Path, token: &str) -> Result<PostingList> {
        match Self::load(path)? {
            Some(shard) => Ok(shard.postings.get(token).cloned().unwrap_or_default()),
            None => Ok(PostingList::new()),
        }
    }
}
