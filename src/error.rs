//! Error types for the webdex indexer and search engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexError>;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Corrupted shard file: {0}")]
    CorruptedShard(std::path::PathBuf),

    #[error("Index not created: missing shard or URL map at {0}")]
    IndexNotCreated(std::path::PathBuf),

    #[error("Invariant violation: docid {0} present in postings but absent from URL map")]
    DanglingDocId(u32),

    #[error("Offload worker failed: {0}")]
    Offload(String),

    #[error("Invalid document record: {0}")]
    InvalidDocument(String),
}

impl From<bincode::Error> for IndexError {
    fn from(err: bincode::Error) -> Self {
        IndexError::Serialization(err.to_string())
    }
}
