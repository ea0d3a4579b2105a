//! Input corpus document record.

use serde::Deserialize;

/// A single crawled document as stored in the corpus directory. Other
/// fields present in the JSON file are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentRecord {
    pub url: String,
    #[serde(default)]
    pub content: String,
}
