//! docid -> URL map, persisted once at the end of a build.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UrlMap {
    pub urls: HashMap<u32, String>,
}

impl UrlMap {
    pub fn new() -> Self {
        Self { urls: HashMap::new() }
    }

    pub fn insert(&mut self, docid: u32, url: String) {
        self.urls.insert(docid, url);
    }

    pub fn get(&self, docid: u32) -> Option<&String> {
        self.urls.get(&docid)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn load(path: &Path) -> Result<Option<UrlMap>> {
        if !path.exists() {
            return Ok(None);
        }
        let mut file = File::open(path)?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        if buf.is_empty() {
            return Ok(Some(UrlMap::new()));
        }
        Ok(Some(bincode::deserialize(&buf)?))
    }

    pub fn store(&self, path: &Path) -> Result<()> {
        let data = bincode::serialize(self)?;
        let mut file = File::create(path)?;
        file.write_all(&data)?;
        file.sync_all()?;
        Ok(())
    }
}
