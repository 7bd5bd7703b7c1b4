use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Lookup of the categories a page belongs to.
///
/// Names are category titles without the namespace, in db key form. They are
/// returned in whatever order the store keeps them.
pub trait CategoryStore {
    fn category_links(&self, page_id: u64) -> Result<Vec<String>>;
}

/// Categories held in memory, keyed by page id.
///
/// Serialized as a JSON object: `{"42": ["Living_people", "1939_births"]}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct InMemoryCategoryStore {
    pages: HashMap<u64, Vec<String>>,
}

impl InMemoryCategoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let buf = fs::read(path)?;
        Ok(serde_json::from_slice(&buf)?)
    }

    pub fn insert(&mut self, page_id: u64, category: &str) {
        self.pages
            .entry(page_id)
            .or_default()
            .push(category.replace(' ', "_"));
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

impl CategoryStore for InMemoryCategoryStore {
    fn category_links(&self, page_id: u64) -> Result<Vec<String>> {
        Ok(self.pages.get(&page_id).cloned().unwrap_or_default())
    }
}
