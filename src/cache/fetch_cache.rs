use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::http::Document;

/// In-memory cache of fetched documents for a single scrape run.
///
/// Clones share the same entries; a fresh cache means a fresh run.
#[derive(Clone, Default)]
pub struct FetchCache {
    entries: Arc<Mutex<HashMap<String, Document>>>,
}

impl FetchCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Document> {
        let hit = self.lock().get(key).cloned();
        if hit.is_some() {
            debug!("Fetch cache hit: {}", key);
        }
        hit
    }

    pub fn set(&self, key: impl Into<String>, document: Document) {
        self.lock().insert(key.into(), document);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Document>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
