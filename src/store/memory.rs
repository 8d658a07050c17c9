//! In-memory [`Store`] implementation for tests and `--dry-run`.
//!
//! Collections are plain vectors behind a `parking_lot::RwLock`. The page
//! limit is configurable so pagination behavior is testable with small
//! synthetic corpora.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::StoreError;

use super::{DocPage, Filter, MediaRef, Store, StoredDoc};

const DEFAULT_PAGE_LIMIT: usize = 100;

pub struct MemoryStore {
    collections: RwLock<FxHashMap<String, Vec<StoredDoc>>>,
    media: RwLock<Vec<MediaRef>>,
    page_limit: usize,
    next_id: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_page_limit(DEFAULT_PAGE_LIMIT)
    }

    pub fn with_page_limit(page_limit: usize) -> Self {
        Self {
            collections: RwLock::new(FxHashMap::default()),
            media: RwLock::new(Vec::new()),
            page_limit,
            next_id: AtomicUsize::new(1),
        }
    }

    fn alloc_id(&self) -> String {
        format!("mem-{}", self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Count of documents in a collection (test convenience).
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn find(&self, collection: &str, filter: &Filter, page: usize) -> Result<DocPage, StoreError> {
        let collections = self.collections.read();
        let matching: Vec<&StoredDoc> = collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).collect())
            .unwrap_or_default();

        let total_docs = matching.len() as u64;
        let total_pages = matching.len().div_ceil(self.page_limit).max(1);
        let start = page.saturating_sub(1) * self.page_limit;
        let docs = matching
            .into_iter()
            .skip(start)
            .take(self.page_limit)
            .cloned()
            .collect();

        Ok(DocPage {
            docs,
            total_docs,
            page,
            total_pages,
        })
    }

    fn create(&self, collection: &str, data: Map<String, Value>) -> Result<StoredDoc, StoreError> {
        let doc = StoredDoc {
            id: self.alloc_id(),
            data,
        };
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .push(doc.clone());
        Ok(doc)
    }

    fn update(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<StoredDoc, StoreError> {
        let mut collections = self.collections.write();
        let docs = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        let doc = docs
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        for (k, v) in data {
            doc.data.insert(k, v);
        }
        Ok(doc.clone())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write();
        let docs = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        let before = docs.len();
        docs.retain(|d| d.id != id);
        if docs.len() == before {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    fn upload(&self, filename: &str, _bytes: Vec<u8>, _mime: &str) -> Result<MediaRef, StoreError> {
        let media = MediaRef {
            id: self.alloc_id(),
            url: format!("/media/{filename}"),
        };
        self.media.write().push(media.clone());
        Ok(media)
    }
}
