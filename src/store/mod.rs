//! Storage abstraction for the target CMS.
//!
//! The [`Store`] trait covers the four document operations the pipeline
//! needs (`find`/`create`/`update`/`delete`) plus binary upload, enabling
//! pluggable backends: the Payload REST API in production, an in-memory
//! store for tests and `--dry-run`.
//!
//! The paged helpers in this module are the only sanctioned way to read or
//! purge whole collections. A single unpaginated fetch against a store
//! that caps page size is a known bug class (a purge that silently leaves
//! everything past the first page), so both loops are here, bounded, and
//! tested.

pub mod http;
pub mod memory;
pub mod registry;

pub use http::HttpStore;
pub use memory::MemoryStore;
pub use registry::RegistryCache;

use serde_json::{Map, Value};

use crate::error::StoreError;

/// A stored document: opaque id plus its field map.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDoc {
    pub id: String,
    pub data: Map<String, Value>,
}

impl StoredDoc {
    /// String field accessor.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(Value::as_str)
    }
}

/// One page of query results.
#[derive(Debug, Clone)]
pub struct DocPage {
    pub docs: Vec<StoredDoc>,
    pub total_docs: u64,
    pub page: usize,
    pub total_pages: usize,
}

/// Equality filter on a single field (the only filter shape the pipeline
/// uses; lookups are exact, never fuzzy).
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    All,
    Eq { field: String, value: Value },
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, doc: &StoredDoc) -> bool {
        match self {
            Self::All => true,
            Self::Eq { field, value } => doc.data.get(field) == Some(value),
        }
    }
}

/// Reference to an uploaded binary blob.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRef {
    pub id: String,
    pub url: String,
}

/// Target document store.
///
/// Implementations must be `Send + Sync`: the batch runner fans out over
/// files with rayon and shares one store handle.
pub trait Store: Send + Sync {
    /// Fetch one page (1-based) of documents matching the filter.
    fn find(&self, collection: &str, filter: &Filter, page: usize) -> Result<DocPage, StoreError>;

    fn create(&self, collection: &str, data: Map<String, Value>) -> Result<StoredDoc, StoreError>;

    fn update(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<StoredDoc, StoreError>;

    fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Upload a binary blob, receiving a stable reference.
    fn upload(&self, filename: &str, bytes: Vec<u8>, mime: &str) -> Result<MediaRef, StoreError>;
}

// ============================================================================
// Paged Helpers
// ============================================================================

/// Upper bound on fetch-loop iterations. Exceeding it means the store is
/// returning inconsistent paging data; aborting beats spinning.
pub const MAX_PAGE_ITERATIONS: usize = 10_000;

/// Read every document matching a filter, walking all pages.
pub fn read_all_pages(
    store: &dyn Store,
    collection: &str,
    filter: &Filter,
) -> Result<Vec<StoredDoc>, StoreError> {
    let mut docs = Vec::new();
    let mut page = 1;
    loop {
        if page > MAX_PAGE_ITERATIONS {
            return Err(StoreError::PaginationExhaustion {
                collection: collection.to_string(),
                iterations: page - 1,
            });
        }
        let result = store.find(collection, filter, page)?;
        let fetched = result.docs.len();
        docs.extend(result.docs);
        if fetched == 0 || docs.len() as u64 >= result.total_docs || page >= result.total_pages {
            break;
        }
        page += 1;
    }
    Ok(docs)
}

/// Delete every document in a collection.
///
/// Each deletion shifts the remaining documents forward, so the loop
/// re-fetches page 1 after each pass instead of advancing the page number.
/// Returns the number of documents deleted.
pub fn purge_collection(store: &dyn Store, collection: &str) -> Result<usize, StoreError> {
    let mut deleted = 0;
    for _ in 0..MAX_PAGE_ITERATIONS {
        let page = store.find(collection, &Filter::All, 1)?;
        if page.docs.is_empty() {
            return Ok(deleted);
        }
        for doc in page.docs {
            store.delete(collection, &doc.id)?;
            deleted += 1;
        }
    }
    Err(StoreError::PaginationExhaustion {
        collection: collection.to_string(),
        iterations: MAX_PAGE_ITERATIONS,
    })
}

/// Idempotent upsert keyed on a unique field.
///
/// Returns the stored document and whether it was newly created.
pub fn upsert_by_field(
    store: &dyn Store,
    collection: &str,
    field: &str,
    key: &str,
    data: Map<String, Value>,
) -> Result<(StoredDoc, bool), StoreError> {
    let existing = store.find(collection, &Filter::eq(field, key), 1)?;
    match existing.docs.into_iter().next() {
        Some(doc) => Ok((store.update(collection, &doc.id, data)?, false)),
        None => Ok((store.create(collection, data)?, true)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc_data(identifier: &str) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert("identifier".into(), json!(identifier));
        data
    }

    #[test]
    fn test_read_all_pages_visits_every_record() {
        let store = MemoryStore::with_page_limit(10);
        for i in 0..25 {
            store.create("pages", doc_data(&format!("doc-{i}"))).unwrap();
        }
        let docs = read_all_pages(&store, "pages", &Filter::All).unwrap();
        assert_eq!(docs.len(), 25);
    }

    #[test]
    fn test_purge_deletes_past_first_page() {
        let store = MemoryStore::with_page_limit(10);
        for i in 0..25 {
            store.create("pages", doc_data(&format!("doc-{i}"))).unwrap();
        }
        let deleted = purge_collection(&store, "pages").unwrap();
        assert_eq!(deleted, 25);
        let remaining = store.find("pages", &Filter::All, 1).unwrap();
        assert_eq!(remaining.total_docs, 0);
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let store = MemoryStore::new();
        let (first, created) =
            upsert_by_field(&store, "pages", "identifier", "a", doc_data("a")).unwrap();
        assert!(created);
        let (second, created) =
            upsert_by_field(&store, "pages", "identifier", "a", doc_data("a")).unwrap();
        assert!(!created);
        assert_eq!(first.id, second.id);

        let all = read_all_pages(&store, "pages", &Filter::All).unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn test_filter_eq() {
        let filter = Filter::eq("slug", "acme-phone");
        let mut data = Map::new();
        data.insert("slug".into(), json!("acme-phone"));
        let doc = StoredDoc {
            id: "1".into(),
            data,
        };
        assert!(filter.matches(&doc));
        assert!(!Filter::eq("slug", "bravo-phone").matches(&doc));
    }
}
