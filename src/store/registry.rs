//! Registry lookup cache.
//!
//! Preloads every registry entry through the paged read-all helper and
//! answers slug lookups from memory, so per-file resolution never makes a
//! network round-trip.

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::component::{RegistryEntry, RegistryLookup};
use crate::error::StoreError;

use super::{Filter, Store, read_all_pages};

#[derive(Debug, Default)]
pub struct RegistryCache {
    entries: FxHashMap<String, RegistryEntry>,
}

impl RegistryCache {
    /// Load every entry from the registry collection.
    pub fn load(store: &dyn Store, collection: &str) -> Result<Self, StoreError> {
        let docs = read_all_pages(store, collection, &Filter::All)?;
        let mut entries = FxHashMap::default();
        for doc in docs {
            let Some(slug) = doc.get_str("slug") else {
                continue;
            };
            entries.insert(
                slug.to_string(),
                RegistryEntry {
                    slug: slug.to_string(),
                    value: doc.data.get("value").cloned().unwrap_or(Value::Null),
                    provider: doc.get_str("provider").map(str::to_string),
                },
            );
        }
        Ok(Self { entries })
    }

    pub fn from_entries(entries: impl IntoIterator<Item = RegistryEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|e| (e.slug.clone(), e))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RegistryLookup for RegistryCache {
    fn find_by_slug(&self, slug: &str) -> Option<RegistryEntry> {
        self.entries.get(slug).cloned()
    }
}
