use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::StoreError;

/// Storage key holding the favourited item ids.
pub const FAVOURITES_KEY: &str = "betCityList";

/// Minimal key-value seam over local persistence so the favourites logic
/// can run against a fake in tests.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// File-backed store: one JSON object mapping keys to string values,
/// written in full on every `set`. A missing file reads as empty.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            HashMap::new()
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

/// In-memory store for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FavouritesPayload {
    list: Vec<String>,
}

/// User-curated set of favourited item ids, independent of any fetched
/// page. Membership is the single source of truth for `is_favourite`; the
/// whole set is persisted synchronously on every toggle.
#[derive(Debug, Default)]
pub struct FavouriteSet {
    // Insertion order is kept so the persisted list stays stable.
    ids: Vec<String>,
}

impl FavouriteSet {
    /// Restores the set from the store. An absent key means an empty set,
    /// never an error.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, StoreError> {
        let ids = match store.get(FAVOURITES_KEY)? {
            Some(raw) => serde_json::from_str::<FavouritesPayload>(&raw)?.list,
            None => Vec::new(),
        };
        debug!(count = ids.len(), "favourites restored");
        Ok(Self { ids })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|i| i == id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Flips membership of `id` and persists the whole set. Returns whether
    /// the id is a favourite after the flip.
    pub fn toggle(
        &mut self,
        id: &str,
        store: &mut dyn KeyValueStore,
    ) -> Result<bool, StoreError> {
        let now_favourite = if self.contains(id) {
            self.ids.retain(|i| i != id);
            false
        } else {
            self.ids.push(id.to_string());
            true
        };
        let raw = serde_json::to_string(&FavouritesPayload {
            list: self.ids.clone(),
        })?;
        store.set(FAVOURITES_KEY, &raw)?;
        Ok(now_favourite)
    }
}
