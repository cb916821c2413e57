use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::{JobKey, MapPayload, SummaryPayload};

/// One cached result. The summary is always present once the entry
/// exists; the map detail may arrive later and is merged in place.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub summary: SummaryPayload,
    pub map_detail: Option<MapPayload>,
}

/// Session-wide store of retrieved results, keyed by [`JobKey`].
///
/// Cloning the cache yields another handle to the same underlying map,
/// so the day and range orchestrators can share it. Entries are never
/// evicted; each mutation holds the lock for a single map update.
#[derive(Debug, Clone, Default)]
pub struct ResultCache {
    entries: Arc<Mutex<HashMap<JobKey, CacheEntry>>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &JobKey) -> Option<CacheEntry> {
        self.entries.lock().expect("cache lock").get(key).cloned()
    }

    pub fn contains(&self, key: &JobKey) -> bool {
        self.entries.lock().expect("cache lock").contains_key(key)
    }

    /// Stores a freshly loaded summary, replacing any previous entry for
    /// the key. Returns the stored entry.
    pub fn insert_summary(&self, key: &JobKey, summary: SummaryPayload) -> CacheEntry {
        let entry = CacheEntry {
            summary,
            map_detail: None,
        };
        self.entries
            .lock()
            .expect("cache lock")
            .insert(key.clone(), entry.clone());
        entry
    }

    /// Merges map detail into an existing entry without touching its
    /// summary. Returns the updated entry, or `None` when no summary was
    /// cached for the key (the detail is dropped in that case).
    pub fn merge_map(&self, key: &JobKey, map: MapPayload) -> Option<CacheEntry> {
        let mut entries = self.entries.lock().expect("cache lock");
        let entry = entries.get_mut(key)?;
        entry.map_detail = Some(map);
        Some(entry.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
