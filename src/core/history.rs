//! Request history: most-recent-first, unique, bounded

use std::sync::Arc;
use tracing::warn;

use super::store::{KeyValueStore, StoreError};

/// Maximum number of remembered requests
pub const MAX_HISTORY: usize = 20;

const HISTORY_KEY: &str = "history";

/// Durable history list, stored as one JSON array under a single key.
///
/// Every mutation is a single [`KeyValueStore::update`], so concurrent
/// sessions sharing the store cannot break the uniqueness or capacity
/// invariants or drop each other's entries.
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
}

impl HistoryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Current entries, most recent first. Unreadable history counts as empty.
    pub fn list(&self) -> Vec<String> {
        match self.load() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Could not read history, starting empty");
                Vec::new()
            }
        }
    }

    /// Move `entry` to the front, adding it if new, and drop anything past capacity
    pub fn record(&self, entry: &str) -> Result<Vec<String>, StoreError> {
        self.update(|entries| promote(entries, entry))
    }

    pub fn remove(&self, entry: &str) -> Result<Vec<String>, StoreError> {
        self.update(|entries| entries.into_iter().filter(|e| e != entry).collect())
    }

    pub fn clear(&self) -> Result<Vec<String>, StoreError> {
        self.update(|_| Vec::new())
    }

    /// Entries containing `query`, ignoring case
    pub fn filter(&self, query: &str) -> Vec<String> {
        filter_entries(&self.list(), query)
    }

    fn update(
        &self,
        change: impl FnOnce(Vec<String>) -> Vec<String>,
    ) -> Result<Vec<String>, StoreError> {
        let mut change = Some(change);
        let mut updated = Vec::new();

        self.store.update(HISTORY_KEY, &mut |current: Option<String>| -> Result<String, StoreError> {
            let entries = match current.as_deref().map(serde_json::from_str::<Vec<String>>) {
                Some(Ok(entries)) => entries,
                Some(Err(e)) => {
                    warn!(error = %e, "Discarding unreadable history");
                    Vec::new()
                }
                None => Vec::new(),
            };
            updated = match change.take() {
                Some(change) => change(entries),
                None => entries,
            };
            Ok(serde_json::to_string(&updated)?)
        })?;

        Ok(updated)
    }

    fn load(&self) -> Result<Vec<String>, StoreError> {
        match self.store.get(HISTORY_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }
}

/// De-duplicate with promotion, then truncate to [`MAX_HISTORY`]
pub fn promote(entries: Vec<String>, entry: &str) -> Vec<String> {
    let mut updated = Vec::with_capacity(MAX_HISTORY);
    updated.push(entry.to_string());
    updated.extend(entries.into_iter().filter(|e| e != entry));
    updated.truncate(MAX_HISTORY);
    updated
}

/// Case-insensitive substring filter that keeps relative order.
/// An empty query returns everything.
pub fn filter_entries(entries: &[String], query: &str) -> Vec<String> {
    if query.is_empty() {
        return entries.to_vec();
    }
    let needle = query.to_lowercase();
    entries
        .iter()
        .filter(|entry| entry.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
