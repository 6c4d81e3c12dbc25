//! Registry of pages already published to the database.
//!
//! Loaded once per batch from the database itself (there is no local state).
//! Keeps a recency-ordered list of guids, front = most recently touched, so
//! the oldest pages beyond a capacity bound can be found. Rows that repeat
//! an earlier guid are kept aside so their pages can still be evicted.

use std::collections::{HashMap, VecDeque};

use futures::TryStreamExt;
use tracing::{info, warn};

use super::types::{PageObject, QueryRequest, SortDirection};
use super::{query_pages, Destination, NotionError};

/// Property holding the natural key (Drive file id).
pub const GUID_PROPERTY: &str = "guid";

/// Property the registry is sorted by when loaded.
pub const RECENCY_PROPERTY: &str = "entryUpdated";

#[derive(Debug, Clone, PartialEq, Eq)]
struct StoredPage {
    page_id: String,
    live: bool,
}

/// Entry of the recency list. `page_id` is unknown for pages created during
/// the current batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecencyEntry {
    pub guid: String,
    pub page_id: Option<String>,
}

/// Pages of the destination database indexed by guid.
///
/// Assumes it is the only writer for the duration of a batch: nothing is
/// re-checked against the database after loading.
#[derive(Debug, Clone, Default)]
pub struct StoredItems {
    pages: HashMap<String, StoredPage>,
    recency: VecDeque<RecencyEntry>,
    /// Page ids of rows whose guid was already taken by a newer row.
    duplicates: Vec<String>,
}

impl StoredItems {
    /// Page through the whole database, newest `entryUpdated` first.
    pub async fn load(
        destination: &dyn Destination,
        database_id: &str,
    ) -> Result<Self, NotionError> {
        let query = QueryRequest::sorted_by(RECENCY_PROPERTY, SortDirection::Descending);
        let mut pages = query_pages(destination, database_id, query);

        let mut stored = Self::default();
        while let Some(page) = pages.try_next().await? {
            stored.push_loaded(&page);
        }

        info!(
            "Loaded {} stored pages from database {}",
            stored.len(),
            database_id
        );
        Ok(stored)
    }

    /// Build a registry from already fetched rows, in recency order.
    pub fn from_pages<'a>(pages: impl IntoIterator<Item = &'a PageObject>) -> Self {
        let mut stored = Self::default();
        for page in pages {
            stored.push_loaded(page);
        }
        stored
    }

    fn push_loaded(&mut self, page: &PageObject) {
        let Some(guid) = page.plain_text(GUID_PROPERTY) else {
            return;
        };
        if self.pages.contains_key(&guid) {
            warn!(
                "Duplicate guid {:?} in page {}, keeping the newer page",
                guid, page.id
            );
            self.duplicates.push(page.id.clone());
            return;
        }
        self.pages.insert(
            guid.clone(),
            StoredPage {
                page_id: page.id.clone(),
                live: false,
            },
        );
        self.recency.push_back(RecencyEntry {
            guid,
            page_id: Some(page.id.clone()),
        });
    }

    fn position(&self, guid: &str) -> Option<usize> {
        self.recency.iter().position(|e| e.guid == guid)
    }

    /// Page id published for `guid`, if any.
    pub fn record_id(&self, guid: &str) -> Option<&str> {
        self.pages.get(guid).map(|p| p.page_id.as_str())
    }

    /// Whether `guid` was touched by [`Self::updated`] during this batch.
    pub fn is_live(&self, guid: &str) -> bool {
        self.pages.get(guid).is_some_and(|p| p.live)
    }

    /// Record a page created in this batch. Its id is not known yet.
    pub fn created(&mut self, guid: &str) {
        self.recency.push_front(RecencyEntry {
            guid: guid.to_string(),
            page_id: None,
        });
    }

    /// Move `guid` to the front, keeping its page id.
    pub fn updated(&mut self, guid: &str) {
        if let Some(entry) = self.position(guid).and_then(|idx| self.recency.remove(idx)) {
            self.recency.push_front(entry);
            if let Some(page) = self.pages.get_mut(guid) {
                page.live = true;
            }
        }
    }

    /// Forget `guid` entirely.
    pub fn deleted(&mut self, guid: &str) {
        if let Some(idx) = self.position(guid) {
            self.recency.remove(idx);
            self.pages.remove(guid);
        }
    }

    /// Page ids of every entry past `limit`, oldest last, followed by the
    /// pages of duplicate rows regardless of `limit`.
    ///
    /// Entries created in this batch have no id yet and show up as `None`;
    /// callers must drop those before archiving anything.
    pub fn eviction_candidates(&self, limit: usize) -> Vec<Option<String>> {
        self.recency
            .iter()
            .skip(limit)
            .map(|e| e.page_id.clone())
            .chain(self.duplicates.iter().cloned().map(Some))
            .collect()
    }

    /// Pages shadowed by a newer row with the same guid, in load order.
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    /// Recency list, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &RecencyEntry> {
        self.recency.iter()
    }

    pub fn len(&self) -> usize {
        self.recency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recency.is_empty()
    }
}
