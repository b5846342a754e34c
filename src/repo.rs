//! Repository Module
//!
//! Trait seam for the origin data store. The relational table is
//! system-of-record and entirely owned by the host application; this crate
//! only consumes it through the narrow interface below. A seedable in-memory
//! implementation backs the dev server and the test suite.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;

use crate::models::{ListFilter, NewSiteEntry, SiteEntry, SiteEntryPatch};

// == Repository Trait ==
/// Origin store for directory rows.
///
/// Every error from these methods is a data-layer error: the cache layer
/// propagates it to the caller untouched and never caches it.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Rows matching a filter, sorted by title.
    async fn find_many(&self, filter: &ListFilter) -> anyhow::Result<Vec<SiteEntry>>;

    /// Single row by id, None when absent.
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<SiteEntry>>;

    /// Row count for a filter.
    async fn count(&self, filter: &ListFilter) -> anyhow::Result<u64>;

    /// Inserts a row and returns it with its assigned id.
    async fn create(&self, new: NewSiteEntry) -> anyhow::Result<SiteEntry>;

    /// Applies a partial update. Fails when the id is unknown.
    async fn update(&self, id: i64, patch: SiteEntryPatch) -> anyhow::Result<SiteEntry>;

    /// Removes a row, returning it. Fails when the id is unknown.
    async fn delete(&self, id: i64) -> anyhow::Result<SiteEntry>;
}

// == Memory Repository ==
/// In-process Repository used by the dev server and tests.
#[derive(Debug)]
pub struct MemoryRepository {
    rows: Mutex<HashMap<i64, SiteEntry>>,
    next_id: AtomicI64,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Creates a repository pre-populated with rows (ids are reassigned).
    pub fn seeded(entries: Vec<NewSiteEntry>) -> Self {
        let repo = Self::new();
        let mut rows = repo.rows.lock().expect("repository lock poisoned");
        for new in entries {
            let entry = repo.materialize(new);
            rows.insert(entry.id, entry);
        }
        drop(rows);
        repo
    }

    fn materialize(&self, new: NewSiteEntry) -> SiteEntry {
        let now = Utc::now();
        SiteEntry {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            letter: new.resolve_letter(),
            title: new.title,
            url: new.url,
            campus: new.campus,
            created_at: now,
            updated_at: now,
        }
    }
}

fn matches(entry: &SiteEntry, filter: &ListFilter) -> bool {
    if let Some(campus) = &filter.campus {
        if !entry.campus.eq_ignore_ascii_case(campus) {
            return false;
        }
    }
    if let Some(letter) = &filter.letter {
        if !entry.letter.eq_ignore_ascii_case(letter) {
            return false;
        }
    }
    if let Some(search) = &filter.search {
        if !entry.title.to_lowercase().contains(&search.to_lowercase()) {
            return false;
        }
    }
    true
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn find_many(&self, filter: &ListFilter) -> anyhow::Result<Vec<SiteEntry>> {
        let rows = self.rows.lock().expect("repository lock poisoned");
        let mut found: Vec<SiteEntry> = rows
            .values()
            .filter(|entry| matches(entry, filter))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<SiteEntry>> {
        let rows = self.rows.lock().expect("repository lock poisoned");
        Ok(rows.get(&id).cloned())
    }

    async fn count(&self, filter: &ListFilter) -> anyhow::Result<u64> {
        let rows = self.rows.lock().expect("repository lock poisoned");
        Ok(rows.values().filter(|entry| matches(entry, filter)).count() as u64)
    }

    async fn create(&self, new: NewSiteEntry) -> anyhow::Result<SiteEntry> {
        let entry = self.materialize(new);
        self.rows
            .lock()
            .expect("repository lock poisoned")
            .insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn update(&self, id: i64, patch: SiteEntryPatch) -> anyhow::Result<SiteEntry> {
        let mut rows = self.rows.lock().expect("repository lock poisoned");
        let entry = rows
            .get_mut(&id)
            .ok_or_else(|| anyhow!("no site entry with id {}", id))?;

        if let Some(title) = patch.title {
            entry.title = title;
        }
        if let Some(url) = patch.url {
            entry.url = url;
        }
        if let Some(campus) = patch.campus {
            entry.campus = campus;
        }
        if let Some(letter) = patch.letter {
            entry.letter = letter;
        }
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn delete(&self, id: i64) -> anyhow::Result<SiteEntry> {
        self.rows
            .lock()
            .expect("repository lock poisoned")
            .remove(&id)
            .ok_or_else(|| anyhow!("no site entry with id {}", id))
    }
}
