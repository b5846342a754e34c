//! Site Entry Module
//!
//! Domain types for directory rows and listing filters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// == Site Entry ==
/// A single row of the Site Index directory.
///
/// The origin table is system-of-record for these; cached listings carry them
/// as JSON arrays, so the type round-trips through serde.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteEntry {
    /// Row identifier assigned by the origin store
    pub id: i64,
    /// Display title of the site
    pub title: String,
    /// Target URL
    pub url: String,
    /// Owning campus (e.g. "CSM", "Skyline")
    pub campus: String,
    /// A-Z directory grouping, upper-case
    pub letter: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

// == New Site Entry ==
/// Fields for creating a directory row.
///
/// `letter` may be omitted; it is then derived from the title.
#[derive(Debug, Clone)]
pub struct NewSiteEntry {
    pub title: String,
    pub url: String,
    pub campus: String,
    pub letter: Option<String>,
}

impl NewSiteEntry {
    /// Resolves the directory letter: the explicit value when given,
    /// otherwise the first alphabetic character of the title, upper-cased.
    /// Titles with no alphabetic character land under "#".
    pub fn resolve_letter(&self) -> String {
        match &self.letter {
            Some(letter) if !letter.trim().is_empty() => letter.trim().to_uppercase(),
            _ => derive_letter(&self.title),
        }
    }
}

/// Derives the A-Z grouping from a title.
pub fn derive_letter(title: &str) -> String {
    title
        .chars()
        .find(|c| c.is_alphabetic())
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_else(|| "#".to_string())
}

// == Site Entry Patch ==
/// Partial update for a directory row. Absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct SiteEntryPatch {
    pub title: Option<String>,
    pub url: Option<String>,
    pub campus: Option<String>,
    pub letter: Option<String>,
}

// == List Filter ==
/// Normalized listing filter.
///
/// Construction trims every component and maps empty strings to absent, so
/// the rest of the pipeline (key building, TTL classification, repository
/// matching) only ever sees canonical values. Case folding happens at key
/// composition, not here; repository matching is case-insensitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    pub campus: Option<String>,
    pub letter: Option<String>,
    pub search: Option<String>,
}

impl ListFilter {
    /// Builds a normalized filter from raw (e.g. query-string) components.
    pub fn new(
        campus: Option<impl AsRef<str>>,
        letter: Option<impl AsRef<str>>,
        search: Option<impl AsRef<str>>,
    ) -> Self {
        Self {
            campus: normalize(campus),
            letter: normalize(letter),
            search: normalize(search),
        }
    }

    /// True when no component is set (the unfiltered "all items" listing).
    pub fn is_empty(&self) -> bool {
        self.campus.is_none() && self.letter.is_none() && self.search.is_none()
    }
}

fn normalize(value: Option<impl AsRef<str>>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
