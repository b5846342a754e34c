//! Request DTOs for the directory API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

use super::entry::{ListFilter, NewSiteEntry, SiteEntryPatch};

/// Query-string parameters for GET /api/sites.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListSitesQuery {
    /// Campus filter (exact, case-insensitive)
    pub campus: Option<String>,
    /// A-Z grouping filter
    pub letter: Option<String>,
    /// Title search term (substring, case-insensitive)
    pub search: Option<String>,
}

impl ListSitesQuery {
    /// Converts raw query parameters into a normalized listing filter.
    pub fn into_filter(self) -> ListFilter {
        ListFilter::new(self.campus, self.letter, self.search)
    }
}

/// Request body for POST /api/sites.
///
/// # Fields
/// - `title`: Display title, required
/// - `url`: Target URL, required
/// - `campus`: Owning campus, required
/// - `letter`: Optional A-Z grouping (derived from the title when omitted)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSiteRequest {
    pub title: String,
    pub url: String,
    pub campus: String,
    #[serde(default)]
    pub letter: Option<String>,
}

impl CreateSiteRequest {
    /// Validates the request data.
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.title.trim().is_empty() {
            return Some("Title cannot be empty".to_string());
        }
        if self.url.trim().is_empty() {
            return Some("URL cannot be empty".to_string());
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Some("URL must start with http:// or https://".to_string());
        }
        if self.campus.trim().is_empty() {
            return Some("Campus cannot be empty".to_string());
        }
        None
    }

    /// Converts the request into origin-store create fields.
    pub fn into_new_entry(self) -> NewSiteEntry {
        NewSiteEntry {
            title: self.title.trim().to_string(),
            url: self.url.trim().to_string(),
            campus: self.campus.trim().to_string(),
            letter: self.letter,
        }
    }
}

/// Request body for PUT /api/sites/:id. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSiteRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub campus: Option<String>,
    #[serde(default)]
    pub letter: Option<String>,
}

impl UpdateSiteRequest {
    /// Validates the request data.
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.title.is_none()
            && self.url.is_none()
            && self.campus.is_none()
            && self.letter.is_none()
        {
            return Some("Update must change at least one field".to_string());
        }
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Some("Title cannot be empty".to_string());
            }
        }
        if let Some(url) = &self.url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Some("URL must start with http:// or https://".to_string());
            }
        }
        if let Some(campus) = &self.campus {
            if campus.trim().is_empty() {
                return Some("Campus cannot be empty".to_string());
            }
        }
        None
    }

    /// Converts the request into origin-store patch fields.
    pub fn into_patch(self) -> SiteEntryPatch {
        SiteEntryPatch {
            title: self.title.map(|t| t.trim().to_string()),
            url: self.url.map(|u| u.trim().to_string()),
            campus: self.campus.map(|c| c.trim().to_string()),
            letter: self.letter.map(|l| l.trim().to_uppercase()),
        }
    }
}

/// Query-string parameters for DELETE /api/cache.
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateQuery {
    /// Glob pattern of keys to invalidate, e.g. "siteindex:CSM:*"
    pub pattern: String,
}
