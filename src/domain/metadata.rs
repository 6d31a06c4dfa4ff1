//! Metadata provider contract
//!
//! Every external catalog maps its own response shape into [`BookInfo`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Normalized book metadata returned by a lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct BookInfo {
    pub title: String,
    /// Authors joined with ", "
    pub author: String,
    /// First four characters of the provider's date string, may be empty
    pub year_published: String,
    /// Categories/subjects joined with ", "
    pub genre: String,
    pub cover_url: String,
    pub description: String,
}

impl BookInfo {
    pub fn has_cover(&self) -> bool {
        !self.cover_url.trim().is_empty()
    }
}

/// Truncate a provider date string ("2003-05-01", "May 2003", ...) to its year part.
pub fn year_prefix(date: &str) -> String {
    date.chars().take(4).collect()
}

/// An external catalog that can be asked for book metadata.
///
/// `Ok(None)` means the provider answered but had no match; `Err` is any
/// transport, status or decoding failure.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Provider name used in logs
    fn name(&self) -> &'static str;

    async fn lookup_isbn(&self, isbn: &str) -> Result<Option<BookInfo>, String>;

    async fn lookup_title(&self, title: &str) -> Result<Option<BookInfo>, String>;
}
