//! Book info fetcher
//!
//! Asks each metadata provider in priority order and returns the first match.
//! Provider failures are logged and swallowed: callers only see found / not found.

use std::sync::Arc;

use crate::domain::{BookInfo, MetadataProvider};
use crate::infrastructure::config::Config;
use crate::modules::integrations::{GoogleBooksClient, OpenLibraryClient, http_client};

/// Cover downloads larger than this are dropped unless configured otherwise
const DEFAULT_MAX_COVER_BYTES: usize = 16 * 1024 * 1024;

pub struct BookInfoFetcher {
    providers: Vec<Arc<dyn MetadataProvider>>,
    client: reqwest::Client,
    max_cover_bytes: usize,
}

impl BookInfoFetcher {
    pub fn new(providers: Vec<Arc<dyn MetadataProvider>>, client: reqwest::Client) -> Self {
        Self {
            providers,
            client,
            max_cover_bytes: DEFAULT_MAX_COVER_BYTES,
        }
    }

    pub fn with_max_cover_bytes(mut self, max_cover_bytes: usize) -> Self {
        self.max_cover_bytes = max_cover_bytes;
        self
    }

    /// Google Books first, Open Library as fallback
    pub fn from_config(config: &Config) -> Result<Self, String> {
        let client = http_client(config.http_timeout_secs)?;

        let providers: Vec<Arc<dyn MetadataProvider>> = vec![
            Arc::new(GoogleBooksClient::new(
                client.clone(),
                config.google_books_url.clone(),
                config.google_books_api_key.clone(),
            )),
            Arc::new(OpenLibraryClient::new(
                client.clone(),
                config.open_library_url.clone(),
            )),
        ];

        Ok(Self::new(providers, client).with_max_cover_bytes(config.max_upload_bytes))
    }

    pub async fn fetch_by_isbn(&self, isbn: &str) -> Option<BookInfo> {
        tracing::debug!("Looking up ISBN {}", isbn);

        for provider in &self.providers {
            match provider.lookup_isbn(isbn).await {
                Ok(Some(info)) => {
                    tracing::info!("{} matched ISBN {}", provider.name(), isbn);
                    return Some(info);
                }
                Ok(None) => tracing::warn!("{} has no record for ISBN {}", provider.name(), isbn),
                Err(e) => tracing::error!("Error fetching from {}: {}", provider.name(), e),
            }
        }

        tracing::warn!("No information found for ISBN {}", isbn);
        None
    }

    pub async fn fetch_by_title(&self, title: &str) -> Option<BookInfo> {
        tracing::debug!("Looking up title {:?}", title);

        for provider in &self.providers {
            match provider.lookup_title(title).await {
                Ok(Some(info)) => {
                    tracing::info!("{} matched title {:?}", provider.name(), title);
                    return Some(info);
                }
                Ok(None) => tracing::warn!("{} has no record for title {:?}", provider.name(), title),
                Err(e) => tracing::error!("Error fetching from {}: {}", provider.name(), e),
            }
        }

        tracing::warn!("No information found for title {:?}", title);
        None
    }

    /// Download raw cover bytes; `None` on any failure or when the body
    /// exceeds the configured size limit
    pub async fn download_cover(&self, url: &str) -> Option<Vec<u8>> {
        let mut resp = match self.client.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!("Error downloading cover {}: {}", url, e);
                return None;
            }
        };

        if !resp.status().is_success() {
            tracing::error!("Cover download {} returned status {}", url, resp.status());
            return None;
        }

        if let Some(len) = resp.content_length()
            && len > self.max_cover_bytes as u64
        {
            tracing::error!("Cover {} is {} bytes, limit is {}", url, len, self.max_cover_bytes);
            return None;
        }

        let mut bytes = Vec::new();
        loop {
            match resp.chunk().await {
                Ok(Some(chunk)) => {
                    if bytes.len() + chunk.len() > self.max_cover_bytes {
                        tracing::error!(
                            "Cover {} exceeds the {} byte limit",
                            url,
                            self.max_cover_bytes
                        );
                        return None;
                    }
                    bytes.extend_from_slice(&chunk);
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Error reading cover body {}: {}", url, e);
                    return None;
                }
            }
        }

        if bytes.is_empty() {
            tracing::error!("Cover download {} returned an empty body", url);
            return None;
        }
        Some(bytes)
    }
}
