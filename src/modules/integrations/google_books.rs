use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::metadata::{BookInfo, MetadataProvider, year_prefix};

#[derive(Debug, Deserialize)]
struct GoogleBooksResponse {
    #[serde(rename = "totalItems", default)]
    total_items: u64,
    items: Option<Vec<GoogleBookItem>>,
}

#[derive(Debug, Deserialize)]
struct GoogleBookItem {
    #[serde(rename = "volumeInfo")]
    volume_info: GoogleVolumeInfo,
}

#[derive(Debug, Deserialize)]
struct GoogleVolumeInfo {
    title: Option<String>,
    authors: Option<Vec<String>>,
    #[serde(rename = "publishedDate")]
    published_date: Option<String>,
    categories: Option<Vec<String>>,
    #[serde(rename = "imageLinks")]
    image_links: Option<GoogleImageLinks>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleImageLinks {
    thumbnail: Option<String>,
    // smallThumbnail is also available but often too small
}

impl GoogleBooksResponse {
    fn into_book_info(self) -> Option<BookInfo> {
        if self.total_items == 0 {
            return None;
        }

        let volume = self.items?.into_iter().next()?.volume_info;

        Some(BookInfo {
            title: volume.title.unwrap_or_default(),
            author: volume.authors.unwrap_or_default().join(", "),
            year_published: year_prefix(volume.published_date.as_deref().unwrap_or_default()),
            genre: volume.categories.unwrap_or_default().join(", "),
            cover_url: volume
                .image_links
                .and_then(|links| links.thumbnail)
                .unwrap_or_default(),
            description: volume.description.unwrap_or_default(),
        })
    }
}

/// Primary metadata provider: Google Books volumes API
pub struct GoogleBooksClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GoogleBooksClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }

    async fn search(&self, query: &str) -> Result<Option<BookInfo>, String> {
        let mut url = format!("{}?q={}", self.base_url, urlencoding::encode(query));
        if let Some(key) = &self.api_key {
            url.push_str("&key=");
            url.push_str(&urlencoding::encode(key));
        }

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("Failed to send request: {}", e))?;

        if !resp.status().is_success() {
            return Err(format!("Google Books API returned status: {}", resp.status()));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| format!("Failed to read response body: {}", e))?;

        let parsed: GoogleBooksResponse =
            serde_json::from_str(&body).map_err(|e| format!("Failed to parse JSON: {}", e))?;

        Ok(parsed.into_book_info())
    }
}

#[async_trait]
impl MetadataProvider for GoogleBooksClient {
    fn name(&self) -> &'static str {
        "Google Books"
    }

    async fn lookup_isbn(&self, isbn: &str) -> Result<Option<BookInfo>, String> {
        self.search(&format!("isbn:{}", isbn)).await
    }

    async fn lookup_title(&self, title: &str) -> Result<Option<BookInfo>, String> {
        self.search(&format!("intitle:{}", title)).await
    }
}
