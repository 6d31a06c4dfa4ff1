use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

use crate::domain::metadata::{BookInfo, MetadataProvider, year_prefix};

/// Open Library only contributes this many subjects to the genre field
const MAX_SUBJECTS: usize = 3;

#[derive(Debug, Deserialize)]
struct OpenLibraryResponse {
    #[serde(flatten)]
    books: HashMap<String, OpenLibraryBook>,
}

#[derive(Debug, Deserialize)]
struct OpenLibraryBook {
    title: Option<String>,
    authors: Option<Vec<OpenLibraryAuthor>>,
    publish_date: Option<String>,
    subjects: Option<Vec<OpenLibrarySubject>>,
    cover: Option<OpenLibraryCover>,
    description: Option<OpenLibraryText>,
}

#[derive(Debug, Deserialize)]
struct OpenLibraryAuthor {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OpenLibrarySubject {
    Named { name: String },
    Plain(String),
}

impl OpenLibrarySubject {
    fn into_name(self) -> String {
        match self {
            OpenLibrarySubject::Named { name } => name,
            OpenLibrarySubject::Plain(name) => name,
        }
    }
}

/// Descriptions come either as a bare string or as `{"type": ..., "value": ...}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OpenLibraryText {
    Plain(String),
    Typed { value: String },
}

impl OpenLibraryText {
    fn into_string(self) -> String {
        match self {
            OpenLibraryText::Plain(text) => text,
            OpenLibraryText::Typed { value } => value,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenLibraryCover {
    large: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenLibrarySearchResponse {
    #[serde(default)]
    docs: Vec<OpenLibrarySearchDoc>,
}

#[derive(Debug, Deserialize)]
struct OpenLibrarySearchDoc {
    title: Option<String>,
    author_name: Option<Vec<String>>,
    first_publish_year: Option<i32>,
    subject: Option<Vec<String>>,
    cover_i: Option<i64>,
}

fn is_known_author(name: &str) -> bool {
    let n = name.trim();
    !n.is_empty() && !n.eq_ignore_ascii_case("unknown author") && !n.eq_ignore_ascii_case("unknown")
}

fn join_limited(values: impl IntoIterator<Item = String>) -> String {
    values
        .into_iter()
        .take(MAX_SUBJECTS)
        .collect::<Vec<_>>()
        .join(", ")
}

impl OpenLibraryBook {
    fn into_book_info(self) -> BookInfo {
        let author = self
            .authors
            .unwrap_or_default()
            .into_iter()
            .map(|a| a.name)
            .filter(|name| is_known_author(name))
            .collect::<Vec<_>>()
            .join(", ");

        BookInfo {
            title: self.title.unwrap_or_default(),
            author,
            year_published: year_prefix(self.publish_date.as_deref().unwrap_or_default()),
            genre: join_limited(
                self.subjects
                    .unwrap_or_default()
                    .into_iter()
                    .map(OpenLibrarySubject::into_name),
            ),
            cover_url: self.cover.and_then(|c| c.large).unwrap_or_default(),
            description: self
                .description
                .map(OpenLibraryText::into_string)
                .unwrap_or_default(),
        }
    }
}

impl OpenLibrarySearchDoc {
    fn into_book_info(self) -> BookInfo {
        let author = self
            .author_name
            .unwrap_or_default()
            .into_iter()
            .filter(|name| is_known_author(name))
            .collect::<Vec<_>>()
            .join(", ");

        BookInfo {
            title: self.title.unwrap_or_default(),
            author,
            year_published: self
                .first_publish_year
                .map(|y| year_prefix(&y.to_string()))
                .unwrap_or_default(),
            genre: join_limited(self.subject.unwrap_or_default()),
            cover_url: self
                .cover_i
                .map(|id| format!("https://covers.openlibrary.org/b/id/{}-L.jpg", id))
                .unwrap_or_default(),
            description: String::new(), // search.json carries no description
        }
    }
}

/// Secondary metadata provider: Open Library books and search APIs
pub struct OpenLibraryClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenLibraryClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get_body(&self, url: &str) -> Result<String, String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("Failed to send request: {}", e))?;

        if !resp.status().is_success() {
            return Err(format!(
                "Open Library API returned status: {}",
                resp.status()
            ));
        }

        resp.text()
            .await
            .map_err(|e| format!("Failed to read response body: {}", e))
    }
}

#[async_trait]
impl MetadataProvider for OpenLibraryClient {
    fn name(&self) -> &'static str {
        "Open Library"
    }

    async fn lookup_isbn(&self, isbn: &str) -> Result<Option<BookInfo>, String> {
        let url = format!(
            "{}/api/books?bibkeys=ISBN:{}&format=json&jscmd=data",
            self.base_url,
            urlencoding::encode(isbn)
        );

        let body = self.get_body(&url).await?;
        let mut parsed: OpenLibraryResponse =
            serde_json::from_str(&body).map_err(|e| format!("Failed to parse JSON: {}", e))?;

        let key = format!("ISBN:{}", isbn);
        Ok(parsed.books.remove(&key).map(OpenLibraryBook::into_book_info))
    }

    async fn lookup_title(&self, title: &str) -> Result<Option<BookInfo>, String> {
        let url = format!(
            "{}/search.json?title={}&limit=1",
            self.base_url,
            urlencoding::encode(title)
        );

        let body = self.get_body(&url).await?;
        let parsed: OpenLibrarySearchResponse =
            serde_json::from_str(&body).map_err(|e| format!("Failed to parse JSON: {}", e))?;

        Ok(parsed
            .docs
            .into_iter()
            .next()
            .map(OpenLibrarySearchDoc::into_book_info))
    }
}
