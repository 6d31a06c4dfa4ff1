//! External catalog clients

pub mod google_books;
pub mod openlibrary;

pub use google_books::GoogleBooksClient;
pub use openlibrary::OpenLibraryClient;

use std::time::Duration;

const USER_AGENT: &str = concat!("Biblioteca/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client for providers and cover downloads
pub fn http_client(timeout_secs: u64) -> Result<reqwest::Client, String> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| format!("Failed to build client: {}", e))
}
