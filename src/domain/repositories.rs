//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;

use super::DomainError;
use crate::models::book::Book;

/// Filter criteria for book queries
#[derive(Debug, Default, Clone)]
pub struct BookFilter {
    pub status: Option<String>,
    /// Free text matched against title, author and ISBN
    pub query: Option<String>,
    /// `title_asc`, `title_desc` or `recent`; insertion order otherwise
    pub sort: Option<String>,
}

/// Input for creating a book
#[derive(Debug, Default, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub cover_image: Option<String>,
    pub year_published: Option<i32>,
    pub genre: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub reading_status: Option<String>,
    pub personal_notes: Option<String>,
    pub rating: Option<i32>,
}

/// Input for editing a book.
///
/// Title and author are always replaced; the remaining fields only when present.
#[derive(Debug, Default, Clone)]
pub struct BookUpdate {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub year_published: Option<i32>,
    pub genre: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub reading_status: Option<String>,
    pub personal_notes: Option<String>,
    pub rating: Option<i32>,
}

/// Repository trait for Book entity
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Find all books matching the filter criteria
    async fn find_all(&self, filter: BookFilter) -> Result<Vec<Book>, DomainError>;

    /// Find a single book by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<Book>, DomainError>;

    /// Find a single book by its (normalized) ISBN
    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>, DomainError>;

    /// Create a new book. A duplicate ISBN yields `DomainError::Conflict`.
    async fn create(&self, book: NewBook) -> Result<Book, DomainError>;

    /// Update an existing book
    async fn update(&self, id: i32, update: BookUpdate) -> Result<Book, DomainError>;

    /// Delete a book by ID, returning the removed record
    async fn delete(&self, id: i32) -> Result<Book, DomainError>;

    /// Delete every book, returning how many rows were removed
    async fn delete_all(&self) -> Result<u64, DomainError>;

    /// Count books
    async fn count(&self) -> Result<u64, DomainError>;
}
