//! Services Layer
//!
//! This module contains pure business logic extracted from HTTP handlers.

pub mod book_service;
pub mod cover_service;
pub mod lookup_service;

// Re-export for convenience
pub use book_service::{BookForm, CoverUpload, ImportReport};
pub use cover_service::CoverStore;
pub use lookup_service::BookInfoFetcher;
