//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::BookRepository;
use crate::infrastructure::SeaOrmBookRepository;
use crate::infrastructure::config::Config;
use crate::services::cover_service::CoverStore;
use crate::services::lookup_service::BookInfoFetcher;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Book repository
    pub book_repo: Arc<dyn BookRepository>,
    /// Metadata lookup over the configured providers
    pub fetcher: Arc<BookInfoFetcher>,
    /// Cover image directory
    pub covers: CoverStore,
}

impl AppState {
    /// Create a new AppState with the SeaORM repository and configured providers
    pub fn new(db: DatabaseConnection, config: &Config) -> Result<Self, String> {
        let fetcher = BookInfoFetcher::from_config(config)?;
        Ok(Self::from_parts(
            db,
            fetcher,
            CoverStore::new(config.covers_dir.clone(), config.cover_max_dimension),
        ))
    }

    pub fn from_parts(db: DatabaseConnection, fetcher: BookInfoFetcher, covers: CoverStore) -> Self {
        Self {
            book_repo: Arc::new(SeaOrmBookRepository::new(db)),
            fetcher: Arc::new(fetcher),
            covers,
        }
    }
}
