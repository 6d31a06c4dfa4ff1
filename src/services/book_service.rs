//! Book Service - Pure business logic without HTTP layer
//!
//! Form normalization and validation, the add-book flow (metadata lookup,
//! cover ingestion, persistence), edits, deletes and CSV import.

use serde::Deserialize;

use crate::domain::{BookUpdate, DomainError, NewBook};
use crate::infrastructure::AppState;
use crate::models::Book;
use crate::modules::import::{self, ImportedRow};
use crate::utils::normalize_isbn;

/// Book form values as submitted; every field is optional text.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct BookForm {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub year_published: Option<String>,
    pub genre: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub reading_status: Option<String>,
    pub personal_notes: Option<String>,
    pub rating: Option<String>,
}

/// A file received in the `cover` form field
#[derive(Debug, Clone)]
pub struct CoverUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Outcome of a CSV import
#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: usize,
    pub errors: Vec<String>,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, field: &str) -> Result<String, DomainError> {
    blank_to_none(value).ok_or_else(|| DomainError::Validation(format!("{} is required", field)))
}

/// Non-numeric years are dropped rather than rejected
fn parse_year(value: Option<String>) -> Option<i32> {
    blank_to_none(value).and_then(|v| v.parse().ok())
}

/// Non-numeric ratings are dropped; numeric ones must be 1-5
fn parse_rating(value: Option<String>) -> Result<Option<i32>, DomainError> {
    match blank_to_none(value).and_then(|v| v.parse::<i32>().ok()) {
        Some(r) if (1..=5).contains(&r) => Ok(Some(r)),
        Some(r) => Err(DomainError::Validation(format!(
            "rating must be between 1 and 5, got {}",
            r
        ))),
        None => Ok(None),
    }
}

fn parse_date(value: Option<String>, field: &str) -> Result<Option<String>, DomainError> {
    match blank_to_none(value) {
        Some(v) => chrono::NaiveDate::parse_from_str(&v, "%Y-%m-%d")
            .map(|d| Some(d.format("%Y-%m-%d").to_string()))
            .map_err(|_| DomainError::Validation(format!("{} must be YYYY-MM-DD, got {:?}", field, v))),
        None => Ok(None),
    }
}

impl BookForm {
    pub fn into_new_book(self) -> Result<NewBook, DomainError> {
        Ok(NewBook {
            title: required(self.title, "title")?,
            author: required(self.author, "author")?,
            isbn: self.isbn.as_deref().and_then(normalize_isbn),
            cover_image: None,
            year_published: parse_year(self.year_published),
            genre: blank_to_none(self.genre),
            start_date: parse_date(self.start_date, "start_date")?,
            end_date: parse_date(self.end_date, "end_date")?,
            reading_status: blank_to_none(self.reading_status),
            personal_notes: blank_to_none(self.personal_notes),
            rating: parse_rating(self.rating)?,
        })
    }

    pub fn into_update(self) -> Result<BookUpdate, DomainError> {
        Ok(BookUpdate {
            title: required(self.title, "title")?,
            author: required(self.author, "author")?,
            isbn: self.isbn.as_deref().and_then(normalize_isbn),
            year_published: parse_year(self.year_published),
            genre: blank_to_none(self.genre),
            start_date: parse_date(self.start_date, "start_date")?,
            end_date: parse_date(self.end_date, "end_date")?,
            reading_status: blank_to_none(self.reading_status),
            personal_notes: blank_to_none(self.personal_notes),
            rating: parse_rating(self.rating)?,
        })
    }
}

/// Add a book from a submitted form.
///
/// When the ISBN resolves to metadata with a cover URL the remote cover is
/// stored; otherwise the uploaded file (if any) is used. Cover problems never
/// fail the request, they only leave the book without a cover.
pub async fn add_book(
    state: &AppState,
    form: BookForm,
    upload: Option<CoverUpload>,
) -> Result<Book, DomainError> {
    let mut new_book = form.into_new_book()?;

    // Fail before any lookup or cover download for a known ISBN
    if let Some(isbn) = new_book.isbn.as_deref()
        && let Some(existing) = state.book_repo.find_by_isbn(isbn).await?
    {
        return Err(DomainError::Conflict(format!(
            "ISBN {} is already in the catalog (book {})",
            isbn, existing.id
        )));
    }

    new_book.cover_image = ingest_cover(state, new_book.isbn.as_deref(), upload).await;
    let cover = new_book.cover_image.clone();

    match state.book_repo.create(new_book).await {
        Ok(book) => {
            tracing::info!("Added book {} ({:?})", book.id, book.title);
            Ok(book)
        }
        Err(e) => {
            if let Some(filename) = cover
                && let Err(remove_err) = state.covers.remove(&filename)
            {
                tracing::warn!("Failed to clean up cover {}: {}", filename, remove_err);
            }
            Err(e)
        }
    }
}

async fn ingest_cover(
    state: &AppState,
    isbn: Option<&str>,
    upload: Option<CoverUpload>,
) -> Option<String> {
    if let Some(isbn) = isbn
        && let Some(info) = state.fetcher.fetch_by_isbn(isbn).await
        && info.has_cover()
        && let Some(bytes) = state.fetcher.download_cover(&info.cover_url).await
    {
        let covers = state.covers.clone();
        match run_blocking(move || covers.store_remote(&bytes)).await {
            Ok(filename) => return Some(filename),
            Err(e) => tracing::error!("Could not store downloaded cover for {}: {}", isbn, e),
        }
    }

    let upload = upload.filter(|u| !u.filename.is_empty() && !u.bytes.is_empty())?;
    let covers = state.covers.clone();
    match run_blocking(move || covers.store_upload(&upload.filename, &upload.bytes)).await {
        Ok(filename) => Some(filename),
        Err(e) => {
            tracing::warn!("Ignoring uploaded cover: {}", e);
            None
        }
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, DomainError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| DomainError::Internal(format!("Image task failed: {}", e)))?
}

pub async fn get_book(state: &AppState, id: i32) -> Result<Book, DomainError> {
    state
        .book_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)
}

pub async fn edit_book(state: &AppState, id: i32, form: BookForm) -> Result<Book, DomainError> {
    let update = form.into_update()?;
    let book = state.book_repo.update(id, update).await?;
    tracing::info!("Updated book {}", id);
    Ok(book)
}

/// Delete a book and its cover file
pub async fn delete_book(state: &AppState, id: i32) -> Result<Book, DomainError> {
    let removed = state.book_repo.delete(id).await?;

    if let Some(filename) = &removed.cover_image
        && let Err(e) = state.covers.remove(filename)
    {
        tracing::warn!("Book {} deleted but cover {} was not removed: {}", id, filename, e);
    }

    tracing::info!("Deleted book {}", id);
    Ok(removed)
}

/// Delete every book and every referenced cover file
pub async fn clear_books(state: &AppState) -> Result<u64, DomainError> {
    let books = state.book_repo.find_all(Default::default()).await?;
    let removed = state.book_repo.delete_all().await?;

    for filename in books.iter().filter_map(|b| b.cover_image.as_deref()) {
        if let Err(e) = state.covers.remove(filename) {
            tracing::warn!("Cover {} was not removed: {}", filename, e);
        }
    }

    tracing::info!("Cleared {} books", removed);
    Ok(removed)
}

/// Import books from CSV. Row failures are collected, not fatal.
pub async fn import_books(
    state: &AppState,
    data: &[u8],
    replace: bool,
) -> Result<ImportReport, DomainError> {
    let rows = import::parse_library_csv(data).map_err(DomainError::Validation)?;

    if replace {
        clear_books(state).await?;
    }

    let mut report = ImportReport::default();
    for row in rows {
        match row {
            ImportedRow::Book { line, book } => {
                let title = book.title.clone();
                match state.book_repo.create(book).await {
                    Ok(_) => report.imported += 1,
                    Err(e) => report.errors.push(format!("Line {} ({}): {}", line, title, e)),
                }
            }
            ImportedRow::Invalid { line, error } => {
                report.errors.push(format!("Line {}: {}", line, error))
            }
        }
    }

    tracing::info!(
        "CSV import finished: {} imported, {} errors",
        report.imported,
        report.errors.len()
    );
    Ok(report)
}
