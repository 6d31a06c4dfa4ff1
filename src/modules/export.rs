use crate::models::Book;
use crate::modules::import::{CSV_HEADERS, LibraryCsvRow};

impl From<&Book> for LibraryCsvRow {
    fn from(book: &Book) -> Self {
        Self {
            title: Some(book.title.clone()),
            author: Some(book.author.clone()),
            isbn: book.isbn.clone(),
            genre: book.genre.clone(),
            year_published: book.year_published.map(|y| y.to_string()),
            date_started: book.start_date.clone(),
            date_finished: book.end_date.clone(),
            status: book.reading_status.clone(),
            rating: book.rating.map(|r| r.to_string()),
            notes: book.personal_notes.clone(),
        }
    }
}

/// Serialize books into the library CSV format (header row included)
pub fn write_library_csv(books: &[Book]) -> Result<Vec<u8>, String> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    wtr.write_record(CSV_HEADERS)
        .map_err(|e| format!("CSV write error: {}", e))?;

    for book in books {
        wtr.serialize(LibraryCsvRow::from(book))
            .map_err(|e| format!("CSV write error: {}", e))?;
    }

    wtr.into_inner()
        .map_err(|e| format!("CSV flush error: {}", e))
}

/// `library-YYYY-MM-DD.csv`
pub fn export_filename(now: chrono::DateTime<chrono::Utc>) -> String {
    format!("library-{}.csv", now.format("%Y-%m-%d"))
}
