use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::NewBook;
use crate::utils::normalize_isbn;

pub const UNTITLED: &str = "Untitled";
pub const UNKNOWN_AUTHOR: &str = "Unknown author";

/// Column order of the library CSV format
pub const CSV_HEADERS: [&str; 10] = [
    "Title",
    "Author",
    "ISBN",
    "Genre",
    "Year Published",
    "Date Started",
    "Date Finished",
    "Status",
    "Rating",
    "Notes",
];

/// One row of the library CSV format, shared by import and export.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LibraryCsvRow {
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "Author", default)]
    pub author: Option<String>,
    #[serde(rename = "ISBN", default)]
    pub isbn: Option<String>,
    #[serde(rename = "Genre", default)]
    pub genre: Option<String>,
    #[serde(rename = "Year Published", default)]
    pub year_published: Option<String>,
    #[serde(rename = "Date Started", default)]
    pub date_started: Option<String>,
    #[serde(rename = "Date Finished", default)]
    pub date_finished: Option<String>,
    #[serde(rename = "Status", default)]
    pub status: Option<String>,
    #[serde(rename = "Rating", default)]
    pub rating: Option<String>,
    #[serde(rename = "Notes", default)]
    pub notes: Option<String>,
}

/// Result of parsing one CSV line (1-based, header is line 1)
#[derive(Debug)]
pub enum ImportedRow {
    Book { line: usize, book: NewBook },
    Invalid { line: usize, error: String },
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn lenient_date(value: Option<String>) -> Option<String> {
    let value = clean(value)?;
    ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&value, fmt).ok())
        .map(|d| d.format("%Y-%m-%d").to_string())
}

/// 0 means unrated; fractional ratings are rounded
fn lenient_rating(value: Option<String>) -> Option<i32> {
    let rating = clean(value)?.parse::<f64>().ok()?.round() as i32;
    (1..=5).contains(&rating).then_some(rating)
}

impl LibraryCsvRow {
    fn is_blank(&self) -> bool {
        [
            &self.title,
            &self.author,
            &self.isbn,
            &self.genre,
            &self.year_published,
            &self.date_started,
            &self.date_finished,
            &self.status,
            &self.rating,
            &self.notes,
        ]
        .iter()
        .all(|v| v.as_deref().is_none_or(|s| s.trim().is_empty()))
    }

    fn into_new_book(self) -> NewBook {
        NewBook {
            title: clean(self.title).unwrap_or_else(|| UNTITLED.to_string()),
            author: clean(self.author).unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            isbn: self.isbn.as_deref().and_then(normalize_isbn),
            cover_image: None,
            year_published: clean(self.year_published).and_then(|y| y.parse().ok()),
            genre: clean(self.genre),
            start_date: lenient_date(self.date_started),
            end_date: lenient_date(self.date_finished),
            reading_status: clean(self.status),
            personal_notes: clean(self.notes),
            rating: lenient_rating(self.rating),
        }
    }
}

/// Parse a library CSV export. Blank rows are skipped; a malformed row becomes
/// `ImportedRow::Invalid` without stopping the rest of the file.
pub fn parse_library_csv(content: &[u8]) -> Result<Vec<ImportedRow>, String> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content);

    let headers = rdr
        .headers()
        .map_err(|e| format!("CSV header error: {}", e))?
        .clone();

    if !headers.iter().any(|h| h == "Title") {
        return Err("CSV is missing the Title column".to_string());
    }

    let mut rows = Vec::new();
    for (index, record) in rdr.records().enumerate() {
        let line = index + 2;
        let parsed = record
            .and_then(|r| r.deserialize::<LibraryCsvRow>(Some(&headers)))
            .map_err(|e| format!("CSV parse error: {}", e));

        match parsed {
            Ok(row) if row.is_blank() => continue,
            Ok(row) => rows.push(ImportedRow::Book {
                line,
                book: row.into_new_book(),
            }),
            Err(error) => rows.push(ImportedRow::Invalid { line, error }),
        }
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn books(rows: Vec<ImportedRow>) -> Vec<NewBook> {
        rows.into_iter()
            .filter_map(|r| match r {
                ImportedRow::Book { book, .. } => Some(book),
                ImportedRow::Invalid { .. } => None,
            })
            .collect()
    }

    #[test]
    fn parses_rows_with_defaults() {
        let csv = "Title,Author,ISBN,Genre,Year Published,Date Started,Date Finished,Status,Rating,Notes\n\
                   Il barone rampante,Italo Calvino,978-88-04-66798-4,Novel,1957,2024-01-02,05/02/2024,completed,5,Loved it\n\
                   ,,,,,,,,,\n\
                   ,,,,abc,,,,0,\n";

        let parsed = books(parse_library_csv(csv.as_bytes()).unwrap());
        assert_eq!(parsed.len(), 2);

        let first = &parsed[0];
        assert_eq!(first.title, "Il barone rampante");
        assert_eq!(first.isbn.as_deref(), Some("9788804667984"));
        assert_eq!(first.year_published, Some(1957));
        assert_eq!(first.start_date.as_deref(), Some("2024-01-02"));
        assert_eq!(first.end_date.as_deref(), Some("2024-02-05"));
        assert_eq!(first.rating, Some(5));

        let second = &parsed[1];
        assert_eq!(second.title, UNTITLED);
        assert_eq!(second.author, UNKNOWN_AUTHOR);
        assert_eq!(second.year_published, None);
        assert_eq!(second.rating, None);
    }

    #[test]
    fn missing_optional_columns_are_fine() {
        let csv = "Title,Author\nNeuromancer,William Gibson\n";
        let parsed = books(parse_library_csv(csv.as_bytes()).unwrap());
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].isbn, None);
    }

    #[test]
    fn rejects_files_without_title_column() {
        assert!(parse_library_csv(b"Name,Writer\nx,y\n").is_err());
    }
}
