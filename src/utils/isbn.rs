/// Strip separators (and spreadsheet quoting like `="..."`) from an ISBN.
/// Blank input means no ISBN.
pub fn normalize_isbn(raw: &str) -> Option<String> {
    let isbn: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '=' | '"'))
        .collect();
    if isbn.is_empty() { None } else { Some(isbn) }
}
