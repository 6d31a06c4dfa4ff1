use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};

use super::error_response;
use crate::domain::{BookFilter, DomainError};
use crate::infrastructure::AppState;
use crate::modules::export::{export_filename, write_library_csv};

#[utoipa::path(
    get,
    path = "/api/books/export",
    responses(
        (status = 200, description = "All books as CSV", body = String, content_type = "text/csv")
    )
)]
pub async fn export_books(State(state): State<AppState>) -> impl IntoResponse {
    let books = match state.book_repo.find_all(BookFilter::default()).await {
        Ok(books) => books,
        Err(e) => return error_response(e),
    };

    let body = match write_library_csv(&books) {
        Ok(body) => body,
        Err(e) => return error_response(DomainError::Internal(e)),
    };

    let filename = export_filename(chrono::Utc::now());
    let disposition = match HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename)) {
        Ok(v) => v,
        Err(e) => return error_response(DomainError::Internal(e.to_string())),
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    tracing::info!("Exported {} books to {}", books.len(), filename);
    (StatusCode::OK, headers, body).into_response()
}
