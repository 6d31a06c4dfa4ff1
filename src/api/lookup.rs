use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::domain::BookInfo;
use crate::infrastructure::AppState;

fn found_or_404(info: Option<BookInfo>) -> axum::response::Response {
    match info {
        Some(info) => (StatusCode::OK, Json(info)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Book not found" })),
        )
            .into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/fetch_book_info/{isbn}",
    params(("isbn" = String, Path, description = "ISBN-10 or ISBN-13")),
    responses(
        (status = 200, description = "Metadata found", body = BookInfo),
        (status = 404, description = "No provider knows this ISBN")
    )
)]
pub async fn fetch_book_info(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> impl IntoResponse {
    let Some(isbn) = crate::utils::normalize_isbn(&isbn) else {
        return found_or_404(None);
    };
    found_or_404(state.fetcher.fetch_by_isbn(&isbn).await)
}

#[utoipa::path(
    get,
    path = "/api/fetch_book_info_by_title/{title}",
    params(("title" = String, Path, description = "Title to search for")),
    responses(
        (status = 200, description = "Metadata found", body = BookInfo),
        (status = 404, description = "No provider matched the title")
    )
)]
pub async fn fetch_book_info_by_title(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> impl IntoResponse {
    let title = title.trim();
    if title.is_empty() {
        return found_or_404(None);
    }
    found_or_404(state.fetcher.fetch_by_title(title).await)
}
