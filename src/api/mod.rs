pub mod books;
pub mod data;
pub mod export;
pub mod health;
pub mod lookup;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;

use crate::domain::DomainError;
use crate::infrastructure::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Books
        .route("/books", get(books::list_books).post(books::add_book))
        .route("/books/export", get(export::export_books))
        .route("/books/import", post(data::import_books))
        .route("/books/clear", post(books::clear_books))
        .route("/books/:id", get(books::get_book))
        .route("/books/:id/edit", post(books::edit_book))
        .route("/books/:id/delete", post(books::delete_book))
        // Metadata lookup
        .route("/fetch_book_info/:isbn", get(lookup::fetch_book_info))
        .route(
            "/fetch_book_info_by_title/:title",
            get(lookup::fetch_book_info_by_title),
        )
        .with_state(state)
}

/// Map a domain error to its HTTP status and `{"error": ...}` body
pub fn error_response(err: DomainError) -> Response {
    let status = match &err {
        DomainError::NotFound => StatusCode::NOT_FOUND,
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Database(_) | DomainError::Internal(_) => {
            tracing::error!("Request failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
