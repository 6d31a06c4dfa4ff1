use axum::{
    Form, Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use super::error_response;
use crate::domain::{BookFilter, DomainError};
use crate::infrastructure::AppState;
use crate::services::book_service::{self, BookForm, CoverUpload};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListBooksQuery {
    /// Exact reading status
    pub status: Option<String>,
    /// Text matched against title, author and ISBN
    pub q: Option<String>,
    /// `title_asc`, `title_desc` or `recent`
    pub sort: Option<String>,
}

impl From<ListBooksQuery> for BookFilter {
    fn from(query: ListBooksQuery) -> Self {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        BookFilter {
            status: non_empty(query.status),
            query: non_empty(query.q),
            sort: non_empty(query.sort),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/books",
    params(ListBooksQuery),
    responses(
        (status = 200, description = "Books in the catalog")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<ListBooksQuery>,
) -> impl IntoResponse {
    match state.book_repo.find_all(query.into()).await {
        Ok(books) => (
            StatusCode::OK,
            Json(json!({
                "total": books.len(),
                "books": books
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Split a multipart body into form fields and the optional `cover` file
async fn read_book_multipart(
    mut multipart: Multipart,
) -> Result<(BookForm, Option<CoverUpload>), DomainError> {
    let mut form = BookForm::default();
    let mut cover = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| DomainError::Validation(format!("Malformed form data: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "cover" {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| DomainError::Validation(format!("Failed to read cover: {}", e)))?;
            cover = Some(CoverUpload {
                filename,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| DomainError::Validation(format!("Failed to read field {}: {}", name, e)))?;

        let slot = match name.as_str() {
            "title" => &mut form.title,
            "author" => &mut form.author,
            "isbn" => &mut form.isbn,
            "year_published" => &mut form.year_published,
            "genre" => &mut form.genre,
            "start_date" => &mut form.start_date,
            "end_date" => &mut form.end_date,
            "reading_status" => &mut form.reading_status,
            "personal_notes" => &mut form.personal_notes,
            "rating" => &mut form.rating,
            _ => {
                tracing::debug!("Ignoring unknown form field {:?}", name);
                continue;
            }
        };
        *slot = Some(value);
    }

    Ok((form, cover))
}

#[utoipa::path(
    post,
    path = "/api/books",
    request_body(content = String, content_type = "multipart/form-data", description = "Book fields plus optional `cover` file"),
    responses(
        (status = 201, description = "Book added", body = crate::models::Book),
        (status = 400, description = "Missing title/author or invalid field"),
        (status = 409, description = "ISBN already in the catalog")
    )
)]
pub async fn add_book(State(state): State<AppState>, multipart: Multipart) -> impl IntoResponse {
    let (form, cover) = match read_book_multipart(multipart).await {
        Ok(parts) => parts,
        Err(e) => return error_response(e),
    };

    match book_service::add_book(&state, form, cover).await {
        Ok(book) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Book added successfully!",
                "book": book
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/books/{id}",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book detail", body = crate::models::Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(State(state): State<AppState>, Path(id): Path<i32>) -> impl IntoResponse {
    match book_service::get_book(&state, id).await {
        Ok(book) => (StatusCode::OK, Json(book)).into_response(),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/books/{id}/edit",
    params(("id" = i32, Path, description = "Book id")),
    request_body(content = String, content_type = "application/x-www-form-urlencoded", description = "Book fields"),
    responses(
        (status = 200, description = "Book updated", body = crate::models::Book),
        (status = 400, description = "Invalid field"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "ISBN already in the catalog")
    )
)]
pub async fn edit_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<BookForm>,
) -> impl IntoResponse {
    match book_service::edit_book(&state, id, form).await {
        Ok(book) => (
            StatusCode::OK,
            Json(json!({
                "message": "Book updated successfully!",
                "book": book
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/books/{id}/delete",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book deleted"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(State(state): State<AppState>, Path(id): Path<i32>) -> impl IntoResponse {
    match book_service::delete_book(&state, id).await {
        Ok(book) => (
            StatusCode::OK,
            Json(json!({
                "message": "Book deleted successfully!",
                "id": book.id
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/books/clear",
    responses(
        (status = 200, description = "All books deleted")
    )
)]
pub async fn clear_books(State(state): State<AppState>) -> impl IntoResponse {
    match book_service::clear_books(&state).await {
        Ok(deleted) => (
            StatusCode::OK,
            Json(json!({
                "message": "All books have been deleted.",
                "deleted": deleted
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}
