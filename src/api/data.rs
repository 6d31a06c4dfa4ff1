use axum::{
    Json,
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use super::error_response;
use crate::infrastructure::AppState;
use crate::services::book_service;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct ImportQuery {
    /// Delete every existing book before importing
    #[serde(default)]
    pub replace: bool,
}

#[utoipa::path(
    post,
    path = "/api/books/import",
    params(ImportQuery),
    request_body(content = String, content_type = "multipart/form-data", description = "CSV in the `file` field"),
    responses(
        (status = 200, description = "Import report"),
        (status = 400, description = "No file or unreadable CSV")
    )
)]
pub async fn import_books(
    State(state): State<AppState>,
    Query(query): Query<ImportQuery>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": format!("Malformed form data: {}", e) })),
                )
                    .into_response();
            }
        };

        if field.name() != Some("file") {
            continue;
        }

        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": format!("Failed to read file: {}", e) })),
                )
                    .into_response();
            }
        };

        return match book_service::import_books(&state, &data, query.replace).await {
            Ok(report) => (
                StatusCode::OK,
                Json(json!({
                    "message": format!("Imported {} books", report.imported),
                    "imported": report.imported,
                    "errors": report.errors
                })),
            )
                .into_response(),
            Err(e) => error_response(e),
        };
    }

    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "No file uploaded" })),
    )
        .into_response()
}
