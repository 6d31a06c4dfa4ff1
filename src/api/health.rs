use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::infrastructure::AppState;

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy")
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let books = match state.book_repo.count().await {
        Ok(n) => Some(n),
        Err(e) => {
            tracing::error!("Health check could not count books: {}", e);
            None
        }
    };

    Json(json!({
        "status": if books.is_some() { "ok" } else { "degraded" },
        "service": "biblioteca",
        "version": env!("CARGO_PKG_VERSION"),
        "books": books
    }))
}
