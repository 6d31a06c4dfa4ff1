use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Suggested values for `reading_status`; any string is accepted.
pub const STATUS_NOT_STARTED: &str = "not_started";
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_COMPLETED: &str = "completed";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub author: String,
    #[sea_orm(unique)]
    pub isbn: Option<String>,
    pub cover_image: Option<String>,
    pub year_published: Option<i32>,
    pub genre: Option<String>,
    pub start_date: Option<String>, // YYYY-MM-DD
    pub end_date: Option<String>,   // YYYY-MM-DD
    pub reading_status: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub personal_notes: Option<String>,
    pub rating: Option<i32>, // 1-5
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// DTO for API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub cover_image: Option<String>,
    /// Public path of the stored cover, derived from `cover_image`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    pub year_published: Option<i32>,
    pub genre: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub reading_status: Option<String>,
    pub personal_notes: Option<String>,
    pub rating: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Model> for Book {
    fn from(model: Model) -> Self {
        let cover_url = model
            .cover_image
            .as_ref()
            .map(|filename| format!("/covers/{}", filename));

        Self {
            id: model.id,
            title: model.title,
            author: model.author,
            isbn: model.isbn,
            cover_image: model.cover_image,
            cover_url,
            year_published: model.year_published,
            genre: model.genre,
            start_date: model.start_date,
            end_date: model.end_date,
            reading_status: model.reading_status,
            personal_notes: model.personal_notes,
            rating: model.rating,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_url_is_derived_from_filename() {
        let model = Model {
            id: 7,
            title: "Il nome della rosa".to_string(),
            author: "Umberto Eco".to_string(),
            isbn: Some("9788845292613".to_string()),
            cover_image: Some("rosa.jpg".to_string()),
            year_published: Some(1980),
            genre: None,
            start_date: None,
            end_date: None,
            reading_status: Some(STATUS_COMPLETED.to_string()),
            personal_notes: None,
            rating: Some(5),
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
            updated_at: "2024-01-01T00:00:00+00:00".to_string(),
        };

        let book = Book::from(model);
        assert_eq!(book.cover_url.as_deref(), Some("/covers/rosa.jpg"));

        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["rating"], 5);
        assert_eq!(json["author"], "Umberto Eco");
    }
}
