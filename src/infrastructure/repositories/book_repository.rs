//! SeaORM implementation of BookRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::domain::{BookFilter, BookRepository, BookUpdate, DomainError, NewBook};
use crate::models::Book;
use crate::models::book::{ActiveModel, Column, Entity as BookEntity};

/// SeaORM-based implementation of BookRepository
pub struct SeaOrmBookRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookRepository for SeaOrmBookRepository {
    async fn find_all(&self, filter: BookFilter) -> Result<Vec<Book>, DomainError> {
        let mut query = BookEntity::find();

        if let Some(status) = &filter.status
            && !status.is_empty()
        {
            query = query.filter(Column::ReadingStatus.eq(status));
        }

        if let Some(q) = &filter.query
            && !q.is_empty()
        {
            let cond = Condition::any()
                .add(Column::Title.contains(q))
                .add(Column::Author.contains(q))
                .add(Column::Isbn.contains(q));
            query = query.filter(cond);
        }

        match filter.sort.as_deref() {
            Some("title_asc") => query = query.order_by_asc(Column::Title),
            Some("title_desc") => query = query.order_by_desc(Column::Title),
            Some("recent") => {
                query = query
                    .order_by_desc(Column::UpdatedAt)
                    .order_by_desc(Column::Id)
            }
            _ => query = query.order_by_asc(Column::Id),
        }

        let books = query.all(&self.db).await?;
        Ok(books.into_iter().map(Book::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Book>, DomainError> {
        let book = BookEntity::find_by_id(id).one(&self.db).await?;
        Ok(book.map(Book::from))
    }

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>, DomainError> {
        let book = BookEntity::find()
            .filter(Column::Isbn.eq(isbn))
            .one(&self.db)
            .await?;
        Ok(book.map(Book::from))
    }

    async fn create(&self, book: NewBook) -> Result<Book, DomainError> {
        let now = chrono::Utc::now();

        let new_book = ActiveModel {
            title: Set(book.title),
            author: Set(book.author),
            isbn: Set(book.isbn),
            cover_image: Set(book.cover_image),
            year_published: Set(book.year_published),
            genre: Set(book.genre),
            start_date: Set(book.start_date),
            end_date: Set(book.end_date),
            reading_status: Set(book.reading_status),
            personal_notes: Set(book.personal_notes),
            rating: Set(book.rating),
            created_at: Set(now.to_rfc3339()),
            updated_at: Set(now.to_rfc3339()),
            ..Default::default()
        };

        let result = new_book.insert(&self.db).await?;
        Ok(Book::from(result))
    }

    async fn update(&self, id: i32, update: BookUpdate) -> Result<Book, DomainError> {
        let existing = BookEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let now = chrono::Utc::now();

        let mut active: ActiveModel = existing.into();
        active.title = Set(update.title);
        active.author = Set(update.author);
        if let Some(isbn) = update.isbn {
            active.isbn = Set(Some(isbn));
        }
        if let Some(year) = update.year_published {
            active.year_published = Set(Some(year));
        }
        if let Some(genre) = update.genre {
            active.genre = Set(Some(genre));
        }
        if let Some(start) = update.start_date {
            active.start_date = Set(Some(start));
        }
        if let Some(end) = update.end_date {
            active.end_date = Set(Some(end));
        }
        if let Some(status) = update.reading_status {
            active.reading_status = Set(Some(status));
        }
        if let Some(notes) = update.personal_notes {
            active.personal_notes = Set(Some(notes));
        }
        if let Some(rating) = update.rating {
            active.rating = Set(Some(rating));
        }
        active.updated_at = Set(now.to_rfc3339());

        let result = active.update(&self.db).await?;
        Ok(Book::from(result))
    }

    async fn delete(&self, id: i32) -> Result<Book, DomainError> {
        let existing = BookEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let removed = Book::from(existing.clone());
        let result = existing.delete(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        Ok(removed)
    }

    async fn delete_all(&self) -> Result<u64, DomainError> {
        let result = BookEntity::delete_many().exec(&self.db).await?;
        Ok(result.rows_affected)
    }

    async fn count(&self) -> Result<u64, DomainError> {
        Ok(BookEntity::find().count(&self.db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db;

    async fn repo() -> SeaOrmBookRepository {
        let db = db::init_db("sqlite::memory:")
            .await
            .expect("Failed to init DB");
        SeaOrmBookRepository::new(db)
    }

    fn new_book(title: &str, author: &str, isbn: Option<&str>) -> NewBook {
        NewBook {
            title: title.to_string(),
            author: author.to_string(),
            isbn: isbn.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn duplicate_isbn_is_a_conflict() {
        let repo = repo().await;
        repo.create(new_book("Dune", "Frank Herbert", Some("9780441013593")))
            .await
            .expect("first insert");

        let err = repo
            .create(new_book("Dune (again)", "Frank Herbert", Some("9780441013593")))
            .await
            .expect_err("duplicate ISBN must be rejected");
        assert!(matches!(err, DomainError::Conflict(_)), "got {err:?}");
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn books_without_isbn_do_not_collide() {
        let repo = repo().await;
        repo.create(new_book("A", "X", None)).await.unwrap();
        repo.create(new_book("B", "Y", None)).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn update_only_touches_supplied_fields() {
        let repo = repo().await;
        let created = repo
            .create(NewBook {
                genre: Some("Sci-Fi".to_string()),
                rating: Some(4),
                ..new_book("Solaris", "Lem", None)
            })
            .await
            .unwrap();

        let updated = repo
            .update(
                created.id,
                BookUpdate {
                    title: "Solaris (ed. 2)".to_string(),
                    author: "Stanisław Lem".to_string(),
                    rating: Some(5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Solaris (ed. 2)");
        assert_eq!(updated.author, "Stanisław Lem");
        assert_eq!(updated.rating, Some(5));
        assert_eq!(updated.genre.as_deref(), Some("Sci-Fi"));
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let repo = repo().await;
        let err = repo.delete(42).await.expect_err("nothing to delete");
        assert!(matches!(err, DomainError::NotFound));
    }

    #[tokio::test]
    async fn filters_and_sorting() {
        let repo = repo().await;
        repo.create(NewBook {
            reading_status: Some("completed".to_string()),
            ..new_book("Beta", "Calvino", None)
        })
        .await
        .unwrap();
        repo.create(new_book("Alpha", "Eco", Some("111"))).await.unwrap();

        let completed = repo
            .find_all(BookFilter {
                status: Some("completed".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].title, "Beta");

        let by_author = repo
            .find_all(BookFilter {
                query: Some("Eco".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_author.len(), 1);

        let sorted = repo
            .find_all(BookFilter {
                sort: Some("title_asc".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        let titles: Vec<_> = sorted.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Beta"]);

        assert!(repo.find_by_isbn("111").await.unwrap().is_some());
        assert!(repo.find_by_isbn("999").await.unwrap().is_none());
    }
}
