use async_trait::async_trait;
use sqlx::SqlitePool;

use bookshop_db::RepositoryError;

use super::models::{Book, BookId, BookInput, BookListing};

#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Every book with its genre name, ordered by id.
    async fn books(&self) -> Result<Vec<BookListing>, RepositoryError>;

    async fn book_by_id(&self, id: BookId) -> Result<Option<Book>, RepositoryError>;

    /// Expects normalized, validated input. `Conflict` on an unknown genre.
    async fn add_book(&self, input: &BookInput) -> Result<BookId, RepositoryError>;

    /// `NotFound` when no book has `book.id`.
    async fn update_book(&self, book: &Book) -> Result<(), RepositoryError>;

    /// Removes the book together with its stock row.
    async fn delete_book(&self, id: BookId) -> Result<(), RepositoryError>;
}

#[derive(Clone)]
pub struct SqliteBookRepository {
    pool: SqlitePool,
}

impl SqliteBookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for SqliteBookRepository {
    async fn books(&self) -> Result<Vec<BookListing>, RepositoryError> {
        let books = sqlx::query_as::<_, BookListing>(
            r#"
            SELECT b.id, b.name, b.author, b.genre_id, g.name AS genre_name, b.price, b.image
            FROM book b
            JOIN genre g ON g.id = b.genre_id
            ORDER BY b.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    async fn book_by_id(&self, id: BookId) -> Result<Option<Book>, RepositoryError> {
        let book = sqlx::query_as::<_, Book>(
            "SELECT id, name, author, genre_id, price, image FROM book WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }

    async fn add_book(&self, input: &BookInput) -> Result<BookId, RepositoryError> {
        let id = sqlx::query_scalar::<_, BookId>(
            r#"
            INSERT INTO book (name, author, genre_id, price, image)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id
            "#,
        )
        .bind(&input.name)
        .bind(&input.author)
        .bind(input.genre_id)
        .bind(input.price)
        .bind(&input.image)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update_book(&self, book: &Book) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE book
            SET name = ?1, author = ?2, genre_id = ?3, price = ?4, image = ?5
            WHERE id = ?6
            "#,
        )
        .bind(&book.name)
        .bind(&book.author)
        .bind(book.genre_id)
        .bind(book.price)
        .bind(&book.image)
        .bind(book.id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("book", book.id.0));
        }
        Ok(())
    }

    async fn delete_book(&self, id: BookId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM book WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("book", id.0));
        }
        Ok(())
    }
}
