use async_trait::async_trait;
use sqlx::SqlitePool;

use bookshop_db::RepositoryError;

use super::models::CatalogBook;
use crate::modules::genres::models::GenreId;
use crate::utils::contains_ignore_case;

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Books matching a name/author term and a genre, ordered by id.
    async fn books(
        &self,
        search_term: Option<&str>,
        genre_id: Option<GenreId>,
    ) -> Result<Vec<CatalogBook>, RepositoryError>;
}

#[derive(Clone)]
pub struct SqliteCatalogRepository {
    pool: SqlitePool,
}

impl SqliteCatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogRepository for SqliteCatalogRepository {
    async fn books(
        &self,
        search_term: Option<&str>,
        genre_id: Option<GenreId>,
    ) -> Result<Vec<CatalogBook>, RepositoryError> {
        let books = sqlx::query_as::<_, CatalogBook>(
            r#"
            SELECT b.id, b.name, b.author, b.genre_id, g.name AS genre_name, b.price, b.image,
                   COALESCE(s.quantity, 0) AS quantity
            FROM book b
            JOIN genre g ON g.id = b.genre_id
            LEFT JOIN stock s ON s.book_id = b.id
            WHERE ?1 IS NULL OR b.genre_id = ?1
            ORDER BY b.id
            "#,
        )
        .bind(genre_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(match search_term {
            Some(term) => books
                .into_iter()
                .filter(|book| {
                    contains_ignore_case(&book.name, term) || contains_ignore_case(&book.author, term)
                })
                .collect(),
            None => books,
        })
    }
}
