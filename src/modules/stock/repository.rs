use async_trait::async_trait;
use sqlx::SqlitePool;

use bookshop_db::RepositoryError;

use super::models::{Stock, StockUpdateRequest, StockView};
use crate::modules::books::models::BookId;
use crate::utils::contains_ignore_case;

/// Read/write access to per-book stock rows.
#[async_trait]
pub trait StockRepository: Send + Sync {
    /// Current stock row for a book; `None` when it was never stocked.
    async fn stock_by_book_id(&self, book_id: BookId) -> Result<Option<Stock>, RepositoryError>;

    /// Every book with its quantity, ordered by book id.
    ///
    /// With a search term, only books whose name contains it
    /// (case-insensitive) are returned.
    async fn stocks(&self, search_term: Option<&str>) -> Result<Vec<StockView>, RepositoryError>;

    /// Create the book's stock row or overwrite its quantity.
    async fn manage_stock(&self, request: &StockUpdateRequest) -> Result<(), RepositoryError>;
}

#[derive(Clone)]
pub struct SqliteStockRepository {
    pool: SqlitePool,
}

impl SqliteStockRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StockRepository for SqliteStockRepository {
    async fn stock_by_book_id(&self, book_id: BookId) -> Result<Option<Stock>, RepositoryError> {
        let stock = sqlx::query_as::<_, Stock>(
            "SELECT id, book_id, quantity FROM stock WHERE book_id = ?1",
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(stock)
    }

    async fn stocks(&self, search_term: Option<&str>) -> Result<Vec<StockView>, RepositoryError> {
        let views = sqlx::query_as::<_, StockView>(
            r#"
            SELECT b.id AS book_id,
                   b.name AS book_name,
                   b.author,
                   COALESCE(s.quantity, 0) AS quantity
            FROM book b
            LEFT JOIN stock s ON s.book_id = b.id
            ORDER BY b.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(match search_term {
            Some(term) => views
                .into_iter()
                .filter(|view| contains_ignore_case(&view.book_name, term))
                .collect(),
            None => views,
        })
    }

    async fn manage_stock(&self, request: &StockUpdateRequest) -> Result<(), RepositoryError> {
        // Single statement: the existence check and the write cannot interleave
        // with another upsert for the same book. Last writer wins.
        sqlx::query(
            r#"
            INSERT INTO stock (book_id, quantity)
            VALUES (?1, ?2)
            ON CONFLICT (book_id) DO UPDATE SET quantity = excluded.quantity
            "#,
        )
        .bind(request.book_id)
        .bind(request.quantity)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
