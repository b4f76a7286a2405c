use async_trait::async_trait;
use sqlx::SqlitePool;

use bookshop_db::RepositoryError;

use super::models::{Genre, GenreId};

#[async_trait]
pub trait GenreRepository: Send + Sync {
    /// All genres ordered by name.
    async fn genres(&self) -> Result<Vec<Genre>, RepositoryError>;

    async fn genre_by_id(&self, id: GenreId) -> Result<Option<Genre>, RepositoryError>;

    async fn add_genre(&self, name: &str) -> Result<GenreId, RepositoryError>;

    /// `NotFound` when no genre has `genre.id`.
    async fn update_genre(&self, genre: &Genre) -> Result<(), RepositoryError>;

    /// `NotFound` when absent, `Conflict` while books still reference it.
    async fn delete_genre(&self, id: GenreId) -> Result<(), RepositoryError>;
}

#[derive(Clone)]
pub struct SqliteGenreRepository {
    pool: SqlitePool,
}

impl SqliteGenreRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GenreRepository for SqliteGenreRepository {
    async fn genres(&self) -> Result<Vec<Genre>, RepositoryError> {
        let genres = sqlx::query_as::<_, Genre>("SELECT id, name FROM genre ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(genres)
    }

    async fn genre_by_id(&self, id: GenreId) -> Result<Option<Genre>, RepositoryError> {
        let genre = sqlx::query_as::<_, Genre>("SELECT id, name FROM genre WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(genre)
    }

    async fn add_genre(&self, name: &str) -> Result<GenreId, RepositoryError> {
        let id = sqlx::query_scalar::<_, GenreId>("INSERT INTO genre (name) VALUES (?1) RETURNING id")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(id)
    }

    async fn update_genre(&self, genre: &Genre) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE genre SET name = ?1 WHERE id = ?2")
            .bind(&genre.name)
            .bind(genre.id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("genre", genre.id.0));
        }
        Ok(())
    }

    async fn delete_genre(&self, id: GenreId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let in_use: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM book WHERE genre_id = ?1)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if in_use {
            return Err(RepositoryError::Conflict {
                message: format!("genre {id} is still assigned to books"),
            });
        }

        let result = sqlx::query("DELETE FROM genre WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("genre", id.0));
        }

        tx.commit().await?;
        Ok(())
    }
}
