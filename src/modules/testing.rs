//! Fixtures for repository and workflow tests.

use sqlx::SqlitePool;

use bookshop_kernel::settings::DatabaseSettings;

use crate::modules::books::models::BookId;
use crate::modules::genres::models::GenreId;

/// Fresh in-memory database with every module migration applied.
pub async fn migrated_pool() -> SqlitePool {
    let registry = crate::registry().unwrap();
    crate::open_database(&DatabaseSettings::in_memory(), &registry)
        .await
        .unwrap()
}

pub async fn seed_genre(pool: &SqlitePool, name: &str) -> GenreId {
    sqlx::query_scalar("INSERT INTO genre (name) VALUES (?1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn seed_book_in(pool: &SqlitePool, genre_id: GenreId, name: &str, author: &str) -> BookId {
    sqlx::query_scalar(
        "INSERT INTO book (name, author, genre_id, price) VALUES (?1, ?2, ?3, 9.99) RETURNING id",
    )
    .bind(name)
    .bind(author)
    .bind(genre_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Book in a throwaway genre.
pub async fn seed_book(pool: &SqlitePool, name: &str, author: &str) -> BookId {
    let genre_id = seed_genre(pool, "General").await;
    seed_book_in(pool, genre_id, name, author).await
}
