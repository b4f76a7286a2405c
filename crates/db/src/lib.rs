//! SQLite access for the bookshop service: pool factory, migration runner,
//! and the error type shared by every repository.

use std::str::FromStr;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use bookshop_kernel::settings::DatabaseSettings;
use bookshop_kernel::Migration;

pub mod error;

pub use error::RepositoryError;

/// Open a connection pool for the configured database.
///
/// Foreign keys are switched on for every connection; the schema relies on
/// them for the book/genre and stock/book relationships.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&settings.url)
        .with_context(|| format!("invalid database url '{}'", settings.url))?
        .foreign_keys(true);

    // In-memory databases vanish with their connection, so never recycle it.
    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .with_context(|| format!("failed to open database '{}'", settings.url))?;

    tracing::info!(target: "bookshop-db", url = %settings.url, "database pool ready");
    Ok(pool)
}

/// Apply every migration not yet recorded in the `_migrations` ledger.
///
/// Each migration runs in its own transaction together with its ledger row,
/// so a failed migration leaves neither partial schema nor a ledger entry.
/// Returns the number of migrations applied by this call.
pub async fn migrate(pool: &SqlitePool, migrations: &[(String, Migration)]) -> anyhow::Result<usize> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            module     TEXT NOT NULL,
            id         TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (module, id)
        )
        "#,
    )
    .execute(pool)
    .await
    .context("failed to create _migrations table")?;

    let mut applied = 0;
    for (module, migration) in migrations {
        let already_applied: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM _migrations WHERE module = ?1 AND id = ?2")
                .bind(module)
                .bind(migration.id)
                .fetch_optional(pool)
                .await
                .with_context(|| format!("failed to read ledger for {}/{}", module, migration.id))?;

        if already_applied.is_some() {
            tracing::debug!(target: "bookshop-db", %module, id = migration.id, "migration already applied");
            continue;
        }

        let mut tx = pool.begin().await.context("failed to begin migration transaction")?;
        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("migration {}/{} failed", module, migration.id))?;
        sqlx::query("INSERT INTO _migrations (module, id) VALUES (?1, ?2)")
            .bind(module)
            .bind(migration.id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to record migration {}/{}", module, migration.id))?;
        tx.commit()
            .await
            .with_context(|| format!("failed to commit migration {}/{}", module, migration.id))?;

        tracing::info!(target: "bookshop-db", %module, id = migration.id, "migration applied");
        applied += 1;
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget_migrations() -> Vec<(String, Migration)> {
        vec![(
            "widgets".to_string(),
            Migration {
                id: "001_init",
                up: "CREATE TABLE widget (id INTEGER PRIMARY KEY); CREATE INDEX widget_id ON widget (id);",
            },
        )]
    }

    #[tokio::test]
    async fn migrations_apply_once() {
        let pool = connect(&DatabaseSettings::in_memory()).await.unwrap();

        assert_eq!(migrate(&pool, &widget_migrations()).await.unwrap(), 1);
        assert_eq!(migrate(&pool, &widget_migrations()).await.unwrap(), 0);

        let recorded: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _migrations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(recorded, 1);
    }

    #[tokio::test]
    async fn failed_migration_is_not_recorded() {
        let pool = connect(&DatabaseSettings::in_memory()).await.unwrap();
        let broken = vec![(
            "broken".to_string(),
            Migration {
                id: "001_init",
                up: "CREATE TABLE ok_table (id INTEGER); NOT VALID SQL;",
            },
        )];

        let err = migrate(&pool, &broken).await.unwrap_err();
        assert!(err.to_string().contains("migration broken/001_init failed"));

        let recorded: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _migrations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(recorded, 0);
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let pool = connect(&DatabaseSettings::in_memory()).await.unwrap();
        sqlx::raw_sql(
            "CREATE TABLE parent (id INTEGER PRIMARY KEY);
             CREATE TABLE child (id INTEGER PRIMARY KEY, parent_id INTEGER NOT NULL REFERENCES parent (id));",
        )
        .execute(&pool)
        .await
        .unwrap();

        let err = sqlx::query("INSERT INTO child (parent_id) VALUES (42)")
            .execute(&pool)
            .await
            .unwrap_err();
        assert!(matches!(RepositoryError::from(err), RepositoryError::Conflict { .. }));
    }

    #[tokio::test]
    async fn restricted_delete_is_a_conflict() {
        let pool = connect(&DatabaseSettings::in_memory()).await.unwrap();
        sqlx::raw_sql(
            "CREATE TABLE parent (id INTEGER PRIMARY KEY);
             CREATE TABLE child (
                 id INTEGER PRIMARY KEY,
                 parent_id INTEGER NOT NULL REFERENCES parent (id) ON DELETE RESTRICT
             );
             INSERT INTO parent (id) VALUES (1);
             INSERT INTO child (parent_id) VALUES (1);",
        )
        .execute(&pool)
        .await
        .unwrap();

        let err = sqlx::query("DELETE FROM parent WHERE id = 1")
            .execute(&pool)
            .await
            .unwrap_err();
        assert!(matches!(RepositoryError::from(err), RepositoryError::Conflict { .. }));

        let parents: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM parent")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(parents, 1);
    }
}
