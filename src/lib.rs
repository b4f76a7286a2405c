//! Bookshop application library
//!
//! Domain modules (genres, books, stock, catalog) plus the bootstrap shared by
//! the `bookshop-app` binary and the admin CLI.

pub mod modules;
pub mod utils;

use anyhow::Context;
use sqlx::SqlitePool;

use bookshop_kernel::settings::{DatabaseSettings, Settings};
use bookshop_kernel::{InitCtx, ModuleRegistry};

pub use modules::register_all;

/// Registry holding every bookshop module.
pub fn registry() -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    register_all(&mut registry).context("failed to register modules")?;
    Ok(registry)
}

/// Open the database and apply any pending module migrations.
pub async fn open_database(
    settings: &DatabaseSettings,
    registry: &ModuleRegistry,
) -> anyhow::Result<SqlitePool> {
    let pool = bookshop_db::connect(settings).await?;
    let applied = bookshop_db::migrate(&pool, &registry.collect_migrations())
        .await
        .context("failed to apply migrations")?;
    tracing::info!(applied, "migrations complete");
    Ok(pool)
}

/// Run the HTTP service until shutdown: migrate, init, start, serve, stop.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let registry = registry()?;
    let pool = open_database(&settings.database, &registry).await?;
    let ctx = InitCtx {
        settings,
        db: &pool,
    };

    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let served = bookshop_http::start_server(&registry, &ctx).await;

    registry.stop_modules().await?;
    pool.close().await;
    served
}
