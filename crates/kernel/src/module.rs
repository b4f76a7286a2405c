use async_trait::async_trait;
use axum::Router;
use sqlx::SqlitePool;

use crate::settings::Settings;

/// Borrowed handles every module hook receives.
pub struct InitCtx<'a> {
    pub settings: &'a Settings,
    pub db: &'a SqlitePool,
}

/// One schema step owned by a module.
///
/// `id` only needs to be unique within its module; the ledger key is
/// `(module name, id)`. `up` may hold several statements.
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// A slice of the bookshop: its tables, its routes, its API docs.
///
/// Hooks run in registration order, except `stop`, which runs in reverse.
#[async_trait]
pub trait Module: Sync + Send {
    /// Also the mount point: routes are served under `/api/{name}`.
    fn name(&self) -> &'static str;

    /// Runs once migrations are applied and before any route is built.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    fn routes(&self, _ctx: &InitCtx<'_>) -> Router {
        Router::new()
    }

    /// OpenAPI fragment with module-relative `paths` and shared `components`.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Applied in the order returned.
    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
