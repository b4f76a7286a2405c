pub mod models;
pub mod repository;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshop_kernel::{InitCtx, Module};
use serde_json::json;

use crate::modules::genres::repository::SqliteGenreRepository;
use repository::SqliteCatalogRepository;

/// Public storefront listing. Reads only; owns no tables.
pub struct CatalogModule;

impl CatalogModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for CatalogModule {
    fn name(&self) -> &'static str {
        "catalog"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "catalog module initialized"
        );
        Ok(())
    }

    fn routes(&self, ctx: &InitCtx<'_>) -> Router {
        routes::router(routes::CatalogState {
            catalog: Arc::new(SqliteCatalogRepository::new(ctx.db.clone())),
            genres: Arc::new(SqliteGenreRepository::new(ctx.db.clone())),
        })
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "Browse the catalog",
                        "tags": ["Catalog"],
                        "parameters": [
                            {
                                "name": "sterm",
                                "in": "query",
                                "required": false,
                                "description": "Case-insensitive substring of the book name or author",
                                "schema": { "type": "string" }
                            },
                            {
                                "name": "genre_id",
                                "in": "query",
                                "required": false,
                                "description": "Restrict to one genre; 0 means all",
                                "schema": { "type": "integer", "format": "int64" }
                            }
                        ],
                        "responses": {
                            "200": {
                                "description": "Matching books and all genres",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/CatalogPage" }
                                    }
                                }
                            },
                            "500": {
                                "description": "Internal server error",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "CatalogBook": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "name": { "type": "string" },
                            "author": { "type": "string" },
                            "genre_id": { "type": "integer", "format": "int64" },
                            "genre_name": { "type": "string" },
                            "price": { "type": "number" },
                            "image": { "type": "string", "nullable": true },
                            "quantity": { "type": "integer", "format": "int64" }
                        },
                        "required": ["id", "name", "author", "genre_id", "genre_name", "price", "quantity"]
                    },
                    "CatalogPage": {
                        "type": "object",
                        "properties": {
                            "books": { "type": "array", "items": { "$ref": "#/components/schemas/CatalogBook" } },
                            "genres": { "type": "array", "items": { "$ref": "#/components/schemas/Genre" } },
                            "sterm": { "type": "string" },
                            "genre_id": { "type": "integer", "format": "int64" }
                        },
                        "required": ["books", "genres", "sterm", "genre_id"]
                    }
                }
            }
        }))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "catalog module stopped");
        Ok(())
    }
}

/// Create a new instance of the catalog module
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(CatalogModule::new())
}
