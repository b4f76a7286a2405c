pub mod models;
pub mod repository;
pub mod routes;
pub mod workflow;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshop_authz::{Capability, TokenResolver};
use bookshop_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use crate::modules::books::repository::SqliteBookRepository;
use repository::SqliteStockRepository;
use workflow::StockWorkflow;

/// Stock module: per-book quantities and the stock listing
pub struct StockModule;

impl StockModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for StockModule {
    fn name(&self) -> &'static str {
        "stock"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let unstocked: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book b LEFT JOIN stock s ON s.book_id = b.id WHERE s.id IS NULL",
        )
        .fetch_one(ctx.db)
        .await?;

        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            unstocked_books = unstocked,
            "stock module initialized"
        );
        Ok(())
    }

    fn routes(&self, ctx: &InitCtx<'_>) -> Router {
        let state = routes::StockState {
            workflow: StockWorkflow::new(Arc::new(SqliteStockRepository::new(ctx.db.clone()))),
            books: Arc::new(SqliteBookRepository::new(ctx.db.clone())),
        };
        bookshop_http::auth::require_capability(
            routes::router(state),
            Arc::new(TokenResolver::from_settings(&ctx.settings.auth)),
            Capability::ManageStock,
        )
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = json!({ "$ref": "#/components/schemas/ErrorResponse" });
        let book_id_param = json!({
            "name": "book_id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer", "format": "int64" }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List stock levels",
                        "description": "Every book with its quantity. Books never stocked report 0.",
                        "tags": ["Stock"],
                        "security": [{ "bearer": [] }],
                        "parameters": [{
                            "name": "sterm",
                            "in": "query",
                            "required": false,
                            "description": "Case-insensitive substring of the book name",
                            "schema": { "type": "string" }
                        }],
                        "responses": {
                            "200": {
                                "description": "Stock views ordered by book id",
                                "content": {
                                    "application/json": {
                                        "schema": { "type": "array", "items": { "$ref": "#/components/schemas/StockView" } }
                                    }
                                }
                            },
                            "401": { "description": "Missing or unknown token", "content": { "application/json": { "schema": error } } }
                        }
                    }
                },
                "/{book_id}": {
                    "get": {
                        "summary": "Get the stock level of one book",
                        "tags": ["Stock"],
                        "security": [{ "bearer": [] }],
                        "parameters": [book_id_param],
                        "responses": {
                            "200": { "description": "Current level", "content": { "application/json": { "schema": { "$ref": "#/components/schemas/StockLevel" } } } },
                            "404": { "description": "Book not found", "content": { "application/json": { "schema": error } } }
                        }
                    },
                    "put": {
                        "summary": "Set the stock quantity of one book",
                        "description": "Creates the stock record on first use, otherwise overwrites the quantity.",
                        "tags": ["Stock"],
                        "security": [{ "bearer": [] }],
                        "parameters": [book_id_param],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/StockInput" } } }
                        },
                        "responses": {
                            "200": { "description": "Stock updated", "content": { "application/json": { "schema": { "$ref": "#/components/schemas/StockUpdated" } } } },
                            "404": { "description": "Book not found", "content": { "application/json": { "schema": error } } },
                            "422": { "description": "Negative quantity", "content": { "application/json": { "schema": error } } },
                            "503": { "description": "Stock could not be updated", "content": { "application/json": { "schema": error } } }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "StockView": {
                        "type": "object",
                        "properties": {
                            "book_id": { "type": "integer", "format": "int64" },
                            "book_name": { "type": "string" },
                            "author": { "type": "string" },
                            "quantity": { "type": "integer", "format": "int64", "minimum": 0 }
                        },
                        "required": ["book_id", "book_name", "author", "quantity"]
                    },
                    "StockLevel": {
                        "type": "object",
                        "properties": {
                            "book_id": { "type": "integer", "format": "int64" },
                            "quantity": { "type": "integer", "format": "int64", "minimum": 0 }
                        },
                        "required": ["book_id", "quantity"]
                    },
                    "StockInput": {
                        "type": "object",
                        "properties": {
                            "quantity": { "type": "integer", "format": "int64", "minimum": 0 }
                        },
                        "required": ["quantity"]
                    },
                    "StockUpdated": {
                        "type": "object",
                        "properties": {
                            "outcome": { "type": "string", "enum": ["updated"] },
                            "book_id": { "type": "integer", "format": "int64" },
                            "quantity": { "type": "integer", "format": "int64" },
                            "message": { "type": "string" }
                        },
                        "required": ["outcome", "book_id", "quantity", "message"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE stock (
                    id       INTEGER PRIMARY KEY AUTOINCREMENT,
                    book_id  INTEGER NOT NULL UNIQUE REFERENCES book (id) ON DELETE CASCADE,
                    quantity INTEGER NOT NULL CHECK (quantity >= 0)
                );
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "stock module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "stock module stopped");
        Ok(())
    }
}

/// Create a new instance of the stock module
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(StockModule::new())
}
