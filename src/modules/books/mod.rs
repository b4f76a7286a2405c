pub mod models;
pub mod repository;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshop_authz::{Capability, TokenResolver};
use bookshop_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use crate::modules::genres::repository::SqliteGenreRepository;
use repository::SqliteBookRepository;

/// Books module: catalog administration for individual titles
pub struct BooksModule;

impl BooksModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self, ctx: &InitCtx<'_>) -> Router {
        let state = routes::BooksState {
            books: Arc::new(SqliteBookRepository::new(ctx.db.clone())),
            genres: Arc::new(SqliteGenreRepository::new(ctx.db.clone())),
        };
        bookshop_http::auth::require_capability(
            routes::router(state),
            Arc::new(TokenResolver::from_settings(&ctx.settings.auth)),
            Capability::ManageCatalog,
        )
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = json!({ "$ref": "#/components/schemas/ErrorResponse" });
        let book = json!({ "$ref": "#/components/schemas/Book" });
        let book_input = json!({
            "required": true,
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/BookInput" } } }
        });
        let id_param = json!([{
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer", "format": "int64" }
        }]);

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "security": [{ "bearer": [] }],
                        "responses": {
                            "200": {
                                "description": "List of books with genre names",
                                "content": {
                                    "application/json": {
                                        "schema": { "type": "array", "items": { "$ref": "#/components/schemas/BookListing" } }
                                    }
                                }
                            },
                            "500": { "description": "Internal server error", "content": { "application/json": { "schema": error } } }
                        }
                    },
                    "post": {
                        "summary": "Add a book",
                        "tags": ["Books"],
                        "security": [{ "bearer": [] }],
                        "requestBody": book_input,
                        "responses": {
                            "201": { "description": "Book added", "content": { "application/json": { "schema": book } } },
                            "422": { "description": "Validation error or unknown genre", "content": { "application/json": { "schema": error } } }
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "security": [{ "bearer": [] }],
                        "parameters": id_param,
                        "responses": {
                            "200": { "description": "Book", "content": { "application/json": { "schema": book } } },
                            "404": { "description": "Book not found", "content": { "application/json": { "schema": error } } }
                        }
                    },
                    "put": {
                        "summary": "Replace a book",
                        "tags": ["Books"],
                        "security": [{ "bearer": [] }],
                        "parameters": id_param,
                        "requestBody": book_input,
                        "responses": {
                            "200": { "description": "Book updated", "content": { "application/json": { "schema": book } } },
                            "404": { "description": "Book not found", "content": { "application/json": { "schema": error } } },
                            "422": { "description": "Validation error or unknown genre", "content": { "application/json": { "schema": error } } }
                        }
                    },
                    "delete": {
                        "summary": "Delete a book and its stock record",
                        "tags": ["Books"],
                        "security": [{ "bearer": [] }],
                        "parameters": id_param,
                        "responses": {
                            "204": { "description": "Book deleted" },
                            "404": { "description": "Book not found", "content": { "application/json": { "schema": error } } }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "name": { "type": "string" },
                            "author": { "type": "string" },
                            "genre_id": { "type": "integer", "format": "int64" },
                            "price": { "type": "number", "minimum": 0 },
                            "image": { "type": "string", "nullable": true }
                        },
                        "required": ["id", "name", "author", "genre_id", "price"]
                    },
                    "BookListing": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "name": { "type": "string" },
                            "author": { "type": "string" },
                            "genre_id": { "type": "integer", "format": "int64" },
                            "genre_name": { "type": "string" },
                            "price": { "type": "number" },
                            "image": { "type": "string", "nullable": true }
                        },
                        "required": ["id", "name", "author", "genre_id", "genre_name", "price"]
                    },
                    "BookInput": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string", "minLength": 1, "maxLength": 40 },
                            "author": { "type": "string", "minLength": 1, "maxLength": 40 },
                            "genre_id": { "type": "integer", "format": "int64" },
                            "price": { "type": "number", "minimum": 0 },
                            "image": { "type": "string", "nullable": true, "maxLength": 255 }
                        },
                        "required": ["name", "author", "genre_id", "price"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE book (
                    id       INTEGER PRIMARY KEY AUTOINCREMENT,
                    name     TEXT    NOT NULL CHECK (length(trim(name)) > 0),
                    author   TEXT    NOT NULL CHECK (length(trim(author)) > 0),
                    genre_id INTEGER NOT NULL REFERENCES genre (id) ON DELETE RESTRICT,
                    price    REAL    NOT NULL CHECK (price >= 0),
                    image    TEXT
                );
                CREATE INDEX book_genre_id ON book (genre_id);
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(BooksModule::new())
}
