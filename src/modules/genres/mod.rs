pub mod models;
pub mod repository;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshop_authz::{Capability, TokenResolver};
use bookshop_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use repository::SqliteGenreRepository;

/// Genre administration: plain CRUD behind the catalog capability.
pub struct GenresModule;

impl GenresModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for GenresModule {
    fn name(&self) -> &'static str {
        "genres"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "genres module initialized"
        );
        Ok(())
    }

    fn routes(&self, ctx: &InitCtx<'_>) -> Router {
        let repo: routes::GenreState = Arc::new(SqliteGenreRepository::new(ctx.db.clone()));
        bookshop_http::auth::require_capability(
            routes::router(repo),
            Arc::new(TokenResolver::from_settings(&ctx.settings.auth)),
            Capability::ManageCatalog,
        )
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = json!({ "$ref": "#/components/schemas/ErrorResponse" });
        let genre = json!({ "$ref": "#/components/schemas/Genre" });
        let genre_input = json!({
            "required": true,
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/GenreInput" } } }
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
                        "summary": "List genres",
                        "tags": ["Genres"],
                        "security": [{ "bearer": [] }],
                        "responses": {
                            "200": {
                                "description": "All genres ordered by name",
                                "content": { "application/json": { "schema": { "type": "array", "items": genre } } }
                            },
                            "401": { "description": "Missing or unknown token", "content": { "application/json": { "schema": error } } }
                        }
                    },
                    "post": {
                        "summary": "Add a genre",
                        "tags": ["Genres"],
                        "security": [{ "bearer": [] }],
                        "requestBody": genre_input,
                        "responses": {
                            "201": { "description": "Genre added", "content": { "application/json": { "schema": genre } } },
                            "422": { "description": "Validation error", "content": { "application/json": { "schema": error } } }
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a genre",
                        "tags": ["Genres"],
                        "security": [{ "bearer": [] }],
                        "parameters": id_param,
                        "responses": {
                            "200": { "description": "Genre", "content": { "application/json": { "schema": genre } } },
                            "404": { "description": "Genre not found", "content": { "application/json": { "schema": error } } }
                        }
                    },
                    "put": {
                        "summary": "Rename a genre",
                        "tags": ["Genres"],
                        "security": [{ "bearer": [] }],
                        "parameters": id_param,
                        "requestBody": genre_input,
                        "responses": {
                            "200": { "description": "Genre updated", "content": { "application/json": { "schema": genre } } },
                            "404": { "description": "Genre not found", "content": { "application/json": { "schema": error } } },
                            "422": { "description": "Validation error", "content": { "application/json": { "schema": error } } }
                        }
                    },
                    "delete": {
                        "summary": "Delete a genre",
                        "tags": ["Genres"],
                        "security": [{ "bearer": [] }],
                        "parameters": id_param,
                        "responses": {
                            "204": { "description": "Genre deleted" },
                            "404": { "description": "Genre not found", "content": { "application/json": { "schema": error } } },
                            "409": { "description": "Genre still assigned to books", "content": { "application/json": { "schema": error } } }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Genre": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "name": { "type": "string", "maxLength": 40 }
                        },
                        "required": ["id", "name"]
                    },
                    "GenreInput": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string", "minLength": 1, "maxLength": 40 }
                        },
                        "required": ["name"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE genre (
                    id   INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL CHECK (length(trim(name)) > 0)
                );
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "genres module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "genres module stopped");
        Ok(())
    }
}

/// Create a new instance of the genres module
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(GenresModule::new())
}
