//! One OpenAPI document assembled from every module's fragment.

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use utoipa::openapi::{InfoBuilder, OpenApi, OpenApiBuilder};
use utoipa_swagger_ui::SwaggerUi;

use bookshop_kernel::ModuleRegistry;

const TITLE: &str = "Bookshop API";
const VERSION: &str = "1.0.0";

/// Merge module fragments under `/api/{module}`.
///
/// A module's `"/"` path becomes the bare prefix. Schemas share one
/// `components.schemas` map, so later modules may reference earlier ones.
pub fn merged_openapi(registry: &ModuleRegistry) -> Value {
    let mut doc = json!({
        "openapi": "3.1.0",
        "info": {
            "title": TITLE,
            "version": VERSION,
            "description": "Catalog and stock administration"
        },
        "paths": {
            "/healthz": {
                "get": {
                    "summary": "Liveness probe",
                    "responses": {
                        "200": { "description": "OK", "content": { "text/plain": { "schema": { "type": "string" } } } }
                    }
                }
            }
        },
        "components": {
            "schemas": { "ErrorResponse": error_schema() },
            "securitySchemes": {
                "bearer": { "type": "http", "scheme": "bearer" }
            }
        }
    });

    for module in registry.modules() {
        let Some(fragment) = module.openapi() else {
            continue;
        };

        for (path, item) in fragment["paths"].as_object().into_iter().flatten() {
            let suffix = if path == "/" { "" } else { path.as_str() };
            doc["paths"][format!("/api/{}{}", module.name(), suffix)] = item.clone();
        }

        let schemas = fragment["components"]["schemas"].as_object();
        for (name, schema) in schemas.into_iter().flatten() {
            doc["components"]["schemas"][name] = schema.clone();
        }
    }

    doc
}

fn error_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "error": {
                "type": "object",
                "properties": {
                    "code": { "type": "string" },
                    "message": { "type": "string" },
                    "details": { "type": "array", "items": {} },
                    "trace_id": { "type": "string", "format": "uuid" },
                    "timestamp": { "type": "string", "format": "date-time" }
                },
                "required": ["code", "message", "details", "trace_id", "timestamp"]
            }
        },
        "required": ["error"]
    })
}

/// Routes serving the document: raw JSON plus Swagger UI.
pub fn docs_router(doc: Value) -> Router {
    let typed: OpenApi = serde_json::from_value(doc.clone()).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "merged OpenAPI document did not parse; Swagger UI gets a stub");
        OpenApiBuilder::new()
            .info(InfoBuilder::new().title(TITLE).version(VERSION).build())
            .build()
    });

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", typed))
        .route("/docs/openapi.json", get(move || async move { Json(doc) }))
}
