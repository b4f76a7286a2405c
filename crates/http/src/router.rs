//! Router builder for the bookshop HTTP server

use std::time::Duration;

use axum::{extract::Request, http::HeaderValue, routing::MethodRouter, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use uuid::Uuid;

use bookshop_kernel::ModuleRegistry;

use crate::openapi;

/// Accumulates routes; middleware goes on last so it wraps all of them.
#[derive(Default)]
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, path: &str, handler: MethodRouter) -> Self {
        self.router = self.router.route(path, handler);
        self
    }

    /// Nest a module's router under `/api/{module_name}`.
    pub fn mount_module(mut self, module_name: &str, module_router: Router) -> Self {
        self.router = self.router.nest(&format!("/api/{module_name}"), module_router);
        self
    }

    /// Serve the merged OpenAPI document and Swagger UI.
    pub fn with_openapi(mut self, registry: &ModuleRegistry) -> Self {
        let docs = openapi::docs_router(openapi::merged_openapi(registry));
        self.router = self.router.merge(docs);
        self
    }

    /// Wrap everything routed so far.
    ///
    /// Outermost first: request id assignment, tracing, id propagation to the
    /// response, CORS, then the per-request timeout.
    pub fn with_middleware(mut self, request_timeout_ms: u64) -> Self {
        let stack = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().include_headers(true))
                    .on_request(DefaultOnRequest::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .layer(TimeoutLayer::new(Duration::from_millis(request_timeout_ms)));

        self.router = self.router.layer(stack);
        self
    }

    pub fn build(self) -> Router {
        self.router
    }
}

/// Request ids are time-ordered UUIDv7 strings.
#[derive(Clone, Copy)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = HeaderValue::from_str(&Uuid::now_v7().to_string()).ok()?;
        Some(RequestId::new(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, routing::get};
    use tower::ServiceExt;

    fn get_request(uri: &str) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn module_router_is_nested_under_api() {
        let module_router = Router::new().route("/", get(|| async { "module" }));

        let router = RouterBuilder::new()
            .mount_module("genres", module_router)
            .build();

        let response = router.oneshot(get_request("/api/genres")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn responses_carry_a_v7_request_id() {
        let router = RouterBuilder::new()
            .route("/healthz", get(|| async { "ok" }))
            .with_middleware(5000)
            .build();

        let response = router.oneshot(get_request("/healthz")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let request_id = response.headers().get("x-request-id").unwrap();
        let parsed = Uuid::parse_str(request_id.to_str().unwrap()).unwrap();
        assert_eq!(parsed.get_version_num(), 7);
    }

    #[tokio::test]
    async fn incoming_request_id_is_echoed() {
        let router = RouterBuilder::new()
            .route("/healthz", get(|| async { "ok" }))
            .with_middleware(5000)
            .build();

        let request = axum::http::Request::builder()
            .uri("/healthz")
            .header("x-request-id", "client-supplied")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.headers()["x-request-id"], "client-supplied");
    }

    #[tokio::test]
    async fn openapi_json_is_served() {
        let router = RouterBuilder::new()
            .with_openapi(&ModuleRegistry::new())
            .build();

        let response = router.oneshot(get_request("/docs/openapi.json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
