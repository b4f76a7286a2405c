//! End-to-end checks through the assembled router against in-memory SQLite.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use bookshop_kernel::settings::{AuthSettings, DatabaseSettings, Settings};
use bookshop_kernel::InitCtx;

const ADMIN: &str = "admin-token";
const CUSTOMER: &str = "customer-token";

async fn app() -> Router {
    let settings = Settings {
        database: DatabaseSettings::in_memory(),
        auth: AuthSettings {
            admin_tokens: vec![ADMIN.to_string()],
            customer_tokens: vec![CUSTOMER.to_string()],
        },
        ..Settings::default()
    };
    let registry = bookshop_app::registry().unwrap();
    let pool = bookshop_app::open_database(&settings.database, &registry)
        .await
        .unwrap();
    let ctx = InitCtx {
        settings: &settings,
        db: &pool,
    };
    registry.init_modules(&ctx).await.unwrap();
    bookshop_http::build_router(&registry, &ctx)
}

async fn call(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

async fn admin(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    call(app, method, uri, Some(ADMIN), body).await
}

async fn seed_dune(app: &Router) -> i64 {
    let (status, genre) = admin(app, Method::POST, "/api/genres", Some(json!({"name": "Science Fiction"}))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, book) = admin(
        app,
        Method::POST,
        "/api/books",
        Some(json!({
            "name": "Dune",
            "author": "Frank Herbert",
            "genre_id": genre["id"],
            "price": 9.99
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    book["id"].as_i64().unwrap()
}

#[tokio::test]
async fn health_and_openapi_are_public() {
    let app = app().await;

    let (status, body) = call(&app, Method::GET, "/healthz", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".to_string()));

    let (status, doc) = call(&app, Method::GET, "/docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/stock/{book_id}"]["put"].is_object());
    assert!(doc["components"]["schemas"]["StockView"].is_object());
}

#[tokio::test]
async fn admin_routes_require_an_admin_token() {
    let app = app().await;

    let (status, body) = call(&app, Method::GET, "/api/stock", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");

    let (status, body) = call(&app, Method::GET, "/api/genres", Some(CUSTOMER), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "forbidden");

    let (status, _) = call(&app, Method::GET, "/api/catalog", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, Method::GET, "/api/catalog", Some(CUSTOMER), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn healthz_is_the_only_health_route() {
    let app = app().await;

    let (status, _) = call(&app, Method::GET, "/api/catalog/health", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, doc) = call(&app, Method::GET, "/docs/openapi.json", None, None).await;
    assert!(doc["paths"]["/api/catalog/health"].is_null());
}

#[tokio::test]
async fn stock_walkthrough_for_dune() {
    let app = app().await;
    let dune = seed_dune(&app).await;
    let stock_uri = format!("/api/stock/{dune}");

    let (status, level) = admin(&app, Method::GET, &stock_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(level, json!({"book_id": dune, "quantity": 0}));

    let (status, body) = admin(&app, Method::PUT, &stock_uri, Some(json!({"quantity": 5}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "updated");
    assert_eq!(body["quantity"], 5);
    assert_eq!(body["message"], "Stock is updated successfully.");

    let (status, body) = admin(&app, Method::PUT, &stock_uri, Some(json!({"quantity": -3}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(body["error"]["message"], "Quantity must be zero or greater.");

    let (_, level) = admin(&app, Method::GET, &stock_uri, None).await;
    assert_eq!(level["quantity"], 5);

    let (status, _) = admin(&app, Method::PUT, &stock_uri, Some(json!({"quantity": 12}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, views) = admin(&app, Method::GET, "/api/stock?sterm=DUNE", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        views,
        json!([{"book_id": dune, "book_name": "Dune", "author": "Frank Herbert", "quantity": 12}])
    );

    let (_, views) = admin(&app, Method::GET, "/api/stock?sterm=ulysses", None).await;
    assert_eq!(views, json!([]));
}

#[tokio::test]
async fn stock_for_unknown_book_is_not_found() {
    let app = app().await;

    let (status, _) = admin(&app, Method::GET, "/api/stock/404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = admin(&app, Method::PUT, "/api/stock/404", Some(json!({"quantity": 1}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_numeric_quantity_is_rejected_by_parsing() {
    let app = app().await;
    let dune = seed_dune(&app).await;

    let (status, _) = admin(
        &app,
        Method::PUT,
        &format!("/api/stock/{dune}"),
        Some(json!({"quantity": "lots"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn genre_lifecycle_and_conflicts() {
    let app = app().await;

    let (status, body) = admin(&app, Method::POST, "/api/genres", Some(json!({"name": "  "}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["details"][0]["field"], "name");

    let (status, genre) = admin(&app, Method::POST, "/api/genres", Some(json!({"name": "Horror"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/genres/{}", genre["id"]);

    let (status, renamed) = admin(&app, Method::PUT, &uri, Some(json!({"name": "Gothic"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["name"], "Gothic");

    let (status, _) = admin(
        &app,
        Method::POST,
        "/api/books",
        Some(json!({"name": "Dracula", "author": "Bram Stoker", "genre_id": genre["id"], "price": 4.5})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = admin(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");
    let (status, _) = admin(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = admin(&app, Method::GET, "/api/genres/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = admin(&app, Method::DELETE, "/api/genres/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn book_with_unknown_genre_is_invalid() {
    let app = app().await;

    let (status, body) = admin(
        &app,
        Method::POST,
        "/api/books",
        Some(json!({"name": "Dune", "author": "Frank Herbert", "genre_id": 77, "price": 9.99})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["details"][0]["error"], "unknown_genre");
}

#[tokio::test]
async fn deleting_a_book_drops_it_from_stock_listing() {
    let app = app().await;
    let dune = seed_dune(&app).await;
    admin(&app, Method::PUT, &format!("/api/stock/{dune}"), Some(json!({"quantity": 2}))).await;

    let (status, _) = admin(&app, Method::DELETE, &format!("/api/books/{dune}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, views) = admin(&app, Method::GET, "/api/stock", None).await;
    assert_eq!(views, json!([]));
}

#[tokio::test]
async fn catalog_filters_by_term_and_genre() {
    let app = app().await;
    let dune = seed_dune(&app).await;
    admin(&app, Method::PUT, &format!("/api/stock/{dune}"), Some(json!({"quantity": 3}))).await;

    let (status, page) = call(&app, Method::GET, "/api/catalog?sterm=herbert&genre_id=0", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["books"].as_array().unwrap().len(), 1);
    assert_eq!(page["books"][0]["quantity"], 3);
    assert_eq!(page["genres"].as_array().unwrap().len(), 1);
    assert_eq!(page["sterm"], "herbert");
    assert_eq!(page["genre_id"], 0);

    let (_, page) = call(&app, Method::GET, "/api/catalog?genre_id=999", None, None).await;
    assert!(page["books"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn searches_fold_case_beyond_ascii() {
    let app = app().await;
    let (_, genre) = admin(&app, Method::POST, "/api/genres", Some(json!({"name": "Classics"}))).await;
    let (status, book) = admin(
        &app,
        Method::POST,
        "/api/books",
        Some(json!({"name": "Émile", "author": "Jean-Jacques Rousseau", "genre_id": genre["id"], "price": 7.0})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, views) = admin(&app, Method::GET, "/api/stock?sterm=%C3%A9mile", None).await;
    assert_eq!(views.as_array().unwrap().len(), 1);
    assert_eq!(views[0]["book_id"], book["id"]);

    let (_, page) = call(&app, Method::GET, "/api/catalog?sterm=%C3%89MILE", None, None).await;
    assert_eq!(page["books"].as_array().unwrap().len(), 1);
}
