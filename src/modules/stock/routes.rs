use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use bookshop_http::error::AppError;

use super::models::{StockFailureKind, StockInput, StockLevel, StockVerdict, StockView};
use super::workflow::StockWorkflow;
use crate::modules::books::models::BookId;
use crate::modules::books::repository::BookRepository;

#[derive(Clone)]
pub struct StockState {
    pub workflow: StockWorkflow,
    pub books: Arc<dyn BookRepository>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StockQuery {
    pub sterm: Option<String>,
}

/// Successful update, echoed with the confirmation message.
#[derive(Debug, Serialize)]
pub struct StockUpdated {
    #[serde(flatten)]
    pub verdict: StockVerdict,
    pub message: &'static str,
}

pub fn router(state: StockState) -> Router {
    Router::new()
        .route("/", get(list_stock))
        .route("/{book_id}", get(get_stock).put(manage_stock))
        .with_state(state)
}

async fn list_stock(
    State(state): State<StockState>,
    Query(query): Query<StockQuery>,
) -> Result<Json<Vec<StockView>>, AppError> {
    Ok(Json(state.workflow.display(query.sterm.as_deref()).await?))
}

async fn ensure_book(state: &StockState, book_id: BookId) -> Result<(), AppError> {
    match state.books.book_by_id(book_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::not_found(format!(
            "Book with id: {book_id} does not exist"
        ))),
    }
}

async fn get_stock(
    State(state): State<StockState>,
    Path(book_id): Path<BookId>,
) -> Result<Json<StockLevel>, AppError> {
    ensure_book(&state, book_id).await?;
    Ok(Json(state.workflow.stock_for_book(book_id).await?))
}

async fn manage_stock(
    State(state): State<StockState>,
    Path(book_id): Path<BookId>,
    Json(input): Json<StockInput>,
) -> Result<Json<StockUpdated>, AppError> {
    ensure_book(&state, book_id).await?;

    let verdict = state.workflow.manage_stock(input.into_request(book_id)).await;
    match verdict {
        StockVerdict::Updated { .. } => Ok(Json(StockUpdated {
            verdict,
            message: verdict.message(),
        })),
        StockVerdict::Failed {
            kind: kind @ StockFailureKind::InvalidQuantity,
        } => Err(AppError::validation(
            vec![json!({ "field": "quantity", "error": "negative" })],
            kind.message(),
        )),
        StockVerdict::Failed {
            kind: kind @ StockFailureKind::StockUpdateFailed,
        } => Err(AppError::unavailable("stock_update_failed", kind.message())),
    }
}
