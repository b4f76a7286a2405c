use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::json;

use bookshop_http::error::AppError;

use super::models::{Book, BookId, BookInput, BookListing};
use super::repository::BookRepository;
use crate::modules::genres::repository::GenreRepository;

#[derive(Clone)]
pub struct BooksState {
    pub books: Arc<dyn BookRepository>,
    pub genres: Arc<dyn GenreRepository>,
}

pub fn router(state: BooksState) -> Router {
    Router::new()
        .route("/", get(list_books).post(add_book))
        .route("/{id}", get(get_book).put(update_book).delete(delete_book))
        .with_state(state)
}

async fn list_books(State(state): State<BooksState>) -> Result<Json<Vec<BookListing>>, AppError> {
    Ok(Json(state.books.books().await?))
}

/// Validate and normalize input, including that its genre exists.
async fn checked_input(state: &BooksState, input: BookInput) -> Result<BookInput, AppError> {
    input.validate()?;
    let input = input.normalized();
    if state.genres.genre_by_id(input.genre_id).await?.is_none() {
        return Err(AppError::validation(
            vec![json!({ "field": "genre_id", "error": "unknown_genre" })],
            "Book is invalid",
        ));
    }
    Ok(input)
}

async fn add_book(
    State(state): State<BooksState>,
    Json(input): Json<BookInput>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let input = checked_input(&state, input).await?;
    let id = state.books.add_book(&input).await?;
    tracing::info!(book_id = %id, "book added");
    Ok((StatusCode::CREATED, Json(input.into_book(id))))
}

async fn get_book(
    State(state): State<BooksState>,
    Path(id): Path<BookId>,
) -> Result<Json<Book>, AppError> {
    state
        .books
        .book_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Book with id: {id} does not exist")))
}

async fn update_book(
    State(state): State<BooksState>,
    Path(id): Path<BookId>,
    Json(input): Json<BookInput>,
) -> Result<Json<Book>, AppError> {
    let book = checked_input(&state, input).await?.into_book(id);
    state.books.update_book(&book).await?;
    tracing::info!(book_id = %id, "book updated");
    Ok(Json(book))
}

async fn delete_book(
    State(state): State<BooksState>,
    Path(id): Path<BookId>,
) -> Result<StatusCode, AppError> {
    state.books.delete_book(id).await?;
    tracing::info!(book_id = %id, "book deleted");
    Ok(StatusCode::NO_CONTENT)
}
