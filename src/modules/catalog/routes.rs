use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use bookshop_http::error::AppError;

use super::models::{CatalogPage, CatalogQuery};
use super::repository::CatalogRepository;
use crate::modules::genres::repository::GenreRepository;
use crate::utils::search_term;

#[derive(Clone)]
pub struct CatalogState {
    pub catalog: Arc<dyn CatalogRepository>,
    pub genres: Arc<dyn GenreRepository>,
}

pub fn router(state: CatalogState) -> Router {
    Router::new()
        .route("/", get(browse))
        .with_state(state)
}

async fn browse(
    State(state): State<CatalogState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CatalogPage>, AppError> {
    let term = search_term(query.sterm.as_deref());
    let genre_id = query.genre_filter();

    let books = state.catalog.books(term, genre_id).await?;
    let genres = state.genres.genres().await?;

    Ok(Json(CatalogPage {
        books,
        genres,
        sterm: term.unwrap_or_default().to_string(),
        genre_id: genre_id.map(|id| id.0).unwrap_or(0),
    }))
}
