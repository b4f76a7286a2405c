use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use bookshop_db::RepositoryError;
use bookshop_http::error::AppError;

use super::models::{Genre, GenreId, GenreInput};
use super::repository::GenreRepository;

pub type GenreState = Arc<dyn GenreRepository>;

pub fn router(state: GenreState) -> Router {
    Router::new()
        .route("/", get(list_genres).post(add_genre))
        .route(
            "/{id}",
            get(get_genre).put(update_genre).delete(delete_genre),
        )
        .with_state(state)
}

async fn list_genres(State(repo): State<GenreState>) -> Result<Json<Vec<Genre>>, AppError> {
    Ok(Json(repo.genres().await?))
}

async fn add_genre(
    State(repo): State<GenreState>,
    Json(input): Json<GenreInput>,
) -> Result<(StatusCode, Json<Genre>), AppError> {
    input.validate()?;
    let name = input.name.trim().to_string();
    let id = repo.add_genre(&name).await?;
    tracing::info!(genre_id = %id, "genre added");
    Ok((StatusCode::CREATED, Json(Genre { id, name })))
}

async fn get_genre(
    State(repo): State<GenreState>,
    Path(id): Path<GenreId>,
) -> Result<Json<Genre>, AppError> {
    repo.genre_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Genre with id: {id} does not exist")))
}

async fn update_genre(
    State(repo): State<GenreState>,
    Path(id): Path<GenreId>,
    Json(input): Json<GenreInput>,
) -> Result<Json<Genre>, AppError> {
    input.validate()?;
    let genre = input.into_genre(id);
    repo.update_genre(&genre).await?;
    tracing::info!(genre_id = %id, "genre updated");
    Ok(Json(genre))
}

async fn delete_genre(
    State(repo): State<GenreState>,
    Path(id): Path<GenreId>,
) -> Result<StatusCode, AppError> {
    match repo.delete_genre(id).await {
        Ok(()) => {
            tracing::info!(genre_id = %id, "genre deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        Err(RepositoryError::Conflict { .. }) => Err(AppError::conflict(
            vec![serde_json::json!({ "genre_id": id })],
            "Genre is still assigned to one or more books",
        )),
        Err(err) => Err(err.into()),
    }
}
