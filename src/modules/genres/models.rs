use serde::{Deserialize, Serialize};

use crate::utils::{FieldErrors, NAME_MAX_LEN};
use bookshop_http::error::AppError;

/// Genre identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct GenreId(pub i64);

impl std::fmt::Display for GenreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A stored genre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

/// Request body for creating or renaming a genre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreInput {
    pub name: String,
}

impl GenreInput {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        errors.name("name", &self.name, NAME_MAX_LEN);
        errors.finish("Genre is invalid")
    }

    /// Build the stored shape for an existing id.
    pub fn into_genre(self, id: GenreId) -> Genre {
        Genre {
            id,
            name: self.name.trim().to_string(),
        }
    }
}

impl From<Genre> for GenreInput {
    fn from(genre: Genre) -> Self {
        Self { name: genre.name }
    }
}
