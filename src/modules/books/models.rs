use serde::{Deserialize, Serialize};

use crate::modules::genres::models::GenreId;
use crate::utils::{FieldErrors, NAME_MAX_LEN};
use bookshop_http::error::AppError;

/// Longest accepted image path.
pub const IMAGE_MAX_LEN: usize = 255;

/// Book identifier. Assigned by the store, never changed afterwards.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct BookId(pub i64);

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A stored book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    pub id: BookId,
    pub name: String,
    pub author: String,
    pub genre_id: GenreId,
    pub price: f64,
    pub image: Option<String>,
}

/// A book joined with its genre name, for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BookListing {
    pub id: BookId,
    pub name: String,
    pub author: String,
    pub genre_id: GenreId,
    pub genre_name: String,
    pub price: f64,
    pub image: Option<String>,
}

/// Request body for creating or replacing a book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookInput {
    pub name: String,
    pub author: String,
    pub genre_id: GenreId,
    pub price: f64,
    #[serde(default)]
    pub image: Option<String>,
}

impl BookInput {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        errors.name("name", &self.name, NAME_MAX_LEN);
        errors.name("author", &self.author, NAME_MAX_LEN);
        if !self.price.is_finite() || self.price < 0.0 {
            errors.push("price", "must_be_non_negative");
        }
        if let Some(image) = &self.image {
            if image.chars().count() > IMAGE_MAX_LEN {
                errors.push("image", "too_long");
            }
        }
        errors.finish("Book is invalid")
    }

    /// Trim text fields and drop a blank image path.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            author: self.author.trim().to_string(),
            genre_id: self.genre_id,
            price: self.price,
            image: self
                .image
                .map(|image| image.trim().to_string())
                .filter(|image| !image.is_empty()),
        }
    }

    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            name: self.name,
            author: self.author,
            genre_id: self.genre_id,
            price: self.price,
            image: self.image,
        }
    }
}

impl From<Book> for BookInput {
    fn from(book: Book) -> Self {
        Self {
            name: book.name,
            author: book.author,
            genre_id: book.genre_id,
            price: book.price,
            image: book.image,
        }
    }
}
