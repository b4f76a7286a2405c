use serde::{Deserialize, Serialize};

use crate::modules::books::models::BookId;
use crate::modules::genres::models::{Genre, GenreId};

/// Query string for the public catalog.
///
/// `genre_id=0` means "all genres", as does leaving it out.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogQuery {
    pub sterm: Option<String>,
    pub genre_id: Option<i64>,
}

impl CatalogQuery {
    pub fn genre_filter(&self) -> Option<GenreId> {
        self.genre_id.filter(|id| *id > 0).map(GenreId)
    }
}

/// A book as shown to shoppers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CatalogBook {
    pub id: BookId,
    pub name: String,
    pub author: String,
    pub genre_id: GenreId,
    pub genre_name: String,
    pub price: f64,
    pub image: Option<String>,
    pub quantity: i64,
}

/// Catalog page: matching books, every genre, and the filters that were applied.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogPage {
    pub books: Vec<CatalogBook>,
    pub genres: Vec<Genre>,
    pub sterm: String,
    pub genre_id: i64,
}
