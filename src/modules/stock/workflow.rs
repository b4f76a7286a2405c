//! Stock update workflow and the stock display projection.
//!
//! `manage_stock` never returns an error: every request ends in a
//! [`StockVerdict`]. Repository failures are logged with their cause here and
//! reported to the caller only as `StockUpdateFailed`.

use std::sync::Arc;

use bookshop_db::RepositoryError;

use super::models::{StockFailureKind, StockLevel, StockUpdateRequest, StockVerdict, StockView};
use super::repository::StockRepository;
use crate::modules::books::models::BookId;
use crate::utils::search_term;

#[derive(Clone)]
pub struct StockWorkflow {
    repo: Arc<dyn StockRepository>,
}

impl StockWorkflow {
    pub fn new(repo: Arc<dyn StockRepository>) -> Self {
        Self { repo }
    }

    /// Validate and apply a quantity update.
    pub async fn manage_stock(&self, request: StockUpdateRequest) -> StockVerdict {
        if request.quantity < 0 {
            tracing::info!(
                book_id = %request.book_id,
                quantity = request.quantity,
                "rejected negative stock quantity"
            );
            return StockVerdict::failed(StockFailureKind::InvalidQuantity);
        }

        match self.repo.manage_stock(&request).await {
            Ok(()) => {
                tracing::info!(
                    book_id = %request.book_id,
                    quantity = request.quantity,
                    "stock updated"
                );
                StockVerdict::Updated {
                    book_id: request.book_id,
                    quantity: request.quantity,
                }
            }
            Err(err) => {
                tracing::error!(
                    book_id = %request.book_id,
                    quantity = request.quantity,
                    error = %err,
                    "stock update failed"
                );
                StockVerdict::failed(StockFailureKind::StockUpdateFailed)
            }
        }
    }

    /// Stock views for listing, optionally filtered by book name.
    ///
    /// A blank term lists everything; no match yields an empty list.
    pub async fn display(&self, term: Option<&str>) -> Result<Vec<StockView>, RepositoryError> {
        self.repo.stocks(search_term(term)).await
    }

    /// Current level for one book, zero when it was never stocked.
    pub async fn stock_for_book(&self, book_id: BookId) -> Result<StockLevel, RepositoryError> {
        Ok(self
            .repo
            .stock_by_book_id(book_id)
            .await?
            .map(StockLevel::from)
            .unwrap_or_else(|| StockLevel::unstocked(book_id)))
    }
}
