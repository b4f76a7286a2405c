use serde::{Deserialize, Serialize};

use crate::modules::books::models::BookId;

/// Stored stock row. One per book at most.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Stock {
    pub id: i64,
    pub book_id: BookId,
    pub quantity: i64,
}

/// Desired quantity for a book. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockUpdateRequest {
    pub book_id: BookId,
    pub quantity: i64,
}

/// Book joined with its current quantity; books never stocked report zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StockView {
    pub book_id: BookId,
    pub book_name: String,
    pub author: String,
    pub quantity: i64,
}

/// Request body for `PUT /api/stock/{book_id}`.
///
/// Signed: negative values are rejected by the workflow as `InvalidQuantity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockInput {
    pub quantity: i64,
}

impl StockInput {
    pub fn into_request(self, book_id: BookId) -> StockUpdateRequest {
        StockUpdateRequest {
            book_id,
            quantity: self.quantity,
        }
    }
}

/// Current quantity for one book as shown on the manage-stock form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub book_id: BookId,
    pub quantity: i64,
}

impl StockLevel {
    /// Level for a book that was never stocked.
    pub fn unstocked(book_id: BookId) -> Self {
        Self {
            book_id,
            quantity: 0,
        }
    }
}

impl From<Stock> for StockLevel {
    fn from(stock: Stock) -> Self {
        Self {
            book_id: stock.book_id,
            quantity: stock.quantity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockFailureKind {
    /// Requested quantity was negative; nothing was written.
    InvalidQuantity,
    /// The store rejected or failed the upsert.
    StockUpdateFailed,
}

impl StockFailureKind {
    pub fn message(&self) -> &'static str {
        match self {
            StockFailureKind::InvalidQuantity => "Quantity must be zero or greater.",
            StockFailureKind::StockUpdateFailed => "Stock could not be updated.",
        }
    }
}

/// Terminal outcome of a stock update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StockVerdict {
    Updated { book_id: BookId, quantity: i64 },
    Failed { kind: StockFailureKind },
}

impl StockVerdict {
    pub const UPDATED_MESSAGE: &'static str = "Stock is updated successfully.";

    pub fn failed(kind: StockFailureKind) -> Self {
        StockVerdict::Failed { kind }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StockVerdict::Updated { .. })
    }

    pub fn message(&self) -> &'static str {
        match self {
            StockVerdict::Updated { .. } => Self::UPDATED_MESSAGE,
            StockVerdict::Failed { kind } => kind.message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_serializes_with_outcome_tag() {
        let updated = StockVerdict::Updated {
            book_id: BookId(7),
            quantity: 5,
        };
        assert_eq!(
            serde_json::to_value(updated).unwrap(),
            serde_json::json!({"outcome": "updated", "book_id": 7, "quantity": 5})
        );

        let failed = StockVerdict::failed(StockFailureKind::InvalidQuantity);
        assert_eq!(
            serde_json::to_value(failed).unwrap(),
            serde_json::json!({"outcome": "failed", "kind": "invalid_quantity"})
        );
    }

    #[test]
    fn unstocked_level_is_zero() {
        assert_eq!(StockLevel::unstocked(BookId(3)).quantity, 0);
    }
}
