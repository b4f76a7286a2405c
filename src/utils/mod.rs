//! Project-specific utilities live here.

use bookshop_http::error::AppError;
use serde_json::json;

/// Longest accepted name for books, authors, and genres.
pub const NAME_MAX_LEN: usize = 40;

/// Collects per-field validation failures into one `AppError::Validation`.
#[derive(Debug, Default)]
pub struct FieldErrors {
    details: Vec<serde_json::Value>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, error: &str) {
        self.details.push(json!({ "field": field, "error": error }));
    }

    /// Require a non-blank value of at most `max_len` characters.
    pub fn name(&mut self, field: &str, value: &str, max_len: usize) {
        let value = value.trim();
        if value.is_empty() {
            self.push(field, "required");
        } else if value.chars().count() > max_len {
            self.push(field, "too_long");
        }
    }

    /// `Ok(())` when nothing was collected, otherwise a validation error.
    pub fn finish(self, message: &str) -> Result<(), AppError> {
        if self.details.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(self.details, message))
        }
    }
}

/// Trimmed search term, or `None` when blank.
pub fn search_term(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|term| !term.is_empty())
}

/// Substring match under Unicode lowercase folding.
///
/// SQLite's `lower()` only folds ASCII, so name searches are matched here.
pub fn contains_ignore_case(haystack: &str, term: &str) -> bool {
    haystack.to_lowercase().contains(&term.to_lowercase())
}
