//! Error handling for the bookshop HTTP layer
//!
//! Every failure leaves the service as `{"error": {...}}` with a stable
//! machine-readable `code`, a human message, and optional field details.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use uuid::Uuid;

use bookshop_authz::AuthzError;
use bookshop_db::RepositoryError;

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub details: Vec<serde_json::Value>,
    pub trace_id: String,
    pub timestamp: String,
}

/// Failures a handler can return.
#[derive(Error, Debug)]
pub enum AppError {
    /// Input was understood but rejected; `details` lists the offending fields.
    #[error("validation error: {message}")]
    Validation {
        details: Vec<serde_json::Value>,
        message: String,
    },

    #[error("conflict: {message}")]
    Conflict {
        details: Vec<serde_json::Value>,
        message: String,
    },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error(transparent)]
    Auth(#[from] AuthzError),

    /// A write did not take effect. The message is safe to show to end
    /// users; the underlying cause has already been logged.
    #[error("unavailable: {message}")]
    Unavailable { code: &'static str, message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(details: Vec<serde_json::Value>, message: impl Into<String>) -> Self {
        Self::Validation {
            details,
            message: message.into(),
        }
    }

    pub fn conflict(details: Vec<serde_json::Value>, message: impl Into<String>) -> Self {
        Self::Conflict {
            details,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn unavailable(code: &'static str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            code,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Auth(AuthzError::Unauthenticated) => StatusCode::UNAUTHORIZED,
            AppError::Auth(AuthzError::Forbidden(_)) => StatusCode::FORBIDDEN,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::Conflict { .. } => "conflict",
            AppError::NotFound { .. } => "not_found",
            AppError::Auth(AuthzError::Unauthenticated) => "unauthorized",
            AppError::Auth(AuthzError::Forbidden(_)) => "forbidden",
            AppError::Unavailable { code, .. } => *code,
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { .. } => AppError::not_found(err.to_string()),
            RepositoryError::Conflict { message } => AppError::conflict(vec![], message),
            RepositoryError::Storage(source) => {
                AppError::Internal(anyhow::Error::new(source).context("storage failure"))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let trace_id = Uuid::now_v7();
        let status = self.status();
        let code = self.code();

        if let AppError::Internal(err) = &self {
            tracing::error!(trace_id = %trace_id, error = ?err, "internal error");
        } else {
            tracing::warn!(
                trace_id = %trace_id,
                code,
                status = status.as_u16(),
                "request failed"
            );
        }

        let (message, details) = match self {
            AppError::Validation { details, message } | AppError::Conflict { details, message } => {
                (message, details)
            }
            AppError::NotFound { message } | AppError::Unavailable { message, .. } => {
                (message, vec![])
            }
            AppError::Auth(err) => (err.to_string(), vec![]),
            // Storage and driver detail stays in the logs for release builds
            AppError::Internal(err) if cfg!(debug_assertions) => (format!("{err:#}"), vec![]),
            AppError::Internal(_) => ("An internal server error occurred".to_string(), vec![]),
        };

        let envelope = ErrorEnvelope {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
                trace_id: trace_id.to_string(),
                timestamp: OffsetDateTime::now_utc()
                    .format(&Rfc3339)
                    .unwrap_or_default(),
            },
        };

        (status, Json(envelope)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookshop_authz::Capability;
    use serde_json::json;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn repository_errors_map_to_statuses() {
        let not_found = AppError::from(RepositoryError::not_found("book", 9));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let conflict = AppError::from(RepositoryError::Conflict {
            message: "FOREIGN KEY constraint failed".to_string(),
        });
        assert_eq!(conflict.status(), StatusCode::CONFLICT);
        assert_eq!(conflict.code(), "conflict");

        let storage = AppError::from(RepositoryError::Storage(sqlx::Error::PoolClosed));
        assert_eq!(storage.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(storage.code(), "internal_error");
    }

    #[test]
    fn authz_errors_map_to_statuses() {
        let unauthenticated = AppError::from(AuthzError::Unauthenticated);
        assert_eq!(unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unauthenticated.code(), "unauthorized");

        let forbidden = AppError::from(AuthzError::Forbidden(Capability::ManageStock));
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(forbidden.code(), "forbidden");
    }

    #[tokio::test]
    async fn validation_envelope_carries_details_and_ids() {
        let response = AppError::validation(
            vec![json!({"field": "quantity", "error": "negative"})],
            "Quantity must be zero or greater.",
        )
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        let error = &body["error"];
        assert_eq!(error["code"], "validation_error");
        assert_eq!(error["message"], "Quantity must be zero or greater.");
        assert_eq!(error["details"][0]["field"], "quantity");
        assert!(Uuid::parse_str(error["trace_id"].as_str().unwrap()).is_ok());
        assert!(OffsetDateTime::parse(error["timestamp"].as_str().unwrap(), &Rfc3339).is_ok());
    }

    #[tokio::test]
    async fn unavailable_keeps_its_code() {
        let response =
            AppError::unavailable("stock_update_failed", "Stock could not be updated.")
                .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "stock_update_failed");
        assert_eq!(body["error"]["message"], "Stock could not be updated.");
        assert!(body["error"]["details"].as_array().unwrap().is_empty());
    }
}
