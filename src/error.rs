//! Error types and HTTP error response handling.
//!
//! The ledger reports failures as [`LedgerError`]; this module is the only
//! place that knows how those become HTTP status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::services::error::LedgerError;

/// Message returned for every unexpected failure. Internal details stay in
/// the logs.
const UNEXPECTED_ERROR_MESSAGE: &str = "Unexpected error occurred. Please contact an administrator.";

/// Application-wide error type returned by handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The ledger rejected the operation or the store failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Query parameters were missing or could not be parsed.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("{0}")]
    InvalidRequest(String),
}

/// Machine-readable reason attached to every error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorReason {
    GeneralException,
    ValidationError,
    /// Sent for insufficient balance; existing clients match on this code.
    AccountListLimitReached,
}

/// JSON error body.
///
/// ```json
/// {
///   "error": {
///     "status": 404,
///     "reason": "ACCOUNT_LIST_LIMIT_REACHED",
///     "message": "There isn't enough balance: 200"
///   }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub status: u16,
    pub reason: ErrorReason,
    pub message: String,
}

impl AppError {
    /// Map the error to (HTTP status, reason, client-facing message).
    ///
    /// # Status Code Mapping
    ///
    /// - `AccountNotFound` → 404 `GENERAL_EXCEPTION`
    /// - `InsufficientBalance` → 404 `ACCOUNT_LIST_LIMIT_REACHED`
    /// - `InvalidArgument` / `InvalidRequest` → 400 `VALIDATION_ERROR`
    /// - `Store` → 500 `GENERAL_EXCEPTION` (hides details from client)
    pub fn classify(&self) -> (StatusCode, ErrorReason, String) {
        match self {
            AppError::Ledger(err @ LedgerError::AccountNotFound { .. }) => (
                StatusCode::NOT_FOUND,
                ErrorReason::GeneralException,
                err.to_string(),
            ),
            AppError::Ledger(err @ LedgerError::InsufficientBalance { .. }) => (
                StatusCode::NOT_FOUND,
                ErrorReason::AccountListLimitReached,
                err.to_string(),
            ),
            AppError::Ledger(LedgerError::InvalidArgument(msg)) | AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorReason::ValidationError, msg.clone())
            }
            AppError::Ledger(LedgerError::Store(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorReason::GeneralException,
                UNEXPECTED_ERROR_MESSAGE.to_string(),
            ),
        }
    }
}

/// Convert AppError into an HTTP response.
///
/// This implementation allows Axum handlers to return `Result<T, AppError>`
/// and have errors automatically converted to proper HTTP responses.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, reason, message) = self.classify();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }

        let body = Json(ErrorBody {
            error: ErrorDetail {
                status: status.as_u16(),
                reason,
                message,
            },
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::account::AccountId;
    use crate::store::StoreError;
    use axum::body::to_bytes;
    use rust_decimal_macros::dec;

    async fn body_json(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn insufficient_balance_is_404_with_distinct_reason() {
        let (status, json) = body_json(
            LedgerError::InsufficientBalance {
                amount: dec!(200),
            }
            .into(),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            json,
            serde_json::json!({
                "error": {
                    "status": 404,
                    "reason": "ACCOUNT_LIST_LIMIT_REACHED",
                    "message": "There isn't enough balance: 200"
                }
            })
        );
    }

    #[tokio::test]
    async fn account_not_found_is_404() {
        let id = AccountId::new_v4();
        let (status, json) = body_json(LedgerError::AccountNotFound { id }.into()).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["reason"], "GENERAL_EXCEPTION");
        assert_eq!(
            json["error"]["message"],
            format!("Account does not exist: {id}")
        );
    }

    #[tokio::test]
    async fn validation_failures_are_400() {
        let (status, json) =
            body_json(LedgerError::InvalidArgument("Amount must be positive: 0".into()).into())
                .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["reason"], "VALIDATION_ERROR");

        let (status, _) = body_json(AppError::InvalidRequest("missing field".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn store_failures_do_not_leak_details() {
        let (status, json) = body_json(
            LedgerError::Store(StoreError::Unavailable("password=hunter2".into())).into(),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["message"], UNEXPECTED_ERROR_MESSAGE);
        assert!(!json.to_string().contains("hunter2"));
    }
}
