//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps ledger and validation errors to HTTP status codes and returns JSON
//! bodies with a machine-readable code, a message, and optional details.
//! Internal error messages are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use escrow_ledger::{ErrorKind, EscrowError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "CONFLICT").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional context. Ledger failures carry `ledger_code` and `kind`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or malformed caller identity (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A ledger operation failed; status depends on the error kind.
    #[error(transparent)]
    Ledger(#[from] EscrowError),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Ledger(err) => ledger_status(err.kind()),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Ledger(err) => Some(serde_json::json!({
                "ledger_code": err.code(),
                "kind": err.kind().as_str(),
            })),
            _ => None,
        }
    }
}

/// HTTP mapping for each ledger error kind.
fn ledger_status(kind: ErrorKind) -> (StatusCode, &'static str) {
    match kind {
        ErrorKind::Unauthorized => (StatusCode::FORBIDDEN, "UNAUTHORIZED"),
        ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        ErrorKind::InsufficientFunds | ErrorKind::TransferFailed => {
            (StatusCode::PAYMENT_REQUIRED, "PAYMENT_FAILED")
        }
        ErrorKind::AlreadyReleased | ErrorKind::AlreadyCancelled => {
            (StatusCode::CONFLICT, "CONFLICT")
        }
        ErrorKind::InvalidAmount => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
        ErrorKind::IdsExhausted => (StatusCode::SERVICE_UNAVAILABLE, "CAPACITY_EXHAUSTED"),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<escrow_core::ValidationError> for AppError {
    fn from(err: escrow_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use escrow_core::{AccountId, EscrowId};
    use escrow_ledger::{EscrowStatus, TransferError};
    use http_body_util::BodyExt;

    fn account(s: &str) -> AccountId {
        AccountId::new(s).unwrap()
    }

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[test]
    fn plain_variants_status_codes() {
        assert_eq!(
            AppError::NotFound("x".into()).status_and_code(),
            (StatusCode::NOT_FOUND, "NOT_FOUND")
        );
        assert_eq!(
            AppError::Validation("x".into()).status_and_code(),
            (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR")
        );
        assert_eq!(
            AppError::BadRequest("x".into()).status_and_code(),
            (StatusCode::BAD_REQUEST, "BAD_REQUEST")
        );
        assert_eq!(
            AppError::Unauthorized("x".into()).status_and_code(),
            (StatusCode::UNAUTHORIZED, "UNAUTHORIZED")
        );
        assert_eq!(
            AppError::Internal("x".into()).status_and_code(),
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        );
    }

    #[test]
    fn every_ledger_kind_is_mapped() {
        let expected = [
            (ErrorKind::Unauthorized, StatusCode::FORBIDDEN),
            (ErrorKind::NotFound, StatusCode::NOT_FOUND),
            (ErrorKind::InsufficientFunds, StatusCode::PAYMENT_REQUIRED),
            (ErrorKind::AlreadyReleased, StatusCode::CONFLICT),
            (ErrorKind::AlreadyCancelled, StatusCode::CONFLICT),
            (ErrorKind::InvalidAmount, StatusCode::UNPROCESSABLE_ENTITY),
            (ErrorKind::TransferFailed, StatusCode::PAYMENT_REQUIRED),
            (ErrorKind::IdsExhausted, StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (kind, status) in expected {
            assert_eq!(ledger_status(kind).0, status, "{kind}");
        }
    }

    #[tokio::test]
    async fn conflict_carries_ledger_code() {
        let err = AppError::from(EscrowError::AlreadyReleased {
            escrow_id: EscrowId::new(4),
            status: EscrowStatus::Released,
        });
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.error.code, "CONFLICT");
        assert!(body.error.message.contains("escrow:4"));
        let details = body.error.details.unwrap();
        assert_eq!(details["ledger_code"], 103);
        assert_eq!(details["kind"], "ALREADY_RELEASED");
    }

    #[tokio::test]
    async fn ledger_unauthorized_is_forbidden() {
        let err = AppError::from(EscrowError::Unauthorized {
            caller: account("mallory"),
            operation: "cancel",
        });
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body.error.details.unwrap()["ledger_code"], 100);
    }

    #[tokio::test]
    async fn transfer_failure_is_payment_failed() {
        let err = AppError::from(EscrowError::TransferFailed {
            operation: "create",
            source: TransferError::InsufficientFunds {
                account: account("w2"),
                requested: 10,
                available: 0,
            },
        });
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(body.error.code, "PAYMENT_FAILED");
        assert_eq!(body.error.details.unwrap()["ledger_code"], 106);
    }

    #[tokio::test]
    async fn plain_errors_omit_details() {
        let (status, body) = response_parts(AppError::NotFound("escrow:9".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.error.details.is_none());
    }

    #[tokio::test]
    async fn into_response_internal_hides_details() {
        let (status, body) = response_parts(AppError::Internal("bank offline".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.message, "An internal error occurred");
        assert!(!body.error.message.contains("bank"));
    }

    #[test]
    fn validation_error_from_core() {
        let core_err = AccountId::new("").unwrap_err();
        assert!(matches!(AppError::from(core_err), AppError::Validation(_)));
    }
}
