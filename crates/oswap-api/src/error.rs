//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps escrow and asset-ledger errors to HTTP status codes and returns JSON
//! bodies with a machine-readable code and a message. Server-side failures
//! are logged and never described to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use oswap_escrow::{EscrowError, TransferError};
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
    /// Machine-readable error code (e.g., "ORDER_NOT_FOUND", "BAD_REQUEST").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for client errors.
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

    /// Request body or path could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid credentials or caller identity (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),

    /// The escrow ledger refused the operation.
    #[error(transparent)]
    Escrow(#[from] EscrowError),

    /// The asset ledger refused an administration call.
    #[error(transparent)]
    Asset(#[from] TransferError),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::Escrow(err) => (escrow_status(err), err.code()),
            Self::Asset(err) => match err {
                TransferError::UnknownAsset(_) => (StatusCode::NOT_FOUND, "ASSET_NOT_FOUND"),
                TransferError::DuplicateAsset(_) => (StatusCode::CONFLICT, "ASSET_EXISTS"),
                _ => (StatusCode::UNPROCESSABLE_ENTITY, "TRANSFER_REJECTED"),
            },
        }
    }
}

fn escrow_status(err: &EscrowError) -> StatusCode {
    match err {
        EscrowError::OrderNotFound(_) => StatusCode::NOT_FOUND,
        EscrowError::InvalidAmount { .. } | EscrowError::TransferFailed { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        EscrowError::Unauthorized { .. } | EscrowError::LedgerCaller(_) => StatusCode::FORBIDDEN,
        EscrowError::OrderNotActive { .. }
        | EscrowError::OrderExpired { .. }
        | EscrowError::ProceedsUnavailable { .. }
        | EscrowError::OrderIdExhausted => StatusCode::CONFLICT,
        EscrowError::CustodyOverflow(_) | EscrowError::InvalidSnapshot(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = if status.is_server_error() {
            tracing::error!(error = %self, "internal server error");
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Convert oswap-core validation errors to API errors.
impl From<oswap_core::ValidationError> for AppError {
    fn from(err: oswap_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use oswap_core::{AccountId, AssetId, OrderId, Timestamp};
    use oswap_escrow::OrderStatus;

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[test]
    fn escrow_errors_map_to_statuses() {
        let ts = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        let cases = [
            (EscrowError::OrderNotFound(OrderId::FIRST), StatusCode::NOT_FOUND),
            (
                EscrowError::InvalidAmount {
                    field: "amount",
                    value: oswap_core::Amount::ZERO,
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                EscrowError::Unauthorized {
                    order_id: OrderId::FIRST,
                    caller: AccountId::new("bob").unwrap(),
                },
                StatusCode::FORBIDDEN,
            ),
            (
                EscrowError::LedgerCaller(AccountId::new("escrow").unwrap()),
                StatusCode::FORBIDDEN,
            ),
            (
                EscrowError::OrderNotActive {
                    order_id: OrderId::FIRST,
                    status: OrderStatus::Filled,
                },
                StatusCode::CONFLICT,
            ),
            (
                EscrowError::OrderExpired {
                    order_id: OrderId::FIRST,
                    deadline: ts,
                    now: ts,
                },
                StatusCode::CONFLICT,
            ),
        ];
        for (err, expected) in cases {
            let code = err.code();
            let (status, app_code) = AppError::from(err).status_and_code();
            assert_eq!(status, expected);
            assert_eq!(app_code, code);
        }
    }

    #[test]
    fn asset_errors_map_to_statuses() {
        let tka = AssetId::new("TKA").unwrap();
        assert_eq!(
            AppError::from(TransferError::UnknownAsset(tka.clone())).status_and_code(),
            (StatusCode::NOT_FOUND, "ASSET_NOT_FOUND")
        );
        assert_eq!(
            AppError::from(TransferError::DuplicateAsset(tka.clone())).status_and_code(),
            (StatusCode::CONFLICT, "ASSET_EXISTS")
        );
        assert_eq!(
            AppError::from(TransferError::Overflow { asset: tka }).status_and_code().0,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn validation_error_from_core() {
        let err = AppError::from(AccountId::new("").unwrap_err());
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn into_response_carries_domain_code() {
        let (status, body) =
            response_parts(AppError::from(EscrowError::OrderNotFound(OrderId::new(9)))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error.code, "ORDER_NOT_FOUND");
        assert!(body.error.message.contains('9'));
        assert!(body.error.details.is_none());
    }

    #[tokio::test]
    async fn into_response_internal_hides_details() {
        let (status, body) =
            response_parts(AppError::Internal("lock poisoned at ledger.rs".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.message, "An internal error occurred");

        let (status, body) = response_parts(AppError::from(EscrowError::InvalidSnapshot(
            "order 3 appears twice".into(),
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.error.message.contains("order 3"));
    }

    #[tokio::test]
    async fn into_response_bad_request() {
        let (status, body) = response_parts(AppError::BadRequest("malformed".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.code, "BAD_REQUEST");
        assert!(body.error.message.contains("malformed"));
    }

    #[test]
    fn error_body_skips_empty_details() {
        let body = ErrorBody {
            error: ErrorDetail {
                code: "TEST".to_string(),
                message: "test message".to_string(),
                details: None,
            },
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("TEST"));
        assert!(!json.contains("details"));
    }
}
