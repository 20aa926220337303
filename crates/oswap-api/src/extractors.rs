//! # Custom Extractors & Validation
//!
//! Provides the [`Validate`] trait for request DTOs, helpers to extract and
//! validate JSON bodies in handlers, and parsers for path identifiers.

use axum::extract::rejection::JsonRejection;
use axum::Json;
use oswap_core::{AccountId, AssetId, OrderId};

use crate::error::AppError;

/// Trait for request types that can validate their business rules
/// beyond what serde deserialization checks.
pub trait Validate {
    /// Validate business rules. Returns an error message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and validate it using the [`Validate`] trait.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

/// Parse an order id path segment.
pub fn parse_order_id(raw: &str) -> Result<OrderId, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("invalid order id {raw:?}")))
}

/// Parse an asset id path segment.
pub fn parse_asset_id(raw: &str) -> Result<AssetId, AppError> {
    AssetId::new(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Parse an account id path segment.
pub fn parse_account_id(raw: &str) -> Result<AccountId, AppError> {
    AccountId::new(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}
