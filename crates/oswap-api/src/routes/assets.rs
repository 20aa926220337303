//! # Asset Administration API
//!
//! Registration, issuance and allowances on the in-memory asset ledger that
//! backs the escrow. Approvals are granted by the `X-Account-Id` caller.
//!
//! ## Endpoints
//!
//! - `POST /v1/assets` — register an asset
//! - `GET /v1/assets` — list registered assets
//! - `POST /v1/assets/{asset}/mint` — issue new units
//! - `POST /v1/assets/{asset}/approve` — set the caller's allowance for a spender
//! - `GET /v1/assets/{asset}/balances/{account}` — balance of an account

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use oswap_core::amount::MAX_DECIMALS;
use oswap_core::{AccountId, Amount, AssetId};
use oswap_escrow::AssetInfo;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{
    extract_json, extract_validated_json, parse_account_id, parse_asset_id, Validate,
};
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to register an asset with zero supply.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterAssetRequest {
    #[schema(value_type = String, example = "TKA")]
    pub id: AssetId,
    #[schema(example = "TokenA")]
    pub name: String,
    #[schema(example = "TKA")]
    pub symbol: String,
    #[schema(example = 18)]
    pub decimals: u8,
}

impl Validate for RegisterAssetRequest {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if self.symbol.trim().is_empty() {
            return Err("symbol must not be empty".to_string());
        }
        if self.decimals > MAX_DECIMALS {
            return Err(format!("decimals must not exceed {MAX_DECIMALS}"));
        }
        Ok(())
    }
}

/// Registered asset metadata.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssetResponse {
    #[schema(value_type = String)]
    pub id: AssetId,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    #[schema(value_type = String)]
    pub total_supply: Amount,
}

impl From<AssetInfo> for AssetResponse {
    fn from(info: AssetInfo) -> Self {
        Self {
            id: info.id,
            name: info.name,
            symbol: info.symbol,
            decimals: info.decimals,
            total_supply: info.total_supply,
        }
    }
}

/// Request to issue new units to an account.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MintRequest {
    #[schema(value_type = String, example = "alice")]
    pub to: AccountId,
    /// Quantity in smallest units.
    #[schema(value_type = String, example = "100000000000000000000")]
    pub amount: Amount,
}

/// Request to set the caller's allowance for a spender.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ApproveRequest {
    /// Account allowed to move the caller's funds. Defaults to the escrow
    /// ledger's custody account.
    #[schema(value_type = Option<String>, example = "escrow:orderswap")]
    pub spender: Option<AccountId>,
    /// New allowance in smallest units. Replaces any previous allowance.
    #[schema(value_type = String)]
    pub amount: Amount,
}

/// Allowance after an approval.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AllowanceResponse {
    #[schema(value_type = String)]
    pub asset: AssetId,
    #[schema(value_type = String)]
    pub owner: AccountId,
    #[schema(value_type = String)]
    pub spender: AccountId,
    #[schema(value_type = String)]
    pub amount: Amount,
}

/// Balance of one account in one asset.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BalanceResponse {
    #[schema(value_type = String)]
    pub asset: AssetId,
    #[schema(value_type = String)]
    pub account: AccountId,
    /// Balance in smallest units.
    #[schema(value_type = String)]
    pub balance: Amount,
    /// Balance in whole units, scaled by the asset's decimals.
    pub formatted: String,
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the assets router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/assets", get(list_assets).post(register_asset))
        .route("/v1/assets/{asset}/mint", post(mint))
        .route("/v1/assets/{asset}/approve", post(approve))
        .route("/v1/assets/{asset}/balances/{account}", get(balance_of))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/assets — Register an asset.
#[utoipa::path(
    post,
    path = "/v1/assets",
    request_body = RegisterAssetRequest,
    responses(
        (status = 201, description = "Asset registered", body = AssetResponse),
        (status = 409, description = "Asset already registered", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "assets"
)]
pub async fn register_asset(
    State(state): State<AppState>,
    body: Result<Json<RegisterAssetRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AssetResponse>), AppError> {
    let req = extract_validated_json(body)?;
    let info = state
        .assets
        .register_asset(req.id, req.name.trim(), req.symbol.trim(), req.decimals)?;
    Ok((StatusCode::CREATED, Json(info.into())))
}

/// GET /v1/assets — List registered assets.
#[utoipa::path(
    get,
    path = "/v1/assets",
    responses(
        (status = 200, description = "Registered assets", body = Vec<AssetResponse>),
    ),
    tag = "assets"
)]
pub async fn list_assets(State(state): State<AppState>) -> Json<Vec<AssetResponse>> {
    Json(state.assets.assets().into_iter().map(AssetResponse::from).collect())
}

/// POST /v1/assets/{asset}/mint — Issue new units.
#[utoipa::path(
    post,
    path = "/v1/assets/{asset}/mint",
    params(("asset" = String, Path, description = "Asset ID")),
    request_body = MintRequest,
    responses(
        (status = 200, description = "Units issued", body = AssetResponse),
        (status = 404, description = "Asset not registered", body = crate::error::ErrorBody),
        (status = 422, description = "Supply overflow", body = crate::error::ErrorBody),
    ),
    tag = "assets"
)]
pub async fn mint(
    State(state): State<AppState>,
    Path(asset): Path<String>,
    body: Result<Json<MintRequest>, JsonRejection>,
) -> Result<Json<AssetResponse>, AppError> {
    let asset = parse_asset_id(&asset)?;
    let req = extract_json(body)?;
    state.assets.mint(&asset, &req.to, req.amount)?;
    state
        .assets
        .asset_info(&asset)
        .map(|info| Json(info.into()))
        .ok_or_else(|| AppError::NotFound(format!("asset {asset} not found")))
}

/// POST /v1/assets/{asset}/approve — Set the caller's allowance for a spender.
#[utoipa::path(
    post,
    path = "/v1/assets/{asset}/approve",
    params(
        ("asset" = String, Path, description = "Asset ID"),
        ("X-Account-Id" = String, Header, description = "Owning account"),
    ),
    request_body = ApproveRequest,
    responses(
        (status = 200, description = "Allowance set", body = AllowanceResponse),
        (status = 404, description = "Asset not registered", body = crate::error::ErrorBody),
    ),
    tag = "assets"
)]
pub async fn approve(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(asset): Path<String>,
    body: Result<Json<ApproveRequest>, JsonRejection>,
) -> Result<Json<AllowanceResponse>, AppError> {
    let asset = parse_asset_id(&asset)?;
    let req = extract_json(body)?;
    let spender = req
        .spender
        .unwrap_or_else(|| state.ledger.account().clone());
    state
        .assets
        .approve(&asset, &caller.account, &spender, req.amount)?;
    Ok(Json(AllowanceResponse {
        asset,
        owner: caller.account,
        spender,
        amount: req.amount,
    }))
}

/// GET /v1/assets/{asset}/balances/{account} — Balance of an account.
#[utoipa::path(
    get,
    path = "/v1/assets/{asset}/balances/{account}",
    params(
        ("asset" = String, Path, description = "Asset ID"),
        ("account" = String, Path, description = "Account ID"),
    ),
    responses(
        (status = 200, description = "Balance", body = BalanceResponse),
        (status = 404, description = "Asset not registered", body = crate::error::ErrorBody),
    ),
    tag = "assets"
)]
pub async fn balance_of(
    State(state): State<AppState>,
    Path((asset, account)): Path<(String, String)>,
) -> Result<Json<BalanceResponse>, AppError> {
    let asset = parse_asset_id(&asset)?;
    let account = parse_account_id(&account)?;
    let info = state
        .assets
        .asset_info(&asset)
        .ok_or_else(|| AppError::NotFound(format!("asset {asset} not found")))?;
    let balance = state.assets.balance_of(&asset, &account)?;
    Ok(Json(BalanceResponse {
        formatted: balance.format_units(info.decimals),
        asset,
        account,
        balance,
    }))
}
