//! # Custody Reporting API
//!
//! - `GET /v1/custody` — funds held by the escrow ledger, per asset and per
//!   order.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use oswap_core::{AccountId, Amount, AssetId, OrderId};
use oswap_escrow::HoldingKind;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::state::AppState;

/// Total custody of one asset.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssetTotal {
    #[schema(value_type = String)]
    pub asset: AssetId,
    #[schema(value_type = String)]
    pub amount: Amount,
}

/// What the ledger holds for one order.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderHolding {
    #[schema(value_type = u64)]
    pub order_id: OrderId,
    #[schema(value_type = String)]
    pub asset: AssetId,
    #[schema(value_type = String)]
    pub amount: Amount,
    /// `deposit` for an active order, `proceeds` for an unwithdrawn payment.
    #[schema(value_type = String)]
    pub kind: HoldingKind,
}

/// Custody report.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CustodyResponse {
    /// The ledger's custody account.
    #[schema(value_type = String)]
    pub account: AccountId,
    pub totals: Vec<AssetTotal>,
    pub holdings: Vec<OrderHolding>,
}

/// Build the custody router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/custody", get(custody))
}

/// GET /v1/custody — Funds held by the escrow ledger.
#[utoipa::path(
    get,
    path = "/v1/custody",
    responses(
        (status = 200, description = "Custody report", body = CustodyResponse),
    ),
    tag = "custody"
)]
pub async fn custody(State(state): State<AppState>) -> Result<Json<CustodyResponse>, AppError> {
    let totals = state
        .ledger
        .custody()?
        .into_iter()
        .map(|(asset, amount)| AssetTotal { asset, amount })
        .collect();
    let holdings = state
        .ledger
        .holdings()
        .into_iter()
        .map(|(order_id, h)| OrderHolding {
            order_id,
            asset: h.asset,
            amount: h.amount,
            kind: h.kind,
        })
        .collect();
    Ok(Json(CustodyResponse {
        account: state.ledger.account().clone(),
        totals,
        holdings,
    }))
}
