//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI 3.1 document
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI document for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "orderswap API",
        version = "0.1.0",
        description = "Escrow ledger for bilateral asset swaps: deposit an order, fill it atomically before its deadline, cancel it, and withdraw proceeds.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        // Orders
        crate::routes::orders::create_order,
        crate::routes::orders::list_orders,
        crate::routes::orders::get_order,
        crate::routes::orders::purchase_order,
        crate::routes::orders::cancel_order,
        crate::routes::orders::withdraw_proceeds,
        crate::routes::orders::order_events,
        // Custody
        crate::routes::custody::custody,
        // Assets
        crate::routes::assets::register_asset,
        crate::routes::assets::list_assets,
        crate::routes::assets::mint,
        crate::routes::assets::approve,
        crate::routes::assets::balance_of,
    ),
    components(schemas(
        // Error types
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        // Order DTOs
        crate::routes::orders::CreateOrderRequest,
        crate::routes::orders::CreateOrderResponse,
        crate::routes::orders::OrderResponse,
        crate::routes::orders::ProceedsResponse,
        crate::routes::orders::EventResponse,
        // Custody DTOs
        crate::routes::custody::CustodyResponse,
        crate::routes::custody::AssetTotal,
        crate::routes::custody::OrderHolding,
        // Asset DTOs
        crate::routes::assets::RegisterAssetRequest,
        crate::routes::assets::AssetResponse,
        crate::routes::assets::MintRequest,
        crate::routes::assets::ApproveRequest,
        crate::routes::assets::AllowanceResponse,
        crate::routes::assets::BalanceResponse,
    )),
    tags(
        (name = "orders", description = "Escrow order lifecycle"),
        (name = "custody", description = "Funds held by the escrow ledger"),
        (name = "assets", description = "Backing asset ledger administration"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI document.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
