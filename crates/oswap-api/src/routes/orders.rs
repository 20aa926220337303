//! # Escrow Orders API
//!
//! Order lifecycle on the escrow ledger. Every mutating endpoint acts on
//! behalf of the account named in `X-Account-Id`.
//!
//! ## Endpoints
//!
//! - `POST /v1/orders` — deposit and open an order
//! - `GET /v1/orders` — list orders (`?active=true` for open ones)
//! - `GET /v1/orders/{id}` — view an order
//! - `POST /v1/orders/{id}/purchase` — fill an order
//! - `POST /v1/orders/{id}/cancel` — cancel an order
//! - `POST /v1/orders/{id}/proceeds` — withdraw a filled order's payment
//! - `GET /v1/orders/{id}/events` — ledger events of an order

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use oswap_core::{AccountId, Amount, AssetId, OrderId, Timestamp};
use oswap_escrow::{LedgerEvent, NewOrder, OrderStatus, OrderView};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, parse_order_id, Validate};
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to deposit funds and open an order.
///
/// Exactly one of `deadline` and `expires_in_secs` must be given.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    /// Asset to escrow.
    #[schema(value_type = String, example = "TKA")]
    pub sell_asset: AssetId,
    /// Asset wanted in return.
    #[schema(value_type = String, example = "TKB")]
    pub payment_asset: AssetId,
    /// Quantity of `sell_asset` in smallest units.
    #[schema(value_type = String, example = "100000000000000000000")]
    pub amount: Amount,
    /// Quantity of `payment_asset` in smallest units.
    #[schema(value_type = String, example = "20000000000000000000")]
    pub price: Amount,
    /// Absolute deadline (RFC 3339).
    #[schema(value_type = Option<String>, example = "2026-01-15T13:00:00Z")]
    pub deadline: Option<Timestamp>,
    /// Deadline relative to ledger time, in seconds.
    pub expires_in_secs: Option<u32>,
}

impl Validate for CreateOrderRequest {
    fn validate(&self) -> Result<(), String> {
        match (&self.deadline, &self.expires_in_secs) {
            (Some(_), Some(_)) => Err("give either deadline or expires_in_secs, not both".into()),
            (None, None) => Err("one of deadline or expires_in_secs is required".into()),
            _ => Ok(()),
        }
    }
}

/// Response to a successful deposit.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderResponse {
    #[schema(value_type = u64)]
    pub order_id: OrderId,
    pub order: OrderResponse,
}

/// An order as returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    #[schema(value_type = u64)]
    pub id: OrderId,
    #[schema(value_type = String)]
    pub depositor: AccountId,
    #[schema(value_type = String)]
    pub sell_asset: AssetId,
    #[schema(value_type = String)]
    pub payment_asset: AssetId,
    #[schema(value_type = String)]
    pub amount_deposited: Amount,
    #[schema(value_type = String)]
    pub price: Amount,
    #[schema(value_type = String)]
    pub deadline: Timestamp,
    /// `true` exactly while `status` is `ACTIVE`.
    pub active: bool,
    /// One of `ACTIVE`, `FILLED`, `CANCELLED`.
    #[schema(value_type = String)]
    pub status: OrderStatus,
    #[schema(value_type = Option<String>)]
    pub buyer: Option<AccountId>,
    pub proceeds_withdrawn: bool,
    #[schema(value_type = String)]
    pub created_at: Timestamp,
    #[schema(value_type = Option<String>)]
    pub closed_at: Option<Timestamp>,
}

impl From<OrderView> for OrderResponse {
    fn from(view: OrderView) -> Self {
        Self {
            id: view.id,
            depositor: view.depositor,
            sell_asset: view.sell_asset,
            payment_asset: view.payment_asset,
            amount_deposited: view.amount_deposited,
            price: view.price,
            deadline: view.deadline,
            active: view.active,
            status: view.status,
            buyer: view.buyer,
            proceeds_withdrawn: view.proceeds_withdrawn,
            created_at: view.created_at,
            closed_at: view.closed_at,
        }
    }
}

/// Payment paid out by a proceeds withdrawal.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProceedsResponse {
    #[schema(value_type = u64)]
    pub order_id: OrderId,
    #[schema(value_type = String)]
    pub asset: AssetId,
    #[schema(value_type = String)]
    pub amount: Amount,
}

/// One ledger event.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventResponse {
    /// Event kind, e.g. `order_deposited` or `order_filled`.
    #[serde(rename = "type")]
    pub kind: String,
    #[schema(value_type = u64)]
    pub order_id: OrderId,
    #[schema(value_type = String)]
    pub at: Timestamp,
    /// The full event as recorded by the ledger.
    #[schema(value_type = Object)]
    pub event: serde_json::Value,
}

impl TryFrom<LedgerEvent> for EventResponse {
    type Error = AppError;

    fn try_from(event: LedgerEvent) -> Result<Self, AppError> {
        Ok(Self {
            kind: event.kind().to_string(),
            order_id: event.order_id(),
            at: event.at(),
            event: serde_json::to_value(&event)
                .map_err(|e| AppError::Internal(format!("event serialization: {e}")))?,
        })
    }
}

/// Filters for `GET /v1/orders`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListOrdersQuery {
    /// Only orders not yet filled or cancelled, including expired ones.
    #[serde(default)]
    pub active: bool,
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/orders", get(list_orders).post(create_order))
        .route("/v1/orders/{id}", get(get_order))
        .route("/v1/orders/{id}/purchase", post(purchase_order))
        .route("/v1/orders/{id}/cancel", post(cancel_order))
        .route("/v1/orders/{id}/proceeds", post(withdraw_proceeds))
        .route("/v1/orders/{id}/events", get(order_events))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/orders — Escrow the caller's funds and open an order.
#[utoipa::path(
    post,
    path = "/v1/orders",
    params(("X-Account-Id" = String, Header, description = "Depositing account")),
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order opened", body = CreateOrderResponse),
        (status = 400, description = "Malformed request", body = crate::error::ErrorBody),
        (status = 401, description = "Missing caller identity", body = crate::error::ErrorBody),
        (status = 403, description = "Caller is the ledger's custody account", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid amount or transfer refused", body = crate::error::ErrorBody),
    ),
    tag = "orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), AppError> {
    let req = extract_validated_json(body)?;
    let deadline = match (req.deadline, req.expires_in_secs) {
        (Some(deadline), _) => deadline,
        (None, Some(secs)) => state
            .ledger
            .now()
            .checked_add_secs(i64::from(secs))
            .ok_or_else(|| AppError::Validation("expires_in_secs is out of range".into()))?,
        (None, None) => {
            return Err(AppError::Validation(
                "one of deadline or expires_in_secs is required".into(),
            ))
        }
    };

    let order_id = state.ledger.deposit_order(
        &caller.account,
        NewOrder {
            sell_asset: req.sell_asset,
            payment_asset: req.payment_asset,
            amount: req.amount,
            price: req.price,
            deadline,
        },
    )?;
    let order = state.ledger.view_order(order_id)?.into();
    Ok((StatusCode::CREATED, Json(CreateOrderResponse { order_id, order })))
}

/// GET /v1/orders — List orders in id order.
#[utoipa::path(
    get,
    path = "/v1/orders",
    params(ListOrdersQuery),
    responses(
        (status = 200, description = "Orders", body = Vec<OrderResponse>),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Json<Vec<OrderResponse>> {
    let views = if query.active {
        state.ledger.active_orders()
    } else {
        state.ledger.list_orders()
    };
    Json(views.into_iter().map(OrderResponse::from).collect())
}

/// GET /v1/orders/{id} — View a single order.
#[utoipa::path(
    get,
    path = "/v1/orders/{id}",
    params(("id" = u64, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found", body = crate::error::ErrorBody),
    ),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, AppError> {
    let id = parse_order_id(&id)?;
    Ok(Json(state.ledger.view_order(id)?.into()))
}

/// POST /v1/orders/{id}/purchase — Pay the price and receive the deposit.
#[utoipa::path(
    post,
    path = "/v1/orders/{id}/purchase",
    params(
        ("id" = u64, Path, description = "Order ID"),
        ("X-Account-Id" = String, Header, description = "Buying account"),
    ),
    responses(
        (status = 200, description = "Order filled", body = OrderResponse),
        (status = 403, description = "Caller is the ledger's custody account", body = crate::error::ErrorBody),
        (status = 404, description = "Order not found", body = crate::error::ErrorBody),
        (status = 409, description = "Order not active or expired", body = crate::error::ErrorBody),
        (status = 422, description = "Payment or delivery refused", body = crate::error::ErrorBody),
    ),
    tag = "orders"
)]
pub async fn purchase_order(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, AppError> {
    let id = parse_order_id(&id)?;
    Ok(Json(state.ledger.purchase_order(&caller.account, id)?.into()))
}

/// POST /v1/orders/{id}/cancel — Return the deposit to its depositor.
#[utoipa::path(
    post,
    path = "/v1/orders/{id}/cancel",
    params(
        ("id" = u64, Path, description = "Order ID"),
        ("X-Account-Id" = String, Header, description = "Depositing account"),
    ),
    responses(
        (status = 200, description = "Order cancelled", body = OrderResponse),
        (status = 403, description = "Caller is not the depositor", body = crate::error::ErrorBody),
        (status = 404, description = "Order not found", body = crate::error::ErrorBody),
        (status = 409, description = "Order not active", body = crate::error::ErrorBody),
    ),
    tag = "orders"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, AppError> {
    let id = parse_order_id(&id)?;
    Ok(Json(state.ledger.cancel_order(&caller.account, id)?.into()))
}

/// POST /v1/orders/{id}/proceeds — Pay a filled order's payment to its depositor.
#[utoipa::path(
    post,
    path = "/v1/orders/{id}/proceeds",
    params(
        ("id" = u64, Path, description = "Order ID"),
        ("X-Account-Id" = String, Header, description = "Depositing account"),
    ),
    responses(
        (status = 200, description = "Proceeds paid out", body = ProceedsResponse),
        (status = 403, description = "Caller is not the depositor", body = crate::error::ErrorBody),
        (status = 404, description = "Order not found", body = crate::error::ErrorBody),
        (status = 409, description = "No proceeds to withdraw", body = crate::error::ErrorBody),
    ),
    tag = "orders"
)]
pub async fn withdraw_proceeds(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<String>,
) -> Result<Json<ProceedsResponse>, AppError> {
    let id = parse_order_id(&id)?;
    let amount = state.ledger.withdraw_proceeds(&caller.account, id)?;
    let asset = state.ledger.view_order(id)?.payment_asset;
    Ok(Json(ProceedsResponse {
        order_id: id,
        asset,
        amount,
    }))
}

/// GET /v1/orders/{id}/events — Ledger events of one order, oldest first.
#[utoipa::path(
    get,
    path = "/v1/orders/{id}/events",
    params(("id" = u64, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Events of the order", body = Vec<EventResponse>),
        (status = 404, description = "Order not found", body = crate::error::ErrorBody),
    ),
    tag = "orders"
)]
pub async fn order_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    let id = parse_order_id(&id)?;
    let events = state
        .ledger
        .events_for(id)?
        .into_iter()
        .map(EventResponse::try_from)
        .collect::<Result<_, _>>()?;
    Ok(Json(events))
}
