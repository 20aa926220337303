//! # Orders
//!
//! An order is one depositor's standing offer: `amount_deposited` of
//! `sell_asset` in exchange for `price` of `payment_asset`, open until
//! `deadline`.
//!
//! Status machine: `Active → [Filled | Cancelled]`. Both targets are
//! terminal; an order leaves `Active` at most once and never returns.

use oswap_core::{AccountId, Amount, AssetId, OrderId, Timestamp};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Funds are in custody and the order may be filled or cancelled.
    Active,
    /// A buyer paid the price and received the deposit. Terminal state.
    Filled,
    /// The depositor took the deposit back. Terminal state.
    Cancelled,
}

impl OrderStatus {
    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }

    /// The canonical string name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Filled => "FILLED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of a deposit, as supplied by the depositor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    /// Asset placed in escrow.
    pub sell_asset: AssetId,
    /// Asset the depositor wants in return.
    pub payment_asset: AssetId,
    /// Quantity of `sell_asset` to escrow.
    pub amount: Amount,
    /// Quantity of `payment_asset` a buyer must pay.
    pub price: Amount,
    /// Last instant at which the order may be filled.
    pub deadline: Timestamp,
}

/// A stored escrow order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Sequence number assigned at deposit.
    pub id: OrderId,
    /// Account that created the order.
    pub depositor: AccountId,
    /// Asset held in escrow.
    pub sell_asset: AssetId,
    /// Asset the depositor is paid in.
    pub payment_asset: AssetId,
    /// Quantity of `sell_asset` escrowed at creation.
    pub amount_deposited: Amount,
    /// Quantity of `payment_asset` required to fill.
    pub price: Amount,
    /// Last fillable instant (inclusive).
    pub deadline: Timestamp,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// Account that filled the order.
    #[serde(default)]
    pub buyer: Option<AccountId>,
    /// Whether the depositor has taken the payment out of custody.
    #[serde(default)]
    pub proceeds_withdrawn: bool,
    /// Ledger time of the deposit.
    pub created_at: Timestamp,
    /// Ledger time of the terminal transition.
    #[serde(default)]
    pub closed_at: Option<Timestamp>,
}

impl Order {
    /// Whether the order is still open.
    pub fn is_active(&self) -> bool {
        self.status == OrderStatus::Active
    }

    /// Whether the deadline has passed at `now`. The deadline instant itself
    /// is still in time.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now > self.deadline
    }

    /// Whether a purchase at `now` may succeed.
    pub fn is_fillable_at(&self, now: Timestamp) -> bool {
        self.is_active() && !self.is_expired_at(now)
    }

    /// Whether the depositor still has payment waiting in custody.
    pub fn has_pending_proceeds(&self) -> bool {
        self.status == OrderStatus::Filled && !self.proceeds_withdrawn
    }

    /// Read-only projection of this order.
    pub fn view(&self) -> OrderView {
        OrderView {
            id: self.id,
            depositor: self.depositor.clone(),
            sell_asset: self.sell_asset.clone(),
            payment_asset: self.payment_asset.clone(),
            amount_deposited: self.amount_deposited,
            price: self.price,
            deadline: self.deadline,
            active: self.is_active(),
            status: self.status,
            buyer: self.buyer.clone(),
            proceeds_withdrawn: self.proceeds_withdrawn,
            created_at: self.created_at,
            closed_at: self.closed_at,
        }
    }
}

/// What callers see of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderView {
    pub id: OrderId,
    pub depositor: AccountId,
    pub sell_asset: AssetId,
    pub payment_asset: AssetId,
    pub amount_deposited: Amount,
    pub price: Amount,
    pub deadline: Timestamp,
    /// `true` exactly while `status` is `ACTIVE`.
    pub active: bool,
    pub status: OrderStatus,
    pub buyer: Option<AccountId>,
    pub proceeds_withdrawn: bool,
    pub created_at: Timestamp,
    pub closed_at: Option<Timestamp>,
}
