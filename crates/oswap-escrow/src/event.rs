//! # Ledger Events
//!
//! Append-only record of every successful mutation, stamped with ledger
//! time. Rejected operations leave no event.

use oswap_core::{AccountId, Amount, AssetId, OrderId, Timestamp};
use serde::{Deserialize, Serialize};

/// A successful state transition of the escrow ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Funds entered custody and a new order opened.
    OrderDeposited {
        order_id: OrderId,
        depositor: AccountId,
        sell_asset: AssetId,
        payment_asset: AssetId,
        amount: Amount,
        price: Amount,
        deadline: Timestamp,
        at: Timestamp,
    },
    /// A buyer paid and received the deposit.
    OrderFilled {
        order_id: OrderId,
        buyer: AccountId,
        at: Timestamp,
    },
    /// The depositor reclaimed the deposit.
    OrderCancelled {
        order_id: OrderId,
        depositor: AccountId,
        at: Timestamp,
    },
    /// The depositor took the buyer's payment out of custody.
    ProceedsWithdrawn {
        order_id: OrderId,
        depositor: AccountId,
        asset: AssetId,
        amount: Amount,
        at: Timestamp,
    },
}

impl LedgerEvent {
    /// The order this event concerns.
    pub fn order_id(&self) -> OrderId {
        match self {
            Self::OrderDeposited { order_id, .. }
            | Self::OrderFilled { order_id, .. }
            | Self::OrderCancelled { order_id, .. }
            | Self::ProceedsWithdrawn { order_id, .. } => *order_id,
        }
    }

    /// Ledger time of the event.
    pub fn at(&self) -> Timestamp {
        match self {
            Self::OrderDeposited { at, .. }
            | Self::OrderFilled { at, .. }
            | Self::OrderCancelled { at, .. }
            | Self::ProceedsWithdrawn { at, .. } => *at,
        }
    }

    /// Short name of the event kind, matching the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OrderDeposited { .. } => "order_deposited",
            Self::OrderFilled { .. } => "order_filled",
            Self::OrderCancelled { .. } => "order_cancelled",
            Self::ProceedsWithdrawn { .. } => "proceeds_withdrawn",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_tag_matches_kind() {
        let event = LedgerEvent::OrderFilled {
            order_id: OrderId::new(3),
            buyer: AccountId::new("bob").unwrap(),
            at: Timestamp::parse("2026-01-15T12:00:00Z").unwrap(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.kind());
        assert_eq!(json["order_id"], 3);
        assert_eq!(event.order_id(), OrderId::new(3));
        let back: LedgerEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
