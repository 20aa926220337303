//! # Escrow Error Types
//!
//! Every variant carries the order, state and quantities involved so an
//! operator can diagnose a rejection without the logs. All errors are
//! local and synchronous: the operation was refused and the ledger is
//! exactly as it was before the call.

use oswap_core::{AccountId, Amount, AssetId, OrderId, Timestamp};
use thiserror::Error;

use crate::order::OrderStatus;
use crate::transfer::TransferError;

/// Errors returned by [`EscrowLedger`](crate::EscrowLedger) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EscrowError {
    /// A deposit quantity or price is not strictly positive.
    #[error("{field} must be greater than zero, got {value}")]
    InvalidAmount {
        /// Which input was rejected (`amount` or `price`).
        field: &'static str,
        /// The rejected value.
        value: Amount,
    },

    /// The asset collaborator refused a transfer the operation needed.
    #[error("{operation} failed{}: {source}", order_suffix(.order_id))]
    TransferFailed {
        /// Order involved, if one was already assigned.
        order_id: Option<OrderId>,
        /// The ledger operation that attempted the transfer.
        operation: &'static str,
        /// The collaborator's reason.
        #[source]
        source: TransferError,
    },

    /// No order was ever assigned this id.
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// The order has already been filled or cancelled.
    #[error("order {order_id} is not active (status {status})")]
    OrderNotActive {
        /// The order identifier.
        order_id: OrderId,
        /// Its terminal status.
        status: OrderStatus,
    },

    /// The order's deadline has passed.
    #[error("order {order_id} expired at {deadline} (now {now})")]
    OrderExpired {
        /// The order identifier.
        order_id: OrderId,
        /// The order's deadline.
        deadline: Timestamp,
        /// Ledger time of the attempt.
        now: Timestamp,
    },

    /// The caller is not the order's depositor.
    #[error("{caller} is not the depositor of order {order_id}")]
    Unauthorized {
        /// The order identifier.
        order_id: OrderId,
        /// The account that attempted the operation.
        caller: AccountId,
    },

    /// The ledger's own custody account cannot deposit or buy.
    #[error("the ledger account {0} cannot trade against its own custody")]
    LedgerCaller(AccountId),

    /// There is no payment in custody for the depositor to withdraw.
    #[error("no proceeds available for order {order_id}: {reason}")]
    ProceedsUnavailable {
        /// The order identifier.
        order_id: OrderId,
        /// Why nothing can be withdrawn.
        reason: &'static str,
    },

    /// The order id sequence has no successor.
    #[error("order id sequence exhausted")]
    OrderIdExhausted,

    /// The custody total of an asset exceeds the representable range.
    #[error("custody total of {0} overflows")]
    CustodyOverflow(AssetId),

    /// A snapshot could not be restored.
    #[error("invalid ledger snapshot: {0}")]
    InvalidSnapshot(String),
}

fn order_suffix(order_id: &Option<OrderId>) -> String {
    order_id
        .map(|id| format!(" for order {id}"))
        .unwrap_or_default()
}

impl EscrowError {
    /// Whether this is one of the reasons an order cannot be filled
    /// (unknown, terminated, or past its deadline).
    pub fn is_not_fillable(&self) -> bool {
        matches!(
            self,
            Self::OrderNotFound(_) | Self::OrderNotActive { .. } | Self::OrderExpired { .. }
        )
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidAmount { .. } => "INVALID_AMOUNT",
            Self::TransferFailed { .. } => "TRANSFER_FAILED",
            Self::OrderNotFound(_) => "ORDER_NOT_FOUND",
            Self::OrderNotActive { .. } => "ORDER_NOT_ACTIVE",
            Self::OrderExpired { .. } => "ORDER_EXPIRED",
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::LedgerCaller(_) => "LEDGER_CALLER",
            Self::ProceedsUnavailable { .. } => "PROCEEDS_UNAVAILABLE",
            Self::OrderIdExhausted => "ORDER_ID_EXHAUSTED",
            Self::CustodyOverflow(_) => "CUSTODY_OVERFLOW",
            Self::InvalidSnapshot(_) => "INVALID_SNAPSHOT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_amount_display() {
        let err = EscrowError::InvalidAmount {
            field: "price",
            value: Amount::ZERO,
        };
        assert_eq!(format!("{err}"), "price must be greater than zero, got 0");
    }

    #[test]
    fn transfer_failed_display_with_and_without_order() {
        let source = TransferError::UnknownAsset(AssetId::new("TKZ").unwrap());
        let err = EscrowError::TransferFailed {
            order_id: None,
            operation: "deposit",
            source: source.clone(),
        };
        assert_eq!(format!("{err}"), "deposit failed: unknown asset TKZ");

        let err = EscrowError::TransferFailed {
            order_id: Some(OrderId::new(4)),
            operation: "purchase",
            source,
        };
        assert_eq!(format!("{err}"), "purchase failed for order 4: unknown asset TKZ");
    }

    #[test]
    fn transfer_failed_exposes_source() {
        use std::error::Error as _;
        let err = EscrowError::TransferFailed {
            order_id: None,
            operation: "deposit",
            source: TransferError::UnknownAsset(AssetId::new("TKZ").unwrap()),
        };
        assert!(err.source().is_some());
    }

    #[test]
    fn not_active_display_includes_status() {
        let err = EscrowError::OrderNotActive {
            order_id: OrderId::new(2),
            status: OrderStatus::Cancelled,
        };
        assert!(format!("{err}").contains("CANCELLED"));
    }

    #[test]
    fn not_fillable_classification() {
        assert!(EscrowError::OrderNotFound(OrderId::FIRST).is_not_fillable());
        assert!(EscrowError::OrderExpired {
            order_id: OrderId::FIRST,
            deadline: Timestamp::parse("2026-01-15T12:00:00Z").unwrap(),
            now: Timestamp::parse("2026-01-15T12:00:01Z").unwrap(),
        }
        .is_not_fillable());
        assert!(!EscrowError::Unauthorized {
            order_id: OrderId::FIRST,
            caller: AccountId::new("mallory").unwrap(),
        }
        .is_not_fillable());
    }

    #[test]
    fn codes_are_distinct() {
        let errors = [
            EscrowError::OrderNotFound(OrderId::FIRST),
            EscrowError::OrderIdExhausted,
            EscrowError::InvalidSnapshot("x".into()),
            EscrowError::InvalidAmount {
                field: "amount",
                value: Amount::ZERO,
            },
        ];
        let codes: std::collections::HashSet<_> = errors.iter().map(|e| e.code()).collect();
        assert_eq!(codes.len(), errors.len());
    }
}
