//! # oswap-escrow — The Escrow Ledger
//!
//! A depositor escrows a quantity of one fungible asset, names the asset and
//! price it wants in return, and sets a deadline. Any counterparty may fill
//! the order atomically before the deadline; the depositor may cancel it at
//! any time while it is active.
//!
//! - **Ledger** ([`ledger`]): the [`EscrowLedger`] state machine. Orders move
//!   `Active → {Filled, Cancelled}` exactly once.
//!
//! - **Transfer seam** ([`transfer`]): the [`AssetTransfer`] trait through
//!   which the ledger pulls funds into and pushes funds out of its custody
//!   account. The ledger never reads balances.
//!
//! - **Custody** ([`custody`]): funds owed by the ledger, tagged by order.
//!
//! - **Assets** ([`assets`]): [`InMemoryAssetLedger`], an allowance-based
//!   fungible asset ledger implementing [`AssetTransfer`].
//!
//! - **Events** ([`event`]): the append-only audit log of ledger mutations.
//!
//! ## Concurrency
//!
//! The ledger is single-writer. Each state-changing operation holds one lock
//! for its full duration, transfers included, so two fills of the same order
//! can never both succeed and a failed transfer never leaves a half-applied
//! state flip behind.

pub mod assets;
pub mod custody;
pub mod error;
pub mod event;
#[cfg(any(test, feature = "fixture"))]
pub mod fixture;
pub mod ledger;
pub mod order;
pub mod transfer;

pub use assets::{AssetInfo, AssetLedgerSnapshot, InMemoryAssetLedger};
pub use custody::{CustodyBook, Holding, HoldingKind};
pub use error::EscrowError;
pub use event::LedgerEvent;
pub use ledger::{EscrowLedger, LedgerSnapshot};
pub use order::{NewOrder, Order, OrderStatus, OrderView};
pub use transfer::{AssetTransfer, TransferError};
