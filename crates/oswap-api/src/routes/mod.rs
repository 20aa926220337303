//! # API Route Modules
//!
//! - `orders` — order lifecycle on the escrow ledger (deposit, purchase,
//!   cancel, proceeds withdrawal, events).
//! - `custody` — what the ledger holds, per asset and per order.
//! - `assets` — administration of the backing asset ledger.

pub mod assets;
pub mod custody;
pub mod orders;
