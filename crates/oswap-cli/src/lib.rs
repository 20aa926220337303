//! # oswap-cli — Command Line Interface for orderswap
//!
//! Every invocation loads the state file, applies one operation to the
//! escrow ledger or its asset ledger, and writes the state file back only
//! when the operation succeeds.
//!
//! ## Subcommands
//!
//! - `oswap asset` — register assets, mint, approve, read balances.
//! - `oswap order` — deposit, purchase, cancel, withdraw, view, list.
//! - `oswap custody` — what the ledger holds.
//!
//! ```bash
//! oswap asset register TKA --name TokenA --symbol TKA
//! oswap asset mint TKA --to alice 100
//! oswap asset approve TKA --owner alice 100
//! oswap order deposit --from alice --sell TKA --pay TKB --amount 100 --price 20 --expires-in 3600
//! oswap order purchase 0 --buyer bob
//! ```
//!
//! Quantities on the command line are whole units, scaled by the asset's
//! decimals.

pub mod asset;
pub mod custody;
pub mod order;
pub mod workspace;

pub use workspace::{StateOptions, Workspace};
