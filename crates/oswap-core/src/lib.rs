//! # oswap-core — Foundational Types for orderswap
//!
//! Every other crate in the workspace depends on `oswap-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** [`AccountId`], [`AssetId`]
//!    and [`OrderId`] are distinct types. You cannot pass an asset where an
//!    account is expected.
//!
//! 2. **Integer amounts only.** [`Amount`] wraps a `u128` in the asset's
//!    smallest unit. All arithmetic is checked. Amounts serialize as decimal
//!    strings so that 18-decimal quantities survive JSON round trips.
//!
//! 3. **UTC-only timestamps.** [`Timestamp`] is UTC with seconds precision.
//!    Deadlines and ledger time are compared as `Timestamp`s.
//!
//! 4. **Time is injected.** Components that need "now" take a [`Clock`].
//!    Production uses [`SystemClock`]; tests drive a [`ManualClock`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `oswap-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod amount;
pub mod error;
pub mod identity;
pub mod temporal;

pub use amount::Amount;
pub use error::ValidationError;
pub use identity::{AccountId, AssetId, OrderId};
pub use temporal::{Clock, ManualClock, SystemClock, Timestamp};
