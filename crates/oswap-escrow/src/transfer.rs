//! # Asset Transfer Seam
//!
//! The escrow ledger moves value only through [`AssetTransfer`]. It asks for
//! a transfer and trusts the success/failure signal; it never inspects a
//! balance. Implementations must be all-or-nothing per call: a failed call
//! moves nothing.

use oswap_core::{AccountId, Amount, AssetId};
use thiserror::Error;

/// Balance-moving operations the escrow ledger depends on.
pub trait AssetTransfer: Send + Sync + std::fmt::Debug {
    /// Move `amount` of `asset` from `from` to `to` on behalf of `spender`.
    ///
    /// Requires `from` to have authorized `spender` for at least `amount`.
    /// The authorization is consumed by the transfer.
    fn transfer_from(
        &self,
        spender: &AccountId,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), TransferError>;

    /// Move `amount` of `asset` out of `from`'s own holdings to `to`.
    ///
    /// The escrow ledger only ever calls this with `from` set to its own
    /// custody account.
    fn transfer(
        &self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), TransferError>;
}

/// Why an asset transfer (or asset-ledger administration call) was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// The asset is not known to the asset ledger.
    #[error("unknown asset {0}")]
    UnknownAsset(AssetId),

    /// The asset is already registered.
    #[error("asset {0} is already registered")]
    DuplicateAsset(AssetId),

    /// The source account holds less than the requested amount.
    #[error("insufficient {asset} balance for {account}: available {available}, requested {requested}")]
    InsufficientBalance {
        /// Asset being moved.
        asset: AssetId,
        /// Account being debited.
        account: AccountId,
        /// Current balance.
        available: Amount,
        /// Requested amount.
        requested: Amount,
    },

    /// The spender's authorization is smaller than the requested amount.
    #[error("insufficient {asset} allowance from {owner} to {spender}: available {available}, requested {requested}")]
    InsufficientAllowance {
        /// Asset being moved.
        asset: AssetId,
        /// Account that granted the authorization.
        owner: AccountId,
        /// Account spending the authorization.
        spender: AccountId,
        /// Remaining authorization.
        available: Amount,
        /// Requested amount.
        requested: Amount,
    },

    /// A balance or supply would exceed the representable range.
    #[error("arithmetic overflow on {asset}")]
    Overflow {
        /// Asset whose arithmetic overflowed.
        asset: AssetId,
    },

    /// The collaborator refused the transfer for an implementation-specific
    /// reason.
    #[error("transfer of {asset} rejected: {reason}")]
    Rejected {
        /// Asset being moved.
        asset: AssetId,
        /// Reason reported by the collaborator.
        reason: String,
    },
}
