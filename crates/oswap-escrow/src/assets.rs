//! # In-Memory Asset Ledger
//!
//! An allowance-based fungible asset ledger: each registered asset keeps
//! balances per account and authorizations per `(owner, spender)` pair.
//! `approve` replaces an authorization outright; `transfer_from` consumes
//! it.
//!
//! All operations are synchronous and take a `parking_lot` lock for their
//! full duration, so each call is atomic. The lock is never held across a
//! call into another component.

use std::collections::BTreeMap;

use oswap_core::{AccountId, Amount, AssetId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::transfer::{AssetTransfer, TransferError};

/// Descriptive metadata of a registered asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    /// Asset identifier.
    pub id: AssetId,
    /// Display name (e.g. "TokenA").
    pub name: String,
    /// Ticker symbol (e.g. "TKA").
    pub symbol: String,
    /// Number of fractional digits in one whole unit.
    pub decimals: u8,
    /// Total minted quantity.
    pub total_supply: Amount,
}

/// Complete state of one asset: metadata, balances, and authorizations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetState {
    /// Metadata.
    pub info: AssetInfo,
    /// Balance by holder.
    #[serde(default)]
    pub balances: BTreeMap<AccountId, Amount>,
    /// Authorization by owner, then spender.
    #[serde(default)]
    pub allowances: BTreeMap<AccountId, BTreeMap<AccountId, Amount>>,
}

impl AssetState {
    fn balance(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(Amount::ZERO)
    }

    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|by_spender| by_spender.get(spender))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    /// Debit `from` and credit `to`, validating both sides before writing.
    fn move_balance(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), TransferError> {
        let available = self.balance(from);
        let debited = available
            .checked_sub(amount)
            .ok_or_else(|| TransferError::InsufficientBalance {
                asset: self.info.id.clone(),
                account: from.clone(),
                available,
                requested: amount,
            })?;
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance(to)
            .checked_add(amount)
            .ok_or_else(|| TransferError::Overflow {
                asset: self.info.id.clone(),
            })?;
        self.balances.insert(from.clone(), debited);
        self.balances.insert(to.clone(), credited);
        Ok(())
    }
}

/// Serializable image of an [`InMemoryAssetLedger`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetLedgerSnapshot {
    /// Every registered asset.
    pub assets: Vec<AssetState>,
}

/// Thread-safe in-memory asset ledger.
#[derive(Debug, Default)]
pub struct InMemoryAssetLedger {
    books: RwLock<BTreeMap<AssetId, AssetState>>,
}

impl InMemoryAssetLedger {
    /// Create a ledger with no registered assets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new asset with zero supply.
    pub fn register_asset(
        &self,
        id: AssetId,
        name: impl Into<String>,
        symbol: impl Into<String>,
        decimals: u8,
    ) -> Result<AssetInfo, TransferError> {
        let mut books = self.books.write();
        if books.contains_key(&id) {
            return Err(TransferError::DuplicateAsset(id));
        }
        let info = AssetInfo {
            id: id.clone(),
            name: name.into(),
            symbol: symbol.into(),
            decimals,
            total_supply: Amount::ZERO,
        };
        books.insert(
            id,
            AssetState {
                info: info.clone(),
                balances: BTreeMap::new(),
                allowances: BTreeMap::new(),
            },
        );
        tracing::debug!(asset = %info.id, symbol = %info.symbol, decimals, "asset registered");
        Ok(info)
    }

    /// Create `amount` new units of `asset` in `to`'s balance.
    pub fn mint(&self, asset: &AssetId, to: &AccountId, amount: Amount) -> Result<(), TransferError> {
        let mut books = self.books.write();
        let book = books
            .get_mut(asset)
            .ok_or_else(|| TransferError::UnknownAsset(asset.clone()))?;
        let overflow = || TransferError::Overflow {
            asset: asset.clone(),
        };
        let supply = book.info.total_supply.checked_add(amount).ok_or_else(overflow)?;
        let balance = book.balance(to).checked_add(amount).ok_or_else(overflow)?;
        book.info.total_supply = supply;
        book.balances.insert(to.clone(), balance);
        tracing::debug!(asset = %asset, to = %to, amount = %amount, "minted");
        Ok(())
    }

    /// Set `spender`'s authorization over `owner`'s `asset` to exactly
    /// `amount`, replacing any previous authorization.
    pub fn approve(
        &self,
        asset: &AssetId,
        owner: &AccountId,
        spender: &AccountId,
        amount: Amount,
    ) -> Result<(), TransferError> {
        let mut books = self.books.write();
        let book = books
            .get_mut(asset)
            .ok_or_else(|| TransferError::UnknownAsset(asset.clone()))?;
        book.allowances
            .entry(owner.clone())
            .or_default()
            .insert(spender.clone(), amount);
        tracing::debug!(asset = %asset, owner = %owner, spender = %spender, amount = %amount, "approval set");
        Ok(())
    }

    /// Remaining authorization of `spender` over `owner`'s `asset`.
    pub fn allowance(
        &self,
        asset: &AssetId,
        owner: &AccountId,
        spender: &AccountId,
    ) -> Result<Amount, TransferError> {
        self.books
            .read()
            .get(asset)
            .map(|book| book.allowance(owner, spender))
            .ok_or_else(|| TransferError::UnknownAsset(asset.clone()))
    }

    /// Balance of `account` in `asset`.
    pub fn balance_of(&self, asset: &AssetId, account: &AccountId) -> Result<Amount, TransferError> {
        self.books
            .read()
            .get(asset)
            .map(|book| book.balance(account))
            .ok_or_else(|| TransferError::UnknownAsset(asset.clone()))
    }

    /// Total minted quantity of `asset`.
    pub fn total_supply(&self, asset: &AssetId) -> Result<Amount, TransferError> {
        self.books
            .read()
            .get(asset)
            .map(|book| book.info.total_supply)
            .ok_or_else(|| TransferError::UnknownAsset(asset.clone()))
    }

    /// Metadata of a registered asset.
    pub fn asset_info(&self, asset: &AssetId) -> Option<AssetInfo> {
        self.books.read().get(asset).map(|book| book.info.clone())
    }

    /// Metadata of every registered asset, ordered by identifier.
    pub fn assets(&self) -> Vec<AssetInfo> {
        self.books.read().values().map(|book| book.info.clone()).collect()
    }

    /// Capture the full ledger state.
    pub fn snapshot(&self) -> AssetLedgerSnapshot {
        AssetLedgerSnapshot {
            assets: self.books.read().values().cloned().collect(),
        }
    }

    /// Rebuild a ledger from a snapshot.
    ///
    /// Rejects snapshots that register an asset twice or whose balances do
    /// not sum to the recorded supply.
    pub fn restore(snapshot: AssetLedgerSnapshot) -> Result<Self, TransferError> {
        let mut books = BTreeMap::new();
        for state in snapshot.assets {
            let id = state.info.id.clone();
            let mut sum = Amount::ZERO;
            for balance in state.balances.values() {
                sum = sum
                    .checked_add(*balance)
                    .ok_or_else(|| TransferError::Overflow { asset: id.clone() })?;
            }
            if sum != state.info.total_supply {
                return Err(TransferError::Rejected {
                    asset: id,
                    reason: format!(
                        "balances sum to {sum} but recorded supply is {}",
                        state.info.total_supply
                    ),
                });
            }
            if books.insert(id.clone(), state).is_some() {
                return Err(TransferError::DuplicateAsset(id));
            }
        }
        Ok(Self {
            books: RwLock::new(books),
        })
    }
}

impl AssetTransfer for InMemoryAssetLedger {
    fn transfer_from(
        &self,
        spender: &AccountId,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), TransferError> {
        let mut books = self.books.write();
        let book = books
            .get_mut(asset)
            .ok_or_else(|| TransferError::UnknownAsset(asset.clone()))?;

        let available = book.allowance(from, spender);
        let remaining =
            available
                .checked_sub(amount)
                .ok_or_else(|| TransferError::InsufficientAllowance {
                    asset: asset.clone(),
                    owner: from.clone(),
                    spender: spender.clone(),
                    available,
                    requested: amount,
                })?;

        book.move_balance(from, to, amount)?;
        book.allowances
            .entry(from.clone())
            .or_default()
            .insert(spender.clone(), remaining);
        Ok(())
    }

    fn transfer(
        &self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), TransferError> {
        let mut books = self.books.write();
        let book = books
            .get_mut(asset)
            .ok_or_else(|| TransferError::UnknownAsset(asset.clone()))?;
        book.move_balance(from, to, amount)
    }
}
