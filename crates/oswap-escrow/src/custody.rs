//! # Custody Book
//!
//! Funds the ledger owes, tagged by the order they belong to. An active
//! order's deposit and a filled order's unwithdrawn payment are the only
//! two kinds of holding; an order has at most one holding at a time.
//!
//! The book is derived state: [`CustodyBook::from_orders`] rebuilds it from
//! the order table, and the ledger keeps both in step on every mutation.

use std::collections::BTreeMap;

use oswap_core::{Amount, AssetId, OrderId};
use serde::{Deserialize, Serialize};

use crate::order::{Order, OrderStatus};

/// Why the ledger holds a given quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingKind {
    /// The depositor's escrowed `sell_asset`.
    Deposit,
    /// The buyer's payment, owed to the depositor.
    Proceeds,
}

/// One order's claim on the ledger's balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub asset: AssetId,
    pub amount: Amount,
    pub kind: HoldingKind,
}

/// Per-order custody holdings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustodyBook {
    holdings: BTreeMap<OrderId, Holding>,
}

impl CustodyBook {
    /// An empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the book implied by an order table.
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        let mut book = Self::new();
        for order in orders {
            match order.status {
                OrderStatus::Active => book.hold(
                    order.id,
                    Holding {
                        asset: order.sell_asset.clone(),
                        amount: order.amount_deposited,
                        kind: HoldingKind::Deposit,
                    },
                ),
                OrderStatus::Filled if !order.proceeds_withdrawn => book.hold(
                    order.id,
                    Holding {
                        asset: order.payment_asset.clone(),
                        amount: order.price,
                        kind: HoldingKind::Proceeds,
                    },
                ),
                _ => {}
            }
        }
        book
    }

    /// Record (or replace) the holding tagged to `order`.
    pub fn hold(&mut self, order: OrderId, holding: Holding) {
        self.holdings.insert(order, holding);
    }

    /// Remove and return the holding tagged to `order`.
    pub fn release(&mut self, order: OrderId) -> Option<Holding> {
        self.holdings.remove(&order)
    }

    /// The holding tagged to `order`.
    pub fn get(&self, order: OrderId) -> Option<&Holding> {
        self.holdings.get(&order)
    }

    /// Number of orders with a holding.
    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    /// Whether nothing is held.
    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Total owed per asset. Fails with the asset whose total overflows.
    pub fn totals(&self) -> Result<BTreeMap<AssetId, Amount>, AssetId> {
        let mut totals: BTreeMap<AssetId, Amount> = BTreeMap::new();
        for holding in self.holdings.values() {
            let entry = totals.entry(holding.asset.clone()).or_insert(Amount::ZERO);
            *entry = entry
                .checked_add(holding.amount)
                .ok_or_else(|| holding.asset.clone())?;
        }
        Ok(totals)
    }

    /// Iterate holdings in order id order.
    pub fn iter(&self) -> impl Iterator<Item = (&OrderId, &Holding)> {
        self.holdings.iter()
    }
}
