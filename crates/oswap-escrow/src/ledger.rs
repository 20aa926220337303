//! # Escrow Ledger
//!
//! The order table, the custody book, and the operations that move an
//! order through its lifecycle.
//!
//! ## Atomicity
//!
//! Each state-changing operation locks the ledger state once, validates,
//! performs its transfers through [`AssetTransfer`], and only then writes
//! the new order state. A refused transfer returns before anything is
//! written. When the second leg of a purchase fails after the first leg
//! succeeded, the first leg is reversed before the error is returned.
//!
//! ## Time
//!
//! The ledger reads its [`Clock`] once per operation. Deadlines are never
//! scheduled; an expired order simply stops being fillable.

use std::collections::BTreeMap;
use std::sync::Arc;

use oswap_core::{AccountId, Amount, AssetId, Clock, OrderId, Timestamp};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::custody::{CustodyBook, Holding, HoldingKind};
use crate::error::EscrowError;
use crate::event::LedgerEvent;
use crate::order::{NewOrder, Order, OrderStatus, OrderView};
use crate::transfer::AssetTransfer;

/// Serializable image of an [`EscrowLedger`].
///
/// The custody book is not stored; it is rebuilt from the order table on
/// restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// The ledger's custody account.
    pub account: AccountId,
    /// Id the next deposit will receive. `None` once the sequence is spent.
    pub next_id: Option<OrderId>,
    /// Every order ever created, in id order.
    pub orders: Vec<Order>,
    /// The event log.
    #[serde(default)]
    pub events: Vec<LedgerEvent>,
}

#[derive(Debug)]
struct LedgerState {
    next_id: Option<OrderId>,
    orders: BTreeMap<OrderId, Order>,
    custody: CustodyBook,
    events: Vec<LedgerEvent>,
}

impl LedgerState {
    fn order(&self, id: OrderId) -> Result<&Order, EscrowError> {
        self.orders.get(&id).ok_or(EscrowError::OrderNotFound(id))
    }

    fn order_mut(&mut self, id: OrderId) -> Result<&mut Order, EscrowError> {
        self.orders.get_mut(&id).ok_or(EscrowError::OrderNotFound(id))
    }
}

/// The escrow ledger.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
#[derive(Debug)]
pub struct EscrowLedger {
    account: AccountId,
    assets: Arc<dyn AssetTransfer>,
    clock: Arc<dyn Clock>,
    state: Mutex<LedgerState>,
}

impl EscrowLedger {
    /// Create an empty ledger holding custody under `account`.
    pub fn new(account: AccountId, assets: Arc<dyn AssetTransfer>, clock: Arc<dyn Clock>) -> Self {
        Self {
            account,
            assets,
            clock,
            state: Mutex::new(LedgerState {
                next_id: Some(OrderId::FIRST),
                orders: BTreeMap::new(),
                custody: CustodyBook::new(),
                events: Vec::new(),
            }),
        }
    }

    /// The account under which the ledger holds custody. Depositors and
    /// buyers approve this account as spender.
    pub fn account(&self) -> &AccountId {
        &self.account
    }

    /// Ledger time.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    // ── Operations ──────────────────────────────────────────────────────

    /// Escrow `order.amount` of `order.sell_asset` from `caller` and open a
    /// new order.
    ///
    /// `caller` must have approved [`account`](Self::account) for at least
    /// `order.amount`. A deadline already in the past is accepted; such an
    /// order can only be cancelled.
    pub fn deposit_order(&self, caller: &AccountId, order: NewOrder) -> Result<OrderId, EscrowError> {
        observe("deposit", self.deposit_inner(caller, order))
    }

    fn deposit_inner(&self, caller: &AccountId, new: NewOrder) -> Result<OrderId, EscrowError> {
        self.reject_ledger_caller(caller)?;
        if new.amount.is_zero() {
            return Err(EscrowError::InvalidAmount {
                field: "amount",
                value: new.amount,
            });
        }
        if new.price.is_zero() {
            return Err(EscrowError::InvalidAmount {
                field: "price",
                value: new.price,
            });
        }

        let mut state = self.state.lock();
        let id = state.next_id.ok_or(EscrowError::OrderIdExhausted)?;
        let now = self.clock.now();

        self.assets
            .transfer_from(&self.account, &new.sell_asset, caller, &self.account, new.amount)
            .map_err(|source| EscrowError::TransferFailed {
                order_id: None,
                operation: "deposit",
                source,
            })?;

        let order = Order {
            id,
            depositor: caller.clone(),
            sell_asset: new.sell_asset,
            payment_asset: new.payment_asset,
            amount_deposited: new.amount,
            price: new.price,
            deadline: new.deadline,
            status: OrderStatus::Active,
            buyer: None,
            proceeds_withdrawn: false,
            created_at: now,
            closed_at: None,
        };
        state.custody.hold(
            id,
            Holding {
                asset: order.sell_asset.clone(),
                amount: order.amount_deposited,
                kind: HoldingKind::Deposit,
            },
        );
        state.events.push(LedgerEvent::OrderDeposited {
            order_id: id,
            depositor: order.depositor.clone(),
            sell_asset: order.sell_asset.clone(),
            payment_asset: order.payment_asset.clone(),
            amount: order.amount_deposited,
            price: order.price,
            deadline: order.deadline,
            at: now,
        });
        tracing::info!(
            order_id = %id,
            depositor = %order.depositor,
            sell_asset = %order.sell_asset,
            payment_asset = %order.payment_asset,
            amount = %order.amount_deposited,
            price = %order.price,
            deadline = %order.deadline,
            "order deposited"
        );
        state.orders.insert(id, order);
        state.next_id = id.next();
        metrics::counter!("oswap_orders_deposited_total").increment(1);
        Ok(id)
    }

    /// Fill an active, unexpired order: `caller` pays `price` of the
    /// payment asset into custody and receives the escrowed deposit.
    ///
    /// The payment stays in custody as the depositor's proceeds until
    /// [`withdraw_proceeds`](Self::withdraw_proceeds).
    pub fn purchase_order(&self, caller: &AccountId, id: OrderId) -> Result<OrderView, EscrowError> {
        observe("purchase", self.purchase_inner(caller, id))
    }

    fn purchase_inner(&self, caller: &AccountId, id: OrderId) -> Result<OrderView, EscrowError> {
        self.reject_ledger_caller(caller)?;
        let mut state = self.state.lock();
        let now = self.clock.now();
        let order = state.order(id)?;
        if !order.is_active() {
            return Err(EscrowError::OrderNotActive {
                order_id: id,
                status: order.status,
            });
        }
        if order.is_expired_at(now) {
            return Err(EscrowError::OrderExpired {
                order_id: id,
                deadline: order.deadline,
                now,
            });
        }
        let (sell_asset, amount) = (order.sell_asset.clone(), order.amount_deposited);
        let (payment_asset, price) = (order.payment_asset.clone(), order.price);

        self.assets
            .transfer_from(&self.account, &payment_asset, caller, &self.account, price)
            .map_err(|source| EscrowError::TransferFailed {
                order_id: Some(id),
                operation: "purchase",
                source,
            })?;

        if let Err(source) = self.assets.transfer(&sell_asset, &self.account, caller, amount) {
            if let Err(refund) = self.assets.transfer(&payment_asset, &self.account, caller, price) {
                tracing::error!(
                    order_id = %id,
                    buyer = %caller,
                    asset = %payment_asset,
                    amount = %price,
                    error = %refund,
                    "failed to return payment after a refused delivery"
                );
            }
            return Err(EscrowError::TransferFailed {
                order_id: Some(id),
                operation: "purchase",
                source,
            });
        }

        let order = state.order_mut(id)?;
        order.status = OrderStatus::Filled;
        order.buyer = Some(caller.clone());
        order.closed_at = Some(now);
        let view = order.view();

        state.custody.hold(
            id,
            Holding {
                asset: payment_asset,
                amount: price,
                kind: HoldingKind::Proceeds,
            },
        );
        state.events.push(LedgerEvent::OrderFilled {
            order_id: id,
            buyer: caller.clone(),
            at: now,
        });
        tracing::info!(order_id = %id, buyer = %caller, "order filled");
        metrics::counter!("oswap_orders_filled_total").increment(1);
        Ok(view)
    }

    /// Return the deposit of an active order to its depositor. Only the
    /// depositor may cancel, and the deadline does not matter.
    pub fn cancel_order(&self, caller: &AccountId, id: OrderId) -> Result<OrderView, EscrowError> {
        observe("cancel", self.cancel_inner(caller, id))
    }

    fn cancel_inner(&self, caller: &AccountId, id: OrderId) -> Result<OrderView, EscrowError> {
        let mut state = self.state.lock();
        let now = self.clock.now();
        let order = state.order(id)?;
        if &order.depositor != caller {
            return Err(EscrowError::Unauthorized {
                order_id: id,
                caller: caller.clone(),
            });
        }
        if !order.is_active() {
            return Err(EscrowError::OrderNotActive {
                order_id: id,
                status: order.status,
            });
        }

        self.assets
            .transfer(&order.sell_asset, &self.account, &order.depositor, order.amount_deposited)
            .map_err(|source| EscrowError::TransferFailed {
                order_id: Some(id),
                operation: "cancel",
                source,
            })?;

        let order = state.order_mut(id)?;
        order.status = OrderStatus::Cancelled;
        order.closed_at = Some(now);
        let view = order.view();

        state.custody.release(id);
        state.events.push(LedgerEvent::OrderCancelled {
            order_id: id,
            depositor: caller.clone(),
            at: now,
        });
        tracing::info!(order_id = %id, depositor = %caller, "order cancelled");
        metrics::counter!("oswap_orders_cancelled_total").increment(1);
        Ok(view)
    }

    /// Pay a filled order's proceeds out of custody to its depositor.
    /// Succeeds at most once per order.
    pub fn withdraw_proceeds(&self, caller: &AccountId, id: OrderId) -> Result<Amount, EscrowError> {
        observe("withdraw", self.withdraw_inner(caller, id))
    }

    fn withdraw_inner(&self, caller: &AccountId, id: OrderId) -> Result<Amount, EscrowError> {
        let mut state = self.state.lock();
        let now = self.clock.now();
        let order = state.order(id)?;
        if &order.depositor != caller {
            return Err(EscrowError::Unauthorized {
                order_id: id,
                caller: caller.clone(),
            });
        }
        if order.status != OrderStatus::Filled {
            return Err(EscrowError::ProceedsUnavailable {
                order_id: id,
                reason: "order has not been filled",
            });
        }
        if order.proceeds_withdrawn {
            return Err(EscrowError::ProceedsUnavailable {
                order_id: id,
                reason: "proceeds already withdrawn",
            });
        }
        let (asset, amount) = (order.payment_asset.clone(), order.price);

        self.assets
            .transfer(&asset, &self.account, caller, amount)
            .map_err(|source| EscrowError::TransferFailed {
                order_id: Some(id),
                operation: "withdraw",
                source,
            })?;

        state.order_mut(id)?.proceeds_withdrawn = true;
        state.custody.release(id);
        state.events.push(LedgerEvent::ProceedsWithdrawn {
            order_id: id,
            depositor: caller.clone(),
            asset: asset.clone(),
            amount,
            at: now,
        });
        tracing::info!(order_id = %id, depositor = %caller, asset = %asset, amount = %amount, "proceeds withdrawn");
        metrics::counter!("oswap_proceeds_withdrawn_total").increment(1);
        Ok(amount)
    }

    /// Transfers between the custody account and itself move nothing, so
    /// the ledger account may not open or fill orders.
    fn reject_ledger_caller(&self, caller: &AccountId) -> Result<(), EscrowError> {
        if caller == &self.account {
            return Err(EscrowError::LedgerCaller(caller.clone()));
        }
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// Read-only projection of an order, active or not.
    pub fn view_order(&self, id: OrderId) -> Result<OrderView, EscrowError> {
        self.state.lock().order(id).map(Order::view)
    }

    /// Every order in id order.
    pub fn list_orders(&self) -> Vec<OrderView> {
        self.state.lock().orders.values().map(Order::view).collect()
    }

    /// Orders still open, in id order. Includes orders past their deadline.
    pub fn active_orders(&self) -> Vec<OrderView> {
        self.state
            .lock()
            .orders
            .values()
            .filter(|order| order.is_active())
            .map(Order::view)
            .collect()
    }

    /// Number of orders ever created.
    pub fn order_count(&self) -> usize {
        self.state.lock().orders.len()
    }

    /// Quantity the ledger owes per asset: active deposits plus unwithdrawn
    /// proceeds.
    pub fn custody(&self) -> Result<BTreeMap<AssetId, Amount>, EscrowError> {
        self.state
            .lock()
            .custody
            .totals()
            .map_err(EscrowError::CustodyOverflow)
    }

    /// The holding tagged to one order, if any.
    pub fn holding(&self, id: OrderId) -> Option<Holding> {
        self.state.lock().custody.get(id).cloned()
    }

    /// Every holding, ordered by order id.
    pub fn holdings(&self) -> Vec<(OrderId, Holding)> {
        self.state
            .lock()
            .custody
            .iter()
            .map(|(id, holding)| (*id, holding.clone()))
            .collect()
    }

    /// The full event log, oldest first.
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.state.lock().events.clone()
    }

    /// Events of one order, oldest first.
    pub fn events_for(&self, id: OrderId) -> Result<Vec<LedgerEvent>, EscrowError> {
        let state = self.state.lock();
        state.order(id)?;
        Ok(state
            .events
            .iter()
            .filter(|event| event.order_id() == id)
            .cloned()
            .collect())
    }

    // ── Persistence ─────────────────────────────────────────────────────

    /// Capture the order table and event log.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.state.lock();
        LedgerSnapshot {
            account: self.account.clone(),
            next_id: state.next_id,
            orders: state.orders.values().cloned().collect(),
            events: state.events.clone(),
        }
    }

    /// Rebuild a ledger from a snapshot.
    ///
    /// Rejects duplicate order ids and ids at or beyond `next_id`.
    pub fn restore(
        snapshot: LedgerSnapshot,
        assets: Arc<dyn AssetTransfer>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, EscrowError> {
        let mut orders = BTreeMap::new();
        for order in snapshot.orders {
            if let Some(next) = snapshot.next_id {
                if order.id >= next {
                    return Err(EscrowError::InvalidSnapshot(format!(
                        "order {} is not below next id {next}",
                        order.id
                    )));
                }
            }
            let id = order.id;
            if orders.insert(id, order).is_some() {
                return Err(EscrowError::InvalidSnapshot(format!("order {id} appears twice")));
            }
        }
        let custody = CustodyBook::from_orders(orders.values());
        custody.totals().map_err(EscrowError::CustodyOverflow)?;

        tracing::debug!(account = %snapshot.account, orders = orders.len(), "escrow ledger restored");
        Ok(Self {
            account: snapshot.account,
            assets,
            clock,
            state: Mutex::new(LedgerState {
                next_id: snapshot.next_id,
                orders,
                custody,
                events: snapshot.events,
            }),
        })
    }
}

/// Log and count a rejected operation; pass successes through untouched.
fn observe<T>(operation: &'static str, result: Result<T, EscrowError>) -> Result<T, EscrowError> {
    if let Err(err) = &result {
        tracing::warn!(operation, code = err.code(), error = %err, "escrow operation rejected");
        metrics::counter!("oswap_operations_rejected_total", "operation" => operation).increment(1);
    }
    result
}
