//! # Deterministic Escrow Fixture
//!
//! A ready-made world for tests: three fixed accounts, two registered
//! 18-decimal assets, an [`InMemoryAssetLedger`], a [`ManualClock`] pinned
//! to a fixed instant, and an [`EscrowLedger`] wired to both.
//!
//! Initial balances: `alice` holds 100 TKA, `bob` holds 100 TKB, `carol`
//! holds nothing. No approvals are in place.
//!
//! Available to other crates behind the `fixture` feature. Helpers panic on
//! misuse; they exist for tests only.

use std::sync::Arc;

use oswap_core::{AccountId, Amount, AssetId, ManualClock, Timestamp};

use crate::assets::InMemoryAssetLedger;
use crate::error::EscrowError;
use crate::ledger::EscrowLedger;
use crate::order::NewOrder;

/// Decimals of both fixture assets.
pub const DECIMALS: u8 = 18;

/// The instant the fixture clock starts at.
pub const GENESIS: &str = "2026-01-15T12:00:00Z";

/// Custody account of the fixture ledger.
pub const LEDGER_ACCOUNT: &str = "escrow:orderswap";

/// Test world around one escrow ledger.
#[derive(Debug)]
pub struct Fixture {
    pub assets: Arc<InMemoryAssetLedger>,
    pub clock: ManualClock,
    pub ledger: EscrowLedger,
    pub alice: AccountId,
    pub bob: AccountId,
    pub carol: AccountId,
    pub token_a: AssetId,
    pub token_b: AssetId,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Build the fixture world.
    pub fn new() -> Self {
        let assets = Arc::new(InMemoryAssetLedger::new());
        let clock = ManualClock::new(Timestamp::parse(GENESIS).expect("fixture genesis"));
        let ledger = EscrowLedger::new(
            AccountId::new(LEDGER_ACCOUNT).expect("fixture ledger account"),
            assets.clone(),
            Arc::new(clock.clone()),
        );
        let fx = Self {
            assets,
            clock,
            ledger,
            alice: AccountId::new("alice").expect("fixture account"),
            bob: AccountId::new("bob").expect("fixture account"),
            carol: AccountId::new("carol").expect("fixture account"),
            token_a: AssetId::new("TKA").expect("fixture asset"),
            token_b: AssetId::new("TKB").expect("fixture asset"),
        };
        fx.assets
            .register_asset(fx.token_a.clone(), "TokenA", "TKA", DECIMALS)
            .expect("register TKA");
        fx.assets
            .register_asset(fx.token_b.clone(), "TokenB", "TKB", DECIMALS)
            .expect("register TKB");
        fx.fund(&fx.token_a, &fx.alice, "100");
        fx.fund(&fx.token_b, &fx.bob, "100");
        fx
    }

    /// `whole` units of an 18-decimal asset (e.g. `"1.5"`).
    pub fn units(&self, whole: &str) -> Amount {
        Amount::parse_units(whole, DECIMALS).expect("fixture quantity")
    }

    /// Current fixture time.
    pub fn now(&self) -> Timestamp {
        self.ledger.now()
    }

    /// Fixture time shifted by `secs` (negative for the past).
    pub fn in_secs(&self, secs: i64) -> Timestamp {
        self.now().checked_add_secs(secs).expect("fixture time in range")
    }

    /// Mint `whole` units of `asset` to `to`.
    pub fn fund(&self, asset: &AssetId, to: &AccountId, whole: &str) {
        self.assets
            .mint(asset, to, self.units(whole))
            .expect("fixture mint");
    }

    /// Authorize the escrow ledger to pull `whole` units of `owner`'s
    /// `asset`, replacing any earlier authorization.
    pub fn approve_ledger(&self, asset: &AssetId, owner: &AccountId, whole: &str) {
        self.assets
            .approve(asset, owner, self.ledger.account(), self.units(whole))
            .expect("fixture approve");
    }

    /// Balance of `account` in `asset`.
    pub fn balance(&self, asset: &AssetId, account: &AccountId) -> Amount {
        self.assets.balance_of(asset, account).expect("fixture balance")
    }

    /// The escrow ledger's own balance of `asset`.
    pub fn custody_balance(&self, asset: &AssetId) -> Amount {
        self.balance(asset, self.ledger.account())
    }

    /// 100 TKA offered for 20 TKB until `deadline`.
    pub fn default_order(&self, deadline: Timestamp) -> NewOrder {
        NewOrder {
            sell_asset: self.token_a.clone(),
            payment_asset: self.token_b.clone(),
            amount: self.units("100"),
            price: self.units("20"),
            deadline,
        }
    }

    /// Approve and deposit [`default_order`](Self::default_order) as alice.
    pub fn deposit_default(&self, deadline: Timestamp) -> Result<oswap_core::OrderId, EscrowError> {
        self.approve_ledger(&self.token_a, &self.alice, "100");
        self.ledger
            .deposit_order(&self.alice, self.default_order(deadline))
    }
}
