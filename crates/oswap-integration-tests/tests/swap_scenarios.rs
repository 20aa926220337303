//! # Multi-Party Swap Scenarios
//!
//! Whole lifecycles across several accounts and orders on the deterministic
//! fixture: the ledger's custody always matches what it owes, every order
//! ends in exactly one terminal state, and snapshots resume mid-flight.

use std::sync::Arc;

use oswap_core::{Amount, Clock, OrderId};
use oswap_escrow::fixture::Fixture;
use oswap_escrow::{EscrowError, EscrowLedger, InMemoryAssetLedger, NewOrder, OrderStatus};

/// Custody held by the ledger equals the sum of what it owes, per asset.
fn assert_custody_consistent(fx: &Fixture) {
    let owed = fx.ledger.custody().unwrap();
    for asset in [&fx.token_a, &fx.token_b] {
        let expected = owed.get(asset).copied().unwrap_or(Amount::ZERO);
        assert_eq!(fx.custody_balance(asset), expected, "custody of {asset}");
    }
}

#[test]
fn two_sided_market_settles() {
    let fx = Fixture::new();
    let deadline = fx.in_secs(3600);

    // alice sells 100 TKA for 20 TKB; bob sells 50 TKB for 200 TKA.
    let a = fx.deposit_default(deadline).unwrap();
    fx.approve_ledger(&fx.token_b, &fx.bob, "100");
    let b = fx
        .ledger
        .deposit_order(
            &fx.bob,
            NewOrder {
                sell_asset: fx.token_b.clone(),
                payment_asset: fx.token_a.clone(),
                amount: fx.units("50"),
                price: fx.units("200"),
                deadline,
            },
        )
        .unwrap();
    assert_custody_consistent(&fx);

    // carol is funded and fills both.
    fx.fund(&fx.token_a, &fx.carol, "200");
    fx.fund(&fx.token_b, &fx.carol, "20");
    fx.approve_ledger(&fx.token_a, &fx.carol, "200");
    fx.approve_ledger(&fx.token_b, &fx.carol, "20");
    fx.ledger.purchase_order(&fx.carol, a).unwrap();
    fx.ledger.purchase_order(&fx.carol, b).unwrap();
    assert_custody_consistent(&fx);

    assert_eq!(fx.balance(&fx.token_a, &fx.carol), fx.units("100"));
    assert_eq!(fx.balance(&fx.token_b, &fx.carol), fx.units("50"));

    fx.ledger.withdraw_proceeds(&fx.alice, a).unwrap();
    fx.ledger.withdraw_proceeds(&fx.bob, b).unwrap();
    assert_eq!(fx.balance(&fx.token_b, &fx.alice), fx.units("20"));
    assert_eq!(fx.balance(&fx.token_a, &fx.bob), fx.units("200"));
    assert!(fx.ledger.custody().unwrap().is_empty());
    assert_custody_consistent(&fx);
}

#[test]
fn deadline_boundary_is_inclusive() {
    let fx = Fixture::new();
    fx.approve_ledger(&fx.token_b, &fx.bob, "100");
    let id = fx.deposit_default(fx.in_secs(60)).unwrap();

    fx.clock.advance(60);
    fx.ledger.purchase_order(&fx.bob, id).unwrap();

    // bob's remaining TKB allowance covers a small order of his own.
    let late = fx
        .ledger
        .deposit_order(
            &fx.bob,
            NewOrder {
                sell_asset: fx.token_b.clone(),
                payment_asset: fx.token_a.clone(),
                amount: fx.units("1"),
                price: fx.units("1"),
                deadline: fx.in_secs(60),
            },
        )
        .unwrap();
    fx.approve_ledger(&fx.token_a, &fx.alice, "1");
    fx.clock.advance(61);
    assert!(matches!(
        fx.ledger.purchase_order(&fx.alice, late),
        Err(EscrowError::OrderExpired { .. })
    ));
    // Still cancellable after expiry.
    fx.ledger.cancel_order(&fx.bob, late).unwrap();
    assert_custody_consistent(&fx);
}

#[test]
fn every_order_terminates_once() {
    let fx = Fixture::new();
    fx.approve_ledger(&fx.token_a, &fx.alice, "100");
    fx.approve_ledger(&fx.token_b, &fx.bob, "100");
    let deadline = fx.in_secs(600);

    let ids: Vec<OrderId> = (0..4)
        .map(|_| {
            fx.ledger
                .deposit_order(
                    &fx.alice,
                    NewOrder {
                        sell_asset: fx.token_a.clone(),
                        payment_asset: fx.token_b.clone(),
                        amount: fx.units("10"),
                        price: fx.units("5"),
                        deadline,
                    },
                )
                .unwrap()
        })
        .collect();
    assert_eq!(ids, (0..4).map(OrderId::new).collect::<Vec<_>>());

    fx.ledger.purchase_order(&fx.bob, ids[0]).unwrap();
    fx.ledger.cancel_order(&fx.alice, ids[1]).unwrap();
    fx.ledger.purchase_order(&fx.bob, ids[2]).unwrap();

    for id in &ids[..3] {
        assert!(matches!(
            fx.ledger.purchase_order(&fx.bob, *id),
            Err(EscrowError::OrderNotActive { .. })
        ));
        assert!(matches!(
            fx.ledger.cancel_order(&fx.alice, *id),
            Err(EscrowError::OrderNotActive { .. })
        ));
    }

    let statuses: Vec<OrderStatus> = fx.ledger.list_orders().iter().map(|o| o.status).collect();
    assert_eq!(
        statuses,
        [
            OrderStatus::Filled,
            OrderStatus::Cancelled,
            OrderStatus::Filled,
            OrderStatus::Active
        ]
    );
    assert_eq!(fx.ledger.active_orders().len(), 1);
    assert_custody_consistent(&fx);
}

#[test]
fn snapshot_resumes_mid_lifecycle() {
    let fx = Fixture::new();
    fx.approve_ledger(&fx.token_b, &fx.bob, "100");
    let filled = fx.deposit_default(fx.in_secs(600)).unwrap();
    fx.ledger.purchase_order(&fx.bob, filled).unwrap();
    fx.fund(&fx.token_a, &fx.alice, "50");
    fx.approve_ledger(&fx.token_a, &fx.alice, "50");
    let open = fx
        .ledger
        .deposit_order(&fx.alice, {
            let mut order = fx.default_order(fx.in_secs(600));
            order.amount = fx.units("50");
            order
        })
        .unwrap();

    // Round-trip both ledgers through JSON, as the CLI state file does.
    let assets_json = serde_json::to_string(&fx.assets.snapshot()).unwrap();
    let ledger_json = serde_json::to_string(&fx.ledger.snapshot()).unwrap();
    let assets = Arc::new(InMemoryAssetLedger::restore(serde_json::from_str(&assets_json).unwrap()).unwrap());
    let clock: Arc<dyn Clock> = Arc::new(fx.clock.clone());
    let ledger = EscrowLedger::restore(
        serde_json::from_str(&ledger_json).unwrap(),
        assets.clone(),
        clock,
    )
    .unwrap();

    assert_eq!(ledger.custody().unwrap(), fx.ledger.custody().unwrap());
    assert_eq!(ledger.events(), fx.ledger.events());

    ledger.withdraw_proceeds(&fx.alice, filled).unwrap();
    ledger.cancel_order(&fx.alice, open).unwrap();
    assert!(ledger.custody().unwrap().is_empty());
    assert_eq!(
        assets.balance_of(&fx.token_a, &fx.alice).unwrap(),
        fx.units("50")
    );
    assert_eq!(
        assets.balance_of(&fx.token_b, &fx.alice).unwrap(),
        fx.units("20")
    );

    // The next id continues the sequence.
    assets.approve(&fx.token_a, &fx.alice, ledger.account(), fx.units("1")).unwrap();
    let next = ledger
        .deposit_order(&fx.alice, {
            let mut order = fx.default_order(fx.in_secs(600));
            order.amount = fx.units("1");
            order
        })
        .unwrap();
    assert_eq!(next, OrderId::new(2));
}

#[test]
fn racing_buyers_fill_each_order_once() {
    let fx = Fixture::new();
    fx.fund(&fx.token_a, &fx.alice, "900");
    fx.approve_ledger(&fx.token_a, &fx.alice, "1000");
    let deadline = fx.in_secs(600);
    let ids: Vec<OrderId> = (0..10)
        .map(|_| {
            fx.ledger
                .deposit_order(
                    &fx.alice,
                    NewOrder {
                        sell_asset: fx.token_a.clone(),
                        payment_asset: fx.token_b.clone(),
                        amount: fx.units("100"),
                        price: fx.units("1"),
                        deadline,
                    },
                )
                .unwrap()
        })
        .collect();

    fx.fund(&fx.token_b, &fx.carol, "100");
    fx.approve_ledger(&fx.token_b, &fx.bob, "100");
    fx.approve_ledger(&fx.token_b, &fx.carol, "100");

    let ledger = &fx.ledger;
    let buyers = [fx.bob.clone(), fx.carol.clone()];
    let wins: Vec<usize> = std::thread::scope(|s| {
        let handles: Vec<_> = buyers
            .iter()
            .map(|buyer| {
                let ids = &ids;
                s.spawn(move || {
                    ids.iter()
                        .filter(|id| ledger.purchase_order(buyer, **id).is_ok())
                        .count()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(wins.iter().sum::<usize>(), ids.len());
    assert!(fx.ledger.active_orders().is_empty());
    assert_eq!(fx.custody_balance(&fx.token_a), Amount::ZERO);
    assert_eq!(fx.custody_balance(&fx.token_b), fx.units("10"));
    assert_custody_consistent(&fx);
}
