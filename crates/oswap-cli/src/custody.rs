//! # Custody Subcommand
//!
//! Prints what the escrow ledger holds, totalled per asset and itemized per
//! order.

use anyhow::Result;
use clap::Args;
use oswap_escrow::HoldingKind;

use crate::workspace::{StateOptions, Workspace};

/// Arguments for the `oswap custody` subcommand.
#[derive(Args, Debug)]
pub struct CustodyArgs {
    /// Also list the holding of every order.
    #[arg(long)]
    pub orders: bool,
}

/// Execute the custody subcommand.
pub fn run_custody(args: &CustodyArgs, opts: &StateOptions) -> Result<u8> {
    let ws = Workspace::open(opts)?;
    let totals = ws.ledger.custody()?;

    println!("Ledger account: {}", ws.ledger.account());
    if totals.is_empty() {
        println!("Nothing held.");
    }
    for (asset, amount) in &totals {
        let balance = ws.assets.balance_of(asset, ws.ledger.account())?;
        println!(
            "  {asset}: owed {}  held {}",
            ws.format(asset, *amount),
            ws.format(asset, balance)
        );
        if balance < *amount {
            tracing::warn!(%asset, owed = %amount, held = %balance, "custody shortfall");
        }
    }

    if args.orders {
        for (id, holding) in ws.ledger.holdings() {
            let kind = match holding.kind {
                HoldingKind::Deposit => "deposit",
                HoldingKind::Proceeds => "proceeds",
            };
            println!(
                "  order {id}: {} {} ({kind})",
                ws.format(&holding.asset, holding.amount),
                holding.asset
            );
        }
    }

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custody_of_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let opts = StateOptions::at(dir.path().join("state.json"));
        assert_eq!(run_custody(&CustodyArgs { orders: true }, &opts).unwrap(), 0);
    }

    #[test]
    fn custody_rejects_corrupt_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "[]").unwrap();
        assert!(run_custody(&CustodyArgs { orders: false }, &StateOptions::at(&path)).is_err());
    }
}
