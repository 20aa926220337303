//! # Order Subcommand
//!
//! Order lifecycle on the escrow ledger.
//!
//! - `deposit` — escrow funds and open an order.
//! - `purchase` — pay an order's price and receive its deposit.
//! - `cancel` — return an active order's deposit to its depositor.
//! - `withdraw` — pay a filled order's proceeds to its depositor.
//! - `view` — show one order.
//! - `list` — list orders.
//! - `events` — show an order's ledger events.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use oswap_core::{AccountId, AssetId, OrderId, Timestamp};
use oswap_escrow::{NewOrder, OrderView};

use crate::workspace::{StateOptions, Workspace};

/// Arguments for the `oswap order` subcommand.
#[derive(Args, Debug)]
pub struct OrderArgs {
    #[command(subcommand)]
    pub command: OrderCommand,
}

/// Order subcommands.
#[derive(Subcommand, Debug)]
pub enum OrderCommand {
    /// Escrow funds and open an order.
    Deposit {
        /// Depositing account. Must have approved the ledger account.
        #[arg(long)]
        from: String,
        /// Asset to escrow.
        #[arg(long)]
        sell: String,
        /// Asset wanted in return.
        #[arg(long)]
        pay: String,
        /// Quantity of the sell asset, in whole units.
        #[arg(long)]
        amount: String,
        /// Price in whole units of the payment asset.
        #[arg(long)]
        price: String,
        /// Absolute deadline (RFC 3339).
        #[arg(long, conflicts_with = "expires_in", required_unless_present = "expires_in")]
        deadline: Option<String>,
        /// Deadline relative to now, in seconds.
        #[arg(long)]
        expires_in: Option<i64>,
    },

    /// Pay an order's price and receive its deposit.
    Purchase {
        /// Order id.
        id: u64,
        /// Buying account. Must have approved the ledger account.
        #[arg(long)]
        buyer: String,
    },

    /// Return an active order's deposit to its depositor.
    Cancel {
        /// Order id.
        id: u64,
        /// Calling account; must be the depositor.
        #[arg(long)]
        caller: String,
    },

    /// Pay a filled order's proceeds to its depositor.
    Withdraw {
        /// Order id.
        id: u64,
        /// Calling account; must be the depositor.
        #[arg(long)]
        caller: String,
    },

    /// Show one order.
    View {
        /// Order id.
        id: u64,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// List orders.
    List {
        /// Only orders not yet filled or cancelled, including expired ones.
        #[arg(long)]
        active: bool,
    },

    /// Show an order's ledger events as JSON lines.
    Events {
        /// Order id.
        id: u64,
    },
}

/// Execute the order subcommand.
pub fn run_order(args: &OrderArgs, opts: &StateOptions) -> Result<u8> {
    let ws = Workspace::open(opts)?;

    match &args.command {
        OrderCommand::Deposit {
            from,
            sell,
            pay,
            amount,
            price,
            deadline,
            expires_in,
        } => {
            let from = AccountId::new(from).context("invalid --from account")?;
            let sell_asset = AssetId::new(sell).context("invalid --sell asset")?;
            let payment_asset = AssetId::new(pay).context("invalid --pay asset")?;
            let amount = ws.units(&sell_asset, amount)?;
            let price = ws.units(&payment_asset, price)?;
            let deadline = resolve_deadline(&ws, deadline.as_deref(), *expires_in)?;

            let id = ws.ledger.deposit_order(
                &from,
                NewOrder {
                    sell_asset,
                    payment_asset,
                    amount,
                    price,
                    deadline,
                },
            )?;
            ws.save(&opts.path)?;
            println!("OK: order {id} opened, deadline {deadline}");
        }

        OrderCommand::Purchase { id, buyer } => {
            let buyer = AccountId::new(buyer).context("invalid --buyer account")?;
            let view = ws.ledger.purchase_order(&buyer, OrderId::new(*id))?;
            ws.save(&opts.path)?;
            println!(
                "OK: order {id} filled; {buyer} paid {} {} and received {} {}",
                ws.format(&view.payment_asset, view.price),
                view.payment_asset,
                ws.format(&view.sell_asset, view.amount_deposited),
                view.sell_asset
            );
        }

        OrderCommand::Cancel { id, caller } => {
            let caller = AccountId::new(caller).context("invalid --caller account")?;
            let view = ws.ledger.cancel_order(&caller, OrderId::new(*id))?;
            ws.save(&opts.path)?;
            println!(
                "OK: order {id} cancelled; {} {} returned to {caller}",
                ws.format(&view.sell_asset, view.amount_deposited),
                view.sell_asset
            );
        }

        OrderCommand::Withdraw { id, caller } => {
            let caller = AccountId::new(caller).context("invalid --caller account")?;
            let id = OrderId::new(*id);
            let amount = ws.ledger.withdraw_proceeds(&caller, id)?;
            ws.save(&opts.path)?;
            let asset = ws.ledger.view_order(id)?.payment_asset;
            println!(
                "OK: {} {asset} of order {id} paid to {caller}",
                ws.format(&asset, amount)
            );
        }

        OrderCommand::View { id, json } => {
            let view = ws.ledger.view_order(OrderId::new(*id))?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_order(&ws, &view);
            }
        }

        OrderCommand::List { active } => {
            let views = if *active {
                ws.ledger.active_orders()
            } else {
                ws.ledger.list_orders()
            };
            if views.is_empty() {
                println!("No orders.");
            }
            for view in &views {
                println!(
                    "{:>6}  {:<9}  {} {} for {} {}  by {}  until {}",
                    view.id.value(),
                    view.status.as_str(),
                    ws.format(&view.sell_asset, view.amount_deposited),
                    view.sell_asset,
                    ws.format(&view.payment_asset, view.price),
                    view.payment_asset,
                    view.depositor,
                    view.deadline
                );
            }
        }

        OrderCommand::Events { id } => {
            for event in ws.ledger.events_for(OrderId::new(*id))? {
                println!("{}", serde_json::to_string(&event)?);
            }
        }
    }

    Ok(0)
}

fn resolve_deadline(
    ws: &Workspace,
    deadline: Option<&str>,
    expires_in: Option<i64>,
) -> Result<Timestamp> {
    match (deadline, expires_in) {
        (Some(raw), None) => Timestamp::parse(raw).context("invalid --deadline"),
        (None, Some(secs)) => ws
            .ledger
            .now()
            .checked_add_secs(secs)
            .context("--expires-in is out of range"),
        _ => bail!("give exactly one of --deadline and --expires-in"),
    }
}

fn print_order(ws: &Workspace, view: &OrderView) {
    println!("Order: {}", view.id);
    println!("  Status: {}", view.status);
    println!("  Depositor: {}", view.depositor);
    println!(
        "  Selling: {} {}",
        ws.format(&view.sell_asset, view.amount_deposited),
        view.sell_asset
    );
    println!(
        "  Price: {} {}",
        ws.format(&view.payment_asset, view.price),
        view.payment_asset
    );
    println!("  Deadline: {}", view.deadline);
    println!("  Created: {}", view.created_at);
    if let Some(buyer) = &view.buyer {
        println!("  Buyer: {buyer}");
        println!(
            "  Proceeds: {}",
            if view.proceeds_withdrawn {
                "withdrawn"
            } else {
                "held"
            }
        );
    }
    if let Some(closed) = view.closed_at {
        println!("  Closed: {closed}");
    }
}
