//! # Asset Subcommand
//!
//! Administration of the asset ledger backing the escrow.
//!
//! - `register` — register a new asset with zero supply.
//! - `mint` — issue whole units to an account.
//! - `approve` — set an owner's allowance for a spender (the escrow
//!   ledger's account by default).
//! - `balance` — show an account's balance.
//! - `list` — list registered assets.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use oswap_core::{AccountId, AssetId};

use crate::workspace::{StateOptions, Workspace};

/// Arguments for the `oswap asset` subcommand.
#[derive(Args, Debug)]
pub struct AssetArgs {
    #[command(subcommand)]
    pub command: AssetCommand,
}

/// Asset subcommands.
#[derive(Subcommand, Debug)]
pub enum AssetCommand {
    /// Register a new asset with zero supply.
    Register {
        /// Asset identifier (e.g., "TKA").
        id: String,
        /// Display name.
        #[arg(long)]
        name: String,
        /// Ticker symbol.
        #[arg(long)]
        symbol: String,
        /// Decimal places of one whole unit.
        #[arg(long, default_value_t = 18)]
        decimals: u8,
    },

    /// Issue new units to an account.
    Mint {
        /// Asset identifier.
        asset: String,
        /// Receiving account.
        #[arg(long)]
        to: String,
        /// Quantity in whole units.
        amount: String,
    },

    /// Set an owner's allowance for a spender, replacing any previous one.
    Approve {
        /// Asset identifier.
        asset: String,
        /// Account whose funds may be moved.
        #[arg(long)]
        owner: String,
        /// Account allowed to move them. Defaults to the escrow ledger's account.
        #[arg(long)]
        spender: Option<String>,
        /// Allowance in whole units.
        amount: String,
    },

    /// Show an account's balance.
    Balance {
        /// Asset identifier.
        asset: String,
        /// Account to inspect.
        account: String,
    },

    /// List registered assets.
    List,
}

/// Execute the asset subcommand.
pub fn run_asset(args: &AssetArgs, opts: &StateOptions) -> Result<u8> {
    let ws = Workspace::open(opts)?;

    match &args.command {
        AssetCommand::Register {
            id,
            name,
            symbol,
            decimals,
        } => {
            let id = AssetId::new(id).context("invalid asset id")?;
            let info = ws.assets.register_asset(id, name, symbol, *decimals)?;
            ws.save(&opts.path)?;
            println!(
                "OK: registered {} ({}, {} decimals)",
                info.id, info.symbol, info.decimals
            );
        }

        AssetCommand::Mint { asset, to, amount } => {
            let asset = AssetId::new(asset).context("invalid asset id")?;
            let to = AccountId::new(to).context("invalid --to account")?;
            let amount = ws.units(&asset, amount)?;
            ws.assets.mint(&asset, &to, amount)?;
            ws.save(&opts.path)?;
            println!("OK: minted {} {asset} to {to}", ws.format(&asset, amount));
        }

        AssetCommand::Approve {
            asset,
            owner,
            spender,
            amount,
        } => {
            let asset = AssetId::new(asset).context("invalid asset id")?;
            let owner = AccountId::new(owner).context("invalid --owner account")?;
            let spender = match spender {
                Some(s) => AccountId::new(s).context("invalid --spender account")?,
                None => ws.ledger.account().clone(),
            };
            let amount = ws.units(&asset, amount)?;
            ws.assets.approve(&asset, &owner, &spender, amount)?;
            ws.save(&opts.path)?;
            println!(
                "OK: {owner} approved {spender} for {} {asset}",
                ws.format(&asset, amount)
            );
        }

        AssetCommand::Balance { asset, account } => {
            let asset = AssetId::new(asset).context("invalid asset id")?;
            let account = AccountId::new(account).context("invalid account")?;
            let balance = ws.assets.balance_of(&asset, &account)?;
            println!("{} {asset}", ws.format(&asset, balance));
        }

        AssetCommand::List => {
            let assets = ws.assets.assets();
            if assets.is_empty() {
                println!("No assets registered.");
            }
            for info in assets {
                println!(
                    "{}  {}  {}  decimals={}  supply={}",
                    info.id,
                    info.symbol,
                    info.name,
                    info.decimals,
                    info.total_supply.format_units(info.decimals)
                );
            }
        }
    }

    Ok(0)
}
