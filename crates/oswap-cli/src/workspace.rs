//! # State File
//!
//! The CLI keeps the asset ledger and the escrow ledger in one JSON file.
//! [`Workspace::open`] rebuilds both ledgers from it (or starts empty when
//! the file does not exist) and [`Workspace::save`] writes them back through
//! a temporary file and a rename, so a crash never leaves a half-written
//! state file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use oswap_core::{AccountId, Amount, AssetId, SystemClock};
use oswap_escrow::{AssetLedgerSnapshot, EscrowLedger, InMemoryAssetLedger, LedgerSnapshot};
use serde::{Deserialize, Serialize};

/// State file used when `--state` is not given.
pub const DEFAULT_STATE_FILE: &str = "oswap-state.json";

/// Custody account of a fresh ledger when `--ledger-account` is not given.
pub const DEFAULT_LEDGER_ACCOUNT: &str = "escrow:orderswap";

const STATE_VERSION: u32 = 1;

/// Where the state lives, from the global command-line flags.
#[derive(Debug, Clone)]
pub struct StateOptions {
    /// Path of the JSON state file.
    pub path: PathBuf,
    /// Custody account requested on the command line, if any.
    pub ledger_account: Option<String>,
}

impl StateOptions {
    /// Options for the state file at `path` with no account override.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ledger_account: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    version: u32,
    assets: AssetLedgerSnapshot,
    ledger: LedgerSnapshot,
}

/// Both ledgers, loaded from a state file.
#[derive(Debug)]
pub struct Workspace {
    pub assets: Arc<InMemoryAssetLedger>,
    pub ledger: EscrowLedger,
}

impl Workspace {
    /// Load the state file, or start empty if it does not exist.
    ///
    /// An explicit `ledger_account` must match the account recorded in an
    /// existing file.
    pub fn open(opts: &StateOptions) -> Result<Self> {
        let requested = opts
            .ledger_account
            .as_deref()
            .map(AccountId::new)
            .transpose()
            .context("invalid --ledger-account")?;

        if !opts.path.exists() {
            let account = match requested {
                Some(account) => account,
                None => AccountId::new(DEFAULT_LEDGER_ACCOUNT)?,
            };
            tracing::debug!(path = %opts.path.display(), %account, "starting empty state");
            let assets = Arc::new(InMemoryAssetLedger::new());
            let ledger = EscrowLedger::new(account, assets.clone(), Arc::new(SystemClock));
            return Ok(Self { assets, ledger });
        }

        let content = std::fs::read_to_string(&opts.path)
            .with_context(|| format!("failed to read state file {}", opts.path.display()))?;
        let file: StateFile = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse state file {}", opts.path.display()))?;
        if file.version != STATE_VERSION {
            bail!(
                "unsupported state file version {} (expected {STATE_VERSION})",
                file.version
            );
        }
        if let Some(account) = requested {
            if account != file.ledger.account {
                bail!(
                    "state file belongs to ledger account {}, not {account}",
                    file.ledger.account
                );
            }
        }

        let assets = Arc::new(
            InMemoryAssetLedger::restore(file.assets).context("invalid asset ledger state")?,
        );
        let ledger = EscrowLedger::restore(file.ledger, assets.clone(), Arc::new(SystemClock))
            .context("invalid escrow ledger state")?;
        tracing::debug!(path = %opts.path.display(), orders = ledger.order_count(), "state loaded");
        Ok(Self { assets, ledger })
    }

    /// Write both ledgers to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = StateFile {
            version: STATE_VERSION,
            assets: self.assets.snapshot(),
            ledger: self.ledger.snapshot(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, json)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("failed to replace state file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "state saved");
        Ok(())
    }

    /// Decimals of a registered asset.
    pub fn decimals(&self, asset: &AssetId) -> Result<u8> {
        self.assets
            .asset_info(asset)
            .map(|info| info.decimals)
            .with_context(|| format!("unknown asset {asset}"))
    }

    /// Parse a whole-unit quantity of `asset`.
    pub fn units(&self, asset: &AssetId, quantity: &str) -> Result<Amount> {
        let decimals = self.decimals(asset)?;
        Amount::parse_units(quantity, decimals)
            .with_context(|| format!("invalid quantity of {asset}"))
    }

    /// Render a quantity of `asset` in whole units, falling back to raw
    /// units for assets the ledger does not know.
    pub fn format(&self, asset: &AssetId, amount: Amount) -> String {
        match self.assets.asset_info(asset) {
            Some(info) => amount.format_units(info.decimals),
            None => amount.to_string(),
        }
    }
}
