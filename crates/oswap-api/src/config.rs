//! # Service Configuration
//!
//! [`AppConfig`] is read from the environment:
//!
//! | Variable         | Default             | Meaning |
//! |------------------|---------------------|---------|
//! | `PORT`           | `8080`              | listen port |
//! | `AUTH_TOKEN`     | unset (auth off)    | required bearer token |
//! | `LEDGER_ACCOUNT` | `escrow:orderswap`  | custody account of the ledger |
//! | `GENESIS_FILE`   | unset               | YAML file of assets and opening balances |
//!
//! A genesis file looks like:
//!
//! ```yaml
//! assets:
//!   - id: TKA
//!     name: TokenA
//!     symbol: TKA
//!     decimals: 18
//!     balances:
//!       alice: "100"
//! ```
//!
//! Balances are whole-unit decimal strings scaled by the asset's decimals.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use oswap_core::{AccountId, Amount, AssetId};
use oswap_escrow::{InMemoryAssetLedger, TransferError};
use serde::Deserialize;
use thiserror::Error;

/// Custody account used when `LEDGER_ACCOUNT` is unset.
pub const DEFAULT_LEDGER_ACCOUNT: &str = "escrow:orderswap";

/// Errors raised while assembling configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An environment variable holds an unusable value.
    #[error("invalid {var}: {reason}")]
    InvalidVar {
        /// Variable name.
        var: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The genesis file could not be read.
    #[error("failed to read genesis file {path}: {source}")]
    GenesisIo {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The genesis file is not valid YAML for a [`Genesis`].
    #[error("failed to parse genesis file {path}: {source}")]
    GenesisParse {
        /// File path.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_yaml::Error,
    },

    /// A genesis entry is inconsistent.
    #[error("invalid genesis entry for asset {asset}: {reason}")]
    GenesisEntry {
        /// Asset the entry describes.
        asset: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The asset ledger refused a genesis registration or mint.
    #[error("genesis rejected by asset ledger: {0}")]
    GenesisRejected(#[from] TransferError),
}

/// Application configuration.
///
/// Custom `Debug` redacts the `auth_token` to prevent credential leakage in logs.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Static bearer token. If `None`, authentication is disabled.
    pub auth_token: Option<String>,
    /// Custody account of the escrow ledger.
    pub ledger_account: AccountId,
    /// Optional genesis file applied at startup.
    pub genesis: Option<PathBuf>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("ledger_account", &self.ledger_account)
            .field("genesis", &self.genesis)
            .finish()
    }
}

impl AppConfig {
    /// Configuration with default port, no authentication and no genesis
    /// file, holding custody under `ledger_account`.
    pub fn new(ledger_account: AccountId) -> Self {
        Self {
            port: 8080,
            auth_token: None,
            ledger_account,
            genesis: None,
        }
    }

    /// Build configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::InvalidVar {
                var: "PORT",
                reason: format!("{raw:?}: {e}"),
            })?,
            None => 8080,
        };
        let auth_token = lookup("AUTH_TOKEN").filter(|t| !t.is_empty());
        let ledger_account = lookup("LEDGER_ACCOUNT")
            .unwrap_or_else(|| DEFAULT_LEDGER_ACCOUNT.to_string());
        let ledger_account =
            AccountId::new(&ledger_account).map_err(|e| ConfigError::InvalidVar {
                var: "LEDGER_ACCOUNT",
                reason: e.to_string(),
            })?;
        let genesis = lookup("GENESIS_FILE")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        Ok(Self {
            port,
            auth_token,
            ledger_account,
            genesis,
        })
    }
}

/// Assets and opening balances applied to a fresh asset ledger.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Genesis {
    #[serde(default)]
    pub assets: Vec<GenesisAsset>,
}

/// One asset of a [`Genesis`].
#[derive(Debug, Clone, Deserialize)]
pub struct GenesisAsset {
    pub id: AssetId,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Opening balances in whole units.
    #[serde(default)]
    pub balances: BTreeMap<AccountId, String>,
}

impl Genesis {
    /// Read and parse a genesis file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::GenesisIo {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::GenesisParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Register every asset and mint its opening balances.
    ///
    /// All balances are parsed before anything is written, so a malformed
    /// entry leaves the asset ledger untouched.
    pub fn apply(&self, assets: &InMemoryAssetLedger) -> Result<(), ConfigError> {
        let mut planned = Vec::with_capacity(self.assets.len());
        for asset in &self.assets {
            let mut mints = Vec::with_capacity(asset.balances.len());
            for (account, whole) in &asset.balances {
                let amount = Amount::parse_units(whole, asset.decimals).map_err(|e| {
                    ConfigError::GenesisEntry {
                        asset: asset.id.to_string(),
                        reason: format!("balance of {account}: {e}"),
                    }
                })?;
                mints.push((account, amount));
            }
            planned.push((asset, mints));
        }

        for (asset, mints) in planned {
            assets.register_asset(asset.id.clone(), &asset.name, &asset.symbol, asset.decimals)?;
            for (account, amount) in mints {
                assets.mint(&asset.id, account, amount)?;
            }
            tracing::info!(asset = %asset.id, holders = asset.balances.len(), "genesis asset registered");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.auth_token.is_none());
        assert_eq!(config.ledger_account.as_str(), DEFAULT_LEDGER_ACCOUNT);
        assert!(config.genesis.is_none());
    }

    #[test]
    fn reads_all_variables() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("AUTH_TOKEN", "s3cret"),
            ("LEDGER_ACCOUNT", "escrow:test"),
            ("GENESIS_FILE", "/etc/oswap/genesis.yaml"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.auth_token.as_deref(), Some("s3cret"));
        assert_eq!(config.ledger_account.as_str(), "escrow:test");
        assert_eq!(config.genesis, Some(PathBuf::from("/etc/oswap/genesis.yaml")));
    }

    #[test]
    fn rejects_bad_port_and_account() {
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("PORT", "eighty")])),
            Err(ConfigError::InvalidVar { var: "PORT", .. })
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("LEDGER_ACCOUNT", "bad account")])),
            Err(ConfigError::InvalidVar { var: "LEDGER_ACCOUNT", .. })
        ));
    }

    #[test]
    fn debug_redacts_token() {
        let config = AppConfig {
            auth_token: Some("s3cret".into()),
            ..AppConfig::new(AccountId::new("escrow").unwrap())
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("REDACTED"));
    }

    const GENESIS: &str = r#"
assets:
  - id: TKA
    name: TokenA
    symbol: TKA
    decimals: 18
    balances:
      alice: "100"
  - id: TKB
    name: TokenB
    symbol: TKB
    decimals: 6
    balances:
      bob: "20.5"
"#;

    #[test]
    fn genesis_registers_and_mints() {
        let genesis: Genesis = serde_yaml::from_str(GENESIS).unwrap();
        let ledger = InMemoryAssetLedger::new();
        genesis.apply(&ledger).unwrap();

        let tka = AssetId::new("TKA").unwrap();
        let tkb = AssetId::new("TKB").unwrap();
        assert_eq!(
            ledger.balance_of(&tka, &AccountId::new("alice").unwrap()).unwrap(),
            Amount::parse_units("100", 18).unwrap()
        );
        assert_eq!(
            ledger.balance_of(&tkb, &AccountId::new("bob").unwrap()).unwrap(),
            Amount::new(20_500_000)
        );
    }

    #[test]
    fn genesis_with_bad_balance_writes_nothing() {
        let genesis: Genesis = serde_yaml::from_str(
            r#"
assets:
  - id: TKA
    name: TokenA
    symbol: TKA
    decimals: 2
    balances:
      alice: "1.005"
"#,
        )
        .unwrap();
        let ledger = InMemoryAssetLedger::new();
        assert!(matches!(
            genesis.apply(&ledger),
            Err(ConfigError::GenesisEntry { .. })
        ));
        assert!(ledger.assets().is_empty());
    }

    #[test]
    fn genesis_load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.yaml");
        assert!(matches!(
            Genesis::load(&missing),
            Err(ConfigError::GenesisIo { .. })
        ));
    }

    #[test]
    fn genesis_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genesis.yaml");
        std::fs::write(&path, GENESIS).unwrap();
        let genesis = Genesis::load(&path).unwrap();
        assert_eq!(genesis.assets.len(), 2);
    }
}
