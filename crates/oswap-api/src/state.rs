//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers via
//! the `State` extractor. Everything behind it is synchronous and guarded by
//! `parking_lot` locks that are never held across an `.await`.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use oswap_core::{Clock, SystemClock};
use oswap_escrow::{EscrowLedger, InMemoryAssetLedger};

use crate::config::{AppConfig, ConfigError, Genesis};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Arc<AppConfig>,
    /// Asset ledger backing every balance movement.
    pub assets: Arc<InMemoryAssetLedger>,
    /// The escrow ledger.
    pub ledger: Arc<EscrowLedger>,
    /// Prometheus render handle, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("ledger_account", self.ledger.account())
            .field("orders", &self.ledger.order_count())
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

impl AppState {
    /// Build state on the wall clock, applying the configured genesis file.
    pub fn from_config(config: AppConfig) -> Result<Self, ConfigError> {
        let assets = Arc::new(InMemoryAssetLedger::new());
        if let Some(path) = &config.genesis {
            Genesis::load(path)?.apply(&assets)?;
        }
        Ok(Self::with_parts(config, assets, Arc::new(SystemClock)))
    }

    /// Build state around an existing asset ledger and clock. The genesis
    /// file of `config` is ignored.
    pub fn with_parts(
        config: AppConfig,
        assets: Arc<InMemoryAssetLedger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let ledger = Arc::new(EscrowLedger::new(
            config.ledger_account.clone(),
            assets.clone(),
            clock,
        ));
        Self {
            config: Arc::new(config),
            assets,
            ledger,
            metrics: None,
        }
    }

    /// Attach a Prometheus handle so `/metrics` is served.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
