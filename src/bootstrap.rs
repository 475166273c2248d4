//! # Core Bootstrap
//!
//! Wires the store, cache sweeper, lifecycle manager, ledger and settings
//! registry from one [`StudioConfig`].

use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::booking::{BookingManager, BookingNotifier};
use crate::cache::spawn_sweeper;
use crate::config::{ConfigManager, StudioConfig};
use crate::error::Result;
use crate::ledger::ExternalEventLedger;
use crate::logging::init_structured_logging;
use crate::settings::SettingsRegistry;
use crate::store::DocumentStore;

/// Handle to a running booking core. Components share one store.
pub struct StudioCore {
    config: StudioConfig,
    store: Arc<DocumentStore>,
    bookings: BookingManager,
    ledger: ExternalEventLedger,
    settings: SettingsRegistry,
    sweeper: Option<JoinHandle<()>>,
}

impl StudioCore {
    /// Build every component from a validated configuration. The cache
    /// sweeper starts only when called inside a tokio runtime.
    pub fn bootstrap(config: StudioConfig) -> Result<Self> {
        init_structured_logging();
        config.validate()?;
        config.cache.log_configuration();

        let store = Arc::new(DocumentStore::open(&config.store.path, &config.cache));
        let sweeper = if !config.cache.is_enabled() {
            None
        } else if tokio::runtime::Handle::try_current().is_ok() {
            Some(spawn_sweeper(store.cache(), config.cache.cleanup_interval()))
        } else {
            debug!("No tokio runtime, cache sweeper not started");
            None
        };

        let bookings = BookingManager::new(Arc::clone(&store), &config);
        let ledger =
            ExternalEventLedger::new(Arc::clone(&store), config.booking.ledger_retention());
        let settings = SettingsRegistry::new(Arc::clone(&store));

        info!(
            store_path = %config.store.path.display(),
            sweeper = sweeper.is_some(),
            "Studio booking core ready"
        );

        Ok(Self {
            config,
            store,
            bookings,
            ledger,
            settings,
            sweeper,
        })
    }

    /// Defaults for the detected environment, backed by `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let mut config = StudioConfig::for_environment(&ConfigManager::detect_environment());
        config.store.path = path.into();
        Self::bootstrap(config)
    }

    /// Load layered configuration from `config/` and the environment
    pub fn load() -> Result<Self> {
        let manager = ConfigManager::load()?;
        Self::bootstrap(manager.config().clone())
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn BookingNotifier>) -> Self {
        self.bookings = self.bookings.clone().with_notifier(notifier);
        self
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    pub fn bookings(&self) -> &BookingManager {
        &self.bookings
    }

    pub fn ledger(&self) -> &ExternalEventLedger {
        &self.ledger
    }

    pub fn settings(&self) -> &SettingsRegistry {
        &self.settings
    }
}

impl Drop for StudioCore {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
    }
}
