//! Cache Configuration
//!
//! TTLs per cached entity kind. Rooms rarely change and keep a long TTL;
//! bookings and availability churn and keep a short one. Every store write
//! invalidates all of them regardless of TTL.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use super::error::{ConfigResult, ConfigurationError};

/// Configuration for document store caching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub document: CacheTypeConfig,
    pub rooms: CacheTypeConfig,
    pub bookings: CacheTypeConfig,
    pub availability: CacheTypeConfig,
    pub settings: CacheTypeConfig,
    pub cleanup_interval_seconds: u64,
}

/// Configuration for a specific type of cached data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheTypeConfig {
    pub ttl_seconds: u64,
    pub max_entries: usize,
}

impl CacheTypeConfig {
    pub const fn new(ttl_seconds: u64, max_entries: usize) -> Self {
        Self {
            ttl_seconds,
            max_entries,
        }
    }

    /// Get TTL as Duration
    pub fn ttl_duration(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl Default for CacheConfig {
    /// Default configuration suitable for production
    fn default() -> Self {
        Self {
            enabled: true,
            document: CacheTypeConfig::new(5, 1),
            rooms: CacheTypeConfig::new(600, 16),
            bookings: CacheTypeConfig::new(5, 256),
            availability: CacheTypeConfig::new(5, 256),
            settings: CacheTypeConfig::new(60, 1),
            cleanup_interval_seconds: 60,
        }
    }
}

impl CacheConfig {
    /// Create test-optimized configuration with rapid invalidation
    pub fn for_test() -> Self {
        Self {
            enabled: true,
            document: CacheTypeConfig::new(1, 1),
            rooms: CacheTypeConfig::new(5, 16),
            bookings: CacheTypeConfig::new(1, 64),
            availability: CacheTypeConfig::new(1, 64),
            settings: CacheTypeConfig::new(1, 1),
            cleanup_interval_seconds: 1,
        }
    }

    /// Create development-optimized configuration
    pub fn for_development() -> Self {
        Self {
            enabled: true,
            document: CacheTypeConfig::new(2, 1),
            rooms: CacheTypeConfig::new(60, 16),
            bookings: CacheTypeConfig::new(2, 128),
            availability: CacheTypeConfig::new(2, 128),
            settings: CacheTypeConfig::new(10, 1),
            cleanup_interval_seconds: 30,
        }
    }

    /// Preset matching an environment name
    pub fn for_environment(environment: &str) -> Self {
        match environment {
            "test" => Self::for_test(),
            "development" => Self::for_development(),
            _ => Self::default(),
        }
    }

    /// Check if caching is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Get cleanup interval as Duration
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_seconds)
    }

    /// Log current configuration for debugging
    pub fn log_configuration(&self) {
        info!(
            enabled = self.enabled,
            document_ttl = self.document.ttl_seconds,
            rooms_ttl = self.rooms.ttl_seconds,
            bookings_ttl = self.bookings.ttl_seconds,
            availability_ttl = self.availability.ttl_seconds,
            settings_ttl = self.settings.ttl_seconds,
            cleanup_interval = self.cleanup_interval_seconds,
            "Store cache configuration"
        );
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.cleanup_interval_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "cache.cleanup_interval_seconds",
                "0",
                "Cleanup interval must be greater than 0",
            ));
        }

        if self.rooms.ttl_seconds < self.bookings.ttl_seconds {
            warn!("Rooms cache TTL is shorter than bookings TTL - rooms change far less often");
        }

        for (name, kind) in [
            ("document", &self.document),
            ("rooms", &self.rooms),
            ("bookings", &self.bookings),
            ("availability", &self.availability),
            ("settings", &self.settings),
        ] {
            if kind.ttl_seconds == 0 || kind.max_entries == 0 {
                warn!(cache = name, "Cache TTL or capacity is 0 - caching effectively disabled");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rooms_outlive_bookings_by_default() {
        let config = CacheConfig::default();
        assert!(config.rooms.ttl_duration() > config.bookings.ttl_duration());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_cleanup_interval_rejected() {
        let mut config = CacheConfig::for_test();
        config.cleanup_interval_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_environment_presets() {
        assert_eq!(CacheConfig::for_environment("test"), CacheConfig::for_test());
        assert_eq!(
            CacheConfig::for_environment("staging"),
            CacheConfig::default()
        );
    }
}
