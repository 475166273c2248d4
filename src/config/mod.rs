//! # Studio Configuration System
//!
//! Layered configuration for the booking core: built-in defaults per
//! environment, optional TOML files, then `STUDIO__`-prefixed environment
//! variables.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use studio_booking::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load configuration (environment auto-detected)
//! let manager = ConfigManager::load()?;
//!
//! let store_path = &manager.config().store.path;
//! let buffer = manager.config().booking.cleaning_buffer_days;
//! # Ok(())
//! # }
//! ```

pub mod cache_config;
pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::availability::AvailabilityPolicy;
use crate::constants::policy;

pub use cache_config::{CacheConfig, CacheTypeConfig};
pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Backing document location
    pub store: StoreConfig,

    /// Per-entity cache TTLs
    pub cache: CacheConfig,

    /// Booking length and hold policy
    pub booking: BookingPolicyConfig,

    /// Price computation
    pub pricing: PricingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/studio.json"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct BookingPolicyConfig {
    pub cleaning_buffer_days: i64,
    pub min_booking_days: i64,
    pub min_gap_fill_days: i64,
    pub pending_payment_expiry_hours: i64,
    pub ledger_retention_days: i64,
}

impl Default for BookingPolicyConfig {
    fn default() -> Self {
        Self {
            cleaning_buffer_days: policy::CLEANING_BUFFER_DAYS,
            min_booking_days: policy::MIN_BOOKING_DAYS,
            min_gap_fill_days: policy::MIN_GAP_FILL_DAYS,
            pending_payment_expiry_hours: policy::PENDING_PAYMENT_EXPIRY_HOURS,
            ledger_retention_days: policy::LEDGER_RETENTION_DAYS,
        }
    }
}

impl BookingPolicyConfig {
    pub fn availability_policy(&self) -> AvailabilityPolicy {
        AvailabilityPolicy {
            cleaning_buffer_days: self.cleaning_buffer_days,
            min_booking_days: self.min_booking_days,
            min_gap_fill_days: self.min_gap_fill_days,
        }
    }

    pub fn pending_payment_expiry(&self) -> chrono::Duration {
        chrono::Duration::hours(self.pending_payment_expiry_hours)
    }

    pub fn ledger_retention(&self) -> chrono::Duration {
        chrono::Duration::days(self.ledger_retention_days)
    }
}

/// Discount applied to stays of at least `min_days`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct DiscountTier {
    pub min_days: i64,
    pub percent_off: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PricingConfig {
    /// Charged once per started billing cycle when cleaning is requested
    pub cleaning_fee_cents: i64,
    pub discounts: Vec<DiscountTier>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            cleaning_fee_cents: 6_000,
            discounts: vec![
                DiscountTier {
                    min_days: 90,
                    percent_off: 5,
                },
                DiscountTier {
                    min_days: 180,
                    percent_off: 10,
                },
            ],
        }
    }
}

impl StudioConfig {
    /// Defaults tuned for an environment
    pub fn for_environment(environment: &str) -> Self {
        Self {
            cache: CacheConfig::for_environment(environment),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.cache.validate()?;

        let booking = &self.booking;
        if booking.cleaning_buffer_days < 0 {
            return Err(ConfigurationError::invalid_value(
                "booking.cleaning_buffer_days",
                booking.cleaning_buffer_days.to_string(),
                "Cleaning buffer cannot be negative",
            ));
        }
        if booking.min_gap_fill_days < 1 || booking.min_gap_fill_days > booking.min_booking_days {
            return Err(ConfigurationError::invalid_value(
                "booking.min_gap_fill_days",
                booking.min_gap_fill_days.to_string(),
                "Gap-fill minimum must be between 1 and min_booking_days",
            ));
        }
        if booking.pending_payment_expiry_hours <= 0 {
            return Err(ConfigurationError::invalid_value(
                "booking.pending_payment_expiry_hours",
                booking.pending_payment_expiry_hours.to_string(),
                "Payment holds must expire",
            ));
        }
        if booking.ledger_retention_days <= 0 {
            return Err(ConfigurationError::invalid_value(
                "booking.ledger_retention_days",
                booking.ledger_retention_days.to_string(),
                "Retention window must be positive",
            ));
        }

        if self.pricing.cleaning_fee_cents < 0 {
            return Err(ConfigurationError::invalid_value(
                "pricing.cleaning_fee_cents",
                self.pricing.cleaning_fee_cents.to_string(),
                "Cleaning fee cannot be negative",
            ));
        }
        if let Some(tier) = self.pricing.discounts.iter().find(|tier| tier.percent_off > 100) {
            return Err(ConfigurationError::invalid_value(
                "pricing.discounts.percent_off",
                tier.percent_off.to_string(),
                "Discount cannot exceed 100%",
            ));
        }

        Ok(())
    }
}
