//! # System Constants
//!
//! Booking policy defaults, cache key layout, and the notification event names
//! shared between the lifecycle manager and its collaborators.

// Re-export state types for convenience
pub use crate::state_machine::{BookingState as BookingStatus, PaymentStatus};

/// Booking policy defaults. Every value here can be overridden through
/// [`crate::config::BookingPolicyConfig`].
pub mod policy {
    /// Calendar days kept free before the next commitment on a room
    pub const CLEANING_BUFFER_DAYS: i64 = 2;

    /// Minimum length of a standard booking
    pub const MIN_BOOKING_DAYS: i64 = 30;

    /// Minimum length of a gap-filling or fill-in booking
    pub const MIN_GAP_FILL_DAYS: i64 = 7;

    /// How long a deferred bank-style payment may hold a room
    pub const PENDING_PAYMENT_EXPIRY_HOURS: i64 = 48;

    /// Retention window for processed external events
    pub const LEDGER_RETENTION_DAYS: i64 = 30;

    /// Length of one billing cycle for monthly rates and recurring cleaning
    pub const BILLING_CYCLE_DAYS: i64 = 30;

    /// Stays at least this long bill at the yearly rate
    pub const YEARLY_RATE_MIN_DAYS: i64 = 365;

    /// Cancellation reason stamped when a confirmation race is lost
    pub const SUPERSEDED_REASON: &str =
        "system: dates were confirmed for another booking before payment settled";
}

/// Cache key layout. Every key produced by the document store starts with
/// [`cache_keys::STORE_PREFIX`] so a single prefix sweep invalidates them all.
pub mod cache_keys {
    pub const STORE_PREFIX: &str = "store:";
    pub const DOCUMENT: &str = "store:document";
    pub const ROOMS: &str = "store:rooms";
    pub const SETTINGS: &str = "store:settings";

    pub fn room_bookings(room_id: &uuid::Uuid) -> String {
        format!("store:bookings:room:{room_id}")
    }

    pub fn room_availability(room_id: &uuid::Uuid) -> String {
        format!("store:availability:room:{room_id}")
    }
}

/// Notification events emitted after committed transitions
pub mod events {
    pub const BOOKING_CREATED: &str = "booking.created";
    pub const BOOKING_CONFIRMED: &str = "booking.confirmed";
    pub const BOOKING_CANCELLED: &str = "booking.cancelled";
    pub const BOOKING_SUPERSEDED: &str = "booking.superseded";
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_derived_keys_share_store_prefix() {
        let room_id = Uuid::new_v4();
        assert!(cache_keys::room_bookings(&room_id).starts_with(cache_keys::STORE_PREFIX));
        assert!(cache_keys::room_availability(&room_id).starts_with(cache_keys::STORE_PREFIX));
        assert!(cache_keys::DOCUMENT.starts_with(cache_keys::STORE_PREFIX));
        assert!(cache_keys::ROOMS.starts_with(cache_keys::STORE_PREFIX));
        assert!(cache_keys::SETTINGS.starts_with(cache_keys::STORE_PREFIX));
    }
}
