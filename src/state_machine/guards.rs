use super::errors::{business_rule_violation, missing_input, GuardResult};
use super::events::BookingEvent;
use crate::models::Booking;

/// Trait for implementing state transition guards
pub trait StateGuard<T> {
    /// Check if a transition is allowed
    fn check(&self, entity: &T) -> GuardResult<()>;

    /// Get a description of this guard for logging
    fn description(&self) -> &'static str;
}

/// A delivered receipt for a settled booking is part of the audit trail;
/// the booking can no longer be cancelled
pub struct ReceiptNotDeliveredGuard;

impl StateGuard<Booking> for ReceiptNotDeliveredGuard {
    fn check(&self, booking: &Booking) -> GuardResult<()> {
        if booking.receipt_sent && booking.is_confirmed_and_paid() {
            return Err(business_rule_violation(format!(
                "Booking {} has a delivered receipt and cannot be cancelled",
                booking.id
            )));
        }
        Ok(())
    }

    fn description(&self) -> &'static str {
        "Receipted paid bookings cannot be cancelled"
    }
}

/// Cancellations must say why
pub struct CancellationReasonGuard;

impl StateGuard<BookingEvent> for CancellationReasonGuard {
    fn check(&self, event: &BookingEvent) -> GuardResult<()> {
        match event {
            BookingEvent::Cancel(reason) if reason.trim().is_empty() => {
                Err(missing_input("cancellation_reason"))
            }
            _ => Ok(()),
        }
    }

    fn description(&self) -> &'static str {
        "Cancellation requires a reason"
    }
}
