use chrono::{DateTime, Utc};

use super::{
    errors::{StateMachineError, StateMachineResult},
    events::BookingEvent,
    guards::{CancellationReasonGuard, ReceiptNotDeliveredGuard, StateGuard},
    states::{BookingState, PaymentStatus},
};
use crate::models::Booking;

/// Transition table and side-stamping for the booking lifecycle.
///
/// Stateless: the booking itself carries its current state, and the caller
/// is responsible for running transitions inside the store's critical
/// section.
#[derive(Debug, Default, Clone, Copy)]
pub struct BookingStateMachine;

impl BookingStateMachine {
    pub fn new() -> Self {
        Self
    }

    /// Determine the target state based on current state and event
    pub fn determine_target_state(
        &self,
        current_state: BookingState,
        event: &BookingEvent,
    ) -> StateMachineResult<BookingState> {
        let target = match (current_state, event) {
            // Payment settled
            (BookingState::Pending, BookingEvent::Confirm) => BookingState::Confirmed,
            (BookingState::PendingPayment, BookingEvent::Confirm) => BookingState::Confirmed,

            // Cancellation from any live state
            (BookingState::Pending, BookingEvent::Cancel(_)) => BookingState::Cancelled,
            (BookingState::PendingPayment, BookingEvent::Cancel(_)) => BookingState::Cancelled,
            (BookingState::Confirmed, BookingEvent::Cancel(_)) => BookingState::Cancelled,

            // Lost a confirmation race
            (BookingState::Pending, BookingEvent::Supersede(_)) => BookingState::Cancelled,
            (BookingState::PendingPayment, BookingEvent::Supersede(_)) => BookingState::Cancelled,

            // Invalid transitions
            (from_state, _) => {
                return Err(StateMachineError::InvalidTransition {
                    from: from_state.to_string(),
                    event: event.event_type().to_string(),
                })
            }
        };

        Ok(target)
    }

    /// Check guard conditions for the transition
    fn check_guards(&self, booking: &Booking, event: &BookingEvent) -> StateMachineResult<()> {
        if let BookingEvent::Cancel(_) = event {
            CancellationReasonGuard.check(event)?;
            ReceiptNotDeliveredGuard.check(booking)?;
        }
        Ok(())
    }

    /// Apply `event` to `booking`, stamping the matching timestamps.
    /// The booking is left untouched when the transition is rejected.
    pub fn transition(
        &self,
        booking: &mut Booking,
        event: &BookingEvent,
        now: DateTime<Utc>,
    ) -> StateMachineResult<BookingState> {
        let target_state = self.determine_target_state(booking.status, event)?;
        self.check_guards(booking, event)?;

        match target_state {
            BookingState::Confirmed => {
                booking.confirmed_at = Some(now);
                booking.payment_status = PaymentStatus::Paid;
                booking.expires_at = None;
            }
            BookingState::Cancelled => {
                booking.cancelled_at = Some(now);
                booking.cancellation_reason = event
                    .cancellation_reason()
                    .map(|reason| reason.trim().to_string());
            }
            BookingState::Pending | BookingState::PendingPayment => {
                return Err(StateMachineError::Internal(format!(
                    "No event leads back to {target_state}"
                )));
            }
        }

        tracing::debug!(
            booking_id = %booking.id,
            from = %booking.status,
            to = %target_state,
            event = event.event_type(),
            "Booking state transition"
        );

        booking.status = target_state;
        booking.updated_at = now;
        Ok(target_state)
    }
}
