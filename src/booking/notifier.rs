//! Post-commit notification hook
//!
//! The lifecycle manager calls a [`BookingNotifier`] only after a transition
//! has been written, and only for kinds the settings allow. Delivery failures
//! are logged and never undo the transition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::constants::events;
use crate::models::{Booking, NotificationKind};
use crate::state_machine::BookingState;

/// What a collaborator is asked to send
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingNotification {
    pub kind: NotificationKind,
    /// One of the `constants::events` names
    pub event: String,
    pub booking: Booking,
    pub emitted_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Notification channel {channel} failed: {message}")]
    Delivery { channel: String, message: String },
}

#[async_trait]
pub trait BookingNotifier: Send + Sync {
    async fn notify(&self, notification: &BookingNotification) -> Result<(), NotificationError>;
}

/// Discards every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

#[async_trait]
impl BookingNotifier for NoopNotifier {
    async fn notify(&self, _notification: &BookingNotification) -> Result<(), NotificationError> {
        Ok(())
    }
}

/// Fans notifications out to in-process subscribers (mailers, chat bots)
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<BookingNotification>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BookingNotification> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[async_trait]
impl BookingNotifier for BroadcastNotifier {
    async fn notify(&self, notification: &BookingNotification) -> Result<(), NotificationError> {
        // No subscribers is fine; nobody asked to hear about it
        let _ = self.sender.send(notification.clone());
        Ok(())
    }
}

/// Notification kinds that follow a committed lifecycle event
pub(crate) fn kinds_for(event: &str, booking: &Booking) -> &'static [NotificationKind] {
    use NotificationKind::*;

    match event {
        events::BOOKING_CONFIRMED => &[
            BookingConfirmationEmail,
            BookingConfirmationWhatsapp,
            ContractDelivery,
            ReceiptDelivery,
            AdminBookingAlert,
        ],
        events::BOOKING_CREATED if booking.status.is_awaiting_payment() => {
            &[PaymentReminder, AdminBookingAlert]
        }
        // Confirmed on creation: the confirmation event carries the alert
        events::BOOKING_CREATED if booking.status == BookingState::Confirmed => &[],
        events::BOOKING_CREATED | events::BOOKING_CANCELLED | events::BOOKING_SUPERSEDED => {
            &[AdminBookingAlert]
        }
        _ => &[],
    }
}
