//! # Booking Lifecycle
//!
//! Creation, confirmation and cancellation of bookings under the store lock,
//! plus pricing and the post-commit notification hook.

pub mod lifecycle;
pub mod notifier;
pub mod pricing;

pub use lifecycle::{
    BookingManager, BookingRequest, ConfirmOutcome, PaymentEvent, PaymentEventOutcome,
    PricingInputs,
};
pub use notifier::{
    BookingNotification, BookingNotifier, BroadcastNotifier, NoopNotifier, NotificationError,
};
pub use pricing::{quote, PriceQuote, RateBasis};
