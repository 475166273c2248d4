// State machine module for the booking lifecycle
//
// Bookings move through pending / pending_payment / confirmed / cancelled.
// Transitions are computed here as pure functions over a `Booking`; the
// lifecycle manager applies them inside the store's critical section.

pub mod booking_state_machine;
pub mod errors;
pub mod events;
pub mod guards;
pub mod states;

// Re-export main types for convenient access
pub use booking_state_machine::BookingStateMachine;
pub use errors::{GuardError, StateMachineError, StateMachineResult};
pub use events::BookingEvent;
pub use states::{BookingState, PaymentMethod, PaymentStatus};

// Common traits and utilities
pub use guards::StateGuard;
