#![allow(clippy::doc_markdown)] // Allow technical terms like JSON, TTL in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Studio Booking Core
//!
//! Persistence and availability engine for a small studio-rental business.
//!
//! ## Overview
//!
//! All state (rooms, guests, bookings, availability blocks, the processed
//! payment-event ledger and notification settings) lives in one JSON
//! document. Every read-modify-write runs under a single FIFO lock and is
//! persisted with a temp-file-then-rename write, so concurrent booking
//! requests can never double-book a room and a crash never leaves a torn
//! file behind.
//!
//! ## Module Organization
//!
//! - [`store`] - Atomic single-file document store and its lock
//! - [`cache`] - Typed TTL caches in front of the store
//! - [`availability`] - Pure overlap, gap and duration-policy computations
//! - [`state_machine`] - Booking status transitions and guards
//! - [`booking`] - Lifecycle manager, pricing and notification hook
//! - [`ledger`] - Exactly-once handling of external payment events
//! - [`settings`] - Notification toggles
//! - [`config`] - Layered configuration
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use studio_booking::StudioCore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let core = StudioCore::open("data/studio.json")?;
//!
//! for room in core.bookings().rooms().await?.iter() {
//!     println!("{}: {} cents/month", room.name.en, room.monthly_rate_cents);
//! }
//! # Ok(())
//! # }
//! ```

pub mod availability;
pub mod booking;
pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod settings;
pub mod state_machine;
pub mod store;

pub use availability::{
    AvailabilityCheck, AvailabilityPolicy, BookingMode, DateRange, DurationRecommendation,
    MaxAvailable, OccupiedRange,
};
pub use booking::{
    BookingManager, BookingNotifier, BookingRequest, ConfirmOutcome, PaymentEvent,
    PaymentEventOutcome, PricingInputs,
};
pub use bootstrap::StudioCore;
pub use config::{ConfigManager, StudioConfig};
pub use constants::{BookingStatus, PaymentStatus};
pub use error::{BookingError, Result};
pub use ledger::{EventDisposition, ExternalEventLedger};
pub use models::{
    AvailabilityBlock, Booking, Document, Guest, GuestFields, NewAvailabilityBlock, NewRoom,
    Room, RoomUpdate, Settings, SettingsPatch,
};
pub use settings::SettingsRegistry;
pub use state_machine::{BookingState, PaymentMethod};
pub use store::DocumentStore;
