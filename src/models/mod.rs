//! # Entity Models
//!
//! Every entity lives inside one [`Document`]. Records have no per-record
//! versioning; the document is rewritten as a whole on each mutation.

pub mod availability_block;
pub mod booking;
pub mod document;
pub mod guest;
pub mod processed_event;
pub mod room;
pub mod settings;

// Re-export core models for easy access
pub use availability_block::{AvailabilityBlock, BlockReason, NewAvailabilityBlock};
pub use booking::Booking;
pub use document::Document;
pub use guest::{Guest, GuestFields};
pub use processed_event::ProcessedExternalEvent;
pub use room::{LocalizedText, NewRoom, Room, RoomUpdate};
pub use settings::{NotificationKind, Settings, SettingsPatch};
