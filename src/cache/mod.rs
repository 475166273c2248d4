//! # Store Cache Module
//!
//! Typed TTL caches in front of the document store.
//!
//! ```text
//! StoreCache
//!   ├── document      TtlCache<Arc<Document>>          short TTL
//!   ├── rooms         TtlCache<Arc<Vec<Room>>>         long TTL
//!   ├── bookings      TtlCache<Arc<Vec<Booking>>>      short TTL, per room
//!   ├── availability  TtlCache<Arc<Vec<OccupiedRange>>> short TTL, per room
//!   └── settings      TtlCache<Settings>
//! ```
//!
//! Every key starts with `store:`; a successful store write drops them all
//! with one prefix sweep, so no read outlives the write that changed it.

pub mod store_cache;
pub mod ttl_cache;

pub use store_cache::StoreCache;
pub use ttl_cache::{spawn_sweeper, Sweep, TtlCache};
