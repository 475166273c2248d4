//! # Availability Engine
//!
//! Lock-free date arithmetic over a room's occupied ranges: overlap checks,
//! the forward gap to the next commitment, and the four-tier duration policy
//! (standard / fill-in, gap-filling, auto-extended, unavailable).

pub mod engine;
pub mod types;

pub use engine::{
    blocked_dates, calculate_optimal_duration, check_range, get_max_available_days,
    is_range_available, recommend_duration, AvailabilityPolicy,
};
pub use types::{
    AvailabilityCheck, BookingMode, DateRange, DurationRecommendation, MaxAvailable,
    OccupiedRange, RangeSource,
};
