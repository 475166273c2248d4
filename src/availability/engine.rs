//! Pure availability computations. Callers hand in the occupied ranges for a
//! single room; nothing here touches the store, so no lock is needed.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::types::{
    AvailabilityCheck, BookingMode, DateRange, DurationRecommendation, MaxAvailable,
    OccupiedRange,
};
use crate::constants::policy;

/// Length limits the engine reconciles requests against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityPolicy {
    pub cleaning_buffer_days: i64,
    pub min_booking_days: i64,
    pub min_gap_fill_days: i64,
}

impl Default for AvailabilityPolicy {
    fn default() -> Self {
        Self {
            cleaning_buffer_days: policy::CLEANING_BUFFER_DAYS,
            min_booking_days: policy::MIN_BOOKING_DAYS,
            min_gap_fill_days: policy::MIN_GAP_FILL_DAYS,
        }
    }
}

/// Check whether a stay of `duration_days` from `start` collides with any
/// occupied range. On conflict, reports the earliest-starting collision.
/// `None` when the stay has no valid date range.
pub fn is_range_available(
    start: NaiveDate,
    duration_days: i64,
    existing: &[OccupiedRange],
) -> Option<AvailabilityCheck> {
    DateRange::for_stay(start, duration_days).map(|stay| check_range(&stay, existing))
}

/// Same as [`is_range_available`] for an explicit range
pub fn check_range(requested: &DateRange, existing: &[OccupiedRange]) -> AvailabilityCheck {
    existing
        .iter()
        .filter(|occupied| requested.overlaps(&occupied.range))
        .min_by_key(|occupied| occupied.range.start)
        .map(AvailabilityCheck::blocked_by)
        .unwrap_or_else(AvailabilityCheck::free)
}

/// Days from `start` to the next commitment that starts strictly later,
/// minus the cleaning buffer
pub fn get_max_available_days(
    start: NaiveDate,
    existing: &[OccupiedRange],
    policy: &AvailabilityPolicy,
) -> MaxAvailable {
    existing
        .iter()
        .map(|occupied| occupied.range.start)
        .filter(|next_start| *next_start > start)
        .min()
        .map(|next_start| {
            MaxAvailable::Days((next_start - start).num_days() - policy.cleaning_buffer_days)
        })
        .unwrap_or(MaxAvailable::Unbounded)
}

/// Reconcile a requested stay length with the gap available from `start`
pub fn calculate_optimal_duration(
    start: NaiveDate,
    requested_days: i64,
    existing: &[OccupiedRange],
    policy: &AvailabilityPolicy,
) -> DurationRecommendation {
    let max_available = get_max_available_days(start, existing, policy);

    let (days, mode) = match max_available {
        MaxAvailable::Unbounded if requested_days >= policy.min_booking_days => {
            (requested_days, BookingMode::Standard)
        }
        MaxAvailable::Unbounded => (
            requested_days.max(policy.min_gap_fill_days),
            BookingMode::FillIn,
        ),
        MaxAvailable::Days(gap) if gap >= policy.min_booking_days => (
            requested_days.clamp(policy.min_booking_days, gap),
            BookingMode::Standard,
        ),
        MaxAvailable::Days(gap) if gap >= policy.min_gap_fill_days => {
            (gap, BookingMode::GapFilling)
        }
        MaxAvailable::Days(gap) if gap > 0 => (gap, BookingMode::AutoExtended),
        MaxAvailable::Days(_) => (0, BookingMode::Unavailable),
    };

    DurationRecommendation {
        requested_days,
        days,
        mode,
        max_available,
        requires_confirmation: mode != BookingMode::Unavailable && days != requested_days,
    }
}

/// Full recommendation for a start date: unavailable when the start date
/// itself is already occupied, otherwise [`calculate_optimal_duration`]
pub fn recommend_duration(
    start: NaiveDate,
    requested_days: i64,
    existing: &[OccupiedRange],
    policy: &AvailabilityPolicy,
) -> DurationRecommendation {
    if existing.iter().any(|occupied| occupied.range.contains(start)) {
        return DurationRecommendation {
            requested_days,
            days: 0,
            mode: BookingMode::Unavailable,
            max_available: MaxAvailable::Days(0),
            requires_confirmation: false,
        };
    }

    calculate_optimal_duration(start, requested_days, existing, policy)
}

/// Every date in `[from, to)` covered by an occupied range, ascending
pub fn blocked_dates(
    from: NaiveDate,
    to: NaiveDate,
    existing: &[OccupiedRange],
) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut day = from;
    while day < to {
        if existing.iter().any(|occupied| occupied.range.contains(day)) {
            dates.push(day);
        }
        day += Duration::days(1);
    }
    dates
}
