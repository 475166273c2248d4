//! Property tests for the pure availability engine

mod common;

use chrono::Duration;
use common::date;
use proptest::prelude::*;
use uuid::Uuid;

use studio_booking::availability::{
    calculate_optimal_duration, get_max_available_days, is_range_available, recommend_duration,
};
use studio_booking::{AvailabilityPolicy, BookingMode, DateRange, MaxAvailable, OccupiedRange};

fn booked(offset: i64, len: i64) -> OccupiedRange {
    let start = date(2025, 1, 1) + Duration::days(offset);
    OccupiedRange::booking(Uuid::new_v4(), DateRange::for_stay(start, len).unwrap())
}

#[test]
fn test_concrete_gap_filling_example() {
    let existing = vec![OccupiedRange::booking(
        Uuid::new_v4(),
        DateRange::new(date(2025, 3, 1), date(2025, 3, 10)).unwrap(),
    )];
    let policy = AvailabilityPolicy::default();

    assert_eq!(
        get_max_available_days(date(2025, 2, 15), &existing, &policy),
        MaxAvailable::Days(12)
    );
    let rec = calculate_optimal_duration(date(2025, 2, 15), 30, &existing, &policy);
    assert_eq!(rec.mode, BookingMode::GapFilling);
    assert_eq!(rec.days, 12);
}

#[test]
fn test_custom_buffer_changes_gap() {
    let existing = vec![booked(40, 30)];
    let policy = AvailabilityPolicy {
        cleaning_buffer_days: 5,
        ..AvailabilityPolicy::default()
    };
    assert_eq!(
        get_max_available_days(date(2025, 1, 1), &existing, &policy),
        MaxAvailable::Days(35)
    );
}

proptest! {
    /// A bookable recommendation never reaches the next commitment
    #[test]
    fn recommendation_stays_clear_of_next_range(
        next_offset in 1i64..200,
        next_len in 1i64..60,
        requested in 1i64..120,
    ) {
        let start = date(2025, 1, 1);
        let existing = vec![booked(next_offset, next_len)];
        let rec = recommend_duration(start, requested, &existing, &AvailabilityPolicy::default());

        if rec.is_bookable() {
            prop_assert!(rec.days > 0);
            prop_assert!(rec.max_available.admits(rec.days));
            prop_assert!(is_range_available(start, rec.days, &existing).unwrap().available);
        } else {
            prop_assert_eq!(rec.days, 0);
        }
    }

    /// The mode is determined by the gap alone once a later commitment exists
    #[test]
    fn mode_tracks_gap_thresholds(next_offset in 1i64..200, requested in 1i64..120) {
        let existing = vec![booked(next_offset, 10)];
        let rec = calculate_optimal_duration(
            date(2025, 1, 1),
            requested,
            &existing,
            &AvailabilityPolicy::default(),
        );
        let gap = next_offset - 2;

        let expected = match gap {
            g if g >= 30 => BookingMode::Standard,
            g if g >= 7 => BookingMode::GapFilling,
            g if g > 0 => BookingMode::AutoExtended,
            _ => BookingMode::Unavailable,
        };
        prop_assert_eq!(rec.mode, expected);
        prop_assert_eq!(rec.max_available, MaxAvailable::Days(gap));
        prop_assert_eq!(rec.requires_confirmation, rec.is_bookable() && rec.days != requested);
    }

    /// On an open calendar the request is honored or raised to the fill-in minimum
    #[test]
    fn open_calendar_never_shortens(requested in 1i64..400) {
        let rec = calculate_optimal_duration(
            date(2025, 1, 1),
            requested,
            &[],
            &AvailabilityPolicy::default(),
        );
        prop_assert_eq!(rec.max_available, MaxAvailable::Unbounded);
        prop_assert!(rec.days >= requested);
        prop_assert!(rec.days >= 7);
    }

    /// Availability agrees with the inclusive overlap test
    #[test]
    fn availability_matches_overlap(
        a_offset in 0i64..100,
        a_len in 0i64..40,
        b_offset in 0i64..100,
        b_len in 0i64..40,
    ) {
        let requested_start = date(2025, 1, 1) + Duration::days(a_offset);
        let existing = booked(b_offset, b_len);
        let check = is_range_available(requested_start, a_len, &[existing]).unwrap();

        let requested = DateRange::for_stay(requested_start, a_len).unwrap();
        prop_assert_eq!(check.available, !requested.overlaps(&existing.range));
        if !check.available {
            prop_assert_eq!(check.conflict_date, Some(existing.range.start));
        }
    }
}
