use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Inclusive calendar-date range. Dates, not timestamps, so overlap checks
/// never shift across a timezone boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting an end before the start
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (end >= start).then_some(Self { start, end })
    }

    /// Range occupied by a stay of `days` starting at `start`; the end is the
    /// check-out date. `None` for a negative length or a check-out date past
    /// the end of the calendar.
    pub fn for_stay(start: NaiveDate, days: i64) -> Option<Self> {
        let days = u64::try_from(days).ok()?;
        let end = start.checked_add_days(Days::new(days))?;
        Some(Self { start, end })
    }

    /// Inclusive-endpoint overlap test
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && self.end >= other.start
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Nights between start and end
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// What holds an occupied range on a room's calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RangeSource {
    Booking(Uuid),
    Block(Uuid),
}

impl RangeSource {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Booking(id) | Self::Block(id) => *id,
        }
    }
}

/// A committed range on a room's calendar: a non-cancelled booking or an
/// owner-imposed availability block. Both block dates identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupiedRange {
    pub range: DateRange,
    pub source: RangeSource,
}

impl OccupiedRange {
    pub fn booking(id: Uuid, range: DateRange) -> Self {
        Self {
            range,
            source: RangeSource::Booking(id),
        }
    }

    pub fn block(id: Uuid, range: DateRange) -> Self {
        Self {
            range,
            source: RangeSource::Block(id),
        }
    }
}

/// Result of a range availability check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityCheck {
    pub available: bool,
    /// Start date of the first conflicting range
    pub conflict_date: Option<NaiveDate>,
    pub conflicting: Option<RangeSource>,
}

impl AvailabilityCheck {
    pub fn free() -> Self {
        Self {
            available: true,
            conflict_date: None,
            conflicting: None,
        }
    }

    pub fn blocked_by(occupied: &OccupiedRange) -> Self {
        Self {
            available: false,
            conflict_date: Some(occupied.range.start),
            conflicting: Some(occupied.source),
        }
    }
}

/// Longest bookable stay from a start date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "days", rename_all = "snake_case")]
pub enum MaxAvailable {
    /// No later commitment on the calendar
    Unbounded,
    /// Days until the next commitment, minus the cleaning buffer (may be <= 0)
    Days(i64),
}

impl MaxAvailable {
    pub fn days(&self) -> Option<i64> {
        match self {
            Self::Unbounded => None,
            Self::Days(days) => Some(*days),
        }
    }

    pub fn admits(&self, days: i64) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Days(max) => days <= *max,
        }
    }
}

/// How a recommended duration was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingMode {
    /// Regular stay of at least the minimum booking length
    Standard,
    /// Shorter secondary stay on an otherwise open calendar
    FillIn,
    /// Exactly fills a short window between two commitments
    GapFilling,
    /// Stretched to consume a gap too small to rebook
    AutoExtended,
    /// Nothing bookable from this start date
    Unavailable,
}

impl fmt::Display for BookingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::FillIn => write!(f, "fill-in"),
            Self::GapFilling => write!(f, "gap-filling"),
            Self::AutoExtended => write!(f, "auto-extended"),
            Self::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// Outcome of reconciling a requested stay with the room's calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationRecommendation {
    pub requested_days: i64,
    /// Recommended stay length; zero when `mode` is `Unavailable`
    pub days: i64,
    pub mode: BookingMode,
    pub max_available: MaxAvailable,
    /// The recommendation differs from the request and must be shown to the
    /// guest before anything is charged
    pub requires_confirmation: bool,
}

impl DurationRecommendation {
    pub fn is_bookable(&self) -> bool {
        self.mode != BookingMode::Unavailable
    }
}
