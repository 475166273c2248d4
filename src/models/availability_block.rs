use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::availability::{DateRange, OccupiedRange};
use crate::error::{BookingError, Result};

/// Why the owner took the room off the calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    Maintenance,
    PersonalUse,
    Other,
}

/// Owner-imposed unavailability window. Blocks dates exactly like a booking
/// but carries no guest or payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityBlock {
    pub id: Uuid,
    pub room_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: BlockReason,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAvailabilityBlock {
    pub room_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: BlockReason,
    pub note: Option<String>,
}

impl NewAvailabilityBlock {
    pub fn range(&self) -> Result<DateRange> {
        DateRange::new(self.start_date, self.end_date).ok_or_else(|| {
            BookingError::validation("end_date", "block must end on or after its start")
        })
    }
}

impl AvailabilityBlock {
    pub fn from_new(new_block: NewAvailabilityBlock, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_id: new_block.room_id,
            start_date: new_block.start_date,
            end_date: new_block.end_date,
            reason: new_block.reason,
            note: new_block.note,
            created_at: now,
        }
    }

    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }

    pub fn occupied_range(&self) -> OccupiedRange {
        OccupiedRange::block(self.id, self.range())
    }
}
