use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::availability::{DateRange, OccupiedRange};
use crate::state_machine::{BookingState, PaymentMethod, PaymentStatus};

/// The central booking record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub room_id: Uuid,
    pub guest_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_amount_cents: i64,
    pub status: BookingState,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    /// Deadline for a `pending_payment` hold; read by the external reaper
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cleaning_service: bool,
    #[serde(default)]
    pub cleaning_fee_cents: i64,
    #[serde(default)]
    pub terms_accepted: bool,
    pub terms_accepted_at: Option<DateTime<Utc>>,
    pub signature: Option<String>,
    pub signature_accepted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub contract_sent: bool,
    pub contract_sent_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub receipt_sent: bool,
    pub receipt_sent_at: Option<DateTime<Utc>>,
    pub payment_reference: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }

    pub fn num_days(&self) -> i64 {
        self.range().num_days()
    }

    pub fn occupied_range(&self) -> OccupiedRange {
        OccupiedRange::booking(self.id, self.range())
    }

    pub fn occupies_calendar(&self) -> bool {
        self.status.occupies_calendar()
    }

    pub fn is_confirmed_and_paid(&self) -> bool {
        self.status == BookingState::Confirmed && self.payment_status == PaymentStatus::Paid
    }

    /// A `pending_payment` hold whose deadline has passed
    pub fn is_expired_hold(&self, now: DateTime<Utc>) -> bool {
        self.status == BookingState::PendingPayment
            && self.expires_at.is_some_and(|deadline| deadline <= now)
    }

    /// Acceptance flags always travel with their timestamps
    pub fn acceptance_is_consistent(&self) -> bool {
        (self.signature.is_none() || self.signature_accepted_at.is_some())
            && (!self.terms_accepted || self.terms_accepted_at.is_some())
    }
}
