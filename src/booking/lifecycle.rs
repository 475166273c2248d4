//! Booking lifecycle manager
//!
//! Every mutation runs as one critical section on the document store:
//! availability is re-checked against the room's current calendar and the
//! result is written before the lock is released. Input validation happens
//! before the lock is taken; notifications go out after it is released.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use super::notifier::{kinds_for, BookingNotification, BookingNotifier, NoopNotifier};
use super::pricing;
use crate::availability::{
    blocked_dates, check_range, recommend_duration, AvailabilityCheck, DateRange,
    DurationRecommendation, OccupiedRange,
};
use crate::config::{BookingPolicyConfig, PricingConfig, StudioConfig};
use crate::constants::events;
use crate::error::{BookingError, Result};
use crate::ledger::{self, EventDisposition};
use crate::logging::{log_booking_operation, log_ledger_operation};
use crate::models::{
    AvailabilityBlock, Booking, Document, Guest, GuestFields, NewAvailabilityBlock, NewRoom,
    Room, RoomUpdate,
};
use crate::state_machine::{BookingEvent, BookingState, BookingStateMachine, PaymentMethod};
use crate::store::DocumentStore;

/// Price-affecting and acceptance inputs of a booking request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingInputs {
    pub cleaning_service: bool,
    pub terms_accepted: bool,
    /// Captured signature image, if the guest signed
    pub signature: Option<String>,
}

/// A guest's request for a stay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub room_id: Uuid,
    pub guest: GuestFields,
    pub start_date: NaiveDate,
    /// Check-out date
    pub end_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub pricing: PricingInputs,
}

impl BookingRequest {
    /// Field-level checks that need no store access
    pub fn validate(&self) -> Result<DateRange> {
        self.guest.validate()?;

        if self.end_date <= self.start_date {
            return Err(BookingError::validation(
                "end_date",
                "check-out must be after check-in",
            ));
        }
        if !self.pricing.terms_accepted {
            return Err(BookingError::validation(
                "terms_accepted",
                "terms must be accepted before booking",
            ));
        }
        if self
            .pricing
            .signature
            .as_deref()
            .is_some_and(|signature| signature.trim().is_empty())
        {
            return Err(BookingError::validation("signature", "signature is empty"));
        }

        Ok(DateRange {
            start: self.start_date,
            end: self.end_date,
        })
    }
}

/// Result of a confirmation attempt. Both outcomes are committed writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ConfirmOutcome {
    Confirmed(Booking),
    /// Another booking for overlapping dates was confirmed first; this one
    /// was cancelled with a system reason and needs an out-of-band refund
    Superseded {
        booking: Booking,
        conflicting_booking_id: Uuid,
    },
}

impl ConfirmOutcome {
    pub fn booking(&self) -> &Booking {
        match self {
            Self::Confirmed(booking) | Self::Superseded { booking, .. } => booking,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed(_))
    }
}

/// Settled-payment notification from the payment provider, signature
/// already verified upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub event_id: String,
    pub event_type: String,
    pub booking_id: Uuid,
    pub amount_cents: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PaymentEventOutcome {
    /// Already applied by an earlier delivery; nothing changed
    Duplicate,
    Applied(ConfirmOutcome),
    /// The booking was confirmed or cancelled before the event arrived. The
    /// event is recorded; the booking is unchanged.
    AlreadyResolved(Booking),
}

/// Transactional create/transition of bookings and the records around them
#[derive(Clone)]
pub struct BookingManager {
    store: Arc<DocumentStore>,
    policy: BookingPolicyConfig,
    pricing: PricingConfig,
    state_machine: BookingStateMachine,
    notifier: Arc<dyn BookingNotifier>,
}

impl BookingManager {
    pub fn new(store: Arc<DocumentStore>, config: &StudioConfig) -> Self {
        Self {
            store,
            policy: config.booking,
            pricing: config.pricing.clone(),
            state_machine: BookingStateMachine::new(),
            notifier: Arc::new(NoopNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn BookingNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    // ----------------------------------------------------------------------
    // Bookings
    // ----------------------------------------------------------------------

    /// Validate, check availability, upsert the guest, price and insert.
    /// Initial status follows the payment method.
    pub async fn create_booking(&self, request: BookingRequest) -> Result<Booking> {
        let range = request.validate()?;
        let availability = self.policy.availability_policy();
        let pricing_config = &self.pricing;
        let policy = &self.policy;

        let booking = self
            .store
            .with_lock(|document| {
                let room = document
                    .room(&request.room_id)
                    .cloned()
                    .ok_or_else(|| BookingError::not_found("room", request.room_id))?;

                let ranges = document.occupied_ranges(&room.id);
                let days = range.num_days();
                ensure_fits(&range, &ranges)?;

                let recommendation =
                    recommend_duration(range.start, days, &ranges, &availability);
                if !recommendation.max_available.admits(days) {
                    return Err(buffer_conflict(&range, &ranges));
                }
                if recommendation.days != days {
                    return Err(BookingError::validation(
                        "end_date",
                        format!(
                            "a {} stay from {} must last {} days, not {days}",
                            recommendation.mode, range.start, recommendation.days
                        ),
                    ));
                }

                let quote = pricing::quote(
                    &room,
                    days,
                    request.pricing.cleaning_service,
                    pricing_config,
                )?;
                let now = Utc::now();
                let guest_id = upsert_guest(document, request.guest.clone(), now);

                let status = request.payment_method.initial_state();
                let booking = Booking {
                    id: Uuid::new_v4(),
                    room_id: room.id,
                    guest_id,
                    start_date: range.start,
                    end_date: range.end,
                    total_amount_cents: quote.total_cents,
                    status,
                    payment_status: request.payment_method.initial_payment_status(),
                    payment_method: request.payment_method,
                    expires_at: (status == BookingState::PendingPayment)
                        .then(|| now + policy.pending_payment_expiry()),
                    cleaning_service: request.pricing.cleaning_service,
                    cleaning_fee_cents: quote.cleaning_fee_cents,
                    terms_accepted: request.pricing.terms_accepted,
                    terms_accepted_at: request.pricing.terms_accepted.then_some(now),
                    signature_accepted_at: request.pricing.signature.as_ref().map(|_| now),
                    signature: request.pricing.signature.clone(),
                    contract_sent: false,
                    contract_sent_at: None,
                    receipt_sent: false,
                    receipt_sent_at: None,
                    payment_reference: None,
                    confirmed_at: (status == BookingState::Confirmed).then_some(now),
                    cancelled_at: None,
                    cancellation_reason: None,
                    created_at: now,
                    updated_at: now,
                };

                document.bookings.push(booking.clone());
                Ok(booking)
            })
            .await
            .inspect_err(|err| {
                log_booking_operation(
                    "create",
                    None,
                    Some(request.room_id),
                    "rejected",
                    Some(err.to_string().as_str()),
                )
            })?;

        log_booking_operation(
            "create",
            Some(booking.id),
            Some(booking.room_id),
            &booking.status.to_string(),
            None,
        );

        self.dispatch(events::BOOKING_CREATED, &booking).await;
        if booking.status == BookingState::Confirmed {
            self.dispatch(events::BOOKING_CONFIRMED, &booking).await;
        }
        Ok(booking)
    }

    /// Settle a pending booking. Loses to any overlapping booking that was
    /// confirmed first, in which case this one is cancelled instead.
    pub async fn confirm_booking(&self, booking_id: Uuid) -> Result<ConfirmOutcome> {
        let outcome = self
            .store
            .with_lock(|document| self.confirm_in(document, &booking_id, None, Utc::now()))
            .await?;

        self.after_confirmation(&outcome).await;
        Ok(outcome)
    }

    pub async fn cancel_booking(&self, booking_id: Uuid, reason: &str) -> Result<Booking> {
        if reason.trim().is_empty() {
            return Err(BookingError::validation(
                "cancellation_reason",
                "a reason is required",
            ));
        }

        let event = BookingEvent::cancel_with_reason(reason);
        let booking = self
            .store
            .with_lock(|document| {
                let booking = document
                    .booking_mut(&booking_id)
                    .ok_or_else(|| BookingError::not_found("booking", booking_id))?;
                self.state_machine.transition(booking, &event, Utc::now())?;
                Ok(booking.clone())
            })
            .await?;

        log_booking_operation(
            "cancel",
            Some(booking.id),
            Some(booking.room_id),
            "cancelled",
            booking.cancellation_reason.as_deref(),
        );
        self.dispatch(events::BOOKING_CANCELLED, &booking).await;
        Ok(booking)
    }

    /// Apply a settled-payment webhook exactly once. The ledger entry and the
    /// confirmation are written together. An unknown booking records nothing
    /// so a redelivery can retry; a booking no longer awaiting payment only
    /// gets the ledger entry.
    pub async fn apply_payment_event(&self, event: PaymentEvent) -> Result<PaymentEventOutcome> {
        ledger::validate_event_id(&event.event_id)?;

        let mut tx = self.store.transaction().await;
        let mut document = tx.read().await?;

        if document.has_processed_event(&event.event_id) {
            drop(tx);
            log_ledger_operation(
                "apply_payment_event",
                &event.event_id,
                &event.event_type,
                ledger::disposition_label(EventDisposition::Duplicate),
            );
            return Ok(PaymentEventOutcome::Duplicate);
        }

        let now = Utc::now();
        let booking = document
            .booking(&event.booking_id)
            .cloned()
            .ok_or_else(|| BookingError::not_found("booking", event.booking_id))?;
        if let Some(amount) = event.amount_cents {
            if amount != booking.total_amount_cents {
                warn!(
                    booking_id = %booking.id,
                    expected = booking.total_amount_cents,
                    received = amount,
                    "Payment amount differs from booking total"
                );
            }
        }

        if !booking.status.is_awaiting_payment() {
            ledger::record_event(&mut document, &event.event_id, &event.event_type, now);
            tx.write(&document).await?;
            drop(tx);

            if booking.status == BookingState::Cancelled {
                warn!(
                    booking_id = %booking.id,
                    event_id = %event.event_id,
                    "Payment settled for a cancelled booking, refund required"
                );
            }
            log_ledger_operation(
                "apply_payment_event",
                &event.event_id,
                &event.event_type,
                ledger::disposition_label(EventDisposition::New),
            );
            return Ok(PaymentEventOutcome::AlreadyResolved(booking));
        }

        let outcome = self.confirm_in(
            &mut document,
            &event.booking_id,
            Some(event.event_id.as_str()),
            now,
        )?;
        ledger::record_event(&mut document, &event.event_id, &event.event_type, now);
        tx.write(&document).await?;
        drop(tx);

        log_ledger_operation(
            "apply_payment_event",
            &event.event_id,
            &event.event_type,
            ledger::disposition_label(EventDisposition::New),
        );
        self.after_confirmation(&outcome).await;
        Ok(PaymentEventOutcome::Applied(outcome))
    }

    /// Confirm `booking_id` inside an open critical section
    fn confirm_in(
        &self,
        document: &mut Document,
        booking_id: &Uuid,
        payment_reference: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ConfirmOutcome> {
        let booking = document
            .booking(booking_id)
            .ok_or_else(|| BookingError::not_found("booking", booking_id))?;
        self.state_machine
            .determine_target_state(booking.status, &BookingEvent::Confirm)?;

        let range = booking.range();
        let room_id = booking.room_id;
        let winner = document
            .bookings
            .iter()
            .filter(|other| other.id != *booking_id && other.room_id == room_id)
            .filter(|other| other.status == BookingState::Confirmed)
            .filter(|other| other.range().overlaps(&range))
            .min_by_key(|other| other.confirmed_at)
            .map(|other| other.id);

        let booking = document
            .booking_mut(booking_id)
            .ok_or_else(|| BookingError::not_found("booking", booking_id))?;

        match winner {
            Some(conflicting_booking_id) => {
                self.state_machine.transition(
                    booking,
                    &BookingEvent::Supersede(conflicting_booking_id),
                    now,
                )?;
                Ok(ConfirmOutcome::Superseded {
                    booking: booking.clone(),
                    conflicting_booking_id,
                })
            }
            None => {
                self.state_machine
                    .transition(booking, &BookingEvent::Confirm, now)?;
                if let Some(reference) = payment_reference {
                    booking.payment_reference = Some(reference.to_string());
                }
                Ok(ConfirmOutcome::Confirmed(booking.clone()))
            }
        }
    }

    async fn after_confirmation(&self, outcome: &ConfirmOutcome) {
        match outcome {
            ConfirmOutcome::Confirmed(booking) => {
                log_booking_operation(
                    "confirm",
                    Some(booking.id),
                    Some(booking.room_id),
                    "confirmed",
                    None,
                );
                self.dispatch(events::BOOKING_CONFIRMED, booking).await;
            }
            ConfirmOutcome::Superseded {
                booking,
                conflicting_booking_id,
            } => {
                let details = format!("lost to booking {conflicting_booking_id}");
                log_booking_operation(
                    "confirm",
                    Some(booking.id),
                    Some(booking.room_id),
                    "superseded",
                    Some(details.as_str()),
                );
                self.dispatch(events::BOOKING_SUPERSEDED, booking).await;
            }
        }
    }

    /// Delete a booking record. Settled bookings are part of the audit trail
    /// and cannot be deleted.
    pub async fn delete_booking(&self, booking_id: Uuid) -> Result<Booking> {
        let removed = self
            .store
            .with_lock(|document| {
                let index = document
                    .bookings
                    .iter()
                    .position(|booking| booking.id == booking_id)
                    .ok_or_else(|| BookingError::not_found("booking", booking_id))?;
                if document.bookings[index].is_confirmed_and_paid() {
                    return Err(BookingError::deletion_forbidden(
                        "booking",
                        "confirmed and paid bookings are kept for the audit trail",
                    ));
                }
                Ok(document.bookings.remove(index))
            })
            .await?;

        log_booking_operation("delete", Some(removed.id), Some(removed.room_id), "deleted", None);
        Ok(removed)
    }

    pub async fn mark_contract_sent(&self, booking_id: Uuid) -> Result<Booking> {
        self.mark_delivery(booking_id, Delivery::Contract).await
    }

    /// Only a paid booking can have a receipt
    pub async fn mark_receipt_sent(&self, booking_id: Uuid) -> Result<Booking> {
        self.mark_delivery(booking_id, Delivery::Receipt).await
    }

    async fn mark_delivery(&self, booking_id: Uuid, delivery: Delivery) -> Result<Booking> {
        let booking = self
            .store
            .with_lock(|document| {
                let booking = document
                    .booking_mut(&booking_id)
                    .ok_or_else(|| BookingError::not_found("booking", booking_id))?;
                if booking.status == BookingState::Cancelled {
                    return Err(BookingError::validation(
                        delivery.field(),
                        "booking is cancelled",
                    ));
                }

                let now = Utc::now();
                match delivery {
                    Delivery::Contract => {
                        booking.contract_sent = true;
                        booking.contract_sent_at = Some(now);
                    }
                    Delivery::Receipt => {
                        if !booking.is_confirmed_and_paid() {
                            return Err(BookingError::validation(
                                delivery.field(),
                                "booking has not been paid",
                            ));
                        }
                        booking.receipt_sent = true;
                        booking.receipt_sent_at = Some(now);
                    }
                }
                booking.updated_at = now;
                Ok(booking.clone())
            })
            .await?;

        log_booking_operation(
            delivery.field(),
            Some(booking.id),
            Some(booking.room_id),
            "recorded",
            None,
        );
        Ok(booking)
    }

    /// `pending_payment` holds past their deadline, for the external reaper
    pub async fn expired_holds(&self, now: DateTime<Utc>) -> Result<Vec<Booking>> {
        Ok(self
            .store
            .read()
            .await?
            .bookings
            .iter()
            .filter(|booking| booking.is_expired_hold(now))
            .cloned()
            .collect())
    }

    pub async fn get_booking(&self, booking_id: Uuid) -> Result<Booking> {
        self.store
            .read()
            .await?
            .booking(&booking_id)
            .cloned()
            .ok_or_else(|| BookingError::not_found("booking", booking_id))
    }

    pub async fn bookings_for_room(&self, room_id: Uuid) -> Result<Arc<Vec<Booking>>> {
        self.store.bookings_for_room(&room_id).await
    }

    // ----------------------------------------------------------------------
    // Availability (advisory, lock-free)
    // ----------------------------------------------------------------------

    pub async fn is_range_available(
        &self,
        room_id: Uuid,
        range: DateRange,
    ) -> Result<AvailabilityCheck> {
        // Deserialized ranges bypass `DateRange::new`
        if range.end < range.start {
            return Err(BookingError::validation(
                "end_date",
                format!("must not be before start date {}", range.start),
            ));
        }
        let ranges = self.room_calendar(room_id).await?;
        Ok(check_range(&range, &ranges))
    }

    pub async fn recommend_duration(
        &self,
        room_id: Uuid,
        start: NaiveDate,
        requested_days: i64,
    ) -> Result<DurationRecommendation> {
        if requested_days <= 0 {
            return Err(BookingError::validation(
                "requested_days",
                "must be at least one day",
            ));
        }
        let ranges = self.room_calendar(room_id).await?;
        Ok(recommend_duration(
            start,
            requested_days,
            &ranges,
            &self.policy.availability_policy(),
        ))
    }

    /// Occupied dates in `[from, to)` for calendar display
    pub async fn blocked_dates(
        &self,
        room_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        let ranges = self.room_calendar(room_id).await?;
        Ok(blocked_dates(from, to, &ranges))
    }

    async fn room_calendar(&self, room_id: Uuid) -> Result<Arc<Vec<OccupiedRange>>> {
        if self.store.room(&room_id).await?.is_none() {
            return Err(BookingError::not_found("room", room_id));
        }
        self.store.occupied_ranges(&room_id).await
    }

    // ----------------------------------------------------------------------
    // Availability blocks
    // ----------------------------------------------------------------------

    /// Take dates off a room's calendar. Blocks may not overlap live
    /// bookings or other blocks.
    pub async fn add_availability_block(
        &self,
        new_block: NewAvailabilityBlock,
    ) -> Result<AvailabilityBlock> {
        let range = new_block.range()?;

        let block = self
            .store
            .with_lock(|document| {
                if document.room(&new_block.room_id).is_none() {
                    return Err(BookingError::not_found("room", new_block.room_id));
                }
                let ranges = document.occupied_ranges(&new_block.room_id);
                ensure_fits(&range, &ranges)?;

                let block = AvailabilityBlock::from_new(new_block.clone(), Utc::now());
                document.availability_blocks.push(block.clone());
                Ok(block)
            })
            .await?;

        tracing::info!(
            block_id = %block.id,
            room_id = %block.room_id,
            start = %block.start_date,
            end = %block.end_date,
            "Availability block added"
        );
        Ok(block)
    }

    pub async fn remove_availability_block(&self, block_id: Uuid) -> Result<AvailabilityBlock> {
        let block = self
            .store
            .with_lock(|document| {
                let index = document
                    .availability_blocks
                    .iter()
                    .position(|block| block.id == block_id)
                    .ok_or_else(|| BookingError::not_found("availability_block", block_id))?;
                Ok(document.availability_blocks.remove(index))
            })
            .await?;

        tracing::info!(
            block_id = %block.id,
            room_id = %block.room_id,
            "Availability block removed"
        );
        Ok(block)
    }

    // ----------------------------------------------------------------------
    // Rooms and guests
    // ----------------------------------------------------------------------

    pub async fn create_room(&self, new_room: NewRoom) -> Result<Room> {
        new_room.validate()?;
        let room = self
            .store
            .with_lock(|document| {
                let room = Room::provision(new_room, Utc::now());
                document.rooms.push(room.clone());
                Ok(room)
            })
            .await?;

        tracing::info!(room_id = %room.id, name = %room.name.en, "Room provisioned");
        Ok(room)
    }

    pub async fn update_room(&self, room_id: Uuid, update: RoomUpdate) -> Result<Room> {
        update.validate()?;
        self.store
            .with_lock(|document| {
                let room = document
                    .room_mut(&room_id)
                    .ok_or_else(|| BookingError::not_found("room", room_id))?;
                room.apply(update, Utc::now());
                Ok(room.clone())
            })
            .await
    }

    /// Rooms are never deleted
    pub async fn delete_room(&self, room_id: Uuid) -> Result<()> {
        if self.store.room(&room_id).await?.is_none() {
            return Err(BookingError::not_found("room", room_id));
        }
        Err(BookingError::deletion_forbidden(
            "room",
            "rooms are retired by editing, never deleted",
        ))
    }

    pub async fn rooms(&self) -> Result<Arc<Vec<Room>>> {
        self.store.rooms().await
    }

    /// Remove a guest who owns no bookings, in any status
    pub async fn delete_guest(&self, guest_id: Uuid) -> Result<Guest> {
        let guest = self
            .store
            .with_lock(|document| {
                let index = document
                    .guests
                    .iter()
                    .position(|guest| guest.id == guest_id)
                    .ok_or_else(|| BookingError::not_found("guest", guest_id))?;
                let owned = document.bookings_for_guest(&guest_id).count();
                if owned > 0 {
                    return Err(BookingError::deletion_forbidden(
                        "guest",
                        format!("guest owns {owned} booking(s)"),
                    ));
                }
                Ok(document.guests.remove(index))
            })
            .await?;

        tracing::info!(guest_id = %guest.id, "Guest deleted");
        Ok(guest)
    }

    /// Post-commit notifications; failures are logged and dropped
    async fn dispatch(&self, event: &'static str, booking: &Booking) {
        let kinds = kinds_for(event, booking);
        if kinds.is_empty() {
            return;
        }

        let settings = match self.store.settings().await {
            Ok(settings) => settings,
            Err(err) => {
                warn!(
                    event = event,
                    error = %err,
                    "Could not read settings, skipping notifications"
                );
                return;
            }
        };

        for kind in kinds.iter().copied().filter(|kind| settings.allows(*kind)) {
            let notification = BookingNotification {
                kind,
                event: event.to_string(),
                booking: booking.clone(),
                emitted_at: Utc::now(),
            };
            if let Err(err) = self.notifier.notify(&notification).await {
                warn!(
                    booking_id = %booking.id,
                    kind = ?kind,
                    error = %err,
                    "Booking notification failed"
                );
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Delivery {
    Contract,
    Receipt,
}

impl Delivery {
    fn field(self) -> &'static str {
        match self {
            Self::Contract => "contract_sent",
            Self::Receipt => "receipt_sent",
        }
    }
}

/// Overlap with a booking or block, reported with its identity
fn ensure_fits(range: &DateRange, ranges: &[OccupiedRange]) -> Result<()> {
    let check = check_range(range, ranges);
    if check.available {
        return Ok(());
    }
    Err(BookingError::Conflict {
        message: format!(
            "{range} overlaps an existing commitment starting {}",
            check
                .conflict_date
                .map(|date| date.to_string())
                .unwrap_or_default()
        ),
        conflict_date: check.conflict_date,
        conflicting_id: check.conflicting.map(|source| source.id()),
    })
}

/// The stay is clear but leaves less than the cleaning buffer before the
/// next commitment
fn buffer_conflict(range: &DateRange, ranges: &[OccupiedRange]) -> BookingError {
    let next = ranges
        .iter()
        .filter(|occupied| occupied.range.start > range.start)
        .min_by_key(|occupied| occupied.range.start);

    BookingError::Conflict {
        message: format!("{range} leaves no cleaning buffer before the next commitment"),
        conflict_date: next.map(|occupied| occupied.range.start),
        conflicting_id: next.map(|occupied| occupied.source.id()),
    }
}

/// Update the guest with this email or create one; returns the guest id
fn upsert_guest(document: &mut Document, fields: GuestFields, now: DateTime<Utc>) -> Uuid {
    let email = fields.normalized_email();
    if let Some(guest) = document.guest_by_email_mut(&email) {
        guest.merge(fields, now);
        return guest.id;
    }

    let guest = Guest::from_fields(fields, now);
    let id = guest.id;
    document.guests.push(guest);
    id
}
