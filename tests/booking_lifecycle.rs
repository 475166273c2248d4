//! End-to-end booking lifecycle behavior under concurrency

mod common;

use chrono::Duration;
use proptest::prelude::*;
use std::sync::Arc;

use common::{booking_request, date, provision_room, test_core, RecordingNotifier};
use studio_booking::models::NotificationKind;
use studio_booking::{
    BookingError, BookingState, ConfirmOutcome, Document, PaymentEvent, PaymentEventOutcome,
    PaymentMethod, SettingsPatch,
};

/// Non-cancelled bookings and blocks on every room must be pairwise disjoint
fn assert_no_double_booking(document: &Document) {
    for room in &document.rooms {
        let ranges = document.occupied_ranges(&room.id);
        for (i, a) in ranges.iter().enumerate() {
            for b in &ranges[i + 1..] {
                assert!(
                    !a.range.overlaps(&b.range),
                    "{} overlaps {} on room {}",
                    a.range,
                    b.range,
                    room.id
                );
            }
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_for_same_dates_book_once() {
    let dir = tempfile::tempdir().unwrap();
    let core = test_core(&dir);
    let room = provision_room(core.bookings(), "Harbor").await;

    let attempts: Vec<_> = (0..12)
        .map(|i| {
            let manager = core.bookings().clone();
            let request = booking_request(
                room.id,
                &format!("guest{i}@example.com"),
                date(2025, 1, 1),
                date(2025, 1, 31),
                PaymentMethod::BankTransfer,
            );
            tokio::spawn(async move { manager.create_booking(request).await })
        })
        .collect();

    let results: Vec<_> = futures::future::join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let booked = results.iter().filter(|result| result.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|result| matches!(result, Err(err) if err.is_conflict()))
        .count();
    assert_eq!(booked, 1);
    assert_eq!(conflicts, 11);

    assert_no_double_booking(&core.store().read().await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_staggered_requests_never_overlap() {
    let dir = tempfile::tempdir().unwrap();
    let core = test_core(&dir);
    let room = provision_room(core.bookings(), "Terrace").await;

    // Thirty-day stays starting every ten days: many pairs collide
    let attempts: Vec<_> = (0..15)
        .map(|i| {
            let manager = core.bookings().clone();
            let start = date(2025, 1, 1) + Duration::days(i * 10);
            let request = booking_request(
                room.id,
                "same.guest@example.com",
                start,
                start + Duration::days(30),
                PaymentMethod::Manual,
            );
            tokio::spawn(async move { manager.create_booking(request).await })
        })
        .collect();

    let outcomes = futures::future::join_all(attempts).await;
    assert!(outcomes
        .iter()
        .any(|joined| matches!(joined, Ok(Ok(_)))));

    let document = core.store().read().await.unwrap();
    assert_no_double_booking(&document);
    assert_eq!(document.guests.len(), 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// Any sequence of create attempts leaves the calendar disjoint
    #[test]
    fn random_requests_preserve_disjointness(
        stays in prop::collection::vec((0i64..180, 1i64..60), 1..12)
    ) {
        tokio_test::block_on(async {
            let dir = tempfile::tempdir().unwrap();
            let core = test_core(&dir);
            let room = provision_room(core.bookings(), "Prop").await;

            for (i, (offset, days)) in stays.iter().enumerate() {
                let start = date(2025, 1, 1) + Duration::days(*offset);
                let request = booking_request(
                    room.id,
                    &format!("prop{i}@example.com"),
                    start,
                    start + Duration::days(*days),
                    PaymentMethod::Manual,
                );
                match core.bookings().create_booking(request).await {
                    Ok(_) => {}
                    Err(BookingError::Conflict { .. }) | Err(BookingError::Validation { .. }) => {}
                    Err(other) => panic!("unexpected error: {other}"),
                }
            }

            assert_no_double_booking(&core.store().read().await.unwrap());
        });
    }
}

#[tokio::test]
async fn test_confirmation_race_cancels_the_loser() {
    let dir = tempfile::tempdir().unwrap();
    let core = test_core(&dir);
    let room = provision_room(core.bookings(), "Race").await;

    let a = core
        .bookings()
        .create_booking(booking_request(
            room.id,
            "a@example.com",
            date(2025, 3, 1),
            date(2025, 3, 31),
            PaymentMethod::BankTransfer,
        ))
        .await
        .unwrap();

    // A second hold over the same window, as left behind by an expired-hold
    // reaper that has not run yet
    let b_id = core
        .store()
        .with_lock(|doc| {
            let mut b = doc.booking(&a.id).cloned().expect("hold a exists");
            b.id = uuid::Uuid::new_v4();
            b.start_date = date(2025, 3, 10);
            b.end_date = date(2025, 4, 9);
            let id = b.id;
            doc.bookings.push(b);
            Ok(id)
        })
        .await
        .unwrap();

    let b_outcome = core.bookings().confirm_booking(b_id).await.unwrap();
    assert!(b_outcome.is_confirmed());

    match core.bookings().confirm_booking(a.id).await.unwrap() {
        ConfirmOutcome::Superseded {
            booking,
            conflicting_booking_id,
        } => {
            assert_eq!(conflicting_booking_id, b_id);
            assert_eq!(booking.status, BookingState::Cancelled);
            assert!(booking
                .cancellation_reason
                .as_deref()
                .is_some_and(|reason| reason.starts_with("system:")));
            assert!(booking.confirmed_at.is_none());
        }
        other => panic!("expected superseded, got {other:?}"),
    }

    let stored = core.bookings().get_booking(a.id).await.unwrap();
    assert_eq!(stored.status, BookingState::Cancelled);
}

#[tokio::test]
async fn test_guest_with_cancelled_booking_cannot_be_deleted() {
    let dir = tempfile::tempdir().unwrap();
    let core = test_core(&dir);
    let room = provision_room(core.bookings(), "Guarded").await;

    let booking = core
        .bookings()
        .create_booking(booking_request(
            room.id,
            "owner@example.com",
            date(2025, 5, 1),
            date(2025, 5, 31),
            PaymentMethod::OnlineGateway,
        ))
        .await
        .unwrap();
    core.bookings()
        .cancel_booking(booking.id, "changed plans")
        .await
        .unwrap();

    let err = core
        .bookings()
        .delete_guest(booking.guest_id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BookingError::DeletionForbidden { entity: "guest", .. }
    ));
}

#[tokio::test]
async fn test_cancelled_dates_become_bookable_again() {
    let dir = tempfile::tempdir().unwrap();
    let core = test_core(&dir);
    let room = provision_room(core.bookings(), "Reuse").await;

    let first = core
        .bookings()
        .create_booking(booking_request(
            room.id,
            "first@example.com",
            date(2025, 7, 1),
            date(2025, 7, 31),
            PaymentMethod::BankTransfer,
        ))
        .await
        .unwrap();
    core.bookings()
        .cancel_booking(first.id, "hold expired")
        .await
        .unwrap();

    core.bookings()
        .create_booking(booking_request(
            room.id,
            "second@example.com",
            date(2025, 7, 1),
            date(2025, 7, 31),
            PaymentMethod::BankTransfer,
        ))
        .await
        .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_payment_event_applied_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let core = test_core(&dir);
    let room = provision_room(core.bookings(), "Webhook").await;
    let hold = core
        .bookings()
        .create_booking(booking_request(
            room.id,
            "payer@example.com",
            date(2025, 9, 1),
            date(2025, 10, 1),
            PaymentMethod::OnlineGateway,
        ))
        .await
        .unwrap();

    let deliveries: Vec<_> = (0..8)
        .map(|_| {
            let manager = core.bookings().clone();
            let event = PaymentEvent {
                event_id: "evt_settled_1".to_string(),
                event_type: "checkout.session.completed".to_string(),
                booking_id: hold.id,
                amount_cents: Some(hold.total_amount_cents),
            };
            tokio::spawn(async move { manager.apply_payment_event(event).await })
        })
        .collect();

    let outcomes: Vec<_> = futures::future::join_all(deliveries)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    let applied = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, PaymentEventOutcome::Applied(_)))
        .count();
    assert_eq!(applied, 1);

    let booking = core.bookings().get_booking(hold.id).await.unwrap();
    assert_eq!(booking.status, BookingState::Confirmed);
    assert_eq!(booking.payment_reference.as_deref(), Some("evt_settled_1"));
    assert!(core.ledger().is_processed("evt_settled_1").await.unwrap());
}

#[tokio::test]
async fn test_failed_payment_application_can_be_redelivered() {
    let dir = tempfile::tempdir().unwrap();
    let core = test_core(&dir);

    let err = core
        .bookings()
        .apply_payment_event(PaymentEvent {
            event_id: "evt_unknown".to_string(),
            event_type: "checkout.session.completed".to_string(),
            booking_id: uuid::Uuid::new_v4(),
            amount_cents: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::NotFound { entity: "booking", .. }));
    assert!(!core.ledger().is_processed("evt_unknown").await.unwrap());
}

fn settled_event(event_id: &str, booking_id: uuid::Uuid) -> PaymentEvent {
    PaymentEvent {
        event_id: event_id.to_string(),
        event_type: "checkout.session.completed".to_string(),
        booking_id,
        amount_cents: None,
    }
}

#[tokio::test]
async fn test_payment_for_confirmed_booking_recorded_once() {
    let dir = tempfile::tempdir().unwrap();
    let core = test_core(&dir);
    let room = provision_room(core.bookings(), "Settled").await;
    let hold = core
        .bookings()
        .create_booking(booking_request(
            room.id,
            "early@example.com",
            date(2025, 11, 1),
            date(2025, 12, 1),
            PaymentMethod::BankTransfer,
        ))
        .await
        .unwrap();
    let confirmed = core.bookings().confirm_booking(hold.id).await.unwrap();
    assert!(confirmed.is_confirmed());

    let first = core
        .bookings()
        .apply_payment_event(settled_event("evt_late", hold.id))
        .await
        .unwrap();
    match first {
        PaymentEventOutcome::AlreadyResolved(booking) => {
            assert_eq!(booking.status, BookingState::Confirmed);
            assert_eq!(booking.confirmed_at, confirmed.booking().confirmed_at);
        }
        other => panic!("expected already resolved, got {other:?}"),
    }
    assert!(core.ledger().is_processed("evt_late").await.unwrap());

    let redelivered = core
        .bookings()
        .apply_payment_event(settled_event("evt_late", hold.id))
        .await
        .unwrap();
    assert_eq!(redelivered, PaymentEventOutcome::Duplicate);
}

#[tokio::test]
async fn test_payment_for_cancelled_booking_recorded_without_reviving() {
    let dir = tempfile::tempdir().unwrap();
    let core = test_core(&dir);
    let room = provision_room(core.bookings(), "Lapsed").await;
    let hold = core
        .bookings()
        .create_booking(booking_request(
            room.id,
            "lapsed@example.com",
            date(2025, 11, 1),
            date(2025, 12, 1),
            PaymentMethod::OnlineGateway,
        ))
        .await
        .unwrap();
    core.bookings()
        .cancel_booking(hold.id, "gateway session expired")
        .await
        .unwrap();

    let outcome = core
        .bookings()
        .apply_payment_event(settled_event("evt_after_cancel", hold.id))
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        PaymentEventOutcome::AlreadyResolved(ref booking)
            if booking.status == BookingState::Cancelled
    ));
    assert!(core.ledger().is_processed("evt_after_cancel").await.unwrap());

    let stored = core.bookings().get_booking(hold.id).await.unwrap();
    assert_eq!(stored.status, BookingState::Cancelled);
    assert!(stored.payment_reference.is_none());
}

#[tokio::test]
async fn test_notifications_follow_settings() {
    let dir = tempfile::tempdir().unwrap();
    let notifier = Arc::new(RecordingNotifier::default());
    let core = test_core(&dir).with_notifier(notifier.clone());
    let room = provision_room(core.bookings(), "Notify").await;

    core.settings()
        .update(SettingsPatch {
            admin_booking_alerts: Some(false),
            ..Default::default()
        })
        .await
        .unwrap();

    core.bookings()
        .create_booking(booking_request(
            room.id,
            "notify@example.com",
            date(2025, 2, 1),
            date(2025, 3, 3),
            PaymentMethod::Manual,
        ))
        .await
        .unwrap();

    let kinds: Vec<_> = notifier.sent().iter().map(|n| n.kind).collect();
    assert!(kinds.contains(&NotificationKind::BookingConfirmationEmail));
    assert!(!kinds.contains(&NotificationKind::AdminBookingAlert));
    // WhatsApp is off by default
    assert!(!kinds.contains(&NotificationKind::BookingConfirmationWhatsapp));
}

#[tokio::test]
async fn test_manual_booking_alerts_admin_once() {
    let dir = tempfile::tempdir().unwrap();
    let notifier = Arc::new(RecordingNotifier::default());
    let core = test_core(&dir).with_notifier(notifier.clone());
    let room = provision_room(core.bookings(), "Walk-in").await;

    core.bookings()
        .create_booking(booking_request(
            room.id,
            "walkin@example.com",
            date(2025, 6, 1),
            date(2025, 7, 1),
            PaymentMethod::Manual,
        ))
        .await
        .unwrap();

    let alerts = notifier
        .sent()
        .iter()
        .filter(|n| n.kind == NotificationKind::AdminBookingAlert)
        .count();
    assert_eq!(alerts, 1);
}

#[tokio::test]
async fn test_notification_failure_keeps_transition() {
    let dir = tempfile::tempdir().unwrap();
    let notifier = Arc::new(RecordingNotifier::failing());
    let core = test_core(&dir).with_notifier(notifier.clone());
    let room = provision_room(core.bookings(), "Flaky").await;

    let booking = core
        .bookings()
        .create_booking(booking_request(
            room.id,
            "flaky@example.com",
            date(2025, 4, 1),
            date(2025, 5, 1),
            PaymentMethod::Manual,
        ))
        .await
        .unwrap();

    assert!(!notifier.sent().is_empty());
    let stored = core.bookings().get_booking(booking.id).await.unwrap();
    assert_eq!(stored.status, BookingState::Confirmed);
}
