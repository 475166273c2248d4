//! Idempotency of the external-event ledger under concurrent delivery

mod common;

use chrono::{Duration, Utc};

use common::{test_core, test_store};
use studio_booking::{EventDisposition, ExternalEventLedger};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_deliveries_mark_once() {
    let dir = tempfile::tempdir().unwrap();
    let core = test_core(&dir);

    let deliveries: Vec<_> = (0..16)
        .map(|_| {
            let ledger = core.ledger().clone();
            tokio::spawn(async move {
                ledger
                    .check_and_mark("evt_concurrent", "payment_intent.succeeded")
                    .await
            })
        })
        .collect();

    let dispositions: Vec<_> = futures::future::join_all(deliveries)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    let new = dispositions
        .iter()
        .filter(|disposition| **disposition == EventDisposition::New)
        .count();
    assert_eq!(new, 1);
    assert_eq!(dispositions.len() - new, 15);

    let document = core.store().read().await.unwrap();
    assert_eq!(document.processed_events.len(), 1);
}

#[tokio::test]
async fn test_distinct_events_all_new() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = ExternalEventLedger::new(test_store(&dir), Duration::days(30));

    for i in 0..5 {
        let disposition = ledger
            .check_and_mark(&format!("evt_{i}"), "charge.succeeded")
            .await
            .unwrap();
        assert_eq!(disposition, EventDisposition::New);
    }
}

#[tokio::test]
async fn test_ledger_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    ExternalEventLedger::new(test_store(&dir), Duration::days(30))
        .check_and_mark("evt_durable", "charge.succeeded")
        .await
        .unwrap();

    let reopened = ExternalEventLedger::new(test_store(&dir), Duration::days(30));
    assert!(reopened
        .check_and_mark("evt_durable", "charge.succeeded")
        .await
        .unwrap()
        .is_duplicate());
}

#[tokio::test]
async fn test_pruned_event_is_new_again() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = ExternalEventLedger::new(test_store(&dir), Duration::days(30));
    ledger
        .check_and_mark("evt_expired", "charge.succeeded")
        .await
        .unwrap();

    assert_eq!(ledger.prune(Utc::now() + Duration::days(45)).await.unwrap(), 1);
    assert_eq!(
        ledger
            .check_and_mark("evt_expired", "charge.succeeded")
            .await
            .unwrap(),
        EventDisposition::New
    );
}
