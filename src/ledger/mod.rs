//! # External-Event Ledger
//!
//! Idempotency record for at-least-once payment webhooks. The check and the
//! append happen in one critical section, so two concurrent deliveries of
//! the same event cannot both be treated as new.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{BookingError, Result};
use crate::logging::log_ledger_operation;
use crate::models::{Document, ProcessedExternalEvent};
use crate::store::DocumentStore;

/// Whether an external event has been seen before
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventDisposition {
    New,
    Duplicate,
}

impl EventDisposition {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate)
    }
}

#[derive(Debug, Clone)]
pub struct ExternalEventLedger {
    store: Arc<DocumentStore>,
    retention: Duration,
}

impl ExternalEventLedger {
    pub fn new(store: Arc<DocumentStore>, retention: Duration) -> Self {
        Self { store, retention }
    }

    /// Record `event_id` unless it is already in the ledger
    pub async fn check_and_mark(
        &self,
        event_id: &str,
        event_type: &str,
    ) -> Result<EventDisposition> {
        validate_event_id(event_id)?;

        let mut tx = self.store.transaction().await;
        let mut document = tx.read().await?;
        let disposition = record_event(&mut document, event_id, event_type, Utc::now());
        if disposition == EventDisposition::New {
            tx.write(&document).await?;
        }
        drop(tx);

        log_ledger_operation(
            "check_and_mark",
            event_id,
            event_type,
            disposition_label(disposition),
        );
        Ok(disposition)
    }

    /// Advisory lookup outside the lock
    pub async fn is_processed(&self, event_id: &str) -> Result<bool> {
        Ok(self.store.read().await?.has_processed_event(event_id))
    }

    /// Drop entries processed before `now - retention`. Returns how many
    /// were removed; nothing is written when none qualify.
    pub async fn prune(&self, now: DateTime<Utc>) -> Result<usize> {
        let cutoff = now - self.retention;

        let mut tx = self.store.transaction().await;
        let mut document = tx.read().await?;
        let before = document.processed_events.len();
        document
            .processed_events
            .retain(|event| event.processed_at >= cutoff);
        let removed = before - document.processed_events.len();

        if removed > 0 {
            tx.write(&document).await?;
            tracing::info!(removed = removed, cutoff = %cutoff, "Pruned processed external events");
        }
        Ok(removed)
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }
}

pub(crate) fn validate_event_id(event_id: &str) -> Result<()> {
    if event_id.trim().is_empty() {
        return Err(BookingError::validation("event_id", "event id is required"));
    }
    Ok(())
}

/// Append `event_id` to the document's ledger if absent. Callers must hold
/// the store lock and persist the document when this returns `New`.
pub(crate) fn record_event(
    document: &mut Document,
    event_id: &str,
    event_type: &str,
    now: DateTime<Utc>,
) -> EventDisposition {
    if document.has_processed_event(event_id) {
        return EventDisposition::Duplicate;
    }

    document.processed_events.push(ProcessedExternalEvent {
        event_id: event_id.to_string(),
        event_type: event_type.to_string(),
        processed_at: now,
    });
    EventDisposition::New
}

pub(crate) fn disposition_label(disposition: EventDisposition) -> &'static str {
    match disposition {
        EventDisposition::New => "new",
        EventDisposition::Duplicate => "duplicate",
    }
}
