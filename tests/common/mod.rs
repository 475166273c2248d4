//! Shared fixtures for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

use studio_booking::booking::{BookingNotification, NotificationError};
use studio_booking::models::LocalizedText;
use studio_booking::{
    BookingManager, BookingNotifier, BookingRequest, DocumentStore, GuestFields, NewRoom,
    PaymentMethod, PricingInputs, Room, StudioConfig, StudioCore,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

pub fn test_config(dir: &TempDir) -> StudioConfig {
    let mut config = StudioConfig::for_environment("test");
    config.store.path = dir.path().join("studio.json");
    config
}

pub fn test_store(dir: &TempDir) -> Arc<DocumentStore> {
    let config = test_config(dir);
    Arc::new(DocumentStore::open(&config.store.path, &config.cache))
}

pub fn test_core(dir: &TempDir) -> StudioCore {
    StudioCore::bootstrap(test_config(dir)).expect("test core bootstraps")
}

pub async fn provision_room(manager: &BookingManager, name: &str) -> Room {
    manager
        .create_room(NewRoom {
            name: LocalizedText {
                en: name.to_string(),
                es: name.to_string(),
            },
            monthly_rate_cents: 90_000,
            yearly_rate_cents: Some(950_000),
            capacity: 2,
            ..Default::default()
        })
        .await
        .expect("room provisioned")
}

pub fn booking_request(
    room_id: Uuid,
    email: &str,
    start: NaiveDate,
    end: NaiveDate,
    payment_method: PaymentMethod,
) -> BookingRequest {
    BookingRequest {
        room_id,
        guest: GuestFields {
            name: "Test Guest".to_string(),
            email: email.to_string(),
            phone: Some("+34 600 111 222".to_string()),
            ..Default::default()
        },
        start_date: start,
        end_date: end,
        payment_method,
        pricing: PricingInputs {
            cleaning_service: false,
            terms_accepted: true,
            signature: None,
        },
    }
}

/// Captures notifications; optionally reports every delivery as failed
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<BookingNotification>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<BookingNotification> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl BookingNotifier for RecordingNotifier {
    async fn notify(&self, notification: &BookingNotification) -> Result<(), NotificationError> {
        self.sent.lock().push(notification.clone());
        if self.fail {
            return Err(NotificationError::Delivery {
                channel: "test".to_string(),
                message: "smtp unreachable".to_string(),
            });
        }
        Ok(())
    }
}
