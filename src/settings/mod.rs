//! # Settings Registry
//!
//! The notification toggles singleton. Reads fall back to defaults until the
//! first update persists a record.

use chrono::Utc;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{NotificationKind, Settings, SettingsPatch};
use crate::store::DocumentStore;

#[derive(Debug, Clone)]
pub struct SettingsRegistry {
    store: Arc<DocumentStore>,
}

impl SettingsRegistry {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self) -> Result<Settings> {
        self.store.settings().await
    }

    /// Locked merge-and-rewrite of the listed toggles
    pub async fn update(&self, patch: SettingsPatch) -> Result<Settings> {
        let settings = self
            .store
            .with_lock(|document| {
                let mut settings = document.settings_or_default();
                settings.merge(patch, Utc::now());
                document.settings = Some(settings.clone());
                Ok(settings)
            })
            .await?;

        tracing::info!(
            confirmation_email = settings.booking_confirmation_email,
            confirmation_whatsapp = settings.booking_confirmation_whatsapp,
            contract_delivery = settings.contract_delivery,
            receipt_delivery = settings.receipt_delivery,
            payment_reminders = settings.payment_reminders,
            admin_alerts = settings.admin_booking_alerts,
            "Settings updated"
        );
        Ok(settings)
    }

    pub async fn allows(&self, kind: NotificationKind) -> Result<bool> {
        Ok(self.get().await?.allows(kind))
    }
}
