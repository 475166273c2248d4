use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Automated notifications a collaborator may send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    BookingConfirmationEmail,
    BookingConfirmationWhatsapp,
    ContractDelivery,
    ReceiptDelivery,
    PaymentReminder,
    AdminBookingAlert,
}

/// Singleton feature toggles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub booking_confirmation_email: bool,
    pub booking_confirmation_whatsapp: bool,
    pub contract_delivery: bool,
    pub receipt_delivery: bool,
    pub payment_reminders: bool,
    pub admin_booking_alerts: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            booking_confirmation_email: true,
            booking_confirmation_whatsapp: false,
            contract_delivery: true,
            receipt_delivery: true,
            payment_reminders: true,
            admin_booking_alerts: true,
            updated_at: None,
        }
    }
}

/// Partial update; only the listed toggles can change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsPatch {
    pub booking_confirmation_email: Option<bool>,
    pub booking_confirmation_whatsapp: Option<bool>,
    pub contract_delivery: Option<bool>,
    pub receipt_delivery: Option<bool>,
    pub payment_reminders: Option<bool>,
    pub admin_booking_alerts: Option<bool>,
}

impl Settings {
    pub fn allows(&self, kind: NotificationKind) -> bool {
        match kind {
            NotificationKind::BookingConfirmationEmail => self.booking_confirmation_email,
            NotificationKind::BookingConfirmationWhatsapp => self.booking_confirmation_whatsapp,
            NotificationKind::ContractDelivery => self.contract_delivery,
            NotificationKind::ReceiptDelivery => self.receipt_delivery,
            NotificationKind::PaymentReminder => self.payment_reminders,
            NotificationKind::AdminBookingAlert => self.admin_booking_alerts,
        }
    }

    pub fn merge(&mut self, patch: SettingsPatch, now: DateTime<Utc>) {
        let SettingsPatch {
            booking_confirmation_email,
            booking_confirmation_whatsapp,
            contract_delivery,
            receipt_delivery,
            payment_reminders,
            admin_booking_alerts,
        } = patch;

        if let Some(value) = booking_confirmation_email {
            self.booking_confirmation_email = value;
        }
        if let Some(value) = booking_confirmation_whatsapp {
            self.booking_confirmation_whatsapp = value;
        }
        if let Some(value) = contract_delivery {
            self.contract_delivery = value;
        }
        if let Some(value) = receipt_delivery {
            self.receipt_delivery = value;
        }
        if let Some(value) = payment_reminders {
            self.payment_reminders = value;
        }
        if let Some(value) = admin_booking_alerts {
            self.admin_booking_alerts = value;
        }
        self.updated_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_applies_only_present_toggles() {
        let mut settings = Settings::default();
        settings.merge(
            SettingsPatch {
                booking_confirmation_whatsapp: Some(true),
                receipt_delivery: Some(false),
                ..Default::default()
            },
            Utc::now(),
        );

        assert!(settings.allows(NotificationKind::BookingConfirmationWhatsapp));
        assert!(!settings.allows(NotificationKind::ReceiptDelivery));
        assert!(settings.allows(NotificationKind::BookingConfirmationEmail));
        assert!(settings.updated_at.is_some());
    }
}
