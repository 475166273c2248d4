use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BookingError, Result};

/// Guest identity, upserted by email on every booking request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub nationality: Option<String>,
    pub id_type: Option<String>,
    pub id_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Guest fields carried by a booking request. These are also the only
/// fields an upsert may overwrite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestFields {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub nationality: Option<String>,
    pub id_type: Option<String>,
    pub id_number: Option<String>,
}

impl GuestFields {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(BookingError::validation("name", "guest name is required"));
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(BookingError::validation("email", "email is required"));
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
            _ => return Err(BookingError::validation("email", "email is malformed")),
        }
        if self
            .phone
            .as_deref()
            .map_or(true, |phone| phone.trim().is_empty())
        {
            return Err(BookingError::validation(
                "phone",
                "a phone number is required to reach the guest",
            ));
        }
        Ok(())
    }

    /// Lookup key for the upsert
    pub fn normalized_email(&self) -> String {
        normalize_email(&self.email)
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Guest {
    pub fn from_fields(fields: GuestFields, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: fields.normalized_email(),
            name: fields.name.trim().to_string(),
            phone: fields.phone,
            nationality: fields.nationality,
            id_type: fields.id_type,
            id_number: fields.id_number,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the allow-listed fields; optional fields left empty in the
    /// request keep their stored value
    pub fn merge(&mut self, fields: GuestFields, now: DateTime<Utc>) {
        self.name = fields.name.trim().to_string();
        if fields.phone.is_some() {
            self.phone = fields.phone;
        }
        if fields.nationality.is_some() {
            self.nationality = fields.nationality;
        }
        if fields.id_type.is_some() {
            self.id_type = fields.id_type;
        }
        if fields.id_number.is_some() {
            self.id_number = fields.id_number;
        }
        self.updated_at = now;
    }
}
