use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BookingError, Result};

/// Text kept in both site languages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub en: String,
    pub es: String,
}

/// Rentable studio. Rooms are provisioned and updated, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub name: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    pub monthly_rate_cents: i64,
    pub yearly_rate_cents: Option<i64>,
    pub capacity: u32,
    pub size_sqm: Option<f32>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub door_code: Option<String>,
    pub wifi_ssid: Option<String>,
    pub wifi_password: Option<String>,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New Room for provisioning (without generated fields)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewRoom {
    pub name: LocalizedText,
    pub description: LocalizedText,
    pub monthly_rate_cents: i64,
    pub yearly_rate_cents: Option<i64>,
    pub capacity: u32,
    pub size_sqm: Option<f32>,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
}

/// Fields an admin may change on an existing room. Anything not listed here
/// (identity, timestamps) is immutable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomUpdate {
    pub name: Option<LocalizedText>,
    pub description: Option<LocalizedText>,
    pub monthly_rate_cents: Option<i64>,
    pub yearly_rate_cents: Option<i64>,
    pub capacity: Option<u32>,
    pub size_sqm: Option<f32>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub door_code: Option<String>,
    pub wifi_ssid: Option<String>,
    pub wifi_password: Option<String>,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
}

impl NewRoom {
    pub fn validate(&self) -> Result<()> {
        if self.name.en.trim().is_empty() {
            return Err(BookingError::validation("name.en", "room name is required"));
        }
        validate_rates(Some(self.monthly_rate_cents), self.yearly_rate_cents)?;
        if self.capacity == 0 {
            return Err(BookingError::validation("capacity", "must be at least 1"));
        }
        Ok(())
    }
}

impl RoomUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            if name.en.trim().is_empty() {
                return Err(BookingError::validation("name.en", "room name is required"));
            }
        }
        validate_rates(self.monthly_rate_cents, self.yearly_rate_cents)?;
        if self.capacity == Some(0) {
            return Err(BookingError::validation("capacity", "must be at least 1"));
        }
        Ok(())
    }
}

fn validate_rates(monthly: Option<i64>, yearly: Option<i64>) -> Result<()> {
    if monthly.is_some_and(|rate| rate <= 0) {
        return Err(BookingError::validation(
            "monthly_rate_cents",
            "must be positive",
        ));
    }
    if yearly.is_some_and(|rate| rate <= 0) {
        return Err(BookingError::validation(
            "yearly_rate_cents",
            "must be positive",
        ));
    }
    Ok(())
}

impl Room {
    pub fn provision(new_room: NewRoom, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: new_room.name,
            description: new_room.description,
            monthly_rate_cents: new_room.monthly_rate_cents,
            yearly_rate_cents: new_room.yearly_rate_cents,
            capacity: new_room.capacity,
            size_sqm: new_room.size_sqm,
            amenities: new_room.amenities,
            images: new_room.images,
            door_code: None,
            wifi_ssid: None,
            wifi_password: None,
            check_in_time: new_room.check_in_time,
            check_out_time: new_room.check_out_time,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge an allow-listed update
    pub fn apply(&mut self, update: RoomUpdate, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(rate) = update.monthly_rate_cents {
            self.monthly_rate_cents = rate;
        }
        if let Some(rate) = update.yearly_rate_cents {
            self.yearly_rate_cents = Some(rate);
        }
        if let Some(capacity) = update.capacity {
            self.capacity = capacity;
        }
        if let Some(size) = update.size_sqm {
            self.size_sqm = Some(size);
        }
        if let Some(amenities) = update.amenities {
            self.amenities = amenities;
        }
        if let Some(images) = update.images {
            self.images = images;
        }
        if let Some(code) = update.door_code {
            self.door_code = Some(code);
        }
        if let Some(ssid) = update.wifi_ssid {
            self.wifi_ssid = Some(ssid);
        }
        if let Some(password) = update.wifi_password {
            self.wifi_password = Some(password);
        }
        if let Some(time) = update.check_in_time {
            self.check_in_time = Some(time);
        }
        if let Some(time) = update.check_out_time {
            self.check_out_time = Some(time);
        }
        self.updated_at = now;
    }
}
