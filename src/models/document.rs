use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AvailabilityBlock, Booking, Guest, ProcessedExternalEvent, Room, Settings};
use crate::availability::OccupiedRange;

/// The whole persisted state: one array per collection plus the settings
/// singleton. A collection missing from the file reads as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub rooms: Vec<Room>,
    pub guests: Vec<Guest>,
    pub bookings: Vec<Booking>,
    pub availability_blocks: Vec<AvailabilityBlock>,
    pub processed_events: Vec<ProcessedExternalEvent>,
    pub settings: Option<Settings>,
}

impl Document {
    pub fn room(&self, id: &Uuid) -> Option<&Room> {
        self.rooms.iter().find(|room| room.id == *id)
    }

    pub fn room_mut(&mut self, id: &Uuid) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|room| room.id == *id)
    }

    pub fn guest(&self, id: &Uuid) -> Option<&Guest> {
        self.guests.iter().find(|guest| guest.id == *id)
    }

    pub fn guest_by_email_mut(&mut self, normalized_email: &str) -> Option<&mut Guest> {
        self.guests
            .iter_mut()
            .find(|guest| guest.email == normalized_email)
    }

    pub fn booking(&self, id: &Uuid) -> Option<&Booking> {
        self.bookings.iter().find(|booking| booking.id == *id)
    }

    pub fn booking_mut(&mut self, id: &Uuid) -> Option<&mut Booking> {
        self.bookings.iter_mut().find(|booking| booking.id == *id)
    }

    pub fn bookings_for_room(&self, room_id: &Uuid) -> Vec<Booking> {
        self.bookings
            .iter()
            .filter(|booking| booking.room_id == *room_id)
            .cloned()
            .collect()
    }

    pub fn bookings_for_guest(&self, guest_id: &Uuid) -> impl Iterator<Item = &Booking> + '_ {
        let guest_id = *guest_id;
        self.bookings
            .iter()
            .filter(move |booking| booking.guest_id == guest_id)
    }

    /// Every range that blocks the room's calendar: non-cancelled bookings
    /// and availability blocks, ordered by start date
    pub fn occupied_ranges(&self, room_id: &Uuid) -> Vec<OccupiedRange> {
        self.occupied_ranges_excluding(room_id, None)
    }

    /// Occupied ranges ignoring one booking, for re-checking that booking
    /// against everything else
    pub fn occupied_ranges_excluding(
        &self,
        room_id: &Uuid,
        excluded: Option<&Uuid>,
    ) -> Vec<OccupiedRange> {
        let bookings = self
            .bookings
            .iter()
            .filter(|booking| booking.room_id == *room_id && booking.occupies_calendar())
            .filter(|booking| excluded != Some(&booking.id))
            .map(Booking::occupied_range);
        let blocks = self
            .availability_blocks
            .iter()
            .filter(|block| block.room_id == *room_id)
            .map(AvailabilityBlock::occupied_range);

        let mut ranges: Vec<OccupiedRange> = bookings.chain(blocks).collect();
        ranges.sort_by_key(|occupied| occupied.range.start);
        ranges
    }

    pub fn has_processed_event(&self, event_id: &str) -> bool {
        self.processed_events
            .iter()
            .any(|event| event.event_id == event_id)
    }

    /// Settings, materialized with defaults when never written
    pub fn settings_or_default(&self) -> Settings {
        self.settings.clone().unwrap_or_default()
    }
}
