//! One typed cache per entity kind derived from the document store

use std::sync::Arc;
use uuid::Uuid;

use super::ttl_cache::{Sweep, TtlCache};
use crate::availability::OccupiedRange;
use crate::config::CacheConfig;
use crate::constants::cache_keys;
use crate::models::{Booking, Document, Room, Settings};

/// Read-through, write-invalidate accelerator for the document store.
/// It never holds the only copy of anything.
#[derive(Debug)]
pub struct StoreCache {
    enabled: bool,
    pub(crate) document: TtlCache<Arc<Document>>,
    pub(crate) rooms: TtlCache<Arc<Vec<Room>>>,
    pub(crate) bookings: TtlCache<Arc<Vec<Booking>>>,
    pub(crate) availability: TtlCache<Arc<Vec<OccupiedRange>>>,
    pub(crate) settings: TtlCache<Settings>,
}

impl StoreCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            enabled: config.enabled,
            document: TtlCache::from_config("document", &config.document),
            rooms: TtlCache::from_config("rooms", &config.rooms),
            bookings: TtlCache::from_config("bookings", &config.bookings),
            availability: TtlCache::from_config("availability", &config.availability),
            settings: TtlCache::from_config("settings", &config.settings),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn document(&self) -> Option<Arc<Document>> {
        self.enabled
            .then(|| self.document.get(cache_keys::DOCUMENT))
            .flatten()
    }

    pub fn put_document(&self, document: Arc<Document>) {
        if self.enabled {
            self.document.set(cache_keys::DOCUMENT, document);
        }
    }

    pub fn rooms(&self) -> Option<Arc<Vec<Room>>> {
        self.enabled.then(|| self.rooms.get(cache_keys::ROOMS)).flatten()
    }

    pub fn put_rooms(&self, rooms: Arc<Vec<Room>>) {
        if self.enabled {
            self.rooms.set(cache_keys::ROOMS, rooms);
        }
    }

    pub fn room_bookings(&self, room_id: &Uuid) -> Option<Arc<Vec<Booking>>> {
        self.enabled
            .then(|| self.bookings.get(&cache_keys::room_bookings(room_id)))
            .flatten()
    }

    pub fn put_room_bookings(&self, room_id: &Uuid, bookings: Arc<Vec<Booking>>) {
        if self.enabled {
            self.bookings.set(cache_keys::room_bookings(room_id), bookings);
        }
    }

    pub fn room_availability(&self, room_id: &Uuid) -> Option<Arc<Vec<OccupiedRange>>> {
        self.enabled
            .then(|| self.availability.get(&cache_keys::room_availability(room_id)))
            .flatten()
    }

    pub fn put_room_availability(&self, room_id: &Uuid, ranges: Arc<Vec<OccupiedRange>>) {
        if self.enabled {
            self.availability
                .set(cache_keys::room_availability(room_id), ranges);
        }
    }

    pub fn settings(&self) -> Option<Settings> {
        self.enabled
            .then(|| self.settings.get(cache_keys::SETTINGS))
            .flatten()
    }

    pub fn put_settings(&self, settings: Settings) {
        if self.enabled {
            self.settings.set(cache_keys::SETTINGS, settings);
        }
    }

    /// Drop every store-derived key across all entity kinds
    pub fn invalidate_store(&self) -> usize {
        let prefix = cache_keys::STORE_PREFIX;
        self.document.delete_by_prefix(prefix)
            + self.rooms.delete_by_prefix(prefix)
            + self.bookings.delete_by_prefix(prefix)
            + self.availability.delete_by_prefix(prefix)
            + self.settings.delete_by_prefix(prefix)
    }
}

impl Sweep for StoreCache {
    fn sweep_expired(&self) -> usize {
        self.document.sweep_expired()
            + self.rooms.sweep_expired()
            + self.bookings.sweep_expired()
            + self.availability.sweep_expired()
            + self.settings.sweep_expired()
    }
}
