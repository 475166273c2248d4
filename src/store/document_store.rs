//! Single-file document store
//!
//! The whole [`Document`] is serialized to one JSON file. Writes go to a
//! sibling temp file which is then renamed over the canonical path, so a
//! reader sees either the old document or the new one, never a torn write.
//! Read-modify-write sequences run under one FIFO mutex; bare reads skip it.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, MutexGuard};
use tracing::warn;
use uuid::Uuid;

use crate::availability::OccupiedRange;
use crate::cache::StoreCache;
use crate::config::CacheConfig;
use crate::error::{BookingError, Result};
use crate::logging::{log_error, log_store_operation};
use crate::models::{Booking, Document, Room, Settings};

/// Handle to the persisted document. Construct one per backing file and
/// share it behind an `Arc`; tests build isolated instances freely.
#[derive(Debug)]
pub struct DocumentStore {
    path: PathBuf,
    lock: Mutex<()>,
    cache: Arc<StoreCache>,
    /// Bumped after every durable write; lets a bare read detect that it
    /// raced a write and must not publish what it loaded
    generation: AtomicU64,
}

/// Exclusive access to the document for one read-modify-write sequence.
/// The lock is released when the transaction is dropped, including on
/// early return or panic.
pub struct StoreTransaction<'a> {
    store: &'a DocumentStore,
    _guard: MutexGuard<'a, ()>,
}

impl DocumentStore {
    pub fn open(path: impl Into<PathBuf>, cache_config: &CacheConfig) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            cache: Arc::new(StoreCache::new(cache_config)),
            generation: AtomicU64::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Staging path a write goes through before the rename
    pub fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    pub fn cache(&self) -> &Arc<StoreCache> {
        &self.cache
    }

    /// Acquire the store lock. Waiters are served in arrival order.
    pub async fn transaction(&self) -> StoreTransaction<'_> {
        let guard = self.lock.lock().await;
        StoreTransaction {
            store: self,
            _guard: guard,
        }
    }

    /// Run `mutate` against the current document under the lock and persist
    /// the result. Nothing is written when `mutate` fails.
    pub async fn with_lock<T, F>(&self, mutate: F) -> Result<T>
    where
        F: FnOnce(&mut Document) -> Result<T>,
    {
        let mut tx = self.transaction().await;
        let mut document = tx.read().await?;
        let output = mutate(&mut document)?;
        tx.write(&document).await?;
        Ok(output)
    }

    /// Current document, from cache when fresh. A missing or undecodable
    /// file reads as an empty document; other I/O failures propagate.
    pub async fn read(&self) -> Result<Arc<Document>> {
        if let Some(document) = self.cache.document() {
            return Ok(document);
        }

        let observed = self.generation.load(Ordering::SeqCst);
        let document = Arc::new(self.load_from_disk().await?);
        self.publish(observed, |cache| cache.put_document(Arc::clone(&document)));
        Ok(document)
    }

    /// All rooms (long-lived cache entry)
    pub async fn rooms(&self) -> Result<Arc<Vec<Room>>> {
        if let Some(rooms) = self.cache.rooms() {
            return Ok(rooms);
        }

        let observed = self.generation.load(Ordering::SeqCst);
        let rooms = Arc::new(self.read().await?.rooms.clone());
        self.publish(observed, |cache| cache.put_rooms(Arc::clone(&rooms)));
        Ok(rooms)
    }

    pub async fn room(&self, room_id: &Uuid) -> Result<Option<Room>> {
        Ok(self
            .rooms()
            .await?
            .iter()
            .find(|room| room.id == *room_id)
            .cloned())
    }

    /// Every booking on a room, cancelled ones included
    pub async fn bookings_for_room(&self, room_id: &Uuid) -> Result<Arc<Vec<Booking>>> {
        if let Some(bookings) = self.cache.room_bookings(room_id) {
            return Ok(bookings);
        }

        let observed = self.generation.load(Ordering::SeqCst);
        let bookings = Arc::new(self.read().await?.bookings_for_room(room_id));
        self.publish(observed, |cache| {
            cache.put_room_bookings(room_id, Arc::clone(&bookings))
        });
        Ok(bookings)
    }

    /// Ranges blocking a room's calendar, for advisory availability checks
    pub async fn occupied_ranges(&self, room_id: &Uuid) -> Result<Arc<Vec<OccupiedRange>>> {
        if let Some(ranges) = self.cache.room_availability(room_id) {
            return Ok(ranges);
        }

        let observed = self.generation.load(Ordering::SeqCst);
        let ranges = Arc::new(self.read().await?.occupied_ranges(room_id));
        self.publish(observed, |cache| {
            cache.put_room_availability(room_id, Arc::clone(&ranges))
        });
        Ok(ranges)
    }

    pub async fn settings(&self) -> Result<Settings> {
        if let Some(settings) = self.cache.settings() {
            return Ok(settings);
        }

        let observed = self.generation.load(Ordering::SeqCst);
        let settings = self.read().await?.settings_or_default();
        self.publish(observed, |cache| cache.put_settings(settings.clone()));
        Ok(settings)
    }

    /// Cache a freshly loaded value, then drop it again if a write landed
    /// in the meantime. A write either bumps the generation before the
    /// re-check or invalidates after the put, so stale data never survives.
    fn publish(&self, observed: u64, put: impl FnOnce(&StoreCache)) {
        put(&self.cache);
        if self.generation.load(Ordering::SeqCst) != observed {
            self.cache.invalidate_store();
        }
    }

    async fn load_from_disk(&self) -> Result<Document> {
        let started = Instant::now();
        let path = self.path.display().to_string();

        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log_store_operation("load", &path, "missing", None, Some("starting empty"));
                return Ok(Document::default());
            }
            Err(err) => {
                log_error("document_store", "load", &err.to_string(), Some(path.as_str()));
                return Err(err.into());
            }
        };

        let document = match serde_json::from_slice::<Document>(&bytes) {
            Ok(document) => document,
            Err(err) => {
                warn!(
                    path = %path,
                    error = %err,
                    "Document store could not be decoded, reading as empty"
                );
                Document::default()
            }
        };

        log_store_operation(
            "load",
            &path,
            "ok",
            Some(started.elapsed().as_millis() as u64),
            None,
        );
        Ok(document)
    }

    async fn write_atomically(&self, document: &Document) -> Result<()> {
        let started = Instant::now();
        let path = self.path.display().to_string();
        let temp_path = self.temp_path();

        let result = self.stage_and_rename(document, &temp_path).await;

        // Success or failure, whatever is cached no longer matches disk
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cache.invalidate_store();

        match result {
            Ok(()) => {
                log_store_operation(
                    "write",
                    &path,
                    "ok",
                    Some(started.elapsed().as_millis() as u64),
                    None,
                );
                Ok(())
            }
            Err(err) => {
                if let Err(cleanup) = tokio::fs::remove_file(&temp_path).await {
                    if cleanup.kind() != ErrorKind::NotFound {
                        warn!(error = %cleanup, "Failed to remove staged document");
                    }
                }
                log_error("document_store", "write", &err.to_string(), Some(path.as_str()));
                Err(err)
            }
        }
    }

    async fn stage_and_rename(&self, document: &Document, temp_path: &Path) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(document)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::File::create(temp_path).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(temp_path, &self.path)
            .await
            .map_err(|err| BookingError::Persistence(format!("rename failed: {err}")))
    }
}

impl StoreTransaction<'_> {
    /// Owned copy of the current document to mutate
    pub async fn read(&self) -> Result<Document> {
        Ok(self.store.read().await?.as_ref().clone())
    }

    /// Persist `document` as the new state
    pub async fn write(&mut self, document: &Document) -> Result<()> {
        self.store.write_atomically(document).await
    }

    pub fn store(&self) -> &DocumentStore {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LocalizedText, NewRoom};
    use chrono::Utc;

    fn test_store(dir: &tempfile::TempDir) -> DocumentStore {
        DocumentStore::open(dir.path().join("studio.json"), &CacheConfig::for_test())
    }

    fn room_named(name: &str) -> Room {
        Room::provision(
            NewRoom {
                name: LocalizedText {
                    en: name.to_string(),
                    es: name.to_string(),
                },
                monthly_rate_cents: 80_000,
                capacity: 1,
                ..Default::default()
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);

        let document = store.read().await.unwrap();
        assert_eq!(*document, Document::default());
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);
        tokio::fs::write(store.path(), b"{ not json").await.unwrap();

        let document = store.read().await.unwrap();
        assert!(document.rooms.is_empty());
    }

    #[tokio::test]
    async fn test_temp_path_is_sibling() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);
        assert_eq!(store.temp_path(), dir.path().join("studio.json.tmp"));
    }

    #[tokio::test]
    async fn test_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);

        store
            .with_lock(|doc| {
                doc.rooms.push(room_named("North"));
                Ok(())
            })
            .await
            .unwrap();

        assert!(store.path().exists());
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn test_failed_mutation_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);

        let result: Result<()> = store
            .with_lock(|doc| {
                doc.rooms.push(room_named("Ghost"));
                Err(BookingError::validation("name", "rejected"))
            })
            .await;

        assert!(result.is_err());
        assert!(!store.path().exists());
        assert!(store.read().await.unwrap().rooms.is_empty());
    }

    #[tokio::test]
    async fn test_write_invalidates_cached_reads() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);

        // Warm every cache kind
        assert!(store.rooms().await.unwrap().is_empty());
        store.read().await.unwrap();

        store
            .with_lock(|doc| {
                doc.rooms.push(room_named("South"));
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(store.rooms().await.unwrap().len(), 1);
        assert_eq!(store.read().await.unwrap().rooms.len(), 1);
    }

    #[tokio::test]
    async fn test_io_failure_propagates_and_releases_lock() {
        let dir = tempfile::tempdir().unwrap();
        // The canonical path is a directory, so the rename cannot succeed
        let blocked = dir.path().join("studio.json");
        std::fs::create_dir_all(blocked.join("occupied")).unwrap();
        let store = DocumentStore::open(&blocked, &CacheConfig::for_test());

        let result = store.with_lock(|_| Ok(())).await;
        assert!(matches!(result, Err(BookingError::Persistence(_))));

        // Lock was released: a second transaction can start
        let tx = tokio::time::timeout(std::time::Duration::from_secs(1), store.transaction())
            .await
            .expect("lock should be free");
        drop(tx);
    }
}
