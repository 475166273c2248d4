//! # Document Store
//!
//! Durable persistence of the whole [`Document`](crate::models::Document)
//! behind one FIFO lock. Every read-modify-write goes through
//! [`DocumentStore::with_lock`] or a [`StoreTransaction`]; display reads use
//! the cached accessors and skip the lock.

pub mod document_store;

pub use document_store::{DocumentStore, StoreTransaction};
