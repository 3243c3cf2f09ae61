//! SQLite-backed named cache store.
//!
//! This module is the durable request-to-response store behind the offline
//! resolver, with async access via tokio-rusqlite. It supports:
//!
//! - Multiple named caches (generations) in one database
//! - Union lookup across all caches and per-cache lookup
//! - Transactional bulk population for install-time precaching
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod entries;
pub mod generation;
pub mod key;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::CacheEntry;
pub use generation::{CacheGeneration, GenerationKind};
