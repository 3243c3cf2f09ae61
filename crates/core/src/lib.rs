//! Core types and shared functionality for petrel.
//!
//! This crate provides:
//! - Named cache store with SQLite backend
//! - Request/response model and cache identity
//! - Background-sync queue contract
//! - Configuration and unified error types

pub mod cache;
pub mod config;
pub mod error;
pub mod queue;
pub mod types;

pub use cache::{CacheDb, CacheEntry, CacheGeneration, GenerationKind};
pub use config::AppConfig;
pub use error::Error;
pub use queue::{MemoryQueue, PendingSyncTask, SyncQueue};
pub use types::{Request, Response};
