//! Deferred background-sync queue contract.
//!
//! A pending task is a request that failed while offline, recorded by the
//! host page for replay once connectivity returns. The durable store
//! behind the queue is owned by the host; this crate only defines the
//! contract the worker drains it through, plus an in-memory implementation
//! for hosts without durable storage and for tests.

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method};
use tokio::sync::RwLock;
use url::Url;

use crate::Error;
use crate::types::Request;

/// A deferred request awaiting replay.
///
/// Tasks are never mutated in place: they are created by the host, read by
/// the sync handler, and deleted only after a successful replay.
#[derive(Debug, Clone)]
pub struct PendingSyncTask {
    pub id: String,
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl PendingSyncTask {
    /// The request to replay for this task.
    pub fn to_request(&self) -> Request {
        Request {
            method: self.method.clone(),
            url: self.url.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }
}

/// External durable queue of deferred requests.
///
/// Removal only happens after a successful replay, so a task that fails
/// (or a worker that dies between replay and removal) is retried on the
/// next sync trigger: at-least-once delivery.
#[async_trait]
pub trait SyncQueue: Send + Sync {
    /// Snapshot of the tasks currently awaiting replay.
    async fn pending(&self) -> Result<Vec<PendingSyncTask>, Error>;

    /// Remove a delivered task. Unknown ids are a no-op.
    async fn remove(&self, id: &str) -> Result<(), Error>;
}

/// In-memory sync queue.
#[derive(Debug, Default)]
pub struct MemoryQueue {
    tasks: RwLock<Vec<PendingSyncTask>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a deferred request (host side of the contract).
    pub async fn push(&self, task: PendingSyncTask) {
        self.tasks.write().await.push(task);
    }

    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }
}

#[async_trait]
impl SyncQueue for MemoryQueue {
    async fn pending(&self) -> Result<Vec<PendingSyncTask>, Error> {
        Ok(self.tasks.read().await.clone())
    }

    async fn remove(&self, id: &str) -> Result<(), Error> {
        self.tasks.write().await.retain(|task| task.id != id);
        Ok(())
    }
}
