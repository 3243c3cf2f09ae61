//! Background-sync replay.
//!
//! A sync trigger drains the pending queue and replays each deferred
//! request through the fetcher. A task leaves the queue only after its
//! replay reaches the network, so anything that fails (or a worker that
//! dies between replay and removal) is delivered again on the next
//! trigger. At-least-once, by construction.

use serde::Serialize;

use petrel_core::Error;

use crate::worker::ServiceWorker;

/// Outcome of one sync trigger.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// Tasks found in the queue.
    pub attempted: usize,
    /// Tasks replayed and removed.
    pub replayed: usize,
    /// Tasks left queued for the next trigger.
    pub failed: usize,
}

impl ServiceWorker {
    /// Drain the pending queue for a sync trigger.
    ///
    /// Only the configured tag is serviced; any other tag is a logged
    /// no-op. Transport success counts as delivered even when the server
    /// answers non-2xx; the status is logged and the task is dequeued.
    ///
    /// # Errors
    ///
    /// Propagates a queue backend failure on the initial read. Per-task
    /// failures never abort the drain.
    pub async fn on_sync(&self, tag: &str) -> Result<SyncReport, Error> {
        if tag != self.config.sync_tag {
            tracing::debug!("ignoring sync tag {:?}", tag);
            return Ok(SyncReport { attempted: 0, replayed: 0, failed: 0 });
        }

        let tasks = self.queue.pending().await?;
        let attempted = tasks.len();
        tracing::info!("background sync triggered ({} pending)", attempted);

        let mut replayed = 0usize;
        let mut failed = 0usize;

        for task in tasks {
            let request = task.to_request();
            match self.fetcher.fetch(&request).await {
                Ok(response) => {
                    if !response.status.is_success() {
                        tracing::warn!("sync replay {} answered {}", task.id, response.status.as_u16());
                    }
                    match self.queue.remove(&task.id).await {
                        Ok(()) => {
                            tracing::debug!("sync replay {} delivered", task.id);
                            replayed += 1;
                        }
                        Err(e) => {
                            // Delivered but still queued: redelivery beats loss.
                            tracing::error!("sync replay {} delivered but not dequeued: {}", task.id, e);
                            failed += 1;
                        }
                    }
                }
                Err(e) => {
                    tracing::error!("sync replay {} failed: {}", task.id, e);
                    failed += 1;
                }
            }
        }

        Ok(SyncReport { attempted, replayed, failed })
    }
}
