//! Install and activation of cache generations.
//!
//! Install populates the static generation from the precache manifest with
//! bounded-concurrency fetches and one transactional bulk write. Activation
//! retires every stored cache whose label is not current. Both are driven
//! by the host; a deployment that changes the version tag produces a fresh
//! worker with fresh labels, and its activation is what deletes the old
//! generation's caches.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use petrel_core::cache::key;
use petrel_core::{CacheEntry, Error, Request};

use crate::worker::ServiceWorker;

/// Lifecycle of one worker generation.
///
/// There is no path back to `Installing`; a failed install parks the
/// worker in `Redundant`, where it refuses lifecycle-gated work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    New,
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

/// Outcome of a bulk cache-population run.
#[derive(Debug, Clone, Serialize)]
pub struct PrecacheReport {
    /// URLs in the manifest.
    pub requested: usize,
    /// Entries written.
    pub cached: usize,
    /// URLs skipped in best-effort mode.
    pub skipped: usize,
}

/// Outcome of an activation purge.
#[derive(Debug, Clone, Serialize)]
pub struct ActivationReport {
    /// Labels of the caches that were retired.
    pub deleted_caches: Vec<String>,
    /// Total entries removed with them.
    pub deleted_entries: u64,
}

impl ServiceWorker {
    /// Install: populate the static generation from the precache manifest.
    ///
    /// Strict mode is all-or-nothing: any unreachable or non-2xx manifest
    /// URL aborts the install with nothing written. Best-effort mode logs
    /// and skips failures and writes the rest.
    ///
    /// # Errors
    ///
    /// `Error::Lifecycle` if the worker is not `New`; `Error::Precache` on
    /// a strict-mode manifest failure. Either failure parks the worker in
    /// `Redundant`.
    pub async fn on_install(&self) -> Result<PrecacheReport, Error> {
        self.transition(LifecycleState::New, LifecycleState::Installing).await?;
        tracing::info!("installing {}", self.static_cache);

        match self.precache_into(&self.static_cache, &self.config.precache_urls).await {
            Ok(report) => {
                self.set_state(LifecycleState::Installed).await;
                tracing::info!("installed {} ({} entries)", self.static_cache, report.cached);
                Ok(report)
            }
            Err(e) => {
                self.set_state(LifecycleState::Redundant).await;
                Err(e)
            }
        }
    }

    /// Activate: retire every cache generation that is not current.
    ///
    /// Callable again once activated; a second run finds nothing to
    /// delete. Per-cache delete failures are logged and skipped so the
    /// purge removes what it can. Activation returning `Ok` is the signal
    /// that the host may route traffic to this worker immediately.
    ///
    /// # Errors
    ///
    /// `Error::Lifecycle` unless the worker is `Installed` or `Activated`;
    /// store errors if the label enumeration itself fails (the prior state
    /// is restored so activation can be retried).
    pub async fn on_activate(&self) -> Result<ActivationReport, Error> {
        let prior = {
            let mut state = self.state.write().await;
            match *state {
                LifecycleState::Installed | LifecycleState::Activated => {
                    let prior = *state;
                    *state = LifecycleState::Activating;
                    prior
                }
                other => return Err(Error::Lifecycle(format!("cannot activate from {other:?}"))),
            }
        };
        tracing::info!("activating {}", self.static_cache);

        match self.purge_stale_generations().await {
            Ok(report) => {
                self.set_state(LifecycleState::Activated).await;
                Ok(report)
            }
            Err(e) => {
                self.set_state(prior).await;
                Err(e)
            }
        }
    }

    /// Stop waiting and activate immediately.
    pub async fn skip_waiting(&self) -> Result<ActivationReport, Error> {
        tracing::info!("skip waiting requested");
        self.on_activate().await
    }

    /// Fetch every given URL with bounded concurrency and write the
    /// results into the named cache in one transaction.
    ///
    /// Shared by install (static generation) and the `CacheUrls` host
    /// message (dynamic generation); both honor the strict/best-effort
    /// policy from configuration.
    pub(crate) async fn precache_into(&self, cache: &str, urls: &[String]) -> Result<PrecacheReport, Error> {
        let requested = urls.len();
        let mut skipped = 0usize;

        let mut targets = Vec::new();
        for raw in urls {
            match key::absolutize(raw, &self.origin) {
                Ok(url) => targets.push(url),
                Err(e) => {
                    if self.config.strict_precache {
                        return Err(Error::Precache { url: raw.clone(), reason: e.to_string() });
                    }
                    tracing::warn!("skipping unusable manifest URL {}: {}", raw, e);
                    skipped += 1;
                }
            }
        }

        let semaphore = Arc::new(Semaphore::new(self.config.precache_concurrency.max(1)));
        let mut join_set = JoinSet::new();

        for url in targets {
            let permit = semaphore.clone().acquire_owned().await.unwrap();
            let fetcher = self.fetcher.clone();

            join_set.spawn(async move {
                // NOTE: Hold permit for task duration to enforce concurrency limit
                let _permit = permit;
                let request = Request::get(url);
                let result = fetcher.fetch(&request).await;
                (request, result)
            });
        }

        let mut entries = Vec::new();

        while let Some(joined) = join_set.join_next().await {
            let (request, result) = joined.map_err(|e| Error::Lifecycle(format!("precache task failed: {e}")))?;

            match result {
                Ok(response) if response.status.is_success() => {
                    entries.push(CacheEntry::new(&request, &response));
                }
                Ok(response) => {
                    if self.config.strict_precache {
                        join_set.shutdown().await;
                        return Err(Error::Precache {
                            url: request.url.to_string(),
                            reason: format!("status {}", response.status.as_u16()),
                        });
                    }
                    tracing::warn!("skipping {}: status {}", request.url, response.status.as_u16());
                    skipped += 1;
                }
                Err(e) => {
                    if self.config.strict_precache {
                        join_set.shutdown().await;
                        return Err(Error::Precache { url: request.url.to_string(), reason: e.to_string() });
                    }
                    tracing::warn!("skipping {}: {}", request.url, e);
                    skipped += 1;
                }
            }
        }

        let cached = self.store.put_many(cache, entries).await?;

        Ok(PrecacheReport { requested, cached, skipped })
    }

    /// Delete every stored cache whose label is not current.
    async fn purge_stale_generations(&self) -> Result<ActivationReport, Error> {
        let keep = [self.static_cache.as_str(), self.dynamic_cache.as_str()];
        let labels = self.store.cache_labels().await?;

        let mut deleted_caches = Vec::new();
        let mut deleted_entries = 0u64;

        for label in labels {
            if keep.contains(&label.as_str()) {
                continue;
            }
            match self.store.delete_cache(&label).await {
                Ok(count) => {
                    tracing::info!("retired cache {} ({} entries)", label, count);
                    deleted_entries += count;
                    deleted_caches.push(label);
                }
                Err(e) => tracing::warn!("failed to delete cache {}: {}", label, e),
            }
        }

        Ok(ActivationReport { deleted_caches, deleted_entries })
    }

    pub(crate) async fn transition(&self, from: LifecycleState, to: LifecycleState) -> Result<(), Error> {
        let mut state = self.state.write().await;
        if *state != from {
            return Err(Error::Lifecycle(format!("expected {from:?}, worker is {:?}", *state)));
        }
        *state = to;
        Ok(())
    }

    pub(crate) async fn set_state(&self, to: LifecycleState) {
        *self.state.write().await = to;
    }
}
