//! Worker construction and the fetch entry point.

use std::sync::Arc;

use tokio::sync::RwLock;
use url::Url;

use petrel_client::Fetcher;
use petrel_core::{AppConfig, CacheDb, Error, Request, Response, SyncQueue};

use crate::lifecycle::LifecycleState;

/// One worker per cache generation.
///
/// All collaborators are injected at construction: the cache store, the
/// network fetcher, and the sync queue. The generation labels and the
/// origin are derived from the configuration once, here, and never from
/// process-wide state.
pub struct ServiceWorker {
    pub(crate) config: AppConfig,
    pub(crate) store: CacheDb,
    pub(crate) fetcher: Arc<dyn Fetcher>,
    pub(crate) queue: Arc<dyn SyncQueue>,
    pub(crate) state: RwLock<LifecycleState>,
    pub(crate) origin: Url,
    pub(crate) static_cache: String,
    pub(crate) dynamic_cache: String,
}

impl ServiceWorker {
    /// Build a worker over its collaborators.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` if the configured origin does not parse.
    pub fn new(
        config: AppConfig, store: CacheDb, fetcher: Arc<dyn Fetcher>, queue: Arc<dyn SyncQueue>,
    ) -> Result<Self, Error> {
        let origin = config.origin_url()?;
        let static_cache = config.static_generation().label();
        let dynamic_cache = config.dynamic_generation().label();

        Ok(Self {
            config,
            store,
            fetcher,
            queue,
            state: RwLock::new(LifecycleState::New),
            origin,
            static_cache,
            dynamic_cache,
        })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get reference to the cache store.
    pub fn store(&self) -> &CacheDb {
        &self.store
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    /// Label of the current static generation.
    pub fn static_cache(&self) -> &str {
        &self.static_cache
    }

    /// Label of the current dynamic generation.
    pub fn dynamic_cache(&self) -> &str {
        &self.dynamic_cache
    }

    /// Handle an intercepted request.
    ///
    /// Cache-eligible requests (`GET` over http/https) go through the
    /// resolver and always produce a response. Everything else is forwarded
    /// to the network unintercepted and the raw outcome, including failure,
    /// goes back to the caller; such requests are never looked up in nor
    /// written to any cache.
    pub async fn on_fetch(&self, request: Request) -> Result<Response, Error> {
        if !request.is_cache_eligible() {
            tracing::debug!("passthrough for {} {}", request.method, request.url);
            return self.fetcher.fetch(&request).await;
        }

        Ok(self.resolve(&request).await)
    }
}
