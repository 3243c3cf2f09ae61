//! Control messages from host pages.
//!
//! The host owns the wire format; by the time a message reaches the worker
//! it is already decoded into a `HostMessage`.

use serde::Serialize;
use tokio::sync::oneshot;

use petrel_core::Error;

use crate::worker::ServiceWorker;

/// A decoded control message from a host page.
#[derive(Debug)]
pub enum HostMessage {
    /// Stop waiting and activate immediately.
    SkipWaiting,
    /// Report the current generation labels on the reply channel.
    GetVersion { reply: oneshot::Sender<VersionInfo> },
    /// Add a batch of URLs to the dynamic cache.
    CacheUrls { urls: Vec<String> },
}

/// Reply payload for `HostMessage::GetVersion`.
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub version: String,
    pub static_cache: String,
    pub dynamic_cache: String,
}

impl ServiceWorker {
    /// Handle one decoded host message.
    ///
    /// `CacheUrls` honors the same strict/best-effort precache policy as
    /// install but targets the dynamic generation and works in any
    /// lifecycle state.
    pub async fn on_message(&self, message: HostMessage) -> Result<(), Error> {
        match message {
            HostMessage::SkipWaiting => {
                let report = self.skip_waiting().await?;
                tracing::debug!("skip waiting retired {} caches", report.deleted_caches.len());
                Ok(())
            }
            HostMessage::GetVersion { reply } => {
                let info = VersionInfo {
                    version: self.config.cache_version.clone(),
                    static_cache: self.static_cache.clone(),
                    dynamic_cache: self.dynamic_cache.clone(),
                };
                // Receiver gone means the page went away.
                if reply.send(info).is_err() {
                    tracing::debug!("version reply dropped");
                }
                Ok(())
            }
            HostMessage::CacheUrls { urls } => {
                let report = self.precache_into(&self.dynamic_cache, &urls).await?;
                tracing::info!("cached {} of {} requested URLs", report.cached, report.requested);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use http::Method;
    use petrel_core::{AppConfig, CacheDb, Error, MemoryQueue, cache::key};
    use url::Url;

    use super::*;
    use crate::lifecycle::LifecycleState;
    use crate::support::{MockFetcher, html_response, test_config, text_response};

    fn worker_with(config: AppConfig, db: &CacheDb, fetcher: Arc<MockFetcher>) -> ServiceWorker {
        ServiceWorker::new(config, db.clone(), fetcher, Arc::new(MemoryQueue::new())).unwrap()
    }

    #[tokio::test]
    async fn test_get_version_reports_labels() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let worker = worker_with(test_config(), &db, Arc::new(MockFetcher::new()));

        let (tx, rx) = oneshot::channel();
        worker.on_message(HostMessage::GetVersion { reply: tx }).await.unwrap();

        let info = rx.await.unwrap();
        assert_eq!(info.version, "v1.0.0");
        assert_eq!(info.static_cache, "app-static-v1.0.0");
        assert_eq!(info.dynamic_cache, "app-dynamic-v1.0.0");
    }

    #[tokio::test]
    async fn test_get_version_tolerates_dropped_receiver() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let worker = worker_with(test_config(), &db, Arc::new(MockFetcher::new()));

        let (tx, rx) = oneshot::channel();
        drop(rx);

        assert!(worker.on_message(HostMessage::GetVersion { reply: tx }).await.is_ok());
    }

    #[tokio::test]
    async fn test_cache_urls_populates_dynamic_generation() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fetcher = MockFetcher::new()
            .respond("http://localhost:8080/articles/1", html_response("<html>one</html>"))
            .respond("http://localhost:8080/articles/2", html_response("<html>two</html>"));
        let worker = worker_with(test_config(), &db, Arc::new(fetcher));

        // Works without any lifecycle transition first.
        let urls = vec!["/articles/1".to_string(), "/articles/2".to_string()];
        worker.on_message(HostMessage::CacheUrls { urls }).await.unwrap();

        assert_eq!(db.entry_count("app-dynamic-v1.0.0").await.unwrap(), 2);
        let key = key::request_key(&Method::GET, &Url::parse("http://localhost:8080/articles/1").unwrap());
        assert!(db.match_in("app-dynamic-v1.0.0", &key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_cache_urls_strict_failure_writes_nothing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fetcher =
            MockFetcher::new().respond("http://localhost:8080/articles/1", text_response("one"));
        let worker = worker_with(test_config(), &db, Arc::new(fetcher));

        let urls = vec!["/articles/1".to_string(), "/articles/unreachable".to_string()];
        let result = worker.on_message(HostMessage::CacheUrls { urls }).await;

        assert!(matches!(result, Err(Error::Precache { .. })));
        assert_eq!(db.entry_count("app-dynamic-v1.0.0").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_skip_waiting_message_activates() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fetcher = MockFetcher::new()
            .respond("http://localhost:8080/", html_response("<html>root</html>"))
            .respond("http://localhost:8080/index.html", html_response("<html>shell</html>"))
            .respond("http://localhost:8080/assets/img/logo.png", text_response("png"));
        let worker = worker_with(test_config(), &db, Arc::new(fetcher));

        worker.on_install().await.unwrap();
        worker.on_message(HostMessage::SkipWaiting).await.unwrap();

        assert_eq!(worker.state().await, LifecycleState::Activated);
    }
}
