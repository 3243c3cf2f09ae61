//! The layered response strategy.
//!
//! Cache-first, then network with write-through, then fallback synthesis.
//! Resolution never fails: every eligible request ends in some response,
//! even if it is only the synthesized offline reply.

use http::{Method, StatusCode};

use petrel_core::cache::key;
use petrel_core::{CacheEntry, Request, Response};

use crate::worker::ServiceWorker;

impl ServiceWorker {
    /// Resolve an eligible request to a response.
    ///
    /// 1. Union cache lookup; a hit in any generation wins and the network
    ///    is never touched.
    /// 2. Live fetch. A 200 is written through to the dynamic generation
    ///    (write failures are logged and swallowed); any other status is
    ///    returned as-is and never cached.
    /// 3. On fetch failure, a second cache chance and then Accept-driven
    ///    fallback synthesis.
    pub(crate) async fn resolve(&self, request: &Request) -> Response {
        let key = key::request_key(&request.method, &request.url);

        match self.store.match_any(&key).await {
            Ok(Some(hit)) => {
                tracing::debug!("cache hit for {}", request.url);
                return hit;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("cache lookup failed for {}: {}", request.url, e),
        }

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if response.status == StatusCode::OK {
                    let entry = CacheEntry::new(request, &response);
                    if let Err(e) = self.store.put(&self.dynamic_cache, entry).await {
                        tracing::warn!("write-through failed for {}: {}", request.url, e);
                    }
                }
                response
            }
            Err(e) => {
                tracing::debug!("network unavailable for {}: {}", request.url, e);
                self.offline_response(request, &key).await
            }
        }
    }

    /// Second cache chance, then fallback synthesis driven by the Accept
    /// header. A missing Accept header matches nothing and lands on the
    /// generic JSON reply.
    async fn offline_response(&self, request: &Request, key: &str) -> Response {
        // A concurrent resolution may have cached this key since the first
        // lookup.
        if let Ok(Some(hit)) = self.store.match_any(key).await {
            tracing::debug!("late cache hit for {}", request.url);
            return hit;
        }

        if request.accepts("text/html") {
            if let Some(shell) = self.fallback_entry(&self.config.app_shell_path).await {
                return shell;
            }
        } else if request.accepts("image") {
            if let Some(placeholder) = self.fallback_entry(&self.config.fallback_image_path).await {
                return placeholder;
            }
        }

        Response::offline_fallback()
    }

    /// Look up one of the precached fallback documents by manifest path.
    async fn fallback_entry(&self, path: &str) -> Option<Response> {
        let url = key::absolutize(path, &self.origin).ok()?;
        let key = key::request_key(&Method::GET, &url);
        self.store.match_any(&key).await.ok().flatten()
    }
}
