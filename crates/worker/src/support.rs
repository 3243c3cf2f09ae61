//! Test doubles shared by the handler tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderValue, StatusCode, header};

use petrel_client::Fetcher;
use petrel_core::{AppConfig, CacheDb, CacheEntry, Error, Request, Response};

/// What the mock should do for one URL.
enum Script {
    Respond(Response),
    Fail,
}

/// Scripted fetcher: programmed responses per URL plus a call counter.
///
/// Unscripted URLs fail with a network error, so a test exercises exactly
/// the fetches it scripted. `stash_on_fail` writes a cache entry before
/// failing, which stands in for a concurrent resolution landing between
/// two lookups.
pub(crate) struct MockFetcher {
    scripts: HashMap<String, Script>,
    calls: AtomicUsize,
    stash_on_fail: Option<(CacheDb, String, Response)>,
}

impl MockFetcher {
    pub(crate) fn new() -> Self {
        Self { scripts: HashMap::new(), calls: AtomicUsize::new(0), stash_on_fail: None }
    }

    pub(crate) fn respond(mut self, url: &str, response: Response) -> Self {
        self.scripts.insert(url.to_string(), Script::Respond(response));
        self
    }

    pub(crate) fn fail(mut self, url: &str) -> Self {
        self.scripts.insert(url.to_string(), Script::Fail);
        self
    }

    pub(crate) fn stash_on_fail(mut self, db: &CacheDb, cache: &str, response: Response) -> Self {
        self.stash_on_fail = Some((db.clone(), cache.to_string(), response));
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.scripts.get(request.url.as_str()) {
            Some(Script::Respond(response)) => Ok(response.clone()),
            Some(Script::Fail) | None => {
                if let Some((db, cache, response)) = &self.stash_on_fail {
                    let entry = CacheEntry::new(request, response);
                    db.put(cache, entry).await.expect("stash write failed");
                }
                Err(Error::Network("connection refused".into()))
            }
        }
    }
}

/// Config with a short manifest, suitable for scripting every URL.
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        precache_urls: vec!["/".into(), "/index.html".into(), "/assets/img/logo.png".into()],
        ..Default::default()
    }
}

pub(crate) fn response_with(content_type: &'static str, body: &str) -> Response {
    let mut response = Response::new(StatusCode::OK, Bytes::from(body.to_string()));
    response
        .headers
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

pub(crate) fn html_response(body: &str) -> Response {
    response_with("text/html", body)
}

pub(crate) fn text_response(body: &str) -> Response {
    response_with("text/plain", body)
}
