//! Request and response model shared across the petrel crates.
//!
//! Bodies are `Bytes`, so handing one copy to the caller and another to the
//! cache store is a refcount clone rather than a buffer copy.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header};
use serde_json::json;
use url::Url;

/// Offline fallback message, returned when every strategy layer misses.
const OFFLINE_MESSAGE: &str = "You are currently offline. Please check your internet connection.";

/// An intercepted inbound request.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl Request {
    /// Build a request with the given method and no headers or body.
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url, headers: HeaderMap::new(), body: None }
    }

    /// Build a plain GET request.
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Set a header, replacing any previous value. Values that are not
    /// valid header text are ignored.
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        if let Ok(v) = HeaderValue::from_str(value) {
            self.headers.insert(name, v);
        }
        self
    }

    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }

    /// Whether this request may be served from or written to the cache.
    ///
    /// Only `GET` over `http`/`https` qualifies; everything else bypasses
    /// the resolver and goes straight to the network.
    pub fn is_cache_eligible(&self) -> bool {
        self.method == Method::GET && matches!(self.url.scheme(), "http" | "https")
    }

    /// The `Accept` header, if present and valid UTF-8.
    pub fn accept(&self) -> Option<&str> {
        self.headers.get(header::ACCEPT).and_then(|v| v.to_str().ok())
    }

    /// Containment check on the `Accept` header. A missing header matches
    /// nothing; it must not fail the lookup.
    pub fn accepts(&self, fragment: &str) -> bool {
        self.accept().is_some_and(|a| a.contains(fragment))
    }
}

/// A response produced by the network, the cache, or fallback synthesis.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    /// Build a response with the given status and body and no headers.
    pub fn new(status: StatusCode, body: Bytes) -> Self {
        Self { status, headers: HeaderMap::new(), body }
    }

    /// Content-Type header, if present and valid UTF-8.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// The synthesized last-resort offline reply: `503` with a JSON error
    /// body. Every eligible request that exhausts cache and network
    /// terminates here, so resolution never fails.
    pub fn offline_fallback() -> Self {
        let body = json!({ "error": "Offline", "message": OFFLINE_MESSAGE });
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self { status: StatusCode::SERVICE_UNAVAILABLE, headers, body: Bytes::from(body.to_string()) }
    }
}
