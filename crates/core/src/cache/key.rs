//! Request identity for cache keys.
//!
//! A cache key is a SHA-256 digest over the request method and the
//! canonical URL. Canonicalization strips the fragment and keeps the query
//! string intact, so `/page?a=1` and `/page?a=2` are distinct entries while
//! `/page#top` and `/page` are the same one.

use http::Method;
use sha2::{Digest, Sha256};
use url::Url;

use crate::Error;

/// Compute the cache identity for a request.
pub fn request_key(method: &Method, url: &Url) -> String {
    let mut canonical = url.clone();
    canonical.set_fragment(None);

    let mut hasher = Sha256::new();
    hasher.update(method.as_str().as_bytes());
    hasher.update(b"\n");
    hasher.update(canonical.as_str().as_bytes());
    hex::encode(hasher.finalize())
}

/// Resolve a manifest or fallback entry against the configured origin.
///
/// Root-relative paths (`/index.html`) join the origin; absolute URLs
/// (`https://cdn.example.com/lib.css`) pass through unchanged.
pub fn absolutize(raw: &str, origin: &Url) -> Result<Url, Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidUrl("empty URL".into()));
    }
    origin.join(trimmed).map_err(|e| Error::InvalidUrl(format!("{trimmed}: {e}")))
}
