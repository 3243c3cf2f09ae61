//! Cache entry operations.
//!
//! Entries map a request identity to a stored response inside one named
//! cache. An entry is immutable once written; storing the same key again
//! overwrites the whole row (UPSERT), it never merges. Concurrent writers
//! to the same key are last-write-wins: entries are replaceable snapshots,
//! not append logs.

use super::connection::CacheDb;
use super::key;
use crate::Error;
use crate::types::{Request, Response};
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

const UPSERT_SQL: &str = "INSERT INTO cache_entries (
        cache_name, key_hash, method, url, status, headers_json, body, stored_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
    ON CONFLICT(cache_name, key_hash) DO UPDATE SET
        method = excluded.method,
        url = excluded.url,
        status = excluded.status,
        headers_json = excluded.headers_json,
        body = excluded.body,
        stored_at = excluded.stored_at";

/// A stored cache entry: request identity plus the response to replay.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub method: String,
    pub url: String,
    pub response: Response,
    pub stored_at: String,
}

impl CacheEntry {
    /// Build an entry for a request/response pair, keyed by the request's
    /// cache identity.
    pub fn new(request: &Request, response: &Response) -> Self {
        Self {
            key: key::request_key(&request.method, &request.url),
            method: request.method.to_string(),
            url: request.url.to_string(),
            response: response.clone(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl CacheDb {
    /// Look a request key up across every cache (union view).
    ///
    /// No generation filtering happens here: a hit in any cache, static or
    /// dynamic, is accepted. When several caches hold the same key the
    /// newest entry wins.
    pub async fn match_any(&self, key: &str) -> Result<Option<Response>, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<(i64, String, Vec<u8>)>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT status, headers_json, body FROM cache_entries
                     WHERE key_hash = ?1 ORDER BY stored_at DESC LIMIT 1",
                )?;
                row_or_none(stmt.query_row(params![key], row_tuple))
            })
            .await
            .map_err(Error::from)
            .map(|row| row.map(row_response))
    }

    /// Look a request key up in one named cache.
    pub async fn match_in(&self, cache: &str, key: &str) -> Result<Option<Response>, Error> {
        let cache = cache.to_string();
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<(i64, String, Vec<u8>)>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT status, headers_json, body FROM cache_entries
                     WHERE cache_name = ?1 AND key_hash = ?2",
                )?;
                row_or_none(stmt.query_row(params![cache, key], row_tuple))
            })
            .await
            .map_err(Error::from)
            .map(|row| row.map(row_response))
    }

    /// Store one entry in the named cache, overwriting any previous entry
    /// for the same key.
    pub async fn put(&self, cache: &str, entry: CacheEntry) -> Result<(), Error> {
        let cache = cache.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                upsert_entry(conn, &cache, &entry)?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Store a batch of entries in one transaction.
    ///
    /// Either every entry lands or none does; this is what makes
    /// install-time bulk population atomic.
    pub async fn put_many(&self, cache: &str, entries: Vec<CacheEntry>) -> Result<usize, Error> {
        let cache = cache.to_string();
        self.conn
            .call(move |conn| -> Result<usize, Error> {
                let tx = conn.transaction()?;
                for entry in &entries {
                    upsert_entry(&tx, &cache, entry)?;
                }
                tx.commit()?;
                Ok(entries.len())
            })
            .await
            .map_err(Error::from)
    }

    /// Every cache name that currently holds at least one entry.
    pub async fn cache_labels(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT DISTINCT cache_name FROM cache_entries ORDER BY cache_name")?;
                let labels = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(labels)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a whole named cache.
    ///
    /// Returns the number of deleted entries.
    pub async fn delete_cache(&self, cache: &str) -> Result<u64, Error> {
        let cache = cache.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM cache_entries WHERE cache_name = ?1", params![cache])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries in one named cache.
    pub async fn entry_count(&self, cache: &str) -> Result<u64, Error> {
        let cache = cache.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM cache_entries WHERE cache_name = ?1",
                    params![cache],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

fn row_tuple(row: &rusqlite::Row<'_>) -> rusqlite::Result<(i64, String, Vec<u8>)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

fn row_or_none<T>(result: rusqlite::Result<T>) -> Result<Option<T>, Error> {
    match result {
        Ok(row) => Ok(Some(row)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn row_response((status, headers_json, body): (i64, String, Vec<u8>)) -> Response {
    Response {
        status: StatusCode::from_u16(status as u16).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        headers: headers_from_json(&headers_json),
        body: Bytes::from(body),
    }
}

fn upsert_entry(conn: &rusqlite::Connection, cache: &str, entry: &CacheEntry) -> rusqlite::Result<usize> {
    conn.execute(
        UPSERT_SQL,
        params![
            cache,
            entry.key,
            entry.method,
            entry.url,
            entry.response.status.as_u16() as i64,
            headers_to_json(&entry.response.headers),
            entry.response.body.as_ref(),
            entry.stored_at,
        ],
    )
}

fn headers_to_json(headers: &HeaderMap) -> String {
    let pairs: Vec<(&str, &str)> = headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v)))
        .collect();
    serde_json::to_string(&pairs).unwrap_or_else(|_| "[]".to_string())
}

fn headers_from_json(raw: &str) -> HeaderMap {
    let pairs: Vec<(String, String)> = serde_json::from_str(raw).unwrap_or_default();
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(&value)) {
            headers.append(name, value);
        }
    }
    headers
}
