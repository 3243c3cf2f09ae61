//! Unified error types for petrel.
//!
//! A cache miss is deliberately not represented here: lookups return
//! `Option` and a miss falls through to the next strategy layer.

use tokio_rusqlite::rusqlite;

/// Unified error type shared across the petrel crates.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network request failed (connectivity loss, DNS, reset).
    #[error("NETWORK: {0}")]
    Network(String),

    /// Network request exceeded the configured timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Response body exceeded the configured byte cap.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// A manifest URL could not be precached during install.
    #[error("PRECACHE_FAILED: {url}: {reason}")]
    Precache { url: String, reason: String },

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// URL that cannot be parsed or joined against the configured origin.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Sync-queue backend failure.
    #[error("QUEUE_ERROR: {0}")]
    Queue(String),

    /// Lifecycle operation failed or was attempted from the wrong state.
    #[error("LIFECYCLE: {0}")]
    Lifecycle(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Network("connection refused".to_string());
        assert!(err.to_string().contains("NETWORK"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_precache_display() {
        let err = Error::Precache { url: "https://cdn.example.com/app.css".into(), reason: "status 404".into() };
        assert!(err.to_string().contains("PRECACHE_FAILED"));
        assert!(err.to_string().contains("app.css"));
        assert!(err.to_string().contains("404"));
    }
}
