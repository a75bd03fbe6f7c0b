use std::path::PathBuf;

use thiserror::Error;

/// Result type for fetch pipeline operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors that can occur while fetching and recording remote photos
#[derive(Error, Debug)]
pub enum FetchError {
    /// The dedup ledger could not be reached or rejected the operation
    #[error("Ledger unavailable: {source}")]
    StoreUnavailable {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Network failure, non-success HTTP status, timeout or remote API error
    #[error("Fetch failed for {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    /// Writing the local file failed
    #[error("Persist failed for {}: {source}", path.display())]
    PersistFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Create a ledger error from any error type
    pub fn store_unavailable<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::StoreUnavailable {
            source: Box::new(error),
        }
    }

    /// Create a fetch failure
    pub fn fetch_failed<U: Into<String>, R: Into<String>>(url: U, reason: R) -> Self {
        Self::FetchFailed {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a persist failure
    pub fn persist_failed<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::PersistFailed {
            path: path.into(),
            source,
        }
    }

    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }

    pub fn is_fetch_failed(&self) -> bool {
        matches!(self, Self::FetchFailed { .. })
    }

    pub fn is_persist_failed(&self) -> bool {
        matches!(self, Self::PersistFailed { .. })
    }
}

impl From<sqlx::Error> for FetchError {
    fn from(error: sqlx::Error) -> Self {
        Self::store_unavailable(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_target() {
        let err = FetchError::fetch_failed("https://cdn.example/p.jpg", "HTTP 404 Not Found");
        assert_eq!(
            err.to_string(),
            "Fetch failed for https://cdn.example/p.jpg: HTTP 404 Not Found"
        );
        assert!(err.is_fetch_failed());

        let err = FetchError::persist_failed(
            "downloads/7_42.jpg",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "Persist failed for downloads/7_42.jpg: denied");
        assert!(err.is_persist_failed());
    }

    #[test]
    fn sqlx_errors_are_ledger_errors() {
        let err: FetchError = sqlx::Error::PoolTimedOut.into();
        assert!(err.is_store_unavailable());
    }
}
