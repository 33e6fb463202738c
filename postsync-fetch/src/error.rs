//! Error types for postsync-fetch.

use thiserror::Error;

/// Network-level failures. Always recovered by the caller: logged, counted,
/// and the run moves on.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, DNS, TLS or timeout failure — the host was never reached.
    #[error("could not reach {url}: {message}")]
    Unreachable { url: String, message: String },

    #[error("{url} not found (HTTP 404)")]
    NotFound { url: String },

    #[error("{url} is rate limited (HTTP {status})")]
    RateLimited { url: String, status: u16 },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// The listing endpoint answered with something other than a file list.
    #[error("unexpected directory listing from {url}: {source}")]
    Listing {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A body fetch that failed for one file of a member's listing.
#[derive(Debug, Error)]
#[error("failed to fetch {filename}: {source}")]
pub struct PostFetchError {
    pub filename: String,
    #[source]
    pub source: TransportError,
}

impl TransportError {
    /// Map a non-200 HTTP status onto the matching variant.
    pub fn from_status(url: &str, status: u16) -> Self {
        let url = url.to_string();
        match status {
            404 => TransportError::NotFound { url },
            403 | 429 => TransportError::RateLimited { url, status },
            _ => TransportError::Status { url, status },
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, TransportError::Unreachable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(matches!(
            TransportError::from_status("u", 404),
            TransportError::NotFound { .. }
        ));
        assert!(matches!(
            TransportError::from_status("u", 403),
            TransportError::RateLimited { status: 403, .. }
        ));
        assert!(matches!(
            TransportError::from_status("u", 429),
            TransportError::RateLimited { status: 429, .. }
        ));
        assert!(matches!(
            TransportError::from_status("u", 500),
            TransportError::Status { status: 500, .. }
        ));
        assert!(!TransportError::from_status("u", 500).is_unreachable());
    }
}
