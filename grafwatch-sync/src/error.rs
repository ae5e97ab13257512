//! Error types for grafwatch-sync.

use thiserror::Error;

/// Failure of a single call to the dashboard service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, TLS or timeout failure before a status was received.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<ureq::Transport>,
    },

    /// The service answered with a non-2xx status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The entry payload is not a JSON document; nothing was sent.
    #[error("payload is not valid JSON: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

/// Errors from the sync crate's own bookkeeping.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Metric registration or encoding failure.
    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Map a `ureq` error for `url` into an [`ApiError`].
pub(crate) fn api_err(url: &str, err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Status(status, _) => ApiError::Status {
            url: url.to_string(),
            status,
        },
        ureq::Error::Transport(transport) => ApiError::Transport {
            url: url.to_string(),
            source: Box::new(transport),
        },
    }
}
