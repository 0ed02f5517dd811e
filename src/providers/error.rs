//! Error types for provider clients.

use thiserror::Error;

/// Failure talking to an external content provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport failure or undecodable body.
    #[error("{provider} request failed: {source}")]
    Request {
        /// Provider name.
        provider: &'static str,
        /// Underlying client error.
        source: reqwest::Error,
    },
    /// Provider answered with a non-success status.
    #[error("{provider} returned status {status}: {body}")]
    Status {
        /// Provider name.
        provider: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },
    /// Request URL could not be built.
    #[error("invalid provider url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ProviderError {
    /// Upstream status code, when the provider answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Upstream response body, when available.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Convenience result alias for provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;
