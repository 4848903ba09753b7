//! Errors reported by routing providers.

use thiserror::Error;

/// Errors raised when a routing service call fails outright.
///
/// A service answering "no route" or "zero results" is not an error; those
/// outcomes are reported as empty cells by [`RoutingProvider`](super::RoutingProvider).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Endpoint URL, without credentials.
        url: String,
        /// Timeout that elapsed.
        timeout_secs: u64,
    },
    /// The service answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}: {message}")]
    HttpError {
        /// Endpoint URL, without credentials.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
    },
    /// The service could not be reached.
    #[error("network error contacting {url}: {message}")]
    NetworkError {
        /// Endpoint URL, without credentials.
        url: String,
        /// Error description.
        message: String,
    },
    /// The service rejected the request, e.g. quota exceeded or denied key.
    #[error("routing service returned {status}: {message}")]
    ServiceError {
        /// Service status code such as `OVER_QUERY_LIMIT`.
        status: String,
        /// Service-provided explanation, possibly empty.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse routing response: {message}")]
    ParseError {
        /// Decoder error description.
        message: String,
    },
}
