use thiserror::Error;

/// Errors from [`crate::directions::DirectionsProvider::directions`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectionsError {
    /// Fewer than two waypoints were provided.
    #[error("at least two waypoints are required, found {found}")]
    TooFewWaypoints {
        /// Number of waypoints supplied.
        found: usize,
    },

    /// The service refused to compute alternative routes for this request.
    ///
    /// Callers recover by repeating the request without alternatives.
    #[error("alternative routes are not supported for this request: {message}")]
    AlternativesUnsupported {
        /// Explanation returned by the service.
        message: String,
    },

    /// No drivable route connects the waypoints.
    #[error("no route found between the waypoints: {message}")]
    NoRoute {
        /// Explanation returned by the service.
        message: String,
    },

    /// The HTTP request timed out.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// The URL that was requested.
        url: String,
        /// The timeout duration in seconds.
        timeout_secs: u64,
    },

    /// The HTTP request returned an error status code.
    #[error("HTTP {status} from {url}: {message}")]
    HttpError {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// Error message from the response or reqwest.
        message: String,
    },

    /// A network error occurred (connection refused, DNS failure, etc.).
    #[error("network error requesting {url}: {message}")]
    NetworkError {
        /// The URL that was requested.
        url: String,
        /// Description of the network error.
        message: String,
    },

    /// The directions service returned an error response.
    #[error("directions service error ({code}): {message}")]
    ServiceError {
        /// Status code from the service (e.g. `"InvalidQuery"`).
        code: String,
        /// Error message from the service.
        message: String,
    },

    /// The response could not be parsed.
    #[error("failed to parse directions response: {message}")]
    ParseError {
        /// Description of the parse failure.
        message: String,
    },
}
