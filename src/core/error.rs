//! Error types for the fujinav engine
//!
//! Two layers: `BackendError` is what an adapter reports about one backend
//! call, `Error` is the client-facing taxonomy the HTTP layer turns into a
//! status code and an in-band message.

use thiserror::Error;

/// Main error type for fujinav operations
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed coordinates, unknown mode/unit token or a bad request body
    #[error("{0}")]
    InvalidInput(String),

    /// Geocoding found nothing for the query
    #[error("no results found for query: {0}")]
    NoResults(String),

    /// Backend unreachable, timed out, or answered with garbage
    #[error("{0}")]
    ProviderUnavailable(String),

    /// Backend reached but it declined to route the given points
    #[error("{0}")]
    ProviderRoutingError(String),

    /// A backend was selected that the configuration does not fully describe
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Outcome of a failed adapter call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    /// Origin and destination are not connected in the transport network
    #[error("no route found: locations are not connected in the transportation network")]
    NotConnected,

    /// Structured backend error other than `NotConnected`
    #[error("routing error: {message}")]
    Rejected { code: i64, message: String },

    /// Transport failure, non-success status without a usable body, or an
    /// undecodable payload
    #[error("{0}")]
    ProviderFailure(String),

    /// Itinerary backend answered with an empty plan
    #[error("no route found")]
    NoItinerary,

    /// Selected backend lacks required configuration
    #[error("{0}")]
    NotConfigured(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::ProviderFailure(format!("backend request timed out: {err}"))
        } else if err.is_connect() {
            BackendError::ProviderFailure(format!("could not connect to backend: {err}"))
        } else {
            BackendError::ProviderFailure(format!("backend request failed: {err}"))
        }
    }
}

impl From<BackendError> for Error {
    fn from(err: BackendError) -> Self {
        let message = err.to_string();
        match err {
            BackendError::ProviderFailure(_) => Error::ProviderUnavailable(message),
            BackendError::NotConnected
            | BackendError::Rejected { .. }
            | BackendError::NoItinerary => Error::ProviderRoutingError(message),
            BackendError::NotConfigured(msg) => Error::Configuration(msg),
        }
    }
}

/// Convenience result type for fujinav operations
pub type Result<T> = std::result::Result<T, Error>;
