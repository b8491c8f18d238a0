//! Error types for fetching offers and loading configuration

use thiserror::Error;

/// Why an offers request produced no data
///
/// Kept `Clone` so one resolution can be handed to every caller sharing an
/// in-flight request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Failed to reach offers endpoint: {message}")]
    Transport { message: String },

    #[error("Offers endpoint returned status: {status}")]
    Http { status: u16 },

    #[error("Failed to decode offers body: {message}")]
    Decode { message: String },
}

pub type FetchResult<T> = Result<T, FetchError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Offers endpoint is not configured (set {0})")]
    MissingEndpoint(&'static str),

    #[error("Invalid offers endpoint {value:?}: {reason}")]
    InvalidEndpoint { value: String, reason: String },
}
