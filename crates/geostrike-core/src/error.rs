//! Error types for the engine's external boundaries.

use thiserror::Error;

/// Failure to obtain the player's location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// Failure of an authoritative write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("no auth token for {operation}")]
    MissingToken { operation: &'static str },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// Failure of the local vitals cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache data malformed: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Failure to load or validate configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type ApiResult<T> = Result<T, ApiError>;
