//! Error types
//!
//! Only transport and startup failures surface as errors. Store and protocol
//! anomalies are answered with empty or zero results instead.

use thiserror::Error;

/// Crate-level error
#[derive(Error, Debug)]
pub enum Error {
    /// Socket I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP layer failed
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    /// WebSocket layer failed
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON encoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The hub task is no longer running
    #[error("sync hub has stopped")]
    HubClosed,
}

/// Configuration error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable held an unusable value
    #[error("invalid value for {name}: {value:?}")]
    InvalidVar { name: &'static str, value: String },

    /// Host and port did not form a socket address
    #[error("cannot resolve bind address {0:?}")]
    BindAddr(String),
}

/// Result alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;
