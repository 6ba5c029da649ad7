//! Unified error handling for the client.

use crate::config::ConfigError;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Engine error: {0}")]
    Engine(#[from] torrentview_engine::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("View stopped")]
    ViewClosed,
}

/// Result type alias for the client.
pub type Result<T> = std::result::Result<T, AppError>;
