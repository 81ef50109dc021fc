//! Error types for the fixture poller

use thiserror::Error;

/// Errors raised inside the poller.
///
/// None of these cross the `get_next_or_live_fixture` boundary; they are logged and the
/// cached fixture is returned instead.
#[derive(Error, Debug)]
pub enum PollerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{competition} returned status {status}")]
    UpstreamStatus { competition: String, status: u16 },

    #[error("All {attempted} competitions failed")]
    AllSourcesFailed { attempted: usize },

    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}
