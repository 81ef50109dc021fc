//! Error types for the dashboard service

use fixture_poller::PollerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("API key not found in environment variable {env}")]
    MissingApiKey { env: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid weather data received: {message}")]
    InvalidWeatherPayload { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Poller error: {0}")]
    Poller(#[from] PollerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
