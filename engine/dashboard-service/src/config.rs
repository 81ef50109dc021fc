//! Service configuration management

use config::{Config, Environment, File};
use fixture_poller::PollerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ServiceError;

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server settings
    pub server: ServerSettings,

    /// Fixture poller configuration
    pub poller: PollerConfig,

    /// Weather adapter configuration
    pub weather: WeatherConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Rendered dashboard image served at /api/current_image
    pub image_path: PathBuf,

    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_secs: u64,
}

/// OpenWeatherMap settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Current weather endpoint
    pub api_url: String,

    /// Name of the environment variable holding the API key
    pub api_key_env: String,

    pub latitude: f64,
    pub longitude: f64,

    /// "metric", "imperial" or "standard"
    pub units: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, anything else for compact text)
    pub format: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            image_path: PathBuf::from("static/images/current_image.png"),
            shutdown_timeout_secs: 10,
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openweathermap.org/data/2.5/weather".to_string(),
            api_key_env: "OPEN_WEATHER_MAP_SECRET".to_string(),
            // Boston
            latitude: 42.3611,
            longitude: -71.058,
            units: "metric".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

/// Load configuration from an optional TOML file, then `DASHBOARD_*` environment variables
/// (`__` separates nested keys, e.g. `DASHBOARD_SERVER__PORT`), then the poller's own
/// `FIXTURES_*` overrides
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ServiceError> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        tracing::debug!("Loading configuration from file: {:?}", path);
        builder = builder.add_source(File::from(path).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix("DASHBOARD").prefix_separator("_").separator("__"),
    );

    let mut config: ServiceConfig = builder.build()?.try_deserialize()?;
    config.poller.apply_env_overrides();

    validate_config(&config)?;

    Ok(config)
}

/// Validate configuration
pub fn validate_config(config: &ServiceConfig) -> Result<(), ServiceError> {
    config.poller.validate()?;

    if config.server.port == 0 {
        return Err(ServiceError::InvalidConfig { message: "server.port must not be 0".to_string() });
    }

    match config.weather.units.as_str() {
        "metric" | "imperial" | "standard" => {}
        other => {
            return Err(ServiceError::InvalidConfig {
                message: format!("unknown weather units '{}'", other),
            })
        }
    }

    Ok(())
}
