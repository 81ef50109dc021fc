//! Dashboard Service Library
//!
//! HTTP back end for the e-ink dashboard: configuration loading, logging setup, the weather
//! and verse tiles, the rendered-image endpoint, and the wiring around the fixture poller.

use anyhow::{Context, Result};
use fixture_poller::{EspnClient, FixturePoller, SystemClock};
use std::path::Path;
use std::sync::Arc;

pub mod config;
pub mod error;
pub mod image;
pub mod logging;
pub mod rest_api;
pub mod signals;
pub mod verse;
pub mod weather;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use logging::initialize_logging;
pub use rest_api::{create_routes, AppState};
pub use signals::{graceful_shutdown, setup_signal_handlers};

/// Load configuration from an optional file and the environment
pub fn load_configuration(path: Option<&Path>) -> Result<ServiceConfig> {
    config::load_config(path).context("Failed to load service configuration")
}

/// Build handler state backed by the live ESPN and OpenWeatherMap APIs
pub fn build_state(config: &ServiceConfig) -> Result<Arc<AppState>> {
    let source = EspnClient::new(&config.poller.upstream).context("Failed to create ESPN client")?;
    let poller = FixturePoller::new(config.poller.clone(), Arc::new(source), Arc::new(SystemClock))
        .context("Failed to create fixture poller")?;

    let tz = config.poller.tz()?;
    let weather = weather::WeatherClient::new(config.weather.clone(), tz)
        .context("Failed to create weather client")?;

    Ok(Arc::new(AppState {
        poller: Arc::new(poller),
        weather: Arc::new(weather),
        image_path: config.server.image_path.clone(),
    }))
}
