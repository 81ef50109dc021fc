//! OpenWeatherMap current-weather adapter

use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

use crate::config::WeatherConfig;
use crate::error::ServiceError;

const DEFAULT_ICON: &str = "01d";

/// Weather tile data for the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSummary {
    pub temp: i64,
    pub feels_like: i64,
    pub condition: String,
    pub icon: String,
    pub humidity: i64,
    pub wind_speed: i64,
    pub units: String,
    /// Observation time in the display timezone, e.g. "03:15 PM"
    pub last_updated: String,
    pub icon_url: String,
}

/// OpenWeatherMap `/data/2.5/weather` response
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CurrentWeather {
    /// 200 on success; a string on some error responses
    pub cod: Option<serde_json::Value>,
    pub dt: Option<i64>,
    pub main: MainReadings,
    pub weather: Vec<Condition>,
    pub wind: Wind,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MainReadings {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Condition {
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Wind {
    pub speed: f64,
}

/// OpenWeatherMap client
#[derive(Debug)]
pub struct WeatherClient {
    config: WeatherConfig,
    client: Client,
    tz: Tz,
}

impl WeatherClient {
    pub fn new(config: WeatherConfig, tz: Tz) -> Result<Self, ServiceError> {
        let client = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
        Ok(Self { config, client, tz })
    }

    /// Fetch current conditions for the configured location
    pub async fn fetch_summary(&self) -> Result<WeatherSummary, ServiceError> {
        let api_key = std::env::var(&self.config.api_key_env)
            .map_err(|_| ServiceError::MissingApiKey { env: self.config.api_key_env.clone() })?;

        info!(
            "Fetching weather for ({}, {}) in {} units",
            self.config.latitude, self.config.longitude, self.config.units
        );

        let response = self
            .client
            .get(&self.config.api_url)
            .query(&[
                ("lat", self.config.latitude.to_string()),
                ("lon", self.config.longitude.to_string()),
                ("units", self.config.units.clone()),
                ("appid", api_key),
            ])
            .send()
            .await?
            .error_for_status()?;

        let weather: CurrentWeather = response.json().await?;
        summarize(&weather, &self.config.units, self.tz)
    }
}

/// Shape an API response into the dashboard tile
pub fn summarize(weather: &CurrentWeather, units: &str, tz: Tz) -> Result<WeatherSummary, ServiceError> {
    let ok = match &weather.cod {
        Some(serde_json::Value::Number(n)) => n.as_i64() == Some(200),
        Some(serde_json::Value::String(s)) => s == "200",
        _ => false,
    };
    if !ok {
        error!("Invalid weather data received: cod={:?}", weather.cod);
        return Err(ServiceError::InvalidWeatherPayload {
            message: format!("unexpected cod {:?}", weather.cod),
        });
    }

    let observed = weather
        .dt
        .and_then(|dt| Utc.timestamp_opt(dt, 0).single())
        .ok_or_else(|| ServiceError::InvalidWeatherPayload { message: "missing dt".to_string() })?;

    let condition = weather.weather.first();
    let icon = condition.and_then(|c| c.icon.clone()).unwrap_or_else(|| DEFAULT_ICON.to_string());
    let description = condition.and_then(|c| c.description.clone()).unwrap_or_else(|| "N/A".to_string());

    Ok(WeatherSummary {
        temp: weather.main.temp.round() as i64,
        feels_like: weather.main.feels_like.round() as i64,
        condition: title_case(&description),
        humidity: weather.main.humidity.round() as i64,
        wind_speed: weather.wind.speed.round() as i64,
        units: units.to_string(),
        last_updated: observed.with_timezone(&tz).format("%I:%M %p").to_string(),
        icon_url: format!("http://openweathermap.org/img/wn/{}@2x.png", icon),
        icon,
    })
}

/// "scattered clouds" -> "Scattered Clouds"; a letter after any non-letter starts a word
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            out.push(c);
            word_start = true;
        }
    }
    out
}
