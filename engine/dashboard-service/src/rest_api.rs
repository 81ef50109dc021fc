//! REST API endpoints for the dashboard
//!
//! JSON data for the dashboard tiles plus the rendered image for the e-ink device.

use fixture_poller::FixturePoller;
use serde::Serialize;
use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, warn};
use warp::http::StatusCode;
use warp::{Filter, Reply};

use crate::error::ServiceError;
use crate::image;
use crate::verse::current_verse;
use crate::weather::WeatherClient;

/// Shared handler dependencies
pub struct AppState {
    pub poller: Arc<FixturePoller>,
    pub weather: Arc<WeatherClient>,
    pub image_path: PathBuf,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
    pub timestamp: String,
}

/// Error detail
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

fn error_reply(status: StatusCode, code: &str, message: &str) -> warp::reply::Response {
    let body = ErrorResponse {
        error: ErrorDetail { code: code.to_string(), message: message.to_string() },
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    warp::reply::with_status(warp::reply::json(&body), status).into_response()
}

/// Current or next fixture for the tracked team
pub async fn get_fixture(poller: Arc<FixturePoller>) -> Result<warp::reply::Response, Infallible> {
    let fixture = poller.get_next_or_live_fixture().await;
    Ok(fixture_reply(fixture.as_deref()))
}

fn fixture_reply<T: Serialize>(fixture: Option<&T>) -> warp::reply::Response {
    let Some(fixture) = fixture else {
        debug!("No fixture available");
        return error_reply(StatusCode::NOT_FOUND, "FIXTURE_NOT_FOUND", "No fixture data available");
    };

    match serde_json::to_value(fixture) {
        Ok(body) => warp::reply::json(&body).into_response(),
        Err(e) => {
            error!("Failed to serialize fixture: {}", e);
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "Unexpected failure")
        }
    }
}

/// Current weather tile
pub async fn get_weather(weather: Arc<WeatherClient>) -> Result<warp::reply::Response, Infallible> {
    match weather.fetch_summary().await {
        Ok(summary) => Ok(warp::reply::json(&summary).into_response()),
        Err(e) => {
            match &e {
                ServiceError::MissingApiKey { .. } => warn!("Weather unavailable: {}", e),
                _ => error!("Error fetching weather data: {}", e),
            }
            Ok(error_reply(StatusCode::SERVICE_UNAVAILABLE, "WEATHER_UNAVAILABLE", &e.to_string()))
        }
    }
}

/// Create REST API routes
pub fn create_routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let poller = state.poller.clone();
    let poller_filter = warp::any().map(move || poller.clone());
    let weather = state.weather.clone();
    let weather_filter = warp::any().map(move || weather.clone());
    let image_path = state.image_path.clone();
    let image_filter = warp::any().map(move || image_path.clone());

    // Fixture endpoint
    let fixture = warp::path("api")
        .and(warp::path("fixture"))
        .and(warp::path::end())
        .and(warp::get())
        .and(poller_filter.clone())
        .and_then(get_fixture);

    // Rendered image endpoint
    let current_image = warp::path("api")
        .and(warp::path("current_image"))
        .and(warp::path::end())
        .and(warp::get())
        .and(image_filter)
        .and(warp::header::optional::<String>("if-modified-since"))
        .and_then(image::current_image);

    // Weather endpoint
    let weather = warp::path("api")
        .and(warp::path("weather"))
        .and(warp::path::end())
        .and(warp::get())
        .and(weather_filter)
        .and_then(get_weather);

    // Verse endpoint
    let verse = warp::path("api")
        .and(warp::path("verse"))
        .and(warp::path::end())
        .and(warp::get())
        .map(|| warp::reply::json(&current_verse()).into_response());

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(poller_filter)
        .then(|poller: Arc<FixturePoller>| async move {
            let stats = poller.stats().await;
            warp::reply::json(&serde_json::json!({
                "status": "healthy",
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "fixtures": stats,
            }))
            .into_response()
        });

    // Combine all routes
    fixture
        .or(current_image)
        .or(weather)
        .or(verse)
        .or(health)
        .with(warp::cors().allow_any_origin().allow_methods(vec!["GET", "OPTIONS"]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeatherConfig;
    use chrono::TimeZone;
    use fixture_poller::testing::{live_team, ScriptedSource};
    use fixture_poller::{ManualClock, PollerConfig};

    struct TestApp {
        state: Arc<AppState>,
        source: Arc<ScriptedSource>,
        _dir: tempfile::TempDir,
    }

    fn create_test_app() -> TestApp {
        create_test_app_with(WeatherConfig {
            api_key_env: "DASHBOARD_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..Default::default()
        })
    }

    fn create_test_app_with(weather_config: WeatherConfig) -> TestApp {
        let config = PollerConfig { timezone: "UTC".to_string(), ..Default::default() };
        let source = Arc::new(ScriptedSource::new());
        let clock = Arc::new(ManualClock::new(chrono::Utc.with_ymd_and_hms(2025, 3, 15, 15, 30, 0).unwrap()));
        let poller = Arc::new(FixturePoller::new(config, source.clone(), clock).unwrap());

        let weather = Arc::new(WeatherClient::new(weather_config, chrono_tz::UTC).unwrap());

        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("current_image.png");

        TestApp { state: Arc::new(AppState { poller, weather, image_path }), source, _dir: dir }
    }

    #[tokio::test]
    async fn test_fixture_not_found() {
        let app = create_test_app();
        let routes = create_routes(app.state.clone());

        let response = warp::test::request().method("GET").path("/api/fixture").reply(&routes).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["error"]["code"], "FIXTURE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_fixture_found() {
        let app = create_test_app();
        app.source.respond("uefa.champions", live_team("Chelsea", "Barcelona", "34", 1));
        let routes = create_routes(app.state.clone());

        let response = warp::test::request().method("GET").path("/api/fixture").reply(&routes).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["is_live"], true);
        assert_eq!(body["status_display"], "34' 1H");
        assert_eq!(body["league"], "Champions League");
        assert_eq!(body["home_team"]["name"], "Chelsea");
        assert!(body["match_date"].is_null());
    }

    #[tokio::test]
    async fn test_weather_without_key_is_unavailable() {
        let app = create_test_app();
        let routes = create_routes(app.state.clone());

        let response = warp::test::request().method("GET").path("/api/weather").reply(&routes).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_weather_upstream_failure_is_unavailable() {
        std::env::set_var("DASHBOARD_TEST_ROUTE_WEATHER_KEY", "test-key");
        let app = create_test_app_with(WeatherConfig {
            api_url: "http://127.0.0.1:1/data/2.5/weather".to_string(),
            api_key_env: "DASHBOARD_TEST_ROUTE_WEATHER_KEY".to_string(),
            timeout_secs: 2,
            ..Default::default()
        });
        let routes = create_routes(app.state.clone());

        let response = warp::test::request().method("GET").path("/api/weather").reply(&routes).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["error"]["code"], "WEATHER_UNAVAILABLE");
        assert!(body["error"]["message"].as_str().unwrap().starts_with("HTTP error"));
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("record cannot be encoded"))
        }
    }

    #[test]
    fn test_fixture_serialization_failure_is_internal_error() {
        let response = fixture_reply(Some(&Unserializable));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let missing: Option<&Unserializable> = None;
        assert_eq!(fixture_reply(missing).status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_missing_image() {
        let app = create_test_app();
        let routes = create_routes(app.state.clone());

        let response =
            warp::test::request().method("GET").path("/api/current_image").reply(&routes).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["error"], "Image not found");
    }

    #[tokio::test]
    async fn test_image_conditional_get() {
        let app = create_test_app();
        tokio::fs::write(&app.state.image_path, b"\x89PNG\r\n\x1a\n").await.unwrap();
        let routes = create_routes(app.state.clone());

        let response =
            warp::test::request().method("GET").path("/api/current_image").reply(&routes).await;
        assert_eq!(response.status(), StatusCode::OK);
        let last_modified = response.headers()["last-modified"].to_str().unwrap().to_string();

        let response = warp::test::request()
            .method("GET")
            .path("/api/current_image")
            .header("if-modified-since", last_modified)
            .reply(&routes)
            .await;
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);

        let response = warp::test::request()
            .method("GET")
            .path("/api/current_image")
            .header("if-modified-since", "Thu, 01 Jan 1970 00:00:00 GMT")
            .reply(&routes)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_verse_and_health() {
        let app = create_test_app();
        let routes = create_routes(app.state.clone());

        let response = warp::test::request().method("GET").path("/api/verse").reply(&routes).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["reference"], "Proverbs 16:3");

        let response = warp::test::request().method("GET").path("/health").reply(&routes).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["fixtures"]["fetch_count_today"], 0);
        assert_eq!(app.source.calls(), 0);
    }
}
