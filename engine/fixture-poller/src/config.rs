//! Configuration for the fixture poller

use crate::{
    PollerError, DEFAULT_ACTIVE_INTERVAL_SECS, DEFAULT_BASE_URL, DEFAULT_DAILY_QUOTA,
    DEFAULT_DORMANT_INTERVAL_SECS, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_TEAM_ID,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the FixturePoller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Upstream API configuration
    pub upstream: UpstreamConfig,

    /// Competitions to check, highest priority first
    pub competitions: Vec<CompetitionConfig>,

    /// IANA timezone used for "today" and for display strings
    pub timezone: String,

    /// Fetch policy configuration
    pub policy: PolicyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// ESPN soccer API root
    pub base_url: String,

    /// ESPN team identifier
    pub team_id: u32,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// A league or cup to check for the team's next event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitionConfig {
    /// ESPN league slug (e.g., "eng.1")
    pub slug: String,

    /// Display label (e.g., "Premier League")
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Minimum seconds between polls while the cached fixture is live or today
    pub active_interval_secs: u64,

    /// Minimum seconds between polls otherwise
    pub dormant_interval_secs: u64,

    /// Maximum polls per day while dormant
    pub daily_quota: u32,
}

impl CompetitionConfig {
    pub fn new(slug: &str, name: &str) -> Self {
        Self { slug: slug.to_string(), name: name.to_string() }
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            upstream: UpstreamConfig::default(),
            competitions: vec![
                CompetitionConfig::new("eng.1", "Premier League"),
                CompetitionConfig::new("uefa.champions", "Champions League"),
                CompetitionConfig::new("eng.league_cup", "Carabao Cup"),
                CompetitionConfig::new("eng.fa", "FA Cup"),
            ],
            timezone: "America/New_York".to_string(),
            policy: PolicyConfig::default(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            team_id: DEFAULT_TEAM_ID,
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            active_interval_secs: DEFAULT_ACTIVE_INTERVAL_SECS,
            dormant_interval_secs: DEFAULT_DORMANT_INTERVAL_SECS,
            daily_quota: DEFAULT_DAILY_QUOTA,
        }
    }
}

impl UpstreamConfig {
    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PollerConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self, PollerError> {
        let content = std::fs::read_to_string(path)?;
        let config: PollerConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Override with environment variables if present
    pub fn apply_env_overrides(&mut self) {
        if let Ok(team_id) = std::env::var("FIXTURES_TEAM_ID") {
            match team_id.parse() {
                Ok(id) => self.upstream.team_id = id,
                Err(_) => tracing::warn!("Ignoring invalid FIXTURES_TEAM_ID: {}", team_id),
            }
        }

        if let Ok(timezone) = std::env::var("FIXTURES_TIMEZONE") {
            self.timezone = timezone;
        }

        if let Ok(base_url) = std::env::var("FIXTURES_BASE_URL") {
            self.upstream.base_url = base_url;
        }
    }

    /// Parse the configured display timezone
    pub fn tz(&self) -> Result<Tz, PollerError> {
        self.timezone.parse::<Tz>().map_err(|_| PollerError::InvalidTimezone(self.timezone.clone()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), PollerError> {
        self.tz()?;

        if self.competitions.is_empty() {
            return Err(PollerError::Config("at least one competition is required".to_string()));
        }

        if self.policy.daily_quota == 0 {
            return Err(PollerError::Config("daily_quota must be greater than 0".to_string()));
        }

        if self.upstream.timeout_secs == 0 {
            return Err(PollerError::Config("timeout_secs must be greater than 0".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = PollerConfig::default();
        assert_eq!(config.upstream.team_id, DEFAULT_TEAM_ID);
        assert_eq!(config.upstream.timeout(), Duration::from_secs(10));
        assert_eq!(config.policy.dormant_interval_secs, 17_280);
        assert_eq!(config.competitions[0].slug, "eng.1");
        assert_eq!(config.competitions.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_timezone() {
        let config = PollerConfig { timezone: "Mars/Olympus".to_string(), ..Default::default() };
        assert!(matches!(config.validate(), Err(PollerError::InvalidTimezone(_))));
    }

    #[test]
    fn test_validate_rejects_empty_competitions() {
        let config = PollerConfig { competitions: Vec::new(), ..Default::default() };
        assert!(matches!(config.validate(), Err(PollerError::Config(_))));
    }

    #[test]
    fn test_from_file_fills_missing_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
timezone = "Europe/London"

[policy]
daily_quota = 3

[[competitions]]
slug = "eng.1"
name = "Premier League"
"#
        )
        .unwrap();

        let config = PollerConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.timezone, "Europe/London");
        assert_eq!(config.policy.daily_quota, 3);
        assert_eq!(config.policy.active_interval_secs, DEFAULT_ACTIVE_INTERVAL_SECS);
        assert_eq!(config.competitions, vec![CompetitionConfig::new("eng.1", "Premier League")]);
        assert_eq!(config.upstream.base_url, DEFAULT_BASE_URL);
    }
}
