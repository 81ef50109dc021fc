//! ESPN site API integration

use crate::config::{CompetitionConfig, UpstreamConfig};
use crate::models::TeamResponse;
use crate::PollerError;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};

/// Source of per-competition team payloads
#[async_trait]
pub trait FixtureSource: Send + Sync {
    /// Fetch the team document for one competition
    async fn fetch_team(
        &self,
        competition: &CompetitionConfig,
        team_id: u32,
    ) -> Result<TeamResponse, PollerError>;
}

/// ESPN API client
#[derive(Debug, Clone)]
pub struct EspnClient {
    base_url: String,
    client: Client,
}

impl EspnClient {
    /// Create a new ESPN client with the configured request timeout
    pub fn new(config: &UpstreamConfig) -> Result<Self, PollerError> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self { base_url: config.base_url.trim_end_matches('/').to_string(), client })
    }

    /// Team endpoint for a competition
    pub fn team_url(&self, competition: &CompetitionConfig, team_id: u32) -> String {
        format!("{}/{}/teams/{}", self.base_url, competition.slug, team_id)
    }
}

#[async_trait]
impl FixtureSource for EspnClient {
    async fn fetch_team(
        &self,
        competition: &CompetitionConfig,
        team_id: u32,
    ) -> Result<TeamResponse, PollerError> {
        let url = self.team_url(competition, team_id);
        info!("Checking {} for fixtures: {}", competition.name, url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        info!("{} response status: {}", competition.name, status);

        if !status.is_success() {
            warn!("Could not fetch {} data: {}", competition.name, status);
            return Err(PollerError::UpstreamStatus {
                competition: competition.name.clone(),
                status: status.as_u16(),
            });
        }

        let payload: TeamResponse = response.json().await?;
        Ok(payload)
    }
}
