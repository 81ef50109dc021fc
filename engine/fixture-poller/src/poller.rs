//! Core FixturePoller implementation

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::client::FixtureSource;
use crate::clock::Clock;
use crate::config::PollerConfig;
use crate::error::PollerError;
use crate::models::FixtureRecord;
use crate::parser::format_fixture;
use crate::policy::{Activity, FetchPolicy, PollerState};
use crate::selection::select_fixture;

/// Serves the tracked team's current or next fixture, going upstream only when the fetch
/// policy allows it
pub struct FixturePoller {
    config: PollerConfig,
    tz: Tz,
    policy: FetchPolicy,
    source: Arc<dyn FixtureSource>,
    clock: Arc<dyn Clock>,
    // Held across check-and-fetch so counters move once per upstream attempt
    state: Mutex<PollerState>,
}

/// Snapshot of poller state for health checks
#[derive(Debug, Clone, Serialize)]
pub struct PollerStats {
    pub fetch_count_today: u32,
    pub last_fetch_time: Option<DateTime<Utc>>,
    pub last_fetch_date: Option<NaiveDate>,
    pub has_fixture: bool,
    pub activity: Option<Activity>,
}

impl FixturePoller {
    /// Create a new poller with empty state
    pub fn new(
        config: PollerConfig,
        source: Arc<dyn FixtureSource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, PollerError> {
        config.validate()?;
        let tz = config.tz()?;
        let policy = FetchPolicy::new(&config.policy, tz);

        info!(
            "Creating FixturePoller for team {} across {} competitions ({})",
            config.upstream.team_id,
            config.competitions.len(),
            config.timezone
        );

        Ok(Self { config, tz, policy, source, clock, state: Mutex::new(PollerState::default()) })
    }

    /// Current or next fixture.
    ///
    /// Never fails: when the policy blocks the request, or the upstream is down or has
    /// nothing, the previously cached fixture (possibly none) is returned as-is.
    pub async fn get_next_or_live_fixture(&self) -> Option<Arc<FixtureRecord>> {
        let mut state = self.state.lock().await;
        let now = self.clock.now();

        if !self.policy.should_fetch(&mut state, now) {
            debug!("Using cached fixture data");
            return state.cached_fixture.clone();
        }

        state.record_attempt(now);
        info!("Fetching fixture data (fetch #{} today)", state.fetch_count_today);

        match self.refresh(now).await {
            Ok(Some(fixture)) => {
                info!(
                    "Selected {} fixture: {} vs {} ({})",
                    fixture.league, fixture.home_team.name, fixture.away_team.name, fixture.status_display
                );
                state.cached_fixture = Some(Arc::new(fixture));
            }
            Ok(None) => warn!("No fixtures found in any competition"),
            Err(e) => error!("Error fetching fixtures: {}", e),
        }

        state.cached_fixture.clone()
    }

    /// Poll every competition and pick the best candidate
    async fn refresh(&self, now: DateTime<Utc>) -> Result<Option<FixtureRecord>, PollerError> {
        let team_id = self.config.upstream.team_id;
        let mut candidates = Vec::new();
        let mut failures = 0;

        for competition in &self.config.competitions {
            let response = match self.source.fetch_team(competition, team_id).await {
                Ok(response) => response,
                Err(e) => {
                    warn!("Skipping {}: {}", competition.name, e);
                    failures += 1;
                    continue;
                }
            };

            match response.next_event() {
                Some(event) => {
                    debug!("Found next event in {}", competition.name);
                    if let Some(fixture) = format_fixture(event, &competition.name, self.tz) {
                        candidates.push(fixture);
                    }
                }
                None => debug!("No upcoming event in {}", competition.name),
            }
        }

        if failures == self.config.competitions.len() {
            return Err(PollerError::AllSourcesFailed { attempted: failures });
        }

        Ok(select_fixture(candidates, now))
    }

    /// Cached fixture without touching the upstream or the counters
    pub async fn cached(&self) -> Option<Arc<FixtureRecord>> {
        self.state.lock().await.cached_fixture.clone()
    }

    /// Get poller statistics
    pub async fn stats(&self) -> PollerStats {
        let state = self.state.lock().await;
        let now = self.clock.now();

        PollerStats {
            fetch_count_today: state.fetch_count_today,
            last_fetch_time: state.last_fetch_time,
            last_fetch_date: state.last_fetch_date,
            has_fixture: state.cached_fixture.is_some(),
            activity: state.cached_fixture.as_ref().map(|f| self.policy.classify(f, now)),
        }
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }
}
