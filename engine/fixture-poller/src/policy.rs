//! When to go upstream and when to serve the cache

use crate::config::PolicyConfig;
use crate::models::FixtureRecord;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Status fragments that mark a cached fixture as being played or just played
const ACTIVE_STATUS_MARKERS: &[&str] = &["FT", "LIVE"];

/// Poll cadence class of the cached fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    /// Live, finished, or kicking off today: poll every minute
    Active,
    /// Some other day: poll a few times a day
    Dormant,
}

/// State owned by the poller for the process lifetime
#[derive(Debug, Default)]
pub struct PollerState {
    /// Last upstream attempt, successful or not
    pub last_fetch_time: Option<DateTime<Utc>>,

    /// Display-timezone date `fetch_count_today` refers to
    pub last_fetch_date: Option<NaiveDate>,

    pub fetch_count_today: u32,

    pub cached_fixture: Option<Arc<FixtureRecord>>,
}

impl PollerState {
    /// Account for an upstream attempt starting at `now`
    pub fn record_attempt(&mut self, now: DateTime<Utc>) {
        self.last_fetch_time = Some(now);
        self.fetch_count_today += 1;
    }

    fn elapsed_since_fetch(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.last_fetch_time.map(|last| now - last)
    }
}

/// Adaptive rate gate in front of the upstream API
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    active_interval: Duration,
    dormant_interval: Duration,
    daily_quota: u32,
    tz: Tz,
}

impl FetchPolicy {
    pub fn new(config: &PolicyConfig, tz: Tz) -> Self {
        Self {
            active_interval: Duration::seconds(config.active_interval_secs as i64),
            dormant_interval: Duration::seconds(config.dormant_interval_secs as i64),
            daily_quota: config.daily_quota,
            tz,
        }
    }

    /// Calendar date of `now` in the display timezone
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.tz).date_naive()
    }

    /// Classify a cached fixture
    pub fn classify(&self, fixture: &FixtureRecord, now: DateTime<Utc>) -> Activity {
        if fixture.is_live {
            return Activity::Active;
        }

        if ACTIVE_STATUS_MARKERS.iter().any(|marker| fixture.status_display.contains(marker)) {
            return Activity::Active;
        }

        let today = self.today(now);
        match fixture.match_date {
            Some(kickoff) if kickoff.with_timezone(&self.tz).date_naive() == today => Activity::Active,
            _ => Activity::Dormant,
        }
    }

    /// Decide whether this request may go upstream.
    ///
    /// Rolls the daily counter over first; otherwise leaves `state` untouched.
    pub fn should_fetch(&self, state: &mut PollerState, now: DateTime<Utc>) -> bool {
        let today = self.today(now);
        if state.last_fetch_date != Some(today) {
            state.fetch_count_today = 0;
            state.last_fetch_date = Some(today);
        }

        let Some(cached) = state.cached_fixture.as_ref() else {
            return true;
        };

        let elapsed = state.elapsed_since_fetch(now);
        match self.classify(cached, now) {
            Activity::Active => elapsed.map_or(true, |e| e >= self.active_interval),
            Activity::Dormant => {
                if state.fetch_count_today >= self.daily_quota {
                    info!("Reached daily fetch limit ({}) for non-game day", self.daily_quota);
                    return false;
                }
                elapsed.map_or(true, |e| e >= self.dormant_interval)
            }
        }
    }
}
