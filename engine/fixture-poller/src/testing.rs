//! Scripted upstream for exercising the poller without network access

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::client::FixtureSource;
use crate::config::CompetitionConfig;
use crate::models::TeamResponse;
use crate::PollerError;

#[derive(Debug, Clone)]
enum Reply {
    Document(Value),
    Status(u16),
}

/// `FixtureSource` that answers from a per-competition script and counts calls.
///
/// Competitions without a script answer with a team document that has no next event.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    replies: Mutex<HashMap<String, Reply>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `slug` with a team document
    pub fn respond(&self, slug: &str, document: Value) {
        self.replies_mut().insert(slug.to_string(), Reply::Document(document));
    }

    /// Answer `slug` with a non-2xx status
    pub fn fail(&self, slug: &str, status: u16) {
        self.replies_mut().insert(slug.to_string(), Reply::Status(status));
    }

    /// Total upstream calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn replies_mut(&self) -> std::sync::MutexGuard<'_, HashMap<String, Reply>> {
        self.replies.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl FixtureSource for ScriptedSource {
    async fn fetch_team(
        &self,
        competition: &CompetitionConfig,
        _team_id: u32,
    ) -> Result<TeamResponse, PollerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let reply = self.replies_mut().get(&competition.slug).cloned();
        match reply {
            Some(Reply::Document(document)) => serde_json::from_value(document).map_err(|e| {
                PollerError::Config(format!("scripted document for {} is invalid: {}", competition.slug, e))
            }),
            Some(Reply::Status(status)) => {
                Err(PollerError::UpstreamStatus { competition: competition.name.clone(), status })
            }
            None => Ok(TeamResponse::default()),
        }
    }
}

/// Team document with a scheduled next event kicking off at `date` (RFC 3339)
pub fn scheduled_team(home: &str, away: &str, date: &str) -> Value {
    team_document(home, away, date, json!({ "type": { "name": "STATUS_SCHEDULED", "shortDetail": "TBD" } }))
}

/// Team document with an in-progress next event
pub fn live_team(home: &str, away: &str, clock: &str, period: i64) -> Value {
    team_document(
        home,
        away,
        "",
        json!({
            "displayClock": clock,
            "period": period,
            "type": { "name": "STATUS_IN_PROGRESS", "shortDetail": format!("{}'", clock) },
        }),
    )
}

/// Team document with a finished next event
pub fn finished_team(home: &str, away: &str) -> Value {
    team_document(home, away, "", json!({ "type": { "name": "STATUS_FINAL", "shortDetail": "FT" } }))
}

fn team_document(home: &str, away: &str, date: &str, status: Value) -> Value {
    json!({
        "team": {
            "nextEvent": [{
                "competitions": [{
                    "date": date,
                    "status": status,
                    "competitors": [
                        { "homeAway": "home", "score": "1", "team": { "displayName": home, "logos": [] } },
                        { "homeAway": "away", "score": "0", "team": { "displayName": away, "logos": [] } },
                    ],
                }],
            }],
        },
    })
}
