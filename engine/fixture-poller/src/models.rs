//! Dashboard fixture records and the ESPN payload they are built from

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

/// Fixture shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureRecord {
    pub home_team: TeamInfo,
    pub away_team: TeamInfo,

    /// "H - A"
    pub score: String,

    /// "HT", "FT", "72' 2H", "15 Mar 14:00", ...
    pub status_display: String,

    pub is_live: bool,

    /// Competition the event came from
    pub league: String,

    /// Kickoff in the display timezone, only for scheduled matches with a parseable date
    pub match_date: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamInfo {
    pub name: String,

    /// Logo URL, empty when the upstream has none
    pub logo: String,
}

/// ESPN `teams/{id}` response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TeamResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub team: TeamPayload,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub next_event: Vec<EspnEvent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EspnEvent {
    #[serde(deserialize_with = "null_as_default")]
    pub competitions: Vec<EspnCompetition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EspnCompetition {
    pub date: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub competitors: Vec<EspnCompetitor>,
    pub status: Option<EspnStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EspnCompetitor {
    /// "home" or "away"
    pub home_away: Option<String>,
    pub team: Option<EspnTeam>,
    pub score: Option<EspnScore>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EspnTeam {
    pub display_name: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub logos: Vec<EspnLogo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EspnLogo {
    pub href: Option<String>,
}

/// Score as it appears in the payload: a plain string on some endpoints, a number or a
/// `{ value, displayValue }` object on others. Anything else is kept as `Other` and shown as 0.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EspnScore {
    Text(String),
    Number(f64),
    Detailed {
        #[serde(rename = "displayValue")]
        display_value: Option<String>,
        value: Option<f64>,
    },
    Other(serde_json::Value),
}

/// An explicit `null` decodes like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EspnStatus {
    pub display_clock: Option<String>,
    pub period: Option<i64>,
    #[serde(rename = "type")]
    pub status_type: Option<EspnStatusType>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EspnStatusType {
    /// e.g. "STATUS_SCHEDULED", "STATUS_IN_PROGRESS"
    pub name: Option<String>,
    pub short_detail: Option<String>,
}

impl TeamResponse {
    /// The first upcoming or in-progress event, if any
    pub fn next_event(&self) -> Option<&EspnEvent> {
        self.team.next_event.first()
    }
}

impl EspnScore {
    pub fn display(&self) -> String {
        match self {
            EspnScore::Text(text) => text.clone(),
            EspnScore::Number(value) => format_number(*value),
            EspnScore::Detailed { display_value: Some(text), .. } => text.clone(),
            EspnScore::Detailed { display_value: None, value: Some(value) } => format_number(*value),
            EspnScore::Detailed { display_value: None, value: None } | EspnScore::Other(_) => {
                "0".to_string()
            }
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

impl EspnCompetitor {
    pub fn team_info(&self) -> TeamInfo {
        let team = self.team.as_ref();
        TeamInfo {
            name: team
                .and_then(|t| t.display_name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            logo: team
                .and_then(|t| t.logos.first())
                .and_then(|logo| logo.href.clone())
                .unwrap_or_default(),
        }
    }

    pub fn score_display(&self) -> String {
        self.score.as_ref().map(EspnScore::display).unwrap_or_else(|| "0".to_string())
    }
}
