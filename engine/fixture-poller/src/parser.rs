//! Turns an ESPN event into a dashboard `FixtureRecord`

use crate::models::{EspnCompetitor, EspnEvent, FixtureRecord};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use chrono_tz::Tz;
use tracing::debug;

/// Upstream status names that count as "in progress"
pub const LIVE_STATUSES: &[&str] = &[
    "STATUS_IN_PROGRESS",
    "STATUS_HALFTIME",
    "STATUS_END_PERIOD",
    "STATUS_FIRST_HALF",
    "STATUS_SECOND_HALF",
];

/// Upstream status names that count as finished
pub const FINISHED_STATUSES: &[&str] = &["STATUS_FINAL", "STATUS_FULL_TIME"];

const HALFTIME_STATUS: &str = "STATUS_HALFTIME";
const SCHEDULED_STATUS: &str = "STATUS_SCHEDULED";

/// Kickoff display format, e.g. "15 Mar 14:00"
const KICKOFF_FORMAT: &str = "%d %b %H:%M";

/// Build a fixture from an upstream event.
///
/// Returns `None` when the event has no competition or fewer than two competitors.
pub fn format_fixture(event: &EspnEvent, league: &str, tz: Tz) -> Option<FixtureRecord> {
    let Some(competition) = event.competitions.first() else {
        debug!("{} event has no competitions", league);
        return None;
    };

    let competitors = &competition.competitors;
    if competitors.len() < 2 {
        debug!("{} event has {} competitors", league, competitors.len());
        return None;
    }

    let (home, away) = home_and_away(competitors);

    let status = competition.status.clone().unwrap_or_default();
    let status_type = status.status_type.clone().unwrap_or_default();
    let status_name = status_type.name.as_deref().unwrap_or(SCHEDULED_STATUS);
    let status_detail = status_type.short_detail.as_deref().filter(|d| !d.is_empty());

    let is_live = LIVE_STATUSES.contains(&status_name);

    let mut match_date = None;
    let status_display = if is_live {
        let clock = status.display_clock.as_deref().unwrap_or("");
        match status.period {
            Some(1) => format!("{}' 1H", clock),
            Some(2) => format!("{}' 2H", clock),
            _ if status_name == HALFTIME_STATUS => "HT".to_string(),
            _ => status_detail.unwrap_or("LIVE").to_string(),
        }
    } else if FINISHED_STATUSES.contains(&status_name) {
        "FT".to_string()
    } else {
        match competition.date.as_deref().and_then(parse_event_date) {
            Some(kickoff) => {
                let local = kickoff.with_timezone(&tz);
                match_date = Some(local.fixed_offset());
                local.format(KICKOFF_FORMAT).to_string()
            }
            None => status_detail.unwrap_or("Scheduled").to_string(),
        }
    };

    Some(FixtureRecord {
        home_team: home.team_info(),
        away_team: away.team_info(),
        score: format!("{} - {}", home.score_display(), away.score_display()),
        status_display,
        is_live,
        league: league.to_string(),
        match_date,
    })
}

/// Pick home and away by the `homeAway` flag; any non-"home" entrant is taken as away, the
/// last one winning. If either side is still unknown, fall back to list order.
fn home_and_away(competitors: &[EspnCompetitor]) -> (&EspnCompetitor, &EspnCompetitor) {
    let mut home = None;
    let mut away = None;

    for competitor in competitors {
        if competitor.home_away.as_deref() == Some("home") {
            home = Some(competitor);
        } else {
            away = Some(competitor);
        }
    }

    match (home, away) {
        (Some(home), Some(away)) => (home, away),
        _ => (&competitors[0], &competitors[1]),
    }
}

/// Parse an upstream kickoff time.
///
/// Accepts RFC 3339 as well as the minute-precision form ESPN usually sends
/// (`2025-03-15T14:00Z`). Times without an offset are taken as UTC.
pub fn parse_event_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    let normalized = match raw.strip_suffix('Z') {
        Some(stripped) => format!("{}+00:00", stripped),
        None => raw.to_string(),
    };

    for format in ["%Y-%m-%dT%H:%M%:z", "%Y-%m-%dT%H:%M:%S%.f%:z"] {
        if let Ok(parsed) = DateTime::<FixedOffset>::parse_from_str(&normalized, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.and_utc());
        }
    }

    debug!("Unparseable event date: {}", raw);
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EspnEvent;
    use chrono::TimeZone;
    use serde_json::{json, Value};

    fn event(competitors: Value, status: Value, date: Value) -> EspnEvent {
        serde_json::from_value(json!({
            "competitions": [{
                "date": date,
                "competitors": competitors,
                "status": status,
            }]
        }))
        .unwrap()
    }

    fn competitor(name: &str, home_away: Option<&str>, score: &str) -> Value {
        let mut value = json!({
            "team": { "displayName": name, "logos": [{ "href": format!("https://logos/{}.png", name) }] },
            "score": score,
        });
        if let Some(side) = home_away {
            value["homeAway"] = json!(side);
        }
        value
    }

    fn status(name: &str, clock: &str, period: i64, detail: &str) -> Value {
        json!({
            "displayClock": clock,
            "period": period,
            "type": { "name": name, "shortDetail": detail },
        })
    }

    fn london() -> Tz {
        "Europe/London".parse().unwrap()
    }

    #[test]
    fn test_scheduled_fixture_uses_local_kickoff() {
        let event = event(
            json!([competitor("Chelsea", Some("home"), "0"), competitor("Arsenal", Some("away"), "0")]),
            status("STATUS_SCHEDULED", "0'", 0, "Sat, March 15th at 2:00 PM"),
            json!("2025-07-15T14:00Z"),
        );

        let fixture = format_fixture(&event, "Premier League", london()).unwrap();
        assert_eq!(fixture.home_team.name, "Chelsea");
        assert_eq!(fixture.away_team.logo, "https://logos/Arsenal.png");
        assert_eq!(fixture.score, "0 - 0");
        // BST is UTC+1 in July
        assert_eq!(fixture.status_display, "15 Jul 15:00");
        assert!(!fixture.is_live);
        assert_eq!(fixture.league, "Premier League");
        let expected = Utc.with_ymd_and_hms(2025, 7, 15, 14, 0, 0).unwrap();
        assert_eq!(fixture.match_date.unwrap().with_timezone(&Utc), expected);
    }

    #[test]
    fn test_role_flag_wins_over_order() {
        let event = event(
            json!([competitor("Arsenal", Some("away"), "1"), competitor("Chelsea", Some("home"), "2")]),
            status("STATUS_FINAL", "90'", 2, "FT"),
            json!("2025-03-15T14:00Z"),
        );

        let fixture = format_fixture(&event, "Premier League", london()).unwrap();
        assert_eq!(fixture.home_team.name, "Chelsea");
        assert_eq!(fixture.away_team.name, "Arsenal");
        assert_eq!(fixture.score, "2 - 1");
        assert_eq!(fixture.status_display, "FT");
        assert!(fixture.match_date.is_none());
    }

    #[test]
    fn test_missing_role_flag_falls_back_to_position() {
        let event = event(
            json!([competitor("Arsenal", None, "1"), competitor("Chelsea", None, "3")]),
            status("STATUS_FINAL", "90'", 2, "FT"),
            json!(null),
        );

        let fixture = format_fixture(&event, "FA Cup", london()).unwrap();
        assert_eq!(fixture.home_team.name, "Arsenal");
        assert_eq!(fixture.away_team.name, "Chelsea");
        assert_eq!(fixture.score, "1 - 3");
    }

    #[test]
    fn test_two_home_flags_fall_back_to_position() {
        let event = event(
            json!([competitor("Arsenal", Some("home"), "0"), competitor("Chelsea", Some("home"), "0")]),
            status("STATUS_SCHEDULED", "", 0, ""),
            json!(null),
        );

        let fixture = format_fixture(&event, "FA Cup", london()).unwrap();
        assert_eq!(fixture.home_team.name, "Arsenal");
        assert_eq!(fixture.away_team.name, "Chelsea");
        assert_eq!(fixture.status_display, "Scheduled");
    }

    #[test]
    fn test_live_clock_formats() {
        let teams =
            json!([competitor("Chelsea", Some("home"), "1"), competitor("Arsenal", Some("away"), "0")]);

        let first_half = event(teams.clone(), status("STATUS_IN_PROGRESS", "23", 1, "23'"), json!(null));
        let second_half = event(teams.clone(), status("STATUS_IN_PROGRESS", "72", 2, "72'"), json!(null));
        let halftime_period_one = event(teams.clone(), status("STATUS_HALFTIME", "45", 1, "HT"), json!(null));
        let halftime = event(
            teams.clone(),
            json!({ "displayClock": "45", "type": { "name": "STATUS_HALFTIME", "shortDetail": "Half" } }),
            json!(null),
        );
        let extra_time = event(teams.clone(), status("STATUS_IN_PROGRESS", "95", 3, "ET 95'"), json!(null));
        let no_detail = event(teams, status("STATUS_END_PERIOD", "90", 4, ""), json!(null));

        let display = |e: &EspnEvent| format_fixture(e, "Premier League", london()).unwrap();

        assert_eq!(display(&first_half).status_display, "23' 1H");
        assert_eq!(display(&second_half).status_display, "72' 2H");
        assert_eq!(display(&halftime_period_one).status_display, "45' 1H");
        assert_eq!(display(&halftime).status_display, "HT");
        assert_eq!(display(&extra_time).status_display, "ET 95'");
        assert_eq!(display(&no_detail).status_display, "LIVE");
        assert!(display(&halftime).is_live);
        assert!(display(&first_half).match_date.is_none());
    }

    #[test]
    fn test_bad_date_falls_back_to_status_text() {
        let event = event(
            json!([competitor("Chelsea", Some("home"), "0"), competitor("Arsenal", Some("away"), "0")]),
            status("STATUS_SCHEDULED", "", 0, "TBD"),
            json!("next saturday"),
        );

        let fixture = format_fixture(&event, "Carabao Cup", london()).unwrap();
        assert_eq!(fixture.status_display, "TBD");
        assert!(fixture.match_date.is_none());
    }

    #[test]
    fn test_missing_status_is_scheduled() {
        let event: EspnEvent = serde_json::from_value(json!({
            "competitions": [{
                "competitors": [competitor("Chelsea", Some("home"), "0"), competitor("Arsenal", Some("away"), "0")]
            }]
        }))
        .unwrap();

        let fixture = format_fixture(&event, "Premier League", london()).unwrap();
        assert!(!fixture.is_live);
        assert_eq!(fixture.status_display, "Scheduled");
    }

    #[test]
    fn test_incomplete_events_are_rejected() {
        let no_competitions = EspnEvent::default();
        assert!(format_fixture(&no_competitions, "Premier League", london()).is_none());

        let one_team = event(
            json!([competitor("Chelsea", Some("home"), "0")]),
            status("STATUS_SCHEDULED", "", 0, ""),
            json!(null),
        );
        assert!(format_fixture(&one_team, "Premier League", london()).is_none());
    }

    #[test]
    fn test_parse_event_date_forms() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 15, 14, 0, 0).unwrap();
        assert_eq!(parse_event_date("2025-03-15T14:00Z"), Some(expected));
        assert_eq!(parse_event_date("2025-03-15T14:00:00Z"), Some(expected));
        assert_eq!(parse_event_date("2025-03-15T15:00+01:00"), Some(expected));
        assert_eq!(parse_event_date("2025-03-15T14:00"), Some(expected));
        assert_eq!(parse_event_date(""), None);
        assert_eq!(parse_event_date("15/03/2025"), None);
    }
}
