//! Reconcile candidates from several competitions into the one fixture to show

use crate::models::FixtureRecord;
use chrono::{DateTime, Utc};

/// Pick the fixture to cache from candidates listed in competition priority order.
///
/// A live candidate wins outright (first one by priority). Otherwise the candidate whose
/// kickoff is closest to `now` in either direction, earliest-listed on ties. Otherwise the
/// first candidate.
pub fn select_fixture(candidates: Vec<FixtureRecord>, now: DateTime<Utc>) -> Option<FixtureRecord> {
    if let Some(index) = candidates.iter().position(|f| f.is_live) {
        return candidates.into_iter().nth(index);
    }

    let nearest = candidates
        .iter()
        .enumerate()
        .filter_map(|(index, f)| {
            f.match_date.map(|kickoff| (index, (kickoff.with_timezone(&Utc) - now).num_seconds().abs()))
        })
        .min_by_key(|(_, delta)| *delta)
        .map(|(index, _)| index);

    let index = nearest.unwrap_or(0);
    candidates.into_iter().nth(index)
}
