//! # FixturePoller
//!
//! Fetches the tracked team's current or next football fixture from the ESPN site API and
//! keeps the most recent result in memory.
//!
//! Upstream calls are gated by an adaptive policy: once a minute while the cached fixture is
//! live or on today's date, and a handful of evenly spread polls per day otherwise. Upstream
//! failures never reach the caller; they degrade to the last known fixture.

pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod parser;
pub mod policy;
pub mod poller;
pub mod selection;
pub mod testing;


pub use client::{EspnClient, FixtureSource};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CompetitionConfig, PolicyConfig, PollerConfig, UpstreamConfig};
pub use error::PollerError;
pub use models::{FixtureRecord, TeamInfo};
pub use policy::{Activity, FetchPolicy, PollerState};
pub use poller::{FixturePoller, PollerStats};

/// Default ESPN soccer API root
pub const DEFAULT_BASE_URL: &str = "https://site.api.espn.com/apis/site/v2/sports/soccer";

/// Default tracked team (Chelsea FC on ESPN)
pub const DEFAULT_TEAM_ID: u32 = 363;

/// Minimum gap between polls while the cached fixture is active
pub const DEFAULT_ACTIVE_INTERVAL_SECS: u64 = 60;

/// Minimum gap between polls while the cached fixture is dormant (4h48m)
pub const DEFAULT_DORMANT_INTERVAL_SECS: u64 = 4 * 3600 + 48 * 60;

/// Upstream polls allowed per day while dormant
pub const DEFAULT_DAILY_QUOTA: u32 = 5;

/// Per-request upstream timeout
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
