//! Static scripture tile

use serde::Serialize;

/// Scripture tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verse {
    pub text: &'static str,
    pub reference: &'static str,
    pub version: &'static str,
}

const DAILY_VERSE: Verse = Verse {
    text: "Commit your works to the Lord, and your plans will be established.",
    reference: "Proverbs 16:3",
    version: "ESV",
};

/// Verse shown on the dashboard
pub fn current_verse() -> Verse {
    DAILY_VERSE
}
