use crate::constants::COLLECTED_AT_FORMAT;
use crate::profile::parse_market_value;
use crate::types::{Metric, PlayerReport};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Where and when a row's data came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Provenance {
    pub profile_url: String,
    pub stats_url: String,
    pub seasons: String,
    pub collected_at: DateTime<Utc>,
}

/// One exported record. Field order is the CSV column order.
///
/// Integer-classified stats are `Option<i64>` (empty cell when the value
/// was not a finite number); float-classified ones are written with two
/// decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetRow {
    pub player: String,
    pub seasons: String,
    pub source_profile_url: String,
    pub source_stats_url: String,
    pub collected_at_utc: String,
    pub dob: String,
    pub height: String,
    pub current_club: String,
    pub nationality: String,
    pub position: String,
    #[serde(serialize_with = "two_decimals_opt")]
    pub market_value: Option<f64>,
    pub matches: Option<i64>,
    pub minutes: Option<i64>,
    pub goals: Option<i64>,
    pub assists: Option<i64>,
    #[serde(serialize_with = "two_decimals")]
    pub g_plus_a_per90: f64,
    #[serde(serialize_with = "two_decimals")]
    pub xg: f64,
    #[serde(serialize_with = "two_decimals")]
    pub xag: f64,
    pub yellow_cards: Option<i64>,
    pub red_cards: Option<i64>,
    pub tackles: Option<i64>,
    pub interceptions: Option<i64>,
    pub blocks: Option<i64>,
    pub clearances: Option<i64>,
    pub aerials_won: Option<i64>,
    pub pressures: Option<i64>,
    pub errors: Option<i64>,
}

/// Exported stat columns and the metric each one carries.
pub const STAT_COLUMNS: [(&str, Metric); 16] = [
    ("matches", Metric::Matches),
    ("minutes", Metric::Minutes),
    ("goals", Metric::Goals),
    ("assists", Metric::Assists),
    ("g_plus_a_per90", Metric::GoalsAssistsPer90),
    ("xg", Metric::Xg),
    ("xag", Metric::Xag),
    ("yellow_cards", Metric::YellowCards),
    ("red_cards", Metric::RedCards),
    ("tackles", Metric::Tackles),
    ("interceptions", Metric::Interceptions),
    ("blocks", Metric::Blocks),
    ("clearances", Metric::Clearances),
    ("aerials_won", Metric::AerialsWon),
    ("pressures", Metric::Pressures),
    ("errors", Metric::Errors),
];

pub fn round_int(value: f64) -> Option<i64> {
    value.is_finite().then(|| value.round() as i64)
}

pub fn round2(value: f64) -> f64 {
    if value.is_finite() {
        (value * 100.0).round() / 100.0
    } else {
        0.0
    }
}

fn two_decimals<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:.2}", value))
}

fn two_decimals_opt<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => two_decimals(v, serializer),
        None => serializer.serialize_none(),
    }
}

impl DatasetRow {
    pub fn build(report: &PlayerReport, provenance: &Provenance) -> Self {
        let profile = &report.profile;
        let stat = |m: Metric| report.stats.get(m);
        let int = |m: Metric| round_int(stat(m));
        let float = |m: Metric| round2(stat(m));

        Self {
            player: report.name.clone(),
            seasons: provenance.seasons.clone(),
            source_profile_url: provenance.profile_url.clone(),
            source_stats_url: provenance.stats_url.clone(),
            collected_at_utc: provenance.collected_at.format(COLLECTED_AT_FORMAT).to_string(),
            dob: profile.date_of_birth.as_field(),
            height: profile.height.as_field(),
            current_club: profile.current_club.as_field(),
            nationality: profile.nationality.as_field(),
            position: profile.position.as_field(),
            market_value: profile.market_value.found().and_then(|v| parse_market_value(v)),
            matches: int(Metric::Matches),
            minutes: int(Metric::Minutes),
            goals: int(Metric::Goals),
            assists: int(Metric::Assists),
            g_plus_a_per90: float(Metric::GoalsAssistsPer90),
            xg: float(Metric::Xg),
            xag: float(Metric::Xag),
            yellow_cards: int(Metric::YellowCards),
            red_cards: int(Metric::RedCards),
            tackles: int(Metric::Tackles),
            interceptions: int(Metric::Interceptions),
            blocks: int(Metric::Blocks),
            clearances: int(Metric::Clearances),
            aerials_won: int(Metric::AerialsWon),
            pressures: int(Metric::Pressures),
            errors: int(Metric::Errors),
        }
    }
}
