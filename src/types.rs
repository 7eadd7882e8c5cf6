use crate::constants::{SENTINEL_FETCH_FAILED, SENTINEL_NOT_FOUND};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Outcome of resolving one field from a source page.
///
/// Replaces the "N/A" / "Erro" strings the exported dataset carries; those
/// are only produced when rendering via [`Lookup::as_field`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    FetchFailed,
}

impl<T> Lookup<T> {
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Lookup::Found(v),
            None => Lookup::NotFound,
        }
    }

    pub fn found(&self) -> Option<&T> {
        match self {
            Lookup::Found(v) => Some(v),
            _ => None,
        }
    }
}

impl<T: fmt::Display> Lookup<T> {
    /// Render for a text sink (CSV cell, comparison table).
    pub fn as_field(&self) -> String {
        match self {
            Lookup::Found(v) => v.to_string(),
            Lookup::NotFound => SENTINEL_NOT_FOUND.to_string(),
            Lookup::FetchFailed => SENTINEL_FETCH_FAILED.to_string(),
        }
    }
}

/// Player attributes taken from the market-valuation profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Market value as displayed, reduced to "<number><unit>" (e.g. "45M")
    pub market_value: Lookup<String>,
    pub position: Lookup<String>,
    pub nationality: Lookup<String>,
    pub current_club: Lookup<String>,
    pub date_of_birth: Lookup<String>,
    pub height: Lookup<String>,
}

impl ProfileRecord {
    pub fn not_found() -> Self {
        Self::uniform(|| Lookup::NotFound)
    }

    pub fn fetch_failed() -> Self {
        Self::uniform(|| Lookup::FetchFailed)
    }

    fn uniform(make: impl Fn() -> Lookup<String>) -> Self {
        Self {
            market_value: make(),
            position: make(),
            nationality: make(),
            current_club: make(),
            date_of_birth: make(),
            height: make(),
        }
    }
}

/// How a metric is presented once aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Rounded to the nearest integer
    Integer,
    /// Rounded to two decimals
    Float,
}

/// Canonical statistic keys.
///
/// The serialized names are the short column keys used on the statistics
/// source, which is also how they are spelled in the TOML config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "MP")]
    Matches,
    #[serde(rename = "Min")]
    Minutes,
    #[serde(rename = "Gls")]
    Goals,
    #[serde(rename = "Ast")]
    Assists,
    #[serde(rename = "G+A_p90")]
    GoalsAssistsPer90,
    #[serde(rename = "xG")]
    Xg,
    #[serde(rename = "xAG")]
    Xag,
    #[serde(rename = "CrdY")]
    YellowCards,
    #[serde(rename = "CrdR")]
    RedCards,
    #[serde(rename = "Tkl")]
    Tackles,
    #[serde(rename = "TklW")]
    TacklesWon,
    #[serde(rename = "Int")]
    Interceptions,
    #[serde(rename = "Blocks")]
    Blocks,
    #[serde(rename = "Clr")]
    Clearances,
    #[serde(rename = "AerialsWon")]
    AerialsWon,
    #[serde(rename = "Pressures")]
    Pressures,
    #[serde(rename = "Err")]
    Errors,
}

impl Metric {
    pub const ALL: [Metric; 17] = [
        Metric::Matches,
        Metric::Minutes,
        Metric::Goals,
        Metric::Assists,
        Metric::GoalsAssistsPer90,
        Metric::Xg,
        Metric::Xag,
        Metric::YellowCards,
        Metric::RedCards,
        Metric::Tackles,
        Metric::TacklesWon,
        Metric::Interceptions,
        Metric::Blocks,
        Metric::Clearances,
        Metric::AerialsWon,
        Metric::Pressures,
        Metric::Errors,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Metric::Matches => "MP",
            Metric::Minutes => "Min",
            Metric::Goals => "Gls",
            Metric::Assists => "Ast",
            Metric::GoalsAssistsPer90 => "G+A_p90",
            Metric::Xg => "xG",
            Metric::Xag => "xAG",
            Metric::YellowCards => "CrdY",
            Metric::RedCards => "CrdR",
            Metric::Tackles => "Tkl",
            Metric::TacklesWon => "TklW",
            Metric::Interceptions => "Int",
            Metric::Blocks => "Blocks",
            Metric::Clearances => "Clr",
            Metric::AerialsWon => "AerialsWon",
            Metric::Pressures => "Pressures",
            Metric::Errors => "Err",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Matches => "Matches",
            Metric::Minutes => "Minutes",
            Metric::Goals => "Goals",
            Metric::Assists => "Assists",
            Metric::GoalsAssistsPer90 => "G+A per 90",
            Metric::Xg => "xG",
            Metric::Xag => "xAG",
            Metric::YellowCards => "Yellow cards",
            Metric::RedCards => "Red cards",
            Metric::Tackles => "Tackles",
            Metric::TacklesWon => "Tackles won",
            Metric::Interceptions => "Interceptions",
            Metric::Blocks => "Blocks",
            Metric::Clearances => "Clearances",
            Metric::AerialsWon => "Aerials won",
            Metric::Pressures => "Pressures",
            Metric::Errors => "Errors",
        }
    }

    pub fn kind(self) -> MetricKind {
        match self {
            Metric::GoalsAssistsPer90 | Metric::Xg | Metric::Xag => MetricKind::Float,
            _ => MetricKind::Integer,
        }
    }

    /// Format a value according to the metric's classification.
    pub fn format_value(self, value: f64) -> String {
        match self.kind() {
            MetricKind::Integer => format!("{}", value.round() as i64),
            MetricKind::Float => format!("{:.2}", value),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Aggregated scalars for one player, keyed by canonical metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatBundle {
    values: BTreeMap<Metric, f64>,
}

impl StatBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for `metric`, 0.0 when it was never aggregated.
    pub fn get(&self, metric: Metric) -> f64 {
        self.values.get(&metric).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, metric: Metric) -> bool {
        self.values.contains_key(&metric)
    }

    pub fn insert(&mut self, metric: Metric, value: f64) {
        self.values.insert(metric, value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One player as supplied by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInput {
    pub name: String,
    pub profile_url: String,
    pub stats_url: String,
}

/// Everything collected for one player in one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerReport {
    pub name: String,
    pub profile_url: String,
    pub stats_url: String,
    pub profile: ProfileRecord,
    pub stats: StatBundle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_renders_sentinels() {
        assert_eq!(Lookup::Found("1,80 m".to_string()).as_field(), "1,80 m");
        assert_eq!(Lookup::<String>::NotFound.as_field(), "N/A");
        assert_eq!(Lookup::<String>::FetchFailed.as_field(), "Erro");
    }

    #[test]
    fn every_metric_has_exactly_one_kind() {
        let floats: Vec<_> = Metric::ALL
            .iter()
            .filter(|m| m.kind() == MetricKind::Float)
            .collect();
        assert_eq!(floats, vec![&Metric::GoalsAssistsPer90, &Metric::Xg, &Metric::Xag]);
    }

    #[test]
    fn metric_serde_names_match_keys() {
        for metric in Metric::ALL {
            let json = serde_json::to_string(&metric).unwrap();
            assert_eq!(json, format!("\"{}\"", metric.key()));
        }
    }

    #[test]
    fn format_value_by_kind() {
        assert_eq!(Metric::Goals.format_value(2.6), "3");
        assert_eq!(Metric::Xg.format_value(2.456), "2.46");
    }

    #[test]
    fn missing_bundle_entries_read_as_zero() {
        let bundle = StatBundle::new();
        assert_eq!(bundle.get(Metric::Goals), 0.0);
        assert!(!bundle.contains(Metric::Goals));
    }
}
