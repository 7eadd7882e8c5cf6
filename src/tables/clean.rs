use super::TabularDataset;
use crate::constants::SEASON_COLUMN;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

// In-body header rows repeat the column label ("Season") or carry a
// career summary like "7 years"
static HEADER_LIKE_SEASON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)season|years").expect("valid regex"));

/// Remove all whitespace from a season token ("2023 - 2024" -> "2023-2024").
pub fn normalize_season(season: &str) -> String {
    season.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Drop repeated in-body header rows and normalize the season column.
///
/// Tables without a season column are returned untouched.
pub fn clean_rows(dataset: &mut TabularDataset) {
    if !dataset.has_column(SEASON_COLUMN) {
        return;
    }
    dataset.retain_rows(|row| {
        let season = row.get(SEASON_COLUMN).unwrap_or_default();
        !HEADER_LIKE_SEASON.is_match(season)
    });
    dataset.map_column(SEASON_COLUMN, normalize_season);
}

/// The seasons a run is restricted to, compared by exact normalized token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeasonSet {
    seasons: BTreeSet<String>,
}

impl SeasonSet {
    pub fn new<I, S>(seasons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            seasons: seasons
                .into_iter()
                .map(|s| normalize_season(s.as_ref()))
                .collect(),
        }
    }

    pub fn contains(&self, season: &str) -> bool {
        self.seasons.contains(season)
    }
}

/// Keep only rows whose season is requested. Season-less tables pass through.
pub fn filter_seasons(dataset: &mut TabularDataset, seasons: &SeasonSet) {
    if !dataset.has_column(SEASON_COLUMN) {
        return;
    }
    dataset.retain_rows(|row| {
        row.get(SEASON_COLUMN)
            .map(|s| seasons.contains(&normalize_season(s)))
            .unwrap_or(false)
    });
}
