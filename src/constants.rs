//! Shared constants: sentinels, source identifiers and the built-in
//! aggregation defaults used when no config file overrides them.

use crate::types::Metric;

// Rendered in place of a profile field that was not on the page
pub const SENTINEL_NOT_FOUND: &str = "N/A";
// Rendered in place of a profile field when the page could not be fetched
pub const SENTINEL_FETCH_FAILED: &str = "Erro";

pub const SEASON_COLUMN: &str = "Season";
pub const DEFAULT_SEASONS: [&str; 2] = ["2023-2024", "2024-2025"];

/// Separator between outer and inner header labels when flattening.
pub const HEADER_LEVEL_SEPARATOR: &str = "_";

/// Known column synonyms, renamed after flattening.
pub const COLUMN_SYNONYMS: [(&str, &str); 3] =
    [("Competition", "Comp"), ("Team", "Squad"), ("Matches", "MP")];

pub const DEFAULT_DATASET_PATH: &str = "dataset_coleta_jogadores.csv";
pub const DEFAULT_CONFIG_PATH: &str = "player_compare.toml";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "pt-BR,pt;q=0.9,en;q=0.8";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

pub const PROFILE_PATH_MARKER: &str = "/profil/spieler/";
pub const PROFILE_SITE_ROOT: &str = "https://www.transfermarkt.com.br";

/// Statistic table families on the season-stats page. Each family is tried
/// as `<id>_expanded`, `<id>_combined`, then `<id>`.
pub const TABLE_FAMILIES: [(&str, &str); 12] = [
    ("standard", "stats_standard"),
    ("shooting", "stats_shooting"),
    ("passing", "stats_passing"),
    ("pass_types", "stats_passing_types"),
    ("gca", "stats_gca"),
    ("defense", "stats_defense"),
    ("possession", "stats_possession"),
    ("pressures", "stats_pressures"),
    ("playing_time", "stats_playing_time"),
    ("misc", "stats_misc"),
    ("keeper", "stats_keeper"),
    ("keeper_adv", "stats_keeper_adv"),
];

pub const CANDIDATE_SUFFIXES: [&str; 3] = ["_expanded", "_combined", ""];

/// Preferred source table and column aliases per aggregated metric.
///
/// Aliases are tried in order. Grouped names (outer_inner) come first
/// because the bare inner names can collide with renamed link columns.
pub fn default_metric_sources() -> Vec<(Metric, &'static str, Vec<&'static str>)> {
    vec![
        (Metric::Matches, "standard", vec!["Playing Time_MP", "MP"]),
        (Metric::Minutes, "standard", vec!["Playing Time_Min", "Min", "Minutes"]),
        (Metric::Goals, "standard", vec!["Performance_Gls", "Gls", "Goals"]),
        (Metric::Assists, "standard", vec!["Performance_Ast", "Ast", "Assists"]),
        (Metric::Xg, "shooting", vec!["Expected_xG", "xG"]),
        (Metric::Xag, "passing", vec!["xAG", "Expected_xAG", "xA", "Expected_xA"]),
        (Metric::YellowCards, "standard", vec!["Performance_CrdY", "CrdY", "Yel"]),
        (Metric::RedCards, "standard", vec!["Performance_CrdR", "CrdR", "Red"]),
        (Metric::Tackles, "defense", vec!["Tackles_Tkl", "Tkl", "Tackles"]),
        (Metric::TacklesWon, "defense", vec!["Tackles_TklW", "TklW", "Tackles Won"]),
        (Metric::Interceptions, "defense", vec!["Int", "Interceptions"]),
        (Metric::Blocks, "defense", vec!["Blocks_Blocks", "Blocks"]),
        (Metric::Clearances, "defense", vec!["Clr", "Clearances"]),
        (Metric::AerialsWon, "defense", vec!["AerialsWon", "Aerial Duels_Won", "Aerials Won"]),
        (Metric::Pressures, "pressures", vec!["Pressures_Press", "Pressures", "Press"]),
        (Metric::Errors, "misc", vec!["Err", "Errors"]),
    ]
}

/// Output dataset columns, in file order.
pub const DATASET_COLUMNS: [&str; 27] = [
    "player",
    "seasons",
    "source_profile_url",
    "source_stats_url",
    "collected_at_utc",
    "dob",
    "height",
    "current_club",
    "nationality",
    "position",
    "market_value",
    "matches",
    "minutes",
    "goals",
    "assists",
    "g_plus_a_per90",
    "xg",
    "xag",
    "yellow_cards",
    "red_cards",
    "tackles",
    "interceptions",
    "blocks",
    "clearances",
    "aerials_won",
    "pressures",
    "errors",
];

pub const COLLECTED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
