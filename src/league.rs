//! League-wide averages from a competition's standard stats table.

use crate::error::{Result, ScraperError};
use crate::tables::locator::{find_table, parse_table, unwrap_commented_tables};
use crate::tables::{coerce_number, Row, TabularDataset};
use scraper::Html;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

pub const LEAGUE_TABLE_ID: &str = "stats_standard";
pub const MINUTES_COLUMN: &str = "Playing Time_Min";
pub const DEFAULT_MIN_MINUTES: f64 = 450.0;

const PLAYER_COLUMN: &str = "Player";
const POSITION_COLUMN: &str = "Pos";
// Shown in the per-position console summary
const POSITION_SUMMARY_COLUMNS: [&str; 7] = [
    "Performance_Gls",
    "Performance_Ast",
    "Performance_G+A",
    "Expected_xG",
    "Expected_xAG",
    "Playing Time_90s",
    "Playing Time_Min",
];
// Descriptive columns that are never averaged
const TEXT_COLUMNS: [&str; 7] = ["Player", "Nation", "Pos", "Squad", "Comp", "MP", "Matches"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PositionGroup {
    Forwards,
    Midfielders,
    Defenders,
    Goalkeepers,
}

impl PositionGroup {
    pub const ALL: [PositionGroup; 4] = [
        PositionGroup::Forwards,
        PositionGroup::Midfielders,
        PositionGroup::Defenders,
        PositionGroup::Goalkeepers,
    ];

    /// Position codes, exactly as listed in the table, that belong to the group.
    pub fn positions(self) -> &'static [&'static str] {
        match self {
            PositionGroup::Forwards => &["FW", "FW,MF"],
            PositionGroup::Midfielders => &["MF,FW", "MF"],
            PositionGroup::Defenders => &["DF", "DF,FW", "DF,MF"],
            PositionGroup::Goalkeepers => &["GK"],
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            PositionGroup::Forwards => "FW",
            PositionGroup::Midfielders => "MF",
            PositionGroup::Defenders => "DF",
            PositionGroup::Goalkeepers => "GK",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PositionGroup::Forwards => "Forwards",
            PositionGroup::Midfielders => "Midfielders",
            PositionGroup::Defenders => "Defenders",
            PositionGroup::Goalkeepers => "Goalkeepers",
        }
    }

    fn contains(self, position: &str) -> bool {
        self.positions().contains(&position.trim())
    }
}

/// Extract the league's player rows: in-body header rows dropped, only
/// players with at least `min_minutes` played kept.
#[instrument(skip(html), fields(html_len = html.len()))]
pub fn league_players(html: &str, min_minutes: f64) -> Result<TabularDataset> {
    let document = Html::parse_document(&unwrap_commented_tables(html));
    let table = find_table(&document, LEAGUE_TABLE_ID)
        .ok_or_else(|| ScraperError::Parse(format!("table '{LEAGUE_TABLE_ID}' not found")))?;
    let raw = parse_table(table)
        .ok_or_else(|| ScraperError::Parse(format!("table '{LEAGUE_TABLE_ID}' has no header")))?;

    filter_players(TabularDataset::from_raw(raw), min_minutes)
}

/// Reload player rows written by [`export_players`], applying the same
/// filtering as a fresh download.
#[instrument]
pub fn load_players(path: &Path, min_minutes: f64) -> Result<TabularDataset> {
    let mut reader = csv::Reader::from_path(path)?;
    let columns: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    let rows = reader
        .records()
        .map(|record| record.map(|r| r.iter().map(String::from).collect()))
        .collect::<std::result::Result<Vec<Vec<String>>, csv::Error>>()?;
    info!("Loaded {} league rows from {}", rows.len(), path.display());
    filter_players(TabularDataset::new(columns, rows), min_minutes)
}

fn filter_players(mut players: TabularDataset, min_minutes: f64) -> Result<TabularDataset> {
    if !players.has_column(MINUTES_COLUMN) {
        return Err(ScraperError::Parse(format!(
            "column '{MINUTES_COLUMN}' missing from league table"
        )));
    }

    let total = players.len();
    players.retain_rows(|row| {
        row.get(PLAYER_COLUMN) != Some(PLAYER_COLUMN)
            && row
                .get(MINUTES_COLUMN)
                .and_then(coerce_number)
                .is_some_and(|minutes| minutes >= min_minutes)
    });
    info!(
        "{} of {} league rows kept (>= {} min)",
        players.len(),
        total,
        min_minutes
    );
    Ok(players)
}

/// Mean of each numeric column, in table column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnMeans {
    pub players: usize,
    pub means: Vec<(String, f64)>,
}

impl ColumnMeans {
    /// Columns with no numeric cell among `rows` are left out.
    pub fn compute<'a>(columns: &[String], rows: impl IntoIterator<Item = Row<'a>>) -> Self {
        let numeric: Vec<(usize, &String)> = columns
            .iter()
            .enumerate()
            .filter(|(_, name)| !TEXT_COLUMNS.contains(&name.as_str()))
            .collect();
        let mut sums = vec![(0.0_f64, 0_usize); numeric.len()];
        let mut players = 0;

        for row in rows {
            players += 1;
            let cells = row.cells();
            for ((idx, _), (sum, count)) in numeric.iter().zip(sums.iter_mut()) {
                if let Some(v) = cells.get(*idx).and_then(|c| coerce_number(c)) {
                    *sum += v;
                    *count += 1;
                }
            }
        }

        let means = numeric
            .into_iter()
            .zip(sums)
            .filter(|(_, (_, count))| *count > 0)
            .map(|((_, name), (sum, count))| (name.clone(), sum / count as f64))
            .collect();
        Self { players, means }
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.means
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, mean)| *mean)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeagueAverages {
    pub overall: ColumnMeans,
    pub by_position: Vec<(PositionGroup, ColumnMeans)>,
}

impl LeagueAverages {
    pub fn compute(players: &TabularDataset) -> Self {
        let overall = ColumnMeans::compute(players.columns(), players.rows());
        let by_position = PositionGroup::ALL
            .iter()
            .map(|&group| {
                let rows = players.rows().filter(|row| {
                    row.get(POSITION_COLUMN)
                        .is_some_and(|pos| group.contains(pos))
                });
                (group, ColumnMeans::compute(players.columns(), rows))
            })
            .collect::<Vec<_>>();

        let counts: Vec<String> = by_position
            .iter()
            .map(|(group, means)| format!("{} {}", means.players, group.label()))
            .collect();
        if overall.players == 0 {
            warn!("No players left to average");
        }
        info!("Players analysed: {}", counts.join(", "));
        Self {
            overall,
            by_position,
        }
    }

    pub fn group(&self, group: PositionGroup) -> Option<&ColumnMeans> {
        self.by_position
            .iter()
            .find(|(g, _)| *g == group)
            .map(|(_, m)| m)
    }

    /// Aligned text listing of the overall means.
    pub fn render(&self) -> String {
        let width = self
            .overall
            .means
            .iter()
            .map(|(name, _)| name.chars().count())
            .max()
            .unwrap_or(0);
        self.overall
            .means
            .iter()
            .map(|(name, mean)| format!("{:<width$}  {:.2}\n", name, mean, width = width))
            .collect()
    }

    /// One line per metric, one column per position group. Only the summary
    /// columns present in the table are shown; a group with no value for a
    /// metric shows "-".
    pub fn render_by_position(&self) -> String {
        let metrics: Vec<&str> = POSITION_SUMMARY_COLUMNS
            .iter()
            .copied()
            .filter(|c| self.overall.get(c).is_some())
            .collect();
        let width = metrics.iter().map(|m| m.chars().count()).max().unwrap_or(0);

        let mut out = format!("{:<width$}", "", width = width);
        for (group, means) in &self.by_position {
            out.push_str(&format!("  {:>12}", format!("{} ({})", group.code(), means.players)));
        }
        out.push('\n');
        for metric in metrics {
            out.push_str(&format!("{:<width$}", metric, width = width));
            for (_, means) in &self.by_position {
                let cell = means
                    .get(metric)
                    .map(|v| format!("{v:.2}"))
                    .unwrap_or_else(|| "-".to_string());
                out.push_str(&format!("  {:>12}", cell));
            }
            out.push('\n');
        }
        out
    }
}

#[derive(Serialize)]
struct MeanRecord<'a> {
    metric: &'a str,
    mean: f64,
}

/// Write `metric,mean` rows, replacing any existing file.
pub fn export_means(path: &Path, means: &ColumnMeans) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for (metric, mean) in &means.means {
        writer.serialize(MeanRecord {
            metric,
            mean: *mean,
        })?;
    }
    writer.flush()?;
    info!("💾 League averages saved to {}", path.display());
    Ok(fs::canonicalize(path)?)
}

/// Write one row per metric with a mean column per position group. Cells
/// are empty where a group has no value for the metric.
pub fn export_by_position(path: &Path, averages: &LeagueAverages) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    let header: Vec<&str> = std::iter::once("metric")
        .chain(averages.by_position.iter().map(|(group, _)| group.label()))
        .collect();
    writer.write_record(&header)?;
    for (metric, _) in &averages.overall.means {
        let record: Vec<String> = std::iter::once(metric.clone())
            .chain(averages.by_position.iter().map(|(_, means)| {
                means.get(metric).map(|v| v.to_string()).unwrap_or_default()
            }))
            .collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;
    info!("💾 Position averages saved to {}", path.display());
    Ok(fs::canonicalize(path)?)
}

/// Write the filtered player rows under their flattened column names.
pub fn export_players(path: &Path, players: &TabularDataset) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(players.columns())?;
    for row in players.rows() {
        writer.write_record(row.cells())?;
    }
    writer.flush()?;
    info!("💾 {} league players saved to {}", players.len(), path.display());
    Ok(fs::canonicalize(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const LEAGUE: &str = r#"
    <html><body>
    <div id="all_stats_standard">
    <!--
      <div id="div_stats_standard">
      <table id="stats_standard">
        <thead>
          <tr>
            <th colspan="4"></th>
            <th colspan="2">Playing Time</th>
            <th colspan="2">Performance</th>
          </tr>
          <tr>
            <th>Rk</th><th>Player</th><th>Pos</th><th>Squad</th>
            <th>MP</th><th>Min</th><th>Gls</th><th>Ast</th>
          </tr>
        </thead>
        <tbody>
          <tr><th>1</th><td>Ana</td><td>FW</td><td>A</td><td>20</td><td>1,800</td><td>10</td><td>2</td></tr>
          <tr><th>2</th><td>Bia</td><td>MF</td><td>B</td><td>15</td><td>900</td><td>2</td><td>6</td></tr>
          <tr class="thead"><th>Rk</th><td>Player</td><td>Pos</td><td>Squad</td><td>MP</td><td>Min</td><td>Gls</td><td>Ast</td></tr>
          <tr><th>3</th><td>Cris</td><td>DF,MF</td><td>C</td><td>3</td><td>200</td><td>0</td><td>0</td></tr>
          <tr><th>4</th><td>Duda</td><td>FW,MF</td><td>D</td><td>10</td><td>600</td><td>4</td><td></td></tr>
          <tr><th>5</th><td>Eva</td><td>GK</td><td>E</td><td>0</td><td></td><td>0</td><td>0</td></tr>
        </tbody>
      </table>
      </div>
    -->
    </div>
    </body></html>"#;

    #[test]
    fn filters_header_rows_and_low_minutes() {
        let players = league_players(LEAGUE, DEFAULT_MIN_MINUTES).unwrap();
        let names: Vec<_> = players.column_values("Player").unwrap().collect();
        assert_eq!(names, vec!["Ana", "Bia", "Duda"]);
        assert!(players.has_column("Playing Time_MP"));
        assert!(players.has_column("Performance_Gls"));
    }

    #[test]
    fn overall_and_position_means() {
        let players = league_players(LEAGUE, DEFAULT_MIN_MINUTES).unwrap();
        let averages = LeagueAverages::compute(&players);

        assert_eq!(averages.overall.players, 3);
        assert_eq!(averages.overall.get("Playing Time_Min"), Some(1100.0));
        assert_eq!(averages.overall.get("Performance_Gls"), Some(16.0 / 3.0));
        // blank assist cell is excluded, not counted as zero
        assert_eq!(averages.overall.get("Performance_Ast"), Some(4.0));
        assert_eq!(averages.overall.get("Player"), None);
        assert_eq!(averages.overall.get("Pos"), None);

        let forwards = averages.group(PositionGroup::Forwards).unwrap();
        assert_eq!(forwards.players, 2);
        assert_eq!(forwards.get("Performance_Gls"), Some(7.0));
        let keepers = averages.group(PositionGroup::Goalkeepers).unwrap();
        assert_eq!(keepers.players, 0);
        assert!(keepers.means.is_empty());
    }

    #[test]
    fn missing_table_is_an_error() {
        let err = league_players("<html></html>", DEFAULT_MIN_MINUTES).unwrap_err();
        assert!(matches!(err, ScraperError::Parse(_)));
    }

    #[test]
    fn exports_metric_mean_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("league_means.csv");
        let means = ColumnMeans {
            players: 2,
            means: vec![("Performance_Gls".into(), 2.5), ("Rk".into(), 1.5)],
        };
        export_means(&path, &means).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "metric,mean\nPerformance_Gls,2.5\nRk,1.5\n");
    }

    #[test]
    fn exports_player_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("players.csv");
        let players = league_players(LEAGUE, DEFAULT_MIN_MINUTES).unwrap();
        export_players(&path, &players).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Rk,Player,Pos,Squad,Playing Time_MP,Playing Time_Min,Performance_Gls,Performance_Ast"
        );
        assert_eq!(content.lines().count(), 4);
    }

    #[test]
    fn renders_summary_metrics_per_position() {
        let players = league_players(LEAGUE, DEFAULT_MIN_MINUTES).unwrap();
        let text = LeagueAverages::compute(&players).render_by_position();
        let lines: Vec<_> = text.lines().collect();

        assert!(lines[0].contains("FW (2)"));
        assert!(lines[0].contains("MF (1)"));
        assert!(lines[0].contains("GK (0)"));
        let goals = lines.iter().find(|l| l.starts_with("Performance_Gls")).unwrap();
        assert!(goals.contains("7.00"));
        assert!(goals.contains("2.00"));
        assert!(goals.trim_end().ends_with('-'));
        // only summary columns present in the table
        assert!(!text.contains("Expected_xG"));
        assert!(!text.contains("Rk"));
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn exports_one_column_per_position_group() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("by_position.csv");
        let players = league_players(LEAGUE, DEFAULT_MIN_MINUTES).unwrap();
        export_by_position(&path, &LeagueAverages::compute(&players)).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "metric,Forwards,Midfielders,Defenders,Goalkeepers\n\
             Rk,2.5,2,,\n\
             Playing Time_MP,15,15,,\n\
             Playing Time_Min,1200,900,,\n\
             Performance_Gls,7,2,,\n\
             Performance_Ast,2,6,,\n"
        );
    }

    #[test]
    fn reloaded_player_csv_gives_same_averages() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("players.csv");
        let players = league_players(LEAGUE, DEFAULT_MIN_MINUTES).unwrap();
        export_players(&path, &players).unwrap();

        let reloaded = load_players(&path, DEFAULT_MIN_MINUTES).unwrap();
        assert_eq!(reloaded.columns(), players.columns());
        assert_eq!(
            LeagueAverages::compute(&reloaded),
            LeagueAverages::compute(&players)
        );

        // a stricter threshold is applied to the saved rows
        let regulars = load_players(&path, 1000.0).unwrap();
        let names: Vec<_> = regulars.column_values("Player").unwrap().collect();
        assert_eq!(names, vec!["Ana"]);
    }

    #[test]
    fn reloading_csv_without_minutes_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("players.csv");
        fs::write(&path, "Player,Pos\nAna,FW\n").unwrap();
        let err = load_players(&path, DEFAULT_MIN_MINUTES).unwrap_err();
        assert!(matches!(err, ScraperError::Parse(_)));
    }
}
