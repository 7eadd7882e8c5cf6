//! Side-by-side comparison of collected players and the normalized series
//! behind the offensive/defensive radar charts.

use crate::dataset::row::STAT_COLUMNS;
use crate::types::{Metric, MetricKind, PlayerReport, StatBundle};
use serde::Serialize;
use std::fmt::Write;

pub const OFFENSIVE_AXES: [Metric; 5] = [
    Metric::Goals,
    Metric::Assists,
    Metric::GoalsAssistsPer90,
    Metric::Xg,
    Metric::Xag,
];

pub const DEFENSIVE_AXES: [Metric; 6] = [
    Metric::Tackles,
    Metric::Interceptions,
    Metric::Blocks,
    Metric::Clearances,
    Metric::AerialsWon,
    Metric::Pressures,
];

const MAX_MARKER: char = '*';

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonCell {
    pub text: String,
    /// Present only for stat rows; profile rows are never ranked
    pub value: Option<f64>,
}

impl ComparisonCell {
    fn text(text: String) -> Self {
        Self { text, value: None }
    }

    fn stat(metric: Metric, value: f64) -> Self {
        let rounded = match metric.kind() {
            MetricKind::Integer => value.round(),
            MetricKind::Float => (value * 100.0).round() / 100.0,
        };
        Self {
            text: metric.format_value(value),
            value: rounded.is_finite().then_some(rounded),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub label: String,
    pub cells: Vec<ComparisonCell>,
}

impl ComparisonRow {
    /// Which cells hold the row maximum. Ties are all marked; rows without
    /// numeric cells mark nothing.
    pub fn max_flags(&self) -> Vec<bool> {
        let max = self
            .cells
            .iter()
            .filter_map(|c| c.value)
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))));
        self.cells
            .iter()
            .map(|c| matches!((c.value, max), (Some(v), Some(m)) if v == m))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonTable {
    pub players: Vec<String>,
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    pub fn build(reports: &[PlayerReport], seasons: &[String]) -> Self {
        let season_label = seasons.join(", ");
        let mut rows = Vec::new();

        let mut text_row = |label: &str, cell: &dyn Fn(&PlayerReport) -> String| {
            rows.push(ComparisonRow {
                label: label.to_string(),
                cells: reports.iter().map(|r| ComparisonCell::text(cell(r))).collect(),
            });
        };
        text_row("Current club", &|r| r.profile.current_club.as_field());
        text_row("Date of birth", &|r| r.profile.date_of_birth.as_field());
        text_row("Height", &|r| r.profile.height.as_field());
        text_row("Nationality", &|r| r.profile.nationality.as_field());
        text_row("Position", &|r| r.profile.position.as_field());
        text_row("Market value", &|r| r.profile.market_value.as_field());
        text_row("Seasons", &|_| season_label.clone());

        for (_, metric) in STAT_COLUMNS {
            rows.push(ComparisonRow {
                label: metric.label().to_string(),
                cells: reports
                    .iter()
                    .map(|r| ComparisonCell::stat(metric, r.stats.get(metric)))
                    .collect(),
            });
        }

        Self {
            players: reports.iter().map(|r| r.name.clone()).collect(),
            rows,
        }
    }

    /// Aligned plain-text rendering. With two or more players the best value
    /// of each stat row is suffixed with `*`.
    pub fn render(&self) -> String {
        let mark = self.players.len() >= 2;
        let header: Vec<String> = std::iter::once("Metric".to_string())
            .chain(self.players.iter().cloned())
            .collect();
        let body: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                let flags = row.max_flags();
                std::iter::once(row.label.clone())
                    .chain(row.cells.iter().zip(flags).map(|(cell, is_max)| {
                        if mark && is_max {
                            format!("{}{}", cell.text, MAX_MARKER)
                        } else {
                            cell.text.clone()
                        }
                    }))
                    .collect()
            })
            .collect();

        let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
        for line in &body {
            for (w, cell) in widths.iter_mut().zip(line) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        for line in std::iter::once(&header).chain(body.iter()) {
            let padded: Vec<String> = line
                .iter()
                .zip(&widths)
                .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
                .collect();
            let _ = writeln!(out, "{}", padded.join(" | ").trim_end());
        }
        out
    }
}

/// Normalized series for one radar chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarSeries {
    pub axes: Vec<Metric>,
    pub first: Vec<f64>,
    pub second: Vec<f64>,
}

/// Scale each metric pair by the pair maximum, 0.0 when that maximum is not
/// positive.
pub fn radar_pair(a: &StatBundle, b: &StatBundle, metrics: &[Metric]) -> RadarSeries {
    let (first, second) = metrics
        .iter()
        .map(|&m| {
            let (x, y) = (a.get(m), b.get(m));
            let max = x.max(y);
            if max > 0.0 {
                (x / max, y / max)
            } else {
                (0.0, 0.0)
            }
        })
        .unzip();
    RadarSeries {
        axes: metrics.to_vec(),
        first,
        second,
    }
}
