use super::export::CsvExporter;
use super::row::{DatasetRow, Provenance};
use crate::error::Result;
use crate::types::PlayerReport;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::debug;

/// Collects rows for one run. The season label and collection timestamp are
/// fixed when the run starts so every row in it carries the same values.
#[derive(Debug, Clone)]
pub struct DatasetAccumulator {
    seasons: String,
    collected_at: DateTime<Utc>,
    rows: Vec<DatasetRow>,
}

impl DatasetAccumulator {
    pub fn start(seasons: &[String], collected_at: DateTime<Utc>) -> Self {
        Self {
            seasons: seasons.join(", "),
            collected_at,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, report: &PlayerReport) {
        let provenance = Provenance {
            profile_url: report.profile_url.clone(),
            stats_url: report.stats_url.clone(),
            seasons: self.seasons.clone(),
            collected_at: self.collected_at,
        };
        debug!("Adding dataset row for {}", report.name);
        self.rows.push(DatasetRow::build(report, &provenance));
    }

    pub fn rows(&self) -> &[DatasetRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append the buffered rows through `exporter` and clear the buffer.
    pub fn flush(&mut self, exporter: &CsvExporter) -> Result<PathBuf> {
        let path = exporter.append(&self.rows)?;
        self.rows.clear();
        Ok(path)
    }
}
