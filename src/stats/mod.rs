//! Reduces located tables to one scalar per canonical metric.

pub mod derived;

use crate::tables::{coerce_number, TableCollection, TabularDataset};
use crate::types::{Metric, StatBundle};
use serde::Deserialize;
use tracing::debug;

/// Where one metric is read from: its preferred table and the acceptable
/// column names in that table, first match wins.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MetricSource {
    pub metric: Metric,
    pub table: String,
    pub aliases: Vec<String>,
}

impl MetricSource {
    pub fn new(metric: Metric, table: &str, aliases: &[&str]) -> Self {
        Self {
            metric,
            table: table.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// First alias present among the dataset's columns.
    pub fn resolve_column<'a>(&'a self, dataset: &TabularDataset) -> Option<&'a str> {
        self.aliases
            .iter()
            .map(String::as_str)
            .find(|alias| dataset.has_column(alias))
    }
}

/// The metric -> (table, aliases) mapping the aggregator runs against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationConfig {
    sources: Vec<MetricSource>,
}

impl AggregationConfig {
    pub fn new(sources: Vec<MetricSource>) -> Self {
        Self { sources }
    }

    pub fn sources(&self) -> &[MetricSource] {
        &self.sources
    }
}

/// Aggregate every configured metric, then compute the derived ones.
pub fn aggregate(tables: &TableCollection, config: &AggregationConfig) -> StatBundle {
    let mut bundle = StatBundle::new();
    for source in config.sources() {
        bundle.insert(source.metric, aggregate_metric(tables, source));
    }
    derived::apply(&mut bundle);
    bundle
}

/// Sum of the resolved column across retained rows; 0.0 when the table or
/// column is missing. Cells that are not numbers count as 0.
pub fn aggregate_metric(tables: &TableCollection, source: &MetricSource) -> f64 {
    let Some(dataset) = tables.get(&source.table) else {
        debug!(
            "metric {}: table '{}' absent, defaulting to 0",
            source.metric, source.table
        );
        return 0.0;
    };
    let Some(column) = source.resolve_column(dataset) else {
        debug!(
            "metric {}: no alias of {:?} in '{}', defaulting to 0",
            source.metric, source.aliases, source.table
        );
        return 0.0;
    };
    sum_column(dataset, column)
}

pub fn sum_column(dataset: &TabularDataset, column: &str) -> f64 {
    dataset
        .column_values(column)
        .map(|values| values.map(|v| coerce_number(v).unwrap_or(0.0)).sum::<f64>())
        .unwrap_or(0.0)
}
