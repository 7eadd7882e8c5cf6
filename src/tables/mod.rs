//! Tabular data pulled out of statistics pages.
//!
//! A located `<table>` becomes a [`RawTable`] (possibly two-level header),
//! which the column normalizer flattens into a [`TabularDataset`]. The
//! datasets found on one page are gathered in a [`TableCollection`] keyed by
//! logical table name.

pub mod clean;
pub mod locator;
pub mod normalize;

use serde::Serialize;
use std::collections::BTreeMap;

/// One column of a parsed header. `outer` is the grouping label when the
/// table has a two-level header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnHeader {
    pub outer: Option<String>,
    pub inner: String,
}

impl ColumnHeader {
    pub fn single(inner: impl Into<String>) -> Self {
        Self {
            outer: None,
            inner: inner.into(),
        }
    }

    pub fn grouped(outer: impl Into<String>, inner: impl Into<String>) -> Self {
        Self {
            outer: Some(outer.into()),
            inner: inner.into(),
        }
    }
}

/// A table as parsed from HTML, before column normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub header: Vec<ColumnHeader>,
    pub rows: Vec<Vec<String>>,
}

/// Rows of string cells under uniquely named, positionally ordered columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabularDataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TabularDataset {
    /// Build a dataset; every row is padded or truncated to the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn from_raw(raw: RawTable) -> Self {
        let columns = normalize::normalize_columns(&raw.header);
        Self::new(columns, raw.rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    /// Cells of one column, top to bottom. `None` if the column is absent.
    pub fn column_values<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a str> + 'a> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| row[idx].as_str()))
    }

    pub fn retain_rows(&mut self, mut keep: impl FnMut(Row<'_>) -> bool) {
        let columns = &self.columns;
        self.rows.retain(|cells| keep(Row { columns, cells }));
    }

    /// Rewrite every cell of a column in place. No-op if the column is absent.
    pub fn map_column(&mut self, name: &str, f: impl Fn(&str) -> String) {
        if let Some(idx) = self.column_index(name) {
            for row in &mut self.rows {
                row[idx] = f(&row[idx]);
            }
        }
    }
}

/// Borrowed view of one dataset row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    cells: &'a [String],
}

impl<'a> Row<'a> {
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.cells.get(idx).map(String::as_str)
    }

    pub fn cells(&self) -> &'a [String] {
        self.cells
    }
}

/// Interpret a cell as a number: trims, drops thousands separators.
pub fn coerce_number(cell: &str) -> Option<f64> {
    let cleaned: String = cell.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Datasets found on one page, at most one per logical table name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableCollection {
    tables: BTreeMap<String, TabularDataset>,
}

impl TableCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, dataset: TabularDataset) {
        self.tables.insert(name.into(), dataset);
    }

    pub fn get(&self, name: &str) -> Option<&TabularDataset> {
        self.tables.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
