//! Finds the statistics tables on a season-stats page.
//!
//! Each logical table ("standard", "defense", ...) has an ordered list of
//! candidate element ids. Candidates are probed in order and the first one
//! that yields a non-empty dataset after normalization, cleaning and season
//! filtering wins. Running out of candidates just leaves the name out of the
//! resulting [`TableCollection`].

use super::clean::{clean_rows, filter_seasons, SeasonSet};
use super::{ColumnHeader, RawTable, TableCollection, TabularDataset};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

static HTML_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--(.*?)-->").expect("valid regex"));
static THEAD_ROWS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("thead > tr").expect("valid selector"));
static BODY_ROWS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tbody > tr, tfoot > tr").expect("valid selector"));

// Guards against absurd colspan attributes blowing up row width
const MAX_COLSPAN: usize = 64;

/// Logical table name -> candidate identifiers, highest priority first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableCandidates {
    by_name: BTreeMap<String, Vec<String>>,
}

impl TableCandidates {
    pub fn new(by_name: BTreeMap<String, Vec<String>>) -> Self {
        Self { by_name }
    }

    pub fn with(mut self, name: impl Into<String>, candidates: &[&str]) -> Self {
        self.by_name.insert(
            name.into(),
            candidates.iter().map(|c| c.to_string()).collect(),
        );
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.by_name.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Run probes in order and return the first success. Failures are dropped.
pub fn first_success<T, P>(probes: impl IntoIterator<Item = P>) -> Option<T>
where
    P: FnOnce() -> Option<T>,
{
    probes.into_iter().find_map(|probe| probe())
}

pub struct TableLocator {
    candidates: TableCandidates,
    seasons: SeasonSet,
}

impl TableLocator {
    pub fn new(candidates: TableCandidates, seasons: SeasonSet) -> Self {
        Self { candidates, seasons }
    }

    /// Locate every configured table in `html`.
    #[instrument(skip(self, html), fields(html_len = html.len()))]
    pub fn locate(&self, html: &str) -> TableCollection {
        let document = Html::parse_document(&unwrap_commented_tables(html));
        let document = &document;
        let mut collection = TableCollection::new();

        for (name, candidates) in self.candidates.iter() {
            let found = first_success(
                candidates
                    .iter()
                    .map(|id| move || self.probe(document, name, id)),
            );
            match found {
                Some((id, dataset)) => {
                    info!(
                        "Table '{}' taken from '{}' ({} rows x {} cols)",
                        name,
                        id,
                        dataset.len(),
                        dataset.columns().len()
                    );
                    collection.insert(name, dataset);
                }
                None => debug!("Table '{}' not found under any candidate id", name),
            }
        }

        if collection.is_empty() {
            warn!("No statistics tables found on page");
        }
        collection
    }

    fn probe<'a>(
        &self,
        document: &Html,
        name: &str,
        id: &'a str,
    ) -> Option<(&'a str, TabularDataset)> {
        let table = find_table(document, id)?;
        let Some(raw) = parse_table(table) else {
            debug!("Candidate '{}' for '{}' has no usable header", id, name);
            return None;
        };
        let mut dataset = TabularDataset::from_raw(raw);
        clean_rows(&mut dataset);
        filter_seasons(&mut dataset, &self.seasons);
        if dataset.is_empty() {
            debug!("Candidate '{}' for '{}' is empty after filtering", id, name);
            return None;
        }
        Some((id, dataset))
    }
}

/// Replace comments that wrap a table with their contents so the table
/// becomes part of the parsed document.
pub fn unwrap_commented_tables(html: &str) -> String {
    HTML_COMMENT
        .replace_all(html, |caps: &Captures| {
            let body = &caps[1];
            if body.contains("<table") && body.contains("</table>") {
                body.to_string()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Find the `<table>` for a candidate id: via its `div_<id>` wrapper or the
/// element carrying the id itself.
pub fn find_table<'a>(document: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    let holder = first_success(
        [format!("div_{id}"), id.to_string()]
            .into_iter()
            .map(|key| move || select_by_id(document, &key)),
    )?;
    if holder.value().name() == "table" {
        return Some(holder);
    }
    let inner = Selector::parse(&format!("table[id=\"{}\"]", css_escape(id))).ok()?;
    holder.select(&inner).next()
}

fn select_by_id<'a>(document: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(&format!("[id=\"{}\"]", css_escape(id))).ok()?;
    document.select(&selector).next()
}

fn css_escape(id: &str) -> String {
    id.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Parse a `<table>` element into header levels and body rows.
///
/// Returns `None` when no header row can be identified.
pub fn parse_table(table: ElementRef<'_>) -> Option<RawTable> {
    let mut header_rows: Vec<Vec<String>> = table.select(&THEAD_ROWS).map(expand_row).collect();
    let mut body_rows: Vec<Vec<String>> = Vec::new();

    if header_rows.is_empty() {
        // No <thead>: leading all-<th> rows are the header
        let mut in_header = true;
        for row in table.select(&BODY_ROWS) {
            if in_header && is_header_row(row) {
                header_rows.push(expand_row(row));
            } else {
                in_header = false;
                body_rows.push(expand_row(row));
            }
        }
    } else {
        body_rows = table.select(&BODY_ROWS).map(expand_row).collect();
    }

    let inner = header_rows.pop()?;
    if inner.is_empty() {
        return None;
    }
    let outer = header_rows.pop();

    let header = inner
        .into_iter()
        .enumerate()
        .map(|(i, label)| ColumnHeader {
            outer: outer.as_ref().and_then(|o| o.get(i).cloned()),
            inner: label,
        })
        .collect();

    Some(RawTable {
        header,
        rows: body_rows.into_iter().filter(|r| !r.is_empty()).collect(),
    })
}

fn cells(row: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "th" | "td"))
}

fn is_header_row(row: ElementRef<'_>) -> bool {
    let mut any = false;
    for cell in cells(row) {
        if cell.value().name() != "th" {
            return false;
        }
        any = true;
    }
    any
}

/// Cell texts of a row with `colspan` expanded by repetition.
fn expand_row(row: ElementRef<'_>) -> Vec<String> {
    let mut out = Vec::new();
    for cell in cells(row) {
        let text = collapse_ws(&cell.text().collect::<String>());
        let span = cell
            .value()
            .attr("colspan")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .clamp(1, MAX_COLSPAN);
        out.extend(std::iter::repeat(text).take(span));
    }
    out
}

fn collapse_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
    <html><body>
      <div id="div_stats_standard_expanded">
        <table id="stats_standard_expanded">
          <thead>
            <tr class="over_header">
              <th colspan="2"></th>
              <th colspan="2">Performance</th>
            </tr>
            <tr><th>Season</th><th>Squad</th><th>Gls</th><th>Ast</th></tr>
          </thead>
          <tbody>
            <tr><th>2022-2023</th><td>Benfica</td><td>4</td><td>1</td></tr>
            <tr><th>2023-2024</th><td>Benfica</td><td>10</td><td>3</td></tr>
            <tr class="thead"><th>Season</th><td>Squad</td><td>Gls</td><td>Ast</td></tr>
            <tr><th>2024 - 2025</th><td>Arsenal</td><td>7</td><td>2</td></tr>
          </tbody>
          <tfoot>
            <tr><th>3 Seasons</th><td>2 Clubs</td><td>21</td><td>6</td></tr>
          </tfoot>
        </table>
      </div>
      <div id="all_stats_defense">
      <!--
        <div id="div_stats_defense">
          <table id="stats_defense">
            <thead><tr><th>Season</th><th>Tkl</th></tr></thead>
            <tbody><tr><th>2023-2024</th><td>12</td></tr></tbody>
          </table>
        </div>
      -->
      </div>
      <table id="stats_misc_combined">
        <thead><tr><th>Season</th><th>Err</th></tr></thead>
        <tbody><tr><th>2019-2020</th><td>1</td></tr></tbody>
      </table>
      <table id="stats_misc">
        <thead><tr><th>Season</th><th>Err</th></tr></thead>
        <tbody><tr><th>2024-2025</th><td>2</td></tr></tbody>
      </table>
    </body></html>"#;

    fn locator() -> TableLocator {
        let candidates = TableCandidates::default()
            .with("standard", &["stats_standard_expanded", "stats_standard"])
            .with("defense", &["stats_defense_expanded", "stats_defense"])
            .with("misc", &["stats_misc_combined", "stats_misc"])
            .with("keeper", &["stats_keeper"]);
        TableLocator::new(candidates, SeasonSet::new(["2023-2024", "2024-2025"]))
    }

    #[test]
    fn locates_flattens_cleans_and_filters() {
        let tables = locator().locate(PAGE);
        let standard = tables.get("standard").unwrap();
        assert_eq!(
            standard.columns(),
            ["Season", "Squad", "Performance_Gls", "Performance_Ast"]
        );
        let seasons: Vec<_> = standard.column_values("Season").unwrap().collect();
        assert_eq!(seasons, vec!["2023-2024", "2024-2025"]);
        let goals: Vec<_> = standard.column_values("Performance_Gls").unwrap().collect();
        assert_eq!(goals, vec!["10", "7"]);
    }

    #[test]
    fn finds_tables_hidden_in_comments() {
        let tables = locator().locate(PAGE);
        let defense = tables.get("defense").unwrap();
        assert_eq!(defense.column_values("Tkl").unwrap().collect::<Vec<_>>(), vec!["12"]);
    }

    #[test]
    fn falls_through_to_next_candidate_when_filtered_empty() {
        let tables = locator().locate(PAGE);
        let misc = tables.get("misc").unwrap();
        assert_eq!(misc.column_values("Err").unwrap().collect::<Vec<_>>(), vec!["2"]);
    }

    #[test]
    fn missing_tables_are_absent_not_errors() {
        let tables = locator().locate(PAGE);
        assert!(tables.get("keeper").is_none());
        assert_eq!(tables.len(), 3);
        assert!(locator().locate("<html>nothing here</html>").is_empty());
    }

    #[test]
    fn locating_is_deterministic() {
        assert_eq!(locator().locate(PAGE), locator().locate(PAGE));
    }

    #[test]
    fn plain_comments_survive_unwrapping() {
        let html = "<p>a</p><!-- tracking --><!--<table><tr><td>1</td></tr></table>-->";
        let out = unwrap_commented_tables(html);
        assert!(out.contains("<!-- tracking -->"));
        assert!(out.ends_with("<table><tr><td>1</td></tr></table>"));
    }

    #[test]
    fn header_from_leading_th_rows_without_thead() {
        let html = r#"<table id="t">
            <tr><th>Season</th><th>Gls</th></tr>
            <tr><td colspan="2">Did not play</td></tr>
            <tr><td>2023-2024</td><td>5</td></tr>
        </table>"#;
        let document = Html::parse_document(html);
        let raw = parse_table(find_table(&document, "t").unwrap()).unwrap();
        assert_eq!(raw.header, vec![ColumnHeader::single("Season"), ColumnHeader::single("Gls")]);
        assert_eq!(raw.rows[0], vec!["Did not play", "Did not play"]);
        assert_eq!(raw.rows[1], vec!["2023-2024", "5"]);
    }

    #[test]
    fn first_success_stops_at_first_hit() {
        let mut calls = Vec::new();
        let result = first_success((0..5).map(|i| {
            calls.push(i);
            move || if i >= 2 { Some(i) } else { None }
        }));
        assert_eq!(result, Some(2));
        assert_eq!(calls, vec![0, 1, 2]);
    }
}
