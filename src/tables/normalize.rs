use super::ColumnHeader;
use crate::constants::{COLUMN_SYNONYMS, HEADER_LEVEL_SEPARATOR};
use std::collections::{HashMap, HashSet};

/// Flatten, deduplicate and canonicalize a header into column names.
///
/// Applying this to headers built from its own output changes nothing.
pub fn normalize_columns(header: &[ColumnHeader]) -> Vec<String> {
    let flat: Vec<String> = header.iter().map(flatten).collect();
    rename_synonyms(dedupe(flat))
}

/// Outer labels that mean "this column has no group".
pub fn is_no_grouping(outer: &str) -> bool {
    let outer = outer.trim();
    outer.is_empty() || outer.starts_with("Unnamed")
}

pub fn flatten(column: &ColumnHeader) -> String {
    let inner = column.inner.trim();
    match column.outer.as_deref().map(str::trim) {
        Some(outer) if !is_no_grouping(outer) => {
            if inner.is_empty() {
                outer.to_string()
            } else {
                format!("{outer}{HEADER_LEVEL_SEPARATOR}{inner}")
            }
        }
        _ => inner.to_string(),
    }
}

/// First occurrence keeps its name; later ones get ".1", ".2", ... in
/// column order. A suffix never reuses a name that exists in the input.
pub fn dedupe(names: Vec<String>) -> Vec<String> {
    let reserved: HashSet<String> = names.iter().cloned().collect();
    let mut emitted: HashSet<String> = HashSet::with_capacity(names.len());
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(names.len());

    for name in names {
        if emitted.insert(name.clone()) {
            out.push(name);
            continue;
        }
        let n = counters.entry(name.clone()).or_insert(0);
        let candidate = loop {
            *n += 1;
            let candidate = format!("{name}.{n}");
            if !reserved.contains(&candidate) && !emitted.contains(&candidate) {
                break candidate;
            }
        };
        emitted.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

/// Rename known synonyms to their canonical spelling, unless the canonical
/// name is already taken by another column.
pub fn rename_synonyms(mut names: Vec<String>) -> Vec<String> {
    for (from, to) in COLUMN_SYNONYMS {
        if names.iter().any(|n| n == to) {
            continue;
        }
        if let Some(slot) = names.iter_mut().find(|n| n.as_str() == from) {
            *slot = to.to_string();
        }
    }
    names
}
