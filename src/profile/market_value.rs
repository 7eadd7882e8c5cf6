//! Market value text ("€45.00m", "500 mil.", "45M") to a plain number.

use crate::constants::{SENTINEL_FETCH_FAILED, SENTINEL_NOT_FOUND};
use once_cell::sync::Lazy;
use regex::Regex;

// The whole letter run after the number is taken as the unit, so an unknown
// unit is rejected instead of matching a shorter prefix.
static VALUE_WITH_UNIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*(\p{L}+\.?)?").expect("valid regex"));

const MILLION_UNITS: [&str; 8] = ["m", "mi", "mio", "mill", "million", "millions", "milhão", "milhões"];
const THOUSAND_UNITS: [&str; 6] = ["k", "mil", "th", "tsd", "thousand", "thousands"];

/// Scale factor for a unit token. Empty token means no scaling; an
/// unrecognized unit has no scale.
fn unit_scale(unit: &str) -> Option<f64> {
    let unit = unit.to_lowercase();
    let unit = unit.trim_end_matches('.');
    if unit.is_empty() {
        Some(1.0)
    } else if MILLION_UNITS.contains(&unit) {
        Some(1_000_000.0)
    } else if THOUSAND_UNITS.contains(&unit) {
        Some(1_000.0)
    } else {
        None
    }
}

fn is_sentinel(text: &str) -> bool {
    text.is_empty() || text == SENTINEL_NOT_FOUND || text == SENTINEL_FETCH_FAILED
}

/// Currency symbols and non-breaking spaces out, decimal commas to dots.
fn clean(text: &str) -> String {
    text.replace(['€', '$', '£'], "")
        .replace('\u{a0}', " ")
        .replace(',', ".")
        .trim()
        .to_string()
}

/// The number as written and the unit token following it, if any.
fn capture(text: &str) -> Option<(String, String)> {
    let cleaned = clean(text);
    let caps = VALUE_WITH_UNIT.captures(&cleaned)?;
    let number = caps.get(1)?.as_str().to_string();
    let unit = caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();
    Some((number, unit))
}

/// Parse a market value into a plain amount, rounded to 2 decimals.
///
/// Sentinels and text without a number yield `None`.
pub fn parse_market_value(text: &str) -> Option<f64> {
    let text = text.trim();
    if is_sentinel(text) {
        return None;
    }
    let (number, unit) = capture(text)?;
    let value = number.parse::<f64>().ok()? * unit_scale(&unit)?;
    Some((value * 100.0).round() / 100.0)
}

/// Reduce the displayed value to a compact "<number><M|K>" token, keeping
/// the number as written.
pub fn compact_market_value(text: &str) -> Option<String> {
    let (number, unit) = capture(text)?;
    let suffix = match unit_scale(&unit)? {
        s if s >= 1_000_000.0 => "M",
        s if s >= 1_000.0 => "K",
        _ => "",
    };
    Some(format!("{number}{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millions_and_thousands() {
        assert_eq!(parse_market_value("45 M"), Some(45_000_000.0));
        assert_eq!(parse_market_value("500 mil."), Some(500_000.0));
        assert_eq!(parse_market_value("1,50 mi. €"), Some(1_500_000.0));
        assert_eq!(parse_market_value("€45.00m"), Some(45_000_000.0));
        assert_eq!(parse_market_value("800k"), Some(800_000.0));
        assert_eq!(parse_market_value("€2.5 Mio."), Some(2_500_000.0));
    }

    #[test]
    fn plain_number_stands_as_written() {
        assert_eq!(parse_market_value("12500"), Some(12_500.0));
    }

    #[test]
    fn unknown_unit_is_none_not_a_truncated_number() {
        assert_eq!(parse_market_value("1.5bn"), None);
        assert_eq!(parse_market_value("45Mark"), None);
        assert_eq!(compact_market_value("45Mark"), None);
    }

    #[test]
    fn sentinels_and_garbage_are_none() {
        assert_eq!(parse_market_value("N/A"), None);
        assert_eq!(parse_market_value("Erro"), None);
        assert_eq!(parse_market_value(""), None);
        assert_eq!(parse_market_value("garbage"), None);
    }

    #[test]
    fn compact_form_from_header_text() {
        assert_eq!(
            compact_market_value("€ 45,00 mi.  Última atualização: 27/05/2025").as_deref(),
            Some("45.00M")
        );
        assert_eq!(compact_market_value("500 mil. €").as_deref(), Some("500K"));
        assert_eq!(compact_market_value("no value"), None);
    }

    #[test]
    fn compact_form_round_trips_through_parser() {
        let compact = compact_market_value("€ 45,00 mi.").unwrap();
        assert_eq!(parse_market_value(&compact), Some(45_000_000.0));
    }
}
