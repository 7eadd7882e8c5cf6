use super::market_value::compact_market_value;
use crate::constants::{PROFILE_PATH_MARKER, PROFILE_SITE_ROOT};
use crate::types::{Lookup, ProfileRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

static MARKET_VALUE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.data-header__market-value-wrapper").expect("valid selector"));
static DETAIL_ITEMS: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".data-header__details > ul > li").expect("valid selector"));
static FLAG_IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img[title]").expect("valid selector"));
static SPANS_AND_TITLED_LINKS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span, a[title]").expect("valid selector"));
static HEADER_CLUB: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".data-header__club a[title]").expect("valid selector"));
static CLUB_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href*=\"/verein/\"]").expect("valid selector"));
static CANONICAL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("link[rel=\"canonical\"]").expect("valid selector"));
static PROFILE_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href*=\"/profil/spieler/\"]").expect("valid selector"));

static NUMERIC_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{2}/\d{2}/\d{4})\b").expect("valid regex"));
static ENGLISH_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Z][a-z]{2} \d{1,2}, \d{4})\b").expect("valid regex"));
static PROFILE_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/profil/spieler/\d+").expect("valid regex"));

// Header labels in the Portuguese and English page variants
const DOB_LABELS: [&str; 3] = ["Nasc./Idade", "Nasc.", "Date of birth"];
const HEIGHT_LABELS: [&str; 2] = ["Altura:", "Height:"];
const POSITION_LABELS: [&str; 2] = ["Posição:", "Position:"];
const NATIONALITY_LABELS: [&str; 2] = ["Nacionalidade:", "Citizenship:"];
const CLUB_LABELS: [&str; 2] = ["Clube atual", "Current club"];

fn text_of(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text after the last occurrence of whichever label is present.
fn after_label(text: &str, labels: &[&str]) -> Option<String> {
    labels.iter().find_map(|label| {
        let idx = text.rfind(label)?;
        let value = text[idx + label.len()..].trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

fn has_label(text: &str, labels: &[&str]) -> bool {
    labels.iter().any(|l| text.contains(l))
}

/// Extract the profile fields from a market-valuation profile page.
pub fn parse_profile(html: &str) -> ProfileRecord {
    let document = Html::parse_document(html);

    let market_value = document
        .select(&MARKET_VALUE)
        .next()
        .and_then(|el| compact_market_value(&text_of(el)));

    let mut dob = None;
    let mut height = None;
    let mut position = None;
    let mut nationality = None;

    for item in document.select(&DETAIL_ITEMS) {
        let text = text_of(item);
        if has_label(&text, &DOB_LABELS) {
            dob = NUMERIC_DATE
                .captures(&text)
                .or_else(|| ENGLISH_DATE.captures(&text))
                .map(|c| c[1].to_string())
                .or(dob);
        }
        if has_label(&text, &HEIGHT_LABELS) {
            height = after_label(&text, &HEIGHT_LABELS);
        }
        if has_label(&text, &POSITION_LABELS) {
            position = after_label(&text, &POSITION_LABELS);
        }
        if has_label(&text, &NATIONALITY_LABELS) {
            nationality = item
                .select(&FLAG_IMG)
                .next()
                .and_then(|img| img.value().attr("title"))
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .or_else(|| after_label(&text, &NATIONALITY_LABELS));
        }
    }

    let current_club = current_club(&document);

    let record = ProfileRecord {
        market_value: Lookup::from_option(market_value),
        position: Lookup::from_option(position),
        nationality: Lookup::from_option(nationality),
        current_club: Lookup::from_option(current_club),
        date_of_birth: Lookup::from_option(dob),
        height: Lookup::from_option(height),
    };
    debug!(?record, "parsed profile");
    record
}

/// Club after the "current club" label, else the header club link, else the
/// first link to any club page.
fn current_club(document: &Html) -> Option<String> {
    let mut after_club_label = false;
    for el in document.select(&SPANS_AND_TITLED_LINKS) {
        if el.value().name() == "span" {
            if !after_club_label && has_label(&text_of(el), &CLUB_LABELS) {
                after_club_label = true;
            }
            continue;
        }
        if after_club_label {
            let name = text_of(el);
            if !name.is_empty() {
                return Some(name);
            }
        }
    }

    [&*HEADER_CLUB, &*CLUB_LINK].iter().find_map(|selector| {
        document
            .select(selector)
            .map(text_of)
            .find(|name| !name.is_empty())
    })
}

pub fn is_profile_url(url: &str) -> bool {
    url.contains(PROFILE_PATH_MARKER)
}

/// Profile URL advertised by a player page: its canonical link when that
/// points at a profile, else the first profile link, made absolute.
pub fn resolve_profile_url(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let canonical = document
        .select(&CANONICAL)
        .filter_map(|el| el.value().attr("href"))
        .find(|href| is_profile_url(href));
    if let Some(href) = canonical {
        return Some(href.to_string());
    }

    document
        .select(&PROFILE_LINK)
        .filter_map(|el| el.value().attr("href"))
        .find(|href| PROFILE_PATH.is_match(href))
        .map(|href| {
            if href.starts_with("http") {
                href.to_string()
            } else {
                format!("{PROFILE_SITE_ROOT}{href}")
            }
        })
}
