//! IMDb id parsing and markdown watch-list import
//!
//! The watch list can be kept as a markdown file of IMDb links:
//! ```text
//! - [Dune: Part Two (2024)](https://www.imdb.com/title/tt15239678/)
//! - https://www.imdb.com/title/tt1160419/
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

static IMDB_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"tt\d+").expect("valid imdb id regex"));

static IMDB_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://www\.imdb\.com/title/(tt\d+)").expect("valid imdb link regex")
});

static TITLED_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\(\s*https://www\.imdb\.com/title/(tt\d+)[^)]*\)")
        .expect("valid titled link regex")
});

static TITLE_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?)\s*\((\d{4})\)\s*$").expect("valid title year regex")
});

/// One movie found in a markdown watch list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    pub imdb_id: String,
    pub title: Option<String>,
    pub year: Option<u16>,
}

/// Extract an IMDb id from a bare id or an IMDb URL
pub fn parse_imdb_id(input: &str) -> Option<String> {
    IMDB_ID.find(input.trim()).map(|m| m.as_str().to_string())
}

/// Extract every IMDb title link from a markdown document
///
/// Order is preserved and repeated ids are dropped. A title is attached when
/// the id appears as a `[Title (Year)](link)` markdown link.
pub fn parse_imdb_links(markdown: &str) -> Vec<ImportEntry> {
    let titled: HashMap<&str, &str> = TITLED_LINK
        .captures_iter(markdown)
        .filter_map(|caps| Some((caps.get(2)?.as_str(), caps.get(1)?.as_str())))
        .collect();

    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for caps in IMDB_LINK.captures_iter(markdown) {
        let Some(id) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if !seen.insert(id) {
            continue;
        }

        let (title, year) = match titled.get(id) {
            Some(text) => split_title_year(text),
            None => (None, None),
        };

        entries.push(ImportEntry {
            imdb_id: id.to_string(),
            title,
            year,
        });
    }

    entries
}

fn split_title_year(text: &str) -> (Option<String>, Option<u16>) {
    let text = text.trim();
    match TITLE_YEAR.captures(text) {
        Some(caps) => {
            let title = caps.get(1).map(|m| m.as_str().trim().to_string());
            let year = caps.get(2).and_then(|m| m.as_str().parse().ok());
            (title.filter(|t| !t.is_empty()), year)
        }
        None if text.is_empty() => (None, None),
        None => (Some(text.to_string()), None),
    }
}
