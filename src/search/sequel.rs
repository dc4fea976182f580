//! Sequel number detection for movie titles
//!
//! A trailing whitespace-separated number marks a sequel ("Zootopia 2").
//! Release names spell the same sequel in several ways:
//! - "Zootopia.2.2025.1080p"
//! - "Zootopia (2)"
//! - "Zootopia II 2025"
//! - "Zootopia Part II"
//!
//! Titles that genuinely end in a number ("Blade Runner 2049") are treated as
//! sequels too. Nothing in the title distinguishes the two cases.

use std::sync::LazyLock;

use regex::Regex;

use super::normalize::normalize_title;

static TRAILING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+(\d+)$").expect("valid trailing number regex"));

/// Sequel information derived from a movie title
#[derive(Debug, Clone, PartialEq)]
pub struct SequelInfo {
    /// Trailing number as written in the title
    pub number: Option<String>,
    /// Lowercased title without the trailing number
    pub base_title: String,
    /// `base_title` run through `normalize_title`
    pub normalized_base_title: String,
    /// Roman numeral form of `number`, when it has one
    pub roman: Option<&'static str>,
}

impl SequelInfo {
    /// Checks whether a lowercase release name carries this sequel's number
    ///
    /// Titles without a sequel number accept every release name.
    pub fn matches(&self, release_lower: &str) -> bool {
        let Some(number) = self.number.as_deref() else {
            return true;
        };

        if contains_token(release_lower, number, false) {
            return true;
        }

        self.roman
            .is_some_and(|roman| contains_token(release_lower, roman, true))
    }
}

/// Parses sequel information out of a movie title
///
/// # Examples
/// ```ignore
/// let info = parse_sequel("Zootopia 2");
/// assert_eq!(info.number.as_deref(), Some("2"));
/// assert_eq!(info.base_title, "zootopia");
/// assert_eq!(info.roman, Some("ii"));
/// ```
pub fn parse_sequel(title: &str) -> SequelInfo {
    let title_lower = title.to_lowercase().trim().to_string();

    let (number, base_title) = match TRAILING_NUMBER.captures(&title_lower) {
        Some(caps) => {
            let whole = caps.get(0).map_or(title_lower.len(), |m| m.start());
            let number = caps.get(1).map(|m| m.as_str().to_string());
            (number, title_lower[..whole].trim().to_string())
        }
        None => (None, title_lower.clone()),
    };

    let roman = number.as_deref().and_then(arabic_to_roman);
    let normalized_base_title = normalize_title(&base_title);

    SequelInfo {
        number,
        base_title,
        normalized_base_title,
        roman,
    }
}

/// Converts a sequel number to its lowercase Roman numeral
fn arabic_to_roman(number: &str) -> Option<&'static str> {
    match number {
        "2" => Some("ii"),
        "3" => Some("iii"),
        "4" => Some("iv"),
        "5" => Some("v"),
        "6" => Some("vi"),
        "7" => Some("vii"),
        "8" => Some("viii"),
        "9" => Some("ix"),
        "10" => Some("x"),
        _ => None,
    }
}

/// Finds `token` in `haystack` with no letter or digit directly on either side
///
/// With `after_part`, an occurrence glued to a preceding "part" also counts
/// ("partii").
fn contains_token(haystack: &str, token: &str, after_part: bool) -> bool {
    haystack.match_indices(token).any(|(start, _)| {
        let before = &haystack[..start];
        let after = &haystack[start + token.len()..];

        let open_before = !before.chars().next_back().is_some_and(char::is_alphanumeric)
            || (after_part && before.ends_with("part"));
        let open_after = !after.chars().next().is_some_and(char::is_alphanumeric);

        open_before && open_after
    })
}
