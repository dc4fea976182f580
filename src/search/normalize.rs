//! Title normalization shared by search queries and release matching
//!
//! Release names and canonical titles mostly differ in punctuation:
//! - "It's What's Inside" is usually released as "Its.Whats.Inside.2024"
//! - "Mission: Impossible" drops the colon
//!
//! Normalizing both sides to the same form lets a substring test do the matching.

/// Apostrophe variants that indexes strip from release names
const APOSTROPHES: &[char] = &['\'', '`', '\u{2018}', '\u{2019}', '\u{02BC}', '\u{00B4}', '\u{2032}'];

/// Normalizes a title or release name for substring comparison
///
/// Lowercases, turns dots into spaces, removes commas, hyphens, apostrophes and
/// colons, then collapses whitespace.
///
/// # Examples
/// - "It's What's Inside" -> "its whats inside"
/// - "Its.Whats.Inside.2024" -> "its whats inside 2024"
/// - "Spider-Man: No Way Home" -> "spiderman no way home"
pub fn normalize_title(s: &str) -> String {
    let stripped: String = s
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            '.' => Some(' '),
            ',' | '-' | ':' => None,
            c if APOSTROPHES.contains(&c) => None,
            c => Some(c),
        })
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
