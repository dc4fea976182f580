//! 1337x source
//!
//! Result rows put the release link in a `td.name` cell, after an icon link
//! to the category.

use std::sync::Arc;

use super::source::{ExtractRule, MarkupFetcher, Source, SourceInfo};

pub const NAME: &str = "1337x";
pub const SHORT_NAME: &str = "1337x";
pub const DEFAULT_BASE_URL: &str = "https://www.1377x.to";

fn build_url(base_url: &str, normalized_title: &str) -> String {
    format!(
        "{}/srch?search={}",
        base_url,
        urlencoding::encode(normalized_title)
    )
}

pub fn source(base_url: &str, fetcher: Arc<dyn MarkupFetcher>) -> Source {
    Source {
        info: SourceInfo {
            name: NAME.to_string(),
            short_name: SHORT_NAME.to_string(),
            base_url: base_url.to_string(),
        },
        build_url,
        rules: vec![
            ExtractRule::Selector("td.name a[href*='/torrent/']"),
            ExtractRule::FirstLinkIn("td[class*='name']"),
            ExtractRule::LinkTarget {
                marker: "/torrent/",
                min_len: 10,
                max_len: 200,
            },
        ],
        fetcher,
    }
}
