//! ThePirateBay source
//!
//! Search pages list each release as a detail link:
//! `<a href="https://.../torrent/123/Name" class="detLink" title="Details for Name">Name</a>`

use std::sync::Arc;

use super::source::{ExtractRule, MarkupFetcher, Source, SourceInfo};

pub const NAME: &str = "ThePirateBay";
pub const SHORT_NAME: &str = "TPB";
pub const DEFAULT_BASE_URL: &str = "https://thepiratebay10.xyz";

/// `/search/{query}/{page}/{order}/{category}`, order 99 = relevance, category 0 = all
fn build_url(base_url: &str, normalized_title: &str) -> String {
    format!(
        "{}/search/{}/1/99/0",
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
            ExtractRule::Selector("a[href*='/torrent/'][title]"),
            ExtractRule::Selector("a[href*='/torrent/']"),
            ExtractRule::LinkTarget {
                marker: "/torrent/",
                min_len: 10,
                max_len: 200,
            },
        ],
        fetcher,
    }
}
