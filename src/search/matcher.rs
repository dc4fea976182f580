//! Release matching policy shared by every source
//!
//! For each candidate release name, in extraction order:
//! 1. The normalized name must contain the normalized base title
//! 2. When a year is known, the name must contain it
//! 3. When the title ends in a sequel number, the name must carry it
//! 4. The surviving name is classified; CAM/TS is remembered and scanning
//!    continues, the first qualifying tier stops the scan

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::normalize::normalize_title;
use super::quality::{Quality, QualityTier, classify};
use super::sequel::parse_sequel;
use super::source::Source;

/// A movie to look for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieQuery {
    pub title: String,
    pub year: Option<u16>,
}

impl MovieQuery {
    pub fn new(title: impl Into<String>, year: Option<u16>) -> Self {
        Self {
            title: title.into(),
            year,
        }
    }
}

/// Verdict for one source, or the merged verdict across sources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceResult {
    pub found: bool,
    pub has_low_quality: bool,
    pub quality_tier: Option<QualityTier>,
    pub search_url: String,
    /// Short name of the source that produced this result
    pub source: String,
}

impl SourceResult {
    /// Empty result for a source that failed or found nothing
    pub fn not_found(source: &str) -> Self {
        Self {
            source: source.to_string(),
            ..Default::default()
        }
    }
}

/// Outcome of scanning a list of candidates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub quality_tier: Option<QualityTier>,
    pub has_low_quality: bool,
    /// Candidates that passed the title, year and sequel gates
    pub matched: usize,
}

/// Applies the matching policy to extracted release names
pub fn scan_candidates(candidates: &[String], query: &MovieQuery) -> ScanOutcome {
    let sequel = parse_sequel(&query.title);
    let year = query.year.map(|y| y.to_string());
    let mut outcome = ScanOutcome::default();

    // Every name contains the empty string
    if sequel.normalized_base_title.is_empty() {
        return outcome;
    }

    for candidate in candidates {
        let name = candidate.trim().to_lowercase();
        let normalized = normalize_title(&name);

        if !normalized.contains(&sequel.normalized_base_title) {
            continue;
        }

        if let Some(year) = year.as_deref() {
            if !name.contains(year) {
                tracing::debug!("Skipping (wrong year): {}", truncate(&name, 60));
                continue;
            }
        }

        if !sequel.matches(&name) {
            tracing::debug!("Skipping (no sequel number): {}", truncate(&name, 60));
            continue;
        }

        outcome.matched += 1;

        match classify(&name) {
            Quality::LowQuality => outcome.has_low_quality = true,
            Quality::Tier(tier) => {
                outcome.quality_tier = Some(tier);
                break;
            }
            Quality::Unknown => {}
        }
    }

    outcome
}

/// Matches one source's search page against a movie
///
/// Extraction failures surface as errors; `search_source` turns them into an
/// empty result.
pub fn match_source(markup: &str, query: &MovieQuery, source: &Source) -> Result<SourceResult> {
    let search_url = source.search_url(&normalize_title(&query.title));
    let candidates = source.extract_candidates(markup)?;

    tracing::debug!(
        "[{}] Found {} torrent results",
        source.info.short_name,
        candidates.len()
    );

    let outcome = scan_candidates(&candidates, query);

    tracing::debug!(
        "[{}] Matched {} torrents for \"{}\"",
        source.info.short_name,
        outcome.matched,
        query.title
    );

    Ok(SourceResult {
        found: outcome.quality_tier.is_some(),
        has_low_quality: outcome.has_low_quality,
        quality_tier: outcome.quality_tier,
        search_url,
        source: source.info.short_name.clone(),
    })
}

/// Fetches and matches one source, never failing
pub async fn search_source(source: &Source, query: &MovieQuery) -> SourceResult {
    let url = source.search_url(&normalize_title(&query.title));
    tracing::debug!("[{}] Searching: {}", source.info.short_name, url);

    let markup = match source.fetcher.fetch(&url).await {
        Ok(markup) => markup,
        Err(e) => {
            tracing::warn!("[{}] Error searching torrent: {}", source.info.short_name, e);
            return SourceResult::not_found(&source.info.short_name);
        }
    };

    match match_source(&markup, query, source) {
        Ok(result) => {
            if let Some(tier) = result.quality_tier {
                tracing::info!(
                    "[{}] {} quality found for \"{}\"",
                    source.info.short_name,
                    tier,
                    query.title
                );
            }
            result
        }
        Err(e) => {
            tracing::warn!("[{}] Error parsing results: {:?}", source.info.short_name, e);
            SourceResult::not_found(&source.info.short_name)
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
