//! Release quality classification
//!
//! Classifies a lowercase release name as a camcorder/telesync capture, one of
//! the accepted rip tiers, or unknown. Tiers are tested in a fixed order so a
//! name carrying several markers ("1080p.bluray") gets the stronger one.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Camcorder, telesync, telecine and screener markers, matched as whole words only
///
/// "whats" contains "ts" but is not a telesync release.
static LOW_QUALITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:cam|hd-?cam|tc|ts|hd-?ts|tele-?sync|telecine|r5|scr|screener)\b|\.ts\b")
        .expect("valid low quality regex")
});

/// Substring markers per tier, highest priority first
const TIER_MARKERS: &[(QualityTier, &[&str])] = &[
    (QualityTier::BluRay, &["bluray", "blu-ray", "brrip", "bdr", "bd-rip"]),
    (QualityTier::Web, &["web-dl", "webdl", "webrip", "web-rip", "web dl"]),
    (QualityTier::Dvd, &["dvdrip", "dvd-rip", "dvd"]),
    (QualityTier::HdRip, &["hdrip", "hd-rip"]),
    (QualityTier::Hd, &["1080p", "720p"]),
];

/// Accepted release quality tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityTier {
    #[serde(rename = "BluRay")]
    BluRay,
    #[serde(rename = "WEB")]
    Web,
    #[serde(rename = "DVD")]
    Dvd,
    #[serde(rename = "HDRip")]
    HdRip,
    #[serde(rename = "HD")]
    Hd,
}

impl QualityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::BluRay => "BluRay",
            QualityTier::Web => "WEB",
            QualityTier::Dvd => "DVD",
            QualityTier::HdRip => "HDRip",
            QualityTier::Hd => "HD",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one release name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    /// CAM/TS style capture: tracked, never accepted
    LowQuality,
    /// A qualifying release
    Tier(QualityTier),
    /// No recognizable marker; not accepted
    Unknown,
}

/// Classifies an already lowercased release name
pub fn classify(release_lower: &str) -> Quality {
    if LOW_QUALITY.is_match(release_lower) {
        return Quality::LowQuality;
    }

    TIER_MARKERS
        .iter()
        .find(|(_, markers)| markers.iter().any(|m| release_lower.contains(m)))
        .map_or(Quality::Unknown, |(tier, _)| Quality::Tier(*tier))
}
