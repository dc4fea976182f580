//! Ordered set of sources and the multi-source search
//!
//! Sources are searched one after another in registration order. The first
//! qualifying release ends the search; otherwise the first CAM/TS sighting is
//! kept as the fallback result.

use std::sync::Arc;

use anyhow::{Result, bail};

use crate::config::AppConfig;

use super::matcher::{MovieQuery, SourceResult, search_source};
use super::source::{HttpFetcher, MarkupFetcher, Source, SourceInfo, build_http_client};
use super::{tpb, x1337};

/// Registered sources, highest priority first
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    sources: Vec<Source>,
}

impl SourceRegistry {
    pub fn new(sources: Vec<Source>) -> Self {
        Self { sources }
    }

    /// Builds the registry for the sources enabled in configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = build_http_client(&config.user_agent, config.fetch_timeout)?;
        let fetcher: Arc<dyn MarkupFetcher> = Arc::new(HttpFetcher::new(client));

        let mut sources = Vec::new();
        for key in &config.sources {
            let source = match key.as_str() {
                "tpb" => tpb::source(&config.tpb_base_url, fetcher.clone()),
                "1337x" => x1337::source(&config.x1337_base_url, fetcher.clone()),
                other => bail!("Unknown source '{}' (expected tpb or 1337x)", other),
            };
            sources.push(source);
        }

        if sources.is_empty() {
            bail!("No sources enabled");
        }

        Ok(Self::new(sources))
    }

    pub fn list_sources(&self) -> Vec<SourceInfo> {
        self.sources.iter().map(|s| s.info.clone()).collect()
    }

    /// Checks only the highest-priority source
    pub async fn search_one(&self, query: &MovieQuery) -> SourceResult {
        match self.sources.first() {
            Some(source) => search_source(source, query).await,
            None => SourceResult::default(),
        }
    }

    /// Searches every source in order until a qualifying release turns up
    pub async fn search_all(&self, query: &MovieQuery) -> SourceResult {
        tracing::info!(
            "Starting search for: {} {}",
            query.title,
            query.year.map(|y| y.to_string()).unwrap_or_default()
        );

        let mut best: Option<SourceResult> = None;

        for source in &self.sources {
            tracing::debug!("Trying source: {}", source.info.name);

            let result = search_source(source, query).await;

            if result.found {
                tracing::info!("Quality torrent found on {}", source.info.name);
                return result;
            }

            if result.has_low_quality && best.is_none() {
                tracing::info!(
                    "Only CAM/TS found on {}, continuing search...",
                    source.info.name
                );
                best = Some(result);
            }
        }

        match best {
            Some(result) => {
                tracing::info!("No quality torrent found, but CAM/TS available");
                result
            }
            None => {
                tracing::info!("No torrent found on any source");
                SourceResult::default()
            }
        }
    }
}
