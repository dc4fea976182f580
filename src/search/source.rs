//! Torrent index sources
//!
//! A source pairs the knowledge of one index (URL grammar, markup shape) with
//! a fetcher that retrieves its search pages. Matching policy lives in
//! `matcher` and is shared by every source.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use serde::Serialize;
use thiserror::Error;

/// Public description of a registered source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceInfo {
    pub name: String,
    /// Tag stored with results, e.g. "TPB"
    pub short_name: String,
    pub base_url: String,
}

/// Failure retrieving a search page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} responded with {status}")]
    Status { url: String, status: StatusCode },
}

/// Retrieves raw markup for a search URL
#[async_trait]
pub trait MarkupFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetcher backed by the shared reqwest client
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source: err,
        }
    }
}

#[async_trait]
impl MarkupFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        resp.text().await.map_err(|e| transport_error(url, e))
    }
}

/// Builds the shared HTTP client used for index requests
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .pool_max_idle_per_host(2)
        .build()
        .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))
}

/// One way of pulling release names out of a search page
#[derive(Debug, Clone, Copy)]
pub enum ExtractRule {
    /// Text of every element matching a CSS selector
    Selector(&'static str),
    /// Text of the first link with text inside each cell matching `cell`
    FirstLinkIn(&'static str),
    /// Text of every link whose target contains `marker`, within a length window
    LinkTarget {
        marker: &'static str,
        min_len: usize,
        max_len: usize,
    },
}

impl ExtractRule {
    pub fn extract(&self, document: &Html) -> Result<Vec<String>> {
        match *self {
            ExtractRule::Selector(css) => {
                let selector = parse_selector(css)?;
                Ok(document
                    .select(&selector)
                    .map(|el| el.text().collect::<String>().trim().to_string())
                    .filter(|text| !text.is_empty())
                    .collect())
            }
            ExtractRule::FirstLinkIn(cell) => {
                let cells = parse_selector(cell)?;
                let links = parse_selector("a")?;
                Ok(document
                    .select(&cells)
                    .filter_map(|td| {
                        td.select(&links)
                            .map(|a| a.text().collect::<String>().trim().to_string())
                            .find(|text| !text.is_empty())
                    })
                    .collect())
            }
            ExtractRule::LinkTarget {
                marker,
                min_len,
                max_len,
            } => {
                let selector = parse_selector("a[href]")?;
                Ok(document
                    .select(&selector)
                    .filter(|el| el.value().attr("href").is_some_and(|h| h.contains(marker)))
                    .map(|el| el.text().collect::<String>().trim().to_string())
                    .filter(|text| {
                        let len = text.chars().count();
                        len >= min_len && len <= max_len
                    })
                    .collect())
            }
        }
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid selector '{}': {:?}", css, e))
}

/// Builds a search URL from a base URL and an already normalized title
pub type UrlBuilder = fn(base_url: &str, normalized_title: &str) -> String;

/// A registered index: its description, URL grammar, extraction rules and fetcher
#[derive(Clone)]
pub struct Source {
    pub info: SourceInfo,
    pub build_url: UrlBuilder,
    /// Tried in order; the first rule yielding candidates wins
    pub rules: Vec<ExtractRule>,
    pub fetcher: Arc<dyn MarkupFetcher>,
}

impl Source {
    pub fn search_url(&self, normalized_title: &str) -> String {
        (self.build_url)(self.info.base_url.trim_end_matches('/'), normalized_title)
    }

    /// Extracts candidate release names, falling back through the rules
    pub fn extract_candidates(&self, markup: &str) -> Result<Vec<String>> {
        let document = Html::parse_document(markup);

        for (index, rule) in self.rules.iter().enumerate() {
            let candidates = rule.extract(&document)?;
            if !candidates.is_empty() {
                if index > 0 {
                    tracing::debug!(
                        "[{}] Fallback rule #{} found {} results",
                        self.info.short_name,
                        index + 1,
                        candidates.len()
                    );
                }
                return Ok(candidates);
            }
        }

        Ok(Vec::new())
    }
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source")
            .field("info", &self.info)
            .field("rules", &self.rules)
            .finish()
    }
}
