//! Process configuration read from the environment at start-up

use std::time::Duration;

use anyhow::{Context, Result};

use crate::search::{tpb, x1337};

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Explicit configuration handed to the components that need it
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_path: String,
    pub bind_addr: String,
    pub fetch_timeout: Duration,
    pub user_agent: String,
    /// Enabled source keys in priority order
    pub sources: Vec<String>,
    pub tpb_base_url: String,
    pub x1337_base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: "hunter.db".to_string(),
            bind_addr: "0.0.0.0:3000".to_string(),
            fetch_timeout: Duration::from_secs(20),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            sources: vec!["tpb".to_string(), "1337x".to_string()],
            tpb_base_url: tpb::DEFAULT_BASE_URL.to_string(),
            x1337_base_url: x1337::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl AppConfig {
    /// Reads configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from any key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let fetch_timeout = match get("FETCH_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(
                secs.trim()
                    .parse()
                    .with_context(|| format!("Invalid FETCH_TIMEOUT_SECS: {}", secs))?,
            ),
            None => defaults.fetch_timeout,
        };

        let sources = match get("HUNTER_SOURCES") {
            Some(list) => list
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.sources,
        };

        Ok(Self {
            database_path: get("DATABASE_PATH").unwrap_or(defaults.database_path),
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            fetch_timeout,
            user_agent: get("HUNTER_USER_AGENT").unwrap_or(defaults.user_agent),
            sources,
            tpb_base_url: get("TPB_BASE_URL").unwrap_or(defaults.tpb_base_url),
            x1337_base_url: get("X1337_BASE_URL").unwrap_or(defaults.x1337_base_url),
        })
    }
}
