//! Periodic movie checker
//!
//! Runs a full multi-source search for every movie that has not been found
//! yet, stores the results and raises the unseen counter when new releases
//! turn up.

use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use serde::Serialize;
use tokio::time::sleep;

use crate::db::{self, CheckOutcome, Db, models::MovieStatus};

use super::matcher::MovieQuery;
use super::registry::SourceRegistry;

/// Used when the stored interval cannot be read
const FALLBACK_INTERVAL_HOURS: u64 = 24;

/// Placeholder title stored when metadata lookup failed
const UNKNOWN_TITLE: &str = "Unknown";

/// Totals for one sweep over the movie list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    pub checked: u32,
    pub skipped: u32,
    pub newly_found: u32,
    pub low_quality: u32,
}

/// Check every movie that is still being hunted
///
/// The list is read once and all outcomes are written back in one transaction.
pub async fn check_all_movies(db: &Db, registry: &SourceRegistry) -> Result<CheckSummary> {
    let movies = db.with_db(db::get_all_movies).await?;
    let mut summary = CheckSummary::default();

    if movies.is_empty() {
        tracing::info!("No movies to check");
        return Ok(summary);
    }

    let mut outcomes = Vec::new();

    for movie in &movies {
        if movie.title.trim().is_empty() || movie.title == UNKNOWN_TITLE {
            tracing::info!(
                "Skipping movie without title: {}",
                movie.imdb_id.as_deref().unwrap_or("?")
            );
            summary.skipped += 1;
            continue;
        }

        if movie.status == MovieStatus::Found {
            summary.skipped += 1;
            continue;
        }

        let query = MovieQuery::new(movie.title.clone(), movie.year);
        let result = registry.search_all(&query).await;
        summary.checked += 1;

        let outcome = CheckOutcome::from_result(&result);
        match &outcome {
            CheckOutcome::Found { .. } => summary.newly_found += 1,
            CheckOutcome::LowQuality { .. } => summary.low_quality += 1,
            CheckOutcome::NotFound => {}
        }
        outcomes.push((movie.id, outcome));
    }

    let newly_found = summary.newly_found;
    db.with_db_mut(move |conn| {
        db::apply_outcomes(conn, &outcomes)?;
        db::update_last_check_time(conn)?;
        if newly_found > 0 {
            db::add_unseen_found(conn, newly_found)?;
        }
        Ok(())
    })
    .await?;

    if newly_found > 0 {
        notify_found(newly_found);
    }

    Ok(summary)
}

fn notify_found(count: u32) {
    tracing::info!("Found {} new torrent(s)!", count);
}

/// Interval until the next sweep and whether sweeps are enabled
async fn next_check(db: &Db) -> (Duration, bool) {
    match db.with_db(db::get_check_config).await {
        Ok(config) => {
            let hours = u64::from(config.check_interval_hours.max(1));
            (Duration::from_secs(hours * 3600), config.enabled)
        }
        Err(e) => {
            tracing::error!("Failed to read check config: {:?}", e);
            (Duration::from_secs(FALLBACK_INTERVAL_HOURS * 3600), true)
        }
    }
}

/// Run the checker loop
///
/// Checks once at start-up, then again after every configured interval.
pub async fn run_checker(db: Db, registry: SourceRegistry) {
    let mut enabled = next_check(&db).await.1;

    loop {
        if enabled {
            tracing::info!("Starting movie check at {}", Local::now().format("%Y-%m-%d %H:%M:%S"));

            match check_all_movies(&db, &registry).await {
                Ok(summary) => tracing::info!(
                    "Check complete: {} checked, {} newly found, {} CAM/TS only",
                    summary.checked,
                    summary.newly_found,
                    summary.low_quality
                ),
                Err(e) => tracing::error!("Movie check failed: {:?}", e),
            }
        } else {
            tracing::info!("Periodic checks disabled, skipping");
        }

        let (wait, next_enabled) = next_check(&db).await;
        enabled = next_enabled;

        tracing::info!("Next check in {:?}", wait);
        sleep(wait).await;
    }
}
