use axum::{Json, extract::State};
use serde::Deserialize;

use super::{ApiError, SharedState};
use crate::db::{self, models::CheckConfig};

#[derive(Debug, Deserialize)]
pub struct ConfigUpdate {
    pub check_interval_hours: Option<u32>,
    pub enabled: Option<bool>,
}

pub async fn get_config(State(state): State<SharedState>) -> Result<Json<CheckConfig>, ApiError> {
    let config = state.db.with_db(db::get_check_config).await?;
    Ok(Json(config))
}

/// Takes effect once the running checker wakes up
pub async fn update_config(
    State(state): State<SharedState>,
    Json(update): Json<ConfigUpdate>,
) -> Result<Json<CheckConfig>, ApiError> {
    if update.check_interval_hours == Some(0) {
        return Err(ApiError::BadRequest(
            "check_interval_hours must be at least 1".to_string(),
        ));
    }

    let config = state
        .db
        .with_db(move |conn| {
            if let Some(hours) = update.check_interval_hours {
                db::update_check_interval(conn, hours)?;
            }
            if let Some(enabled) = update.enabled {
                db::set_check_enabled(conn, enabled)?;
            }
            db::get_check_config(conn)
        })
        .await?;

    tracing::info!(
        "Checker set to every {}h ({})",
        config.check_interval_hours,
        if config.enabled { "enabled" } else { "disabled" }
    );

    Ok(Json(config))
}
