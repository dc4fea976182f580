use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use super::{ApiError, SharedState};
use crate::search::normalize::normalize_title;
use crate::search::{MovieQuery, SourceInfo, SourceResult};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub title: String,
    pub year: Option<u16>,
    /// Search every source instead of only the primary one
    #[serde(default)]
    pub all: bool,
}

pub async fn list_sources(State(state): State<SharedState>) -> Json<Vec<SourceInfo>> {
    Json(state.registry.list_sources())
}

/// Ad-hoc search that does not touch the movie list
pub async fn search(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SourceResult>, ApiError> {
    if normalize_title(&params.title).is_empty() {
        return Err(ApiError::BadRequest("title must contain letters or digits".to_string()));
    }

    let query = MovieQuery::new(params.title.trim(), params.year);
    let result = if params.all {
        state.registry.search_all(&query).await
    } else {
        state.registry.search_one(&query).await
    };

    Ok(Json(result))
}
