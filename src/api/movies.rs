use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use serde_json::{Value, json};

use super::{ApiError, SharedState};
use crate::db::{
    self, CheckOutcome,
    import::parse_imdb_id,
    models::{Movie, NewMovie},
};
use crate::search::normalize::normalize_title;
use crate::search::{CheckSummary, MovieQuery, check_all_movies};

#[derive(Debug, Serialize)]
pub struct MovieList {
    pub movies: Vec<Movie>,
    pub found: u32,
    pub pending: u32,
    pub cam_ts: u32,
    pub unseen_found: u32,
}

pub async fn list_movies(State(state): State<SharedState>) -> Result<Json<MovieList>, ApiError> {
    let list = state
        .db
        .with_db(|conn| {
            let counts = db::count_by_status(conn)?;
            let config = db::get_check_config(conn)?;
            Ok(MovieList {
                movies: db::get_all_movies(conn)?,
                found: counts.found,
                pending: counts.pending,
                cam_ts: counts.cam_ts,
                unseen_found: config.unseen_found,
            })
        })
        .await?;

    Ok(Json(list))
}

async fn load_movie(state: &SharedState, id: i64) -> Result<Movie, ApiError> {
    state
        .db
        .with_db(move |conn| db::get_movie(conn, id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("movie {} not found", id)))
}

/// Add a movie and check it against every source right away
pub async fn add_movie(
    State(state): State<SharedState>,
    Json(mut movie): Json<NewMovie>,
) -> Result<(StatusCode, Json<Movie>), ApiError> {
    movie.title = movie.title.trim().to_string();
    if normalize_title(&movie.title).is_empty() {
        return Err(ApiError::BadRequest("title must contain letters or digits".to_string()));
    }

    if let Some(raw) = movie.imdb_id.take().filter(|s| !s.trim().is_empty()) {
        let imdb_id = parse_imdb_id(&raw)
            .ok_or_else(|| ApiError::BadRequest(format!("invalid IMDb link: {}", raw)))?;
        movie.imdb_id = Some(imdb_id);
    }

    let new_movie = movie.clone();
    let id = state
        .db
        .with_db(move |conn| {
            if db::movies::movie_exists(conn, &new_movie)? {
                return Ok(None);
            }
            db::insert_movie(conn, &new_movie).map(Some)
        })
        .await?
        .ok_or_else(|| ApiError::Conflict(format!("'{}' is already on the list", movie.title)))?;

    tracing::info!("Added movie {}: {}", id, movie.title);

    let result = state
        .registry
        .search_all(&MovieQuery::new(movie.title.clone(), movie.year))
        .await;
    let outcome = CheckOutcome::from_result(&result);
    state
        .db
        .with_db(move |conn| db::apply_outcome(conn, id, &outcome, false))
        .await?;

    Ok((StatusCode::CREATED, Json(load_movie(&state, id).await?)))
}

pub async fn delete_movie(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = state.db.with_db(move |conn| db::delete_movie(conn, id)).await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("movie {} not found", id)))
    }
}

/// Re-check one movie against the primary source
pub async fn check_movie(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<Movie>, ApiError> {
    let movie = load_movie(&state, id).await?;

    let result = state
        .registry
        .search_one(&MovieQuery::new(movie.title.clone(), movie.year))
        .await;
    let outcome = CheckOutcome::from_result(&result);
    state
        .db
        .with_db(move |conn| db::apply_outcome(conn, id, &outcome, true))
        .await?;

    Ok(Json(load_movie(&state, id).await?))
}

pub async fn check_all(State(state): State<SharedState>) -> Result<Json<CheckSummary>, ApiError> {
    let summary = check_all_movies(&state.db, &state.registry).await?;
    Ok(Json(summary))
}

pub async fn reset_badge(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    state.db.with_db(db::reset_unseen_found).await?;
    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::test_support::{body_json, send, state_serving};

    #[tokio::test]
    async fn test_add_movie_checks_immediately() {
        let state = state_serving(&["Dune.2021.1080p.BluRay.x264"]);

        let response = send(
            &state,
            "POST",
            "/api/movies",
            Some(json!({ "title": "Dune", "year": 2021, "imdb_id": "https://www.imdb.com/title/tt1160419/" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let json = body_json(response).await;
        assert_eq!(json["title"], "Dune");
        assert_eq!(json["imdb_id"], "tt1160419");
        assert_eq!(json["status"], "found");
        assert_eq!(json["quality"], "BluRay");
        assert_eq!(json["source"], "FK");
    }

    #[tokio::test]
    async fn test_add_duplicate_movie() {
        let state = state_serving(&[]);
        let body = json!({ "title": "Dune", "imdb_id": "tt1160419" });

        let first = send(&state, "POST", "/api/movies", Some(body.clone())).await;
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = send(&state, "POST", "/api/movies", Some(body)).await;
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_add_movie_validation() {
        let state = state_serving(&[]);

        let empty = send(&state, "POST", "/api/movies", Some(json!({ "title": "  " }))).await;
        assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

        let punctuation = send(&state, "POST", "/api/movies", Some(json!({ "title": ":" }))).await;
        assert_eq!(punctuation.status(), StatusCode::BAD_REQUEST);

        let bad_link = send(
            &state,
            "POST",
            "/api/movies",
            Some(json!({ "title": "Dune", "imdb_id": "https://example.com/dune" })),
        )
        .await;
        assert_eq!(bad_link.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_check_and_delete() {
        let state = state_serving(&["Zootopia 2 2025 TELESYNC"]);

        let created = send(
            &state,
            "POST",
            "/api/movies",
            Some(json!({ "title": "Zootopia 2", "year": 2025 })),
        )
        .await;
        let id = body_json(created).await["id"].as_i64().unwrap();

        let list = body_json(send(&state, "GET", "/api/movies", None).await).await;
        assert_eq!(list["movies"].as_array().unwrap().len(), 1);
        assert_eq!(list["cam_ts"], 1);
        assert_eq!(list["found"], 0);

        let checked = send(&state, "POST", &format!("/api/movies/{}/check", id), None).await;
        assert_eq!(checked.status(), StatusCode::OK);
        let checked = body_json(checked).await;
        assert_eq!(checked["status"], "cam_ts");
        assert_eq!(checked["search_url"], "https://fake.test/s/zootopia%202");

        let deleted = send(&state, "DELETE", &format!("/api/movies/{}", id), None).await;
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

        let missing = send(&state, "POST", &format!("/api/movies/{}/check", id), None).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_check_all_and_reset_badge() {
        let state = state_serving(&[]);
        send(&state, "POST", "/api/movies", Some(json!({ "title": "Arrival", "year": 2016 }))).await;

        let summary = body_json(send(&state, "POST", "/api/check", None).await).await;
        assert_eq!(summary["checked"], 1);
        assert_eq!(summary["newly_found"], 0);

        let reset = send(&state, "POST", "/api/badge/reset", None).await;
        assert_eq!(reset.status(), StatusCode::OK);
        assert_eq!(body_json(reset).await["success"], true);

        let list = body_json(send(&state, "GET", "/api/movies", None).await).await;
        assert_eq!(list["unseen_found"], 0);
        assert_eq!(list["pending"], 1);
    }
}
