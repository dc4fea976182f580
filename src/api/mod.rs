//! JSON HTTP API over the movie list and the search engine

pub mod checker;
pub mod movies;
pub mod search;

use std::sync::Arc;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::db::Db;
use crate::search::SourceRegistry;

pub struct AppState {
    pub db: Db,
    pub registry: SourceRegistry,
}

pub type SharedState = Arc<AppState>;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/sources", get(search::list_sources))
        .route("/api/search", get(search::search))
        .route("/api/movies", get(movies::list_movies).post(movies::add_movie))
        .route("/api/movies/:id", delete(movies::delete_movie))
        .route("/api/movies/:id/check", post(movies::check_movie))
        .route("/api/check", post(movies::check_all))
        .route("/api/badge/reset", post(movies::reset_badge))
        .route("/api/config", get(checker::get_config).put(checker::update_config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Error returned by API handlers
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(err) => {
                tracing::error!("Request failed: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, Response};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::search::source::{ExtractRule, FetchError, MarkupFetcher, Source, SourceInfo};

    struct PageFetcher(String);

    #[async_trait]
    impl MarkupFetcher for PageFetcher {
        async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
            Ok(self.0.clone())
        }
    }

    /// App state whose only source serves the given release names
    pub fn state_serving(names: &[&str]) -> SharedState {
        let links: String = names
            .iter()
            .map(|n| format!("<a class=\"rel\" href=\"/torrent/1\">{}</a>", n))
            .collect();
        let source = Source {
            info: SourceInfo {
                name: "Fake Index".to_string(),
                short_name: "FK".to_string(),
                base_url: "https://fake.test".to_string(),
            },
            build_url: |base, title| format!("{}/s/{}", base, urlencoding::encode(title)),
            rules: vec![ExtractRule::Selector("a.rel")],
            fetcher: Arc::new(PageFetcher(format!("<html><body>{}</body></html>", links))),
        };

        Arc::new(AppState {
            db: Db::open_in_memory().unwrap(),
            registry: SourceRegistry::new(vec![source]),
        })
    }

    pub async fn send(state: &SharedState, method: &str, uri: &str, body: Option<Value>) -> Response<Body> {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        router(state.clone()).oneshot(request).await.unwrap()
    }

    pub async fn body_json(response: Response<Body>) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
