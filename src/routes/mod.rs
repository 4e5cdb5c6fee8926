use std::sync::Arc;

use axum::{
    http::{HeaderMap, StatusCode},
    middleware as axum_middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::RecommenderConfig;
use crate::db::{BehaviorStore, RecommendationCache};
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};
use crate::services::{ExplanationGenerator, Recommender};

pub mod interactions;
pub mod recommendations;

/// Header carrying the caller-authenticated user id
///
/// Identity is established upstream; this service only distinguishes "some
/// user id" from "guest" and never inspects anything else about identity.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub recommender: Recommender,
    pub behavior: Arc<dyn BehaviorStore>,
    pub cache: Arc<dyn RecommendationCache>,
    pub explainer: Arc<dyn ExplanationGenerator>,
}

impl AppState {
    pub fn config(&self) -> &RecommenderConfig {
        self.recommender.config()
    }
}

/// Creates the application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/recommendations", get(recommendations::recommend))
        .route("/interactions", post(interactions::track))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Extracts the user id from the request headers, treating a blank value as
/// absent
pub(crate) fn user_id_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_user_id_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(user_id_from_headers(&headers), None);

        headers.insert(USER_ID_HEADER, HeaderValue::from_static("  "));
        assert_eq!(user_id_from_headers(&headers), None);

        headers.insert(USER_ID_HEADER, HeaderValue::from_static("user_42"));
        assert_eq!(user_id_from_headers(&headers), Some("user_42"));
    }
}
