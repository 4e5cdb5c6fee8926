use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{RecommendationResult, RecommendedProduct},
    routes::{user_id_from_headers, AppState},
    services::explain,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    /// Result count; falls back to the configured default
    pub limit: Option<usize>,
    /// Generate explanations for the top results (identified users only)
    pub explanations: Option<bool>,
    /// Consult the cached snapshot before running the pipeline
    pub cache: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<RecommendedProduct>,
    pub cached: bool,
    pub user_id: String,
    pub count: usize,
}

/// Handler for the recommendations endpoint
///
/// Guests always get a fresh trending list and never touch the cache. For
/// identified users a fresh snapshot is served from cache when present;
/// `cache=false` skips the read but the newly generated set still overwrites
/// the stored snapshot.
pub async fn recommend(
    State(state): State<AppState>,
    Query(params): Query<RecommendationQuery>,
    headers: HeaderMap,
) -> AppResult<Json<RecommendationsResponse>> {
    let user_id = user_id_from_headers(&headers);
    let limit = params.limit.unwrap_or(state.config().default_limit);
    if limit == 0 {
        return Err(AppError::InvalidInput("limit must be positive".to_string()));
    }
    let want_explanations = params.explanations.unwrap_or(true);
    let use_cache = params.cache.unwrap_or(true);

    if use_cache {
        if let Some(uid) = user_id {
            if let Some(snapshot) = state.cache.get(uid).await? {
                if snapshot.results.is_empty() {
                    tracing::warn!(user_id = %uid, "Cached snapshot is empty, serving as-is");
                }

                let recommendations = state.recommender.join_products(snapshot.results).await?;
                tracing::debug!(
                    user_id = %uid,
                    count = recommendations.len(),
                    "Serving cached recommendations"
                );

                return Ok(Json(RecommendationsResponse {
                    count: recommendations.len(),
                    cached: true,
                    user_id: uid.to_string(),
                    recommendations,
                }));
            }
        }
    }

    let mut recommendations = state.recommender.recommend_detailed(user_id, limit).await?;

    if want_explanations {
        if let Some(uid) = user_id {
            let profile = state
                .recommender
                .build_profile(uid)
                .await?
                .unwrap_or_default();

            explain::attach_explanations(
                state.explainer.clone(),
                &mut recommendations,
                &profile,
                state.config().explanation_top_n,
                state.config().explanation_timeout,
            )
            .await;
        }
    }

    if let Some(uid) = user_id {
        let snapshot: Vec<RecommendationResult> = recommendations
            .iter()
            .map(RecommendedProduct::to_result)
            .collect();
        state.cache.put(uid, &snapshot);
    }

    tracing::info!(
        user_id = %user_id.unwrap_or("guest"),
        count = recommendations.len(),
        "Recommendations generated"
    );

    Ok(Json(RecommendationsResponse {
        count: recommendations.len(),
        cached: false,
        user_id: user_id.unwrap_or("guest").to_string(),
        recommendations,
    }))
}
