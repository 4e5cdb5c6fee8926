use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::NewInteraction,
    routes::{user_id_from_headers, AppState},
};

#[derive(Debug, Deserialize)]
pub struct TrackInteractionRequest {
    pub product_id: Option<i32>,
    pub action: Option<String>,
    pub session_id: Option<String>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct TrackInteractionResponse {
    pub id: i64,
    pub user_id: String,
}

/// Handler for the interaction tracking endpoint
///
/// Accepts events from both identified users and guests; action names are
/// normalized to uppercase before validation. The retention deadline is
/// stamped here so expiry needs no knowledge of when the row was written.
pub async fn track(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<TrackInteractionRequest>,
) -> AppResult<(StatusCode, Json<TrackInteractionResponse>)> {
    let (Some(product_id), Some(action_raw)) = (request.product_id, request.action.as_deref())
    else {
        return Err(AppError::InvalidInput(
            "Missing required fields: product_id, action".to_string(),
        ));
    };

    let action = action_raw
        .to_uppercase()
        .parse()
        .map_err(AppError::InvalidInput)?;

    let user_id = user_id_from_headers(&headers).map(str::to_string);

    let interaction = state
        .behavior
        .record_interaction(NewInteraction {
            user_id: user_id.clone(),
            session_id: request
                .session_id
                .unwrap_or_else(|| "unknown".to_string()),
            product_id,
            action,
            metadata: request.metadata,
            expires_at: Utc::now() + Duration::days(state.config().retention_days),
        })
        .await?;

    tracing::debug!(
        interaction_id = interaction.id,
        product_id,
        action = %interaction.action,
        "Interaction recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(TrackInteractionResponse {
            id: interaction.id,
            user_id: user_id.unwrap_or_else(|| "guest".to_string()),
        }),
    ))
}
