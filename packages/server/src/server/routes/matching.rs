use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::domains::matching::models::{
    ComfortLevel, EmotionalTheme, MatchRequest, ALLOWED_DURATIONS,
};
use crate::server::app::AppState;
use crate::server::error::ApiError;

const ESTIMATED_WAIT: &str = "1-2 minutes";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinMatchingRequest {
    pub session_id: String,
    pub theme: EmotionalTheme,
    pub intensity: i32,
    pub comfort_level: ComfortLevel,
    pub timezone: String,
    pub duration: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveMatchingRequest {
    pub session_id: String,
}

/// POST /api/matching/join
///
/// Enqueues the request and immediately runs a matching pass, so a join
/// that completes a group is matched in the same request.
pub async fn join_matching(
    Extension(state): Extension<AppState>,
    Json(body): Json<JoinMatchingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.session_id.is_empty() {
        return Err(ApiError::BadRequest("sessionId is required".to_string()));
    }
    if !(1..=10).contains(&body.intensity) {
        return Err(ApiError::BadRequest(
            "intensity must be between 1 and 10".to_string(),
        ));
    }
    if !ALLOWED_DURATIONS.contains(&body.duration) {
        return Err(ApiError::BadRequest(
            "duration must be 20 or 30 minutes".to_string(),
        ));
    }

    let request = MatchRequest {
        session_id: body.session_id.clone(),
        theme: body.theme,
        intensity: body.intensity,
        comfort_level: body.comfort_level,
        timezone: body.timezone,
        duration: body.duration,
        enqueued_at: Utc::now(),
    };

    state.matching.submit_match_request(request).await?;

    let position = state.matching.queue_position(&body.session_id).await?;

    Ok(Json(json!({
        "message": "Added to matching queue",
        "queuePosition": position,
        "estimatedWaitTime": ESTIMATED_WAIT
    })))
}

/// DELETE /api/matching/leave
pub async fn leave_matching(
    Extension(state): Extension<AppState>,
    Json(body): Json<LeaveMatchingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.session_id.is_empty() {
        return Err(ApiError::BadRequest("sessionId is required".to_string()));
    }

    state.matching.withdraw_match_request(&body.session_id).await?;

    Ok(Json(json!({ "message": "Removed from matching queue" })))
}

/// GET /api/matching/status/:session_id
pub async fn matching_status(
    Extension(state): Extension<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let position = state.matching.queue_position(&session_id).await?;

    if position < 0 {
        return Ok(Json(json!({
            "status": "not_in_queue",
            "message": "Not currently in matching queue"
        })));
    }

    Ok(Json(json!({
        "status": "waiting",
        "queuePosition": position,
        "estimatedWaitTime": ESTIMATED_WAIT
    })))
}
