use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Duration;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::domains::matching::models::{ComfortLevel, EmotionalTheme, ALLOWED_DURATIONS};
use crate::domains::sessions::models::UserSession;
use crate::kernel::Clock;
use crate::server::app::AppState;
use crate::server::error::ApiError;

/// Hours an anonymous session stays valid.
const SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub emotional_theme: EmotionalTheme,
    pub emotional_intensity: i32,
    pub comfort_level: ComfortLevel,
    pub timezone: String,
    pub preferred_duration: i32,
}

/// POST /api/sessions/create
pub async fn create_session(
    Extension(state): Extension<AppState>,
    Json(body): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !(1..=10).contains(&body.emotional_intensity) {
        return Err(ApiError::BadRequest(
            "emotionalIntensity must be between 1 and 10".to_string(),
        ));
    }
    if !ALLOWED_DURATIONS.contains(&body.preferred_duration) {
        return Err(ApiError::BadRequest(
            "preferredDuration must be 20 or 30 minutes".to_string(),
        ));
    }

    let now = state.deps.clock.now();
    let session = UserSession {
        session_id: Uuid::new_v4().to_string(),
        emotional_theme: body.emotional_theme.to_string(),
        emotional_intensity: body.emotional_intensity,
        comfort_level: body.comfort_level.to_string(),
        timezone: body.timezone,
        preferred_duration: body.preferred_duration,
        created_at: now,
        expires_at: now + Duration::hours(SESSION_TTL_HOURS),
    };

    session.create(&state.deps.db_pool).await?;

    tracing::info!(session_id = %session.session_id, "Created anonymous session");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "session": session,
            "message": "Session created successfully"
        })),
    ))
}

/// GET /api/sessions/:id
pub async fn get_session(
    Extension(state): Extension<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let now = state.deps.clock.now();
    let session = UserSession::find_active(&session_id, now, &state.deps.db_pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Session not found or expired".to_string()))?;

    Ok(Json(json!({ "session": session })))
}

/// DELETE /api/sessions/:id
pub async fn delete_session(
    Extension(state): Extension<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    UserSession::delete(&session_id, &state.deps.db_pool).await?;

    Ok(Json(json!({ "message": "Session deleted successfully" })))
}
