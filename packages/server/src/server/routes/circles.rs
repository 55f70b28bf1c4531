use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::domains::circles::models::CircleStatus;
use crate::domains::sessions::models::SafetyReport;
use crate::domains::sessions::summary::generate_session_summary;
use crate::kernel::Clock;
use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportCircleRequest {
    pub session_id: String,
    pub reason: String,
    pub severity: Option<String>,
    pub details: Option<String>,
}

/// GET /api/circles/:id
pub async fn get_circle(
    Extension(state): Extension<AppState>,
    Path(circle_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let circle = state
        .deps
        .circles
        .find_by_id(&circle_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Circle not found".to_string()))?;

    Ok(Json(json!({
        "circleId": circle.circle_id,
        "theme": circle.theme,
        "participantCount": circle.participants.len(),
        "startTime": circle.start_time,
        "endTime": circle.end_time,
        "status": circle.status,
        "circleType": circle.circle_type,
        "voiceAppId": circle.voice_app_id,
        "voiceChannelName": circle.voice_channel_name,
        "voiceRoomToken": circle.voice_room_token
    })))
}

/// GET /api/circles/:id/token
pub async fn get_circle_token(
    Extension(state): Extension<AppState>,
    Path(circle_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let circle = state
        .deps
        .circles
        .find_by_id(&circle_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Circle not found".to_string()))?;

    Ok(Json(json!({
        "token": circle.voice_room_token,
        "appId": circle.voice_app_id,
        "channelName": circle.voice_channel_name
    })))
}

/// POST /api/circles/:id/report
///
/// High-severity reports (and harassment/abuse reasons) terminate the
/// circle immediately; everything else is flagged for review.
pub async fn report_circle(
    Extension(state): Extension<AppState>,
    Path(circle_id): Path<String>,
    Json(body): Json<ReportCircleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.session_id.is_empty() || body.reason.is_empty() {
        return Err(ApiError::BadRequest(
            "sessionId and reason are required".to_string(),
        ));
    }

    state
        .deps
        .circles
        .find_by_id(&circle_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Circle not found".to_string()))?;

    let reason = match &body.details {
        Some(details) => format!("{}: {}", body.reason, details),
        None => body.reason.clone(),
    };

    let report = SafetyReport {
        report_id: Uuid::new_v4().to_string(),
        circle_id: circle_id.clone(),
        reporter_session_id: body.session_id,
        reason: reason.clone(),
        timestamp: state.deps.clock.now(),
        action_taken: Some("Under review".to_string()),
    };
    report.create(&state.deps.db_pool).await?;

    let reason_lower = reason.to_lowercase();
    let severe = body.severity.as_deref() == Some("high")
        || reason_lower.contains("harassment")
        || reason_lower.contains("abuse");

    let action_taken = if severe {
        state
            .deps
            .circles
            .update_status(&circle_id, CircleStatus::Terminated)
            .await?;
        tracing::warn!(
            circle_id = %circle_id,
            report_id = %report.report_id,
            "Circle terminated after high-severity safety report"
        );
        "Circle terminated immediately"
    } else {
        tracing::info!(
            circle_id = %circle_id,
            report_id = %report.report_id,
            "Safety report flagged for review"
        );
        "Flagged for moderator review"
    };

    SafetyReport::update_action(&report.report_id, action_taken, &state.deps.db_pool).await?;

    Ok(Json(json!({
        "reportId": report.report_id,
        "actionTaken": action_taken,
        "message": "Report received"
    })))
}

/// POST /api/circles/:id/end
///
/// Marks the circle completed and generates its summary.
pub async fn end_circle(
    Extension(state): Extension<AppState>,
    Path(circle_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let circle = state
        .deps
        .circles
        .find_by_id(&circle_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Circle not found".to_string()))?;

    state
        .deps
        .circles
        .update_status(&circle_id, CircleStatus::Completed)
        .await?;

    let summary = generate_session_summary(
        state.deps.ai.as_ref(),
        state.deps.clock.as_ref(),
        &circle,
        &state.deps.db_pool,
    )
    .await?;

    Ok(Json(json!({
        "message": "Circle ended",
        "summary": summary
    })))
}
