//! Post-circle summary generation.
//!
//! Produces the validation message through the AI collaborator (with a
//! canned fallback when it is unavailable) and persists the summary row.

use anyhow::Result;
use chrono::Duration;
use sqlx::PgPool;

use super::models::SessionSummary;
use super::simulation::simulated_speaking_balance;
use crate::domains::circles::models::Circle;
use crate::kernel::{BaseAi, Clock};

/// Days a summary stays readable before it expires.
const SUMMARY_TTL_DAYS: i64 = 7;

/// Message used when the AI collaborator fails or is unconfigured.
pub const VALIDATION_FALLBACK: &str =
    "Thank you for sharing your experience. You were heard, and your presence mattered.";

const VALIDATION_SYSTEM_PROMPT: &str = "You are a compassionate assistant for an anonymous \
emotional support app. Generate a brief, warm, validation-focused message for users who just \
completed a voice circle. The message should be 2-3 sentences, validate their emotions, avoid \
giving advice, be gentle and reassuring, and not mention specific details.";

/// Generate and persist the summary for a finished circle.
pub async fn generate_session_summary(
    ai: &dyn BaseAi,
    clock: &dyn Clock,
    circle: &Circle,
    pool: &PgPool,
) -> Result<SessionSummary> {
    let user_prompt = format!(
        "Generate a validation message for a circle about {}",
        circle.theme
    );

    let validation_message = match ai.complete(VALIDATION_SYSTEM_PROMPT, &user_prompt).await {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(
                circle_id = %circle.circle_id,
                error = %e,
                "Validation message generation failed, using fallback"
            );
            VALIDATION_FALLBACK.to_string()
        }
    };

    let common_emotions = vec![
        circle.theme.clone(),
        "connection".to_string(),
        "relief".to_string(),
    ];
    let speaking_balance = simulated_speaking_balance(circle.participants.len());

    let now = clock.now();
    SessionSummary::create(
        &circle.circle_id,
        &common_emotions,
        &speaking_balance,
        "positive",
        &validation_message,
        now,
        now + Duration::days(SUMMARY_TTL_DAYS),
        pool,
    )
    .await
}
