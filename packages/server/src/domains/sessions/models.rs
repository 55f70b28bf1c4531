use anyhow::Result;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// UserSession - an anonymous participant identity, valid for 24 hours.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub session_id: String,
    pub emotional_theme: String,
    pub emotional_intensity: i32,
    pub comfort_level: String,
    pub timezone: String,
    pub preferred_duration: i32,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

/// SessionSummary - AI-written recap persisted after a circle ends.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub summary_id: i32,
    pub circle_id: String,
    pub common_emotions: Vec<String>,
    /// Percentage of speaking time per participant, summing to ~100.
    pub speaking_balance: Vec<f64>,
    pub sentiment_trend: String, // 'positive', 'neutral', 'negative'
    pub validation_message: String,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

/// SafetyReport - a participant flagging a circle.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SafetyReport {
    pub report_id: String,
    pub circle_id: String,
    pub reporter_session_id: String,
    pub reason: String,
    pub timestamp: NaiveDateTime,
    pub action_taken: Option<String>,
}

// =============================================================================
// UserSession Queries
// =============================================================================

impl UserSession {
    /// Persist a new session
    pub async fn create(&self, pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_sessions (
                session_id, emotional_theme, emotional_intensity, comfort_level,
                timezone, preferred_duration, created_at, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&self.session_id)
        .bind(&self.emotional_theme)
        .bind(self.emotional_intensity)
        .bind(&self.comfort_level)
        .bind(&self.timezone)
        .bind(self.preferred_duration)
        .bind(self.created_at)
        .bind(self.expires_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Find a session that has not expired yet
    pub async fn find_active(
        session_id: &str,
        now: NaiveDateTime,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let session = sqlx::query_as::<_, UserSession>(
            "SELECT * FROM user_sessions WHERE session_id = $1 AND expires_at > $2",
        )
        .bind(session_id)
        .bind(now)
        .fetch_optional(pool)
        .await?;
        Ok(session)
    }

    /// Delete a session (logout)
    pub async fn delete(session_id: &str, pool: &PgPool) -> Result<()> {
        sqlx::query("DELETE FROM user_sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(pool)
            .await?;
        Ok(())
    }
}

// =============================================================================
// SessionSummary Queries
// =============================================================================

impl SessionSummary {
    /// Persist a new summary
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        circle_id: &str,
        common_emotions: &[String],
        speaking_balance: &[f64],
        sentiment_trend: &str,
        validation_message: &str,
        created_at: NaiveDateTime,
        expires_at: NaiveDateTime,
        pool: &PgPool,
    ) -> Result<Self> {
        let summary = sqlx::query_as::<_, SessionSummary>(
            r#"
            INSERT INTO session_summaries (
                circle_id, common_emotions, speaking_balance, sentiment_trend,
                validation_message, created_at, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(circle_id)
        .bind(common_emotions)
        .bind(speaking_balance)
        .bind(sentiment_trend)
        .bind(validation_message)
        .bind(created_at)
        .bind(expires_at)
        .fetch_one(pool)
        .await?;
        Ok(summary)
    }

    /// Find the summary for a circle
    pub async fn find_by_circle(circle_id: &str, pool: &PgPool) -> Result<Option<Self>> {
        let summary = sqlx::query_as::<_, SessionSummary>(
            "SELECT * FROM session_summaries WHERE circle_id = $1",
        )
        .bind(circle_id)
        .fetch_optional(pool)
        .await?;
        Ok(summary)
    }

    /// Bulk-delete summaries referencing any of the given circles,
    /// returning the number of rows removed.
    pub async fn delete_for_circles(circle_ids: &[String], pool: &PgPool) -> Result<u64> {
        let result = sqlx::query("DELETE FROM session_summaries WHERE circle_id = ANY($1)")
            .bind(circle_ids)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

// =============================================================================
// SafetyReport Queries
// =============================================================================

impl SafetyReport {
    /// Persist a new report
    pub async fn create(&self, pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO safety_reports (
                report_id, circle_id, reporter_session_id, reason, timestamp, action_taken
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&self.report_id)
        .bind(&self.circle_id)
        .bind(&self.reporter_session_id)
        .bind(&self.reason)
        .bind(self.timestamp)
        .bind(&self.action_taken)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record the action taken for a report
    pub async fn update_action(report_id: &str, action_taken: &str, pool: &PgPool) -> Result<()> {
        sqlx::query("UPDATE safety_reports SET action_taken = $2 WHERE report_id = $1")
            .bind(report_id)
            .bind(action_taken)
            .execute(pool)
            .await?;
        Ok(())
    }
}
