use anyhow::Result;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Circle - a scheduled small-group voice session matched by theme/intensity.
///
/// Timestamps are wall-clock naive: the midnight policy is local-hour based
/// and the schema uses plain TIMESTAMP columns.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Circle {
    pub circle_id: String,
    /// Session ids of the matched participants, in matched order.
    pub participants: Vec<String>,
    /// Request theme's wire label for standard circles; the rotating special
    /// theme for midnight circles.
    pub theme: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: String, // 'waiting', 'active', 'completed', 'terminated'
    pub voice_room_token: String,
    pub voice_app_id: String,
    pub voice_channel_name: String,
    pub ai_moderator_active: bool,
    pub circle_type: String, // 'standard', 'midnight'
    /// Set only for midnight circles: the sunrise instant the sweeper
    /// deletes them at.
    pub auto_delete_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

/// Circle status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CircleStatus {
    Waiting,
    Active,
    Completed,
    Terminated,
}

impl std::fmt::Display for CircleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircleStatus::Waiting => write!(f, "waiting"),
            CircleStatus::Active => write!(f, "active"),
            CircleStatus::Completed => write!(f, "completed"),
            CircleStatus::Terminated => write!(f, "terminated"),
        }
    }
}

impl std::str::FromStr for CircleStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "waiting" => Ok(CircleStatus::Waiting),
            "active" => Ok(CircleStatus::Active),
            "completed" => Ok(CircleStatus::Completed),
            "terminated" => Ok(CircleStatus::Terminated),
            _ => Err(anyhow::anyhow!("Invalid circle status: {}", s)),
        }
    }
}

/// Circle type enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CircleType {
    Standard,
    Midnight,
}

impl std::fmt::Display for CircleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircleType::Standard => write!(f, "standard"),
            CircleType::Midnight => write!(f, "midnight"),
        }
    }
}

impl std::str::FromStr for CircleType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "standard" => Ok(CircleType::Standard),
            "midnight" => Ok(CircleType::Midnight),
            _ => Err(anyhow::anyhow!("Invalid circle type: {}", s)),
        }
    }
}

/// Payload published to each matched participant's subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchFoundNotification {
    pub circle_id: String,
    pub theme: String,
    pub participant_count: usize,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub voice_token: String,
    pub voice_app_id: String,
    pub voice_channel_name: String,
}

// =============================================================================
// Circle Queries
// =============================================================================

impl Circle {
    /// Persist a new circle
    pub async fn insert(&self, pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO circle_sessions (
                circle_id, participants, theme, start_time, end_time, status,
                voice_room_token, voice_app_id, voice_channel_name,
                ai_moderator_active, circle_type, auto_delete_at, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(&self.circle_id)
        .bind(&self.participants)
        .bind(&self.theme)
        .bind(self.start_time)
        .bind(self.end_time)
        .bind(&self.status)
        .bind(&self.voice_room_token)
        .bind(&self.voice_app_id)
        .bind(&self.voice_channel_name)
        .bind(self.ai_moderator_active)
        .bind(&self.circle_type)
        .bind(self.auto_delete_at)
        .bind(self.created_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Find circle by ID
    pub async fn find_by_id(circle_id: &str, pool: &PgPool) -> Result<Option<Self>> {
        let circle =
            sqlx::query_as::<_, Circle>("SELECT * FROM circle_sessions WHERE circle_id = $1")
                .bind(circle_id)
                .fetch_optional(pool)
                .await?;
        Ok(circle)
    }

    /// Update circle status
    pub async fn update_status(circle_id: &str, status: CircleStatus, pool: &PgPool) -> Result<()> {
        sqlx::query("UPDATE circle_sessions SET status = $2 WHERE circle_id = $1")
            .bind(circle_id)
            .bind(status.to_string())
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Delete midnight circles whose auto-delete time has passed, returning
    /// the deleted circle ids.
    pub async fn delete_expired_midnight(
        now: NaiveDateTime,
        pool: &PgPool,
    ) -> Result<Vec<String>> {
        let ids = sqlx::query_scalar::<_, String>(
            r#"
            DELETE FROM circle_sessions
            WHERE circle_type = 'midnight' AND auto_delete_at < $1
            RETURNING circle_id
            "#,
        )
        .bind(now)
        .fetch_all(pool)
        .await?;
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_round_trip() {
        for status in [
            CircleStatus::Waiting,
            CircleStatus::Active,
            CircleStatus::Completed,
            CircleStatus::Terminated,
        ] {
            assert_eq!(CircleStatus::from_str(&status.to_string()).unwrap(), status);
        }
    }

    #[test]
    fn test_type_round_trip() {
        assert_eq!(
            CircleType::from_str(&CircleType::Midnight.to_string()).unwrap(),
            CircleType::Midnight
        );
        assert!(CircleType::from_str("weekly").is_err());
    }
}
