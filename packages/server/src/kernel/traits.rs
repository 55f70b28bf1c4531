// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (like "form a circle from this group") lives in domain
// functions that use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseVoiceService)

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domains::circles::models::{Circle, CircleStatus};

// =============================================================================
// Voice Provisioning Trait (Infrastructure)
// =============================================================================

/// Credential bundle participants use to join a circle's voice room.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceCredentials {
    pub token: String,
    pub app_id: String,
    pub channel_name: String,
    pub uid: u32,
}

impl VoiceCredentials {
    /// Clearly-marked stand-in credentials issued when the voice provider
    /// is unavailable. The circle still persists; clients render a degraded
    /// state until a real token can be fetched.
    pub fn placeholder(channel_name: &str) -> Self {
        Self {
            token: format!("placeholder_token_{}", channel_name),
            app_id: "placeholder_app_id".to_string(),
            channel_name: channel_name.to_string(),
            uid: 0,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.app_id == "placeholder_app_id"
    }
}

#[async_trait]
pub trait BaseVoiceService: Send + Sync {
    /// Provision a time-bounded credential bundle for a voice room.
    /// `user_id` pins the numeric participant id when provided.
    async fn provision(
        &self,
        channel_name: &str,
        user_id: Option<&str>,
    ) -> Result<VoiceCredentials>;
}

// =============================================================================
// Circle Store Trait (Infrastructure)
// =============================================================================

/// Persistent store for circles and their dependent summaries.
///
/// The matching core borrows access through this contract; the Postgres
/// implementation lives in the circles domain.
#[async_trait]
pub trait BaseCircleStore: Send + Sync {
    async fn insert(&self, circle: &Circle) -> Result<()>;

    async fn find_by_id(&self, circle_id: &str) -> Result<Option<Circle>>;

    async fn update_status(&self, circle_id: &str, status: CircleStatus) -> Result<()>;

    /// Bulk-delete midnight circles whose auto-delete time has passed,
    /// returning the ids of the deleted circles.
    async fn delete_expired_midnight(&self, now: NaiveDateTime) -> Result<Vec<String>>;

    /// Delete summaries referencing any of the given circle ids, returning
    /// the number of rows removed.
    async fn delete_summaries_for(&self, circle_ids: &[String]) -> Result<u64>;
}

// =============================================================================
// AI Trait (Infrastructure - text generation)
// =============================================================================

#[async_trait]
pub trait BaseAi: Send + Sync {
    /// Complete a prompt with an LLM (returns raw text response)
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}
