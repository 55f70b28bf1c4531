// Mock implementations for testing
//
// Provides in-memory doubles for the persistent store, voice provisioning
// and text generation, so matching-pipeline behavior can be exercised
// without Postgres, Agora or OpenAI.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::{BaseAi, BaseCircleStore, BaseVoiceService, VoiceCredentials};
use crate::domains::circles::models::{Circle, CircleStatus, CircleType};

// =============================================================================
// In-memory Circle Store
// =============================================================================

/// Circle store backed by a Vec, with a switch to simulate persistence
/// failures.
#[derive(Default)]
pub struct TestCircleStore {
    circles: Mutex<Vec<Circle>>,
    deleted_summary_ids: Mutex<Vec<String>>,
    fail_inserts: AtomicBool,
}

impl TestCircleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent insert fail, to exercise the
    /// leave-members-queued path.
    pub fn set_fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn circles(&self) -> Vec<Circle> {
        self.circles.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn circle_count(&self) -> usize {
        self.circles.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Circle ids whose summaries were bulk-deleted.
    pub fn deleted_summary_ids(&self) -> Vec<String> {
        self.deleted_summary_ids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Seed a circle directly, bypassing the factory.
    pub fn seed(&self, circle: Circle) {
        self.circles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(circle);
    }
}

#[async_trait]
impl BaseCircleStore for TestCircleStore {
    async fn insert(&self, circle: &Circle) -> Result<()> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            bail!("simulated persistence failure");
        }
        self.circles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(circle.clone());
        Ok(())
    }

    async fn find_by_id(&self, circle_id: &str) -> Result<Option<Circle>> {
        Ok(self
            .circles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|c| c.circle_id == circle_id)
            .cloned())
    }

    async fn update_status(&self, circle_id: &str, status: CircleStatus) -> Result<()> {
        let mut circles = self.circles.lock().unwrap_or_else(|e| e.into_inner());
        let circle = circles
            .iter_mut()
            .find(|c| c.circle_id == circle_id)
            .ok_or_else(|| anyhow!("circle not found: {}", circle_id))?;
        circle.status = status.to_string();
        Ok(())
    }

    async fn delete_expired_midnight(&self, now: NaiveDateTime) -> Result<Vec<String>> {
        let mut circles = self.circles.lock().unwrap_or_else(|e| e.into_inner());
        let expired: Vec<String> = circles
            .iter()
            .filter(|c| {
                c.circle_type == CircleType::Midnight.to_string()
                    && c.auto_delete_at.is_some_and(|at| at < now)
            })
            .map(|c| c.circle_id.clone())
            .collect();
        circles.retain(|c| !expired.contains(&c.circle_id));
        Ok(expired)
    }

    async fn delete_summaries_for(&self, circle_ids: &[String]) -> Result<u64> {
        self.deleted_summary_ids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(circle_ids);
        Ok(circle_ids.len() as u64)
    }
}

// =============================================================================
// Mock Voice Service
// =============================================================================

/// Voice service that returns deterministic credentials, or fails on demand
/// to exercise the placeholder-credentials path.
#[derive(Default)]
pub struct MockVoiceService {
    fail: AtomicBool,
}

impl MockVoiceService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl BaseVoiceService for MockVoiceService {
    async fn provision(
        &self,
        channel_name: &str,
        _user_id: Option<&str>,
    ) -> Result<VoiceCredentials> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("simulated provisioning failure");
        }
        Ok(VoiceCredentials {
            token: format!("test_token_{}", channel_name),
            app_id: "test_app_id".to_string(),
            channel_name: channel_name.to_string(),
            uid: 12345,
        })
    }
}

// =============================================================================
// Canned AI
// =============================================================================

/// Text generator returning a canned response, or failing to exercise the
/// fallback-message path.
pub struct TestAi {
    response: Option<String>,
}

impl TestAi {
    pub fn with_response(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self { response: None }
    }
}

#[async_trait]
impl BaseAi for TestAi {
    async fn complete(&self, _system_prompt: &str, _user_prompt: &str) -> Result<String> {
        self.response
            .clone()
            .ok_or_else(|| anyhow!("simulated completion failure"))
    }
}
