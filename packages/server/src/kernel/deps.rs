//! Server dependencies (using traits for testability)
//!
//! This module provides the central dependency container used by the domain
//! services and the REST layer. All external services use trait abstractions
//! to enable testing.

use agora::AgoraService;
use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domains::matching::queue::BaseMatchQueue;
use crate::kernel::{BaseAi, BaseCircleStore, BasePushChannel, BaseVoiceService, Clock, VoiceCredentials};

// =============================================================================
// AgoraService Adapter (implements BaseVoiceService trait)
// =============================================================================

/// Wrapper around AgoraService that implements the BaseVoiceService trait
pub struct AgoraAdapter(pub Arc<AgoraService>);

impl AgoraAdapter {
    pub fn new(service: Arc<AgoraService>) -> Self {
        Self(service)
    }
}

#[async_trait]
impl BaseVoiceService for AgoraAdapter {
    async fn provision(
        &self,
        channel_name: &str,
        user_id: Option<&str>,
    ) -> Result<VoiceCredentials> {
        // Derive a numeric uid from the opaque session id when one is given,
        // so the same session always joins with the same participant id.
        let uid = user_id.and_then(|id| {
            let digits: String = id.chars().filter(|c| c.is_ascii_digit()).take(9).collect();
            digits.parse::<u32>().ok()
        });

        let creds = self
            .0
            .generate_rtc_token(channel_name, uid, agora::DEFAULT_TOKEN_TTL_SECS)
            .map_err(|e| anyhow::anyhow!("{}", e))?;

        Ok(VoiceCredentials {
            token: creds.token,
            app_id: creds.app_id,
            channel_name: creds.channel_name,
            uid: creds.uid,
        })
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to domain services and routes
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    /// Ephemeral matching queue. A disabled instance turns every queue
    /// operation into a safe no-op (development without Redis).
    pub queue: Arc<dyn BaseMatchQueue>,
    pub circles: Arc<dyn BaseCircleStore>,
    pub voice: Arc<dyn BaseVoiceService>,
    pub push: Arc<dyn BasePushChannel>,
    pub ai: Arc<dyn BaseAi>,
    pub clock: Arc<dyn Clock>,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies
    pub fn new(
        db_pool: PgPool,
        queue: Arc<dyn BaseMatchQueue>,
        circles: Arc<dyn BaseCircleStore>,
        voice: Arc<dyn BaseVoiceService>,
        push: Arc<dyn BasePushChannel>,
        ai: Arc<dyn BaseAi>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            db_pool,
            queue,
            circles,
            voice,
            push,
            ai,
            clock,
        }
    }
}
