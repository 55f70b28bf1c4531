//! Circle creation: the endpoint of a successful matching pass.
//!
//! Given a compatible group, the factory fixes the circle's theme, type and
//! expiry, requests voice credentials, persists the circle, and notifies
//! every participant. Only persistence failures abort creation; voice and
//! notification failures degrade.

use bytes::Bytes;
use chrono::Duration;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use super::models::{Circle, CircleStatus, CircleType, MatchFoundNotification};
use crate::domains::matching::models::MatchRequest;
use crate::domains::midnight::policy::{is_midnight_eligible, midnight_theme_for, next_sunrise};
use crate::kernel::{
    session_subject, BaseCircleStore, BasePushChannel, BaseVoiceService, Clock, VoiceCredentials,
};

#[derive(Debug, Error)]
pub enum CircleError {
    #[error("group size {size} outside allowed range {min}..={max}")]
    InvalidGroupSize {
        size: usize,
        min: usize,
        max: usize,
    },

    #[error("duplicate participant in group: {session_id}")]
    DuplicateParticipant { session_id: String },

    #[error("group members do not share a theme")]
    MixedThemes,

    #[error("failed to persist circle: {0}")]
    Persistence(#[source] anyhow::Error),
}

pub struct CircleFactory {
    circles: Arc<dyn BaseCircleStore>,
    voice: Arc<dyn BaseVoiceService>,
    push: Arc<dyn BasePushChannel>,
    clock: Arc<dyn Clock>,
    min_circle_size: usize,
    max_circle_size: usize,
}

impl CircleFactory {
    pub fn new(
        circles: Arc<dyn BaseCircleStore>,
        voice: Arc<dyn BaseVoiceService>,
        push: Arc<dyn BasePushChannel>,
        clock: Arc<dyn Clock>,
        min_circle_size: usize,
        max_circle_size: usize,
    ) -> Self {
        Self {
            circles,
            voice,
            push,
            clock,
            min_circle_size,
            max_circle_size,
        }
    }

    /// Create, persist and announce a circle from a matched group.
    ///
    /// The group must already satisfy the size invariant; violations are
    /// programming errors rejected here before anything is persisted.
    pub async fn create_circle(&self, group: &[MatchRequest]) -> Result<Circle, CircleError> {
        self.validate_group(group)?;

        let circle_id = Uuid::new_v4().to_string();
        let now = self.clock.now();
        let request_theme = group[0].theme;
        let duration = group[0].duration;

        // A circle's type is fixed at creation and never re-evaluated, even
        // if the clock crosses the window boundary mid-session.
        let midnight = is_midnight_eligible(request_theme.as_str(), now);
        let (circle_type, theme, auto_delete_at) = if midnight {
            let theme = midnight_theme_for(now).to_string();
            tracing::info!(theme = %theme, "Creating midnight circle");
            (CircleType::Midnight, theme, Some(next_sunrise(now)))
        } else {
            (CircleType::Standard, request_theme.to_string(), None)
        };

        let credentials = match self.voice.provision(&circle_id, None).await {
            Ok(credentials) => credentials,
            Err(e) => {
                tracing::warn!(
                    circle_id = %circle_id,
                    error = %e,
                    "Voice provisioning failed, issuing placeholder credentials"
                );
                VoiceCredentials::placeholder(&circle_id)
            }
        };

        let circle = Circle {
            circle_id: circle_id.clone(),
            participants: group.iter().map(|r| r.session_id.clone()).collect(),
            theme,
            start_time: now,
            end_time: now + Duration::minutes(duration as i64),
            status: CircleStatus::Waiting.to_string(),
            voice_room_token: credentials.token,
            voice_app_id: credentials.app_id,
            voice_channel_name: credentials.channel_name,
            ai_moderator_active: true,
            circle_type: circle_type.to_string(),
            auto_delete_at,
            created_at: now,
        };

        self.circles
            .insert(&circle)
            .await
            .map_err(CircleError::Persistence)?;

        tracing::info!(
            circle_id = %circle.circle_id,
            circle_type = %circle.circle_type,
            theme = %circle.theme,
            participants = circle.participants.len(),
            "Created circle"
        );

        self.notify_participants(&circle).await;

        Ok(circle)
    }

    fn validate_group(&self, group: &[MatchRequest]) -> Result<(), CircleError> {
        if group.len() < self.min_circle_size || group.len() > self.max_circle_size {
            return Err(CircleError::InvalidGroupSize {
                size: group.len(),
                min: self.min_circle_size,
                max: self.max_circle_size,
            });
        }

        let mut seen = HashSet::new();
        for member in group {
            if !seen.insert(member.session_id.as_str()) {
                return Err(CircleError::DuplicateParticipant {
                    session_id: member.session_id.clone(),
                });
            }
            if member.theme != group[0].theme {
                return Err(CircleError::MixedThemes);
            }
        }
        Ok(())
    }

    /// Publish one match notification per participant. Failures are logged
    /// and never roll back the circle: it already exists and is discoverable
    /// by polling.
    async fn notify_participants(&self, circle: &Circle) {
        let notification = MatchFoundNotification {
            circle_id: circle.circle_id.clone(),
            theme: circle.theme.clone(),
            participant_count: circle.participants.len(),
            start_time: circle.start_time,
            end_time: circle.end_time,
            voice_token: circle.voice_room_token.clone(),
            voice_app_id: circle.voice_app_id.clone(),
            voice_channel_name: circle.voice_channel_name.clone(),
        };

        let payload = match serde_json::to_vec(&notification) {
            Ok(payload) => Bytes::from(payload),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize match notification");
                return;
            }
        };

        for session_id in &circle.participants {
            if let Err(e) = self
                .push
                .publish(session_subject(session_id), payload.clone())
                .await
            {
                tracing::warn!(
                    session_id = %session_id,
                    circle_id = %circle.circle_id,
                    error = %e,
                    "Failed to publish match notification"
                );
            }
        }
    }
}
