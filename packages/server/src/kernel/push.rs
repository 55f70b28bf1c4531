//! Push notification channel abstraction for production and testing.
//!
//! Matched participants are told their circle is ready over a
//! subject-addressable publish mechanism (NATS in production). Publishing is
//! at-most-once and fire-and-forget: a failed publish is logged by the
//! caller and never rolls back circle creation, since clients can poll the
//! circle endpoints as a fallback.

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::RwLock;

/// A published notification.
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub subject: String,
    pub payload: Bytes,
}

/// Trait for publish operations on the push channel.
///
/// This allows swapping between real NATS, a no-op channel when NATS is not
/// configured, and a recording test double.
#[async_trait]
pub trait BasePushChannel: Send + Sync {
    /// Publish a payload to a subject. At-most-once delivery.
    async fn publish(&self, subject: String, payload: Bytes) -> Result<()>;
}

/// Subject a session listens on for its match notification.
pub fn session_subject(session_id: &str) -> String {
    format!("sessions.{}.match_found", session_id)
}

/// Real NATS-backed push channel.
pub struct NatsPushChannel {
    client: async_nats::Client,
}

impl NatsPushChannel {
    pub fn new(client: async_nats::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BasePushChannel for NatsPushChannel {
    async fn publish(&self, subject: String, payload: Bytes) -> Result<()> {
        self.client.publish(subject, payload).await?;
        Ok(())
    }
}

/// Push channel used when no NATS server is configured. Drops every message
/// so the rest of the pipeline keeps working; clients fall back to polling.
#[derive(Default)]
pub struct NoopPushChannel;

#[async_trait]
impl BasePushChannel for NoopPushChannel {
    async fn publish(&self, subject: String, _payload: Bytes) -> Result<()> {
        tracing::debug!(subject = %subject, "push channel disabled, dropping notification");
        Ok(())
    }
}

/// Recording push channel for tests: tracks everything that would have been
/// published without requiring a real connection.
#[derive(Default)]
pub struct TestPushChannel {
    published: RwLock<Vec<PublishedMessage>>,
}

impl TestPushChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all published messages.
    pub fn published_messages(&self) -> Vec<PublishedMessage> {
        self.published
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Get published messages for a specific subject.
    pub fn messages_for_subject(&self, subject: &str) -> Vec<PublishedMessage> {
        self.published
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|m| m.subject == subject)
            .cloned()
            .collect()
    }

    /// Check if any message was published to a subject.
    pub fn was_published_to(&self, subject: &str) -> bool {
        self.published
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|m| m.subject == subject)
    }

    /// Get the count of published messages.
    pub fn publish_count(&self) -> usize {
        self.published.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Deserialize a published message payload as JSON.
    pub fn deserialize_message<T: serde::de::DeserializeOwned>(
        &self,
        msg: &PublishedMessage,
    ) -> std::result::Result<T, serde_json::Error> {
        serde_json::from_slice(&msg.payload)
    }
}

#[async_trait]
impl BasePushChannel for TestPushChannel {
    async fn publish(&self, subject: String, payload: Bytes) -> Result<()> {
        self.published
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(PublishedMessage { subject, payload });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_and_retrieve_messages() {
        let channel = TestPushChannel::new();

        channel
            .publish(
                session_subject("abc"),
                Bytes::from(r#"{"circleId":"123"}"#),
            )
            .await
            .unwrap();

        assert_eq!(channel.publish_count(), 1);
        assert!(channel.was_published_to("sessions.abc.match_found"));
        assert!(!channel.was_published_to("sessions.def.match_found"));
    }

    #[tokio::test]
    async fn test_messages_for_subject() {
        let channel = TestPushChannel::new();

        channel
            .publish(session_subject("a"), Bytes::new())
            .await
            .unwrap();
        channel
            .publish(session_subject("a"), Bytes::new())
            .await
            .unwrap();
        channel
            .publish(session_subject("b"), Bytes::new())
            .await
            .unwrap();

        assert_eq!(channel.messages_for_subject("sessions.a.match_found").len(), 2);
        assert_eq!(channel.messages_for_subject("sessions.b.match_found").len(), 1);
    }

    #[tokio::test]
    async fn test_noop_channel_accepts_everything() {
        let channel = NoopPushChannel;
        assert!(channel
            .publish("sessions.x.match_found".to_string(), Bytes::new())
            .await
            .is_ok());
    }
}
