// Agora RTC credential builder for voice circles.
//
// Tokens are signed locally with the app certificate (HMAC-SHA256), so no
// network round trip is needed to provision a voice room.

use std::time::{SystemTime, UNIX_EPOCH};

pub mod models;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

use crate::models::RtcCredentials;

type HmacSha256 = Hmac<Sha256>;

/// Token format version prefix, carried at the front of every issued token.
const TOKEN_VERSION: &str = "007";

/// Default credential lifetime: one hour.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

#[derive(Debug, Clone)]
pub struct AgoraOptions {
    pub app_id: String,
    pub app_certificate: String,
}

#[derive(Debug, Clone)]
pub struct AgoraService {
    options: AgoraOptions,
}

impl AgoraService {
    pub fn new(options: AgoraOptions) -> Self {
        Self { options }
    }

    /// Whether real credentials can be issued. When unconfigured, callers
    /// are expected to fall back to placeholder credentials.
    pub fn is_configured(&self) -> bool {
        !self.options.app_id.is_empty() && !self.options.app_certificate.is_empty()
    }

    /// Build a time-bounded RTC credential bundle for a channel.
    ///
    /// When `uid` is not supplied a random numeric participant id is
    /// generated, matching what the mobile clients expect to join with.
    pub fn generate_rtc_token(
        &self,
        channel_name: &str,
        uid: Option<u32>,
        ttl_secs: u64,
    ) -> Result<RtcCredentials, &'static str> {
        if !self.is_configured() {
            return Err("Agora credentials not configured");
        }

        if channel_name.is_empty() {
            return Err("Channel name must not be empty");
        }

        let uid = uid.unwrap_or_else(|| rand::thread_rng().gen_range(1..100_000));

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| "System clock is before the Unix epoch")?
            .as_secs();
        let privilege_expired_ts = now + ttl_secs;

        let claims = format!(
            "{}:{}:{}:{}",
            self.options.app_id, channel_name, uid, privilege_expired_ts
        );

        let mut mac = HmacSha256::new_from_slice(self.options.app_certificate.as_bytes())
            .map_err(|_| "Invalid app certificate")?;
        mac.update(claims.as_bytes());
        let signature = BASE64.encode(mac.finalize().into_bytes());

        let token = format!(
            "{}{}",
            TOKEN_VERSION,
            BASE64.encode(format!("{}:{}", claims, signature))
        );

        Ok(RtcCredentials {
            token,
            app_id: self.options.app_id.clone(),
            channel_name: channel_name.to_string(),
            uid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured_service() -> AgoraService {
        AgoraService::new(AgoraOptions {
            app_id: "test-app-id".to_string(),
            app_certificate: "test-certificate".to_string(),
        })
    }

    #[test]
    fn test_unconfigured_service_refuses_to_issue() {
        let service = AgoraService::new(AgoraOptions {
            app_id: String::new(),
            app_certificate: String::new(),
        });

        assert!(!service.is_configured());
        assert!(service
            .generate_rtc_token("circle-1", None, DEFAULT_TOKEN_TTL_SECS)
            .is_err());
    }

    #[test]
    fn test_token_carries_version_prefix_and_channel() {
        let service = configured_service();
        let creds = service
            .generate_rtc_token("circle-1", Some(42), DEFAULT_TOKEN_TTL_SECS)
            .unwrap();

        assert!(creds.token.starts_with(TOKEN_VERSION));
        assert_eq!(creds.channel_name, "circle-1");
        assert_eq!(creds.app_id, "test-app-id");
        assert_eq!(creds.uid, 42);
    }

    #[test]
    fn test_random_uid_when_not_supplied() {
        let service = configured_service();
        let creds = service
            .generate_rtc_token("circle-1", None, DEFAULT_TOKEN_TTL_SECS)
            .unwrap();

        assert!(creds.uid >= 1 && creds.uid < 100_000);
    }

    #[test]
    fn test_empty_channel_rejected() {
        let service = configured_service();
        assert!(service
            .generate_rtc_token("", None, DEFAULT_TOKEN_TTL_SECS)
            .is_err());
    }
}
