use serde::{Deserialize, Serialize};

/// Credential bundle a participant needs to join a voice room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RtcCredentials {
    pub token: String,
    pub app_id: String,
    pub channel_name: String,
    pub uid: u32,
}
