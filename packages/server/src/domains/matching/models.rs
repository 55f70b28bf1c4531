use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durations (minutes) a circle may be requested for.
pub const ALLOWED_DURATIONS: [i32; 2] = [20, 30];

/// Closed set of emotional topics. Theme equality is the hard partition key
/// for matching; there is no fuzzy theme matching.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum EmotionalTheme {
    Loneliness,
    WorkStress,
    Breakup,
    Anxiety,
    FeelingStuck,
    Grief,
    Overwhelm,
}

impl EmotionalTheme {
    /// Wire label, as stored in queue payloads and circle rows.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionalTheme::Loneliness => "loneliness",
            EmotionalTheme::WorkStress => "work-stress",
            EmotionalTheme::Breakup => "breakup",
            EmotionalTheme::Anxiety => "anxiety",
            EmotionalTheme::FeelingStuck => "feeling-stuck",
            EmotionalTheme::Grief => "grief",
            EmotionalTheme::Overwhelm => "overwhelm",
        }
    }
}

impl std::fmt::Display for EmotionalTheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EmotionalTheme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "loneliness" => Ok(EmotionalTheme::Loneliness),
            "work-stress" => Ok(EmotionalTheme::WorkStress),
            "breakup" => Ok(EmotionalTheme::Breakup),
            "anxiety" => Ok(EmotionalTheme::Anxiety),
            "feeling-stuck" => Ok(EmotionalTheme::FeelingStuck),
            "grief" => Ok(EmotionalTheme::Grief),
            "overwhelm" => Ok(EmotionalTheme::Overwhelm),
            _ => Err(anyhow::anyhow!("Invalid emotional theme: {}", s)),
        }
    }
}

/// How much a participant expects to speak.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ComfortLevel {
    Listening,
    SharingSometimes,
    Comfortable,
}

impl ComfortLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComfortLevel::Listening => "listening",
            ComfortLevel::SharingSometimes => "sharing-sometimes",
            ComfortLevel::Comfortable => "comfortable",
        }
    }
}

impl std::fmt::Display for ComfortLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ComfortLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "listening" => Ok(ComfortLevel::Listening),
            "sharing-sometimes" => Ok(ComfortLevel::SharingSometimes),
            "comfortable" => Ok(ComfortLevel::Comfortable),
            _ => Err(anyhow::anyhow!("Invalid comfort level: {}", s)),
        }
    }
}

/// A pending request to be matched into a circle.
///
/// Lives in the ephemeral queue store keyed by session id; removed when
/// matched or when the user explicitly leaves the queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    pub session_id: String,
    pub theme: EmotionalTheme,
    /// Self-reported emotional intensity, 1-10.
    pub intensity: i32,
    pub comfort_level: ComfortLevel,
    pub timezone: String,
    /// Requested circle duration in minutes.
    pub duration: i32,
    pub enqueued_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_theme_labels_round_trip() {
        for theme in [
            EmotionalTheme::Loneliness,
            EmotionalTheme::WorkStress,
            EmotionalTheme::Breakup,
            EmotionalTheme::Anxiety,
            EmotionalTheme::FeelingStuck,
            EmotionalTheme::Grief,
            EmotionalTheme::Overwhelm,
        ] {
            assert_eq!(EmotionalTheme::from_str(theme.as_str()).unwrap(), theme);
        }
    }

    #[test]
    fn test_unknown_theme_rejected() {
        assert!(EmotionalTheme::from_str("happiness").is_err());
    }

    #[test]
    fn test_match_request_wire_format_is_camel_case() {
        let request = MatchRequest {
            session_id: "s-1".to_string(),
            theme: EmotionalTheme::WorkStress,
            intensity: 5,
            comfort_level: ComfortLevel::SharingSometimes,
            timezone: "America/Chicago".to_string(),
            duration: 20,
            enqueued_at: chrono::Utc::now(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["sessionId"], "s-1");
        assert_eq!(json["theme"], "work-stress");
        assert_eq!(json["comfortLevel"], "sharing-sometimes");
    }
}
