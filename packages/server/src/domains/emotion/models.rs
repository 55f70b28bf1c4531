use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The six emotion axes every profile is scored on.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum EmotionAxis {
    Sadness,
    Anxiety,
    Joy,
    Anger,
    Fear,
    Calmness,
}

impl EmotionAxis {
    pub const ALL: [EmotionAxis; 6] = [
        EmotionAxis::Sadness,
        EmotionAxis::Anxiety,
        EmotionAxis::Joy,
        EmotionAxis::Anger,
        EmotionAxis::Fear,
        EmotionAxis::Calmness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionAxis::Sadness => "Sadness",
            EmotionAxis::Anxiety => "Anxiety",
            EmotionAxis::Joy => "Joy",
            EmotionAxis::Anger => "Anger",
            EmotionAxis::Fear => "Fear",
            EmotionAxis::Calmness => "Calmness",
        }
    }
}

impl std::fmt::Display for EmotionAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VoiceTone {
    Calm,
    Anxious,
    Sad,
    Energetic,
}

impl std::fmt::Display for VoiceTone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoiceTone::Calm => write!(f, "calm"),
            VoiceTone::Anxious => write!(f, "anxious"),
            VoiceTone::Sad => write!(f, "sad"),
            VoiceTone::Energetic => write!(f, "energetic"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VoicePace {
    Slow,
    Normal,
    Fast,
}

impl std::fmt::Display for VoicePace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoicePace::Slow => write!(f, "slow"),
            VoicePace::Normal => write!(f, "normal"),
            VoicePace::Fast => write!(f, "fast"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoiceCharacteristics {
    pub tone: VoiceTone,
    pub pace: VoicePace,
    /// 0-100
    pub energy: f64,
}

/// Self-reported emotional profile used for twin matching.
///
/// Axis scores are normalized to [0, 1]. Profiles come from declarative
/// survey input, not from signal processing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoiceEmotionProfile {
    pub user_id: String,
    pub primary_emotion: String,
    pub emotion_scores: BTreeMap<EmotionAxis, f64>,
    pub voice_characteristics: VoiceCharacteristics,
    pub recorded_at: DateTime<Utc>,
    /// Compact identifier for matching dashboards.
    pub signature: String,
}

impl VoiceEmotionProfile {
    /// Score on one axis, treating missing axes as zero.
    pub fn score(&self, axis: EmotionAxis) -> f64 {
        self.emotion_scores.get(&axis).copied().unwrap_or(0.0)
    }
}

/// A scored pairing of two profiles above the twin threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionalTwinMatch {
    pub user_id_1: String,
    pub user_id_2: String,
    /// 0-100
    pub match_score: i32,
    /// Axes where both profiles score above 0.5.
    pub shared_emotions: Vec<EmotionAxis>,
    pub matched_characteristics: Vec<String>,
}
