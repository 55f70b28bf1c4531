//! Profile derivation from declarative self-report.
//!
//! Builds a `VoiceEmotionProfile` from survey answers alone. The mapping is
//! deterministic: theme picks the primary emotion, intensity sets the axis
//! scores, and tone/pace/energy follow from the dominant axis.

use chrono::Utc;
use std::collections::BTreeMap;

use super::models::{
    EmotionAxis, VoiceCharacteristics, VoiceEmotionProfile, VoicePace, VoiceTone,
};
use crate::domains::matching::models::{ComfortLevel, EmotionalTheme};

/// Survey answers a profile is derived from.
#[derive(Debug, Clone)]
pub struct SurveyInput {
    pub user_id: String,
    pub theme: EmotionalTheme,
    /// 1-10
    pub intensity: i32,
    pub comfort_level: ComfortLevel,
}

/// Primary emotion label for a theme.
fn primary_emotion(theme: EmotionalTheme) -> &'static str {
    match theme {
        EmotionalTheme::Loneliness | EmotionalTheme::Breakup | EmotionalTheme::Grief => "Sadness",
        EmotionalTheme::WorkStress | EmotionalTheme::Anxiety | EmotionalTheme::Overwhelm => {
            "Anxiety"
        }
        EmotionalTheme::FeelingStuck => "Frustration",
    }
}

/// Derive a full emotion profile from survey answers.
pub fn profile_from_survey(input: SurveyInput) -> VoiceEmotionProfile {
    let primary = primary_emotion(input.theme);
    let level = f64::from(input.intensity.clamp(1, 10)) / 10.0;

    let mut scores: BTreeMap<EmotionAxis, f64> = BTreeMap::new();

    // Primary axis tracks intensity directly when the label is an axis
    // ("Frustration" is a label only).
    match primary {
        "Sadness" => {
            scores.insert(EmotionAxis::Sadness, level);
        }
        "Anxiety" => {
            scores.insert(EmotionAxis::Anxiety, level);
        }
        _ => {}
    }

    // Secondary axes per theme
    match input.theme {
        EmotionalTheme::Loneliness => {
            scores.insert(EmotionAxis::Fear, level * 0.5);
            scores.insert(EmotionAxis::Calmness, 1.0 - level);
        }
        EmotionalTheme::Anxiety | EmotionalTheme::WorkStress => {
            scores.insert(EmotionAxis::Fear, level * 0.6);
            scores.insert(EmotionAxis::Calmness, 1.0 - level);
        }
        EmotionalTheme::Overwhelm => {
            scores.insert(EmotionAxis::Sadness, level * 0.4);
            scores.insert(EmotionAxis::Anger, level * 0.3);
        }
        _ => {}
    }

    let anxiety = scores.get(&EmotionAxis::Anxiety).copied().unwrap_or(0.0);
    let sadness = scores.get(&EmotionAxis::Sadness).copied().unwrap_or(0.0);
    let calmness = scores.get(&EmotionAxis::Calmness).copied().unwrap_or(0.0);

    let (tone, mut pace, mut energy) = if anxiety > 0.6 {
        (VoiceTone::Anxious, VoicePace::Fast, 70.0 + anxiety * 30.0)
    } else if sadness > 0.6 {
        (VoiceTone::Sad, VoicePace::Slow, 30.0 - sadness * 20.0)
    } else if calmness > 0.6 {
        (VoiceTone::Calm, VoicePace::Normal, 40.0 + calmness * 20.0)
    } else {
        (VoiceTone::Energetic, VoicePace::Normal, 60.0)
    };

    // Comfort level shifts delivery without changing the emotion mix
    match input.comfort_level {
        ComfortLevel::Listening => {
            energy = (energy - 20.0).max(20.0);
            pace = VoicePace::Slow;
        }
        ComfortLevel::Comfortable => {
            energy = (energy + 10.0).min(80.0);
        }
        ComfortLevel::SharingSometimes => {}
    }

    let signature = format!("{}-{}-{}-{}", primary, tone, pace, energy.round() as i64);

    VoiceEmotionProfile {
        user_id: input.user_id,
        primary_emotion: primary.to_string(),
        emotion_scores: scores,
        voice_characteristics: VoiceCharacteristics { tone, pace, energy },
        recorded_at: Utc::now(),
        signature,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn survey(theme: EmotionalTheme, intensity: i32, comfort: ComfortLevel) -> SurveyInput {
        SurveyInput {
            user_id: "u1".to_string(),
            theme,
            intensity,
            comfort_level: comfort,
        }
    }

    #[test]
    fn test_high_anxiety_sounds_anxious_and_fast() {
        let profile = profile_from_survey(survey(
            EmotionalTheme::Anxiety,
            8,
            ComfortLevel::SharingSometimes,
        ));

        assert_eq!(profile.primary_emotion, "Anxiety");
        assert_eq!(profile.voice_characteristics.tone, VoiceTone::Anxious);
        assert_eq!(profile.voice_characteristics.pace, VoicePace::Fast);
        assert!(profile.voice_characteristics.energy > 70.0);
        assert_eq!(profile.score(EmotionAxis::Anxiety), 0.8);
        assert!((profile.score(EmotionAxis::Fear) - 0.48).abs() < 1e-9);
    }

    #[test]
    fn test_mild_loneliness_stays_calm() {
        let profile = profile_from_survey(survey(
            EmotionalTheme::Loneliness,
            2,
            ComfortLevel::SharingSometimes,
        ));

        assert_eq!(profile.primary_emotion, "Sadness");
        assert_eq!(profile.voice_characteristics.tone, VoiceTone::Calm);
        assert!((profile.score(EmotionAxis::Calmness) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_listening_comfort_slows_and_quiets() {
        let base = profile_from_survey(survey(
            EmotionalTheme::Anxiety,
            9,
            ComfortLevel::SharingSometimes,
        ));
        let listener =
            profile_from_survey(survey(EmotionalTheme::Anxiety, 9, ComfortLevel::Listening));

        assert_eq!(listener.voice_characteristics.pace, VoicePace::Slow);
        assert!(
            listener.voice_characteristics.energy < base.voice_characteristics.energy
        );
    }

    #[test]
    fn test_signature_encodes_delivery() {
        let profile = profile_from_survey(survey(
            EmotionalTheme::Anxiety,
            8,
            ComfortLevel::SharingSometimes,
        ));

        assert_eq!(profile.signature, "Anxiety-anxious-fast-94");
    }

    #[test]
    fn test_identical_surveys_are_perfect_twins() {
        let a = profile_from_survey(survey(
            EmotionalTheme::Loneliness,
            7,
            ComfortLevel::Comfortable,
        ));
        let mut b = profile_from_survey(survey(
            EmotionalTheme::Loneliness,
            7,
            ComfortLevel::Comfortable,
        ));
        b.user_id = "u2".to_string();

        assert_eq!(crate::domains::emotion::twins::twin_score(&a, &b), 100);
    }
}
