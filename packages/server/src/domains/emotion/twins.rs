/// Emotional twin scoring
///
/// Pure functions pairing users whose self-reported profiles resemble each
/// other. Weights: primary emotion 30, voice tone 25, per-axis similarity 30,
/// energy closeness 15; totals clamp to [0, 100].
use super::models::{EmotionAxis, EmotionalTwinMatch, VoiceEmotionProfile};

/// Minimum score for a pairing to count as twins.
pub const DEFAULT_TWIN_THRESHOLD: i32 = 70;

/// Energy distance under which "similar energy levels" is reported.
const SIMILAR_ENERGY_DISTANCE: f64 = 20.0;

/// Twin score between two profiles, 0-100.
pub fn twin_score(p1: &VoiceEmotionProfile, p2: &VoiceEmotionProfile) -> i32 {
    let mut score = 0.0;

    // Primary emotion match (30 points)
    if p1.primary_emotion == p2.primary_emotion {
        score += 30.0;
    }

    // Voice tone match (25 points)
    if p1.voice_characteristics.tone == p2.voice_characteristics.tone {
        score += 25.0;
    }

    // Per-axis similarity (max 5 points per axis, 30 total)
    for axis in EmotionAxis::ALL {
        let diff = (p1.score(axis) - p2.score(axis)).abs();
        score += (1.0 - diff) * 5.0;
    }

    // Energy closeness (max 15 points)
    let energy_diff = (p1.voice_characteristics.energy - p2.voice_characteristics.energy).abs();
    score += (15.0 - energy_diff / 100.0 * 15.0).max(0.0);

    score.max(0.0).min(100.0).round() as i32
}

/// Find a user's emotional twins among candidates.
///
/// Self-pairings are skipped; results keep only scores at or above
/// `min_score`, sorted descending with ties in original candidate order.
pub fn find_twins(
    profile: &VoiceEmotionProfile,
    candidates: &[VoiceEmotionProfile],
    min_score: i32,
) -> Vec<EmotionalTwinMatch> {
    let mut matches: Vec<EmotionalTwinMatch> = candidates
        .iter()
        .filter(|other| other.user_id != profile.user_id)
        .filter_map(|other| {
            let match_score = twin_score(profile, other);
            if match_score < min_score {
                return None;
            }
            Some(EmotionalTwinMatch {
                user_id_1: profile.user_id.clone(),
                user_id_2: other.user_id.clone(),
                match_score,
                shared_emotions: shared_emotions(profile, other),
                matched_characteristics: matched_characteristics(profile, other),
            })
        })
        .collect();

    // sort_by is stable: equal scores keep candidate order
    matches.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    matches
}

/// Axes where both profiles score above 0.5.
fn shared_emotions(p1: &VoiceEmotionProfile, p2: &VoiceEmotionProfile) -> Vec<EmotionAxis> {
    EmotionAxis::ALL
        .into_iter()
        .filter(|axis| p1.score(*axis) > 0.5 && p2.score(*axis) > 0.5)
        .collect()
}

fn matched_characteristics(p1: &VoiceEmotionProfile, p2: &VoiceEmotionProfile) -> Vec<String> {
    let mut characteristics = Vec::new();

    if p1.primary_emotion == p2.primary_emotion {
        characteristics.push(format!(
            "Both feeling {}",
            p1.primary_emotion.to_lowercase()
        ));
    }
    if p1.voice_characteristics.tone == p2.voice_characteristics.tone {
        characteristics.push(format!("Similar {} tone", p1.voice_characteristics.tone));
    }
    if (p1.voice_characteristics.energy - p2.voice_characteristics.energy).abs()
        < SIMILAR_ENERGY_DISTANCE
    {
        characteristics.push("Similar energy levels".to_string());
    }

    characteristics
}
