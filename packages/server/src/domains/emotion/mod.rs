//! Emotional twins: self-report profiles and similarity scoring.

pub mod models;
pub mod survey;
pub mod twins;

pub use models::{
    EmotionAxis, EmotionalTwinMatch, VoiceCharacteristics, VoiceEmotionProfile, VoicePace,
    VoiceTone,
};
pub use survey::{profile_from_survey, SurveyInput};
pub use twins::{find_twins, twin_score, DEFAULT_TWIN_THRESHOLD};
