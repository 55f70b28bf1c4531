/// Pure pairwise compatibility scoring
///
/// These functions contain NO side effects - they implement the reference
/// scoring the grouping heuristic in the engine must stay consistent with.
use super::models::{ComfortLevel, MatchRequest};

/// Points awarded for sharing a theme (the hard gate).
pub const THEME_MATCH_SCORE: i32 = 50;

/// Maximum points from intensity closeness.
pub const INTENSITY_MAX_SCORE: i32 = 30;

/// Points per step of intensity difference.
pub const INTENSITY_STEP_PENALTY: i32 = 5;

/// Points for an exact comfort-level match.
pub const COMFORT_MATCH_SCORE: i32 = 20;

/// Points for the adjacent sharing-sometimes / comfortable pairing.
pub const COMFORT_ADJACENT_SCORE: i32 = 10;

/// Compatibility score between two match requests, 0-100.
///
/// Theme mismatch is a hard gate and scores 0 outright. Otherwise the score
/// starts from the theme match, adds up to 30 for intensity closeness
/// (5 points lost per step of difference, floored at 0), and adds comfort
/// credit: 20 for an exact match, 10 for the one adjacent pairing of
/// sharing-sometimes with comfortable, nothing for any other mismatch.
pub fn score(a: &MatchRequest, b: &MatchRequest) -> i32 {
    if a.theme != b.theme {
        return 0;
    }

    let mut score = THEME_MATCH_SCORE;

    let intensity_diff = (a.intensity - b.intensity).abs();
    score += (INTENSITY_MAX_SCORE - intensity_diff * INTENSITY_STEP_PENALTY).max(0);

    score += comfort_score(a.comfort_level, b.comfort_level);

    score
}

fn comfort_score(a: ComfortLevel, b: ComfortLevel) -> i32 {
    if a == b {
        return COMFORT_MATCH_SCORE;
    }

    match (a, b) {
        (ComfortLevel::SharingSometimes, ComfortLevel::Comfortable)
        | (ComfortLevel::Comfortable, ComfortLevel::SharingSometimes) => COMFORT_ADJACENT_SCORE,
        _ => 0,
    }
}
