//! Simulated conversation metrics.
//!
//! Real speaking-time analysis would come from the audio pipeline; this
//! module generates synthetic but plausible numbers in its place and is the
//! only producer of such data. Nothing here feeds back into matching.

use rand::Rng;

/// Synthetic per-participant speaking shares, normalized to sum to ~100.
///
/// Each participant draws a raw share of 20-40 before normalization, so no
/// one appears to have monopolized or sat out the conversation.
pub fn simulated_speaking_balance(participants: usize) -> Vec<f64> {
    if participants == 0 {
        return Vec::new();
    }

    let mut rng = rand::thread_rng();
    let raw: Vec<f64> = (0..participants)
        .map(|_| f64::from(rng.gen_range(20..40)))
        .collect();

    let total: f64 = raw.iter().sum();
    raw.iter().map(|share| (share / total * 100.0).round()).collect()
}
