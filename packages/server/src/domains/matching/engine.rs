//! The matching scheduler.
//!
//! A pass drains the queue snapshot, buckets entries by exact theme, forms
//! bounded-size groups of similar intensity, and hands each group to the
//! circle factory. Matched members are removed from the queue only after
//! their circle persisted, so a failed group stays eligible for the next
//! pass.
//!
//! Passes are triggered from two sources - an accepted join request and the
//! 30-second backstop timer - and are serialized by a single pass lock.
//! A pass that cannot take the lock skips rather than queueing up: a few
//! seconds of staleness is acceptable, matching the same participant into
//! two circles is not.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::models::{EmotionalTheme, MatchRequest};
use super::queue::BaseMatchQueue;
use crate::domains::circles::factory::CircleFactory;

/// Maximum intensity distance from the group anchor.
pub const INTENSITY_SPREAD: i32 = 3;

pub struct MatchingService {
    queue: Arc<dyn BaseMatchQueue>,
    factory: CircleFactory,
    min_circle_size: usize,
    max_circle_size: usize,
    pass_lock: Mutex<()>,
}

impl MatchingService {
    pub fn new(
        queue: Arc<dyn BaseMatchQueue>,
        factory: CircleFactory,
        min_circle_size: usize,
        max_circle_size: usize,
    ) -> Self {
        Self {
            queue,
            factory,
            min_circle_size,
            max_circle_size,
            pass_lock: Mutex::new(()),
        }
    }

    /// Enqueue a match request and immediately try a matching pass, so a
    /// join that completes a group does not wait for the backstop timer.
    pub async fn submit_match_request(&self, request: MatchRequest) -> Result<()> {
        self.queue.enqueue(&request).await?;
        self.run_matching_pass().await;
        Ok(())
    }

    /// Remove a session's pending request from the queue.
    pub async fn withdraw_match_request(&self, session_id: &str) -> Result<()> {
        self.queue.dequeue(session_id).await
    }

    /// 1-based position in the queue, or -1 when the session is not queued.
    pub async fn queue_position(&self, session_id: &str) -> Result<i64> {
        let queue = self.queue.list_all().await?;
        Ok(queue
            .iter()
            .position(|r| r.session_id == session_id)
            .map(|i| i as i64 + 1)
            .unwrap_or(-1))
    }

    /// Run one matching pass over the current queue state.
    ///
    /// Never fails outward: an unavailable queue store means there is
    /// nothing to do, and one group's failure does not abort the rest of
    /// the pass.
    pub async fn run_matching_pass(&self) {
        let Ok(_guard) = self.pass_lock.try_lock() else {
            tracing::debug!("Matching pass already in progress, skipping");
            return;
        };

        let queue = match self.queue.list_all().await {
            Ok(queue) => queue,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read matching queue, skipping pass");
                return;
            }
        };

        if queue.len() < self.min_circle_size {
            return;
        }

        for (theme, mut bucket) in bucket_by_theme(queue) {
            while bucket.len() >= self.min_circle_size {
                let slice: Vec<MatchRequest> =
                    bucket.iter().take(self.max_circle_size).cloned().collect();
                let group = refine_group(slice, self.max_circle_size);

                if group.len() < self.min_circle_size {
                    // The head of this bucket cannot form a circle; a later
                    // pass will see it again once demand shifts.
                    break;
                }

                match self.factory.create_circle(&group).await {
                    Ok(circle) => {
                        self.remove_matched(&group, &mut bucket).await;
                        tracing::info!(
                            circle_id = %circle.circle_id,
                            theme = %theme,
                            matched = group.len(),
                            remaining = bucket.len(),
                            "Matching pass formed a circle"
                        );
                    }
                    Err(e) => {
                        // Members stay queued for retry on a later pass.
                        tracing::error!(
                            theme = %theme,
                            error = %e,
                            "Circle creation failed, leaving members queued"
                        );
                        break;
                    }
                }
            }
        }
    }

    /// Remove a matched group from the queue store and the in-memory bucket.
    ///
    /// Called only after the circle persisted. A store failure here leaves a
    /// stale entry behind (acceptable: the circle exists), so each removal
    /// is attempted independently.
    async fn remove_matched(&self, group: &[MatchRequest], bucket: &mut Vec<MatchRequest>) {
        for member in group {
            if let Err(e) = self.queue.dequeue(&member.session_id).await {
                tracing::warn!(
                    session_id = %member.session_id,
                    error = %e,
                    "Failed to remove matched session from queue"
                );
            }
        }
        bucket.retain(|r| !group.iter().any(|m| m.session_id == r.session_id));
    }
}

/// Partition a queue snapshot into theme buckets.
///
/// Theme equality is the only partition criterion, and entries keep the
/// order the queue store returned them in - that order is the tie-break for
/// which entries head a bucket.
fn bucket_by_theme(queue: Vec<MatchRequest>) -> Vec<(EmotionalTheme, Vec<MatchRequest>)> {
    let mut buckets: Vec<(EmotionalTheme, Vec<MatchRequest>)> = Vec::new();
    for request in queue {
        match buckets.iter_mut().find(|(theme, _)| *theme == request.theme) {
            Some((_, bucket)) => bucket.push(request),
            None => buckets.push((request.theme, vec![request])),
        }
    }
    buckets
}

/// Refine a bucket-head slice into a compatible group.
///
/// The slice is sorted by intensity ascending (stable, so queue order breaks
/// ties), the lowest-intensity entry anchors the group, and further entries
/// join only while within the allowed spread of the anchor and the group is
/// below the size cap.
fn refine_group(mut slice: Vec<MatchRequest>, max_size: usize) -> Vec<MatchRequest> {
    slice.sort_by_key(|r| r.intensity);

    let mut group: Vec<MatchRequest> = Vec::with_capacity(max_size);
    let mut entries = slice.into_iter();
    let Some(anchor) = entries.next() else {
        return group;
    };
    let anchor_intensity = anchor.intensity;
    group.push(anchor);

    for entry in entries {
        if group.len() >= max_size {
            break;
        }
        if (entry.intensity - anchor_intensity).abs() <= INTENSITY_SPREAD {
            group.push(entry);
        }
    }

    group
}
