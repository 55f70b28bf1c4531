//! Auto-deletion of expired midnight circles.
//!
//! Runs once at startup and then hourly. Standard circles are never touched;
//! midnight circles past their sunrise are removed along with the summaries
//! that reference them.

use std::sync::Arc;

use crate::kernel::{BaseCircleStore, Clock};

pub struct ExpirySweeper {
    circles: Arc<dyn BaseCircleStore>,
    clock: Arc<dyn Clock>,
}

impl ExpirySweeper {
    pub fn new(circles: Arc<dyn BaseCircleStore>, clock: Arc<dyn Clock>) -> Self {
        Self { circles, clock }
    }

    /// Delete every midnight circle past its auto-delete time, then the
    /// summaries referencing those circles. Idempotent; store errors are
    /// logged and retried on the next scheduled run.
    pub async fn sweep_expired_midnight_circles(&self) {
        let now = self.clock.now();

        let deleted = match self.circles.delete_expired_midnight(now).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::error!(error = %e, "Failed to delete expired midnight circles");
                return;
            }
        };

        if deleted.is_empty() {
            return;
        }

        tracing::info!(count = deleted.len(), "Deleted expired midnight circles");

        match self.circles.delete_summaries_for(&deleted).await {
            Ok(count) => {
                tracing::info!(count, "Deleted summaries of expired midnight circles");
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Failed to delete summaries of expired midnight circles"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::circles::models::Circle;
    use crate::kernel::{FixedClock, TestCircleStore};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn circle(circle_id: &str, circle_type: &str, auto_delete_at: Option<NaiveDateTime>) -> Circle {
        Circle {
            circle_id: circle_id.to_string(),
            participants: vec!["a".into(), "b".into(), "c".into()],
            theme: "loneliness".to_string(),
            start_time: at(9, 23),
            end_time: at(9, 23),
            status: "completed".to_string(),
            voice_room_token: "t".to_string(),
            voice_app_id: "app".to_string(),
            voice_channel_name: circle_id.to_string(),
            ai_moderator_active: true,
            circle_type: circle_type.to_string(),
            auto_delete_at,
            created_at: at(9, 23),
        }
    }

    #[tokio::test]
    async fn test_expired_midnight_circles_and_summaries_are_deleted() {
        let store = Arc::new(TestCircleStore::new());
        store.seed(circle("expired", "midnight", Some(at(10, 6))));
        store.seed(circle("fresh", "midnight", Some(at(12, 6))));

        let sweeper = ExpirySweeper::new(store.clone(), Arc::new(FixedClock::new(at(11, 12))));
        sweeper.sweep_expired_midnight_circles().await;

        let remaining: Vec<String> = store
            .circles()
            .iter()
            .map(|c| c.circle_id.clone())
            .collect();
        assert_eq!(remaining, vec!["fresh"]);
        assert_eq!(store.deleted_summary_ids(), vec!["expired"]);
    }

    #[tokio::test]
    async fn test_standard_circles_survive_regardless_of_age() {
        let store = Arc::new(TestCircleStore::new());
        // A standard circle never carries auto_delete_at, but even a stray
        // value must not get it swept.
        store.seed(circle("old-standard", "standard", Some(at(9, 6))));
        store.seed(circle("plain", "standard", None));

        let sweeper = ExpirySweeper::new(store.clone(), Arc::new(FixedClock::new(at(11, 12))));
        sweeper.sweep_expired_midnight_circles().await;

        assert_eq!(store.circle_count(), 2);
        assert!(store.deleted_summary_ids().is_empty());
    }

    #[tokio::test]
    async fn test_sweep_with_nothing_expired_is_a_no_op() {
        let store = Arc::new(TestCircleStore::new());
        let sweeper = ExpirySweeper::new(store.clone(), Arc::new(FixedClock::new(at(11, 12))));

        sweeper.sweep_expired_midnight_circles().await;
        sweeper.sweep_expired_midnight_circles().await;

        assert_eq!(store.circle_count(), 0);
        assert!(store.deleted_summary_ids().is_empty());
    }
}
