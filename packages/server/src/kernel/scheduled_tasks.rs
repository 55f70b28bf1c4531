//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! This module provides the two periodic tasks the matching pipeline needs:
//! - Matching backstop: users waiting without new arrivals still get grouped
//!   once enough demand accumulates
//! - Midnight sweep: midnight circles past their auto-delete time disappear
//!
//! # Architecture
//!
//! ```text
//! Scheduler (every 30 seconds)
//!     │
//!     └─► MatchingService::run_matching_pass()
//!
//! Scheduler (hourly, plus once at startup)
//!     │
//!     └─► ExpirySweeper::sweep_expired_midnight_circles()
//! ```
//!
//! Neither task body can propagate an error: both service methods catch and
//! log internally, so a failed tick never kills the timer.

use anyhow::Result;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::matching::engine::MatchingService;
use crate::domains::midnight::sweeper::ExpirySweeper;

/// Start all scheduled tasks
///
/// The returned scheduler handle must be shut down on process teardown so
/// no tick runs against dropped store handles.
pub async fn start_scheduler(
    matching: Arc<MatchingService>,
    sweeper: Arc<ExpirySweeper>,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    // Matching backstop - runs every 30 seconds
    let backstop = matching.clone();
    let matching_job = Job::new_async("*/30 * * * * *", move |_uuid, _lock| {
        let matching = backstop.clone();
        Box::pin(async move {
            matching.run_matching_pass().await;
        })
    })?;

    scheduler.add(matching_job).await?;

    // Midnight circle sweep - runs every hour
    let hourly_sweeper = sweeper.clone();
    let sweep_job = Job::new_async("0 0 * * * *", move |_uuid, _lock| {
        let sweeper = hourly_sweeper.clone();
        Box::pin(async move {
            sweeper.sweep_expired_midnight_circles().await;
        })
    })?;

    scheduler.add(sweep_job).await?;
    scheduler.start().await?;

    // Sweep once immediately so circles expired while the service was down
    // do not linger until the first hourly tick.
    sweeper.sweep_expired_midnight_circles().await;

    tracing::info!(
        "Scheduled tasks started (matching backstop every 30s, midnight sweep hourly)"
    );
    Ok(scheduler)
}
