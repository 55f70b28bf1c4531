//! Postgres implementation of the circle store contract.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;

use super::models::{Circle, CircleStatus};
use crate::domains::sessions::models::SessionSummary;
use crate::kernel::BaseCircleStore;

pub struct PgCircleStore {
    pool: PgPool,
}

impl PgCircleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseCircleStore for PgCircleStore {
    async fn insert(&self, circle: &Circle) -> Result<()> {
        circle.insert(&self.pool).await
    }

    async fn find_by_id(&self, circle_id: &str) -> Result<Option<Circle>> {
        Circle::find_by_id(circle_id, &self.pool).await
    }

    async fn update_status(&self, circle_id: &str, status: CircleStatus) -> Result<()> {
        Circle::update_status(circle_id, status, &self.pool).await
    }

    async fn delete_expired_midnight(&self, now: NaiveDateTime) -> Result<Vec<String>> {
        Circle::delete_expired_midnight(now, &self.pool).await
    }

    async fn delete_summaries_for(&self, circle_ids: &[String]) -> Result<u64> {
        SessionSummary::delete_for_circles(circle_ids, &self.pool).await
    }
}
