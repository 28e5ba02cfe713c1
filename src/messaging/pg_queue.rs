//! # PostgreSQL Job Queue
//!
//! Durable notification queue over the `labflow_notification_jobs` table.
//! Reads use `FOR UPDATE SKIP LOCKED` and push the job's visibility forward by
//! the configured timeout, so a consumer that dies mid-delivery lets the job
//! reappear for another consumer.

use super::queue::{NotificationQueue, QueueConsumer, QueueJob, RetryDecision};
use crate::config::DispatcherConfig;
use crate::error::{Result, WorkflowError};
use crate::models::NotificationDraft;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
struct JobRow {
    id: Uuid,
    job_name: String,
    payload: Json<NotificationDraft>,
    attempts: i32,
}

impl From<JobRow> for QueueJob {
    fn from(row: JobRow) -> Self {
        QueueJob {
            id: row.id,
            job_name: row.job_name,
            payload: row.payload.0,
            attempts: row.attempts.max(0) as u32,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgJobQueue {
    pool: PgPool,
    config: DispatcherConfig,
}

impl PgJobQueue {
    pub fn new(pool: PgPool, config: DispatcherConfig) -> Self {
        Self { pool, config }
    }

    /// Number of jobs still waiting for a successful delivery
    pub async fn pending_count(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM labflow_notification_jobs WHERE status = 'pending'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| WorkflowError::database("count_pending_jobs", e))?;
        Ok(count.max(0) as u64)
    }

    fn visibility_deadline(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + chrono::Duration::seconds(self.config.visibility_timeout_seconds as i64)
    }
}

#[async_trait]
impl NotificationQueue for PgJobQueue {
    #[instrument(skip(self, job), fields(job_id = %job.id))]
    async fn enqueue(&self, job: QueueJob) -> Result<Uuid> {
        sqlx::query(
            r#"
            INSERT INTO labflow_notification_jobs (id, job_name, payload, attempts, status, visible_at)
            VALUES ($1, $2, $3, $4, 'pending', NOW())
            "#,
        )
        .bind(job.id)
        .bind(&job.job_name)
        .bind(Json(&job.payload))
        .bind(job.attempts as i32)
        .execute(&self.pool)
        .await
        .map_err(|e| WorkflowError::queue("enqueue", e))?;

        debug!("📤 Notification job persisted");
        Ok(job.id)
    }
}

#[async_trait]
impl QueueConsumer for PgJobQueue {
    async fn next(&self) -> Result<Option<QueueJob>> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            UPDATE labflow_notification_jobs
            SET attempts = attempts + 1, visible_at = $2, updated_at = $1
            WHERE id = (
                SELECT id FROM labflow_notification_jobs
                WHERE status = 'pending' AND visible_at <= $1
                ORDER BY visible_at, created_at
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING id, job_name, payload, attempts
            "#,
        )
        .bind(now)
        .bind(self.visibility_deadline(now))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| WorkflowError::queue("read", e))?;

        match row {
            Some(row) => Ok(Some(row.into())),
            None => {
                tokio::time::sleep(self.config.poll_interval()).await;
                Ok(None)
            }
        }
    }

    async fn ack(&self, job: &QueueJob) -> Result<()> {
        sqlx::query(
            "UPDATE labflow_notification_jobs SET status = 'completed', updated_at = NOW() WHERE id = $1",
        )
        .bind(job.id)
        .execute(&self.pool)
        .await
        .map_err(|e| WorkflowError::queue("ack", e))?;
        Ok(())
    }

    async fn nack(&self, job: QueueJob, error_message: &str) -> Result<RetryDecision> {
        if job.attempts >= self.config.max_attempts {
            sqlx::query(
                r#"
                UPDATE labflow_notification_jobs
                SET status = 'failed', last_error = $2, updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(job.id)
            .bind(error_message)
            .execute(&self.pool)
            .await
            .map_err(|e| WorkflowError::queue("fail", e))?;

            error!(
                job_id = %job.id,
                attempt = job.attempts,
                error = %error_message,
                "❌ Notification job failed permanently"
            );
            return Ok(RetryDecision::Failed);
        }

        let attempt = job.attempts;
        let delay = self.config.backoff_for_attempt(attempt);
        let visible_at = Utc::now()
            + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::seconds(1));

        sqlx::query(
            r#"
            UPDATE labflow_notification_jobs
            SET visible_at = $2, last_error = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(job.id)
        .bind(visible_at)
        .bind(error_message)
        .execute(&self.pool)
        .await
        .map_err(|e| WorkflowError::queue("retry", e))?;

        warn!(
            job_id = %job.id,
            attempt = attempt,
            delay_ms = delay.as_millis() as u64,
            "🔄 Notification job scheduled for retry"
        );
        Ok(RetryDecision::Retry { attempt, delay })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::NotificationType;

    #[test]
    fn test_job_row_conversion_clamps_attempts() {
        let draft = NotificationDraft::new(NotificationType::DueAmount, Uuid::new_v4(), "pay up");
        let row = JobRow {
            id: Uuid::new_v4(),
            job_name: "sendNotification".to_string(),
            payload: Json(draft.clone()),
            attempts: -1,
        };
        let job = QueueJob::from(row);
        assert_eq!(job.attempts, 0);
        assert_eq!(job.payload, draft);
    }
}
