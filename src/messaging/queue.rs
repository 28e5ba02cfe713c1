//! # Notification Queue
//!
//! Producers (event handlers, the sweeper) enqueue notification drafts; the
//! dispatcher consumes them. Enqueueing never waits on delivery.
//!
//! ## Retry Semantics
//!
//! Delivery is at-least-once. A job handed out by [`QueueConsumer::next`] has
//! its `attempts` counter incremented. A failed job is nacked and becomes
//! visible again after an exponential backoff, until `max_attempts` deliveries
//! have failed; it is then parked as failed and logged.

use crate::config::DispatcherConfig;
use crate::constants::system;
use crate::error::{Result, WorkflowError};
use crate::models::NotificationDraft;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// One durable unit of work: render-once notification payload plus delivery count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueJob {
    pub id: Uuid,
    pub job_name: String,
    pub payload: NotificationDraft,
    pub attempts: u32,
}

impl QueueJob {
    pub fn send_notification(payload: NotificationDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_name: system::SEND_NOTIFICATION_JOB.to_string(),
            payload,
            attempts: 0,
        }
    }
}

/// What happened to a nacked job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    Retry { attempt: u32, delay: Duration },
    Failed,
}

/// A job that exhausted its attempts
#[derive(Debug, Clone, PartialEq)]
pub struct FailedJob {
    pub job: QueueJob,
    pub error: String,
    pub failed_at: DateTime<Utc>,
}

#[async_trait]
pub trait NotificationQueue: Send + Sync {
    async fn enqueue(&self, job: QueueJob) -> Result<Uuid>;

    async fn enqueue_draft(&self, draft: NotificationDraft) -> Result<Uuid> {
        self.enqueue(QueueJob::send_notification(draft)).await
    }
}

#[async_trait]
pub trait QueueConsumer: Send + Sync {
    /// Wait up to one poll interval for the next visible job
    async fn next(&self) -> Result<Option<QueueJob>>;

    async fn ack(&self, job: &QueueJob) -> Result<()>;

    async fn nack(&self, job: QueueJob, error: &str) -> Result<RetryDecision>;
}

/// Counters exposed for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub enqueued: u64,
    pub completed: u64,
    pub retried: u64,
    pub failed: u64,
}

#[derive(Debug, Default)]
struct Counters {
    enqueued: AtomicU64,
    completed: AtomicU64,
    retried: AtomicU64,
    failed: AtomicU64,
}

/// Bounded in-process queue over a tokio channel
pub struct InProcessQueue {
    sender: mpsc::Sender<QueueJob>,
    receiver: tokio::sync::Mutex<mpsc::Receiver<QueueJob>>,
    config: DispatcherConfig,
    failed: Arc<Mutex<Vec<FailedJob>>>,
    counters: Arc<Counters>,
}

impl std::fmt::Debug for InProcessQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InProcessQueue")
            .field("capacity", &self.config.queue_capacity)
            .field("stats", &self.stats())
            .finish()
    }
}

impl InProcessQueue {
    pub fn new(config: DispatcherConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        Self {
            sender,
            receiver: tokio::sync::Mutex::new(receiver),
            config,
            failed: Arc::new(Mutex::new(Vec::new())),
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            enqueued: self.counters.enqueued.load(Ordering::Relaxed),
            completed: self.counters.completed.load(Ordering::Relaxed),
            retried: self.counters.retried.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    /// Jobs parked after exhausting their attempts
    pub fn failed_jobs(&self) -> Vec<FailedJob> {
        self.failed.lock().clone()
    }

    /// Jobs currently buffered and not yet handed out
    pub fn pending(&self) -> usize {
        self.config.queue_capacity.max(1) - self.sender.capacity()
    }

    /// Pull every visible job without waiting; for tests and draining on shutdown
    pub async fn drain(&self) -> Vec<QueueJob> {
        let mut receiver = self.receiver.lock().await;
        let mut jobs = Vec::new();
        while let Ok(job) = receiver.try_recv() {
            jobs.push(job);
        }
        jobs
    }
}

#[async_trait]
impl NotificationQueue for InProcessQueue {
    async fn enqueue(&self, job: QueueJob) -> Result<Uuid> {
        let id = job.id;
        // Waits only for buffer space, never for delivery
        self.sender
            .send(job)
            .await
            .map_err(|e| WorkflowError::queue("enqueue", e))?;
        self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
        debug!(job_id = %id, "📤 Notification job enqueued");
        Ok(id)
    }
}

#[async_trait]
impl QueueConsumer for InProcessQueue {
    async fn next(&self) -> Result<Option<QueueJob>> {
        let mut receiver = self.receiver.lock().await;
        match tokio::time::timeout(self.config.poll_interval(), receiver.recv()).await {
            Ok(Some(mut job)) => {
                job.attempts += 1;
                Ok(Some(job))
            }
            Ok(None) => Err(WorkflowError::queue("next", "channel closed")),
            Err(_elapsed) => Ok(None),
        }
    }

    async fn ack(&self, job: &QueueJob) -> Result<()> {
        self.counters.completed.fetch_add(1, Ordering::Relaxed);
        debug!(job_id = %job.id, attempt = job.attempts, "✅ Notification job completed");
        Ok(())
    }

    async fn nack(&self, job: QueueJob, error: &str) -> Result<RetryDecision> {
        if job.attempts >= self.config.max_attempts {
            error!(
                job_id = %job.id,
                attempt = job.attempts,
                recipient = %job.payload.user,
                notification_type = %job.payload.notification_type,
                error = %error,
                "❌ Notification job failed permanently"
            );
            self.counters.failed.fetch_add(1, Ordering::Relaxed);
            self.failed.lock().push(FailedJob {
                job,
                error: error.to_string(),
                failed_at: Utc::now(),
            });
            return Ok(RetryDecision::Failed);
        }

        let attempt = job.attempts;
        let delay = self.config.backoff_for_attempt(attempt);
        warn!(
            job_id = %job.id,
            attempt = attempt,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "🔄 Notification job scheduled for retry"
        );
        self.counters.retried.fetch_add(1, Ordering::Relaxed);

        let sender = self.sender.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = sender.send(job).await {
                error!(error = %e, "❌ Failed to requeue notification job");
            }
        });

        Ok(RetryDecision::Retry { attempt, delay })
    }
}
