//! # Stores
//!
//! Persistence seams for the two records the workflow core owns.
//!
//! ## Key Components
//!
//! - [`TaskStore`] - pending-action records, with the claim step used by the sweeper
//! - [`NotificationStore`] - delivered notifications and their read state
//! - [`memory`] - lock-based in-process implementations
//! - [`postgres`] - `sqlx` implementations over the tables in `migrations/`
//!
//! ## Claiming
//!
//! A sweeper claims due tasks before processing them. The claim stamps
//! `claimed_by`/`claimed_at` atomically (`FOR UPDATE SKIP LOCKED` in
//! PostgreSQL, a single lock in memory), so overlapping sweeps never process
//! the same task. Closing a task requires the claim to still be held, and
//! inserts the successor in the same atomic step.

pub mod memory;
pub mod postgres;

use crate::error::Result;
use crate::models::{NewTask, Notification, NotificationDraft, Task};
use crate::query_builder::{NotificationFilter, TaskFilter};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

pub use memory::{InMemoryNotificationStore, InMemoryTaskStore};
pub use postgres::{PgNotificationStore, PgTaskStore};

/// Parameters for one claim of due tasks
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimRequest {
    pub cutoff: DateTime<Utc>,
    pub claimant: String,
    pub limit: u32,
    pub now: DateTime<Utc>,
    pub claim_timeout: Duration,
    /// Tasks to leave alone even when due
    pub exclude: Vec<Uuid>,
}

impl ClaimRequest {
    pub fn filter(&self) -> TaskFilter {
        TaskFilter::Claimable {
            cutoff: self.cutoff,
            stale_before: self.now - self.claim_timeout,
            exclude: self.exclude.clone(),
        }
    }
}

/// Outcome of closing a claimed task
#[derive(Debug, Clone, PartialEq)]
pub enum TaskCompletion {
    /// Task marked fulfilled; successor inserted when one was requested
    Closed { successor: Option<Task> },
    /// Claim expired and was taken over, or the task was already closed
    ClaimLost,
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create(&self, task: NewTask, now: DateTime<Utc>) -> Result<Task>;

    async fn get(&self, id: Uuid) -> Result<Option<Task>>;

    async fn find(&self, filter: &TaskFilter) -> Result<Vec<Task>>;

    /// Atomically stamp and return up to `limit` claimable tasks, earliest due first
    async fn claim_due(&self, request: &ClaimRequest) -> Result<Vec<Task>>;

    /// Drop a claim so a later sweep retries the task
    async fn release_claim(&self, id: Uuid, claimant: &str) -> Result<bool>;

    /// Mark fulfilled and insert the successor, only while `claimant` holds the claim
    async fn complete_claimed(
        &self,
        id: Uuid,
        claimant: &str,
        successor: Option<NewTask>,
        now: DateTime<Utc>,
    ) -> Result<TaskCompletion>;

    /// Mark fulfilled regardless of claims; returns false if already fulfilled
    async fn fulfill(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create(&self, draft: NotificationDraft, now: DateTime<Utc>) -> Result<Notification>;

    /// Mark read if `user` is the recipient; returns whether anything changed
    async fn mark_read(&self, id: Uuid, user: Uuid, now: DateTime<Utc>) -> Result<bool>;

    async fn list(&self, filter: &NotificationFilter) -> Result<Vec<Notification>>;

    async fn count(&self, filter: &NotificationFilter) -> Result<u64>;
}
