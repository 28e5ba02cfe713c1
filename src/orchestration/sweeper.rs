//! # Task Sweeper
//!
//! Periodic pass over every unfulfilled task due on or before the end of the
//! current day.
//!
//! ## Pass Structure
//!
//! 1. Claim due tasks in batches of `batch_size` (earliest due first) until a
//!    batch comes back short. Claims are atomic, so two sweepers running at
//!    once never process the same task.
//! 2. For each claimed task, sequentially, run the policy registered for its
//!    type against current entity state.
//! 3. If the action is still pending, enqueue the escalation drafts.
//! 4. Close the task, inserting the next reminder link when the policy asked
//!    for one. Closing and inserting are a single store operation.
//!
//! Successors inserted during a pass are excluded from its later batches, so
//! a task overdue by several intervals advances one link per pass.
//!
//! A task whose processing fails has its claim released and is retried by a
//! later pass, except for configuration errors (a missing template), which
//! would fail identically every time: those tasks are closed and logged.

use super::clock::end_of_day;
use super::context::WorkflowContext;
use super::policies::{PolicyOutcome, TaskPolicyRegistry};
use crate::config::SweeperConfig;
use crate::error::Result;
use crate::logging::{log_error, log_sweep_operation};
use crate::models::{NewTask, Task};
use crate::store::{ClaimRequest, TaskCompletion};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Tallies from one sweep pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub claimed: usize,
    pub resolved: usize,
    pub escalated: usize,
    pub regenerated: usize,
    pub notifications_enqueued: usize,
    pub claims_lost: usize,
    pub failed: usize,
}

impl SweepReport {
    pub fn processed(&self) -> usize {
        self.resolved + self.escalated
    }
}

enum TaskResult {
    Resolved,
    Escalated {
        enqueued: usize,
        successor: Option<Uuid>,
    },
    ClaimLost,
}

pub struct TaskSweeper {
    ctx: WorkflowContext,
    policies: Arc<TaskPolicyRegistry>,
    config: SweeperConfig,
    claimant: String,
}

impl std::fmt::Debug for TaskSweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskSweeper")
            .field("claimant", &self.claimant)
            .field("config", &self.config)
            .field("policies", &self.policies)
            .finish()
    }
}

impl TaskSweeper {
    pub fn new(ctx: WorkflowContext, policies: Arc<TaskPolicyRegistry>, config: SweeperConfig) -> Self {
        let claimant = format!("sweeper-{}-{}", std::process::id(), Uuid::new_v4());
        Self {
            ctx,
            policies,
            config,
            claimant,
        }
    }

    /// Identity stamped on claimed tasks
    pub fn claimant(&self) -> &str {
        &self.claimant
    }

    /// Run one pass at the clock's current time
    pub async fn sweep_once(&self) -> Result<SweepReport> {
        self.sweep_at(self.ctx.clock.now()).await
    }

    /// Run one pass as if the current time were `now`
    #[instrument(skip(self), fields(claimant = %self.claimant))]
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let cutoff = end_of_day(now, self.config.day_boundary_offset());
        let limit = self.config.batch_size;
        let mut report = SweepReport::default();
        // Successors inserted and claims released during this pass wait for the next one
        let mut exclude: Vec<Uuid> = Vec::new();

        loop {
            let request = ClaimRequest {
                cutoff,
                claimant: self.claimant.clone(),
                limit,
                now,
                claim_timeout: self.config.claim_timeout(),
                exclude: exclude.clone(),
            };
            let tasks = self.ctx.tasks.claim_due(&request).await?;
            report.claimed += tasks.len();
            debug!(claimed = tasks.len(), cutoff = %cutoff, "🧹 Claimed due tasks");

            for task in &tasks {
                match self.process_task(task, now).await {
                    Ok(TaskResult::Resolved) => report.resolved += 1,
                    Ok(TaskResult::Escalated { enqueued, successor }) => {
                        report.escalated += 1;
                        report.notifications_enqueued += enqueued;
                        if let Some(successor) = successor {
                            report.regenerated += 1;
                            exclude.push(successor);
                        }
                    }
                    Ok(TaskResult::ClaimLost) => {
                        warn!(task_id = %task.id, "⚠️ Claim lost before the task could be closed");
                        report.claims_lost += 1;
                        exclude.push(task.id);
                    }
                    Err(e) => {
                        report.failed += 1;
                        if !self.handle_failure(task, &e, now).await {
                            exclude.push(task.id);
                        }
                    }
                }
            }

            if tasks.len() < limit as usize {
                break;
            }
        }

        if report.claimed > 0 {
            let details = format!(
                "claimed={} escalated={} resolved={} enqueued={} failed={}",
                report.claimed,
                report.escalated,
                report.resolved,
                report.notifications_enqueued,
                report.failed
            );
            log_sweep_operation("sweep", None, None, "completed", Some(details.as_str()));
        }
        Ok(report)
    }

    async fn process_task(&self, task: &Task, now: DateTime<Utc>) -> Result<TaskResult> {
        let Some(policy) = self.policies.get(task.task_type) else {
            warn!(task_id = %task.id, task_type = %task.task_type, "No policy registered, closing task");
            return Ok(match self.close(task, None, now).await? {
                TaskCompletion::Closed { .. } => TaskResult::Resolved,
                TaskCompletion::ClaimLost => TaskResult::ClaimLost,
            });
        };

        match policy.evaluate(task, &self.ctx, now).await? {
            PolicyOutcome::Resolved => Ok(match self.close(task, None, now).await? {
                TaskCompletion::Closed { .. } => TaskResult::Resolved,
                TaskCompletion::ClaimLost => TaskResult::ClaimLost,
            }),
            PolicyOutcome::Escalate { drafts, regenerate } => {
                let enqueued = self.ctx.enqueue_all(drafts).await?;
                let successor =
                    regenerate.then(|| NewTask::successor_of(task, self.config.reminder_interval()));
                let TaskCompletion::Closed { successor } = self.close(task, successor, now).await?
                else {
                    return Ok(TaskResult::ClaimLost);
                };

                let task_id = task.id.to_string();
                let details = format!("enqueued={enqueued} regenerated={regenerate}");
                log_sweep_operation(
                    "escalate",
                    Some(task_id.as_str()),
                    Some(task.task_type.as_str()),
                    "escalated",
                    Some(details.as_str()),
                );
                Ok(TaskResult::Escalated {
                    enqueued,
                    successor: successor.map(|next| next.id),
                })
            }
        }
    }

    async fn close(
        &self,
        task: &Task,
        successor: Option<NewTask>,
        now: DateTime<Utc>,
    ) -> Result<TaskCompletion> {
        let completion = self
            .ctx
            .tasks
            .complete_claimed(task.id, &self.claimant, successor, now)
            .await?;
        if let TaskCompletion::Closed {
            successor: Some(next),
        } = &completion
        {
            debug!(
                task_id = %task.id,
                successor_id = %next.id,
                due_date = %next.due_date,
                "🔁 Reminder regenerated"
            );
        }
        Ok(completion)
    }

    /// Returns true when the task was closed rather than left for a later pass
    async fn handle_failure(
        &self,
        task: &Task,
        error: &crate::error::WorkflowError,
        now: DateTime<Utc>,
    ) -> bool {
        let context = format!("task_id={} task_type={}", task.id, task.task_type);
        log_error("sweeper", "process_task", &error.to_string(), Some(context.as_str()));

        if error.is_configuration() {
            // Retrying cannot succeed; close without a successor
            return match self.close(task, None, now).await {
                Ok(completion) => matches!(completion, TaskCompletion::Closed { .. }),
                Err(e) => {
                    log_error("sweeper", "close_misconfigured", &e.to_string(), Some(context.as_str()));
                    false
                }
            };
        }

        if let Err(e) = self.ctx.tasks.release_claim(task.id, &self.claimant).await {
            log_error("sweeper", "release_claim", &e.to_string(), Some(context.as_str()));
        }
        false
    }

    /// Sweep every `interval_seconds` until `shutdown` flips to true
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(
            claimant = %self.claimant,
            interval_seconds = self.config.interval_seconds,
            "🚀 Task sweeper started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.sweep_once().await {
                        log_error("sweeper", "sweep", &e.to_string(), None);
                    }
                }
            }
        }
        info!(claimant = %self.claimant, "🛑 Task sweeper stopped");
    }
}
