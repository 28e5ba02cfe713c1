//! # Task Model
//!
//! A task is an internally tracked pending human action with a due date.
//!
//! ## Lifecycle
//!
//! Tasks are created by a domain handler or by the sweeper when a recurring
//! reminder regenerates. After creation the only business mutation is
//! `is_fulfilled = true`; rows are never deleted, so a recurring reminder forms
//! an append-only chain of tasks with strictly increasing due dates.
//!
//! The claim columns (`claimed_by`, `claimed_at`) are sweeper bookkeeping: a
//! sweeper stamps a task before processing it so an overlapping sweep skips it.
//!
//! ## Database Schema
//!
//! Maps to `labflow_tasks` (see `migrations/`):
//! - `id`: UUID primary key
//! - `task_type`: TEXT, one of [`TaskType`]
//! - `details`: JSONB, sparse entity references
//! - `due_date`, `is_fulfilled`, `claimed_by`, `claimed_at`, timestamps

use crate::constants::TaskType;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sparse references to the entities a task is about
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inquiry: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dentist: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_order: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinic: Option<Uuid>,
}

impl TaskDetails {
    pub fn inquiry(id: Uuid) -> Self {
        Self {
            inquiry: Some(id),
            ..Default::default()
        }
    }

    pub fn dentist(id: Uuid) -> Self {
        Self {
            dentist: Some(id),
            ..Default::default()
        }
    }

    pub fn order(id: Uuid) -> Self {
        Self {
            order: Some(id),
            ..Default::default()
        }
    }

    pub fn sub_order(order: Uuid, sub_order: Uuid) -> Self {
        Self {
            order: Some(order),
            sub_order: Some(sub_order),
            ..Default::default()
        }
    }

    pub fn clinic(id: Uuid) -> Self {
        Self {
            clinic: Some(id),
            ..Default::default()
        }
    }

    pub fn with_inquiry(mut self, id: Uuid) -> Self {
        self.inquiry = Some(id);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// A persisted pending-action record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub task_type: TaskType,
    pub is_fulfilled: bool,
    pub due_date: DateTime<Utc>,
    pub details: TaskDetails,
    pub claimed_by: Option<String>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Whether a sweep with the given cutoff should pick this task up
    pub fn is_due(&self, cutoff: DateTime<Utc>) -> bool {
        !self.is_fulfilled && self.due_date <= cutoff
    }

    /// Whether a claim is held and has not yet gone stale
    pub fn is_claimed(&self, now: DateTime<Utc>, claim_timeout: Duration) -> bool {
        match self.claimed_at {
            Some(claimed_at) => self.claimed_by.is_some() && claimed_at + claim_timeout > now,
            None => false,
        }
    }
}

/// Fields needed to insert a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub task_type: TaskType,
    pub due_date: DateTime<Utc>,
    pub details: TaskDetails,
}

impl NewTask {
    pub fn new(task_type: TaskType, due_date: DateTime<Utc>, details: TaskDetails) -> Self {
        Self {
            task_type,
            due_date,
            details,
        }
    }

    /// The next link in a recurring reminder chain
    pub fn successor_of(task: &Task, interval: Duration) -> Self {
        Self {
            task_type: task.task_type,
            due_date: task.due_date + interval,
            details: task.details.clone(),
        }
    }

    pub fn into_task(self, now: DateTime<Utc>) -> Task {
        Task {
            id: Uuid::new_v4(),
            task_type: self.task_type,
            is_fulfilled: false,
            due_date: self.due_date,
            details: self.details,
            claimed_by: None,
            claimed_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_task() -> Task {
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap();
        NewTask::new(TaskType::ShipOrder, now, TaskDetails::sub_order(Uuid::new_v4(), Uuid::new_v4()))
            .into_task(now)
    }

    #[test]
    fn test_successor_keeps_details_and_advances_due_date() {
        let task = sample_task();
        let next = NewTask::successor_of(&task, Duration::days(2));
        assert_eq!(next.task_type, TaskType::ShipOrder);
        assert_eq!(next.details, task.details);
        assert_eq!(next.due_date - task.due_date, Duration::days(2));
    }

    #[test]
    fn test_due_check_respects_fulfilment() {
        let mut task = sample_task();
        assert!(task.is_due(task.due_date));
        assert!(!task.is_due(task.due_date - Duration::seconds(1)));
        task.is_fulfilled = true;
        assert!(!task.is_due(task.due_date));
    }

    #[test]
    fn test_stale_claim_is_not_held() {
        let mut task = sample_task();
        let now = task.created_at;
        assert!(!task.is_claimed(now, Duration::minutes(10)));

        task.claimed_by = Some("sweeper-a".to_string());
        task.claimed_at = Some(now);
        assert!(task.is_claimed(now + Duration::minutes(5), Duration::minutes(10)));
        assert!(!task.is_claimed(now + Duration::minutes(11), Duration::minutes(10)));
    }

    #[test]
    fn test_details_serialize_sparse() {
        let details = TaskDetails::sub_order(Uuid::nil(), Uuid::nil());
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 2);
        assert!(json.get("subOrder").is_some());
        assert!(TaskDetails::default().is_empty());
    }
}
