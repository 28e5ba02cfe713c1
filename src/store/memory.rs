//! In-process stores guarded by `parking_lot` locks.
//!
//! Each operation holds the lock for its whole duration, which gives the same
//! atomicity the PostgreSQL stores get from row locks and transactions.

use super::{ClaimRequest, NotificationStore, TaskCompletion, TaskStore};
use crate::error::Result;
use crate::models::{NewTask, Notification, NotificationDraft, Task};
use crate::query_builder::{NotificationFilter, TaskFilter};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    tasks: Mutex<HashMap<Uuid, Task>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored task, earliest due first
    pub fn snapshot(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.tasks.lock().values().cloned().collect();
        sort_by_due(&mut tasks);
        tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }
}

fn sort_by_due(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        a.due_date
            .cmp(&b.due_date)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create(&self, task: NewTask, now: DateTime<Utc>) -> Result<Task> {
        let task = task.into_task(now);
        self.tasks.lock().insert(task.id, task.clone());
        Ok(task)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Task>> {
        Ok(self.tasks.lock().get(&id).cloned())
    }

    async fn find(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .tasks
            .lock()
            .values()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect();
        sort_by_due(&mut tasks);
        Ok(tasks)
    }

    async fn claim_due(&self, request: &ClaimRequest) -> Result<Vec<Task>> {
        let filter = request.filter();
        let mut tasks = self.tasks.lock();

        let mut candidates: Vec<Task> = tasks
            .values()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect();
        sort_by_due(&mut candidates);
        candidates.truncate(request.limit as usize);

        let mut claimed = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if let Some(task) = tasks.get_mut(&candidate.id) {
                task.claimed_by = Some(request.claimant.clone());
                task.claimed_at = Some(request.now);
                task.updated_at = request.now;
                claimed.push(task.clone());
            }
        }
        Ok(claimed)
    }

    async fn release_claim(&self, id: Uuid, claimant: &str) -> Result<bool> {
        let mut tasks = self.tasks.lock();
        match tasks.get_mut(&id) {
            Some(task) if task.claimed_by.as_deref() == Some(claimant) => {
                task.claimed_by = None;
                task.claimed_at = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn complete_claimed(
        &self,
        id: Uuid,
        claimant: &str,
        successor: Option<NewTask>,
        now: DateTime<Utc>,
    ) -> Result<TaskCompletion> {
        let mut tasks = self.tasks.lock();

        let Some(task) = tasks.get_mut(&id) else {
            return Ok(TaskCompletion::ClaimLost);
        };
        if task.is_fulfilled || task.claimed_by.as_deref() != Some(claimant) {
            return Ok(TaskCompletion::ClaimLost);
        }

        task.is_fulfilled = true;
        task.claimed_by = None;
        task.claimed_at = None;
        task.updated_at = now;

        let successor = successor.map(|next| {
            let next = next.into_task(now);
            tasks.insert(next.id, next.clone());
            next
        });
        Ok(TaskCompletion::Closed { successor })
    }

    async fn fulfill(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool> {
        let mut tasks = self.tasks.lock();
        match tasks.get_mut(&id) {
            Some(task) if !task.is_fulfilled => {
                task.is_fulfilled = true;
                task.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryNotificationStore {
    notifications: RwLock<Vec<Notification>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored notification in insertion order
    pub fn snapshot(&self) -> Vec<Notification> {
        self.notifications.read().clone()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn create(&self, draft: NotificationDraft, now: DateTime<Utc>) -> Result<Notification> {
        let notification = Notification::from_draft(draft, now);
        self.notifications.write().push(notification.clone());
        Ok(notification)
    }

    async fn mark_read(&self, id: Uuid, user: Uuid, now: DateTime<Utc>) -> Result<bool> {
        let mut notifications = self.notifications.write();
        match notifications
            .iter_mut()
            .find(|notification| notification.id == id && notification.user == user)
        {
            Some(notification) if !notification.is_read => {
                notification.is_read = true;
                notification.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list(&self, filter: &NotificationFilter) -> Result<Vec<Notification>> {
        let mut matching: Vec<Notification> = self
            .notifications
            .read()
            .iter()
            .filter(|notification| filter.matches(notification))
            .cloned()
            .collect();
        // Stable sort keeps insertion order for equal timestamps, newest first
        matching.reverse();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(match filter.pagination() {
            Some(pagination) => pagination.apply(matching),
            None => matching,
        })
    }

    async fn count(&self, filter: &NotificationFilter) -> Result<u64> {
        Ok(self
            .notifications
            .read()
            .iter()
            .filter(|notification| filter.matches(notification))
            .count() as u64)
    }
}
