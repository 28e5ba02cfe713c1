//! Tagged-variant filters, one variant per query shape.
//!
//! Each filter renders to SQL conditions for the PostgreSQL stores and also
//! evaluates directly against a model for the in-memory stores, so both
//! backends share a single definition of what a query selects.

use super::{Condition, Pagination, QueryBuilder};
use crate::constants::{NotificationType, TaskType};
use crate::models::{Notification, Task, TaskDetails};
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const TASKS_TABLE: &str = "labflow_tasks";
pub const NOTIFICATIONS_TABLE: &str = "labflow_notifications";

#[derive(Debug, Clone, PartialEq)]
pub enum TaskFilter {
    /// Unfulfilled tasks due at or before the cutoff
    DueUnfulfilled { cutoff: DateTime<Utc> },
    /// Unfulfilled tasks of one type about exactly these entities
    OpenFor {
        task_type: TaskType,
        details: TaskDetails,
    },
    /// Every task, fulfilled or not, of one type about these entities
    Chain {
        task_type: TaskType,
        details: TaskDetails,
    },
    /// Due tasks that are unclaimed or whose claim went stale, minus `exclude`
    Claimable {
        cutoff: DateTime<Utc>,
        stale_before: DateTime<Utc>,
        exclude: Vec<Uuid>,
    },
    ById(Uuid),
}

impl TaskFilter {
    pub fn conditions(&self) -> Vec<Condition> {
        match self {
            TaskFilter::DueUnfulfilled { cutoff } => vec![
                Condition::eq("is_fulfilled", false),
                Condition::lte("due_date", *cutoff),
            ],
            TaskFilter::OpenFor { task_type, details } => vec![
                Condition::eq("is_fulfilled", false),
                Condition::eq("task_type", task_type.as_str()),
                Condition::json_equals("details", details_json(details)),
            ],
            TaskFilter::Chain { task_type, details } => vec![
                Condition::eq("task_type", task_type.as_str()),
                Condition::json_equals("details", details_json(details)),
            ],
            TaskFilter::Claimable {
                cutoff,
                stale_before,
                exclude,
            } => vec![
                Condition::eq("is_fulfilled", false),
                Condition::lte("due_date", *cutoff),
                Condition::Any(vec![
                    Condition::is_null("claimed_by"),
                    Condition::lte("claimed_at", *stale_before),
                ]),
                Condition::not_in("id", exclude.iter().copied()),
            ],
            TaskFilter::ById(id) => vec![Condition::eq("id", *id)],
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskFilter::DueUnfulfilled { cutoff } => task.is_due(*cutoff),
            TaskFilter::OpenFor { task_type, details } => {
                !task.is_fulfilled && task.task_type == *task_type && task.details == *details
            }
            TaskFilter::Chain { task_type, details } => {
                task.task_type == *task_type && task.details == *details
            }
            TaskFilter::Claimable {
                cutoff,
                stale_before,
                exclude,
            } => {
                if exclude.contains(&task.id) {
                    return false;
                }
                let claim_available = match (&task.claimed_by, task.claimed_at) {
                    (None, _) => true,
                    (Some(_), Some(claimed_at)) => claimed_at <= *stale_before,
                    (Some(_), None) => true,
                };
                task.is_due(*cutoff) && claim_available
            }
            TaskFilter::ById(id) => task.id == *id,
        }
    }

    pub fn query(&self) -> QueryBuilder {
        QueryBuilder::new(TASKS_TABLE)
            .where_all(self.conditions())
            .order_asc("due_date")
            .order_asc("created_at")
    }
}

fn details_json(details: &TaskDetails) -> serde_json::Value {
    serde_json::to_value(details).unwrap_or(serde_json::Value::Null)
}

#[derive(Debug, Clone, PartialEq)]
pub enum NotificationFilter {
    /// A recipient's notification feed, chat messages excluded, newest first
    Feed { user: Uuid, page: u32, limit: u32 },
    /// A recipient's chat-message notifications, newest first
    Messages { user: Uuid, page: u32, limit: u32 },
    UnreadFeed { user: Uuid },
    UnreadMessages { user: Uuid },
    /// Everything addressed to a recipient
    Recipient { user: Uuid },
}

impl NotificationFilter {
    pub fn user(&self) -> Uuid {
        match self {
            NotificationFilter::Feed { user, .. }
            | NotificationFilter::Messages { user, .. }
            | NotificationFilter::UnreadFeed { user }
            | NotificationFilter::UnreadMessages { user }
            | NotificationFilter::Recipient { user } => *user,
        }
    }

    pub fn pagination(&self) -> Option<Pagination> {
        match self {
            NotificationFilter::Feed { page, limit, .. }
            | NotificationFilter::Messages { page, limit, .. } => {
                Some(Pagination::new(*page, *limit))
            }
            _ => None,
        }
    }

    pub fn conditions(&self) -> Vec<Condition> {
        let chat = NotificationType::NewMessage.as_str();
        let mut conditions = vec![Condition::eq("user_id", self.user())];
        match self {
            NotificationFilter::Feed { .. } => {
                conditions.push(Condition::not_eq("notification_type", chat));
            }
            NotificationFilter::Messages { .. } => {
                conditions.push(Condition::eq("notification_type", chat));
            }
            NotificationFilter::UnreadFeed { .. } => {
                conditions.push(Condition::not_eq("notification_type", chat));
                conditions.push(Condition::eq("is_read", false));
            }
            NotificationFilter::UnreadMessages { .. } => {
                conditions.push(Condition::eq("notification_type", chat));
                conditions.push(Condition::eq("is_read", false));
            }
            NotificationFilter::Recipient { .. } => {}
        }
        conditions
    }

    pub fn matches(&self, notification: &Notification) -> bool {
        if notification.user != self.user() {
            return false;
        }
        let is_chat = notification.notification_type.is_chat_message();
        match self {
            NotificationFilter::Feed { .. } => !is_chat,
            NotificationFilter::Messages { .. } => is_chat,
            NotificationFilter::UnreadFeed { .. } => !is_chat && !notification.is_read,
            NotificationFilter::UnreadMessages { .. } => is_chat && !notification.is_read,
            NotificationFilter::Recipient { .. } => true,
        }
    }

    pub fn query(&self) -> QueryBuilder {
        QueryBuilder::new(NOTIFICATIONS_TABLE)
            .where_all(self.conditions())
            .order_desc("created_at")
            .paginate(self.pagination())
    }

    pub fn count_query(&self) -> QueryBuilder {
        QueryBuilder::new(NOTIFICATIONS_TABLE)
            .count()
            .where_all(self.conditions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewTask, NotificationDraft};
    use chrono::Duration;

    #[test]
    fn test_due_filter_sql_and_memory_agree() {
        let now = Utc::now();
        let filter = TaskFilter::DueUnfulfilled { cutoff: now };
        let query = filter.query().build();
        assert_eq!(
            query.sql,
            "SELECT * FROM labflow_tasks WHERE is_fulfilled = $1 AND due_date <= $2 \
             ORDER BY due_date ASC, created_at ASC"
        );

        let due = NewTask::new(TaskType::DuePayment, now, TaskDetails::clinic(Uuid::new_v4()))
            .into_task(now);
        let later = NewTask::new(TaskType::DuePayment, now + Duration::hours(1), due.details.clone())
            .into_task(now);
        assert!(filter.matches(&due));
        assert!(!filter.matches(&later));
    }

    #[test]
    fn test_claimable_skips_fresh_claims() {
        let now = Utc::now();
        let mut task = NewTask::new(TaskType::ShipOrder, now, TaskDetails::order(Uuid::new_v4()))
            .into_task(now);
        let filter = TaskFilter::Claimable {
            cutoff: now,
            stale_before: now - Duration::minutes(10),
            exclude: vec![],
        };
        assert!(filter.matches(&task));

        task.claimed_by = Some("sweeper-a".to_string());
        task.claimed_at = Some(now - Duration::minutes(1));
        assert!(!filter.matches(&task));

        task.claimed_at = Some(now - Duration::minutes(11));
        assert!(filter.matches(&task));
    }

    #[test]
    fn test_claimable_honours_exclusions() {
        let now = Utc::now();
        let task = NewTask::new(TaskType::ShipOrder, now, TaskDetails::order(Uuid::new_v4()))
            .into_task(now);
        let filter = TaskFilter::Claimable {
            cutoff: now,
            stale_before: now - Duration::minutes(10),
            exclude: vec![task.id],
        };
        assert!(!filter.matches(&task));

        let query = filter.query().build();
        assert!(query.sql.contains("id NOT IN ($4)"), "{}", query.sql);
    }

    #[test]
    fn test_open_for_requires_exact_details() {
        let now = Utc::now();
        let inquiry = Uuid::new_v4();
        let task = NewTask::new(TaskType::SetQuoteEstimateDate, now, TaskDetails::inquiry(inquiry))
            .into_task(now);

        let same = TaskFilter::OpenFor {
            task_type: TaskType::SetQuoteEstimateDate,
            details: TaskDetails::inquiry(inquiry),
        };
        let other = TaskFilter::OpenFor {
            task_type: TaskType::SetQuoteEstimateDate,
            details: TaskDetails::inquiry(Uuid::new_v4()),
        };
        assert!(same.matches(&task));
        assert!(!other.matches(&task));
    }

    #[test]
    fn test_feed_excludes_chat_messages() {
        let user = Uuid::new_v4();
        let now = Utc::now();
        let chat = Notification::from_draft(
            NotificationDraft::new(NotificationType::NewMessage, user, "hi"),
            now,
        );
        let reminder = Notification::from_draft(
            NotificationDraft::new(NotificationType::ShipOrder, user, "ship it"),
            now,
        );

        let feed = NotificationFilter::Feed { user, page: 1, limit: 10 };
        assert!(feed.matches(&reminder));
        assert!(!feed.matches(&chat));
        assert!(NotificationFilter::UnreadMessages { user }.matches(&chat));
        assert!(!NotificationFilter::Recipient { user: Uuid::new_v4() }.matches(&chat));

        let query = feed.query().build();
        assert!(query.sql.ends_with("ORDER BY created_at DESC LIMIT 10"));
        assert_eq!(query.binds.len(), 2);
    }
}
