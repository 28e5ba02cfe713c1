//! # PostgreSQL Stores
//!
//! `sqlx` implementations of [`TaskStore`] and [`NotificationStore`].
//!
//! Queries are rendered by the filter types in [`crate::query_builder`] and
//! executed with runtime-checked `query_as`, so the crate builds without a
//! live database. Rows map through `FromRow` structs and are converted into
//! the domain models, rejecting unknown enum strings.
//!
//! ## Claim Protocol
//!
//! ```sql
//! WITH claimable AS (
//!     SELECT id FROM labflow_tasks WHERE ... ORDER BY due_date, created_at
//!     LIMIT n FOR UPDATE SKIP LOCKED
//! )
//! UPDATE labflow_tasks SET claimed_by = $x, claimed_at = $y
//! FROM claimable WHERE labflow_tasks.id = claimable.id
//! RETURNING labflow_tasks.*
//! ```

use super::{ClaimRequest, NotificationStore, TaskCompletion, TaskStore};
use crate::constants::{AssociatedType, NotificationType, TaskType};
use crate::error::{Result, WorkflowError};
use crate::models::{MessageDetails, NewTask, Notification, NotificationDraft, Task, TaskDetails};
use crate::query_builder::{NotificationFilter, SqlValue, TaskFilter, TASKS_TABLE};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres};
use tracing::{debug, instrument};
use uuid::Uuid;

/// Apply every schema migration shipped in `migrations/`
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| WorkflowError::database("migrate", e))
}

/// Bind rendered placeholder values in order
pub(crate) fn bind_values<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    binds: &[SqlValue],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for value in binds {
        query = match value.clone() {
            SqlValue::Text(text) => query.bind(text),
            SqlValue::Uuid(id) => query.bind(id),
            SqlValue::Bool(flag) => query.bind(flag),
            SqlValue::Timestamp(at) => query.bind(at),
            SqlValue::Json(json) => query.bind(json),
        };
    }
    query
}

#[derive(Debug, Clone, FromRow)]
struct TaskRow {
    id: Uuid,
    task_type: String,
    is_fulfilled: bool,
    due_date: DateTime<Utc>,
    details: Json<TaskDetails>,
    claimed_by: Option<String>,
    claimed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = WorkflowError;

    fn try_from(row: TaskRow) -> Result<Self> {
        let task_type: TaskType = row
            .task_type
            .parse()
            .map_err(|e| WorkflowError::database("decode_task", e))?;
        Ok(Task {
            id: row.id,
            task_type,
            is_fulfilled: row.is_fulfilled,
            due_date: row.due_date,
            details: row.details.0,
            claimed_by: row.claimed_by,
            claimed_at: row.claimed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_tasks(rows: Vec<TaskRow>) -> Result<Vec<Task>> {
    rows.into_iter().map(Task::try_from).collect()
}

const INSERT_TASK_SQL: &str = r#"
    INSERT INTO labflow_tasks
        (id, task_type, is_fulfilled, due_date, details, created_at, updated_at)
    VALUES ($1, $2, FALSE, $3, $4, $5, $5)
    RETURNING *
"#;

/// Task store over the `labflow_tasks` table
#[derive(Debug, Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    #[instrument(skip(self, task), fields(task_type = %task.task_type))]
    async fn create(&self, task: NewTask, now: DateTime<Utc>) -> Result<Task> {
        let row = sqlx::query_as::<_, TaskRow>(INSERT_TASK_SQL)
            .bind(Uuid::new_v4())
            .bind(task.task_type.as_str())
            .bind(task.due_date)
            .bind(Json(&task.details))
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| WorkflowError::database("create_task", e))?;
        Task::try_from(row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Task>> {
        let rows = self.find(&TaskFilter::ById(id)).await?;
        Ok(rows.into_iter().next())
    }

    async fn find(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let query = filter.query().build();
        let rows = bind_values(sqlx::query_as::<_, TaskRow>(&query.sql), &query.binds)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| WorkflowError::database("find_tasks", e))?;
        into_tasks(rows)
    }

    #[instrument(skip(self, request), fields(claimant = %request.claimant, limit = request.limit))]
    async fn claim_due(&self, request: &ClaimRequest) -> Result<Vec<Task>> {
        let selection = request
            .filter()
            .query()
            .select(&["id"])
            .limit(request.limit)
            .for_update_skip_locked()
            .build();
        let claimant_slot = selection.binds.len() + 1;
        let claimed_at_slot = claimant_slot + 1;

        let sql = format!(
            "WITH claimable AS ({selection}) \
             UPDATE {TASKS_TABLE} SET claimed_by = ${claimant_slot}, claimed_at = ${claimed_at_slot}, \
             updated_at = ${claimed_at_slot} \
             FROM claimable WHERE {TASKS_TABLE}.id = claimable.id \
             RETURNING {TASKS_TABLE}.*",
            selection = selection.sql,
        );

        let rows = bind_values(sqlx::query_as::<_, TaskRow>(&sql), &selection.binds)
            .bind(request.claimant.as_str())
            .bind(request.now)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| WorkflowError::database("claim_due_tasks", e))?;

        // UPDATE ... RETURNING does not preserve the CTE ordering
        let mut tasks = into_tasks(rows)?;
        tasks.sort_by(|a, b| {
            a.due_date
                .cmp(&b.due_date)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        debug!(claimed = tasks.len(), "🔒 Claimed due tasks");
        Ok(tasks)
    }

    async fn release_claim(&self, id: Uuid, claimant: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE labflow_tasks
            SET claimed_by = NULL, claimed_at = NULL
            WHERE id = $1 AND claimed_by = $2
            "#,
        )
        .bind(id)
        .bind(claimant)
        .execute(&self.pool)
        .await
        .map_err(|e| WorkflowError::database("release_claim", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, successor), fields(task_id = %id, claimant = %claimant))]
    async fn complete_claimed(
        &self,
        id: Uuid,
        claimant: &str,
        successor: Option<NewTask>,
        now: DateTime<Utc>,
    ) -> Result<TaskCompletion> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| WorkflowError::database("begin_complete", e))?;

        let closed = sqlx::query(
            r#"
            UPDATE labflow_tasks
            SET is_fulfilled = TRUE, claimed_by = NULL, claimed_at = NULL, updated_at = $3
            WHERE id = $1 AND claimed_by = $2 AND is_fulfilled = FALSE
            "#,
        )
        .bind(id)
        .bind(claimant)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| WorkflowError::database("fulfill_claimed_task", e))?;

        if closed.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| WorkflowError::database("rollback_complete", e))?;
            return Ok(TaskCompletion::ClaimLost);
        }

        let successor = match successor {
            Some(next) => {
                let row = sqlx::query_as::<_, TaskRow>(INSERT_TASK_SQL)
                    .bind(Uuid::new_v4())
                    .bind(next.task_type.as_str())
                    .bind(next.due_date)
                    .bind(Json(&next.details))
                    .bind(now)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|e| WorkflowError::database("insert_successor", e))?;
                Some(Task::try_from(row)?)
            }
            None => None,
        };

        tx.commit()
            .await
            .map_err(|e| WorkflowError::database("commit_complete", e))?;
        Ok(TaskCompletion::Closed { successor })
    }

    async fn fulfill(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE labflow_tasks
            SET is_fulfilled = TRUE, updated_at = $2
            WHERE id = $1 AND is_fulfilled = FALSE
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| WorkflowError::database("fulfill_task", e))?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Clone, FromRow)]
struct NotificationRow {
    id: Uuid,
    notification_type: String,
    user_id: Uuid,
    description: String,
    email: Option<String>,
    whatsapp: Option<String>,
    is_read: bool,
    message_details: Option<Json<MessageDetails>>,
    associated_id: Option<String>,
    associated_type: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = WorkflowError;

    fn try_from(row: NotificationRow) -> Result<Self> {
        let notification_type: NotificationType = row
            .notification_type
            .parse()
            .map_err(|e| WorkflowError::database("decode_notification", e))?;
        let associated_type = row
            .associated_type
            .as_deref()
            .map(str::parse::<AssociatedType>)
            .transpose()
            .map_err(|e| WorkflowError::database("decode_notification", e))?;

        Ok(Notification {
            id: row.id,
            notification_type,
            user: row.user_id,
            description: row.description,
            email: row.email,
            whatsapp: row.whatsapp,
            is_read: row.is_read,
            message_details: row.message_details.map(|details| details.0),
            associated_id: row.associated_id,
            associated_type,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Notification store over the `labflow_notifications` table
#[derive(Debug, Clone)]
pub struct PgNotificationStore {
    pool: PgPool,
}

impl PgNotificationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    #[instrument(skip(self, draft), fields(recipient = %draft.user, notification_type = %draft.notification_type))]
    async fn create(&self, draft: NotificationDraft, now: DateTime<Utc>) -> Result<Notification> {
        let notification = Notification::from_draft(draft, now);
        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            INSERT INTO labflow_notifications
                (id, notification_type, user_id, description, email, whatsapp, is_read,
                 message_details, associated_id, associated_type, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE, $7, $8, $9, $10, $10)
            RETURNING *
            "#,
        )
        .bind(notification.id)
        .bind(notification.notification_type.as_str())
        .bind(notification.user)
        .bind(&notification.description)
        .bind(&notification.email)
        .bind(&notification.whatsapp)
        .bind(notification.message_details.clone().map(Json))
        .bind(&notification.associated_id)
        .bind(notification.associated_type.map(|t| t.as_str()))
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| WorkflowError::database("create_notification", e))?;
        Notification::try_from(row)
    }

    async fn mark_read(&self, id: Uuid, user: Uuid, now: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE labflow_notifications
            SET is_read = TRUE, updated_at = $3
            WHERE id = $1 AND user_id = $2 AND is_read = FALSE
            "#,
        )
        .bind(id)
        .bind(user)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| WorkflowError::database("mark_notification_read", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, filter: &NotificationFilter) -> Result<Vec<Notification>> {
        let query = filter.query().build();
        let rows = bind_values(
            sqlx::query_as::<_, NotificationRow>(&query.sql),
            &query.binds,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| WorkflowError::database("list_notifications", e))?;
        rows.into_iter().map(Notification::try_from).collect()
    }

    async fn count(&self, filter: &NotificationFilter) -> Result<u64> {
        let query = filter.count_query().build();
        let (count,) = bind_values(sqlx::query_as::<_, (i64,)>(&query.sql), &query.binds)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| WorkflowError::database("count_notifications", e))?;
        Ok(count.max(0) as u64)
    }
}
