//! PostgreSQL store tests. Each test gets a fresh database from `sqlx::test`,
//! so they only run with `--features test-database` and a `DATABASE_URL`
//! pointing at a server the test user may create databases on.
#![cfg(feature = "test-database")]

use anyhow::{Context, Result};
use chrono::Duration;
use labflow_core::constants::{NotificationType, TaskType};
use labflow_core::messaging::{NotificationQueue, PgJobQueue, QueueConsumer, QueueJob, RetryDecision};
use labflow_core::models::{NewTask, NotificationDraft, TaskDetails};
use labflow_core::query_builder::{NotificationFilter, TaskFilter};
use labflow_core::store::{
    ClaimRequest, NotificationStore, PgNotificationStore, PgTaskStore, TaskCompletion, TaskStore,
};
use labflow_core::test_helpers::{monday_morning, test_config};
use sqlx::PgPool;
use uuid::Uuid;

fn claim(claimant: &str, limit: u32) -> ClaimRequest {
    let now = monday_morning();
    ClaimRequest {
        cutoff: now,
        claimant: claimant.to_string(),
        limit,
        now,
        claim_timeout: Duration::minutes(5),
        exclude: vec![],
    }
}

#[sqlx::test(migrator = "labflow_core::test_helpers::MIGRATOR")]
async fn test_claims_are_exclusive_and_ordered(pool: PgPool) -> Result<()> {
    let store = PgTaskStore::new(pool);
    let now = monday_morning();
    for hours in [3, 1, 2] {
        store
            .create(
                NewTask::new(
                    TaskType::SubmitImpression,
                    now - Duration::hours(hours),
                    TaskDetails::inquiry(Uuid::new_v4()),
                ),
                now,
            )
            .await
            .context("creating task")?;
    }
    store
        .create(
            NewTask::new(
                TaskType::ShipOrder,
                now + Duration::days(1),
                TaskDetails::order(Uuid::new_v4()),
            ),
            now,
        )
        .await?;

    let first = store.claim_due(&claim("sweeper-a", 2)).await?;
    let second = store.claim_due(&claim("sweeper-b", 10)).await?;

    let due: Vec<_> = first.iter().map(|t| t.due_date).collect();
    assert_eq!(due, vec![now - Duration::hours(3), now - Duration::hours(2)]);
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].due_date, now - Duration::hours(1));
    assert_eq!(second[0].claimed_by.as_deref(), Some("sweeper-b"));
    assert!(store.claim_due(&claim("sweeper-c", 10)).await?.is_empty());
    Ok(())
}

#[sqlx::test(migrator = "labflow_core::test_helpers::MIGRATOR")]
async fn test_excluded_tasks_are_not_claimed(pool: PgPool) -> Result<()> {
    let store = PgTaskStore::new(pool);
    let now = monday_morning();
    let skipped = store
        .create(
            NewTask::new(TaskType::ReceiveOrder, now - Duration::hours(2), TaskDetails::order(Uuid::new_v4())),
            now,
        )
        .await?;
    let taken = store
        .create(
            NewTask::new(TaskType::ReceiveOrder, now - Duration::hours(1), TaskDetails::order(Uuid::new_v4())),
            now,
        )
        .await?;

    let mut request = claim("sweeper-a", 10);
    request.exclude = vec![skipped.id];
    let claimed = store.claim_due(&request).await?;
    assert_eq!(claimed.len(), 1);
    assert_eq!(claimed[0].id, taken.id);
    Ok(())
}

#[sqlx::test(migrator = "labflow_core::test_helpers::MIGRATOR")]
async fn test_complete_claimed_inserts_successor_atomically(pool: PgPool) -> Result<()> {
    let store = PgTaskStore::new(pool);
    let now = monday_morning();
    let details = TaskDetails::inquiry(Uuid::new_v4());
    let task = store
        .create(
            NewTask::new(TaskType::SubmitImpression, now, details.clone()),
            now,
        )
        .await?;
    store.claim_due(&claim("sweeper-a", 1)).await?;

    let lost = store
        .complete_claimed(task.id, "ghost", None, now)
        .await?;
    assert_eq!(lost, TaskCompletion::ClaimLost);

    let successor = NewTask::successor_of(&task, Duration::days(2));
    let TaskCompletion::Closed {
        successor: Some(next),
    } = store
        .complete_claimed(task.id, "sweeper-a", Some(successor), now)
        .await?
    else {
        anyhow::bail!("expected the claimant to close the task");
    };
    assert_eq!(next.due_date, now + Duration::days(2));
    assert_eq!(next.details, details);

    let chain = store
        .find(&TaskFilter::Chain {
            task_type: TaskType::SubmitImpression,
            details: details.clone(),
        })
        .await?;
    assert_eq!(chain.len(), 2);
    let open = store
        .find(&TaskFilter::OpenFor {
            task_type: TaskType::SubmitImpression,
            details,
        })
        .await?;
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].id, next.id);
    Ok(())
}

#[sqlx::test(migrator = "labflow_core::test_helpers::MIGRATOR")]
async fn test_released_claim_is_picked_up_again(pool: PgPool) -> Result<()> {
    let store = PgTaskStore::new(pool);
    let now = monday_morning();
    let task = store
        .create(
            NewTask::new(TaskType::ApproveDentist, now, TaskDetails::dentist(Uuid::new_v4())),
            now,
        )
        .await?;
    store.claim_due(&claim("sweeper-a", 1)).await?;

    assert!(!store.release_claim(task.id, "sweeper-b").await?);
    assert!(store.release_claim(task.id, "sweeper-a").await?);
    let reclaimed = store.claim_due(&claim("sweeper-b", 1)).await?;
    assert_eq!(reclaimed.len(), 1);

    assert!(store.fulfill(task.id, now).await?);
    assert!(!store.fulfill(task.id, now).await?);
    Ok(())
}

#[sqlx::test(migrator = "labflow_core::test_helpers::MIGRATOR")]
async fn test_notification_feed_and_unread_counts(pool: PgPool) -> Result<()> {
    let store = PgNotificationStore::new(pool);
    let now = monday_morning();
    let user = Uuid::new_v4();

    let first = store
        .create(
            NotificationDraft::new(NotificationType::UpdatePrivilege, user, "permissions changed"),
            now,
        )
        .await?;
    store
        .create(
            NotificationDraft::new(NotificationType::UpdatePrivilege, user, "again"),
            now + Duration::minutes(1),
        )
        .await?;

    assert_eq!(store.count(&NotificationFilter::UnreadFeed { user }).await?, 2);
    assert!(store.mark_read(first.id, user, now).await?);
    assert!(!store.mark_read(first.id, Uuid::new_v4(), now).await?);
    assert_eq!(store.count(&NotificationFilter::UnreadFeed { user }).await?, 1);

    let feed = store
        .list(&NotificationFilter::Feed {
            user,
            page: 1,
            limit: 10,
        })
        .await?;
    let descriptions: Vec<_> = feed.iter().map(|n| n.description.as_str()).collect();
    assert_eq!(descriptions, vec!["again", "permissions changed"]);
    Ok(())
}

#[sqlx::test(migrator = "labflow_core::test_helpers::MIGRATOR")]
async fn test_job_queue_retries_then_fails(pool: PgPool) -> Result<()> {
    let mut config = test_config().dispatcher;
    config.max_attempts = 2;
    config.backoff_base_ms = 0;
    config.backoff_max_ms = 0;
    let queue = PgJobQueue::new(pool, config);

    let draft = NotificationDraft::new(NotificationType::UpdatePrivilege, Uuid::new_v4(), "hi");
    queue.enqueue(QueueJob::send_notification(draft)).await?;
    assert_eq!(queue.pending_count().await?, 1);

    let job = queue.next().await?.context("job should be visible")?;
    assert_eq!(job.attempts, 1);
    assert!(matches!(
        queue.nack(job, "smtp down").await?,
        RetryDecision::Retry { attempt: 1, .. }
    ));

    let job = queue.next().await?.context("retry should be visible")?;
    assert_eq!(queue.nack(job, "smtp down").await?, RetryDecision::Failed);
    assert!(queue.next().await?.is_none());
    assert_eq!(queue.pending_count().await?, 0);
    Ok(())
}
