//! Integration tests for notification delivery: persistence, live-session
//! push, e-mail, chat participant resolution and retries.

use labflow_core::constants::{system, NotificationType};
use labflow_core::events::DomainEvent;
use labflow_core::messaging::{DispatchOutcome, QueueConsumer, RetryDecision};
use labflow_core::models::PushedNotification;
use labflow_core::query_builder::NotificationFilter;
use labflow_core::store::NotificationStore;
use labflow_core::test_helpers::{monday_morning, test_config, LabFixture, WorkflowTestHarness};
use std::time::Duration;
use uuid::Uuid;

fn harness() -> (WorkflowTestHarness, LabFixture) {
    let harness = WorkflowTestHarness::new(monday_morning());
    let lab = LabFixture::install(&harness.entities);
    (harness, lab)
}

#[tokio::test]
async fn test_rendered_notification_is_persisted_pushed_and_emailed() {
    let (harness, lab) = harness();
    let mut session = harness.system.sessions().register(lab.dentist.id);

    harness
        .emit(DomainEvent::PrivilegeUpdated {
            user: lab.dentist.id,
        })
        .await;
    let outcomes = harness.deliver_all().await.unwrap();
    assert_eq!(outcomes.len(), 1);

    let DispatchOutcome::Delivered {
        notification,
        sessions,
        emailed,
    } = &outcomes[0]
    else {
        panic!("expected delivery, got {:?}", outcomes[0]);
    };
    assert_eq!(*sessions, 1);
    assert!(*emailed);
    assert!(!notification.is_read);
    assert_eq!(notification.created_at, monday_morning());
    assert_eq!(notification.notification_type, NotificationType::UpdatePrivilege);

    let stored = harness
        .notifications
        .list(&NotificationFilter::Recipient {
            user: lab.dentist.id,
        })
        .await
        .unwrap();
    assert_eq!(stored, vec![notification.clone()]);

    let pushed = session.try_recv().unwrap();
    assert_eq!(pushed.event, system::NOTIFICATION_PUSH_EVENT);
    let payload: PushedNotification = serde_json::from_value(pushed.payload).unwrap();
    assert_eq!(payload.notification.id, notification.id);
    assert!(payload.sender.is_none());

    let mail = harness.mail.sent_to("dana.dentist@example.com");
    assert_eq!(mail.len(), 1);
    assert_eq!(mail[0].subject, "User Permissions Updated");
    assert!(mail[0].body.starts_with("Dear Dana Dentist,"));
    assert!(mail[0].body.ends_with(system::DEFAULT_PORTAL_NAME));
}

#[tokio::test]
async fn test_offline_recipient_without_address_still_gets_stored() {
    let (harness, lab) = harness();
    harness.entities.update_user(lab.planner.id, |user| user.email = None);

    harness
        .emit(DomainEvent::QuoteRework {
            inquiry: lab.inquiry(&harness.entities).id,
            planner: lab.planner.id,
        })
        .await;
    let outcomes = harness.deliver_all().await.unwrap();

    assert!(matches!(
        outcomes.as_slice(),
        [DispatchOutcome::Delivered {
            sessions: 0,
            emailed: false,
            ..
        }]
    ));
    assert_eq!(harness.notifications.snapshot().len(), 1);
    assert!(harness.mail.sent().is_empty());
}

#[tokio::test]
async fn test_chat_message_resolves_participants_and_skips_email() {
    let (harness, lab) = harness();
    let mut session = harness.system.sessions().register(lab.planner.id);

    harness
        .emit(DomainEvent::NewMessage {
            room: Uuid::new_v4(),
            message: "Scan uploaded".to_string(),
            offline_users: vec![lab.planner.id],
            sender: lab.dentist.id,
            patient: lab.patient.id,
        })
        .await;
    let outcomes = harness.deliver_all().await.unwrap();

    assert!(matches!(
        outcomes.as_slice(),
        [DispatchOutcome::Delivered { emailed: false, .. }]
    ));
    assert!(harness.mail.sent().is_empty());

    let pushed = session.try_recv().unwrap();
    let payload: PushedNotification = serde_json::from_value(pushed.payload).unwrap();
    let sender = payload.sender.unwrap();
    assert_eq!(sender.id, lab.dentist.id);
    assert_eq!(sender.name, "Dana Dentist");
    let patient = payload.patient.unwrap();
    assert_eq!(patient.user_id.as_deref(), Some("PT-0042"));

    let unread = harness
        .notifications
        .count(&NotificationFilter::UnreadMessages {
            user: lab.planner.id,
        })
        .await
        .unwrap();
    assert_eq!(unread, 1);
}

#[tokio::test]
async fn test_chat_message_with_unknown_sender_is_dropped_after_persisting() {
    let (harness, lab) = harness();
    let mut session = harness.system.sessions().register(lab.planner.id);

    harness
        .emit(DomainEvent::NewMessage {
            room: Uuid::new_v4(),
            message: "hello".to_string(),
            offline_users: vec![lab.planner.id],
            sender: Uuid::new_v4(),
            patient: lab.patient.id,
        })
        .await;
    let outcomes = harness.deliver_all().await.unwrap();

    assert!(matches!(
        outcomes.as_slice(),
        [DispatchOutcome::Dropped {
            reason: "chat sender not found",
            ..
        }]
    ));
    assert_eq!(harness.notifications.snapshot().len(), 1);
    assert!(session.try_recv().is_none());
}

#[tokio::test]
async fn test_failed_delivery_retries_then_parks_the_job() {
    let (harness, lab) = harness();
    harness.mail.set_failing(true);

    harness
        .emit(DomainEvent::PrivilegeUpdated {
            user: lab.dentist.id,
        })
        .await;

    let consumer = harness.queue.as_ref();
    let dispatcher = harness.system.dispatcher();
    let max_attempts = test_config().dispatcher.max_attempts;

    let mut attempts = 0;
    while attempts < max_attempts {
        let Some(job) = consumer.next().await.unwrap() else {
            continue;
        };
        attempts += 1;
        assert_eq!(job.attempts, attempts);
        dispatcher.handle(consumer, job).await.unwrap();
    }

    let failed = harness.queue.failed_jobs();
    assert_eq!(failed.len(), 1);
    assert!(failed[0].error.contains("recording sender set to fail"));
    assert_eq!(harness.queue.stats().retried, u64::from(max_attempts - 1));

    // At-least-once: every attempt persisted before the mail step failed
    assert_eq!(harness.notifications.snapshot().len(), max_attempts as usize);
}

#[tokio::test]
async fn test_nack_reports_retry_with_backoff() {
    let (harness, lab) = harness();
    harness
        .emit(DomainEvent::PrivilegeUpdated {
            user: lab.dentist.id,
        })
        .await;

    let job = harness.queue.next().await.unwrap().unwrap();
    let decision = harness.queue.nack(job, "smtp timeout").await.unwrap();
    let expected = test_config().dispatcher.backoff_for_attempt(1);
    assert_eq!(
        decision,
        RetryDecision::Retry {
            attempt: 1,
            delay: expected
        }
    );
}

#[tokio::test]
async fn test_background_loop_delivers_and_shuts_down() {
    let (harness, lab) = harness();
    let handle = harness.system.start();
    assert!(handle.is_running());

    harness
        .emit(DomainEvent::PrivilegeUpdated {
            user: lab.dentist.id,
        })
        .await;

    let delivered = tokio::time::timeout(Duration::from_secs(5), async {
        while harness.queue.stats().completed == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(delivered.is_ok(), "dispatcher loop never delivered");
    assert_eq!(harness.mail.sent().len(), 1);

    handle.shutdown().await;
}
