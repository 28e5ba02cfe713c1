//! # Notification Dispatcher
//!
//! Drains the notification queue one job at a time. For each job:
//!
//! 1. Persist the notification (server timestamp, unread).
//! 2. For chat messages, resolve the embedded sender and patient into display
//!    projections; a chat message missing either is dropped after persisting.
//! 3. Push to every live session of the recipient.
//! 4. Unless the notification is a chat message, e-mail the recipient the
//!    subject and body rendered when the draft was built.
//!
//! Any error fails the job back to the queue, which retries with backoff.
//! Delivery is at-least-once: a retried job may persist and push again.

use super::mail::MailSender;
use super::queue::{QueueConsumer, QueueJob, RetryDecision};
use super::sessions::SessionRegistry;
use crate::constants::system;
use crate::error::Result;
use crate::logging::log_notification_operation;
use crate::models::{ChatParticipant, Notification, PushedNotification, UserRecord};
use crate::orchestration::clock::Clock;
use crate::repositories::EntityRepository;
use crate::store::NotificationStore;
use crate::templates::split_rendered_email;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

/// What processing one job did
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Delivered {
        notification: Notification,
        sessions: usize,
        emailed: bool,
    },
    /// Persisted, but a chat participant could not be resolved
    Dropped {
        notification: Notification,
        reason: &'static str,
    },
}

pub struct NotificationDispatcher {
    store: Arc<dyn NotificationStore>,
    entities: Arc<dyn EntityRepository>,
    sessions: Arc<SessionRegistry>,
    mail: Arc<dyn MailSender>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("connected_users", &self.sessions.connected_users())
            .finish()
    }
}

fn participant(user: UserRecord) -> ChatParticipant {
    ChatParticipant {
        id: user.id,
        name: user.name,
        user_id: user.public_user_id,
        profile_pic_url: user.profile_pic_url,
    }
}

impl NotificationDispatcher {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        entities: Arc<dyn EntityRepository>,
        sessions: Arc<SessionRegistry>,
        mail: Arc<dyn MailSender>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            entities,
            sessions,
            mail,
            clock,
        }
    }

    /// Deliver one job; an error means the job should be retried
    #[instrument(skip(self, job), fields(job_id = %job.id, attempt = job.attempts, recipient = %job.payload.user))]
    pub async fn process(&self, job: &QueueJob) -> Result<DispatchOutcome> {
        let notification = self
            .store
            .create(job.payload.clone(), self.clock.now())
            .await?;

        let mut pushed = PushedNotification {
            notification: notification.clone(),
            sender: None,
            patient: None,
        };

        if notification.notification_type.is_chat_message() {
            let Some(details) = notification.message_details.clone() else {
                return Ok(self.dropped(notification, "chat message without participants"));
            };
            let (Some(sender_id), Some(patient_id)) = (details.sender, details.patient) else {
                return Ok(self.dropped(notification, "chat message without participants"));
            };
            let Some(sender) = self.entities.find_user(sender_id).await? else {
                return Ok(self.dropped(notification, "chat sender not found"));
            };
            let Some(patient) = self.entities.find_user(patient_id).await? else {
                return Ok(self.dropped(notification, "chat patient not found"));
            };
            pushed.sender = Some(participant(sender));
            pushed.patient = Some(participant(patient));
        }

        let payload = serde_json::to_value(&pushed)?;
        let sessions = self
            .sessions
            .push(notification.user, system::NOTIFICATION_PUSH_EVENT, payload);
        debug!(sessions = sessions, "📡 Pushed to live sessions");

        if notification.notification_type.is_chat_message() {
            return Ok(DispatchOutcome::Delivered {
                notification,
                sessions,
                emailed: false,
            });
        }

        let emailed = self.send_email(&notification).await?;
        let recipient = notification.user.to_string();
        let details = format!("sessions={sessions} emailed={emailed}");
        log_notification_operation(
            "dispatch",
            Some(recipient.as_str()),
            Some(notification.notification_type.as_str()),
            "delivered",
            Some(details.as_str()),
        );

        Ok(DispatchOutcome::Delivered {
            notification,
            sessions,
            emailed,
        })
    }

    async fn send_email(&self, notification: &Notification) -> Result<bool> {
        let Some(rendered) = notification.email.as_deref().filter(|e| !e.is_empty()) else {
            return Ok(false);
        };
        let Some(address) = self
            .entities
            .find_user(notification.user)
            .await?
            .and_then(|user| user.email)
            .filter(|address| !address.is_empty())
        else {
            debug!(recipient = %notification.user, "No e-mail address on file, skipping mail");
            return Ok(false);
        };

        let (subject, body) = split_rendered_email(rendered);
        self.mail.send(&address, &subject, &body).await?;
        Ok(true)
    }

    fn dropped(&self, notification: Notification, reason: &'static str) -> DispatchOutcome {
        warn!(notification_id = %notification.id, reason = reason, "⚠️ Chat notification not pushed");
        DispatchOutcome::Dropped {
            notification,
            reason,
        }
    }

    /// Process one job and settle it with the queue
    pub async fn handle(&self, consumer: &dyn QueueConsumer, job: QueueJob) -> Result<()> {
        match self.process(&job).await {
            Ok(_) => consumer.ack(&job).await,
            Err(e) => {
                let message = e.to_string();
                match consumer.nack(job, &message).await? {
                    RetryDecision::Retry { .. } => {}
                    RetryDecision::Failed => {
                        error!(error = %message, "❌ Notification delivery abandoned");
                    }
                }
                Ok(())
            }
        }
    }

    /// Consume until `shutdown` flips to true
    pub async fn run(
        self: Arc<Self>,
        consumer: Arc<dyn QueueConsumer>,
        mut shutdown: watch::Receiver<bool>,
        error_backoff: Duration,
    ) {
        info!("🚀 Notification dispatcher started");
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
                next = consumer.next() => match next {
                    Ok(Some(job)) => {
                        if let Err(e) = self.handle(consumer.as_ref(), job).await {
                            error!(error = %e, "❌ Failed to settle notification job");
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        error!(error = %e, "❌ Failed to read notification queue");
                        tokio::time::sleep(error_backoff).await;
                    }
                },
            }
        }
        info!("🛑 Notification dispatcher stopped");
    }
}
