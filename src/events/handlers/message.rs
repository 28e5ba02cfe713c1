//! Chat messages for recipients who are not connected.
//!
//! Drafts carry only the sender and patient ids; the dispatcher resolves them
//! into display projections when it delivers.

use crate::constants::{AssociatedType, NotificationType};
use crate::error::Result;
use crate::events::bus::EventListener;
use crate::events::types::{DomainEvent, EventKind};
use crate::models::{MessageDetails, NotificationDraft};
use crate::orchestration::context::WorkflowContext;
use async_trait::async_trait;
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ChatEventHandler {
    ctx: WorkflowContext,
}

impl ChatEventHandler {
    pub const EVENTS: &'static [EventKind] = &[EventKind::NewMessage];

    pub fn new(ctx: WorkflowContext) -> Self {
        Self { ctx }
    }

    async fn new_message(
        &self,
        room: Uuid,
        message: &str,
        offline_users: &[Uuid],
        sender: Uuid,
        patient: Uuid,
    ) -> Result<()> {
        let drafts = offline_users
            .iter()
            .map(|user| {
                NotificationDraft::new(NotificationType::NewMessage, *user, message)
                    .associated(room, AssociatedType::ChatRoom)
                    .with_message_details(MessageDetails {
                        sender: Some(sender),
                        patient: Some(patient),
                    })
            })
            .collect();
        self.ctx.enqueue_all(drafts).await?;
        Ok(())
    }
}

#[async_trait]
impl EventListener for ChatEventHandler {
    fn name(&self) -> &str {
        "chat_handler"
    }

    #[instrument(skip(self, event), fields(event = event.name()))]
    async fn handle(&self, event: &DomainEvent) -> Result<()> {
        match event {
            DomainEvent::NewMessage {
                room,
                message,
                offline_users,
                sender,
                patient,
            } => {
                self.new_message(*room, message, offline_users, *sender, *patient)
                    .await
            }
            _ => Ok(()),
        }
    }
}
