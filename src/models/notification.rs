//! # Notification Model
//!
//! Drafts are produced by handlers and the sweeper with every channel already
//! rendered. The dispatcher turns a draft into a persisted [`Notification`];
//! after that the only mutation is marking it read.

use crate::constants::{AssociatedType, NotificationType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Chat references carried by `NEW_MESSAGE` notifications
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDetails {
    pub sender: Option<Uuid>,
    pub patient: Option<Uuid>,
}

/// An unsent notification with pre-rendered channel bodies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDraft {
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub user: Uuid,
    pub description: String,
    pub email: Option<String>,
    pub whatsapp: Option<String>,
    pub message_details: Option<MessageDetails>,
    pub associated_id: Option<String>,
    pub associated_type: Option<AssociatedType>,
}

impl NotificationDraft {
    pub fn new(notification_type: NotificationType, user: Uuid, description: impl Into<String>) -> Self {
        Self {
            notification_type,
            user,
            description: description.into(),
            email: None,
            whatsapp: None,
            message_details: None,
            associated_id: None,
            associated_type: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_whatsapp(mut self, whatsapp: impl Into<String>) -> Self {
        self.whatsapp = Some(whatsapp.into());
        self
    }

    pub fn with_message_details(mut self, details: MessageDetails) -> Self {
        self.message_details = Some(details);
        self
    }

    pub fn associated(mut self, id: impl ToString, associated_type: AssociatedType) -> Self {
        self.associated_id = Some(id.to_string());
        self.associated_type = Some(associated_type);
        self
    }

    pub fn is_chat_message(&self) -> bool {
        self.notification_type.is_chat_message()
    }
}

/// A persisted notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub user: Uuid,
    pub description: String,
    pub email: Option<String>,
    pub whatsapp: Option<String>,
    pub is_read: bool,
    pub message_details: Option<MessageDetails>,
    pub associated_id: Option<String>,
    pub associated_type: Option<AssociatedType>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Notification {
    pub fn from_draft(draft: NotificationDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            notification_type: draft.notification_type,
            user: draft.user,
            description: draft.description,
            email: draft.email,
            whatsapp: draft.whatsapp,
            is_read: false,
            message_details: draft.message_details,
            associated_id: draft.associated_id,
            associated_type: draft.associated_type,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Display projection of a chat participant, resolved at delivery time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatParticipant {
    pub id: Uuid,
    pub name: String,
    pub user_id: Option<String>,
    pub profile_pic_url: Option<String>,
}

/// Payload pushed to every live session of the recipient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushedNotification {
    #[serde(flatten)]
    pub notification: Notification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<ChatParticipant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<ChatParticipant>,
}
