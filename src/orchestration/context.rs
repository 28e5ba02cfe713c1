//! Shared collaborators for event handlers and task policies.

use super::clock::Clock;
use crate::constants::{AssociatedType, NotificationType, RoleCode};
use crate::error::Result;
use crate::logging::log_notification_operation;
use crate::messaging::NotificationQueue;
use crate::models::{NewTask, NotificationDraft, Task, UserRecord};
use crate::repositories::EntityRepository;
use crate::store::TaskStore;
use crate::templates::{TemplateData, TemplateManager, TemplateName};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

#[derive(Clone)]
pub struct WorkflowContext {
    pub entities: Arc<dyn EntityRepository>,
    pub templates: Arc<TemplateManager>,
    pub tasks: Arc<dyn TaskStore>,
    pub queue: Arc<dyn NotificationQueue>,
    pub clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for WorkflowContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowContext")
            .field("portal_name", &self.templates.portal_name())
            .finish()
    }
}

impl WorkflowContext {
    /// Lab admins of `lab`; none when the lab is unset
    pub async fn lab_admins(&self, lab: Option<Uuid>) -> Result<Vec<UserRecord>> {
        match lab {
            Some(lab) => self.entities.lab_admins(lab).await,
            None => Ok(Vec::new()),
        }
    }

    /// Dentist admins of `clinic` within `lab`; none when either is unset
    pub async fn dentist_admins(
        &self,
        lab: Option<Uuid>,
        clinic: Option<Uuid>,
    ) -> Result<Vec<UserRecord>> {
        match (lab, clinic) {
            (Some(lab), Some(clinic)) => self.entities.dentist_admins(lab, clinic).await,
            _ => Ok(Vec::new()),
        }
    }

    /// Render every channel of `name` for one recipient and tag the back-reference
    pub fn render(
        &self,
        name: TemplateName,
        role: RoleCode,
        notification_type: NotificationType,
        recipient: Uuid,
        data: &TemplateData,
        associated: (impl ToString, AssociatedType),
    ) -> Result<NotificationDraft> {
        let (associated_id, associated_type) = associated;
        Ok(self
            .templates
            .render_draft(name, role, notification_type, recipient, data)?
            .associated(associated_id, associated_type))
    }

    pub async fn enqueue_all(&self, drafts: Vec<NotificationDraft>) -> Result<usize> {
        let count = drafts.len();
        for draft in drafts {
            let recipient = draft.user.to_string();
            let notification_type = draft.notification_type;
            self.queue.enqueue_draft(draft).await?;
            log_notification_operation(
                "enqueue",
                Some(recipient.as_str()),
                Some(notification_type.as_str()),
                "queued",
                None,
            );
        }
        Ok(count)
    }

    pub async fn create_task(&self, task: NewTask) -> Result<Task> {
        let created = self.tasks.create(task, self.clock.now()).await?;
        debug!(
            task_id = %created.id,
            task_type = %created.task_type,
            due_date = %created.due_date,
            "📝 Task created"
        );
        Ok(created)
    }
}
