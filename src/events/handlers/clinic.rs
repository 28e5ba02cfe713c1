//! Clinic creation, profile edits and balance changes.

use crate::constants::{AssociatedType, NotificationType, RoleCode, TaskType};
use crate::error::Result;
use crate::events::bus::EventListener;
use crate::events::types::{DomainEvent, EventKind};
use crate::models::{NewTask, TaskDetails};
use crate::orchestration::context::WorkflowContext;
use crate::templates::{template_data, TemplateName};
use async_trait::async_trait;
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ClinicEventHandler {
    ctx: WorkflowContext,
}

impl ClinicEventHandler {
    pub const EVENTS: &'static [EventKind] = &[
        EventKind::ClinicCreated,
        EventKind::ClinicUpdated,
        EventKind::BalanceUpdated,
    ];

    pub fn new(ctx: WorkflowContext) -> Self {
        Self { ctx }
    }

    /// Payment reminders start immediately and recur while a balance is owed
    async fn clinic_created(&self, clinic_id: Uuid) -> Result<()> {
        let Some(clinic) = self.ctx.entities.find_clinic(clinic_id).await? else {
            return Ok(());
        };
        let now = self.ctx.clock.now();
        self.ctx
            .create_task(NewTask::new(TaskType::DuePayment, now, TaskDetails::clinic(clinic.id)))
            .await?;
        Ok(())
    }

    /// Only edits made by a dentist admin are announced to the other admins
    async fn clinic_updated(&self, clinic_id: Uuid, updated_by: Uuid) -> Result<()> {
        let Some(updater) = self.ctx.entities.find_user(updated_by).await? else {
            return Ok(());
        };
        if updater.role != Some(RoleCode::DentistAdmin) {
            return Ok(());
        }
        let Some(clinic) = self.ctx.entities.find_clinic(clinic_id).await? else {
            return Ok(());
        };

        let mut drafts = Vec::new();
        for admin in self.ctx.dentist_admins(updater.lab, Some(clinic.id)).await? {
            drafts.push(self.ctx.render(
                TemplateName::ClinicUpdated,
                RoleCode::DentistAdmin,
                NotificationType::ClinicUpdated,
                admin.id,
                &template_data([
                    ("RecipientName", admin.name),
                    ("DentistName", updater.name.clone()),
                ]),
                (clinic.id, AssociatedType::Clinic),
            )?);
        }
        self.ctx.enqueue_all(drafts).await?;
        Ok(())
    }

    async fn balance_updated(&self, clinic_id: Uuid) -> Result<()> {
        let Some(clinic) = self.ctx.entities.find_clinic(clinic_id).await? else {
            return Ok(());
        };

        let mut drafts = Vec::new();
        for admin in self.ctx.dentist_admins(clinic.lab, Some(clinic.id)).await? {
            drafts.push(self.ctx.render(
                TemplateName::PaymentUpdated,
                RoleCode::DentistAdmin,
                NotificationType::BalanceUpdated,
                admin.id,
                &template_data([("RecipientName", admin.name)]),
                (clinic.id, AssociatedType::Clinic),
            )?);
        }
        self.ctx.enqueue_all(drafts).await?;
        Ok(())
    }
}

#[async_trait]
impl EventListener for ClinicEventHandler {
    fn name(&self) -> &str {
        "clinic_handler"
    }

    #[instrument(skip(self, event), fields(event = event.name()))]
    async fn handle(&self, event: &DomainEvent) -> Result<()> {
        match event {
            DomainEvent::ClinicCreated { clinic } => self.clinic_created(*clinic).await,
            DomainEvent::ClinicUpdated { clinic, updated_by } => {
                self.clinic_updated(*clinic, *updated_by).await
            }
            DomainEvent::BalanceUpdated { clinic } => self.balance_updated(*clinic).await,
            _ => Ok(()),
        }
    }
}
