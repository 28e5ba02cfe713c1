//! Inquiry intake, planner assignment, estimate dates and impressions.

use super::response_window;
use crate::constants::{AssociatedType, NotificationType, RoleCode, TaskType};
use crate::error::Result;
use crate::events::bus::EventListener;
use crate::events::types::{DomainEvent, EventKind};
use crate::models::{NewTask, NotificationDraft, TaskDetails};
use crate::orchestration::context::WorkflowContext;
use crate::query_builder::TaskFilter;
use crate::templates::{template_data, TemplateName};
use async_trait::async_trait;
use chrono::Duration;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Plain text lab admins get for a new inquiry
pub const INQUIRY_RECEIVED_DESCRIPTION: &str = "A new query has been received.";

#[derive(Debug, Clone)]
pub struct InquiryEventHandler {
    ctx: WorkflowContext,
}

impl InquiryEventHandler {
    pub const EVENTS: &'static [EventKind] = &[
        EventKind::InquiryCreated,
        EventKind::TreatmentPlannerAssigned,
        EventKind::PlannerSetDate,
        EventKind::ImpressionDelivered,
    ];

    pub fn new(ctx: WorkflowContext) -> Self {
        Self { ctx }
    }

    /// Lab admins hear about the inquiry; the dentist owes an impression by tomorrow
    async fn inquiry_created(&self, inquiry_id: Uuid) -> Result<()> {
        let Some(inquiry) = self.ctx.entities.find_inquiry(inquiry_id).await? else {
            return Ok(());
        };
        let patient_id = self.ctx.entities.public_user_id(inquiry.patient).await?;

        let drafts = self
            .ctx
            .lab_admins(inquiry.lab)
            .await?
            .into_iter()
            .map(|admin| {
                NotificationDraft::new(
                    NotificationType::InquiryReceived,
                    admin.id,
                    INQUIRY_RECEIVED_DESCRIPTION,
                )
                .associated(&patient_id, AssociatedType::UserId)
            })
            .collect();
        self.ctx.enqueue_all(drafts).await?;

        let now = self.ctx.clock.now();
        self.ctx
            .create_task(NewTask::new(
                TaskType::SubmitImpression,
                now + Duration::days(1),
                TaskDetails::inquiry(inquiry.id),
            ))
            .await?;
        Ok(())
    }

    async fn treatment_planner_assigned(&self, inquiry_id: Uuid) -> Result<()> {
        let Some(inquiry) = self.ctx.entities.find_inquiry(inquiry_id).await? else {
            return Ok(());
        };
        let Some(planner) = inquiry.treatment_planner else {
            return Ok(());
        };

        let patient_id = self.ctx.entities.public_user_id(inquiry.patient).await?;
        let draft = self.ctx.render(
            TemplateName::AssignedTreatmentPlanner,
            RoleCode::TreatmentPlanner,
            NotificationType::AssignTreatmentPlanner,
            planner,
            &template_data([
                ("RecipientName", self.ctx.entities.user_name(Some(planner)).await?),
                ("PatientId", patient_id.clone()),
            ]),
            (patient_id, AssociatedType::UserId),
        )?;
        self.ctx.enqueue_all(vec![draft]).await?;

        // Reassigning a planner keeps the existing reminder chain
        let details = TaskDetails::inquiry(inquiry.id);
        let open = self
            .ctx
            .tasks
            .find(&TaskFilter::OpenFor {
                task_type: TaskType::SetQuoteEstimateDate,
                details: details.clone(),
            })
            .await?;
        if !open.is_empty() {
            debug!(inquiry = %inquiry.id, "Estimate reminder already open, not creating another");
            return Ok(());
        }

        let now = self.ctx.clock.now();
        self.ctx
            .create_task(NewTask::new(
                TaskType::SetQuoteEstimateDate,
                now + response_window(),
                details,
            ))
            .await?;
        Ok(())
    }

    async fn planner_set_date(&self, inquiry_id: Uuid) -> Result<()> {
        let Some(inquiry) = self.ctx.entities.find_inquiry(inquiry_id).await? else {
            return Ok(());
        };
        let Some(estimation_date) = inquiry.quote_estimation_date else {
            return Ok(());
        };

        if let Some(dentist) = inquiry.dentist {
            let draft = self.ctx.render(
                TemplateName::TreatmentEstimationProvided,
                RoleCode::Dentist,
                NotificationType::PlannerSetEstimate,
                dentist,
                &template_data([
                    ("RecipientName", self.ctx.entities.user_name(Some(dentist)).await?),
                    ("PatientId", self.ctx.entities.public_user_id(inquiry.patient).await?),
                ]),
                (inquiry.id, AssociatedType::Inquiry),
            )?;
            self.ctx.enqueue_all(vec![draft]).await?;
        }

        self.ctx
            .create_task(NewTask::new(
                TaskType::SubmitPresentation,
                estimation_date + response_window(),
                TaskDetails::inquiry(inquiry.id),
            ))
            .await?;
        Ok(())
    }

    async fn impression_delivered(&self, inquiry_id: Uuid) -> Result<()> {
        let Some(inquiry) = self.ctx.entities.find_inquiry(inquiry_id).await? else {
            return Ok(());
        };
        let patient_id = self.ctx.entities.public_user_id(inquiry.patient).await?;

        let mut drafts = Vec::with_capacity(2);
        if let Some(dentist) = inquiry.dentist {
            drafts.push(self.ctx.render(
                TemplateName::ImpressionReceived,
                RoleCode::Dentist,
                NotificationType::ImpressionDelivered,
                dentist,
                &template_data([
                    ("RecipientName", self.ctx.entities.user_name(Some(dentist)).await?),
                    ("PatientId", patient_id.clone()),
                ]),
                (inquiry.id, AssociatedType::Inquiry),
            )?);
        }
        if let Some(planner) = inquiry.treatment_planner {
            drafts.push(self.ctx.render(
                TemplateName::ImpressionReceived,
                RoleCode::TreatmentPlanner,
                NotificationType::ImpressionDelivered,
                planner,
                &template_data([
                    ("RecipientName", self.ctx.entities.user_name(Some(planner)).await?),
                    ("PatientId", patient_id),
                ]),
                (inquiry.id, AssociatedType::Inquiry),
            )?);
        }
        self.ctx.enqueue_all(drafts).await?;
        Ok(())
    }
}

#[async_trait]
impl EventListener for InquiryEventHandler {
    fn name(&self) -> &str {
        "inquiry_handler"
    }

    #[instrument(skip(self, event), fields(event = event.name()))]
    async fn handle(&self, event: &DomainEvent) -> Result<()> {
        match event {
            DomainEvent::InquiryCreated { inquiry } => self.inquiry_created(*inquiry).await,
            DomainEvent::TreatmentPlannerAssigned { inquiry } => {
                self.treatment_planner_assigned(*inquiry).await
            }
            DomainEvent::PlannerSetDate { inquiry } => self.planner_set_date(*inquiry).await,
            DomainEvent::ImpressionDelivered { inquiry } => self.impression_delivered(*inquiry).await,
            _ => Ok(()),
        }
    }
}
