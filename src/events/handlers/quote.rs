//! Quote lifecycle: drafted, approved by the lab, reworked, reviewed by the
//! dentist and approved by the clinic.

use super::response_window;
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
pub struct QuoteEventHandler {
    ctx: WorkflowContext,
}

impl QuoteEventHandler {
    pub const EVENTS: &'static [EventKind] = &[
        EventKind::QuoteCreated,
        EventKind::PresentationApproved,
        EventKind::QuoteRework,
        EventKind::QuoteReviewed,
        EventKind::OrderApproved,
    ];

    pub fn new(ctx: WorkflowContext) -> Self {
        Self { ctx }
    }

    async fn quote_created(&self, order_id: Uuid) -> Result<()> {
        let Some(order) = self.ctx.entities.find_order(order_id).await? else {
            return Ok(());
        };
        let now = self.ctx.clock.now();
        self.ctx
            .create_task(NewTask::new(
                TaskType::ApproveQuote,
                now + response_window(),
                TaskDetails::order(order.id),
            ))
            .await?;
        Ok(())
    }

    /// The dentist gets the quote to review; the planner learns it was approved
    async fn presentation_approved(&self, order_id: Uuid, planner: Uuid) -> Result<()> {
        let Some(order) = self.ctx.entities.find_order(order_id).await? else {
            return Ok(());
        };
        let inquiry = order.inquiry.unwrap_or(order.id);
        let mut drafts = Vec::with_capacity(2);

        if let Some(dentist) = order.dentist {
            drafts.push(self.ctx.render(
                TemplateName::QuoteApproved,
                RoleCode::Dentist,
                NotificationType::QuoteReceived,
                dentist,
                &template_data([
                    ("PatientId", self.ctx.entities.public_user_id(order.patient).await?),
                    ("RecipientName", self.ctx.entities.user_name(Some(dentist)).await?),
                ]),
                (inquiry, AssociatedType::Inquiry),
            )?);
        }

        if let Some(planner) = self.ctx.entities.find_user(planner).await? {
            drafts.push(self.ctx.render(
                TemplateName::QuoteApproved,
                RoleCode::TreatmentPlanner,
                NotificationType::QuoteApproved,
                planner.id,
                &template_data([("RecipientName", planner.name)]),
                (order.id, AssociatedType::Order),
            )?);
        }
        self.ctx.enqueue_all(drafts).await?;

        let mut details = TaskDetails::order(order.id);
        if let Some(inquiry) = order.inquiry {
            details = details.with_inquiry(inquiry);
        }
        let now = self.ctx.clock.now();
        self.ctx
            .create_task(NewTask::new(
                TaskType::ReviewPresentation,
                now + response_window(),
                details,
            ))
            .await?;
        Ok(())
    }

    async fn quote_rework(&self, inquiry_id: Uuid, planner: Uuid) -> Result<()> {
        let Some(inquiry) = self.ctx.entities.find_inquiry(inquiry_id).await? else {
            return Ok(());
        };
        let Some(planner) = self.ctx.entities.find_user(planner).await? else {
            return Ok(());
        };

        let draft = self.ctx.render(
            TemplateName::QuoteSentToRework,
            RoleCode::TreatmentPlanner,
            NotificationType::QuoteRework,
            planner.id,
            &template_data([("RecipientName", planner.name)]),
            (inquiry.id, AssociatedType::Inquiry),
        )?;
        self.ctx.enqueue_all(vec![draft]).await?;
        Ok(())
    }

    /// Dentist reviewed the quote: the clinic's admins must now approve the order
    async fn quote_reviewed(&self, order_id: Uuid) -> Result<()> {
        let Some(order) = self.ctx.entities.find_order(order_id).await? else {
            return Ok(());
        };
        let inquiry = order.inquiry.unwrap_or(order.id);
        let dentist_name = self.ctx.entities.user_name(order.dentist).await?;
        let mut drafts = Vec::new();

        if let Some(dentist) = order.dentist {
            drafts.push(self.ctx.render(
                TemplateName::OrderPlaced,
                RoleCode::Dentist,
                NotificationType::QuoteReviewed,
                dentist,
                &template_data([
                    ("PatientId", self.ctx.entities.public_user_id(order.patient).await?),
                    ("RecipientName", dentist_name.clone()),
                ]),
                (inquiry, AssociatedType::Inquiry),
            )?);
        }

        for admin in self.ctx.dentist_admins(order.lab, order.clinic).await? {
            drafts.push(self.ctx.render(
                TemplateName::OrderPlaced,
                RoleCode::DentistAdmin,
                NotificationType::ApproveOrder,
                admin.id,
                &template_data([
                    ("DentistName", dentist_name.clone()),
                    ("RecipientName", admin.name),
                ]),
                (inquiry, AssociatedType::Inquiry),
            )?);
        }
        self.ctx.enqueue_all(drafts).await?;

        let mut details = TaskDetails::order(order.id);
        if let Some(inquiry) = order.inquiry {
            details = details.with_inquiry(inquiry);
        }
        let now = self.ctx.clock.now();
        self.ctx
            .create_task(NewTask::new(TaskType::ApproveOrder, now + response_window(), details))
            .await?;
        Ok(())
    }

    async fn order_approved(&self, inquiry_id: Uuid) -> Result<()> {
        let Some(inquiry) = self.ctx.entities.find_inquiry(inquiry_id).await? else {
            return Ok(());
        };
        let Some(dentist) = inquiry.dentist else {
            return Ok(());
        };

        let draft = self.ctx.render(
            TemplateName::OrderApproved,
            RoleCode::Dentist,
            NotificationType::OrderApproved,
            dentist,
            &template_data([
                ("RecipientName", self.ctx.entities.user_name(Some(dentist)).await?),
                ("PatientId", self.ctx.entities.public_user_id(inquiry.patient).await?),
            ]),
            (inquiry.id, AssociatedType::Inquiry),
        )?;
        self.ctx.enqueue_all(vec![draft]).await?;
        Ok(())
    }
}

#[async_trait]
impl EventListener for QuoteEventHandler {
    fn name(&self) -> &str {
        "quote_handler"
    }

    #[instrument(skip(self, event), fields(event = event.name()))]
    async fn handle(&self, event: &DomainEvent) -> Result<()> {
        match event {
            DomainEvent::QuoteCreated { order } => self.quote_created(*order).await,
            DomainEvent::PresentationApproved { order, planner } => {
                self.presentation_approved(*order, *planner).await
            }
            DomainEvent::QuoteRework { inquiry, planner } => {
                self.quote_rework(*inquiry, *planner).await
            }
            DomainEvent::QuoteReviewed { order } => self.quote_reviewed(*order).await,
            DomainEvent::OrderApproved { inquiry } => self.order_approved(*inquiry).await,
            _ => Ok(()),
        }
    }
}
