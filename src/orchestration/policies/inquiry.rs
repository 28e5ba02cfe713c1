//! Inquiry-stage reminders: planner estimate, presentation, impression.

use super::{PolicyOutcome, TaskPolicy};
use crate::constants::{AssociatedType, ImpressionStatus, NotificationType, QuoteStatus, RoleCode, TaskType};
use crate::error::Result;
use crate::models::{InquiryRecord, NotificationDraft, Task};
use crate::orchestration::context::WorkflowContext;
use crate::templates::{template_data, TemplateName};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Plain text the planner gets while a treatment estimate is overdue
pub const PLANNER_ESTIMATE_OVERDUE: &str =
    "A query from 2-3 days ago is still pending. Immediate attention needed.";

async fn load_inquiry(task: &Task, ctx: &WorkflowContext) -> Result<Option<InquiryRecord>> {
    match task.details.inquiry {
        Some(id) => ctx.entities.find_inquiry(id).await,
        None => Ok(None),
    }
}

/// Planner assigned but the treatment estimate date is still unset
#[derive(Debug, Clone, Copy, Default)]
pub struct SetQuoteEstimateDatePolicy;

#[async_trait]
impl TaskPolicy for SetQuoteEstimateDatePolicy {
    fn task_type(&self) -> TaskType {
        TaskType::SetQuoteEstimateDate
    }

    async fn evaluate(
        &self,
        task: &Task,
        ctx: &WorkflowContext,
        _now: DateTime<Utc>,
    ) -> Result<PolicyOutcome> {
        let Some(inquiry) = load_inquiry(task, ctx).await? else {
            return Ok(PolicyOutcome::Resolved);
        };
        let Some(planner) = inquiry.treatment_planner else {
            return Ok(PolicyOutcome::Resolved);
        };
        if inquiry.quote_estimation_date.is_some() {
            return Ok(PolicyOutcome::Resolved);
        }

        let planner_name = ctx.entities.user_name(Some(planner)).await?;
        let mut drafts = Vec::new();
        for admin in ctx.lab_admins(inquiry.lab).await? {
            drafts.push(ctx.render(
                TemplateName::RemindSetTreatmentEstimation,
                RoleCode::LabAdmin,
                NotificationType::PlannerSetEstimate,
                admin.id,
                &template_data([
                    ("RecipientName", admin.name),
                    ("TreatmentPlannerName", planner_name.clone()),
                ]),
                (inquiry.id, AssociatedType::Inquiry),
            )?);
        }
        drafts.push(
            NotificationDraft::new(
                NotificationType::PlannerSetEstimate,
                planner,
                PLANNER_ESTIMATE_OVERDUE,
            )
            .associated(inquiry.id, AssociatedType::Inquiry),
        );

        Ok(PolicyOutcome::recurring(drafts))
    }
}

/// Planner assigned and the presentation is still pending
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmitPresentationPolicy;

#[async_trait]
impl TaskPolicy for SubmitPresentationPolicy {
    fn task_type(&self) -> TaskType {
        TaskType::SubmitPresentation
    }

    async fn evaluate(
        &self,
        task: &Task,
        ctx: &WorkflowContext,
        _now: DateTime<Utc>,
    ) -> Result<PolicyOutcome> {
        let Some(inquiry) = load_inquiry(task, ctx).await? else {
            return Ok(PolicyOutcome::Resolved);
        };
        let Some(planner) = inquiry.treatment_planner else {
            return Ok(PolicyOutcome::Resolved);
        };
        if inquiry.quote_status != Some(QuoteStatus::Pending) {
            return Ok(PolicyOutcome::Resolved);
        }

        let planner_name = ctx.entities.user_name(Some(planner)).await?;
        let mut drafts = Vec::new();
        for admin in ctx.lab_admins(inquiry.lab).await? {
            drafts.push(ctx.render(
                TemplateName::RemindQuoteDue,
                RoleCode::LabAdmin,
                NotificationType::SubmitPresentation,
                admin.id,
                &template_data([
                    ("RecipientName", admin.name),
                    ("TreatmentPlannerName", planner_name.clone()),
                ]),
                (inquiry.id, AssociatedType::Inquiry),
            )?);
        }
        drafts.push(ctx.render(
            TemplateName::RemindQuoteDue,
            RoleCode::TreatmentPlanner,
            NotificationType::SubmitPresentation,
            planner,
            &template_data([("RecipientName", planner_name)]),
            (inquiry.id, AssociatedType::Inquiry),
        )?);

        Ok(PolicyOutcome::escalate(drafts))
    }
}

/// The dentist has not yet sent the impression
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmitImpressionPolicy;

#[async_trait]
impl TaskPolicy for SubmitImpressionPolicy {
    fn task_type(&self) -> TaskType {
        TaskType::SubmitImpression
    }

    async fn evaluate(
        &self,
        task: &Task,
        ctx: &WorkflowContext,
        _now: DateTime<Utc>,
    ) -> Result<PolicyOutcome> {
        let Some(inquiry) = load_inquiry(task, ctx).await? else {
            return Ok(PolicyOutcome::Resolved);
        };
        if inquiry.impression_status != Some(ImpressionStatus::Pending) {
            return Ok(PolicyOutcome::Resolved);
        }

        let mut drafts = Vec::new();
        if let Some(dentist) = inquiry.dentist {
            let data = template_data([
                ("RecipientName", ctx.entities.user_name(Some(dentist)).await?),
                ("PatientId", ctx.entities.public_user_id(inquiry.patient).await?),
            ]);
            drafts.push(ctx.render(
                TemplateName::RemindImpressionPending,
                RoleCode::Dentist,
                NotificationType::SubmitImpression,
                dentist,
                &data,
                (inquiry.id, AssociatedType::Inquiry),
            )?);
        }

        Ok(PolicyOutcome::recurring(drafts))
    }
}
