//! Account reminders: dentist approval and clinic payouts.

use super::{PolicyOutcome, TaskPolicy};
use crate::constants::{ApprovalStatus, AssociatedType, NotificationType, RoleCode, TaskType};
use crate::error::Result;
use crate::models::Task;
use crate::orchestration::context::WorkflowContext;
use crate::templates::{template_data, TemplateName};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A dentist signed up under a clinic and is waiting on lab approval
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproveDentistPolicy;

#[async_trait]
impl TaskPolicy for ApproveDentistPolicy {
    fn task_type(&self) -> TaskType {
        TaskType::ApproveDentist
    }

    async fn evaluate(
        &self,
        task: &Task,
        ctx: &WorkflowContext,
        _now: DateTime<Utc>,
    ) -> Result<PolicyOutcome> {
        let Some(dentist_id) = task.details.dentist else {
            return Ok(PolicyOutcome::Resolved);
        };
        let Some(dentist) = ctx.entities.find_user(dentist_id).await? else {
            return Ok(PolicyOutcome::Resolved);
        };
        let Some(clinic_id) = dentist.clinic else {
            return Ok(PolicyOutcome::Resolved);
        };
        if dentist.approval_status != Some(ApprovalStatus::Pending) {
            return Ok(PolicyOutcome::Resolved);
        }

        let clinic_name = ctx
            .entities
            .find_clinic(clinic_id)
            .await?
            .map(|clinic| clinic.name)
            .unwrap_or_default();

        let mut drafts = Vec::new();
        for admin in ctx.lab_admins(dentist.lab).await? {
            drafts.push(ctx.render(
                TemplateName::RemindDentistApproval,
                RoleCode::LabAdmin,
                NotificationType::NewDentistCreated,
                admin.id,
                &template_data([
                    ("ClinicName", clinic_name.clone()),
                    ("RecipientName", admin.name),
                ]),
                (dentist.id, AssociatedType::Dentist),
            )?);
        }

        Ok(PolicyOutcome::recurring(drafts))
    }
}

/// Clinic payout reminder.
///
/// The chain recurs for as long as the clinic exists. Admins are only
/// notified while money is owed; a settled balance keeps the chain alive
/// without sending anything, so a later charge is picked up again.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuePaymentPolicy;

#[async_trait]
impl TaskPolicy for DuePaymentPolicy {
    fn task_type(&self) -> TaskType {
        TaskType::DuePayment
    }

    async fn evaluate(
        &self,
        task: &Task,
        ctx: &WorkflowContext,
        _now: DateTime<Utc>,
    ) -> Result<PolicyOutcome> {
        let Some(clinic_id) = task.details.clinic else {
            return Ok(PolicyOutcome::Resolved);
        };
        let Some(clinic) = ctx.entities.find_clinic(clinic_id).await? else {
            return Ok(PolicyOutcome::Resolved);
        };
        let balance = clinic.balance();
        if balance <= 0.0 {
            return Ok(PolicyOutcome::recurring(vec![]));
        }

        let due_amount = balance.to_string();
        let mut drafts = Vec::new();
        for admin in ctx.dentist_admins(clinic.lab, Some(clinic.id)).await? {
            drafts.push(ctx.render(
                TemplateName::RemindPayout,
                RoleCode::DentistAdmin,
                NotificationType::DueAmount,
                admin.id,
                &template_data([
                    ("DueAmount", due_amount.clone()),
                    ("RecipientName", admin.name),
                ]),
                (clinic.id, AssociatedType::Clinic),
            )?);
        }

        Ok(PolicyOutcome::recurring(drafts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewTask, TaskDetails};
    use crate::test_helpers::{monday_morning, LabFixture, WorkflowTestHarness};

    fn task(task_type: TaskType, details: TaskDetails) -> Task {
        NewTask::new(task_type, monday_morning(), details).into_task(monday_morning())
    }

    #[tokio::test]
    async fn test_pending_dentist_escalates_to_lab_admins() {
        let harness = WorkflowTestHarness::new(monday_morning());
        let lab = LabFixture::install(&harness.entities);
        let task = task(TaskType::ApproveDentist, TaskDetails::dentist(lab.dentist.id));
        let ctx = harness.system.context();

        let outcome = ApproveDentistPolicy
            .evaluate(&task, ctx, monday_morning())
            .await
            .unwrap();
        assert_eq!(outcome, PolicyOutcome::Resolved);

        harness.entities.update_user(lab.dentist.id, |dentist| {
            dentist.approval_status = Some(ApprovalStatus::Pending);
        });
        let PolicyOutcome::Escalate { drafts, regenerate } = ApproveDentistPolicy
            .evaluate(&task, ctx, monday_morning())
            .await
            .unwrap()
        else {
            panic!("pending dentist should escalate");
        };
        assert!(regenerate);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].user, lab.lab_admin.id);
        assert_eq!(drafts[0].notification_type, NotificationType::NewDentistCreated);
        assert_eq!(drafts[0].associated_type, Some(AssociatedType::Dentist));
        assert_eq!(
            drafts[0].associated_id.as_deref(),
            Some(lab.dentist.id.to_string().as_str())
        );
    }

    #[tokio::test]
    async fn test_due_payment_keeps_chain_alive_when_settled() {
        let harness = WorkflowTestHarness::new(monday_morning());
        let lab = LabFixture::install(&harness.entities);
        let task = task(TaskType::DuePayment, TaskDetails::clinic(lab.clinic.id));
        let ctx = harness.system.context();

        let outcome = DuePaymentPolicy
            .evaluate(&task, ctx, monday_morning())
            .await
            .unwrap();
        assert_eq!(outcome, PolicyOutcome::recurring(vec![]));

        harness.entities.update_clinic(lab.clinic.id, |clinic| {
            clinic.due_amount = 120.5;
        });
        let PolicyOutcome::Escalate { drafts, regenerate } = DuePaymentPolicy
            .evaluate(&task, ctx, monday_morning())
            .await
            .unwrap()
        else {
            panic!("owed balance should escalate");
        };
        assert!(regenerate);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].user, lab.dentist_admin.id);
        assert_eq!(drafts[0].notification_type, NotificationType::DueAmount);
        assert_eq!(drafts[0].associated_type, Some(AssociatedType::Clinic));
        assert!(drafts[0].description.contains("120.5"));
    }

    #[tokio::test]
    async fn test_due_payment_for_missing_clinic_resolves() {
        let harness = WorkflowTestHarness::new(monday_morning());
        let task = task(TaskType::DuePayment, TaskDetails::clinic(uuid::Uuid::new_v4()));
        let outcome = DuePaymentPolicy
            .evaluate(&task, harness.system.context(), monday_morning())
            .await
            .unwrap();
        assert_eq!(outcome, PolicyOutcome::Resolved);
    }
}
