//! Order-stage reminders: quote approval and review, production, shipping and
//! receipt.

use super::{load_order, load_sub_order, PolicyOutcome, TaskPolicy};
use crate::constants::{AssociatedType, NotificationType, OrderStatus, QuoteStatus, RoleCode, TaskType};
use crate::error::Result;
use crate::models::Task;
use crate::orchestration::context::WorkflowContext;
use crate::templates::{template_data, TemplateName};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Production manager assigned but no production estimate date yet
#[derive(Debug, Clone, Copy, Default)]
pub struct SetProductionEstimateDatePolicy;

#[async_trait]
impl TaskPolicy for SetProductionEstimateDatePolicy {
    fn task_type(&self) -> TaskType {
        TaskType::SetProductionEstimateDate
    }

    async fn evaluate(
        &self,
        task: &Task,
        ctx: &WorkflowContext,
        _now: DateTime<Utc>,
    ) -> Result<PolicyOutcome> {
        let Some((order, sub_order)) = load_sub_order(task, ctx).await? else {
            return Ok(PolicyOutcome::Resolved);
        };
        let Some(manager) = sub_order.production_manager else {
            return Ok(PolicyOutcome::Resolved);
        };
        if sub_order.production_estimation_date.is_some() {
            return Ok(PolicyOutcome::Resolved);
        }

        let draft = ctx.render(
            TemplateName::RemindSetProductionEstimation,
            RoleCode::ProductionManager,
            NotificationType::ProductionSetEstimate,
            manager,
            &template_data([("RecipientName", ctx.entities.user_name(Some(manager)).await?)]),
            (order.id, AssociatedType::Order),
        )?;

        Ok(PolicyOutcome::escalate(vec![draft]))
    }
}

/// Production is approved but not yet submitted.
///
/// Before the estimated date the lab admins and the manager get a due-soon
/// reminder; from the estimated date on (or with no date) only the lab admins
/// hear about it, as an overdue alert.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmitProductionPolicy;

#[async_trait]
impl TaskPolicy for SubmitProductionPolicy {
    fn task_type(&self) -> TaskType {
        TaskType::SubmitProduction
    }

    async fn evaluate(
        &self,
        task: &Task,
        ctx: &WorkflowContext,
        now: DateTime<Utc>,
    ) -> Result<PolicyOutcome> {
        let Some((order, sub_order)) = load_sub_order(task, ctx).await? else {
            return Ok(PolicyOutcome::Resolved);
        };
        let Some(manager) = sub_order.production_manager else {
            return Ok(PolicyOutcome::Resolved);
        };
        if sub_order.status != OrderStatus::DentistApproved {
            return Ok(PolicyOutcome::Resolved);
        }

        let manager_name = ctx.entities.user_name(Some(manager)).await?;
        let admins = ctx.lab_admins(order.lab).await?;
        let still_due = sub_order
            .production_estimation_date
            .is_some_and(|estimate| now < estimate);

        let mut drafts = Vec::with_capacity(admins.len() + 1);
        if still_due {
            for admin in admins {
                drafts.push(ctx.render(
                    TemplateName::RemindProductionDue,
                    RoleCode::LabAdmin,
                    NotificationType::SubmitProduction,
                    admin.id,
                    &template_data([
                        ("RecipientName", admin.name),
                        ("ProductionManagerName", manager_name.clone()),
                    ]),
                    (order.id, AssociatedType::Order),
                )?);
            }
            drafts.push(ctx.render(
                TemplateName::RemindProductionDue,
                RoleCode::ProductionManager,
                NotificationType::SubmitProduction,
                manager,
                &template_data([("RecipientName", manager_name)]),
                (order.id, AssociatedType::Order),
            )?);
        } else {
            for admin in admins {
                drafts.push(ctx.render(
                    TemplateName::ProductionOverDue,
                    RoleCode::LabAdmin,
                    NotificationType::SubmitProduction,
                    admin.id,
                    &template_data([
                        ("RecipientName", admin.name),
                        ("ProductionManagerName", manager_name.clone()),
                    ]),
                    (order.id, AssociatedType::Order),
                )?);
            }
        }

        Ok(PolicyOutcome::recurring(drafts))
    }
}

/// Delivery coordinator assigned and the sub-order is waiting to ship
#[derive(Debug, Clone, Copy, Default)]
pub struct ShipOrderPolicy;

#[async_trait]
impl TaskPolicy for ShipOrderPolicy {
    fn task_type(&self) -> TaskType {
        TaskType::ShipOrder
    }

    async fn evaluate(
        &self,
        task: &Task,
        ctx: &WorkflowContext,
        _now: DateTime<Utc>,
    ) -> Result<PolicyOutcome> {
        let Some((order, sub_order)) = load_sub_order(task, ctx).await? else {
            return Ok(PolicyOutcome::Resolved);
        };
        let Some(coordinator) = sub_order.delivery_coordinator else {
            return Ok(PolicyOutcome::Resolved);
        };
        if sub_order.status != OrderStatus::DeliveryPending {
            return Ok(PolicyOutcome::Resolved);
        }

        let coordinator_name = ctx.entities.user_name(Some(coordinator)).await?;
        let patient_id = ctx.entities.public_user_id(order.patient).await?;

        let mut drafts = vec![ctx.render(
            TemplateName::RemindShipOrder,
            RoleCode::DeliveryCoordinator,
            NotificationType::ShipOrder,
            coordinator,
            &template_data([
                ("RecipientName", coordinator_name.clone()),
                ("PatientId", patient_id),
            ]),
            (order.id, AssociatedType::Order),
        )?];
        for admin in ctx.lab_admins(order.lab).await? {
            drafts.push(ctx.render(
                TemplateName::RemindShipOrder,
                RoleCode::LabAdmin,
                NotificationType::ShipOrder,
                admin.id,
                &template_data([
                    ("RecipientName", admin.name),
                    ("DeliveryCoordinator", coordinator_name.clone()),
                ]),
                (order.id, AssociatedType::Order),
            )?);
        }

        Ok(PolicyOutcome::recurring(drafts))
    }
}

/// Shipped sub-order the dentist has not confirmed receiving
#[derive(Debug, Clone, Copy, Default)]
pub struct ReceiveOrderPolicy;

#[async_trait]
impl TaskPolicy for ReceiveOrderPolicy {
    fn task_type(&self) -> TaskType {
        TaskType::ReceiveOrder
    }

    async fn evaluate(
        &self,
        task: &Task,
        ctx: &WorkflowContext,
        _now: DateTime<Utc>,
    ) -> Result<PolicyOutcome> {
        let Some((order, sub_order)) = load_sub_order(task, ctx).await? else {
            return Ok(PolicyOutcome::Resolved);
        };
        if sub_order.status != OrderStatus::InShipment {
            return Ok(PolicyOutcome::Resolved);
        }

        let mut drafts = Vec::new();
        if let Some(dentist) = order.dentist {
            let data = template_data([
                ("RecipientName", ctx.entities.user_name(Some(dentist)).await?),
                ("PatientId", ctx.entities.public_user_id(order.patient).await?),
            ]);
            drafts.push(ctx.render(
                TemplateName::RemindReceiveOrder,
                RoleCode::Dentist,
                NotificationType::ReceiveOrder,
                dentist,
                &data,
                (order.id, AssociatedType::Order),
            )?);
        }

        Ok(PolicyOutcome::escalate(drafts))
    }
}

/// Admin-approved quote waiting on the dentist's review
#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewPresentationPolicy;

#[async_trait]
impl TaskPolicy for ReviewPresentationPolicy {
    fn task_type(&self) -> TaskType {
        TaskType::ReviewPresentation
    }

    async fn evaluate(
        &self,
        task: &Task,
        ctx: &WorkflowContext,
        _now: DateTime<Utc>,
    ) -> Result<PolicyOutcome> {
        let Some(order) = load_order(task, ctx).await? else {
            return Ok(PolicyOutcome::Resolved);
        };
        if order.quote_status != Some(QuoteStatus::AdminApproved) {
            return Ok(PolicyOutcome::Resolved);
        }

        let mut drafts = Vec::new();
        if let (Some(dentist), Some(inquiry)) = (order.dentist, order.inquiry) {
            drafts.push(ctx.render(
                TemplateName::RemindReviewQuote,
                RoleCode::Dentist,
                NotificationType::QuoteReceived,
                dentist,
                &template_data([("RecipientName", ctx.entities.user_name(Some(dentist)).await?)]),
                (inquiry, AssociatedType::Inquiry),
            )?);
        }

        Ok(PolicyOutcome::escalate(drafts))
    }
}

/// Quote reviewed by the dentist, waiting on a dentist admin's approval
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproveOrderPolicy;

#[async_trait]
impl TaskPolicy for ApproveOrderPolicy {
    fn task_type(&self) -> TaskType {
        TaskType::ApproveOrder
    }

    async fn evaluate(
        &self,
        task: &Task,
        ctx: &WorkflowContext,
        _now: DateTime<Utc>,
    ) -> Result<PolicyOutcome> {
        let Some(order) = load_order(task, ctx).await? else {
            return Ok(PolicyOutcome::Resolved);
        };
        if order.quote_status != Some(QuoteStatus::DentistReviewed) {
            return Ok(PolicyOutcome::Resolved);
        }

        let dentist_name = ctx.entities.user_name(order.dentist).await?;
        let associated = order.inquiry.unwrap_or(order.id);
        let mut drafts = Vec::new();
        for admin in ctx.dentist_admins(order.lab, order.clinic).await? {
            drafts.push(ctx.render(
                TemplateName::RemindApproveOrder,
                RoleCode::DentistAdmin,
                NotificationType::ApproveOrder,
                admin.id,
                &template_data([
                    ("DentistName", dentist_name.clone()),
                    ("RecipientName", admin.name),
                ]),
                (associated, AssociatedType::Inquiry),
            )?);
        }

        Ok(PolicyOutcome::escalate(drafts))
    }
}

/// Quote drafted by the planner, waiting on a lab admin's approval
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproveQuotePolicy;

#[async_trait]
impl TaskPolicy for ApproveQuotePolicy {
    fn task_type(&self) -> TaskType {
        TaskType::ApproveQuote
    }

    async fn evaluate(
        &self,
        task: &Task,
        ctx: &WorkflowContext,
        _now: DateTime<Utc>,
    ) -> Result<PolicyOutcome> {
        let Some(order) = load_order(task, ctx).await? else {
            return Ok(PolicyOutcome::Resolved);
        };
        if order.quote_status != Some(QuoteStatus::PendingApproval) {
            return Ok(PolicyOutcome::Resolved);
        }

        let mut drafts = Vec::new();
        for admin in ctx.lab_admins(order.lab).await? {
            drafts.push(ctx.render(
                TemplateName::RemindQuoteApproval,
                RoleCode::LabAdmin,
                NotificationType::ApprovePresentation,
                admin.id,
                &template_data([("RecipientName", admin.name)]),
                (order.id, AssociatedType::Order),
            )?);
        }

        Ok(PolicyOutcome::escalate(drafts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewTask, NotificationDraft, OrderRecord, TaskDetails};
    use crate::test_helpers::{monday_morning, LabFixture, WorkflowTestHarness};
    use std::collections::HashSet;

    struct Scenario {
        harness: WorkflowTestHarness,
        lab: LabFixture,
        order: OrderRecord,
        inquiry: uuid::Uuid,
    }

    fn scenario(status: OrderStatus) -> Scenario {
        let harness = WorkflowTestHarness::new(monday_morning());
        let lab = LabFixture::install(&harness.entities);
        let inquiry = lab.inquiry(&harness.entities).id;
        let order = lab.order(&harness.entities, Some(inquiry), status);
        Scenario {
            harness,
            lab,
            order,
            inquiry,
        }
    }

    impl Scenario {
        fn sub_order_task(&self, task_type: TaskType) -> Task {
            let details = TaskDetails::sub_order(self.order.id, self.order.sub_orders[0].id);
            NewTask::new(task_type, monday_morning(), details).into_task(monday_morning())
        }

        fn order_task(&self, task_type: TaskType) -> Task {
            let details = TaskDetails::order(self.order.id).with_inquiry(self.inquiry);
            NewTask::new(task_type, monday_morning(), details).into_task(monday_morning())
        }

        fn set_quote_status(&self, status: QuoteStatus) {
            self.harness.entities.update_order(self.order.id, |order| {
                order.quote_status = Some(status);
            });
        }

        async fn evaluate(&self, policy: &dyn TaskPolicy, task: &Task) -> PolicyOutcome {
            policy
                .evaluate(task, self.harness.system.context(), monday_morning())
                .await
                .unwrap()
        }

        async fn escalation(&self, policy: &dyn TaskPolicy, task: &Task) -> (Vec<NotificationDraft>, bool) {
            match self.evaluate(policy, task).await {
                PolicyOutcome::Escalate { drafts, regenerate } => (drafts, regenerate),
                PolicyOutcome::Resolved => panic!("{} should still be pending", task.task_type),
            }
        }
    }

    fn associated(draft: &NotificationDraft) -> (Option<String>, Option<AssociatedType>) {
        (draft.associated_id.clone(), draft.associated_type)
    }

    #[tokio::test]
    async fn test_production_without_estimate_is_overdue_for_admins() {
        let s = scenario(OrderStatus::DentistApproved);
        let task = s.sub_order_task(TaskType::SubmitProduction);

        let (drafts, regenerate) = s.escalation(&SubmitProductionPolicy, &task).await;
        assert!(regenerate);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].user, s.lab.lab_admin.id);
        assert!(drafts[0].description.contains("Max Production"));

        s.harness.entities.update_order(s.order.id, |order| {
            order.sub_orders[0].status = OrderStatus::DeliveryPending;
        });
        assert_eq!(s.evaluate(&SubmitProductionPolicy, &task).await, PolicyOutcome::Resolved);
    }

    #[tokio::test]
    async fn test_ship_order_chases_coordinator_and_admins() {
        let s = scenario(OrderStatus::DeliveryPending);
        let task = s.sub_order_task(TaskType::ShipOrder);

        let (drafts, regenerate) = s.escalation(&ShipOrderPolicy, &task).await;
        assert!(regenerate);
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].user, s.lab.delivery_coordinator.id);
        assert_eq!(drafts[1].user, s.lab.lab_admin.id);
        assert!(drafts[1].description.contains("Dee Delivery"));
        assert!(drafts.iter().all(|draft| {
            draft.notification_type == NotificationType::ShipOrder
                && associated(draft) == (Some(s.order.id.to_string()), Some(AssociatedType::Order))
        }));

        s.harness.entities.update_order(s.order.id, |order| {
            order.sub_orders[0].status = OrderStatus::InShipment;
        });
        assert_eq!(s.evaluate(&ShipOrderPolicy, &task).await, PolicyOutcome::Resolved);
    }

    #[tokio::test]
    async fn test_receive_order_reminds_dentist_once() {
        let s = scenario(OrderStatus::InShipment);
        let task = s.sub_order_task(TaskType::ReceiveOrder);

        let (drafts, regenerate) = s.escalation(&ReceiveOrderPolicy, &task).await;
        assert!(!regenerate);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].user, s.lab.dentist.id);
        assert_eq!(drafts[0].notification_type, NotificationType::ReceiveOrder);
        assert!(drafts[0].description.contains("PT-0042"));

        s.harness.entities.update_order(s.order.id, |order| {
            order.sub_orders[0].status = OrderStatus::Delivered;
        });
        assert_eq!(s.evaluate(&ReceiveOrderPolicy, &task).await, PolicyOutcome::Resolved);
    }

    #[tokio::test]
    async fn test_review_presentation_points_dentist_at_inquiry() {
        let s = scenario(OrderStatus::Pending);
        let task = s.order_task(TaskType::ReviewPresentation);
        assert_eq!(
            s.evaluate(&ReviewPresentationPolicy, &task).await,
            PolicyOutcome::Resolved
        );

        s.set_quote_status(QuoteStatus::AdminApproved);
        let (drafts, regenerate) = s.escalation(&ReviewPresentationPolicy, &task).await;
        assert!(!regenerate);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].user, s.lab.dentist.id);
        assert_eq!(drafts[0].notification_type, NotificationType::QuoteReceived);
        assert_eq!(
            associated(&drafts[0]),
            (Some(s.inquiry.to_string()), Some(AssociatedType::Inquiry))
        );
    }

    #[tokio::test]
    async fn test_approve_order_asks_dentist_admins() {
        let s = scenario(OrderStatus::Pending);
        let task = s.order_task(TaskType::ApproveOrder);
        s.set_quote_status(QuoteStatus::DentistReviewed);

        let (drafts, regenerate) = s.escalation(&ApproveOrderPolicy, &task).await;
        assert!(!regenerate);
        let recipients: HashSet<_> = drafts.iter().map(|draft| draft.user).collect();
        assert_eq!(recipients, HashSet::from([s.lab.dentist_admin.id]));
        assert_eq!(drafts[0].notification_type, NotificationType::ApproveOrder);
        assert!(drafts[0].description.contains("Dana Dentist"));
        assert_eq!(
            associated(&drafts[0]),
            (Some(s.inquiry.to_string()), Some(AssociatedType::Inquiry))
        );

        s.set_quote_status(QuoteStatus::DentistApproved);
        assert_eq!(s.evaluate(&ApproveOrderPolicy, &task).await, PolicyOutcome::Resolved);
    }

    #[tokio::test]
    async fn test_approve_quote_asks_lab_admins() {
        let s = scenario(OrderStatus::Pending);
        let task = s.order_task(TaskType::ApproveQuote);
        s.set_quote_status(QuoteStatus::PendingApproval);

        let (drafts, regenerate) = s.escalation(&ApproveQuotePolicy, &task).await;
        assert!(!regenerate);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].user, s.lab.lab_admin.id);
        assert_eq!(drafts[0].notification_type, NotificationType::ApprovePresentation);
        assert_eq!(
            associated(&drafts[0]),
            (Some(s.order.id.to_string()), Some(AssociatedType::Order))
        );

        s.set_quote_status(QuoteStatus::AdminApproved);
        assert_eq!(s.evaluate(&ApproveQuotePolicy, &task).await, PolicyOutcome::Resolved);
    }
}
