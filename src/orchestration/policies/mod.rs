//! # Task Policies
//!
//! One strategy per [`TaskType`]. A policy re-reads the entity a task is
//! about, decides whether the human action is still pending, and if so
//! returns the escalation drafts to enqueue and whether the reminder recurs.
//!
//! Policies have no side effects; the sweeper enqueues, regenerates and
//! closes based on the returned [`PolicyOutcome`]. That keeps each policy
//! testable against an entity repository alone.

mod account;
mod inquiry;
mod order;

pub use account::{ApproveDentistPolicy, DuePaymentPolicy};
pub use inquiry::{
    SetQuoteEstimateDatePolicy, SubmitImpressionPolicy, SubmitPresentationPolicy,
    PLANNER_ESTIMATE_OVERDUE,
};
pub use order::{
    ApproveOrderPolicy, ApproveQuotePolicy, ReceiveOrderPolicy, ReviewPresentationPolicy,
    SetProductionEstimateDatePolicy, ShipOrderPolicy, SubmitProductionPolicy,
};

use super::context::WorkflowContext;
use crate::constants::{RoleCode, TaskType};
use crate::error::Result;
use crate::models::{NotificationDraft, OrderRecord, SubOrderRecord, Task};
use crate::templates::TemplateName;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

/// Every `(template, role)` pair rendered by a policy
pub const POLICY_TEMPLATES: &[(TemplateName, RoleCode)] = &[
    (TemplateName::RemindDentistApproval, RoleCode::LabAdmin),
    (TemplateName::RemindSetTreatmentEstimation, RoleCode::LabAdmin),
    (TemplateName::RemindQuoteDue, RoleCode::LabAdmin),
    (TemplateName::RemindQuoteDue, RoleCode::TreatmentPlanner),
    (TemplateName::RemindSetProductionEstimation, RoleCode::ProductionManager),
    (TemplateName::RemindProductionDue, RoleCode::LabAdmin),
    (TemplateName::RemindProductionDue, RoleCode::ProductionManager),
    (TemplateName::ProductionOverDue, RoleCode::LabAdmin),
    (TemplateName::RemindShipOrder, RoleCode::DeliveryCoordinator),
    (TemplateName::RemindShipOrder, RoleCode::LabAdmin),
    (TemplateName::RemindReviewQuote, RoleCode::Dentist),
    (TemplateName::RemindImpressionPending, RoleCode::Dentist),
    (TemplateName::RemindApproveOrder, RoleCode::DentistAdmin),
    (TemplateName::RemindPayout, RoleCode::DentistAdmin),
    (TemplateName::RemindQuoteApproval, RoleCode::LabAdmin),
    (TemplateName::RemindReceiveOrder, RoleCode::Dentist),
];

#[derive(Debug, Clone, PartialEq)]
pub enum PolicyOutcome {
    /// The action was taken or its entity is gone; close without notifying
    Resolved,
    /// Still pending: notify, and queue the next reminder when `regenerate`
    Escalate {
        drafts: Vec<NotificationDraft>,
        regenerate: bool,
    },
}

impl PolicyOutcome {
    pub fn escalate(drafts: Vec<NotificationDraft>) -> Self {
        Self::Escalate {
            drafts,
            regenerate: false,
        }
    }

    pub fn recurring(drafts: Vec<NotificationDraft>) -> Self {
        Self::Escalate {
            drafts,
            regenerate: true,
        }
    }
}

#[async_trait]
pub trait TaskPolicy: Send + Sync {
    fn task_type(&self) -> TaskType;

    async fn evaluate(
        &self,
        task: &Task,
        ctx: &WorkflowContext,
        now: DateTime<Utc>,
    ) -> Result<PolicyOutcome>;
}

/// Task type to policy lookup
#[derive(Clone, Default)]
pub struct TaskPolicyRegistry {
    policies: HashMap<TaskType, Arc<dyn TaskPolicy>>,
}

impl std::fmt::Debug for TaskPolicyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.policies.keys().map(|t| t.as_str()).collect();
        types.sort_unstable();
        f.debug_struct("TaskPolicyRegistry")
            .field("task_types", &types)
            .finish()
    }
}

impl TaskPolicyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a policy for every task type
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ApproveDentistPolicy));
        registry.register(Arc::new(SetQuoteEstimateDatePolicy));
        registry.register(Arc::new(SubmitPresentationPolicy));
        registry.register(Arc::new(SetProductionEstimateDatePolicy));
        registry.register(Arc::new(SubmitProductionPolicy));
        registry.register(Arc::new(ShipOrderPolicy));
        registry.register(Arc::new(ReviewPresentationPolicy));
        registry.register(Arc::new(SubmitImpressionPolicy));
        registry.register(Arc::new(ApproveOrderPolicy));
        registry.register(Arc::new(DuePaymentPolicy));
        registry.register(Arc::new(ApproveQuotePolicy));
        registry.register(Arc::new(ReceiveOrderPolicy));
        registry
    }

    /// Replaces any policy already registered for the same type
    pub fn register(&mut self, policy: Arc<dyn TaskPolicy>) {
        self.policies.insert(policy.task_type(), policy);
    }

    pub fn get(&self, task_type: TaskType) -> Option<Arc<dyn TaskPolicy>> {
        self.policies.get(&task_type).cloned()
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

/// Order and sub-order named by a task's details
async fn load_sub_order(
    task: &Task,
    ctx: &WorkflowContext,
) -> Result<Option<(OrderRecord, SubOrderRecord)>> {
    let (Some(order_id), Some(sub_order_id)) = (task.details.order, task.details.sub_order) else {
        return Ok(None);
    };
    let Some(order) = ctx.entities.find_order(order_id).await? else {
        return Ok(None);
    };
    let sub_order = order.sub_order(sub_order_id).cloned();
    Ok(sub_order.map(|sub_order| (order, sub_order)))
}

async fn load_order(task: &Task, ctx: &WorkflowContext) -> Result<Option<OrderRecord>> {
    match task.details.order {
        Some(order_id) => ctx.entities.find_order(order_id).await,
        None => Ok(None),
    }
}
