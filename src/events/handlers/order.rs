//! Sub-order production and delivery.

use super::response_window;
use crate::constants::{AssociatedType, NotificationType, RoleCode, TaskType};
use crate::error::Result;
use crate::events::bus::EventListener;
use crate::events::types::{DomainEvent, EventKind};
use crate::models::{NewTask, TaskDetails};
use crate::orchestration::context::WorkflowContext;
use crate::templates::{template_data, TemplateName};
use async_trait::async_trait;
use chrono::Duration;
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct OrderEventHandler {
    ctx: WorkflowContext,
}

impl OrderEventHandler {
    pub const EVENTS: &'static [EventKind] = &[
        EventKind::ProductionAssigned,
        EventKind::ProductionDateSet,
        EventKind::DeliveryAssigned,
        EventKind::OrderShipped,
        EventKind::OrderReceived,
    ];

    pub fn new(ctx: WorkflowContext) -> Self {
        Self { ctx }
    }

    async fn production_assigned(&self, order_id: Uuid, sub_order: Uuid, manager: Uuid) -> Result<()> {
        let Some(order) = self.ctx.entities.find_order(order_id).await? else {
            return Ok(());
        };
        let Some(manager) = self.ctx.entities.find_user(manager).await? else {
            return Ok(());
        };

        let patient_id = self.ctx.entities.public_user_id(order.patient).await?;
        let draft = self.ctx.render(
            TemplateName::AssignedProductionManager,
            RoleCode::ProductionManager,
            NotificationType::AssignProduction,
            manager.id,
            &template_data([("RecipientName", manager.name)]),
            (patient_id, AssociatedType::UserId),
        )?;
        self.ctx.enqueue_all(vec![draft]).await?;

        let now = self.ctx.clock.now();
        self.ctx
            .create_task(NewTask::new(
                TaskType::SetProductionEstimateDate,
                now + response_window(),
                TaskDetails::sub_order(order.id, sub_order),
            ))
            .await?;
        Ok(())
    }

    /// Production is expected the day before the estimated date
    async fn production_date_set(&self, order_id: Uuid, sub_order_id: Uuid) -> Result<()> {
        let Some(order) = self.ctx.entities.find_order(order_id).await? else {
            return Ok(());
        };

        if let Some(dentist) = order.dentist {
            let draft = self.ctx.render(
                TemplateName::ProductionEstimationProvided,
                RoleCode::Dentist,
                NotificationType::ProductionSetEstimate,
                dentist,
                &template_data([
                    ("RecipientName", self.ctx.entities.user_name(Some(dentist)).await?),
                    ("PatientId", self.ctx.entities.public_user_id(order.patient).await?),
                ]),
                (order.id, AssociatedType::Order),
            )?;
            self.ctx.enqueue_all(vec![draft]).await?;
        }

        let estimate = order
            .sub_order(sub_order_id)
            .and_then(|sub_order| sub_order.production_estimation_date);
        if let Some(estimate) = estimate {
            self.ctx
                .create_task(NewTask::new(
                    TaskType::SubmitProduction,
                    estimate - Duration::days(1),
                    TaskDetails::sub_order(order.id, sub_order_id),
                ))
                .await?;
        }
        Ok(())
    }

    async fn delivery_assigned(&self, order_id: Uuid, sub_order_id: Uuid) -> Result<()> {
        let Some(order) = self.ctx.entities.find_order(order_id).await? else {
            return Ok(());
        };
        if order.sub_order(sub_order_id).is_none() {
            return Ok(());
        }

        let patient_id = self.ctx.entities.public_user_id(order.patient).await?;
        let coordinators = match order.lab {
            Some(lab) => self.ctx.entities.lab_delivery_coordinators(lab).await?,
            None => Vec::new(),
        };
        let drafts = coordinators
            .into_iter()
            .map(|coordinator| {
                self.ctx.render(
                    TemplateName::AssignedDeliveryCoordinator,
                    RoleCode::DeliveryCoordinator,
                    NotificationType::OrderAssigned,
                    coordinator.id,
                    &template_data([
                        ("RecipientName", coordinator.name),
                        ("PatientId", patient_id.clone()),
                    ]),
                    (&patient_id, AssociatedType::User),
                )
            })
            .collect::<Result<Vec<_>>>()?;
        self.ctx.enqueue_all(drafts).await?;

        let now = self.ctx.clock.now();
        self.ctx
            .create_task(NewTask::new(
                TaskType::ShipOrder,
                now + response_window(),
                TaskDetails::sub_order(order.id, sub_order_id),
            ))
            .await?;
        Ok(())
    }

    async fn order_shipped(&self, order_id: Uuid, sub_order_id: Uuid) -> Result<()> {
        let Some(order) = self.ctx.entities.find_order(order_id).await? else {
            return Ok(());
        };
        let Some(dentist) = order.dentist else {
            return Ok(());
        };

        let draft = self.ctx.render(
            TemplateName::OrderShipped,
            RoleCode::Dentist,
            NotificationType::OrderShipped,
            dentist,
            &template_data([
                ("RecipientName", self.ctx.entities.user_name(Some(dentist)).await?),
                ("PatientId", self.ctx.entities.public_user_id(order.patient).await?),
            ]),
            (order.id, AssociatedType::Order),
        )?;
        self.ctx.enqueue_all(vec![draft]).await?;

        let now = self.ctx.clock.now();
        self.ctx
            .create_task(NewTask::new(
                TaskType::ReceiveOrder,
                now + response_window(),
                TaskDetails::sub_order(order.id, sub_order_id),
            ))
            .await?;
        Ok(())
    }

    async fn order_received(&self, order_id: Uuid, sub_order_id: Uuid) -> Result<()> {
        let Some(order) = self.ctx.entities.find_order(order_id).await? else {
            return Ok(());
        };
        let patient_id = self.ctx.entities.public_user_id(order.patient).await?;
        let mut drafts = Vec::with_capacity(2);

        if let Some(dentist) = order.dentist {
            drafts.push(self.ctx.render(
                TemplateName::OrderDelivered,
                RoleCode::Dentist,
                NotificationType::OrderReceived,
                dentist,
                &template_data([
                    ("RecipientName", self.ctx.entities.user_name(Some(dentist)).await?),
                    ("PatientId", patient_id.clone()),
                ]),
                (order.id, AssociatedType::Order),
            )?);
        }

        let coordinator = order
            .sub_order(sub_order_id)
            .and_then(|sub_order| sub_order.delivery_coordinator);
        if let Some(coordinator) = coordinator {
            drafts.push(self.ctx.render(
                TemplateName::OrderDelivered,
                RoleCode::DeliveryCoordinator,
                NotificationType::OrderReceived,
                coordinator,
                &template_data([
                    ("RecipientName", self.ctx.entities.user_name(Some(coordinator)).await?),
                    ("PatientId", patient_id),
                ]),
                (order.id, AssociatedType::Order),
            )?);
        }
        self.ctx.enqueue_all(drafts).await?;
        Ok(())
    }
}

#[async_trait]
impl EventListener for OrderEventHandler {
    fn name(&self) -> &str {
        "order_handler"
    }

    #[instrument(skip(self, event), fields(event = event.name()))]
    async fn handle(&self, event: &DomainEvent) -> Result<()> {
        match event {
            DomainEvent::ProductionAssigned {
                order,
                sub_order,
                manager,
            } => self.production_assigned(*order, *sub_order, *manager).await,
            DomainEvent::ProductionDateSet { order, sub_order } => {
                self.production_date_set(*order, *sub_order).await
            }
            DomainEvent::DeliveryAssigned { order, sub_order } => {
                self.delivery_assigned(*order, *sub_order).await
            }
            DomainEvent::OrderShipped { order, sub_order } => {
                self.order_shipped(*order, *sub_order).await
            }
            DomainEvent::OrderReceived { order, sub_order } => {
                self.order_received(*order, *sub_order).await
            }
            _ => Ok(()),
        }
    }
}
