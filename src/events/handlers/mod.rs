//! # Domain Handlers
//!
//! Listeners that turn domain events into notification drafts and reminder
//! tasks. Each handler reads the minimal current state of the entities the
//! event names, renders one draft per recipient, enqueues the drafts and
//! optionally creates a task. A missing primary entity is a silent no-op.
//!
//! Handlers are grouped by the part of the pipeline they cover; each group is
//! one [`EventListener`] registered for the kinds in its `EVENTS` list.

mod clinic;
mod inquiry;
mod message;
mod order;
mod quote;
mod user;

pub use clinic::ClinicEventHandler;
pub use inquiry::{InquiryEventHandler, INQUIRY_RECEIVED_DESCRIPTION};
pub use message::ChatEventHandler;
pub use order::OrderEventHandler;
pub use quote::QuoteEventHandler;
pub use user::UserEventHandler;

use super::bus::{EventBus, EventListener};
use super::types::EventKind;
use crate::constants::RoleCode;
use crate::orchestration::context::WorkflowContext;
use crate::templates::TemplateName;
use chrono::Duration;
use std::sync::Arc;

/// How long a newly assigned human has before the first reminder
pub(crate) fn response_window() -> Duration {
    Duration::days(2)
}

/// Every `(template, role)` pair rendered by a handler
pub const HANDLER_TEMPLATES: &[(TemplateName, RoleCode)] = &[
    (TemplateName::AssignedTreatmentPlanner, RoleCode::TreatmentPlanner),
    (TemplateName::TreatmentEstimationProvided, RoleCode::Dentist),
    (TemplateName::ImpressionReceived, RoleCode::Dentist),
    (TemplateName::ImpressionReceived, RoleCode::TreatmentPlanner),
    (TemplateName::QuoteApproved, RoleCode::Dentist),
    (TemplateName::QuoteApproved, RoleCode::TreatmentPlanner),
    (TemplateName::QuoteSentToRework, RoleCode::TreatmentPlanner),
    (TemplateName::OrderPlaced, RoleCode::Dentist),
    (TemplateName::OrderPlaced, RoleCode::DentistAdmin),
    (TemplateName::OrderApproved, RoleCode::Dentist),
    (TemplateName::AssignedProductionManager, RoleCode::ProductionManager),
    (TemplateName::ProductionEstimationProvided, RoleCode::Dentist),
    (TemplateName::AssignedDeliveryCoordinator, RoleCode::DeliveryCoordinator),
    (TemplateName::OrderShipped, RoleCode::Dentist),
    (TemplateName::OrderDelivered, RoleCode::Dentist),
    (TemplateName::OrderDelivered, RoleCode::DeliveryCoordinator),
    (TemplateName::DentistAdded, RoleCode::LabAdmin),
    (TemplateName::DentistAdded, RoleCode::DentistAdmin),
    (TemplateName::DentistAddedByDentist, RoleCode::DentistAdmin),
    (TemplateName::PrivilegeUpdated, RoleCode::Dentist),
    (TemplateName::ClinicUpdated, RoleCode::DentistAdmin),
    (TemplateName::PaymentUpdated, RoleCode::DentistAdmin),
];

fn register<L: EventListener + 'static>(bus: &EventBus, listener: L, kinds: &[EventKind]) {
    let listener: Arc<dyn EventListener> = Arc::new(listener);
    for kind in kinds {
        bus.on(*kind, Arc::clone(&listener));
    }
}

/// Register every domain handler on `bus`
pub fn register_default_handlers(bus: &EventBus, ctx: &WorkflowContext) {
    register(bus, InquiryEventHandler::new(ctx.clone()), InquiryEventHandler::EVENTS);
    register(bus, QuoteEventHandler::new(ctx.clone()), QuoteEventHandler::EVENTS);
    register(bus, OrderEventHandler::new(ctx.clone()), OrderEventHandler::EVENTS);
    register(bus, UserEventHandler::new(ctx.clone()), UserEventHandler::EVENTS);
    register(bus, ClinicEventHandler::new(ctx.clone()), ClinicEventHandler::EVENTS);
    register(bus, ChatEventHandler::new(ctx.clone()), ChatEventHandler::EVENTS);
}
