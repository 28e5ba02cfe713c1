//! Domain events emitted by business operations after their mutation commits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Event name used as the listener registration key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    InquiryCreated,
    TreatmentPlannerAssigned,
    PlannerSetDate,
    ImpressionDelivered,
    QuoteCreated,
    PresentationApproved,
    QuoteRework,
    QuoteReviewed,
    OrderApproved,
    ProductionAssigned,
    ProductionDateSet,
    DeliveryAssigned,
    OrderShipped,
    OrderReceived,
    DentistCreated,
    PrivilegeUpdated,
    ClinicCreated,
    ClinicUpdated,
    BalanceUpdated,
    NewMessage,
}

impl EventKind {
    pub const ALL: &'static [EventKind] = &[
        EventKind::InquiryCreated,
        EventKind::TreatmentPlannerAssigned,
        EventKind::PlannerSetDate,
        EventKind::ImpressionDelivered,
        EventKind::QuoteCreated,
        EventKind::PresentationApproved,
        EventKind::QuoteRework,
        EventKind::QuoteReviewed,
        EventKind::OrderApproved,
        EventKind::ProductionAssigned,
        EventKind::ProductionDateSet,
        EventKind::DeliveryAssigned,
        EventKind::OrderShipped,
        EventKind::OrderReceived,
        EventKind::DentistCreated,
        EventKind::PrivilegeUpdated,
        EventKind::ClinicCreated,
        EventKind::ClinicUpdated,
        EventKind::BalanceUpdated,
        EventKind::NewMessage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::InquiryCreated => "inquiry.created",
            EventKind::TreatmentPlannerAssigned => "inquiry.treatment_planner_assigned",
            EventKind::PlannerSetDate => "inquiry.planner_set_date",
            EventKind::ImpressionDelivered => "inquiry.impression_delivered",
            EventKind::QuoteCreated => "quote.created",
            EventKind::PresentationApproved => "quote.presentation_approved",
            EventKind::QuoteRework => "quote.rework",
            EventKind::QuoteReviewed => "quote.reviewed",
            EventKind::OrderApproved => "order.approved",
            EventKind::ProductionAssigned => "order.production_assigned",
            EventKind::ProductionDateSet => "order.production_date_set",
            EventKind::DeliveryAssigned => "order.delivery_assigned",
            EventKind::OrderShipped => "order.shipped",
            EventKind::OrderReceived => "order.received",
            EventKind::DentistCreated => "user.dentist_created",
            EventKind::PrivilegeUpdated => "user.privilege_updated",
            EventKind::ClinicCreated => "clinic.created",
            EventKind::ClinicUpdated => "clinic.updated",
            EventKind::BalanceUpdated => "clinic.balance_updated",
            EventKind::NewMessage => "chat.new_message",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state change worth telling someone about; carries entity ids only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    InquiryCreated {
        inquiry: Uuid,
    },
    TreatmentPlannerAssigned {
        inquiry: Uuid,
    },
    PlannerSetDate {
        inquiry: Uuid,
    },
    ImpressionDelivered {
        inquiry: Uuid,
    },
    QuoteCreated {
        order: Uuid,
    },
    PresentationApproved {
        order: Uuid,
        planner: Uuid,
    },
    QuoteRework {
        inquiry: Uuid,
        planner: Uuid,
    },
    QuoteReviewed {
        order: Uuid,
    },
    OrderApproved {
        inquiry: Uuid,
    },
    ProductionAssigned {
        order: Uuid,
        sub_order: Uuid,
        manager: Uuid,
    },
    ProductionDateSet {
        order: Uuid,
        sub_order: Uuid,
    },
    DeliveryAssigned {
        order: Uuid,
        sub_order: Uuid,
    },
    OrderShipped {
        order: Uuid,
        sub_order: Uuid,
    },
    OrderReceived {
        order: Uuid,
        sub_order: Uuid,
    },
    DentistCreated {
        dentist: Uuid,
        created_by: Uuid,
    },
    PrivilegeUpdated {
        user: Uuid,
    },
    ClinicCreated {
        clinic: Uuid,
    },
    ClinicUpdated {
        clinic: Uuid,
        updated_by: Uuid,
    },
    BalanceUpdated {
        clinic: Uuid,
    },
    NewMessage {
        room: Uuid,
        message: String,
        offline_users: Vec<Uuid>,
        sender: Uuid,
        patient: Uuid,
    },
}

impl DomainEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DomainEvent::InquiryCreated { .. } => EventKind::InquiryCreated,
            DomainEvent::TreatmentPlannerAssigned { .. } => EventKind::TreatmentPlannerAssigned,
            DomainEvent::PlannerSetDate { .. } => EventKind::PlannerSetDate,
            DomainEvent::ImpressionDelivered { .. } => EventKind::ImpressionDelivered,
            DomainEvent::QuoteCreated { .. } => EventKind::QuoteCreated,
            DomainEvent::PresentationApproved { .. } => EventKind::PresentationApproved,
            DomainEvent::QuoteRework { .. } => EventKind::QuoteRework,
            DomainEvent::QuoteReviewed { .. } => EventKind::QuoteReviewed,
            DomainEvent::OrderApproved { .. } => EventKind::OrderApproved,
            DomainEvent::ProductionAssigned { .. } => EventKind::ProductionAssigned,
            DomainEvent::ProductionDateSet { .. } => EventKind::ProductionDateSet,
            DomainEvent::DeliveryAssigned { .. } => EventKind::DeliveryAssigned,
            DomainEvent::OrderShipped { .. } => EventKind::OrderShipped,
            DomainEvent::OrderReceived { .. } => EventKind::OrderReceived,
            DomainEvent::DentistCreated { .. } => EventKind::DentistCreated,
            DomainEvent::PrivilegeUpdated { .. } => EventKind::PrivilegeUpdated,
            DomainEvent::ClinicCreated { .. } => EventKind::ClinicCreated,
            DomainEvent::ClinicUpdated { .. } => EventKind::ClinicUpdated,
            DomainEvent::BalanceUpdated { .. } => EventKind::BalanceUpdated,
            DomainEvent::NewMessage { .. } => EventKind::NewMessage,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().as_str()
    }
}

/// An emitted event as seen on the diagnostics stream
#[derive(Debug, Clone, Serialize)]
pub struct PublishedEvent {
    pub event: DomainEvent,
    pub listeners: usize,
    pub published_at: DateTime<Utc>,
}
