//! # Domain Constants
//!
//! Role codes, task types, notification types and the entity status enums the
//! workflow core reads. Every enum round-trips through its SCREAMING_SNAKE_CASE
//! string form, which is what the stores persist and what serde emits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a persisted string does not name a known variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident : $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

string_enum! {
    /// Role of a portal user; selects the template variant a recipient gets
    RoleCode: "role" {
        Admin => "ADMIN",
        LabAdmin => "LAB_ADMIN",
        TreatmentPlanner => "TREATMENT_PLANNER",
        ProductionManager => "PRODUCTION_MANAGER",
        DeliveryCoordinator => "DELIVERY_COORDINATOR",
        DentistAdmin => "DENTIST_ADMIN",
        Dentist => "DENTIST",
        Patient => "PATIENT",
    }
}

string_enum! {
    /// Kind of pending human action a task tracks
    TaskType: "task type" {
        ApproveDentist => "APPROVE_DENTIST",
        SetQuoteEstimateDate => "SET_QUOTE_ESTIMATE_DATE",
        SubmitPresentation => "SUBMIT_PRESENTATION",
        SetProductionEstimateDate => "SET_PRODUCTION_ESTIMATE_DATE",
        SubmitProduction => "SUBMIT_PRODUCTION",
        ShipOrder => "SHIP_ORDER",
        ReviewPresentation => "REVIEW_PRESENTATION",
        SubmitImpression => "SUBMIT_IMPRESSION",
        ApproveOrder => "APPROVE_ORDER",
        DuePayment => "DUE_PAYMENT",
        ApproveQuote => "APPROVE_QUOTE",
        ReceiveOrder => "RECEIVE_ORDER",
    }
}

string_enum! {
    NotificationType: "notification type" {
        InquiryAssigned => "INQUIRY_ASSIGNED",
        ImpressionDelivered => "IMPRESSION_DELIVERED",
        QuoteApproved => "QUOTE_APPROVED",
        QuoteRework => "QUOTE_REWORK",
        NewDentistCreated => "NEW_DENTIST_CREATED",
        AssignTreatmentPlanner => "ASSIGN_TREATMENT_PLANNER",
        PlannerSetEstimate => "PLANNER_SET_ESTIMATE",
        AssignProduction => "ASSIGN_PRODUCTION",
        ProductionSetEstimate => "PRODUCTION_SET_ESTIMATE",
        SubmitProduction => "SUBMIT_PRODUCTION",
        SubmitPresentation => "SUBMIT_PRESENTATION",
        ShipOrder => "SHIP_ORDER",
        /// Chat message; push-only, enriched at delivery time
        NewMessage => "NEW_MESSAGE",
        OrderAssigned => "ORDER_ASSIGNED",
        OrderReceived => "ORDER_RECEIVED",
        QuoteReceived => "QUOTE_RECEIVED",
        UpdatePrivilege => "UPDATE_PRIVILEGE",
        ApproveOrder => "APPROVE_ORDER",
        OrderApproved => "ORDER_APPROVED",
        InquiryReceived => "INQUIRY_RECEIVED",
        SubmitImpression => "SUBMIT_IMPRESSION",
        QuoteReviewed => "QUOTE_REVIEWED",
        ClinicUpdated => "CLINIC_UPDATED",
        BalanceUpdated => "BALANCE_UPDATED",
        DueAmount => "DUE_AMOUNT",
        OrderShipped => "ORDER_SHIPPED",
        ApprovePresentation => "APPROVE_PRESENTATION",
        ReceiveOrder => "RECEIVE_ORDER",
    }
}

impl NotificationType {
    pub fn is_chat_message(&self) -> bool {
        matches!(self, NotificationType::NewMessage)
    }
}

string_enum! {
    /// What a notification's `associated_id` points at
    AssociatedType: "associated type" {
        Inquiry => "INQUIRY",
        Order => "ORDER",
        Dentist => "DENTIST",
        SubOrder => "SUB_ORDER",
        ChatRoom => "CHAT_ROOM",
        Clinic => "CLINIC",
        UserId => "USER_ID",
        User => "USER",
    }
}

string_enum! {
    QuoteStatus: "quote status" {
        Pending => "PENDING",
        Rework => "REWORK",
        PendingApproval => "PENDING_APPROVAL",
        AdminApproved => "ADMIN_APPROVED",
        AdminCanceled => "ADMIN_CANCELED",
        DentistReviewed => "DENTIST_REVIEWED",
        DentistApproved => "DENTIST_APPROVED",
        DentistCanceled => "DENTIST_CANCELED",
    }
}

string_enum! {
    /// Fulfilment status of a sub-order
    OrderStatus: "order status" {
        Pending => "PENDING",
        DentistApproved => "DENTIST_APPROVED",
        ProductionPending => "PRODUCTION_PENDING",
        DeliveryPending => "DELIVERY_PENDING",
        InShipment => "IN_SHIPMENT",
        Delivered => "DELIVERED",
    }
}

string_enum! {
    ApprovalStatus: "approval status" {
        Pending => "PENDING",
        Approved => "APPROVED",
        Rejected => "REJECTED",
    }
}

string_enum! {
    ImpressionStatus: "impression status" {
        Pending => "PENDING",
        Delivered => "DELIVERED",
    }
}

/// Fixed values shared across the core
pub mod system {
    /// Queue job name for every notification draft
    pub const SEND_NOTIFICATION_JOB: &str = "sendNotification";

    /// Real-time event name pushed to live sessions
    pub const NOTIFICATION_PUSH_EVENT: &str = "notification:receive";

    /// Portal name injected into every rendered template
    pub const DEFAULT_PORTAL_NAME: &str = "Deutsche Aligners";
}
