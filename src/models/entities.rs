//! Read-only projections of the business entities the workflow core inspects.
//!
//! These carry only the fields handlers and task policies read; the owning
//! services keep the full records.

use crate::constants::{ApprovalStatus, ImpressionStatus, OrderStatus, QuoteStatus, RoleCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub role: Option<RoleCode>,
    pub lab: Option<Uuid>,
    pub clinic: Option<Uuid>,
    /// Public patient identifier shown in templates as `PatientId`
    pub public_user_id: Option<String>,
    pub profile_pic_url: Option<String>,
    pub approval_status: Option<ApprovalStatus>,
}

impl UserRecord {
    pub fn new(id: Uuid, name: impl Into<String>, role: RoleCode) -> Self {
        Self {
            id,
            name: name.into(),
            email: None,
            role: Some(role),
            lab: None,
            clinic: None,
            public_user_id: None,
            profile_pic_url: None,
            approval_status: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InquiryRecord {
    pub id: Uuid,
    pub lab: Option<Uuid>,
    pub clinic: Option<Uuid>,
    pub dentist: Option<Uuid>,
    pub patient: Option<Uuid>,
    pub treatment_planner: Option<Uuid>,
    pub quote_estimation_date: Option<DateTime<Utc>>,
    pub quote_status: Option<QuoteStatus>,
    pub impression_status: Option<ImpressionStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubOrderRecord {
    pub id: Uuid,
    pub status: OrderStatus,
    pub production_manager: Option<Uuid>,
    pub production_estimation_date: Option<DateTime<Utc>>,
    pub delivery_coordinator: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: Uuid,
    pub inquiry: Option<Uuid>,
    pub lab: Option<Uuid>,
    pub clinic: Option<Uuid>,
    pub dentist: Option<Uuid>,
    pub patient: Option<Uuid>,
    pub quote_status: Option<QuoteStatus>,
    pub sub_orders: Vec<SubOrderRecord>,
}

impl OrderRecord {
    pub fn sub_order(&self, id: Uuid) -> Option<&SubOrderRecord> {
        self.sub_orders.iter().find(|sub_order| sub_order.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicRecord {
    pub id: Uuid,
    pub name: String,
    pub lab: Option<Uuid>,
    pub due_amount: f64,
    pub paid_amount: f64,
}

impl ClinicRecord {
    /// Outstanding balance; positive means the clinic owes money
    pub fn balance(&self) -> f64 {
        self.due_amount - self.paid_amount
    }
}
