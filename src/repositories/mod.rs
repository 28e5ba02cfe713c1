//! # Entity Repositories
//!
//! Read-only access to the business entities owned by the surrounding
//! services. The workflow core never writes these records; it reads the
//! minimal projection it needs when a handler or task policy runs, so a
//! precondition is always evaluated against current state.

use crate::constants::RoleCode;
use crate::error::Result;
use crate::models::{ClinicRecord, InquiryRecord, OrderRecord, UserRecord};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait EntityRepository: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>>;

    async fn find_inquiry(&self, id: Uuid) -> Result<Option<InquiryRecord>>;

    async fn find_order(&self, id: Uuid) -> Result<Option<OrderRecord>>;

    async fn find_clinic(&self, id: Uuid) -> Result<Option<ClinicRecord>>;

    /// Every lab admin belonging to `lab`
    async fn lab_admins(&self, lab: Uuid) -> Result<Vec<UserRecord>>;

    /// Every dentist admin of `clinic` within `lab`
    async fn dentist_admins(&self, lab: Uuid, clinic: Uuid) -> Result<Vec<UserRecord>>;

    /// Every delivery coordinator belonging to `lab`
    async fn lab_delivery_coordinators(&self, lab: Uuid) -> Result<Vec<UserRecord>>;

    async fn find_role_code(&self, user: Uuid) -> Result<Option<RoleCode>> {
        Ok(self.find_user(user).await?.and_then(|user| user.role))
    }

    /// Display name, or empty when the user is unset or missing
    async fn user_name(&self, id: Option<Uuid>) -> Result<String> {
        match id {
            Some(id) => Ok(self.find_user(id).await?.map(|user| user.name).unwrap_or_default()),
            None => Ok(String::new()),
        }
    }

    /// Public patient identifier, or empty when unset or missing
    async fn public_user_id(&self, id: Option<Uuid>) -> Result<String> {
        match id {
            Some(id) => Ok(self
                .find_user(id)
                .await?
                .and_then(|user| user.public_user_id)
                .unwrap_or_default()),
            None => Ok(String::new()),
        }
    }
}
