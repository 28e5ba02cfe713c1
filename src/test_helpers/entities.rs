//! In-memory entity repository for tests and embedding applications that
//! keep their records elsewhere.

use crate::constants::RoleCode;
use crate::error::Result;
use crate::models::{ClinicRecord, InquiryRecord, OrderRecord, UserRecord};
use crate::repositories::EntityRepository;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct InMemoryEntityRepository {
    users: RwLock<HashMap<Uuid, UserRecord>>,
    inquiries: RwLock<HashMap<Uuid, InquiryRecord>>,
    orders: RwLock<HashMap<Uuid, OrderRecord>>,
    clinics: RwLock<HashMap<Uuid, ClinicRecord>>,
}

impl InMemoryEntityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: UserRecord) {
        self.users.write().insert(user.id, user);
    }

    pub fn insert_inquiry(&self, inquiry: InquiryRecord) {
        self.inquiries.write().insert(inquiry.id, inquiry);
    }

    pub fn insert_order(&self, order: OrderRecord) {
        self.orders.write().insert(order.id, order);
    }

    pub fn insert_clinic(&self, clinic: ClinicRecord) {
        self.clinics.write().insert(clinic.id, clinic);
    }

    pub fn remove_user(&self, id: Uuid) -> Option<UserRecord> {
        self.users.write().remove(&id)
    }

    /// Apply `update` to a stored inquiry; false when it does not exist
    pub fn update_inquiry(&self, id: Uuid, update: impl FnOnce(&mut InquiryRecord)) -> bool {
        self.inquiries.write().get_mut(&id).map(update).is_some()
    }

    pub fn update_order(&self, id: Uuid, update: impl FnOnce(&mut OrderRecord)) -> bool {
        self.orders.write().get_mut(&id).map(update).is_some()
    }

    pub fn update_clinic(&self, id: Uuid, update: impl FnOnce(&mut ClinicRecord)) -> bool {
        self.clinics.write().get_mut(&id).map(update).is_some()
    }

    pub fn update_user(&self, id: Uuid, update: impl FnOnce(&mut UserRecord)) -> bool {
        self.users.write().get_mut(&id).map(update).is_some()
    }

    fn users_where(&self, predicate: impl Fn(&UserRecord) -> bool) -> Vec<UserRecord> {
        let mut users: Vec<UserRecord> = self
            .users
            .read()
            .values()
            .filter(|user| predicate(user))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        users
    }
}

#[async_trait]
impl EntityRepository for InMemoryEntityRepository {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>> {
        Ok(self.users.read().get(&id).cloned())
    }

    async fn find_inquiry(&self, id: Uuid) -> Result<Option<InquiryRecord>> {
        Ok(self.inquiries.read().get(&id).cloned())
    }

    async fn find_order(&self, id: Uuid) -> Result<Option<OrderRecord>> {
        Ok(self.orders.read().get(&id).cloned())
    }

    async fn find_clinic(&self, id: Uuid) -> Result<Option<ClinicRecord>> {
        Ok(self.clinics.read().get(&id).cloned())
    }

    async fn lab_admins(&self, lab: Uuid) -> Result<Vec<UserRecord>> {
        Ok(self.users_where(|user| {
            user.role == Some(RoleCode::LabAdmin) && user.lab == Some(lab)
        }))
    }

    async fn dentist_admins(&self, lab: Uuid, clinic: Uuid) -> Result<Vec<UserRecord>> {
        Ok(self.users_where(|user| {
            user.role == Some(RoleCode::DentistAdmin)
                && user.lab == Some(lab)
                && user.clinic == Some(clinic)
        }))
    }

    async fn lab_delivery_coordinators(&self, lab: Uuid) -> Result<Vec<UserRecord>> {
        Ok(self.users_where(|user| {
            user.role == Some(RoleCode::DeliveryCoordinator) && user.lab == Some(lab)
        }))
    }
}
