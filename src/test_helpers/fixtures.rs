//! # Workflow Fixtures
//!
//! A fully wired [`WorkflowSystem`] over in-memory collaborators, plus a
//! small lab with one user in every role. Tests drive time through the
//! [`FixedClock`] and inspect the queue, stores and recorded mail directly.

use super::entities::InMemoryEntityRepository;
use super::mail::RecordingMailSender;
use crate::config::{DispatcherConfig, SweeperConfig, WorkflowConfig};
use crate::constants::{ApprovalStatus, ImpressionStatus, OrderStatus, QuoteStatus, RoleCode};
use crate::error::Result;
use crate::events::{DomainEvent, EmitReport};
use crate::messaging::{DispatchOutcome, InProcessQueue};
use crate::models::{
    ClinicRecord, InquiryRecord, NotificationDraft, OrderRecord, SubOrderRecord, Task, UserRecord,
};
use crate::orchestration::{FixedClock, WorkflowDependencies, WorkflowSystem};
use crate::store::{InMemoryNotificationStore, InMemoryTaskStore};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Configuration tuned for tests: UTC day boundary, fast polling, no SMTP
pub fn test_config() -> WorkflowConfig {
    WorkflowConfig {
        environment: "test".to_string(),
        sweeper: SweeperConfig {
            interval_seconds: 1,
            day_boundary_utc_offset_minutes: Some(0),
            ..SweeperConfig::default()
        },
        dispatcher: DispatcherConfig {
            max_attempts: 3,
            backoff_base_ms: 1,
            backoff_max_ms: 5,
            queue_capacity: 1_000,
            poll_interval_ms: 10,
            ..DispatcherConfig::default()
        },
        ..WorkflowConfig::default()
    }
}

/// Monday 2024-03-04 09:00 UTC
pub fn monday_morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

pub struct WorkflowTestHarness {
    pub entities: Arc<InMemoryEntityRepository>,
    pub tasks: Arc<InMemoryTaskStore>,
    pub notifications: Arc<InMemoryNotificationStore>,
    pub queue: Arc<InProcessQueue>,
    pub mail: Arc<RecordingMailSender>,
    pub clock: Arc<FixedClock>,
    pub system: WorkflowSystem,
}

impl std::fmt::Debug for WorkflowTestHarness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowTestHarness")
            .field("now", &crate::orchestration::Clock::now(self.clock.as_ref()))
            .field("tasks", &self.tasks.len())
            .finish()
    }
}

impl WorkflowTestHarness {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_config(test_config(), now)
    }

    pub fn with_config(config: WorkflowConfig, now: DateTime<Utc>) -> Self {
        let entities = Arc::new(InMemoryEntityRepository::new());
        let tasks = Arc::new(InMemoryTaskStore::new());
        let notifications = Arc::new(InMemoryNotificationStore::new());
        let queue = Arc::new(InProcessQueue::new(config.dispatcher.clone()));
        let mail = Arc::new(RecordingMailSender::new());
        let clock = Arc::new(FixedClock::new(now));

        let deps = WorkflowDependencies {
            entities: entities.clone(),
            tasks: tasks.clone(),
            notifications: notifications.clone(),
            queue: queue.clone(),
            consumer: queue.clone(),
            mail: mail.clone(),
            clock: clock.clone(),
        };

        Self {
            entities,
            tasks,
            notifications,
            queue,
            mail,
            clock,
            system: WorkflowSystem::new(config, deps),
        }
    }

    /// Emit and wait for every listener to finish
    pub async fn emit(&self, event: DomainEvent) -> EmitReport {
        self.system.emit(event).join().await
    }

    /// Take every queued draft without delivering it
    pub async fn drain_drafts(&self) -> Vec<NotificationDraft> {
        self.queue
            .drain()
            .await
            .into_iter()
            .map(|job| job.payload)
            .collect()
    }

    /// Run every queued job through the dispatcher
    pub async fn deliver_all(&self) -> Result<Vec<DispatchOutcome>> {
        let mut outcomes = Vec::new();
        for mut job in self.queue.drain().await {
            job.attempts += 1;
            outcomes.push(self.system.dispatcher().process(&job).await?);
        }
        Ok(outcomes)
    }

    /// Every unfulfilled task, earliest due first
    pub fn open_tasks(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .snapshot()
            .into_iter()
            .filter(|task| !task.is_fulfilled)
            .collect();
        tasks.sort_by_key(|task| task.due_date);
        tasks
    }
}

/// One lab, one clinic, and one user in every role
#[derive(Debug, Clone)]
pub struct LabFixture {
    pub lab: Uuid,
    pub clinic: ClinicRecord,
    pub lab_admin: UserRecord,
    pub dentist_admin: UserRecord,
    pub dentist: UserRecord,
    pub patient: UserRecord,
    pub planner: UserRecord,
    pub production_manager: UserRecord,
    pub delivery_coordinator: UserRecord,
}

fn lab_user(name: &str, role: RoleCode, lab: Uuid, clinic: Option<Uuid>) -> UserRecord {
    let mut user = UserRecord::new(Uuid::new_v4(), name, role);
    user.lab = Some(lab);
    user.clinic = clinic;
    user.email = Some(format!("{}@example.com", name.to_lowercase().replace(' ', ".")));
    user
}

impl LabFixture {
    /// Build the lab and store every record in `entities`
    pub fn install(entities: &InMemoryEntityRepository) -> Self {
        let lab = Uuid::new_v4();
        let clinic = ClinicRecord {
            id: Uuid::new_v4(),
            name: "Bright Smile Clinic".to_string(),
            lab: Some(lab),
            due_amount: 0.0,
            paid_amount: 0.0,
        };

        let mut dentist = lab_user("Dana Dentist", RoleCode::Dentist, lab, Some(clinic.id));
        dentist.approval_status = Some(ApprovalStatus::Approved);
        let mut patient = lab_user("Pat Patient", RoleCode::Patient, lab, Some(clinic.id));
        patient.public_user_id = Some("PT-0042".to_string());

        let fixture = Self {
            lab,
            lab_admin: lab_user("Lee Admin", RoleCode::LabAdmin, lab, None),
            dentist_admin: lab_user("Drew Admin", RoleCode::DentistAdmin, lab, Some(clinic.id)),
            dentist,
            patient,
            planner: lab_user("Tara Planner", RoleCode::TreatmentPlanner, lab, None),
            production_manager: lab_user("Max Production", RoleCode::ProductionManager, lab, None),
            delivery_coordinator: lab_user("Dee Delivery", RoleCode::DeliveryCoordinator, lab, None),
            clinic,
        };

        entities.insert_clinic(fixture.clinic.clone());
        for user in [
            &fixture.lab_admin,
            &fixture.dentist_admin,
            &fixture.dentist,
            &fixture.patient,
            &fixture.planner,
            &fixture.production_manager,
            &fixture.delivery_coordinator,
        ] {
            entities.insert_user(user.clone());
        }
        fixture
    }

    /// A fresh inquiry from the fixture dentist, not yet assigned
    pub fn inquiry(&self, entities: &InMemoryEntityRepository) -> InquiryRecord {
        let inquiry = InquiryRecord {
            id: Uuid::new_v4(),
            lab: Some(self.lab),
            clinic: Some(self.clinic.id),
            dentist: Some(self.dentist.id),
            patient: Some(self.patient.id),
            treatment_planner: None,
            quote_estimation_date: None,
            quote_status: Some(QuoteStatus::Pending),
            impression_status: Some(ImpressionStatus::Pending),
        };
        entities.insert_inquiry(inquiry.clone());
        inquiry
    }

    /// An order for `inquiry` with a single sub-order in `status`
    pub fn order(
        &self,
        entities: &InMemoryEntityRepository,
        inquiry: Option<Uuid>,
        status: OrderStatus,
    ) -> OrderRecord {
        let order = OrderRecord {
            id: Uuid::new_v4(),
            inquiry,
            lab: Some(self.lab),
            clinic: Some(self.clinic.id),
            dentist: Some(self.dentist.id),
            patient: Some(self.patient.id),
            quote_status: Some(QuoteStatus::DentistApproved),
            sub_orders: vec![SubOrderRecord {
                id: Uuid::new_v4(),
                status,
                production_manager: Some(self.production_manager.id),
                production_estimation_date: None,
                delivery_coordinator: Some(self.delivery_coordinator.id),
            }],
        };
        entities.insert_order(order.clone());
        order
    }
}
