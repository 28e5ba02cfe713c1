//! Integration tests for the domain handlers: which recipients hear about an
//! event, what they receive, and which reminder tasks start.

use chrono::Duration;
use labflow_core::constants::{
    ApprovalStatus, AssociatedType, NotificationType, OrderStatus, QuoteStatus, RoleCode, TaskType,
};
use labflow_core::events::handlers::INQUIRY_RECEIVED_DESCRIPTION;
use labflow_core::events::DomainEvent;
use labflow_core::models::{TaskDetails, UserRecord};
use labflow_core::orchestration::policies::PLANNER_ESTIMATE_OVERDUE;
use labflow_core::test_helpers::{monday_morning, LabFixture, WorkflowTestHarness};
use std::collections::HashSet;
use uuid::Uuid;

fn harness() -> (WorkflowTestHarness, LabFixture) {
    let harness = WorkflowTestHarness::new(monday_morning());
    let lab = LabFixture::install(&harness.entities);
    (harness, lab)
}

#[tokio::test]
async fn test_inquiry_created_notifies_lab_admins_and_awaits_impression() {
    let (harness, lab) = harness();
    let inquiry = lab.inquiry(&harness.entities);

    harness
        .emit(DomainEvent::InquiryCreated { inquiry: inquiry.id })
        .await;

    let drafts = harness.drain_drafts().await;
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].user, lab.lab_admin.id);
    assert_eq!(drafts[0].notification_type, NotificationType::InquiryReceived);
    assert_eq!(drafts[0].description, INQUIRY_RECEIVED_DESCRIPTION);
    assert!(drafts[0].email.is_none());
    assert_eq!(drafts[0].associated_id.as_deref(), Some("PT-0042"));
    assert_eq!(drafts[0].associated_type, Some(AssociatedType::UserId));

    let tasks = harness.open_tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].task_type, TaskType::SubmitImpression);
    assert_eq!(tasks[0].details, TaskDetails::inquiry(inquiry.id));
}

#[tokio::test]
async fn test_planner_assignment_flow_escalates_then_resolves() {
    let (harness, lab) = harness();
    let inquiry = lab.inquiry(&harness.entities);
    harness.entities.update_inquiry(inquiry.id, |inquiry| {
        inquiry.treatment_planner = Some(lab.planner.id);
    });

    let report = harness
        .emit(DomainEvent::TreatmentPlannerAssigned { inquiry: inquiry.id })
        .await;
    assert_eq!(report.succeeded, 1);

    let drafts = harness.drain_drafts().await;
    assert_eq!(drafts.len(), 1);
    let draft = &drafts[0];
    assert_eq!(draft.user, lab.planner.id);
    assert_eq!(draft.notification_type, NotificationType::AssignTreatmentPlanner);
    assert_eq!(draft.associated_id.as_deref(), Some("PT-0042"));
    assert!(draft.email.as_deref().unwrap().contains("Tara Planner"));
    assert!(draft.whatsapp.is_some());

    let tasks = harness.open_tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].task_type, TaskType::SetQuoteEstimateDate);
    assert_eq!(tasks[0].due_date, monday_morning() + Duration::days(2));

    // Reassignment notifies again but keeps the one reminder chain
    harness
        .emit(DomainEvent::TreatmentPlannerAssigned { inquiry: inquiry.id })
        .await;
    assert_eq!(harness.drain_drafts().await.len(), 1);
    assert_eq!(harness.open_tasks().len(), 1);

    // Two days later, still no estimate
    let wednesday = monday_morning() + Duration::days(2);
    let report = harness.system.sweeper().sweep_at(wednesday).await.unwrap();
    assert_eq!(report.escalated, 1);
    assert_eq!(report.regenerated, 1);

    let drafts = harness.drain_drafts().await;
    assert_eq!(drafts.len(), 2);
    let admin_draft = drafts.iter().find(|d| d.user == lab.lab_admin.id).unwrap();
    assert!(admin_draft.description.contains("Tara Planner"));
    assert!(admin_draft.email.is_some());
    let planner_draft = drafts.iter().find(|d| d.user == lab.planner.id).unwrap();
    assert_eq!(planner_draft.description, PLANNER_ESTIMATE_OVERDUE);
    assert!(planner_draft.email.is_none());

    // The planner sets the date; the dentist hears about it
    let estimate = wednesday + Duration::days(5);
    harness.clock.set(wednesday + Duration::hours(1));
    harness.entities.update_inquiry(inquiry.id, |inquiry| {
        inquiry.quote_estimation_date = Some(estimate);
    });
    harness
        .emit(DomainEvent::PlannerSetDate { inquiry: inquiry.id })
        .await;

    let drafts = harness.drain_drafts().await;
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].user, lab.dentist.id);
    assert_eq!(drafts[0].notification_type, NotificationType::PlannerSetEstimate);
    assert_eq!(drafts[0].associated_id, Some(inquiry.id.to_string()));

    let presentation = harness
        .open_tasks()
        .into_iter()
        .find(|task| task.task_type == TaskType::SubmitPresentation)
        .unwrap();
    assert_eq!(presentation.due_date, estimate + Duration::days(2));

    // The regenerated estimate reminder now resolves without notifying
    let friday = wednesday + Duration::days(2);
    let report = harness.system.sweeper().sweep_at(friday).await.unwrap();
    assert_eq!(report.resolved, 1);
    assert_eq!(report.escalated, 0);
    assert!(harness.drain_drafts().await.is_empty());
}

#[tokio::test]
async fn test_dentist_created_by_dentist_needs_lab_approval() {
    let (harness, lab) = harness();
    let mut new_dentist = UserRecord::new(Uuid::new_v4(), "Nina New", RoleCode::Dentist);
    new_dentist.lab = Some(lab.lab);
    new_dentist.clinic = Some(lab.clinic.id);
    new_dentist.approval_status = Some(ApprovalStatus::Pending);
    harness.entities.insert_user(new_dentist.clone());

    harness
        .emit(DomainEvent::DentistCreated {
            dentist: new_dentist.id,
            created_by: lab.dentist.id,
        })
        .await;

    let drafts = harness.drain_drafts().await;
    let recipients: HashSet<_> = drafts.iter().map(|draft| draft.user).collect();
    assert_eq!(recipients, HashSet::from([lab.lab_admin.id, lab.dentist_admin.id]));
    assert!(drafts
        .iter()
        .all(|draft| draft.notification_type == NotificationType::NewDentistCreated));
    assert!(drafts
        .iter()
        .all(|draft| draft.associated_id == Some(new_dentist.id.to_string())));

    let tasks = harness.open_tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].task_type, TaskType::ApproveDentist);
    assert_eq!(tasks[0].details, TaskDetails::dentist(new_dentist.id));

    // Still pending two days later: lab admins are reminded
    let report = harness
        .system
        .sweeper()
        .sweep_at(monday_morning() + Duration::days(2))
        .await
        .unwrap();
    assert_eq!(report.notifications_enqueued, 1);
    let drafts = harness.drain_drafts().await;
    assert_eq!(drafts[0].user, lab.lab_admin.id);
    assert!(drafts[0].description.contains("Bright Smile Clinic"));
}

#[tokio::test]
async fn test_dentist_created_by_lab_admin_only_informs_clinic() {
    let (harness, lab) = harness();
    let mut new_dentist = UserRecord::new(Uuid::new_v4(), "Omar Ortho", RoleCode::Dentist);
    new_dentist.lab = Some(lab.lab);
    new_dentist.clinic = Some(lab.clinic.id);
    harness.entities.insert_user(new_dentist.clone());

    harness
        .emit(DomainEvent::DentistCreated {
            dentist: new_dentist.id,
            created_by: lab.lab_admin.id,
        })
        .await;

    let drafts = harness.drain_drafts().await;
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].user, lab.dentist_admin.id);
    assert!(drafts[0].description.contains("Omar Ortho"));
    assert!(harness.open_tasks().is_empty());
}

#[tokio::test]
async fn test_missing_primary_entity_is_a_silent_no_op() {
    let (harness, _lab) = harness();
    let ghost = Uuid::new_v4();

    for event in [
        DomainEvent::InquiryCreated { inquiry: ghost },
        DomainEvent::PlannerSetDate { inquiry: ghost },
        DomainEvent::QuoteCreated { order: ghost },
        DomainEvent::OrderShipped {
            order: ghost,
            sub_order: ghost,
        },
        DomainEvent::PrivilegeUpdated { user: ghost },
        DomainEvent::BalanceUpdated { clinic: ghost },
    ] {
        let report = harness.emit(event).await;
        assert_eq!(report.failed, 0);
        assert_eq!(report.panicked, 0);
        assert_eq!(report.succeeded, 1);
    }

    assert!(harness.drain_drafts().await.is_empty());
    assert!(harness.open_tasks().is_empty());
}

#[tokio::test]
async fn test_production_assignment_and_date_start_reminders() {
    let (harness, lab) = harness();
    let order = lab.order(&harness.entities, None, OrderStatus::ProductionPending);
    let sub_order = order.sub_orders[0].id;

    harness
        .emit(DomainEvent::ProductionAssigned {
            order: order.id,
            sub_order,
            manager: lab.production_manager.id,
        })
        .await;

    let drafts = harness.drain_drafts().await;
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].user, lab.production_manager.id);
    assert_eq!(drafts[0].notification_type, NotificationType::AssignProduction);

    let tasks = harness.open_tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].task_type, TaskType::SetProductionEstimateDate);
    assert_eq!(tasks[0].details, TaskDetails::sub_order(order.id, sub_order));

    let estimate = monday_morning() + Duration::days(7);
    harness.entities.update_order(order.id, |order| {
        order.sub_orders[0].production_estimation_date = Some(estimate);
        order.sub_orders[0].status = OrderStatus::DentistApproved;
    });
    harness
        .emit(DomainEvent::ProductionDateSet {
            order: order.id,
            sub_order,
        })
        .await;

    let drafts = harness.drain_drafts().await;
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].user, lab.dentist.id);

    let submit = harness
        .open_tasks()
        .into_iter()
        .find(|task| task.task_type == TaskType::SubmitProduction)
        .unwrap();
    assert_eq!(submit.due_date, estimate - Duration::days(1));
}

#[tokio::test]
async fn test_shipping_then_receipt() {
    let (harness, lab) = harness();
    let order = lab.order(&harness.entities, None, OrderStatus::InShipment);
    let sub_order = order.sub_orders[0].id;

    harness
        .emit(DomainEvent::OrderShipped {
            order: order.id,
            sub_order,
        })
        .await;

    let drafts = harness.drain_drafts().await;
    assert!(drafts.iter().any(|draft| draft.user == lab.dentist.id
        && draft.notification_type == NotificationType::OrderShipped));
    let receive = harness
        .open_tasks()
        .into_iter()
        .find(|task| task.task_type == TaskType::ReceiveOrder)
        .unwrap();
    assert_eq!(receive.details, TaskDetails::sub_order(order.id, sub_order));

    harness.entities.update_order(order.id, |order| {
        order.sub_orders[0].status = OrderStatus::Delivered;
    });
    harness
        .emit(DomainEvent::OrderReceived {
            order: order.id,
            sub_order,
        })
        .await;

    let recipients: HashSet<_> = harness
        .drain_drafts()
        .await
        .into_iter()
        .map(|draft| draft.user)
        .collect();
    assert!(recipients.contains(&lab.dentist.id));
    assert!(recipients.contains(&lab.delivery_coordinator.id));

    // Delivered: the receipt reminder closes quietly
    let report = harness
        .system
        .sweeper()
        .sweep_at(monday_morning() + Duration::days(2))
        .await
        .unwrap();
    assert_eq!(report.resolved, 1);
    assert!(harness.drain_drafts().await.is_empty());
}

#[tokio::test]
async fn test_new_message_queues_unrendered_chat_drafts() {
    let (harness, lab) = harness();
    let room = Uuid::new_v4();
    let offline = vec![lab.planner.id, lab.dentist.id];

    harness
        .emit(DomainEvent::NewMessage {
            room,
            message: "Can you check the upper arch scan?".to_string(),
            offline_users: offline.clone(),
            sender: lab.lab_admin.id,
            patient: lab.patient.id,
        })
        .await;

    let drafts = harness.drain_drafts().await;
    assert_eq!(drafts.len(), 2);
    for draft in &drafts {
        assert!(offline.contains(&draft.user));
        assert_eq!(draft.notification_type, NotificationType::NewMessage);
        assert_eq!(draft.description, "Can you check the upper arch scan?");
        assert!(draft.email.is_none());
        assert_eq!(draft.associated_id, Some(room.to_string()));
        assert_eq!(draft.associated_type, Some(AssociatedType::ChatRoom));
        let details = draft.message_details.as_ref().unwrap();
        assert_eq!(details.sender, Some(lab.lab_admin.id));
        assert_eq!(details.patient, Some(lab.patient.id));
    }
    assert!(harness.open_tasks().is_empty());
}

#[tokio::test]
async fn test_clinic_updates_only_announced_for_dentist_admin_edits() {
    let (harness, lab) = harness();

    harness
        .emit(DomainEvent::ClinicUpdated {
            clinic: lab.clinic.id,
            updated_by: lab.lab_admin.id,
        })
        .await;
    assert!(harness.drain_drafts().await.is_empty());

    harness
        .emit(DomainEvent::ClinicUpdated {
            clinic: lab.clinic.id,
            updated_by: lab.dentist_admin.id,
        })
        .await;
    let drafts = harness.drain_drafts().await;
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].notification_type, NotificationType::ClinicUpdated);
    assert_eq!(drafts[0].associated_type, Some(AssociatedType::Clinic));
}

fn quoted_order(harness: &WorkflowTestHarness, lab: &LabFixture) -> (Uuid, Uuid) {
    let inquiry = lab.inquiry(&harness.entities).id;
    let order = lab.order(&harness.entities, Some(inquiry), OrderStatus::Pending);
    harness.entities.update_inquiry(inquiry, |inquiry| {
        inquiry.treatment_planner = Some(lab.planner.id);
    });
    (inquiry, order.id)
}

#[tokio::test]
async fn test_quote_created_waits_on_lab_approval() {
    let (harness, lab) = harness();
    let (_, order) = quoted_order(&harness, &lab);
    harness.entities.update_order(order, |order| {
        order.quote_status = Some(QuoteStatus::PendingApproval);
    });

    let report = harness.emit(DomainEvent::QuoteCreated { order }).await;
    assert_eq!(report.failed, 0);
    assert!(harness.drain_drafts().await.is_empty());

    let tasks = harness.open_tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].task_type, TaskType::ApproveQuote);
    assert_eq!(tasks[0].details, TaskDetails::order(order));
    assert_eq!(tasks[0].due_date, monday_morning() + Duration::days(2));

    // Still unapproved when due: lab admins are chased once
    let report = harness
        .system
        .sweeper()
        .sweep_at(monday_morning() + Duration::days(2))
        .await
        .unwrap();
    assert_eq!(report.escalated, 1);
    assert_eq!(report.regenerated, 0);
    let drafts = harness.drain_drafts().await;
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].user, lab.lab_admin.id);
    assert_eq!(drafts[0].notification_type, NotificationType::ApprovePresentation);
}

#[tokio::test]
async fn test_presentation_approved_informs_dentist_and_planner() {
    let (harness, lab) = harness();
    let (inquiry, order) = quoted_order(&harness, &lab);

    harness
        .emit(DomainEvent::PresentationApproved {
            order,
            planner: lab.planner.id,
        })
        .await;

    let drafts = harness.drain_drafts().await;
    assert_eq!(drafts.len(), 2);
    let dentist = drafts.iter().find(|d| d.user == lab.dentist.id).unwrap();
    assert_eq!(dentist.notification_type, NotificationType::QuoteReceived);
    assert_eq!(dentist.associated_id, Some(inquiry.to_string()));
    assert_eq!(dentist.associated_type, Some(AssociatedType::Inquiry));

    let planner = drafts.iter().find(|d| d.user == lab.planner.id).unwrap();
    assert_eq!(planner.notification_type, NotificationType::QuoteApproved);
    assert_eq!(planner.associated_id, Some(order.to_string()));
    assert_eq!(planner.associated_type, Some(AssociatedType::Order));

    let tasks = harness.open_tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].task_type, TaskType::ReviewPresentation);
    assert_eq!(tasks[0].details, TaskDetails::order(order).with_inquiry(inquiry));
    assert_eq!(tasks[0].due_date, monday_morning() + Duration::days(2));
}

#[tokio::test]
async fn test_quote_rework_notifies_planner_only() {
    let (harness, lab) = harness();
    let (inquiry, _) = quoted_order(&harness, &lab);

    harness
        .emit(DomainEvent::QuoteRework {
            inquiry,
            planner: lab.planner.id,
        })
        .await;

    let drafts = harness.drain_drafts().await;
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].user, lab.planner.id);
    assert_eq!(drafts[0].notification_type, NotificationType::QuoteRework);
    assert_eq!(drafts[0].associated_id, Some(inquiry.to_string()));
    assert!(harness.open_tasks().is_empty());

    // An unknown planner is a silent no-op
    let report = harness
        .emit(DomainEvent::QuoteRework {
            inquiry,
            planner: Uuid::new_v4(),
        })
        .await;
    assert_eq!(report.failed, 0);
    assert!(harness.drain_drafts().await.is_empty());
}

#[tokio::test]
async fn test_quote_reviewed_asks_clinic_admins_to_approve() {
    let (harness, lab) = harness();
    let (inquiry, order) = quoted_order(&harness, &lab);

    harness.emit(DomainEvent::QuoteReviewed { order }).await;

    let drafts = harness.drain_drafts().await;
    let types: HashSet<_> = drafts
        .iter()
        .map(|draft| (draft.user, draft.notification_type))
        .collect();
    assert_eq!(
        types,
        HashSet::from([
            (lab.dentist.id, NotificationType::QuoteReviewed),
            (lab.dentist_admin.id, NotificationType::ApproveOrder),
        ])
    );
    assert!(drafts
        .iter()
        .all(|draft| draft.associated_id == Some(inquiry.to_string())));
    let admin = drafts.iter().find(|d| d.user == lab.dentist_admin.id).unwrap();
    assert!(admin.description.contains("Dana Dentist"));

    let tasks = harness.open_tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].task_type, TaskType::ApproveOrder);
    assert_eq!(tasks[0].details, TaskDetails::order(order).with_inquiry(inquiry));
}

#[tokio::test]
async fn test_order_approved_confirms_to_dentist() {
    let (harness, lab) = harness();
    let (inquiry, _) = quoted_order(&harness, &lab);

    harness.emit(DomainEvent::OrderApproved { inquiry }).await;

    let drafts = harness.drain_drafts().await;
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].user, lab.dentist.id);
    assert_eq!(drafts[0].notification_type, NotificationType::OrderApproved);
    assert_eq!(drafts[0].associated_type, Some(AssociatedType::Inquiry));
    assert!(drafts[0].email.is_some());
    assert!(harness.open_tasks().is_empty());
}
