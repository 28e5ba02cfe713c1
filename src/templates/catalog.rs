//! Compiled-in template catalogue.
//!
//! Placeholders use `[Key]` syntax; `[PortalName]` is always available.

use super::{RoleTemplates, TemplateName, TemplateTable};
use crate::constants::RoleCode;

pub(super) fn builtin_templates() -> TemplateTable {
    let mut table = TemplateTable::default();

    table.insert(
        TemplateName::QuoteApproved,
        RoleCode::Dentist,
        RoleTemplates::all_channels(
            "Your custom aligner quote, as requested for Patient ID [PatientId], is now ready for review.",
            "Hello [RecipientName],\n\nThe custom aligner quote for Patient ID [PatientId] is now prepared and ready for your review. Please access our Dental Portal to view the detailed quote. We appreciate your attention to providing the best care for our patients.\n\nFor any queries or further assistance, feel free to Contact us.\n\nBest regards,\n[PortalName]",
            "Aligner Quote Ready for Patient ID [PatientId]",
            "Dear [RecipientName],\n\nWe are pleased to inform you that the custom aligner quote you requested for Patient ID [PatientId] is now complete and ready for your review. This quote has been tailored to meet the specific needs of your patient and is available through our Dental Portal.\n\nIf you have any questions or require additional information, please contact us.\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::QuoteApproved,
        RoleCode::TreatmentPlanner,
        RoleTemplates::all_channels(
            "Your Presentation has been approved by the admin.",
            "Presentation Approved\n\nHi [RecipientName],\n\nGood news! Your presentation has been approved by the admin.\n\nThanks,\n[PortalName]",
            "Presentation Approved by Admin",
            "Dear [RecipientName],\n\nWe are pleased to inform you that your presentation has been approved by the admin.\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::QuoteSentToRework,
        RoleCode::TreatmentPlanner,
        RoleTemplates::all_channels(
            "Admin has provided feedback. Rework required.",
            "Hi [RecipientName],\n\nThe admin has reviewed your work and provided feedback. Rework is required. Please check the details.\n\nThanks,\n[PortalName]",
            "Feedback Received: Rework Required",
            "Rework Alert: Admin Feedback\n\nDear [RecipientName],\n\nThe admin has provided feedback on your recent submission. Rework is required to meet the necessary standards. Please review the feedback and proceed accordingly.\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::RemindReviewQuote,
        RoleCode::Dentist,
        RoleTemplates::all_channels(
            "You have pending aligner quotes from 2 days ago awaiting review.",
            "Hello [RecipientName],\n\nWe'd like to remind you that aligner quotes from 2 days ago awaiting review in our Dental Portal. Please check them at your earliest convenience. Thank you.\n\nBest regards,\n[PortalName]",
            "Aligner Quote Review Reminder",
            "Dear [RecipientName],\n\nA quick reminder: Aligner quotes from 2 days ago are awaiting your review in our Dental Portal. Please check them at your earliest convenience. Thank you.\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::RemindImpressionPending,
        RoleCode::Dentist,
        RoleTemplates::all_channels(
            "Your patient's aligner impression for Patient ID [PatientId] is pending. Please deliver the impression to receive your quote.",
            "Hello [RecipientName],\n\nJust a reminder: The aligner impression for Patient ID [PatientId] is pending. Please submit it to receive your quote. Thanks!\n\nBest regards,\n[PortalName]",
            "Pending Aligner Impression for Patient ID [PatientId]",
            "Dear [RecipientName],\n\nJust a reminder: The aligner impression for Patient ID [PatientId] is pending. Please submit the impression to proceed with the quote.\n\nThank you for your prompt attention to this matter.\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::ImpressionReceived,
        RoleCode::Dentist,
        RoleTemplates::all_channels(
            "We've received the dental impression for Patient ID [PatientId]. A custom quote is coming soon.",
            "Hello Dr. [RecipientName],\n\nWe've received the dental impression for Patient ID [PatientId]. A custom quote will be provided soon.\n\nBest regards,\n[PortalName]",
            "Dental Impression Received - Patient ID [PatientId]",
            "Dear Dr. [RecipientName],\n\nGood news! We've received the dental impression for Patient ID [PatientId]. A custom quote is being prepared and will be sent to you soon. Stay tuned!\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::ImpressionReceived,
        RoleCode::TreatmentPlanner,
        RoleTemplates::all_channels(
            "An impression has been delivered to the lab.",
            "Lab Delivery Update\n\nHi [RecipientName],\n\nAn impression has been delivered to the lab. Please check for further details.\n\nThanks,\n[PortalName]",
            "Impression Delivered to Lab",
            "Dear [RecipientName],\n\nThis notification is to inform you that an impression has been delivered to the lab. You may review the relevant details at your convenience.\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::DirectOrderPlaced,
        RoleCode::Dentist,
        RoleTemplates::all_channels(
            "Your direct order for Patient ID [PatientId] has been successfully placed. We will update you on the progress soon.",
            "Hello Dr. [RecipientName],\n\nYour order has been placed successfully. We'll keep you posted on the progress soon.\n\nBest regards,\n[PortalName]",
            "Confirmation: Order Placed for Patient ID [PatientId]",
            "Dear [RecipientName],\n\nWe are pleased to inform you that your direct order for Patient ID [PatientId] has been successfully placed with us. Our team is now working diligently to process your order. We value your trust and will keep you informed about the progress and expected completion timeline soon.\n\nThank you for choosing our services. Should you have any questions, please don't hesitate to reach out.\n\nWarm regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::DirectOrderPlaced,
        RoleCode::DentistAdmin,
        RoleTemplates::all_channels(
            "[DentistName] has directly placed a new order.",
            "🌟 New Direct Order Alert\n\nHi [RecipientName],\n\n[DentistName] has just placed a new direct order. Please take a moment to review it.",
            "New Direct Order from [DentistName]",
            "Dear [RecipientName],\n\nWe're pleased to inform you that [DentistName] has directly placed a new order with us. Kindly review the order details in our system.\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::OrderPlaced,
        RoleCode::Dentist,
        RoleTemplates::all_channels(
            "Your aligner order for Patient ID [PatientId] has been sent for admin approval.",
            "Hello Team,\n\nThe aligner order for Patient ID [PatientId] is now under admin review. You will be notified when it's approved.\n\nCheers,\n[PortalName]",
            "Aligner Order Sent for Approval - Patient ID [PatientId]",
            "Dear Team,\n\nThe aligner order for Patient ID [PatientId] has been submitted for admin approval. You will be notified once it's approved.\n\nCheers,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::OrderPlaced,
        RoleCode::DentistAdmin,
        RoleTemplates::all_channels(
            "[DentistName] has placed an order. Please review and approve.",
            "📋 New Order Alert: [DentistName]\n\nHi [RecipientName],\n\nJust in: An order has been placed by [DentistName]. Kindly review and approve.",
            "Order from [DentistName] Awaiting Approval",
            "Dear [RecipientName],\n\n[DentistName] has placed an order. Please review and approve it at your earliest convenience.\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::OrderApproved,
        RoleCode::Dentist,
        RoleTemplates::all_channels(
            "Your order for Patient ID [PatientId] has been approved and is now being processed for production.",
            "Hello Dr. [RecipientName],\n\nGreat news! Your order for Patient ID [PatientId] has been approved. We are now processing it for production. We will keep you updated on the status.\n\nBest regards,\n[PortalName]",
            "Order Approved for Patient ID [PatientId]",
            "Dear Dr. [RecipientName],\n\nYour order for Patient ID [PatientId] has been approved and is now being processed. We're excited to move forward with the production and will keep you updated on the progress.\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::OrderManufacturing,
        RoleCode::Dentist,
        RoleTemplates::all_channels(
            "Your aligner order for Patient ID [PatientId] is currently being manufactured.",
            "Hello Dr. [RecipientName],\n\nThe aligner order for Patient ID [PatientId] is now being manufactured. Stay tuned for further updates!\n\nBest regards,\n[PortalName]",
            "Aligner Order in Manufacturing - Patient ID [PatientId]",
            "Hello Dr. [RecipientName],\n\nWe are pleased to inform you that the aligner order for Patient ID [PatientId] is currently in the manufacturing stage.\n\nWe'll update you on the next steps soon.\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::OrderShipped,
        RoleCode::Dentist,
        RoleTemplates::all_channels(
            "Your aligner order for Patient ID [PatientId] has been shipped.",
            "Hello Dr. [RecipientName],\n\nYour aligner order for Patient ID [PatientId] is on its way! We'll notify you upon its arrival.\n\nBest regards,\n[PortalName]",
            "Aligner Order Shipped - Patient ID [PatientId]",
            "Hello Dr. [RecipientName],\n\nGood news! The aligner order for Patient ID [PatientId] has been shipped.\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::OrderDelivered,
        RoleCode::Dentist,
        RoleTemplates::all_channels(
            "Your aligner order for Patient ID [PatientId] has been delivered.",
            "Hi Team,\n\nThe aligner order for Patient ID [PatientId] has been delivered.\n\nBest regards,\n[PortalName]",
            "Aligner Order Delivered - Patient ID [PatientId]",
            "Hello Dr. [RecipientName],\n\nWe're happy to announce that the aligner order for Patient ID [PatientId] has been successfully delivered.\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::OrderDelivered,
        RoleCode::DeliveryCoordinator,
        RoleTemplates::all_channels(
            "An order has been successfully delivered to the clinic.",
            "Hi [RecipientName],\n\nGood news! The order for Patient ID: [PatientId] has been successfully delivered to the clinic. 🎉",
            "Successful Delivery of Order: Patient ID [PatientId]",
            "Hi [RecipientName],\n\nJust a quick update: The order associated with Patient ID [PatientId] has been successfully delivered to the clinic.",
        ),
    );
    table.insert(
        TemplateName::PrivilegeUpdated,
        RoleCode::Dentist,
        RoleTemplates::all_channels(
            "Your user permissions have been updated by admin.",
            "Hi [RecipientName],\n\nYour user permissions have been updated by the admin. Check out the new changes by logging in!\n\nBest,\n[PortalName]",
            "User Permissions Updated",
            "Dear [RecipientName],\n\nThis is to inform you that your user permissions have been updated by the admin. Please log in to view the changes.\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::TreatmentEstimationProvided,
        RoleCode::Dentist,
        RoleTemplates::all_channels(
            "The lab has provided a time estimate for the treatment plan of Patient ID [PatientId].",
            "Hello [RecipientName],\n\nJust a heads-up: We've provided a time estimate for the treatment plan of Patient ID [PatientId]. Please log in to the portal for full details.\n\nBest regards,\n[PortalName]",
            "Time Estimate for Treatment Plan - Patient ID [PatientId]",
            "Dear [RecipientName],\n\nWe have provided a time estimate for the treatment plan associated with Patient ID [PatientId]. Please log in to the portal for full details.\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::ProductionEstimationProvided,
        RoleCode::Dentist,
        RoleTemplates::all_channels(
            "Lab provided a time estimate for the order associated with Patient ID [PatientId].",
            "Hi [RecipientName],\n\nQuick update: Time estimate for Order ID [PatientId] is now available. Please log in to the portal for full details.\n\nBest regards,\n[PortalName]",
            "Order Time Estimate - Patient ID [PatientId]",
            "Dear [RecipientName],\n\nWe've provided a time estimate for the order linked to Patient ID [PatientId]. Please log in to the portal for full details.\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::RemindPayout,
        RoleCode::DentistAdmin,
        RoleTemplates::all_channels(
            "[DueAmount] available for payout. Please clear the payment.",
            "💳 Payment Alert: [DueAmount] Payout\n\nHi [RecipientName],\n\nWe have [DueAmount] ready for payout. Please process this payment at your earliest convenience.\n\nIf you need any assistance, we're here to help.\n\nBest regards,\n[PortalName]",
            "Payout Available - Action Required",
            "Dear Dr. [RecipientName],\n\nWe are writing to inform you that there is an amount of [DueAmount] available for payout.\n\nTo facilitate smooth financial operations, we kindly request you to clear this payment at your earliest convenience. \n\nFor any queries or assistance regarding the payment process, please feel free to contact us.\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::PaymentUpdated,
        RoleCode::DentistAdmin,
        RoleTemplates::all_channels(
            "Admin has revised your payout balance.",
            "🔄 Payout Balance Revision Alert\n\nHi [RecipientName],\n\nQuick heads-up: The LAB Admin has revised your payout balance. Please check your account for the updated details.\n\nBest regards,\n[PortalName]",
            "Update on Your Payout Balance",
            "Dear [RecipientName],\n\nThis is to notify you that the LAB Admin has revised your payout balance. We encourage you to review the updated figures at your earliest convenience.\n\nPlease log in to Portal for detailed information.\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::RemindApproveOrder,
        RoleCode::DentistAdmin,
        RoleTemplates::all_channels(
            "[DentistName]'s order from 2 days ago requires your attention.",
            "🔔 Urgent: [DentistName]'s Pending Order\n\nHi [RecipientName],\n\n[DentistName]'s order from 2 days ago still requires your attention. Please review it as soon as possible to ensure timely processing.",
            "Urgent: Review [DentistName]'s Order",
            "Dear [RecipientName],\n\nPlease review [DentistName]'s order from 2 days ago. Your prompt action is needed.\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::DentistAdded,
        RoleCode::DentistAdmin,
        RoleTemplates::all_channels(
            "A new dentist, [DentistName], has been added to your clinic account. Set their permissions in the portal.",
            "🔔 Clinic Account Update\n\nHi [RecipientName],\n\nA new dentist, [DentistName], has been added to your clinic account. Please set their permissions in the portal.",
            "New Dentist Added to Clinic Account",
            "Dear [RecipientName],\n\nWe would like to inform you that a new dentist, [DentistName], has been added to your clinic account. Kindly set their permissions in the portal at your earliest convenience.\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::DentistAdded,
        RoleCode::LabAdmin,
        RoleTemplates::all_channels(
            "Approval Required: New Dentist Account Request from [ClinicName].",
            "Hi [RecipientName],\n\nThere's a new dentist account request from [ClinicName] awaiting your approval. Please review and respond.\n\nThanks,\n[PortalName]",
            "Approval Needed for New Dentist Account from [ClinicName]",
            "Dear [RecipientName],\n\nWe have received a new dentist account request from [ClinicName]. Your approval is required to proceed.\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::ClinicUpdated,
        RoleCode::DentistAdmin,
        RoleTemplates::all_channels(
            "Your clinic details have been updated by the authorized team member, [DentistName].",
            "🔄 Clinic Update Alert\n\nHi [RecipientName],\n\nYour clinic details have been updated by the authorized team member, [DentistName]. Please review the changes in the portal.\n\nBest regards,\n[PortalName]",
            "Clinic Details Updated by [DentistName]",
            "Dear [RecipientName],\n\nThis is to inform you that [DentistName] has recently updated your clinic details. We recommend reviewing these changes in the portal to ensure accuracy.\n\nThank you,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::DentistAddedByDentist,
        RoleCode::DentistAdmin,
        RoleTemplates::all_channels(
            "A team member, [DentistName], has added a dentist. Please review the changes.",
            "📌 Clinic Update\n\nHi [RecipientName],\n\n[DentistName] has added a new dentist to your clinic. Please review the changes in the portal.\n\nCheers,\n[PortalName]",
            "New Dentist Added by [DentistName]",
            "Dear [RecipientName],\n\nWe want to inform you that [DentistName] has recently added a new dentist to your clinic. We recommend reviewing this update in the portal for accuracy and completeness.\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::RemindDentistApproval,
        RoleCode::LabAdmin,
        RoleTemplates::all_channels(
            "Pending Approval: Dentist Account Request from [ClinicName]",
            "Hi [RecipientName],\n\nA dentist account request from [ClinicName] is still pending approval. Please review and respond.\n\nThanks,\n[PortalName]",
            "Pending Approval for Dentist Account from [ClinicName]",
            "Dear [RecipientName],\n\nThis is a reminder that a dentist account request from [ClinicName] is awaiting your approval.\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::RemindQuoteApproval,
        RoleCode::LabAdmin,
        RoleTemplates::all_channels(
            "Inquiry Approval Pending from last 2 days",
            "Hi [RecipientName],\n\nJust a heads-up: A treatment plan has been awaiting your approval for the last 2 days. Please review.\n\nThanks,\n[PortalName]",
            "Treatment Plan Awaiting Approval",
            "Dear [RecipientName],\n\nA treatment plan has been awaiting your approval for 2 days. Please review it promptly in the portal.\n\nRegards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::RemindSetTreatmentEstimation,
        RoleCode::LabAdmin,
        RoleTemplates::all_channels(
            "[TreatmentPlannerName] has not yet accepted the assigned treatment inquiry.",
            "Hi [RecipientName],\n\nJust a reminder: [TreatmentPlannerName]'s treatment inquiry is still awaiting a response. Kindly check and expedite.\n\nBest,\n[PortalName]",
            "Urgent: Assigned Treatment Inquiry Pending",
            "Dear [RecipientName],\n\nWe would like to inform you that [TreatmentPlannerName] has not yet accepted the assigned treatment inquiry. Prompt action is needed to maintain workflow efficiency.\n\nKindly address this as soon as possible.\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::RemindQuoteDue,
        RoleCode::LabAdmin,
        RoleTemplates::all_channels(
            "Treatment plan presentation is overdue.",
            "Hi [RecipientName],\n\nReminder: The treatment plan presentation assigned to [TreatmentPlannerName] is overdue. Please address this as soon as possible.\n\nThanks,\n[PortalName]",
            "Urgent: Overdue Treatment Plan Presentation",
            "Dear [RecipientName],\n\nWe would like to bring to your attention that the treatment plan presentation is currently overdue. Prompt action is needed.\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::RemindQuoteDue,
        RoleCode::TreatmentPlanner,
        RoleTemplates::all_channels(
            "A query from 2 days ago is still pending. Immediate attention needed.",
            "Hi [RecipientName],\n\nA query from 2 days ago is still pending. Immediate attention is required.\n\nThanks,\n[PortalName]",
            "Urgent: Pending Query from 2 Days Ago",
            "Dear [RecipientName],\n\nA query submitted 2 days ago remains pending. Please address this matter promptly.\n\nRegards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::RemindProductionDue,
        RoleCode::LabAdmin,
        RoleTemplates::all_channels(
            "[ProductionManagerName]: Order deadline is approaching.",
            "Hi [RecipientName],\n\nSystem alert: The deadline for the order assigned to [ProductionManagerName] is nearing. Please review the progress.\n\nThanks,\n[PortalName]",
            "System Alert: Deadline Approaching for [ProductionManagerName]'s Order",
            "Dear [RecipientName],\n\nThis is an automatic update to inform you that the deadline for the order overseen by [ProductionManagerName] is approaching. We recommend checking in for a status update.\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::RemindProductionDue,
        RoleCode::ProductionManager,
        RoleTemplates::all_channels(
            "A deadline for the current production batch is approaching.",
            "Deadline Reminder: Current Production Batch\n\nHi [RecipientName],\n\nThe deadline for our current production batch is nearing. Please check the progress and ensure we're on schedule.\n\nThanks,\n[PortalName]",
            "Reminder: Production Batch Deadline",
            "Dear [RecipientName],\n\nThe deadline for our current production batch is approaching. Please ensure timely completion.\n\nRegards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::ProductionOverDue,
        RoleCode::LabAdmin,
        RoleTemplates::all_channels(
            "Production Manager [ProductionManagerName] has not completed the order, and the deadline has passed.",
            "Hi [RecipientName],\n\nSystem update: [ProductionManagerName] has not completed the order and the deadline has passed. Immediate attention is required.\n\nThanks,\n[PortalName]",
            "System Alert: Missed Deadline by Production Manager [ProductionManagerName]",
            "Dear [RecipientName],\n\nThis is an automated notification to alert you that Production Manager [ProductionManagerName] has not completed the order, and the deadline has now passed. Urgent action may be required to address this issue.\n\nRegards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::AssignedTreatmentPlanner,
        RoleCode::TreatmentPlanner,
        RoleTemplates::all_channels(
            "A new query has been received.",
            "Hi [RecipientName],\n\nA new query has been received. Please check and respond.\n\nThanks,\n[PortalName]",
            "Notification: New Query Received",
            "Dear [RecipientName],\n\nWe would like to inform you that a new query has been received. Please review and address it.\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::AssignedProductionManager,
        RoleCode::ProductionManager,
        RoleTemplates::all_channels(
            "A new order has been received.",
            "Start Manufacturing: New Order Received\n\nHi [RecipientName],\n\nWe've received a new order. Please review and initiate the manufacturing process. Let's ensure timely progress!\n\nThanks,\n[PortalName]",
            "Review Required: New Order Ready for Manufacturing",
            "Dear [RecipientName],\n\nWe have a new order that requires your review. Please assess the details and start the manufacturing process to ensure timely execution.\n\nLooking forward to efficient progress.\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::RemindSetProductionEstimation,
        RoleCode::ProductionManager,
        RoleTemplates::all_channels(
            "Reminder: You have an order pending acceptance.",
            "Order Pending Acceptance\n\nHi [RecipientName],\n\nJust a reminder: You have an order pending acceptance. Please review and take the necessary action soon.\n\nThanks,\n[PortalName]",
            "Action Required: Order Awaiting Your Acceptance",
            "Dear [RecipientName],\n\nWe would like to remind you that there is an order currently awaiting your acceptance. Please take a moment to address this at your earliest convenience.\n\nSincerely,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::AssignedDeliveryCoordinator,
        RoleCode::DeliveryCoordinator,
        RoleTemplates::all_channels(
            "A new order has been placed and is awaiting processing.",
            "Hey [RecipientName],\n\nOur latest order for Patient ID: [PatientId] is prepped for delivery. Please start the dispatch process. Thanks!",
            "Ready for Dispatch: Latest Order (Patient ID: [PatientId])",
            "Hi [RecipientName],\n\nOur latest order, associated with Patient ID: [PatientId], is now ready and awaiting delivery processing. Please proceed with the necessary steps for dispatch.",
        ),
    );
    table.insert(
        TemplateName::RemindShipOrder,
        RoleCode::LabAdmin,
        RoleTemplates::all_channels(
            "Attention needed: Delivery Manager [DeliveryCoordinator] has an outstanding order.",
            "Hi [RecipientName],\n\nSystem alert: Delivery Manager [DeliveryCoordinator] has an outstanding order. Please review and take necessary action.\n\nThanks,\n[PortalName]",
            "Action Required: Outstanding Order by Delivery Manager [DeliveryCoordinator]",
            "Dear [RecipientName],\n\nAn automated system notification indicates that Delivery Manager [DeliveryCoordinator] has an outstanding order that requires your attention. Please assess the situation and take appropriate actions.\n\nBest regards,\n[PortalName]",
        ),
    );
    table.insert(
        TemplateName::RemindShipOrder,
        RoleCode::DeliveryCoordinator,
        RoleTemplates::all_channels(
            "Reminder: An order is still awaiting dispatch. Please address immediately.",
            "Hey [RecipientName],\n\nJust a reminder: We still have an order for Patient ID: [PatientId] awaiting dispatch. Please address this immediately. Thanks!",
            "Immediate Action Required: Order for Patient ID: [PatientId] Dispatch Pending",
            "Hi [RecipientName],\n\nJust a reminder: We have an order for Patient ID: [PatientId] still pending dispatch. Please expedite.",
        ),
    );
    table.insert(
        TemplateName::RemindReceiveOrder,
        RoleCode::Dentist,
        RoleTemplates::all_channels(
            "Reminder: The order for Patient ID [PatientId] has not been received yet. Please expedite the process.",
            "Hello [RecipientName],\n\nJust a reminder: Your order for Patient ID: [PatientId] has been shipped but has yet to be received. Please expedite.",
            "Immediate Action Required: Receive Order",
            "Hello [RecipientName],\n\njust a reminder: Your order for Patient ID: [PatientId] has been shipped but has yet to be received. Please expedite.",
        ),
    );

    table
}
