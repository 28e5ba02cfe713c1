//! # Template Manager
//!
//! Renders role- and channel-specific text for notifications.
//!
//! ## Overview
//!
//! The catalogue is an immutable table keyed by `(TemplateName, RoleCode)` with
//! one entry per [`Channel`], built once when the manager is constructed.
//! Rendering is a pure function of the table, the caller's data map, and the
//! portal name, which is injected into every call as `PortalName`.
//!
//! ## Placeholders
//!
//! `[Key]` tokens are replaced with `data[Key]`. A key that is absent, or whose
//! value is empty, leaves the literal `[Key]` token in the output.
//!
//! ## Email Format
//!
//! The email channel stores a subject and a body and renders them as
//! `Subject: <subject>\n\n<body>`; [`split_rendered_email`] is the inverse
//! used by the dispatcher.
//!
//! ## Usage
//!
//! ```rust
//! use labflow_core::constants::RoleCode;
//! use labflow_core::templates::{Channel, TemplateData, TemplateManager, TemplateName};
//!
//! let manager = TemplateManager::default();
//! let mut data = TemplateData::new();
//! data.insert("PatientId".to_string(), "P1".to_string());
//!
//! let text = manager
//!     .get_template(TemplateName::OrderShipped, RoleCode::Dentist, Channel::Notification, &data)
//!     .unwrap();
//! assert!(text.contains("P1"));
//! ```

mod catalog;

use crate::constants::{system, NotificationType, RoleCode};
use crate::error::{Result, WorkflowError};
use crate::models::NotificationDraft;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;
use uuid::Uuid;

/// Caller-supplied placeholder values
pub type TemplateData = HashMap<String, String>;

/// Build a [`TemplateData`] from key/value pairs
pub fn template_data<const N: usize>(pairs: [(&str, String); N]) -> TemplateData {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

fn placeholder_pattern() -> &'static Regex {
    PLACEHOLDER.get_or_init(|| Regex::new(r"\[(\w+)\]").unwrap())
}

/// Delivery channel a template variant is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
    Notification,
    Whatsapp,
    Email,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Notification, Channel::Whatsapp, Channel::Email];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Notification => "NOTIFICATION",
            Channel::Whatsapp => "WHATSAPP",
            Channel::Email => "EMAIL",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every template the catalogue knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TemplateName {
    QuoteApproved,
    QuoteSentToRework,
    RemindReviewQuote,
    RemindImpressionPending,
    ImpressionReceived,
    DirectOrderPlaced,
    OrderPlaced,
    OrderApproved,
    OrderManufacturing,
    OrderShipped,
    OrderDelivered,
    PrivilegeUpdated,
    TreatmentEstimationProvided,
    ProductionEstimationProvided,
    RemindPayout,
    PaymentUpdated,
    RemindApproveOrder,
    DentistAdded,
    ClinicUpdated,
    DentistAddedByDentist,
    RemindDentistApproval,
    RemindQuoteApproval,
    RemindSetTreatmentEstimation,
    RemindQuoteDue,
    RemindProductionDue,
    ProductionOverDue,
    AssignedTreatmentPlanner,
    AssignedProductionManager,
    RemindSetProductionEstimation,
    AssignedDeliveryCoordinator,
    RemindShipOrder,
    RemindReceiveOrder,
}

impl TemplateName {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateName::QuoteApproved => "quoteApproved",
            TemplateName::QuoteSentToRework => "quoteSentToRework",
            TemplateName::RemindReviewQuote => "remindReviewQuote",
            TemplateName::RemindImpressionPending => "remindImpressionPending",
            TemplateName::ImpressionReceived => "impressionReceived",
            TemplateName::DirectOrderPlaced => "directOrderPlaced",
            TemplateName::OrderPlaced => "orderPlaced",
            TemplateName::OrderApproved => "orderApproved",
            TemplateName::OrderManufacturing => "orderManufacturing",
            TemplateName::OrderShipped => "orderShipped",
            TemplateName::OrderDelivered => "orderDelivered",
            TemplateName::PrivilegeUpdated => "privilegeUpdated",
            TemplateName::TreatmentEstimationProvided => "treatmentEstimationProvided",
            TemplateName::ProductionEstimationProvided => "productionEstimationProvided",
            TemplateName::RemindPayout => "remindPayout",
            TemplateName::PaymentUpdated => "paymentUpdated",
            TemplateName::RemindApproveOrder => "remindApproveOrder",
            TemplateName::DentistAdded => "dentistAdded",
            TemplateName::ClinicUpdated => "clinicUpdated",
            TemplateName::DentistAddedByDentist => "dentistAddedByDentist",
            TemplateName::RemindDentistApproval => "remindDentistApproval",
            TemplateName::RemindQuoteApproval => "remindQuoteApproval",
            TemplateName::RemindSetTreatmentEstimation => "remindSetTreatmentEstimation",
            TemplateName::RemindQuoteDue => "remindQuoteDue",
            TemplateName::RemindProductionDue => "remindProductionDue",
            TemplateName::ProductionOverDue => "productionOverDue",
            TemplateName::AssignedTreatmentPlanner => "assignedTreatmentPlanner",
            TemplateName::AssignedProductionManager => "assignedProductionManager",
            TemplateName::RemindSetProductionEstimation => "remindSetProductionEstimation",
            TemplateName::AssignedDeliveryCoordinator => "assignedDeliveryCoordinator",
            TemplateName::RemindShipOrder => "remindShipOrder",
            TemplateName::RemindReceiveOrder => "remindReceiveOrder",
        }
    }
}

impl fmt::Display for TemplateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EmailTemplate {
    pub subject: &'static str,
    pub body: &'static str,
}

/// Channel variants of one template for one role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RoleTemplates {
    pub notification: Option<&'static str>,
    pub whatsapp: Option<&'static str>,
    pub email: Option<EmailTemplate>,
}

impl RoleTemplates {
    pub(crate) fn all_channels(
        notification: &'static str,
        whatsapp: &'static str,
        subject: &'static str,
        body: &'static str,
    ) -> Self {
        Self {
            notification: Some(notification),
            whatsapp: Some(whatsapp),
            email: Some(EmailTemplate { subject, body }),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct TemplateTable {
    entries: HashMap<TemplateName, HashMap<RoleCode, RoleTemplates>>,
}

impl TemplateTable {
    pub(crate) fn insert(&mut self, name: TemplateName, role: RoleCode, templates: RoleTemplates) {
        self.entries.entry(name).or_default().insert(role, templates);
    }

    fn lookup(&self, name: TemplateName, role: RoleCode) -> Option<&RoleTemplates> {
        self.entries.get(&name).and_then(|roles| roles.get(&role))
    }
}

/// Process-wide, immutable template renderer
#[derive(Debug)]
pub struct TemplateManager {
    templates: TemplateTable,
    portal_name: String,
}

impl Default for TemplateManager {
    fn default() -> Self {
        Self::new(system::DEFAULT_PORTAL_NAME)
    }
}

impl TemplateManager {
    pub fn new(portal_name: impl Into<String>) -> Self {
        Self {
            templates: catalog::builtin_templates(),
            portal_name: portal_name.into(),
        }
    }

    pub fn portal_name(&self) -> &str {
        &self.portal_name
    }

    /// Render one channel of a template.
    ///
    /// Fails with [`WorkflowError::TemplateNotFound`] when the template has no
    /// entry for `role`, or the role's entry has no variant for `channel`.
    pub fn get_template(
        &self,
        name: TemplateName,
        role: RoleCode,
        channel: Channel,
        data: &TemplateData,
    ) -> Result<String> {
        let not_found = || WorkflowError::TemplateNotFound {
            name: name.to_string(),
            role: role.to_string(),
            channel: channel.to_string(),
        };

        let role_templates = self.templates.lookup(name, role).ok_or_else(not_found)?;

        match channel {
            Channel::Notification => role_templates
                .notification
                .map(|text| self.fill(text, data))
                .ok_or_else(not_found),
            Channel::Whatsapp => role_templates
                .whatsapp
                .map(|text| self.fill(text, data))
                .ok_or_else(not_found),
            Channel::Email => role_templates
                .email
                .map(|email| {
                    format!(
                        "Subject: {}\n\n{}",
                        self.fill(email.subject, data),
                        self.fill(email.body, data)
                    )
                })
                .ok_or_else(not_found),
        }
    }

    /// Build a draft with every channel rendered for one recipient
    pub fn render_draft(
        &self,
        name: TemplateName,
        role: RoleCode,
        notification_type: NotificationType,
        recipient: Uuid,
        data: &TemplateData,
    ) -> Result<NotificationDraft> {
        let description = self.get_template(name, role, Channel::Notification, data)?;
        let email = self.get_template(name, role, Channel::Email, data)?;
        let whatsapp = self.get_template(name, role, Channel::Whatsapp, data)?;

        Ok(NotificationDraft::new(notification_type, recipient, description)
            .with_email(email)
            .with_whatsapp(whatsapp))
    }

    /// Whether a `(name, role, channel)` combination resolves
    pub fn has_template(&self, name: TemplateName, role: RoleCode, channel: Channel) -> bool {
        self.templates
            .lookup(name, role)
            .map(|templates| match channel {
                Channel::Notification => templates.notification.is_some(),
                Channel::Whatsapp => templates.whatsapp.is_some(),
                Channel::Email => templates.email.is_some(),
            })
            .unwrap_or(false)
    }

    fn fill(&self, template: &str, data: &TemplateData) -> String {
        replace_placeholders(template, |key| {
            if key == "PortalName" {
                Some(self.portal_name.as_str())
            } else {
                data.get(key).map(String::as_str)
            }
        })
    }
}

/// Replace `[Key]` tokens with `data[Key]`, leaving unknown or empty keys as-is
pub fn fill_template_with_data(template: &str, data: &TemplateData) -> String {
    replace_placeholders(template, |key| data.get(key).map(String::as_str))
}

fn replace_placeholders<'a>(template: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    placeholder_pattern()
        .replace_all(template, |caps: &Captures<'_>| match lookup(&caps[1]) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => caps[0].to_string(),
        })
        .into_owned()
}

/// Split a rendered email back into `(subject, body)`.
///
/// The subject is the first line with any `Subject: ` prefix removed; the body
/// is everything after it with the separating blank line trimmed.
pub fn split_rendered_email(rendered: &str) -> (String, String) {
    let (first_line, rest) = rendered.split_once('\n').unwrap_or((rendered, ""));
    let subject = first_line
        .strip_prefix("Subject: ")
        .unwrap_or(first_line)
        .trim()
        .to_string();
    let body = rest.trim_start_matches('\n').trim().to_string();
    (subject, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(pairs: &[(&str, &str)]) -> TemplateData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_email_is_flattened_with_subject_header() {
        let manager = TemplateManager::default();
        let rendered = manager
            .get_template(
                TemplateName::RemindImpressionPending,
                RoleCode::Dentist,
                Channel::Email,
                &data(&[("PatientId", "P1"), ("RecipientName", "Dr. Lee")]),
            )
            .unwrap();

        assert!(rendered.starts_with("Subject: Pending Aligner Impression for Patient ID P1\n\n"));
        assert!(rendered.ends_with("Deutsche Aligners"));
        assert!(!rendered.contains("[PatientId]"));
    }

    #[test]
    fn test_missing_role_is_an_error() {
        let manager = TemplateManager::default();
        let err = manager
            .get_template(
                TemplateName::OrderShipped,
                RoleCode::LabAdmin,
                Channel::Notification,
                &TemplateData::new(),
            )
            .unwrap_err();
        assert!(matches!(err, WorkflowError::TemplateNotFound { .. }));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_missing_channel_is_an_error() {
        let mut table = TemplateTable::default();
        table.insert(
            TemplateName::OrderShipped,
            RoleCode::Dentist,
            RoleTemplates {
                notification: Some("shipped"),
                ..Default::default()
            },
        );
        let manager = TemplateManager {
            templates: table,
            portal_name: "Portal".to_string(),
        };

        let ok = manager.get_template(
            TemplateName::OrderShipped,
            RoleCode::Dentist,
            Channel::Notification,
            &TemplateData::new(),
        );
        assert_eq!(ok.unwrap(), "shipped");

        let err = manager.get_template(
            TemplateName::OrderShipped,
            RoleCode::Dentist,
            Channel::Whatsapp,
            &TemplateData::new(),
        );
        assert!(matches!(err, Err(WorkflowError::TemplateNotFound { .. })));
    }

    #[test]
    fn test_fill_leaves_unknown_and_empty_tokens() {
        assert_eq!(fill_template_with_data("Hi [Foo]", &TemplateData::new()), "Hi [Foo]");
        assert_eq!(
            fill_template_with_data("Hi [Foo] [Bar]", &data(&[("Foo", ""), ("Bar", "x")])),
            "Hi [Foo] x"
        );
        assert_eq!(
            fill_template_with_data("[Not A Key]", &data(&[("Not A Key", "x")])),
            "[Not A Key]"
        );
    }

    #[test]
    fn test_portal_name_overrides_caller_data() {
        let manager = TemplateManager::new("Acme Labs");
        let rendered = manager
            .get_template(
                TemplateName::PrivilegeUpdated,
                RoleCode::Dentist,
                Channel::Whatsapp,
                &data(&[("PortalName", "spoofed"), ("RecipientName", "Ana")]),
            )
            .unwrap();
        assert!(rendered.ends_with("Acme Labs"));
        assert!(!rendered.contains("spoofed"));
    }

    #[test]
    fn test_render_draft_fills_every_channel() {
        let manager = TemplateManager::default();
        let recipient = Uuid::new_v4();
        let draft = manager
            .render_draft(
                TemplateName::AssignedTreatmentPlanner,
                RoleCode::TreatmentPlanner,
                NotificationType::AssignTreatmentPlanner,
                recipient,
                &data(&[("RecipientName", "Tom")]),
            )
            .unwrap();

        assert_eq!(draft.user, recipient);
        assert_eq!(draft.description, "A new query has been received.");
        assert!(draft.email.as_deref().unwrap().starts_with("Subject: "));
        assert!(draft.whatsapp.as_deref().unwrap().contains("Tom"));
    }

    #[test]
    fn test_split_rendered_email() {
        let (subject, body) = split_rendered_email("Subject: Hello\n\nLine one\nLine two");
        assert_eq!(subject, "Hello");
        assert_eq!(body, "Line one\nLine two");

        let (subject, body) = split_rendered_email("No header");
        assert_eq!(subject, "No header");
        assert_eq!(body, "");
    }

    #[test]
    fn test_catalogue_has_no_spaced_placeholders() {
        let manager = TemplateManager::default();
        for (name, roles) in &manager.templates.entries {
            for (role, templates) in roles {
                let email = templates.email.unwrap();
                for text in [
                    templates.notification.unwrap(),
                    templates.whatsapp.unwrap(),
                    email.subject,
                    email.body,
                ] {
                    assert!(
                        !text.contains("[Clinic Name]") && !text.contains("${"),
                        "{name}/{role} contains a malformed placeholder"
                    );
                }
            }
        }
    }
}
