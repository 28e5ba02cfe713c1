//! Dentist accounts: creation and privilege changes.

use super::response_window;
use crate::constants::{AssociatedType, NotificationType, RoleCode, TaskType};
use crate::error::Result;
use crate::events::bus::EventListener;
use crate::events::types::{DomainEvent, EventKind};
use crate::models::{NewTask, NotificationDraft, TaskDetails, UserRecord};
use crate::orchestration::context::WorkflowContext;
use crate::templates::{template_data, TemplateName};
use async_trait::async_trait;
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct UserEventHandler {
    ctx: WorkflowContext,
}

impl UserEventHandler {
    pub const EVENTS: &'static [EventKind] = &[EventKind::DentistCreated, EventKind::PrivilegeUpdated];

    pub fn new(ctx: WorkflowContext) -> Self {
        Self { ctx }
    }

    /// Who hears about a new dentist depends on who created the account.
    ///
    /// A dentist or dentist admin adding a colleague needs lab approval: the
    /// lab admins are told and an approval reminder starts. A dentist adding
    /// one also tells the clinic's dentist admins. A lab admin creating the
    /// account only informs the clinic's dentist admins.
    async fn dentist_created(&self, dentist_id: Uuid, created_by: Uuid) -> Result<()> {
        let Some(dentist) = self.ctx.entities.find_user(dentist_id).await? else {
            return Ok(());
        };
        let Some(creator) = self.ctx.entities.find_user(created_by).await? else {
            return Ok(());
        };
        let clinic = match dentist.clinic {
            Some(clinic) => self.ctx.entities.find_clinic(clinic).await?,
            None => None,
        };
        let clinic_name = clinic.as_ref().map(|c| c.name.clone()).unwrap_or_default();

        match creator.role {
            Some(RoleCode::Dentist) | Some(RoleCode::DentistAdmin) => {
                let mut drafts = Vec::new();
                for admin in self.ctx.lab_admins(dentist.lab).await? {
                    drafts.push(self.ctx.render(
                        TemplateName::DentistAdded,
                        RoleCode::LabAdmin,
                        NotificationType::NewDentistCreated,
                        admin.id,
                        &template_data([
                            ("RecipientName", admin.name),
                            ("ClinicName", clinic_name.clone()),
                        ]),
                        (dentist.id, AssociatedType::Dentist),
                    )?);
                }

                if creator.role == Some(RoleCode::Dentist) {
                    if let Some(clinic) = &clinic {
                        drafts.extend(
                            self.notify_clinic_admins(
                                &dentist,
                                clinic.id,
                                TemplateName::DentistAddedByDentist,
                                &creator.name,
                                &clinic_name,
                            )
                            .await?,
                        );
                    }
                }
                self.ctx.enqueue_all(drafts).await?;

                let now = self.ctx.clock.now();
                self.ctx
                    .create_task(NewTask::new(
                        TaskType::ApproveDentist,
                        now + response_window(),
                        TaskDetails::dentist(dentist.id),
                    ))
                    .await?;
            }
            Some(RoleCode::LabAdmin) => {
                if let Some(clinic) = &clinic {
                    let drafts = self
                        .notify_clinic_admins(
                            &dentist,
                            clinic.id,
                            TemplateName::DentistAdded,
                            &dentist.name,
                            &clinic_name,
                        )
                        .await?;
                    self.ctx.enqueue_all(drafts).await?;
                }
            }
            other => {
                debug!(creator = %creator.id, role = ?other, "Dentist created by a role that notifies nobody");
            }
        }
        Ok(())
    }

    async fn notify_clinic_admins(
        &self,
        dentist: &UserRecord,
        clinic: Uuid,
        template: TemplateName,
        dentist_name: &str,
        clinic_name: &str,
    ) -> Result<Vec<NotificationDraft>> {
        self.ctx
            .dentist_admins(dentist.lab, Some(clinic))
            .await?
            .into_iter()
            .map(|admin| {
                self.ctx.render(
                    template,
                    RoleCode::DentistAdmin,
                    NotificationType::NewDentistCreated,
                    admin.id,
                    &template_data([
                        ("DentistName", dentist_name.to_string()),
                        ("RecipientName", admin.name),
                        ("ClinicName", clinic_name.to_string()),
                    ]),
                    (dentist.id, AssociatedType::Dentist),
                )
            })
            .collect()
    }

    async fn privilege_updated(&self, user_id: Uuid) -> Result<()> {
        let Some(user) = self.ctx.entities.find_user(user_id).await? else {
            return Ok(());
        };

        let draft = self.ctx.render(
            TemplateName::PrivilegeUpdated,
            RoleCode::Dentist,
            NotificationType::UpdatePrivilege,
            user.id,
            &template_data([("RecipientName", user.name)]),
            (user.id, AssociatedType::Dentist),
        )?;
        self.ctx.enqueue_all(vec![draft]).await?;
        Ok(())
    }
}

#[async_trait]
impl EventListener for UserEventHandler {
    fn name(&self) -> &str {
        "user_handler"
    }

    #[instrument(skip(self, event), fields(event = event.name()))]
    async fn handle(&self, event: &DomainEvent) -> Result<()> {
        match event {
            DomainEvent::DentistCreated {
                dentist,
                created_by,
            } => self.dentist_created(*dentist, *created_by).await,
            DomainEvent::PrivilegeUpdated { user } => self.privilege_updated(*user).await,
            _ => Ok(()),
        }
    }
}
