//! Recipient resolution rules — determines who receives a notification.

use std::collections::BTreeSet;
use std::sync::Arc;

use aidhub_core::types::UserId;
use aidhub_core::{AppError, AppResult};
use aidhub_entity::notification::RecipientType;

use crate::context::RequestContext;
use crate::gateway::DirectoryGateway;

/// Resolves a recipient type (plus any explicit ids) into user ids.
#[derive(Clone)]
pub struct RecipientResolver {
    directory: Arc<dyn DirectoryGateway>,
}

impl std::fmt::Debug for RecipientResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipientResolver").finish()
    }
}

impl RecipientResolver {
    /// Creates a new resolver over the user directory.
    pub fn new(directory: Arc<dyn DirectoryGateway>) -> Self {
        Self { directory }
    }

    /// Resolve the final recipient list for a send.
    ///
    /// Fails with a validation error when the type needs explicit ids and
    /// none resolve, or when nobody would receive the notification.
    pub async fn resolve(
        &self,
        ctx: &RequestContext,
        recipient_type: RecipientType,
        explicit: &[UserId],
    ) -> AppResult<Vec<UserId>> {
        let resolved = match recipient_type {
            RecipientType::Individual => {
                if explicit.is_empty() {
                    return Err(AppError::validation(
                        "An individual notification needs at least one recipient",
                    ));
                }
                explicit.to_vec()
            }
            RecipientType::UniversityStudents => {
                let university = ctx.university.ok_or_else(|| {
                    AppError::validation("Sender has no university to address students of")
                })?;
                self.directory.students_of(university).await?
            }
            RecipientType::AllAdmins => self.directory.admins().await?,
            RecipientType::SingleAdmin => {
                if explicit.len() != 1 {
                    return Err(AppError::validation(
                        "A single-admin notification needs exactly one recipient id",
                    ));
                }
                let user = self
                    .directory
                    .find_user(explicit[0])
                    .await?
                    .ok_or_else(|| AppError::validation("Recipient admin not found"))?;
                if !user.role.is_admin_equivalent() {
                    return Err(AppError::validation("Recipient is not an admin"));
                }
                vec![user.id]
            }
            RecipientType::Superadmin => self.directory.superadmins().await?,
            RecipientType::All => self.directory.all_users().await?,
        };

        // Dedup while keeping first-seen order.
        let mut seen = BTreeSet::new();
        let recipients: Vec<UserId> = resolved
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();

        if recipients.is_empty() {
            return Err(AppError::validation(format!(
                "No recipients resolved for '{recipient_type}'"
            )));
        }
        Ok(recipients)
    }
}
