//! Per-request caller context.

use aidhub_core::types::{UniversityId, UserId};
use aidhub_entity::user::{User, UserRole};

/// Who is performing an operation, carried into every service call.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The acting user.
    pub user_id: UserId,
    /// The acting user's role.
    pub role: UserRole,
    /// The acting user's university, where applicable.
    pub university: Option<UniversityId>,
}

impl RequestContext {
    /// Create a context from its parts.
    pub fn new(user_id: UserId, role: UserRole, university: Option<UniversityId>) -> Self {
        Self {
            user_id,
            role,
            university,
        }
    }

    /// Create a context for a known user.
    pub fn for_user(user: &User) -> Self {
        Self::new(user.id, user.role, user.university)
    }

    /// Check if the caller carries admin privileges.
    pub fn is_admin_equivalent(&self) -> bool {
        self.role.is_admin_equivalent()
    }
}
