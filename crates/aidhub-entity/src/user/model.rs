//! User entity model.

use serde::{Deserialize, Serialize};

use aidhub_core::types::{UniversityId, UserId};

use super::role::UserRole;

/// A platform user, as much of it as the core needs for addressing and
/// permission checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// The user's role.
    pub role: UserRole,
    /// The user's university, where applicable.
    pub university: Option<UniversityId>,
}
