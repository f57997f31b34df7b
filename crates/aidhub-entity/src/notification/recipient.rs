//! Notification recipient typing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who a notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientType {
    /// An explicit list of users.
    Individual,
    /// Every student of the sender's university.
    UniversityStudents,
    /// Every university admin.
    AllAdmins,
    /// Exactly one named admin.
    SingleAdmin,
    /// The super-admin account(s).
    Superadmin,
    /// Everyone on the platform.
    All,
}

impl RecipientType {
    /// Return the recipient type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::UniversityStudents => "university_students",
            Self::AllAdmins => "all_admins",
            Self::SingleAdmin => "single_admin",
            Self::Superadmin => "superadmin",
            Self::All => "all",
        }
    }

    /// Whether the sender must supply explicit recipient ids for this type.
    pub fn needs_explicit_recipients(&self) -> bool {
        matches!(self, Self::Individual | Self::SingleAdmin)
    }
}

impl fmt::Display for RecipientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecipientType {
    type Err = aidhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "individual" => Ok(Self::Individual),
            "university_students" => Ok(Self::UniversityStudents),
            "all_admins" => Ok(Self::AllAdmins),
            "single_admin" => Ok(Self::SingleAdmin),
            "superadmin" => Ok(Self::Superadmin),
            "all" => Ok(Self::All),
            _ => Err(aidhub_core::AppError::validation(format!(
                "Invalid recipient type: '{s}'"
            ))),
        }
    }
}
