//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles available on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// A student who can submit aid requests.
    Student,
    /// A donor contributing funds or items.
    Donor,
    /// An admin for one university's students and requests.
    UniversityAdmin,
    /// The platform-wide administrator.
    Superadmin,
}

impl UserRole {
    /// Check if this role carries admin privileges.
    pub fn is_admin_equivalent(&self) -> bool {
        matches!(self, Self::UniversityAdmin | Self::Superadmin)
    }

    /// Check if this role is the super-admin.
    pub fn is_superadmin(&self) -> bool {
        matches!(self, Self::Superadmin)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Donor => "donor",
            Self::UniversityAdmin => "university_admin",
            Self::Superadmin => "superadmin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = aidhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "donor" => Ok(Self::Donor),
            "university_admin" => Ok(Self::UniversityAdmin),
            "superadmin" => Ok(Self::Superadmin),
            _ => Err(aidhub_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: student, donor, university_admin, superadmin"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_equivalence() {
        assert!(UserRole::UniversityAdmin.is_admin_equivalent());
        assert!(UserRole::Superadmin.is_admin_equivalent());
        assert!(!UserRole::Student.is_admin_equivalent());
        assert!(!UserRole::Donor.is_admin_equivalent());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("student".parse::<UserRole>().unwrap(), UserRole::Student);
        assert_eq!(
            "SUPERADMIN".parse::<UserRole>().unwrap(),
            UserRole::Superadmin
        );
        assert!("staff".parse::<UserRole>().is_err());
    }
}
