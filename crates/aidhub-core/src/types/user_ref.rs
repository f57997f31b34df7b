//! Loose-equality user references as they appear on the wire.
//!
//! Historical payloads carry the same logical user in three shapes: a raw
//! UUID, a populated object with an `id` field, or a plain string. Rather
//! than comparing those shapes ad hoc at every call site, [`UserRef`]
//! normalizes to a [`UserId`] once and every equality check goes through
//! that normalization.

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// A reference to a user in any of its historical wire representations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    /// A bare identifier.
    Id(UserId),
    /// A populated user object (id plus denormalized display fields).
    Populated(PopulatedUser),
    /// A raw string, expected to contain a UUID.
    Raw(String),
}

/// The populated-object form of a user reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulatedUser {
    /// The user's identifier.
    pub id: UserId,
    /// Optional display name carried by the populated form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl UserRef {
    /// Normalize this reference to its underlying identifier.
    ///
    /// Returns `None` only for raw strings that do not parse as a UUID.
    pub fn normalized(&self) -> Option<UserId> {
        match self {
            Self::Id(id) => Some(*id),
            Self::Populated(user) => Some(user.id),
            Self::Raw(raw) => raw.trim().parse().ok(),
        }
    }

    /// Check whether this reference denotes the given user.
    pub fn matches(&self, user_id: &UserId) -> bool {
        self.normalized().is_some_and(|id| id == *user_id)
    }
}

impl PartialEq for UserRef {
    fn eq(&self, other: &Self) -> bool {
        match (self.normalized(), other.normalized()) {
            (Some(a), Some(b)) => a == b,
            // Unparseable raws only equal an identical raw string.
            (None, None) => match (self, other) {
                (Self::Raw(a), Self::Raw(b)) => a == b,
                _ => false,
            },
            _ => false,
        }
    }
}

impl From<UserId> for UserRef {
    fn from(id: UserId) -> Self {
        Self::Id(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_representations_match_same_user() {
        let id = UserId::new();
        let as_id = UserRef::Id(id);
        let as_populated = UserRef::Populated(PopulatedUser {
            id,
            name: Some("Amina".to_string()),
        });
        let as_raw = UserRef::Raw(id.to_string());

        assert!(as_id.matches(&id));
        assert!(as_populated.matches(&id));
        assert!(as_raw.matches(&id));

        assert_eq!(as_id, as_populated);
        assert_eq!(as_populated, as_raw);
        assert_eq!(as_id, as_raw);
    }

    #[test]
    fn test_different_users_do_not_match() {
        let a = UserId::new();
        let b = UserId::new();
        assert!(!UserRef::Id(a).matches(&b));
        assert_ne!(UserRef::Id(a), UserRef::Raw(b.to_string()));
    }

    #[test]
    fn test_unparseable_raw_never_matches() {
        let garbage = UserRef::Raw("not-a-uuid".to_string());
        assert!(garbage.normalized().is_none());
        assert!(!garbage.matches(&UserId::new()));
        assert_eq!(garbage, UserRef::Raw("not-a-uuid".to_string()));
    }

    #[test]
    fn test_untagged_deserialization() {
        let id = UserId::new();

        let bare = serde_json::json!(id.to_string());
        let parsed: UserRef = serde_json::from_value(bare).expect("bare id");
        assert!(parsed.matches(&id));

        let populated = serde_json::json!({ "id": id.to_string(), "name": "Amina" });
        let parsed: UserRef = serde_json::from_value(populated).expect("populated");
        assert!(parsed.matches(&id));
    }
}
