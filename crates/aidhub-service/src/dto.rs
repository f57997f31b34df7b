//! Input DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use aidhub_core::types::UserId;
use aidhub_core::{AppError, AppResult};
use aidhub_entity::aid_request::AidCategory;
use aidhub_entity::notification::RecipientType;

/// Run derive-based validation and map failures into the error taxonomy.
pub(crate) fn validate_input(input: &impl Validate) -> AppResult<()> {
    input
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))
}

/// New aid request submission.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitAidRequest {
    /// Category of support.
    pub category: AidCategory,
    /// Requested amount in minor currency units (financial requests).
    pub amount: Option<i64>,
    /// Requested items (essentials requests).
    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<RequestedItemInput>,
    /// Free-text explanation.
    #[validate(length(min = 1, message = "A reason is required"))]
    pub reason: String,
    /// Whether the request needs expedited, override-gated handling.
    #[serde(default)]
    pub emergency: bool,
}

/// One requested item line.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RequestedItemInput {
    /// Item name.
    #[validate(length(min = 1, message = "Item name is required"))]
    pub name: String,
    /// Requested unit count.
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: u32,
}

/// New notification to send.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendNotification {
    /// Notification title.
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    /// Notification body.
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
    /// How to address the recipients.
    pub recipient_type: RecipientType,
    /// Explicit recipient ids, where the type requires them.
    #[serde(default)]
    pub recipients: Vec<UserId>,
}

/// Partial edit of a sent notification.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NotificationPatch {
    /// Replacement title.
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    /// Replacement body.
    #[validate(length(min = 1, message = "Message cannot be empty"))]
    pub message: Option<String>,
}
