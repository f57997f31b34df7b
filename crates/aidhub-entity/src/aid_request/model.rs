//! Aid request entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use aidhub_core::types::{AidRequestId, UniversityId, UserId};

use super::category::AidCategory;
use super::status::AidStatus;

/// One requested in-kind item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedItem {
    /// Item name, matched against inventory by exact name.
    pub name: String,
    /// Requested unit count.
    pub quantity: u32,
}

/// A request for financial or in-kind support.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AidRequest {
    /// Unique request identifier.
    pub id: AidRequestId,
    /// Human-readable request code shown to users.
    pub request_code: String,
    /// The requesting user.
    pub requester: UserId,
    /// The requester's university, when known.
    pub university: Option<UniversityId>,
    /// Category of support.
    pub category: AidCategory,
    /// Requested amount in minor currency units (financial requests).
    pub amount: Option<i64>,
    /// Requested items (essentials requests).
    #[serde(default)]
    pub items: Vec<RequestedItem>,
    /// Free-text explanation from the requester.
    pub reason: String,
    /// Current lifecycle status.
    pub status: AidStatus,
    /// Whether verification needs an explicit emergency-override confirmation.
    #[serde(default)]
    pub emergency_override_required: bool,
    /// Reason recorded when the request was rejected.
    pub rejected_reason: Option<String>,
    /// Note recorded when an admin asked for clarification.
    pub clarification_note: Option<String>,
    /// The requester's reply to a clarification note.
    pub clarification_response: Option<String>,
    /// When the clarification reply was recorded.
    pub clarification_response_at: Option<DateTime<Utc>>,
    /// When the request was submitted.
    pub created_at: DateTime<Utc>,
    /// When the second approval was granted.
    pub approved_at: Option<DateTime<Utc>>,
    /// When funds or items left the pool.
    pub disbursed_at: Option<DateTime<Utc>>,
}

impl AidRequest {
    /// Check if the request can never change status again.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// The financial amount, or zero for essentials requests.
    pub fn amount_or_zero(&self) -> i64 {
        self.amount.unwrap_or(0)
    }
}
