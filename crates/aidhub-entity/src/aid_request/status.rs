//! Aid request status enumeration and transition table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of an aid request.
///
/// The transition graph is owned by [`AidStatus::can_transition`]; every
/// status change in the system goes through that single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AidStatus {
    /// Submitted, waiting for an admin to act.
    PendingAdmin,
    /// An admin asked the requester for more detail.
    ClarificationRequired,
    /// Verified, waiting for the second approval.
    SecondApprovalPending,
    /// Approved but the pool cannot currently cover it.
    WaitingFunds,
    /// Funds or items have left the pool.
    Disbursed,
    /// Rejected with a reason.
    Rejected,
}

impl AidStatus {
    /// Every status, for exhaustive iteration.
    pub const ALL: [AidStatus; 6] = [
        Self::PendingAdmin,
        Self::ClarificationRequired,
        Self::SecondApprovalPending,
        Self::WaitingFunds,
        Self::Disbursed,
        Self::Rejected,
    ];

    /// Check whether a direct transition from `self` to `to` is legal.
    pub fn can_transition(self, to: AidStatus) -> bool {
        use AidStatus::*;
        matches!(
            (self, to),
            (PendingAdmin, SecondApprovalPending)
                | (PendingAdmin, ClarificationRequired)
                | (PendingAdmin, Rejected)
                | (ClarificationRequired, PendingAdmin)
                | (ClarificationRequired, SecondApprovalPending)
                | (SecondApprovalPending, Disbursed)
                | (SecondApprovalPending, WaitingFunds)
                | (WaitingFunds, Disbursed)
                | (WaitingFunds, SecondApprovalPending)
        )
    }

    /// Check if the request can never change status again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Disbursed | Self::Rejected)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingAdmin => "pending_admin",
            Self::ClarificationRequired => "clarification_required",
            Self::SecondApprovalPending => "second_approval_pending",
            Self::WaitingFunds => "waiting_funds",
            Self::Disbursed => "disbursed",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for AidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AidStatus {
    type Err = aidhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_admin" => Ok(Self::PendingAdmin),
            "clarification_required" => Ok(Self::ClarificationRequired),
            "second_approval_pending" => Ok(Self::SecondApprovalPending),
            "waiting_funds" => Ok(Self::WaitingFunds),
            "disbursed" => Ok(Self::Disbursed),
            "rejected" => Ok(Self::Rejected),
            _ => Err(aidhub_core::AppError::validation(format!(
                "Invalid aid request status: '{s}'"
            ))),
        }
    }
}
