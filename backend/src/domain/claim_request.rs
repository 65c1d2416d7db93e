//! Claim requests filed by users against items.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::identifier::uuid_identifier;
use super::{ItemId, UserId};

/// Validation errors raised by claim request value types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClaimRequestValidationError {
    #[error("request id must be a valid UUID")]
    InvalidId,
    #[error("unknown request status: {0}")]
    UnknownStatus(String),
}

uuid_identifier!(
    /// Stable claim request identifier.
    ClaimRequestId,
    ClaimRequestValidationError,
    ClaimRequestValidationError::InvalidId
);

/// Decision status of a claim request. `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    Pending,
    Approved,
    Rejected,
}

impl ClaimStatus {
    /// Stable wire/storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Whether the request is still awaiting a decision.
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = ClaimRequestValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            _ => Err(ClaimRequestValidationError::UnknownStatus(s.to_owned())),
        }
    }
}

/// Stored claim request record.
///
/// ## Invariants
/// - `approved_date` is `Some` exactly when `status` is `Approved`.
/// - Once `status` leaves `Pending` it never changes again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRequest {
    pub id: ClaimRequestId,
    pub item_id: ItemId,
    pub requester: UserId,
    pub status: ClaimStatus,
    pub requested_at: DateTime<Utc>,
    pub approved_date: Option<NaiveDate>,
}

impl ClaimRequest {
    /// A freshly filed request: new identity, `Pending`, stamped `now`.
    pub fn file(item_id: ItemId, requester: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: ClaimRequestId::random(),
            item_id,
            requester,
            status: ClaimStatus::Pending,
            requested_at: now,
            approved_date: None,
        }
    }

    /// The approved form of this request.
    #[must_use]
    pub fn approved(mut self, on: NaiveDate) -> Self {
        self.status = ClaimStatus::Approved;
        self.approved_date = Some(on);
        self
    }

    /// The rejected form of this request.
    #[must_use]
    pub fn rejected(mut self) -> Self {
        self.status = ClaimStatus::Rejected;
        self
    }
}
