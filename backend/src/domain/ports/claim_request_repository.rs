//! Request store port.
//!
//! The mutating operations are conditional: each one checks the state it
//! depends on and writes in a single unit of work, so concurrent callers see
//! exactly one winner per item.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{ClaimRequest, ClaimRequestId, ClaimStatus, ItemId, ItemStatus, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by claim request repository adapters.
    pub enum ClaimRequestPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "request repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "request repository query failed: {message}",
    }
}

/// Outcome of filing a request against an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilingOutcome {
    /// The item was claimable and the request was stored.
    Filed,
    /// The item no longer accepts requests; nothing was written.
    ItemUnavailable { status: ItemStatus },
    /// No item with that id exists.
    ItemNotFound,
}

/// Outcome of approving or rejecting a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionOutcome {
    /// The request left `Pending`; carries the updated record.
    Decided(ClaimRequest),
    /// The request was already approved or rejected; nothing changed.
    AlreadyDecided { status: ClaimStatus },
    /// Approval only: the item stopped being claimable; nothing changed.
    ItemUnavailable { item_id: ItemId, status: ItemStatus },
    /// No request with that id exists.
    NotFound,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClaimRequestRepository: Send + Sync {
    /// Store `request` if its item exists and is claimable.
    async fn file_if_claimable(
        &self,
        request: &ClaimRequest,
    ) -> Result<FilingOutcome, ClaimRequestPersistenceError>;

    /// Approve a pending request and mark its item `Claimed`, both or neither.
    async fn approve_pending(
        &self,
        id: &ClaimRequestId,
        approved_on: NaiveDate,
    ) -> Result<DecisionOutcome, ClaimRequestPersistenceError>;

    /// Reject a pending request. The item is not touched.
    async fn reject_pending(
        &self,
        id: &ClaimRequestId,
    ) -> Result<DecisionOutcome, ClaimRequestPersistenceError>;

    /// Fetch a request by identifier.
    async fn find_by_id(
        &self,
        id: &ClaimRequestId,
    ) -> Result<Option<ClaimRequest>, ClaimRequestPersistenceError>;

    /// Every request, newest first.
    async fn list_all(&self) -> Result<Vec<ClaimRequest>, ClaimRequestPersistenceError>;

    /// Requests filed by `requester`, newest first.
    async fn list_by_requester(
        &self,
        requester: &UserId,
    ) -> Result<Vec<ClaimRequest>, ClaimRequestPersistenceError>;

    /// Requests filed against `item_id`, newest first.
    async fn list_by_item(
        &self,
        item_id: &ItemId,
    ) -> Result<Vec<ClaimRequest>, ClaimRequestPersistenceError>;

    /// Delete a request. Returns `false` when it does not exist.
    async fn delete(&self, id: &ClaimRequestId) -> Result<bool, ClaimRequestPersistenceError>;
}
