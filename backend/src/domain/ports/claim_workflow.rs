//! Driving port for the claim workflow.
//!
//! Inbound adapters call this port with the caller's [`AccessContext`]; the
//! implementation performs every authorization check itself.

use async_trait::async_trait;

use crate::domain::{AccessContext, ClaimRequest, ClaimRequestId, Error, ItemId, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClaimWorkflow: Send + Sync {
    /// File a request against `item_id` on behalf of `requester`, or of the
    /// caller when `requester` is `None`.
    async fn file_request(
        &self,
        caller: &AccessContext,
        item_id: &ItemId,
        requester: Option<UserId>,
    ) -> Result<ClaimRequest, Error>;

    /// Approve a pending request and claim its item.
    async fn approve(
        &self,
        caller: &AccessContext,
        id: &ClaimRequestId,
    ) -> Result<ClaimRequest, Error>;

    /// Reject a pending request.
    async fn reject(
        &self,
        caller: &AccessContext,
        id: &ClaimRequestId,
    ) -> Result<ClaimRequest, Error>;

    async fn delete_request(&self, caller: &AccessContext, id: &ClaimRequestId)
    -> Result<(), Error>;

    /// Delete an item together with its requests.
    async fn delete_item(&self, caller: &AccessContext, id: &ItemId) -> Result<(), Error>;

    async fn get_request(
        &self,
        caller: &AccessContext,
        id: &ClaimRequestId,
    ) -> Result<ClaimRequest, Error>;

    /// Every request for administrators, the caller's own otherwise.
    async fn list_requests(&self, caller: &AccessContext) -> Result<Vec<ClaimRequest>, Error>;

    /// Public claim-status listing for one item.
    async fn list_item_requests(&self, item_id: &ItemId) -> Result<Vec<ClaimRequest>, Error>;
}
