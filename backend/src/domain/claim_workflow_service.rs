//! Claim workflow service.
//!
//! Drives the Item × Request state machine: filing requests against claimable
//! items, deciding them, and deleting records. Every mutation is delegated to
//! a conditional repository operation so the "at most one approved request
//! per item" invariant holds under concurrent callers; the status checks
//! performed here beforehand only pick the error to report.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    ClaimRequestRepository, ClaimWorkflow, DecisionOutcome, FilingOutcome, ItemRepository,
    UserRepository, WorkflowEvent, WorkflowNotifier,
};
use crate::domain::{
    AccessContext, AccessDenied, Capability, ClaimRequest, ClaimRequestId, Error, ItemId, UserId,
    WorkflowError,
};

/// Claim workflow service implementing the [`ClaimWorkflow`] driving port.
#[derive(Clone)]
pub struct ClaimWorkflowService<U, I, R> {
    users: Arc<U>,
    items: Arc<I>,
    requests: Arc<R>,
    notifier: Arc<dyn WorkflowNotifier>,
    clock: Arc<dyn Clock>,
}

impl<U, I, R> ClaimWorkflowService<U, I, R> {
    /// Create a new service over the given stores.
    pub fn new(
        users: Arc<U>,
        items: Arc<I>,
        requests: Arc<R>,
        notifier: Arc<dyn WorkflowNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            items,
            requests,
            notifier,
            clock,
        }
    }
}

impl<U, I, R> ClaimWorkflowService<U, I, R>
where
    U: UserRepository,
    I: ItemRepository,
    R: ClaimRequestRepository,
{
    /// File a `Pending` request against `item_id`.
    ///
    /// The caller files for themselves unless `requester` names someone else,
    /// which needs [`Capability::ActOnBehalf`]. Items that have been claimed
    /// yield [`WorkflowError::ItemAlreadyClaimed`] and nothing is written.
    pub async fn file(
        &self,
        caller: &AccessContext,
        item_id: &ItemId,
        requester: Option<UserId>,
    ) -> Result<ClaimRequest, WorkflowError> {
        let principal = caller.require(Capability::FileRequests)?;
        let requester = match requester {
            Some(other) if other != principal.user_id => {
                if !principal.can(Capability::ActOnBehalf) {
                    return Err(AccessDenied::Forbidden.into());
                }
                other
            }
            _ => principal.user_id,
        };

        let item = self
            .items
            .find_by_id(item_id)
            .await?
            .ok_or(WorkflowError::ItemNotFound(*item_id))?;
        if self.users.find_by_id(&requester).await?.is_none() {
            return Err(WorkflowError::UserNotFound(requester));
        }
        if !item.status.is_claimable() {
            return Err(WorkflowError::item_closed(item.id, item.status));
        }

        let request = ClaimRequest::file(item.id, requester, self.clock.utc());
        match self.requests.file_if_claimable(&request).await? {
            FilingOutcome::Filed => {}
            FilingOutcome::ItemUnavailable { status } => {
                return Err(WorkflowError::item_closed(item.id, status));
            }
            FilingOutcome::ItemNotFound => return Err(WorkflowError::ItemNotFound(item.id)),
        }

        info!(
            request_id = %request.id,
            item_id = %request.item_id,
            user_id = %request.requester,
            "claim request filed"
        );
        self.notifier
            .notify(WorkflowEvent::RequestFiled {
                request_id: request.id,
                item_id: request.item_id,
                requester: request.requester,
            })
            .await;
        Ok(request)
    }

    /// Approve a pending request and mark its item `Claimed` in one step.
    pub async fn approve_request(
        &self,
        caller: &AccessContext,
        id: &ClaimRequestId,
    ) -> Result<ClaimRequest, WorkflowError> {
        caller.require(Capability::DecideRequests)?;
        let today = self.clock.utc().date_naive();
        let approved = match self.requests.approve_pending(id, today).await? {
            DecisionOutcome::Decided(request) => request,
            DecisionOutcome::AlreadyDecided { status } => {
                return Err(WorkflowError::RequestAlreadyDecided { id: *id, status });
            }
            DecisionOutcome::ItemUnavailable { item_id, status } => {
                return Err(WorkflowError::item_closed(item_id, status));
            }
            DecisionOutcome::NotFound => return Err(WorkflowError::RequestNotFound(*id)),
        };

        info!(
            request_id = %approved.id,
            item_id = %approved.item_id,
            user_id = %approved.requester,
            "claim request approved; item claimed"
        );
        self.notifier
            .notify(WorkflowEvent::RequestApproved {
                request_id: approved.id,
                item_id: approved.item_id,
                requester: approved.requester,
            })
            .await;
        Ok(approved)
    }

    /// Reject a pending request. The item keeps its status.
    pub async fn reject_request(
        &self,
        caller: &AccessContext,
        id: &ClaimRequestId,
    ) -> Result<ClaimRequest, WorkflowError> {
        caller.require(Capability::DecideRequests)?;
        let rejected = match self.requests.reject_pending(id).await? {
            DecisionOutcome::Decided(request) => request,
            DecisionOutcome::AlreadyDecided { status } => {
                return Err(WorkflowError::RequestAlreadyDecided { id: *id, status });
            }
            DecisionOutcome::ItemUnavailable { item_id, status } => {
                return Err(WorkflowError::item_closed(item_id, status));
            }
            DecisionOutcome::NotFound => return Err(WorkflowError::RequestNotFound(*id)),
        };

        info!(
            request_id = %rejected.id,
            item_id = %rejected.item_id,
            user_id = %rejected.requester,
            "claim request rejected"
        );
        self.notifier
            .notify(WorkflowEvent::RequestRejected {
                request_id: rejected.id,
                item_id: rejected.item_id,
                requester: rejected.requester,
            })
            .await;
        Ok(rejected)
    }

    pub async fn remove_request(
        &self,
        caller: &AccessContext,
        id: &ClaimRequestId,
    ) -> Result<(), WorkflowError> {
        caller.require(Capability::DeleteRecords)?;
        if !self.requests.delete(id).await? {
            return Err(WorkflowError::RequestNotFound(*id));
        }
        info!(request_id = %id, "claim request deleted");
        Ok(())
    }

    /// Delete an item and every request filed against it.
    pub async fn remove_item(
        &self,
        caller: &AccessContext,
        id: &ItemId,
    ) -> Result<(), WorkflowError> {
        caller.require(Capability::DeleteRecords)?;
        let removed = self
            .items
            .delete(id)
            .await?
            .ok_or(WorkflowError::ItemNotFound(*id))?;
        info!(item_id = %id, requests_removed = removed, "item deleted");
        Ok(())
    }

    /// A request visible to its requester and to administrators.
    pub async fn fetch_request(
        &self,
        caller: &AccessContext,
        id: &ClaimRequestId,
    ) -> Result<ClaimRequest, WorkflowError> {
        caller.require_authenticated()?;
        let request = self
            .requests
            .find_by_id(id)
            .await?
            .ok_or(WorkflowError::RequestNotFound(*id))?;
        caller.require_self_or(request.requester, Capability::ViewAllRequests)?;
        Ok(request)
    }

    pub async fn visible_requests(
        &self,
        caller: &AccessContext,
    ) -> Result<Vec<ClaimRequest>, WorkflowError> {
        let principal = caller.require_authenticated()?;
        let requests = if principal.can(Capability::ViewAllRequests) {
            self.requests.list_all().await?
        } else {
            self.requests.list_by_requester(&principal.user_id).await?
        };
        Ok(requests)
    }

    pub async fn requests_for_item(
        &self,
        item_id: &ItemId,
    ) -> Result<Vec<ClaimRequest>, WorkflowError> {
        if self.items.find_by_id(item_id).await?.is_none() {
            return Err(WorkflowError::ItemNotFound(*item_id));
        }
        Ok(self.requests.list_by_item(item_id).await?)
    }
}

#[async_trait]
impl<U, I, R> ClaimWorkflow for ClaimWorkflowService<U, I, R>
where
    U: UserRepository,
    I: ItemRepository,
    R: ClaimRequestRepository,
{
    async fn file_request(
        &self,
        caller: &AccessContext,
        item_id: &ItemId,
        requester: Option<UserId>,
    ) -> Result<ClaimRequest, Error> {
        self.file(caller, item_id, requester)
            .await
            .map_err(Error::from)
    }

    async fn approve(
        &self,
        caller: &AccessContext,
        id: &ClaimRequestId,
    ) -> Result<ClaimRequest, Error> {
        self.approve_request(caller, id).await.map_err(Error::from)
    }

    async fn reject(
        &self,
        caller: &AccessContext,
        id: &ClaimRequestId,
    ) -> Result<ClaimRequest, Error> {
        self.reject_request(caller, id).await.map_err(Error::from)
    }

    async fn delete_request(
        &self,
        caller: &AccessContext,
        id: &ClaimRequestId,
    ) -> Result<(), Error> {
        self.remove_request(caller, id).await.map_err(Error::from)
    }

    async fn delete_item(&self, caller: &AccessContext, id: &ItemId) -> Result<(), Error> {
        self.remove_item(caller, id).await.map_err(Error::from)
    }

    async fn get_request(
        &self,
        caller: &AccessContext,
        id: &ClaimRequestId,
    ) -> Result<ClaimRequest, Error> {
        self.fetch_request(caller, id).await.map_err(Error::from)
    }

    async fn list_requests(&self, caller: &AccessContext) -> Result<Vec<ClaimRequest>, Error> {
        self.visible_requests(caller).await.map_err(Error::from)
    }

    async fn list_item_requests(&self, item_id: &ItemId) -> Result<Vec<ClaimRequest>, Error> {
        self.requests_for_item(item_id).await.map_err(Error::from)
    }
}

#[cfg(test)]
#[path = "claim_workflow_service_tests.rs"]
mod tests;
