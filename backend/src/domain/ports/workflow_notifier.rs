//! Port for announcing workflow transitions to interested parties.

use async_trait::async_trait;

use crate::domain::{ClaimRequestId, ItemId, UserId};

/// A completed workflow transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    ItemReported {
        item_id: ItemId,
        reporter: UserId,
    },
    RequestFiled {
        request_id: ClaimRequestId,
        item_id: ItemId,
        requester: UserId,
    },
    RequestApproved {
        request_id: ClaimRequestId,
        item_id: ItemId,
        requester: UserId,
    },
    RequestRejected {
        request_id: ClaimRequestId,
        item_id: ItemId,
        requester: UserId,
    },
}

/// Receives events after the transition has been persisted. Delivery is
/// best-effort; implementations must not fail the originating operation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkflowNotifier: Send + Sync {
    async fn notify(&self, event: WorkflowEvent);
}

/// Notifier that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpWorkflowNotifier;

#[async_trait]
impl WorkflowNotifier for NoOpWorkflowNotifier {
    async fn notify(&self, _event: WorkflowEvent) {}
}
