//! Failure taxonomy shared by the claim workflow and item catalogue.

use serde_json::json;

use super::ports::{ClaimRequestPersistenceError, ItemPersistenceError, UserPersistenceError};
use super::{AccessDenied, ClaimRequestId, ClaimStatus, Error, ItemId, ItemStatus, UserId};

/// Why a workflow operation did not take effect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("user {0} not found")]
    UserNotFound(UserId),
    #[error("item {0} not found")]
    ItemNotFound(ItemId),
    #[error("request {0} not found")]
    RequestNotFound(ClaimRequestId),
    #[error("item {0} has already been claimed")]
    ItemAlreadyClaimed(ItemId),
    #[error("item {item_id} is {status} and no longer accepts claims")]
    ItemUnavailable { item_id: ItemId, status: ItemStatus },
    #[error("request {id} has already been {status}")]
    RequestAlreadyDecided { id: ClaimRequestId, status: ClaimStatus },
    #[error("item cannot move from {from} to {to}")]
    InvalidTransition { from: ItemStatus, to: ItemStatus },
    #[error("item status changed concurrently; now {current}")]
    StaleStatus { current: ItemStatus },
    #[error(transparent)]
    Access(#[from] AccessDenied),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store failure: {0}")]
    Internal(String),
}

impl WorkflowError {
    /// Error for an item that refused a claim while in `status`.
    pub(crate) fn item_closed(item_id: ItemId, status: ItemStatus) -> Self {
        if status.was_claimed() {
            Self::ItemAlreadyClaimed(item_id)
        } else {
            Self::ItemUnavailable { item_id, status }
        }
    }
}

impl From<UserPersistenceError> for WorkflowError {
    fn from(value: UserPersistenceError) -> Self {
        match value {
            UserPersistenceError::Connection { message } => Self::Unavailable(message),
            UserPersistenceError::Query { message } => Self::Internal(message),
            UserPersistenceError::DuplicateEmail { .. } => Self::Internal(value.to_string()),
        }
    }
}

impl From<ItemPersistenceError> for WorkflowError {
    fn from(value: ItemPersistenceError) -> Self {
        match value {
            ItemPersistenceError::Connection { message } => Self::Unavailable(message),
            ItemPersistenceError::Query { message } => Self::Internal(message),
        }
    }
}

impl From<ClaimRequestPersistenceError> for WorkflowError {
    fn from(value: ClaimRequestPersistenceError) -> Self {
        match value {
            ClaimRequestPersistenceError::Connection { message } => Self::Unavailable(message),
            ClaimRequestPersistenceError::Query { message } => Self::Internal(message),
        }
    }
}

impl From<WorkflowError> for Error {
    fn from(value: WorkflowError) -> Self {
        let message = value.to_string();
        match value {
            WorkflowError::UserNotFound(id) => Error::not_found(message)
                .with_details(json!({ "code": "user_not_found", "userId": id })),
            WorkflowError::ItemNotFound(id) => Error::not_found(message)
                .with_details(json!({ "code": "item_not_found", "itemId": id })),
            WorkflowError::RequestNotFound(id) => Error::not_found(message)
                .with_details(json!({ "code": "request_not_found", "requestId": id })),
            WorkflowError::ItemAlreadyClaimed(id) => Error::conflict(message)
                .with_details(json!({ "code": "item_already_claimed", "itemId": id })),
            WorkflowError::ItemUnavailable { item_id, status } => Error::conflict(message)
                .with_details(json!({
                    "code": "item_unavailable",
                    "itemId": item_id,
                    "status": status,
                })),
            WorkflowError::RequestAlreadyDecided { id, status } => Error::conflict(message)
                .with_details(json!({
                    "code": "request_already_decided",
                    "requestId": id,
                    "status": status,
                })),
            WorkflowError::InvalidTransition { from, to } => Error::invalid_request(message)
                .with_details(json!({ "code": "invalid_transition", "from": from, "to": to })),
            WorkflowError::StaleStatus { current } => Error::conflict(message)
                .with_details(json!({ "code": "stale_status", "current": current })),
            WorkflowError::Access(denied) => denied.into(),
            WorkflowError::Unavailable(_) => Error::service_unavailable("store unavailable"),
            WorkflowError::Internal(_) => Error::internal(message),
        }
    }
}
