//! Item store port.

use async_trait::async_trait;

use crate::domain::{Item, ItemDetails, ItemFilter, ItemId, ItemStatus};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by item repository adapters.
    pub enum ItemPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "item repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "item repository query failed: {message}",
    }
}

/// Outcome of a conditional status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusTransition {
    /// The item held the expected status and now holds the new one.
    Applied(Item),
    /// The item's status no longer matched the expected prior status.
    Stale { current: ItemStatus },
    /// No item with that id exists.
    NotFound,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Persist a newly reported item.
    async fn insert(&self, item: &Item) -> Result<(), ItemPersistenceError>;

    /// Replace descriptive fields only; status and reporter are untouched.
    async fn update_details(
        &self,
        id: &ItemId,
        details: &ItemDetails,
    ) -> Result<Option<Item>, ItemPersistenceError>;

    /// Set the status to `next` only if it is currently `expected`.
    async fn transition_status(
        &self,
        id: &ItemId,
        expected: ItemStatus,
        next: ItemStatus,
    ) -> Result<StatusTransition, ItemPersistenceError>;

    /// Fetch an item by identifier.
    async fn find_by_id(&self, id: &ItemId) -> Result<Option<Item>, ItemPersistenceError>;

    /// Items passing `filter`, newest report first.
    async fn list(&self, filter: &ItemFilter) -> Result<Vec<Item>, ItemPersistenceError>;

    /// Delete an item and every request filed against it. Returns the number
    /// of requests removed, or `None` when the item does not exist.
    async fn delete(&self, id: &ItemId) -> Result<Option<usize>, ItemPersistenceError>;
}
