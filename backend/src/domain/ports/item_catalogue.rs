//! Driving port for reporting and moderating items.

use async_trait::async_trait;

use crate::domain::{AccessContext, Error, Item, ItemDetails, ItemFilter, ItemId, ItemStatus, UserId};

/// Payload for reporting an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportItem {
    pub details: ItemDetails,
    /// Report on behalf of this user instead of the caller.
    pub reporter: Option<UserId>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemCatalogue: Send + Sync {
    async fn report_item(&self, caller: &AccessContext, report: ReportItem) -> Result<Item, Error>;

    /// Replace an item's descriptive fields.
    async fn update_item(
        &self,
        caller: &AccessContext,
        id: &ItemId,
        details: ItemDetails,
    ) -> Result<Item, Error>;

    /// Move an item to a moderation status.
    async fn review_item(
        &self,
        caller: &AccessContext,
        id: &ItemId,
        status: ItemStatus,
    ) -> Result<Item, Error>;

    async fn get_item(&self, id: &ItemId) -> Result<Item, Error>;

    async fn list_items(&self, filter: &ItemFilter) -> Result<Vec<Item>, Error>;

    /// Items reported by the caller.
    async fn list_my_items(&self, caller: &AccessContext) -> Result<Vec<Item>, Error>;
}
