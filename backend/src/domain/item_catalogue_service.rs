//! Item reporting and moderation service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    ItemCatalogue, ItemRepository, ReportItem, StatusTransition, UserRepository, WorkflowEvent,
    WorkflowNotifier,
};
use crate::domain::{
    AccessContext, AccessDenied, Capability, Error, Item, ItemDetails, ItemFilter, ItemId,
    ItemStatus, WorkflowError,
};

/// Item service implementing the [`ItemCatalogue`] driving port.
#[derive(Clone)]
pub struct ItemCatalogueService<U, I> {
    users: Arc<U>,
    items: Arc<I>,
    notifier: Arc<dyn WorkflowNotifier>,
    clock: Arc<dyn Clock>,
}

impl<U, I> ItemCatalogueService<U, I> {
    pub fn new(
        users: Arc<U>,
        items: Arc<I>,
        notifier: Arc<dyn WorkflowNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            items,
            notifier,
            clock,
        }
    }
}

impl<U, I> ItemCatalogueService<U, I>
where
    U: UserRepository,
    I: ItemRepository,
{
    /// Record a newly reported item in `Open` status.
    pub async fn report(
        &self,
        caller: &AccessContext,
        report: ReportItem,
    ) -> Result<Item, WorkflowError> {
        let principal = caller.require(Capability::ReportItems)?;
        let reporter = match report.reporter {
            Some(other) if other != principal.user_id => {
                if !principal.can(Capability::ActOnBehalf) {
                    return Err(AccessDenied::Forbidden.into());
                }
                if self.users.find_by_id(&other).await?.is_none() {
                    return Err(WorkflowError::UserNotFound(other));
                }
                other
            }
            _ => principal.user_id,
        };

        let item = Item {
            id: ItemId::random(),
            details: report.details,
            reporter,
            status: ItemStatus::Open,
            reported_at: self.clock.utc(),
        };
        self.items.insert(&item).await?;

        info!(item_id = %item.id, user_id = %item.reporter, "item reported");
        self.notifier
            .notify(WorkflowEvent::ItemReported {
                item_id: item.id,
                reporter: item.reporter,
            })
            .await;
        Ok(item)
    }

    /// Replace descriptive fields; the status is never touched here.
    pub async fn revise(
        &self,
        caller: &AccessContext,
        id: &ItemId,
        details: ItemDetails,
    ) -> Result<Item, WorkflowError> {
        caller.require_authenticated()?;
        let existing = self.find(id).await?;
        caller.require_self_or(existing.reporter, Capability::ReviewItems)?;
        let updated = self
            .items
            .update_details(id, &details)
            .await?
            .ok_or(WorkflowError::ItemNotFound(*id))?;
        info!(item_id = %id, "item details updated");
        Ok(updated)
    }

    /// Move an item to a moderation status with a conditional update.
    pub async fn review(
        &self,
        caller: &AccessContext,
        id: &ItemId,
        next: ItemStatus,
    ) -> Result<Item, WorkflowError> {
        caller.require(Capability::ReviewItems)?;
        let existing = self.find(id).await?;
        if !existing.status.can_review_to(next) {
            return Err(WorkflowError::InvalidTransition {
                from: existing.status,
                to: next,
            });
        }
        match self
            .items
            .transition_status(id, existing.status, next)
            .await?
        {
            StatusTransition::Applied(item) => {
                info!(item_id = %id, from = %existing.status, to = %next, "item reviewed");
                Ok(item)
            }
            StatusTransition::Stale { current } => Err(WorkflowError::StaleStatus { current }),
            StatusTransition::NotFound => Err(WorkflowError::ItemNotFound(*id)),
        }
    }

    pub async fn find(&self, id: &ItemId) -> Result<Item, WorkflowError> {
        self.items
            .find_by_id(id)
            .await?
            .ok_or(WorkflowError::ItemNotFound(*id))
    }

    pub async fn search(&self, filter: &ItemFilter) -> Result<Vec<Item>, WorkflowError> {
        Ok(self.items.list(filter).await?)
    }

    pub async fn reported_by_caller(
        &self,
        caller: &AccessContext,
    ) -> Result<Vec<Item>, WorkflowError> {
        let principal = caller.require_authenticated()?;
        let filter = ItemFilter {
            reporter: Some(principal.user_id),
            ..ItemFilter::default()
        };
        Ok(self.items.list(&filter).await?)
    }
}

#[async_trait]
impl<U, I> ItemCatalogue for ItemCatalogueService<U, I>
where
    U: UserRepository,
    I: ItemRepository,
{
    async fn report_item(&self, caller: &AccessContext, report: ReportItem) -> Result<Item, Error> {
        self.report(caller, report).await.map_err(Error::from)
    }

    async fn update_item(
        &self,
        caller: &AccessContext,
        id: &ItemId,
        details: ItemDetails,
    ) -> Result<Item, Error> {
        self.revise(caller, id, details).await.map_err(Error::from)
    }

    async fn review_item(
        &self,
        caller: &AccessContext,
        id: &ItemId,
        status: ItemStatus,
    ) -> Result<Item, Error> {
        self.review(caller, id, status).await.map_err(Error::from)
    }

    async fn get_item(&self, id: &ItemId) -> Result<Item, Error> {
        self.find(id).await.map_err(Error::from)
    }

    async fn list_items(&self, filter: &ItemFilter) -> Result<Vec<Item>, Error> {
        self.search(filter).await.map_err(Error::from)
    }

    async fn list_my_items(&self, caller: &AccessContext) -> Result<Vec<Item>, Error> {
        self.reported_by_caller(caller).await.map_err(Error::from)
    }
}
