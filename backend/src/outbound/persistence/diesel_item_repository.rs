//! PostgreSQL-backed `ItemRepository` implementation using Diesel ORM.
//!
//! Status changes are compare-and-set updates (`WHERE status = expected`);
//! descriptive edits never write the status column, so a concurrent approval
//! is never clobbered by a profile edit.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ItemPersistenceError, ItemRepository, StatusTransition};
use crate::domain::{Item, ItemDetails, ItemFilter, ItemId, ItemStatus};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{ItemDetailsUpdate, ItemRow, NewItemRow};
use super::pool::{DbPool, PoolError};
use super::schema::items;

/// Diesel-backed implementation of the `ItemRepository` port.
#[derive(Clone)]
pub struct DieselItemRepository {
    pool: DbPool,
}

impl DieselItemRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ItemPersistenceError {
    map_basic_pool_error(error, ItemPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ItemPersistenceError {
    map_basic_diesel_error(
        error,
        ItemPersistenceError::query,
        ItemPersistenceError::connection,
    )
}

fn row_to_item(row: ItemRow) -> Result<Item, ItemPersistenceError> {
    Item::try_from(row).map_err(ItemPersistenceError::query)
}

fn parse_status(raw: &str) -> Result<ItemStatus, ItemPersistenceError> {
    raw.parse::<ItemStatus>()
        .map_err(|err| ItemPersistenceError::query(err.to_string()))
}

#[async_trait]
impl ItemRepository for DieselItemRepository {
    async fn insert(&self, item: &Item) -> Result<(), ItemPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(items::table)
            .values(&NewItemRow::from(item))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update_details(
        &self,
        id: &ItemId,
        details: &ItemDetails,
    ) -> Result<Option<Item>, ItemPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ItemRow> = diesel::update(items::table.find(id.as_uuid()))
            .set(&ItemDetailsUpdate::from(details))
            .returning(ItemRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_item).transpose()
    }

    async fn transition_status(
        &self,
        id: &ItemId,
        expected: ItemStatus,
        next: ItemStatus,
    ) -> Result<StatusTransition, ItemPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let applied: Option<ItemRow> = diesel::update(
            items::table
                .find(id.as_uuid())
                .filter(items::status.eq(expected.as_str())),
        )
        .set(items::status.eq(next.as_str()))
        .returning(ItemRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        if let Some(row) = applied {
            return row_to_item(row).map(StatusTransition::Applied);
        }

        let current: Option<String> = items::table
            .find(id.as_uuid())
            .select(items::status)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        match current {
            Some(raw) => Ok(StatusTransition::Stale {
                current: parse_status(&raw)?,
            }),
            None => Ok(StatusTransition::NotFound),
        }
    }

    async fn find_by_id(&self, id: &ItemId) -> Result<Option<Item>, ItemPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ItemRow> = items::table
            .find(id.as_uuid())
            .select(ItemRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_item).transpose()
    }

    async fn list(&self, filter: &ItemFilter) -> Result<Vec<Item>, ItemPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = items::table
            .select(ItemRow::as_select())
            .order((items::reported_at.desc(), items::id.asc()))
            .into_boxed();
        if let Some(status) = filter.status {
            query = query.filter(items::status.eq(status.as_str()));
        }
        if let Some(reporter) = filter.reporter {
            query = query.filter(items::reporter_id.eq(*reporter.as_uuid()));
        }
        let rows: Vec<ItemRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_item).collect()
    }

    async fn delete(&self, id: &ItemId) -> Result<Option<usize>, ItemPersistenceError> {
        use super::schema::claim_requests;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // Requests go with the item through `ON DELETE CASCADE`; count them
        // first so callers can log what was removed.
        let requests: i64 = claim_requests::table
            .filter(claim_requests::item_id.eq(id.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let deleted = diesel::delete(items::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if deleted == 0 {
            return Ok(None);
        }
        usize::try_from(requests)
            .map(Some)
            .map_err(|err| ItemPersistenceError::query(err.to_string()))
    }
}
