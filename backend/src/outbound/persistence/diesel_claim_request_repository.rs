//! PostgreSQL-backed `ClaimRequestRepository` implementation using Diesel ORM.
//!
//! Filing and approval lock the item row (`SELECT … FOR UPDATE`) before
//! reading its status, which serialises every decision touching one item.
//! Approval locks item then request, in that order, so two approvals for the
//! same item queue behind each other and the second sees `CLAIMED`.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{
    ClaimRequestPersistenceError, ClaimRequestRepository, DecisionOutcome, FilingOutcome,
};
use crate::domain::{ClaimRequest, ClaimRequestId, ClaimStatus, ItemId, ItemStatus, UserId};

use super::diesel_basic_error_mapping::{TxError, map_basic_diesel_error, map_basic_pool_error};
use super::models::{ClaimRequestRow, NewClaimRequestRow};
use super::pool::{DbPool, PoolError};
use super::schema::{claim_requests, items};

/// Diesel-backed implementation of the `ClaimRequestRepository` port.
#[derive(Clone)]
pub struct DieselClaimRequestRepository {
    pool: DbPool,
}

impl DieselClaimRequestRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ClaimRequestPersistenceError {
    map_basic_pool_error(error, ClaimRequestPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ClaimRequestPersistenceError {
    map_basic_diesel_error(
        error,
        ClaimRequestPersistenceError::query,
        ClaimRequestPersistenceError::connection,
    )
}

fn map_tx_error(error: TxError) -> ClaimRequestPersistenceError {
    error.into_port_error(map_diesel_error, ClaimRequestPersistenceError::query)
}

fn row_to_request(row: ClaimRequestRow) -> Result<ClaimRequest, TxError> {
    ClaimRequest::try_from(row).map_err(TxError::Corrupt)
}

fn rows_to_requests(
    rows: Vec<ClaimRequestRow>,
) -> Result<Vec<ClaimRequest>, ClaimRequestPersistenceError> {
    rows.into_iter()
        .map(|row| row_to_request(row).map_err(map_tx_error))
        .collect()
}

/// Lock the item row and read its status.
async fn lock_item_status(
    conn: &mut AsyncPgConnection,
    item_id: Uuid,
) -> Result<Option<ItemStatus>, TxError> {
    let raw: Option<String> = items::table
        .find(item_id)
        .select(items::status)
        .for_update()
        .first(conn)
        .await
        .optional()?;
    raw.map(|status| {
        status
            .parse::<ItemStatus>()
            .map_err(|err| TxError::Corrupt(err.to_string()))
    })
    .transpose()
}

async fn lock_request(
    conn: &mut AsyncPgConnection,
    request_id: Uuid,
) -> Result<Option<ClaimRequest>, TxError> {
    let row: Option<ClaimRequestRow> = claim_requests::table
        .find(request_id)
        .select(ClaimRequestRow::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()?;
    row.map(row_to_request).transpose()
}

async fn write_decision(
    conn: &mut AsyncPgConnection,
    request: &ClaimRequest,
) -> Result<(), TxError> {
    diesel::update(claim_requests::table.find(request.id.as_uuid()))
        .set((
            claim_requests::status.eq(request.status.as_str()),
            claim_requests::approved_date.eq(request.approved_date),
        ))
        .execute(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl ClaimRequestRepository for DieselClaimRequestRepository {
    async fn file_if_claimable(
        &self,
        request: &ClaimRequest,
    ) -> Result<FilingOutcome, ClaimRequestPersistenceError> {
        let item_id = *request.item_id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let Some(status) = lock_item_status(conn, item_id).await? else {
                    return Ok(FilingOutcome::ItemNotFound);
                };
                if !status.is_claimable() {
                    return Ok(FilingOutcome::ItemUnavailable { status });
                }
                diesel::insert_into(claim_requests::table)
                    .values(&NewClaimRequestRow::from(request))
                    .execute(conn)
                    .await?;
                Ok(FilingOutcome::Filed)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }

    async fn approve_pending(
        &self,
        id: &ClaimRequestId,
        approved_on: NaiveDate,
    ) -> Result<DecisionOutcome, ClaimRequestPersistenceError> {
        let request_id = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let item_id: Option<Uuid> = claim_requests::table
                    .find(request_id)
                    .select(claim_requests::item_id)
                    .first(conn)
                    .await
                    .optional()?;
                let Some(item_id) = item_id else {
                    return Ok(DecisionOutcome::NotFound);
                };

                let item_status = lock_item_status(conn, item_id).await?;
                let Some(request) = lock_request(conn, request_id).await? else {
                    return Ok(DecisionOutcome::NotFound);
                };
                if !request.status.is_pending() {
                    return Ok(DecisionOutcome::AlreadyDecided {
                        status: request.status,
                    });
                }
                let Some(item_status) = item_status else {
                    return Err(TxError::Corrupt(
                        "request references a missing item".to_owned(),
                    ));
                };
                if !item_status.is_claimable() {
                    return Ok(DecisionOutcome::ItemUnavailable {
                        item_id: ItemId::from_uuid(item_id),
                        status: item_status,
                    });
                }

                diesel::update(items::table.find(item_id))
                    .set(items::status.eq(ItemStatus::Claimed.as_str()))
                    .execute(conn)
                    .await?;
                let approved = request.approved(approved_on);
                write_decision(conn, &approved).await?;
                Ok(DecisionOutcome::Decided(approved))
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }

    async fn reject_pending(
        &self,
        id: &ClaimRequestId,
    ) -> Result<DecisionOutcome, ClaimRequestPersistenceError> {
        let request_id = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let Some(request) = lock_request(conn, request_id).await? else {
                    return Ok(DecisionOutcome::NotFound);
                };
                if request.status != ClaimStatus::Pending {
                    return Ok(DecisionOutcome::AlreadyDecided {
                        status: request.status,
                    });
                }
                let rejected = request.rejected();
                write_decision(conn, &rejected).await?;
                Ok(DecisionOutcome::Decided(rejected))
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }

    async fn find_by_id(
        &self,
        id: &ClaimRequestId,
    ) -> Result<Option<ClaimRequest>, ClaimRequestPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ClaimRequestRow> = claim_requests::table
            .find(id.as_uuid())
            .select(ClaimRequestRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_request).transpose().map_err(map_tx_error)
    }

    async fn list_all(&self) -> Result<Vec<ClaimRequest>, ClaimRequestPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = claim_requests::table
            .select(ClaimRequestRow::as_select())
            .order((claim_requests::requested_at.desc(), claim_requests::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_requests(rows)
    }

    async fn list_by_requester(
        &self,
        requester: &UserId,
    ) -> Result<Vec<ClaimRequest>, ClaimRequestPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = claim_requests::table
            .filter(claim_requests::requester_id.eq(requester.as_uuid()))
            .select(ClaimRequestRow::as_select())
            .order((claim_requests::requested_at.desc(), claim_requests::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_requests(rows)
    }

    async fn list_by_item(
        &self,
        item_id: &ItemId,
    ) -> Result<Vec<ClaimRequest>, ClaimRequestPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = claim_requests::table
            .filter(claim_requests::item_id.eq(item_id.as_uuid()))
            .select(ClaimRequestRow::as_select())
            .order((claim_requests::requested_at.desc(), claim_requests::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_requests(rows)
    }

    async fn delete(&self, id: &ClaimRequestId) -> Result<bool, ClaimRequestPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(claim_requests::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
