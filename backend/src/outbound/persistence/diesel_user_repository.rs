//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Login identifier uniqueness is enforced by the `users_email_key` index;
//! a violation surfaces as `UserPersistenceError::DuplicateEmail` with no row
//! written. Deletion runs in one transaction that locks the user row first.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{
    UserDeletion, UserDeletionPolicy, UserPersistenceError, UserRepository,
};
use crate::domain::{EmailAddress, User, UserId};

use super::diesel_basic_error_mapping::{
    TxError, is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{NewUserRow, UserChanges, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{claim_requests, items, users};

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn map_write_error(error: diesel::result::Error, user: &User) -> UserPersistenceError {
    if is_unique_violation(&error) {
        UserPersistenceError::duplicate_email(user.email.as_ref())
    } else {
        map_diesel_error(error)
    }
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    User::try_from(row).map_err(UserPersistenceError::query)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(&NewUserRow::from(user))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_write_error(err, user))
    }

    async fn update(&self, user: &User) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.find(user.id.as_uuid()))
            .set(&UserChanges::from(user))
            .execute(&mut conn)
            .await
            .map_err(|err| map_write_error(err, user))?;
        Ok(updated == 1)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .order((users::registered_at.asc(), users::id.asc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_user).collect()
    }

    async fn delete(
        &self,
        id: &UserId,
        policy: UserDeletionPolicy,
    ) -> Result<UserDeletion, UserPersistenceError> {
        let user_id = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let locked: Option<Uuid> = users::table
                    .find(user_id)
                    .select(users::id)
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;
                if locked.is_none() {
                    return Ok(UserDeletion::NotFound);
                }

                let owned: Vec<Uuid> = items::table
                    .filter(items::reporter_id.eq(user_id))
                    .select(items::id)
                    .for_update()
                    .load(conn)
                    .await?;
                let touching = claim_requests::requester_id
                    .eq(user_id)
                    .or(claim_requests::item_id.eq_any(owned.clone()));

                if policy == UserDeletionPolicy::Refuse {
                    let requests: i64 = claim_requests::table
                        .filter(touching.clone())
                        .count()
                        .get_result(conn)
                        .await?;
                    let requests = usize::try_from(requests)
                        .map_err(|err| TxError::Corrupt(err.to_string()))?;
                    if !owned.is_empty() || requests > 0 {
                        return Ok(UserDeletion::Referenced {
                            items: owned.len(),
                            requests,
                        });
                    }
                }

                let requests_removed = diesel::delete(claim_requests::table.filter(touching))
                    .execute(conn)
                    .await?;
                let items_removed =
                    diesel::delete(items::table.filter(items::reporter_id.eq(user_id)))
                        .execute(conn)
                        .await?;
                diesel::delete(users::table.find(user_id))
                    .execute(conn)
                    .await?;
                Ok(UserDeletion::Deleted {
                    items: items_removed,
                    requests: requests_removed,
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| err.into_port_error(map_diesel_error, UserPersistenceError::query))
    }
}

#[cfg(test)]
mod tests {
    //! Error mapping coverage; database behaviour is exercised against the
    //! in-memory store sharing the same port contract.
    use super::*;
    use crate::domain::Role;
    use crate::test_support::user;
    use rstest::rstest;

    #[rstest]
    fn pool_failures_are_connection_errors() {
        let mapped = map_pool_error(PoolError::checkout("timed out"));
        assert!(matches!(mapped, UserPersistenceError::Connection { .. }));
    }

    #[rstest]
    fn missing_rows_are_query_errors() {
        let mapped = map_diesel_error(diesel::result::Error::NotFound);
        assert_eq!(mapped, UserPersistenceError::query("record not found"));
    }

    #[rstest]
    fn other_write_failures_keep_their_classification() {
        let alice = user("alice@x.com", Role::User);
        let mapped = map_write_error(diesel::result::Error::RollbackTransaction, &alice);
        assert!(matches!(mapped, UserPersistenceError::Query { .. }));
    }

    #[rstest]
    fn rows_with_unknown_roles_are_rejected() {
        let row = UserRow {
            id: Uuid::new_v4(),
            email: "alice@x.com".to_owned(),
            display_name: "Alice".to_owned(),
            department: None,
            role: "OWNER".to_owned(),
            password_hash: "x".to_owned(),
            active: true,
            registered_at: chrono::Utc::now(),
        };
        assert!(matches!(
            row_to_user(row),
            Err(UserPersistenceError::Query { .. })
        ));
    }
}
