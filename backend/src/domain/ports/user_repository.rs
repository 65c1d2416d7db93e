//! Credential store port: user records keyed by id and login identifier.

use async_trait::async_trait;

use crate::domain::{EmailAddress, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another user already holds the login identifier.
        DuplicateEmail { email: String } => "email already registered: {email}",
    }
}

/// What to do with a user's items and requests when the user is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UserDeletionPolicy {
    /// Refuse to delete a user who still owns items or requests.
    #[default]
    Refuse,
    /// Delete the user's items, every request against them, and the user's
    /// own requests in the same unit of work.
    Cascade,
}

/// Result of a user deletion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserDeletion {
    /// The user and, under `Cascade`, the listed dependents were removed.
    Deleted { items: usize, requests: usize },
    /// The user still owns records and the policy is `Refuse`.
    Referenced { items: usize, requests: usize },
    /// No user with that id exists.
    NotFound,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; fails with `DuplicateEmail` and writes nothing when
    /// the login identifier is taken.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Replace an existing user record. Returns `false` when the user is gone.
    async fn update(&self, user: &User) -> Result<bool, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by login identifier.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// All users ordered by registration time.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Delete a user under the given policy.
    async fn delete(
        &self,
        id: &UserId,
        policy: UserDeletionPolicy,
    ) -> Result<UserDeletion, UserPersistenceError>;
}
