//! Account service: registration, login, and user administration.
//!
//! Login failures are deliberately indistinguishable. An unknown identifier,
//! a wrong password, and a deactivated account all surface as
//! [`AccountError::InvalidCredentials`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::{
    LoginOutcome, PasswordHashError, PasswordHasher, UserAccounts, UserDeletion,
    UserDeletionPolicy, UserPersistenceError, UserRepository, UserUpdate,
};
use crate::domain::{
    AccessContext, AccessDenied, Capability, EmailAddress, Error, LoginCredentials, PasswordChange,
    Registration, TokenError, TokenService, User, UserId,
};

/// Why an account operation did not take effect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("email already registered")]
    DuplicateIdentifier { email: String },
    #[error("user {0} not found")]
    UserNotFound(UserId),
    #[error("user {id} still owns {items} items and {requests} requests")]
    UserStillReferenced {
        id: UserId,
        items: usize,
        requests: usize,
    },
    #[error(transparent)]
    Access(#[from] AccessDenied),
    #[error(transparent)]
    Hashing(#[from] PasswordHashError),
    #[error("token issuance failed: {0}")]
    Token(#[from] TokenError),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store failure: {0}")]
    Internal(String),
}

impl From<UserPersistenceError> for AccountError {
    fn from(value: UserPersistenceError) -> Self {
        match value {
            UserPersistenceError::Connection { message } => Self::Unavailable(message),
            UserPersistenceError::Query { message } => Self::Internal(message),
            UserPersistenceError::DuplicateEmail { email } => Self::DuplicateIdentifier { email },
        }
    }
}

impl From<AccountError> for Error {
    fn from(value: AccountError) -> Self {
        let message = value.to_string();
        match value {
            AccountError::InvalidCredentials => Error::unauthorized(message)
                .with_details(json!({ "code": "invalid_credentials" })),
            AccountError::DuplicateIdentifier { .. } => Error::conflict(message)
                .with_details(json!({ "code": "duplicate_identifier" })),
            AccountError::UserNotFound(id) => Error::not_found(message)
                .with_details(json!({ "code": "user_not_found", "userId": id })),
            AccountError::UserStillReferenced {
                id,
                items,
                requests,
            } => Error::conflict(message).with_details(json!({
                "code": "user_still_referenced",
                "userId": id,
                "items": items,
                "requests": requests,
            })),
            AccountError::Access(denied) => denied.into(),
            AccountError::Unavailable(_) => Error::service_unavailable("store unavailable"),
            AccountError::Hashing(_) | AccountError::Token(_) | AccountError::Internal(_) => {
                Error::internal(message)
            }
        }
    }
}

/// Account service implementing the [`UserAccounts`] driving port.
#[derive(Clone)]
pub struct UserAccountService<U> {
    users: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: TokenService,
    clock: Arc<dyn Clock>,
    deletion: UserDeletionPolicy,
}

impl<U> UserAccountService<U> {
    pub fn new(
        users: Arc<U>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: TokenService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            clock,
            deletion: UserDeletionPolicy::default(),
        }
    }

    /// Override what happens to a deleted user's items and requests.
    #[must_use]
    pub fn with_deletion_policy(mut self, policy: UserDeletionPolicy) -> Self {
        self.deletion = policy;
        self
    }
}

impl<U> UserAccountService<U>
where
    U: UserRepository,
{
    /// Create an active account. Nothing is written when the identifier is
    /// already taken.
    pub async fn create(&self, registration: Registration) -> Result<User, AccountError> {
        if self
            .users
            .find_by_email(registration.email())
            .await?
            .is_some()
        {
            return Err(AccountError::DuplicateIdentifier {
                email: registration.email().to_string(),
            });
        }

        let user = User {
            id: UserId::random(),
            email: registration.email().clone(),
            display_name: registration.display_name().clone(),
            department: registration.department().map(str::to_owned),
            role: registration.granted_role(),
            password_hash: self.hasher.hash(registration.password())?,
            active: true,
            registered_at: self.clock.utc(),
        };
        self.users.insert(&user).await?;
        info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    /// Verify credentials and issue a bearer token.
    pub async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<LoginOutcome, AccountError> {
        let Ok(email) = EmailAddress::new(credentials.email()) else {
            return Err(AccountError::InvalidCredentials);
        };
        let Some(user) = self.users.find_by_email(&email).await? else {
            debug!("login for unknown identifier");
            return Err(AccountError::InvalidCredentials);
        };
        if !user.active {
            debug!(user_id = %user.id, "login for inactive account");
            return Err(AccountError::InvalidCredentials);
        }
        if !self
            .hasher
            .verify(credentials.password(), &user.password_hash)
        {
            debug!(user_id = %user.id, "login with wrong password");
            return Err(AccountError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user)?;
        info!(user_id = %user.id, "user logged in");
        Ok(LoginOutcome { token, user })
    }

    pub async fn is_registered(&self, email: &EmailAddress) -> Result<bool, AccountError> {
        Ok(self.users.find_by_email(email).await?.is_some())
    }

    pub async fn fetch(&self, caller: &AccessContext, id: &UserId) -> Result<User, AccountError> {
        caller.require_self_or(*id, Capability::ManageUsers)?;
        self.users
            .find_by_id(id)
            .await?
            .ok_or(AccountError::UserNotFound(*id))
    }

    pub async fn all(&self, caller: &AccessContext) -> Result<Vec<User>, AccountError> {
        caller.require(Capability::ManageUsers)?;
        Ok(self.users.list().await?)
    }

    /// Apply `changes` to a profile. Role and active flag need
    /// [`Capability::ManageUsers`] even on one's own account.
    pub async fn amend(
        &self,
        caller: &AccessContext,
        id: &UserId,
        changes: UserUpdate,
    ) -> Result<User, AccountError> {
        let principal = caller.require_self_or(*id, Capability::ManageUsers)?;
        let privileged = changes.role.is_some() || changes.active.is_some();
        if privileged && !principal.can(Capability::ManageUsers) {
            return Err(AccessDenied::Forbidden.into());
        }

        let mut user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or(AccountError::UserNotFound(*id))?;
        if let Some(display_name) = changes.display_name {
            user.display_name = display_name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(department) = changes.department {
            user.department = department;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        if let Some(active) = changes.active {
            user.active = active;
        }

        if !self.users.update(&user).await? {
            return Err(AccountError::UserNotFound(*id));
        }
        info!(user_id = %user.id, "user updated");
        Ok(user)
    }

    /// Replace a password.
    ///
    /// Users changing their own password must confirm the current one, or
    /// the attempt fails as [`AccountError::InvalidCredentials`]. Holders of
    /// [`Capability::ManageUsers`] reset other accounts without it.
    pub async fn replace_password(
        &self,
        caller: &AccessContext,
        id: &UserId,
        change: PasswordChange,
    ) -> Result<(), AccountError> {
        let principal = caller.require_self_or(*id, Capability::ManageUsers)?;
        let own_account = principal.user_id == *id;
        let mut user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or(AccountError::UserNotFound(*id))?;

        if own_account {
            let confirmed = change
                .current()
                .is_some_and(|current| self.hasher.verify(current, &user.password_hash));
            if !confirmed {
                debug!(user_id = %id, "password change with wrong current password");
                return Err(AccountError::InvalidCredentials);
            }
        }

        user.password_hash = self.hasher.hash(change.replacement())?;
        if !self.users.update(&user).await? {
            return Err(AccountError::UserNotFound(*id));
        }
        info!(user_id = %id, reset = !own_account, "password changed");
        Ok(())
    }

    /// Delete a user under the configured [`UserDeletionPolicy`].
    pub async fn remove(&self, caller: &AccessContext, id: &UserId) -> Result<(), AccountError> {
        caller.require(Capability::ManageUsers)?;
        match self.users.delete(id, self.deletion).await? {
            UserDeletion::Deleted { items, requests } => {
                info!(
                    user_id = %id,
                    items_removed = items,
                    requests_removed = requests,
                    "user deleted"
                );
                Ok(())
            }
            UserDeletion::Referenced { items, requests } => {
                Err(AccountError::UserStillReferenced {
                    id: *id,
                    items,
                    requests,
                })
            }
            UserDeletion::NotFound => Err(AccountError::UserNotFound(*id)),
        }
    }
}

#[async_trait]
impl<U> UserAccounts for UserAccountService<U>
where
    U: UserRepository,
{
    async fn register(&self, registration: Registration) -> Result<User, Error> {
        self.create(registration).await.map_err(Error::from)
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, Error> {
        self.authenticate(credentials).await.map_err(Error::from)
    }

    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, Error> {
        self.is_registered(email).await.map_err(Error::from)
    }

    async fn get_user(&self, caller: &AccessContext, id: &UserId) -> Result<User, Error> {
        self.fetch(caller, id).await.map_err(Error::from)
    }

    async fn list_users(&self, caller: &AccessContext) -> Result<Vec<User>, Error> {
        self.all(caller).await.map_err(Error::from)
    }

    async fn update_user(
        &self,
        caller: &AccessContext,
        id: &UserId,
        changes: UserUpdate,
    ) -> Result<User, Error> {
        self.amend(caller, id, changes).await.map_err(Error::from)
    }

    async fn change_password(
        &self,
        caller: &AccessContext,
        id: &UserId,
        change: PasswordChange,
    ) -> Result<(), Error> {
        self.replace_password(caller, id, change)
            .await
            .map_err(Error::from)
    }

    async fn delete_user(&self, caller: &AccessContext, id: &UserId) -> Result<(), Error> {
        self.remove(caller, id).await.map_err(Error::from)
    }
}

#[cfg(test)]
#[path = "user_account_service_tests.rs"]
mod tests;
