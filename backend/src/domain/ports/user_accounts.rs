//! Driving port for registration, login, and account management.

use async_trait::async_trait;

use crate::domain::{
    AccessContext, DisplayName, EmailAddress, Error, IssuedToken, LoginCredentials, PasswordChange,
    Registration, Role, User, UserId,
};

/// Successful login: the bearer token and the account it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub token: IssuedToken,
    pub user: User,
}

/// Partial account update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub display_name: Option<DisplayName>,
    pub email: Option<EmailAddress>,
    /// `Some(None)` clears the department.
    pub department: Option<Option<String>>,
    /// Administrators only.
    pub role: Option<Role>,
    /// Administrators only.
    pub active: Option<bool>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAccounts: Send + Sync {
    async fn register(&self, registration: Registration) -> Result<User, Error>;

    /// Authenticate and issue a token. Every failure looks the same.
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, Error>;

    /// Whether the login identifier is already registered.
    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, Error>;

    async fn get_user(&self, caller: &AccessContext, id: &UserId) -> Result<User, Error>;

    async fn list_users(&self, caller: &AccessContext) -> Result<Vec<User>, Error>;

    async fn update_user(
        &self,
        caller: &AccessContext,
        id: &UserId,
        changes: UserUpdate,
    ) -> Result<User, Error>;

    /// Replace a password: the account holder with the current one, or a
    /// user manager without it.
    async fn change_password(
        &self,
        caller: &AccessContext,
        id: &UserId,
        change: PasswordChange,
    ) -> Result<(), Error>;

    async fn delete_user(&self, caller: &AccessContext, id: &UserId) -> Result<(), Error>;
}
