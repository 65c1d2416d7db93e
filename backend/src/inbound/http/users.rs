//! Account API handlers.
//!
//! ```text
//! POST /api/v1/users/register {"name":"Alice","email":"alice@x.com","password":"correct horse"}
//! POST /api/v1/login {"email":"alice@x.com","password":"correct horse"}
//! GET /api/v1/users/check-email/alice@x.com
//! GET /api/v1/users
//! GET|PUT|DELETE /api/v1/users/{id}
//! PUT /api/v1/users/{id}/password {"currentPassword":"correct horse","newPassword":"battery staple"}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{LoginOutcome, UserUpdate};
use crate::domain::{
    DisplayName, EmailAddress, Error, LoginCredentials, PasswordChange, Registration, User,
    normalise_department,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::Caller;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, map_login_validation_error, map_password_change_error, map_registration_error,
    map_user_validation_error, parse_role, parse_user_id,
};

/// Registration body for `POST /api/v1/users/register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "Alice Example")]
    pub name: String,
    #[schema(example = "alice@x.com")]
    pub email: String,
    #[schema(example = "correct horse battery")]
    pub password: String,
    pub department: Option<String>,
    /// `USER` or `STAFF`; `ADMIN` cannot be self-assigned.
    pub role: Option<String>,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = Error;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        let role = value
            .role
            .as_deref()
            .map(|raw| parse_role(raw, FieldName::new("role")))
            .transpose()?;
        Self::try_from_parts(
            &value.name,
            &value.email,
            &value.password,
            value.department.as_deref(),
            role,
        )
        .map_err(|err| map_registration_error(&err))
    }
}

/// Login body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "alice@x.com")]
    pub email: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = Error;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
            .map_err(|err| map_login_validation_error(&err))
    }
}

/// Public profile of an account. Never carries the password verifier.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(format = "uuid")]
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub department: Option<String>,
    #[schema(example = "USER")]
    pub role: String,
    pub active: bool,
    #[schema(format = "date-time")]
    pub registered_at: String,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id.to_string(),
            email: value.email.into(),
            display_name: value.display_name.into(),
            department: value.department,
            role: value.role.as_str().to_owned(),
            active: value.active,
            registered_at: value.registered_at.to_rfc3339(),
        }
    }
}

/// Successful login.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    #[schema(format = "date-time")]
    pub expires_at: String,
    pub user: UserResponse,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(value: LoginOutcome) -> Self {
        Self {
            token: value.token.token,
            token_type: "Bearer".to_owned(),
            expires_at: value.token.expires_at.to_rfc3339(),
            user: value.user.into(),
        }
    }
}

/// Result of the identifier availability check.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailCheckResponse {
    pub email: String,
    pub exists: bool,
}

/// Partial account update; omitted fields stay as they are.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    /// An empty string clears the department.
    pub department: Option<String>,
    pub role: Option<String>,
    pub active: Option<bool>,
}

impl TryFrom<UpdateUserRequest> for UserUpdate {
    type Error = Error;

    fn try_from(value: UpdateUserRequest) -> Result<Self, Self::Error> {
        let user_error = |err| map_user_validation_error(&err);
        Ok(Self {
            display_name: value.name.map(DisplayName::new).transpose().map_err(user_error)?,
            email: value.email.map(EmailAddress::new).transpose().map_err(user_error)?,
            department: value
                .department
                .map(|raw| normalise_department(Some(&raw)))
                .transpose()
                .map_err(user_error)?,
            role: value
                .role
                .as_deref()
                .map(|raw| parse_role(raw, FieldName::new("role")))
                .transpose()?,
            active: value.active,
        })
    }
}

/// Password change body for `PUT /api/v1/users/{id}/password`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// Required when changing one's own password.
    pub current_password: Option<String>,
    #[schema(example = "battery staple horse")]
    pub new_password: String,
}

impl TryFrom<ChangePasswordRequest> for PasswordChange {
    type Error = Error;

    fn try_from(value: ChangePasswordRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(value.current_password.as_deref(), &value.new_password)
            .map_err(|err| map_password_change_error(&err))
    }
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/users/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = Registration::try_from(payload.into_inner())?;
    let user = state.accounts.register(registration).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Exchange credentials for a bearer token.
///
/// Unknown emails, wrong passwords and deactivated accounts all answer with
/// the same 401.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let credentials = LoginCredentials::try_from(payload.into_inner())?;
    let outcome = state.accounts.login(&credentials).await?;
    Ok(web::Json(outcome.into()))
}

/// Whether an email is already registered.
#[utoipa::path(
    get,
    path = "/api/v1/users/check-email/{email}",
    params(("email" = String, Path, description = "Login identifier to check")),
    responses(
        (status = 200, description = "Availability", body = EmailCheckResponse),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["users"],
    operation_id = "checkEmail",
    security([])
)]
#[get("/users/check-email/{email}")]
pub async fn check_email(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<EmailCheckResponse>> {
    let email = EmailAddress::new(path.into_inner()).map_err(|err| map_user_validation_error(&err))?;
    let exists = state.accounts.email_exists(&email).await?;
    Ok(web::Json(EmailCheckResponse {
        email: email.into(),
        exists,
    }))
}

/// List every account. Administrators only.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers",
    security(("BearerAuth" = []))
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let users = state.accounts.list_users(caller.context()).await?;
    Ok(web::Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Fetch one account: the caller's own, or any for administrators.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = uuid::Uuid, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser",
    security(("BearerAuth" = []))
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    let id = parse_user_id(&path, FieldName::new("id"))?;
    let user = state.accounts.get_user(caller.context(), &id).await?;
    Ok(web::Json(user.into()))
}

/// Update an account. Role and active flag are administrator-only fields.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = uuid::Uuid, Path, description = "User identifier")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser",
    security(("BearerAuth" = []))
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let id = parse_user_id(&path, FieldName::new("id"))?;
    let changes = UserUpdate::try_from(payload.into_inner())?;
    let user = state
        .accounts
        .update_user(caller.context(), &id, changes)
        .await?;
    Ok(web::Json(user.into()))
}

/// Change a password. Account holders confirm the current one; administrators
/// reset other accounts without it.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/password",
    params(("id" = uuid::Uuid, Path, description = "User identifier")),
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised or wrong current password", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "changePassword",
    security(("BearerAuth" = []))
)]
#[put("/users/{id}/password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path, FieldName::new("id"))?;
    let change = PasswordChange::try_from(payload.into_inner())?;
    state
        .accounts
        .change_password(caller.context(), &id, change)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete an account. Administrators only.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = uuid::Uuid, Path, description = "User identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "User still owns items or requests", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser",
    security(("BearerAuth" = []))
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path, FieldName::new("id"))?;
    state.accounts.delete_user(caller.context(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests;
