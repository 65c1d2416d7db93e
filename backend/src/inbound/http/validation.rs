//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every payload problem is reported as `invalid_request` with
//! `details = { field, code[, value] }` so clients can point at the input.

use std::str::FromStr;

use serde_json::json;

use crate::domain::{
    ClaimRequestId, Error, ItemId, ItemKind, ItemStatus, ItemValidationError, LoginValidationError,
    PasswordChangeValidationError, RegistrationValidationError, Role, UserId, UserValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    TooLong,
    InvalidEmail,
    InvalidPassword,
    UnknownRole,
    UnknownStatus,
    UnknownKind,
}

impl ErrorCode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidUuid => "invalid_uuid",
            Self::TooLong => "too_long",
            Self::InvalidEmail => "invalid_email",
            Self::InvalidPassword => "invalid_password",
            Self::UnknownRole => "unknown_role",
            Self::UnknownStatus => "unknown_status",
            Self::UnknownKind => "unknown_kind",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    const fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

fn field_value_error(
    field: FieldName,
    code: ErrorCode,
    message: impl Into<String>,
    value: &str,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    field_error(
        field,
        ErrorCode::MissingField,
        format!("missing required field: {}", field.as_str()),
    )
}

fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    field_value_error(
        field,
        ErrorCode::InvalidUuid,
        format!("{} must be a valid UUID", field.as_str()),
        value,
    )
}

fn parse_id<T: FromStr>(value: &str, field: FieldName) -> Result<T, Error> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    parse_id(value, field)
}

pub(crate) fn parse_item_id(value: &str, field: FieldName) -> Result<ItemId, Error> {
    parse_id(value, field)
}

pub(crate) fn parse_request_id(value: &str, field: FieldName) -> Result<ClaimRequestId, Error> {
    parse_id(value, field)
}

pub(crate) fn parse_role(value: &str, field: FieldName) -> Result<Role, Error> {
    value.parse::<Role>().map_err(|_| {
        field_value_error(
            field,
            ErrorCode::UnknownRole,
            "role must be one of USER, STAFF, ADMIN",
            value,
        )
    })
}

pub(crate) fn parse_item_status(value: &str, field: FieldName) -> Result<ItemStatus, Error> {
    value.parse::<ItemStatus>().map_err(|_| {
        field_value_error(
            field,
            ErrorCode::UnknownStatus,
            format!("unknown item status: {value}"),
            value,
        )
    })
}

pub(crate) fn parse_item_kind(value: &str, field: FieldName) -> Result<ItemKind, Error> {
    value.parse::<ItemKind>().map_err(|_| {
        field_value_error(
            field,
            ErrorCode::UnknownKind,
            "kind must be LOST or FOUND",
            value,
        )
    })
}

/// Map user value-type failures onto the offending field.
pub(crate) fn map_user_validation_error(err: &UserValidationError) -> Error {
    let message = err.to_string();
    match err {
        UserValidationError::InvalidId => {
            field_error(FieldName::new("id"), ErrorCode::InvalidUuid, message)
        }
        UserValidationError::EmptyEmail => {
            field_error(FieldName::new("email"), ErrorCode::MissingField, message)
        }
        UserValidationError::EmailTooLong { .. } => {
            field_error(FieldName::new("email"), ErrorCode::TooLong, message)
        }
        UserValidationError::MalformedEmail => {
            field_error(FieldName::new("email"), ErrorCode::InvalidEmail, message)
        }
        UserValidationError::EmptyDisplayName => {
            field_error(FieldName::new("name"), ErrorCode::MissingField, message)
        }
        UserValidationError::DisplayNameTooLong { .. } => {
            field_error(FieldName::new("name"), ErrorCode::TooLong, message)
        }
        UserValidationError::DepartmentTooLong { .. } => {
            field_error(FieldName::new("department"), ErrorCode::TooLong, message)
        }
        UserValidationError::UnknownRole(_) => {
            field_error(FieldName::new("role"), ErrorCode::UnknownRole, message)
        }
    }
}

pub(crate) fn map_registration_error(err: &RegistrationValidationError) -> Error {
    match err {
        RegistrationValidationError::Field(inner) => map_user_validation_error(inner),
        RegistrationValidationError::PasswordLength { .. } => field_error(
            FieldName::new("password"),
            ErrorCode::InvalidPassword,
            err.to_string(),
        ),
    }
}

pub(crate) fn map_password_change_error(err: &PasswordChangeValidationError) -> Error {
    match err {
        PasswordChangeValidationError::PasswordLength { .. } => field_error(
            FieldName::new("newPassword"),
            ErrorCode::InvalidPassword,
            err.to_string(),
        ),
    }
}

pub(crate) fn map_login_validation_error(err: &LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyEmail => {
            field_error(FieldName::new("email"), ErrorCode::MissingField, err.to_string())
        }
        LoginValidationError::EmptyPassword => field_error(
            FieldName::new("password"),
            ErrorCode::MissingField,
            err.to_string(),
        ),
    }
}

pub(crate) fn map_item_validation_error(err: &ItemValidationError) -> Error {
    let message = err.to_string();
    match err {
        ItemValidationError::InvalidId => {
            field_error(FieldName::new("id"), ErrorCode::InvalidUuid, message)
        }
        ItemValidationError::EmptyField { field } => {
            field_error(FieldName::new(*field), ErrorCode::MissingField, message)
        }
        ItemValidationError::FieldTooLong { field, .. } => {
            field_error(FieldName::new(*field), ErrorCode::TooLong, message)
        }
        ItemValidationError::UnknownStatus(_) => {
            field_error(FieldName::new("status"), ErrorCode::UnknownStatus, message)
        }
        ItemValidationError::UnknownKind(_) => {
            field_error(FieldName::new("kind"), ErrorCode::UnknownKind, message)
        }
    }
}
