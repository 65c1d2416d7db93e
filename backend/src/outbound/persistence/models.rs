//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain records live here
//! too, so a row that no longer satisfies domain validation surfaces as a
//! query error instead of a panic.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    ClaimRequest, ClaimRequestId, ClaimStatus, DisplayName, EmailAddress, Item, ItemDetails,
    ItemId, ItemKind, ItemStatus, PasswordHash, Role, User, UserId,
};

use super::schema::{claim_requests, items, users};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub department: Option<String>,
    pub role: String,
    pub password_hash: String,
    pub active: bool,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub display_name: &'a str,
    pub department: Option<&'a str>,
    pub role: &'a str,
    pub password_hash: &'a str,
    pub active: bool,
    pub registered_at: DateTime<Utc>,
}

impl<'a> From<&'a User> for NewUserRow<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            email: user.email.as_ref(),
            display_name: user.display_name.as_ref(),
            department: user.department.as_deref(),
            role: user.role.as_str(),
            password_hash: user.password_hash.as_encoded(),
            active: user.active,
            registered_at: user.registered_at,
        }
    }
}

/// Mutable profile columns. Identity and registration time never change.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserChanges<'a> {
    pub email: &'a str,
    pub display_name: &'a str,
    pub department: Option<&'a str>,
    pub role: &'a str,
    pub password_hash: &'a str,
    pub active: bool,
}

impl<'a> From<&'a User> for UserChanges<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            email: user.email.as_ref(),
            display_name: user.display_name.as_ref(),
            department: user.department.as_deref(),
            role: user.role.as_str(),
            password_hash: user.password_hash.as_encoded(),
            active: user.active,
        }
    }
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::from_uuid(row.id),
            email: EmailAddress::new(&row.email).map_err(|err| err.to_string())?,
            display_name: DisplayName::new(&row.display_name).map_err(|err| err.to_string())?,
            department: row.department,
            role: row.role.parse::<Role>().map_err(|err| err.to_string())?,
            password_hash: PasswordHash::from_encoded(row.password_hash),
            active: row.active,
            registered_at: row.registered_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ItemRow {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub name: String,
    pub description: String,
    pub location: String,
    pub category: Option<String>,
    pub kind: Option<String>,
    pub status: String,
    pub reported_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = items)]
pub(crate) struct NewItemRow<'a> {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub name: &'a str,
    pub description: &'a str,
    pub location: &'a str,
    pub category: Option<&'a str>,
    pub kind: Option<&'a str>,
    pub status: &'a str,
    pub reported_at: DateTime<Utc>,
}

impl<'a> From<&'a Item> for NewItemRow<'a> {
    fn from(item: &'a Item) -> Self {
        Self {
            id: *item.id.as_uuid(),
            reporter_id: *item.reporter.as_uuid(),
            name: item.details.name(),
            description: item.details.description(),
            location: item.details.location(),
            category: item.details.category(),
            kind: item.details.kind().map(ItemKind::as_str),
            status: item.status.as_str(),
            reported_at: item.reported_at,
        }
    }
}

/// Descriptive columns only; status is never written through this changeset.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = items)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ItemDetailsUpdate<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub location: &'a str,
    pub category: Option<&'a str>,
    pub kind: Option<&'a str>,
}

impl<'a> From<&'a ItemDetails> for ItemDetailsUpdate<'a> {
    fn from(details: &'a ItemDetails) -> Self {
        Self {
            name: details.name(),
            description: details.description(),
            location: details.location(),
            category: details.category(),
            kind: details.kind().map(ItemKind::as_str),
        }
    }
}

impl TryFrom<ItemRow> for Item {
    type Error = String;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let kind = row
            .kind
            .as_deref()
            .map(str::parse::<ItemKind>)
            .transpose()
            .map_err(|err| err.to_string())?;
        let details = ItemDetails::try_new(
            &row.name,
            &row.description,
            &row.location,
            row.category.as_deref(),
            kind,
        )
        .map_err(|err| err.to_string())?;
        Ok(Self {
            id: ItemId::from_uuid(row.id),
            details,
            reporter: UserId::from_uuid(row.reporter_id),
            status: row.status.parse::<ItemStatus>().map_err(|err| err.to_string())?,
            reported_at: row.reported_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Claim requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = claim_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ClaimRequestRow {
    pub id: Uuid,
    pub item_id: Uuid,
    pub requester_id: Uuid,
    pub status: String,
    pub requested_at: DateTime<Utc>,
    pub approved_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = claim_requests)]
pub(crate) struct NewClaimRequestRow<'a> {
    pub id: Uuid,
    pub item_id: Uuid,
    pub requester_id: Uuid,
    pub status: &'a str,
    pub requested_at: DateTime<Utc>,
    pub approved_date: Option<NaiveDate>,
}

impl<'a> From<&'a ClaimRequest> for NewClaimRequestRow<'a> {
    fn from(request: &'a ClaimRequest) -> Self {
        Self {
            id: *request.id.as_uuid(),
            item_id: *request.item_id.as_uuid(),
            requester_id: *request.requester.as_uuid(),
            status: request.status.as_str(),
            requested_at: request.requested_at,
            approved_date: request.approved_date,
        }
    }
}

impl TryFrom<ClaimRequestRow> for ClaimRequest {
    type Error = String;

    fn try_from(row: ClaimRequestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ClaimRequestId::from_uuid(row.id),
            item_id: ItemId::from_uuid(row.item_id),
            requester: UserId::from_uuid(row.requester_id),
            status: row.status.parse::<ClaimStatus>().map_err(|err| err.to_string())?,
            requested_at: row.requested_at,
            approved_date: row.approved_date,
        })
    }
}
