//! Lost-and-found items and their lifecycle status.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UserId;
use super::identifier::uuid_identifier;

/// Validation errors raised by item value types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemValidationError {
    #[error("item id must be a valid UUID")]
    InvalidId,
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    FieldTooLong { field: &'static str, max: usize },
    #[error("unknown item status: {0}")]
    UnknownStatus(String),
    #[error("unknown item kind: {0}")]
    UnknownKind(String),
}

uuid_identifier!(
    /// Stable item identifier.
    ItemId,
    ItemValidationError,
    ItemValidationError::InvalidId
);

/// Lifecycle status of an item.
///
/// `Claimed` is reached only when a claim request is approved. `Returned`
/// and `Expired` close the item for claims as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    Open,
    PendingReview,
    Approved,
    Rejected,
    Claimed,
    Returned,
    Expired,
}

impl ItemStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Open,
        Self::PendingReview,
        Self::Approved,
        Self::Rejected,
        Self::Claimed,
        Self::Returned,
        Self::Expired,
    ];

    /// Stable wire/storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::PendingReview => "PENDING_REVIEW",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Claimed => "CLAIMED",
            Self::Returned => "RETURNED",
            Self::Expired => "EXPIRED",
        }
    }

    /// Whether new claim requests may be filed, and approved, against the item.
    pub const fn is_claimable(self) -> bool {
        matches!(
            self,
            Self::Open | Self::PendingReview | Self::Approved | Self::Rejected
        )
    }

    /// Whether the item was handed over through an approved claim.
    pub const fn was_claimed(self) -> bool {
        matches!(self, Self::Claimed | Self::Returned)
    }

    /// Whether moderation may move an item from `self` to `next`.
    ///
    /// `Claimed` is never a moderation target; it belongs to claim approval.
    /// The only move out of `Claimed` is to `Returned`.
    pub const fn can_review_to(self, next: Self) -> bool {
        match (self, next) {
            (_, Self::Claimed) => false,
            (Self::Claimed, Self::Returned) => true,
            (Self::Claimed | Self::Returned, _) => false,
            (Self::Expired, Self::Open) => true,
            (Self::Expired, _) => false,
            (_, Self::Returned) => false,
            (current, target) => !matches_status(current, target),
        }
    }
}

const fn matches_status(a: ItemStatus, b: ItemStatus) -> bool {
    a as u8 == b as u8
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = ItemValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ItemValidationError::UnknownStatus(s.to_owned()))
    }
}

/// Whether the item was reported lost by its owner or found by someone else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemKind {
    Lost,
    Found,
}

impl ItemKind {
    /// Stable wire/storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lost => "LOST",
            Self::Found => "FOUND",
        }
    }
}

impl FromStr for ItemKind {
    type Err = ItemValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOST" => Ok(Self::Lost),
            "FOUND" => Ok(Self::Found),
            _ => Err(ItemValidationError::UnknownKind(s.to_owned())),
        }
    }
}

const NAME_MAX: usize = 120;
const DESCRIPTION_MAX: usize = 2000;
const LOCATION_MAX: usize = 200;
const CATEGORY_MAX: usize = 64;

fn required(field: &'static str, raw: &str, max: usize) -> Result<String, ItemValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ItemValidationError::EmptyField { field });
    }
    if trimmed.chars().count() > max {
        return Err(ItemValidationError::FieldTooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

/// Descriptive fields of an item. Never carries status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDetails {
    name: String,
    description: String,
    location: String,
    category: Option<String>,
    kind: Option<ItemKind>,
}

impl ItemDetails {
    /// Validate descriptive fields; text is trimmed and a blank category is
    /// treated as absent.
    ///
    /// # Examples
    /// ```
    /// use lostfound::domain::{ItemDetails, ItemKind};
    ///
    /// let details = ItemDetails::try_new(" Umbrella ", "Black", "Library", Some(""), Some(ItemKind::Found))
    ///     .unwrap();
    /// assert_eq!(details.name(), "Umbrella");
    /// assert!(details.category().is_none());
    /// ```
    pub fn try_new(
        name: &str,
        description: &str,
        location: &str,
        category: Option<&str>,
        kind: Option<ItemKind>,
    ) -> Result<Self, ItemValidationError> {
        let category = match category.map(str::trim) {
            None | Some("") => None,
            Some(value) if value.chars().count() > CATEGORY_MAX => {
                return Err(ItemValidationError::FieldTooLong {
                    field: "category",
                    max: CATEGORY_MAX,
                });
            }
            Some(value) => Some(value.to_owned()),
        };
        Ok(Self {
            name: required("name", name, NAME_MAX)?,
            description: required("description", description, DESCRIPTION_MAX)?,
            location: required("location", location, LOCATION_MAX)?,
            category,
            kind,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn kind(&self) -> Option<ItemKind> {
        self.kind
    }
}

/// Stored item record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub details: ItemDetails,
    /// User who reported the item; owns it for deletion purposes.
    pub reporter: UserId,
    pub status: ItemStatus,
    pub reported_at: DateTime<Utc>,
}

/// Filter applied by item listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub status: Option<ItemStatus>,
    pub reporter: Option<UserId>,
}

impl ItemFilter {
    /// Whether `item` passes the filter.
    pub fn matches(&self, item: &Item) -> bool {
        self.status.is_none_or(|status| item.status == status)
            && self.reporter.is_none_or(|reporter| item.reporter == reporter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ItemStatus::Open, true)]
    #[case(ItemStatus::PendingReview, true)]
    #[case(ItemStatus::Approved, true)]
    #[case(ItemStatus::Rejected, true)]
    #[case(ItemStatus::Claimed, false)]
    #[case(ItemStatus::Returned, false)]
    #[case(ItemStatus::Expired, false)]
    fn claimability(#[case] status: ItemStatus, #[case] expected: bool) {
        assert_eq!(status.is_claimable(), expected);
    }

    #[rstest]
    fn claimed_is_never_a_review_target() {
        for status in ItemStatus::ALL {
            assert!(!status.can_review_to(ItemStatus::Claimed), "{status}");
        }
    }

    #[rstest]
    #[case(ItemStatus::Open, ItemStatus::PendingReview, true)]
    #[case(ItemStatus::PendingReview, ItemStatus::Approved, true)]
    #[case(ItemStatus::Approved, ItemStatus::Expired, true)]
    #[case(ItemStatus::Rejected, ItemStatus::Open, true)]
    #[case(ItemStatus::Open, ItemStatus::Open, false)]
    #[case(ItemStatus::Open, ItemStatus::Returned, false)]
    #[case(ItemStatus::Claimed, ItemStatus::Returned, true)]
    #[case(ItemStatus::Claimed, ItemStatus::Open, false)]
    #[case(ItemStatus::Returned, ItemStatus::Open, false)]
    #[case(ItemStatus::Expired, ItemStatus::Open, true)]
    #[case(ItemStatus::Expired, ItemStatus::Approved, false)]
    fn review_transitions(
        #[case] from: ItemStatus,
        #[case] to: ItemStatus,
        #[case] expected: bool,
    ) {
        assert_eq!(from.can_review_to(to), expected);
    }

    #[rstest]
    fn status_parses_wire_form() {
        for status in ItemStatus::ALL {
            assert_eq!(status.as_str().parse::<ItemStatus>(), Ok(status));
        }
        assert_eq!("pending_review".parse(), Ok(ItemStatus::PendingReview));
        assert!("LOST".parse::<ItemStatus>().is_err());
    }

    #[rstest]
    #[case("", "d", "l", ItemValidationError::EmptyField { field: "name" })]
    #[case("n", " ", "l", ItemValidationError::EmptyField { field: "description" })]
    #[case("n", "d", "", ItemValidationError::EmptyField { field: "location" })]
    fn details_require_text(
        #[case] name: &str,
        #[case] description: &str,
        #[case] location: &str,
        #[case] expected: ItemValidationError,
    ) {
        let err = ItemDetails::try_new(name, description, location, None, None)
            .expect_err("blank field must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn details_bound_name_length() {
        let err = ItemDetails::try_new(&"n".repeat(NAME_MAX + 1), "d", "l", None, None)
            .expect_err("overlong name must fail");
        assert_eq!(
            err,
            ItemValidationError::FieldTooLong {
                field: "name",
                max: NAME_MAX
            }
        );
    }

    #[rstest]
    fn filter_matches_status_and_reporter() {
        let reporter = UserId::random();
        let item = Item {
            id: ItemId::random(),
            details: ItemDetails::try_new("Wallet", "Brown", "Cafe", Some("Accessories"), None)
                .expect("valid details"),
            reporter,
            status: ItemStatus::Open,
            reported_at: Utc::now(),
        };
        assert!(ItemFilter::default().matches(&item));
        assert!(
            ItemFilter {
                status: Some(ItemStatus::Open),
                reporter: Some(reporter),
            }
            .matches(&item)
        );
        assert!(
            !ItemFilter {
                status: Some(ItemStatus::Claimed),
                reporter: None,
            }
            .matches(&item)
        );
        assert!(
            !ItemFilter {
                status: None,
                reporter: Some(UserId::random()),
            }
            .matches(&item)
        );
    }
}
