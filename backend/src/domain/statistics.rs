//! Office-wide counts of items, claim requests, and accounts.
//!
//! [`StatisticsService`] reads whole listings from the stores and folds them
//! into an [`OfficeStatistics`] snapshot. Counts are consistent per store,
//! not across stores.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{ClaimRequestRepository, ItemRepository, Statistics, UserRepository};
use crate::domain::{
    AccessContext, Capability, ClaimRequest, ClaimStatus, Error, Item, ItemFilter, ItemKind,
    ItemStatus, Role, User, WorkflowError,
};

/// Item counts. Items reported without a kind count toward neither
/// `lost` nor `found`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemCounts {
    pub total: usize,
    pub lost: usize,
    pub found: usize,
    /// One entry per status in [`ItemStatus::ALL`] order, zeros included.
    pub by_status: Vec<(ItemStatus, usize)>,
}

impl ItemCounts {
    /// Count for one status.
    pub fn with_status(&self, status: ItemStatus) -> usize {
        self.by_status
            .iter()
            .find_map(|(candidate, count)| (*candidate == status).then_some(*count))
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestCounts {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserCounts {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub users: usize,
    pub staff: usize,
    pub admins: usize,
}

/// Snapshot returned to administrators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfficeStatistics {
    pub items: ItemCounts,
    pub requests: RequestCounts,
    pub users: UserCounts,
}

impl OfficeStatistics {
    /// Fold listings into counts.
    ///
    /// # Examples
    /// ```
    /// use lostfound::domain::OfficeStatistics;
    ///
    /// let empty = OfficeStatistics::tally(&[], &[], &[]);
    /// assert_eq!(empty.items.total, 0);
    /// assert_eq!(empty.items.by_status.len(), 7);
    /// ```
    pub fn tally(users: &[User], items: &[Item], requests: &[ClaimRequest]) -> Self {
        let by_status = ItemStatus::ALL
            .iter()
            .map(|status| {
                let count = items.iter().filter(|item| item.status == *status).count();
                (*status, count)
            })
            .collect();
        let of_kind = |kind| {
            items
                .iter()
                .filter(|item| item.details.kind() == Some(kind))
                .count()
        };
        let item_counts = ItemCounts {
            total: items.len(),
            lost: of_kind(ItemKind::Lost),
            found: of_kind(ItemKind::Found),
            by_status,
        };

        let mut request_counts = RequestCounts {
            total: requests.len(),
            ..RequestCounts::default()
        };
        for request in requests {
            match request.status {
                ClaimStatus::Pending => request_counts.pending += 1,
                ClaimStatus::Approved => request_counts.approved += 1,
                ClaimStatus::Rejected => request_counts.rejected += 1,
            }
        }

        let mut user_counts = UserCounts {
            total: users.len(),
            ..UserCounts::default()
        };
        for user in users {
            if user.active {
                user_counts.active += 1;
            } else {
                user_counts.inactive += 1;
            }
            match user.role {
                Role::User => user_counts.users += 1,
                Role::Staff => user_counts.staff += 1,
                Role::Admin => user_counts.admins += 1,
            }
        }

        Self {
            items: item_counts,
            requests: request_counts,
            users: user_counts,
        }
    }
}

/// Statistics service implementing the [`Statistics`] driving port.
#[derive(Clone)]
pub struct StatisticsService<U, I, R> {
    users: Arc<U>,
    items: Arc<I>,
    requests: Arc<R>,
}

impl<U, I, R> StatisticsService<U, I, R> {
    pub fn new(users: Arc<U>, items: Arc<I>, requests: Arc<R>) -> Self {
        Self {
            users,
            items,
            requests,
        }
    }
}

impl<U, I, R> StatisticsService<U, I, R>
where
    U: UserRepository,
    I: ItemRepository,
    R: ClaimRequestRepository,
{
    /// Current counts. Needs [`Capability::ViewStatistics`].
    pub async fn snapshot(
        &self,
        caller: &AccessContext,
    ) -> Result<OfficeStatistics, WorkflowError> {
        caller.require(Capability::ViewStatistics)?;
        let users = self.users.list().await?;
        let items = self.items.list(&ItemFilter::default()).await?;
        let requests = self.requests.list_all().await?;
        let statistics = OfficeStatistics::tally(&users, &items, &requests);
        debug!(
            items = statistics.items.total,
            requests = statistics.requests.total,
            users = statistics.users.total,
            "statistics computed"
        );
        Ok(statistics)
    }
}

#[async_trait]
impl<U, I, R> Statistics for StatisticsService<U, I, R>
where
    U: UserRepository,
    I: ItemRepository,
    R: ClaimRequestRepository,
{
    async fn office_statistics(&self, caller: &AccessContext) -> Result<OfficeStatistics, Error> {
        self.snapshot(caller).await.map_err(Error::from)
    }
}
