//! Driving port for office-wide counts.

use async_trait::async_trait;

use crate::domain::{AccessContext, Error, OfficeStatistics};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Statistics: Send + Sync {
    /// Item, request, and account counts. Administrators only.
    async fn office_statistics(&self, caller: &AccessContext) -> Result<OfficeStatistics, Error>;
}
