//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod claim_request_repository;
mod claim_workflow;
mod item_catalogue;
mod item_repository;
mod password_hasher;
mod statistics;
mod user_accounts;
mod user_repository;
mod workflow_notifier;

#[cfg(test)]
pub use claim_request_repository::MockClaimRequestRepository;
pub use claim_request_repository::{
    ClaimRequestPersistenceError, ClaimRequestRepository, DecisionOutcome, FilingOutcome,
};
#[cfg(test)]
pub use claim_workflow::MockClaimWorkflow;
pub use claim_workflow::ClaimWorkflow;
#[cfg(test)]
pub use item_catalogue::MockItemCatalogue;
pub use item_catalogue::{ItemCatalogue, ReportItem};
#[cfg(test)]
pub use item_repository::MockItemRepository;
pub use item_repository::{ItemPersistenceError, ItemRepository, StatusTransition};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use statistics::MockStatistics;
pub use statistics::Statistics;
#[cfg(test)]
pub use user_accounts::MockUserAccounts;
pub use user_accounts::{LoginOutcome, UserAccounts, UserUpdate};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserDeletion, UserDeletionPolicy, UserPersistenceError, UserRepository};
#[cfg(test)]
pub use workflow_notifier::MockWorkflowNotifier;
pub use workflow_notifier::{NoOpWorkflowNotifier, WorkflowEvent, WorkflowNotifier};
