//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **memory**: process-local stores used when no database is configured
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **password**: Argon2id password verifiers
//! - **notifier**: structured-log workflow notifications
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic
//! beyond the conditional writes their ports require.

pub mod memory;
pub mod notifier;
pub mod password;
pub mod persistence;
