//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the domain repository
//! ports backed by PostgreSQL via Diesel, with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. Workflow rules live in the domain services.
//! - **Internal models**: row structs (`models.rs`) and the table definitions
//!   (`schema.rs`) never leave this module.
//! - **Conditional writes**: every state transition that depends on a prior
//!   state runs in one transaction holding row locks, or as a single
//!   compare-and-set `UPDATE`.
//!
//! # Example
//!
//! ```ignore
//! use lostfound::outbound::persistence::{DbPool, PoolConfig, DieselUserRepository};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/lostfound")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_claim_request_repository;
mod diesel_item_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_claim_request_repository::DieselClaimRequestRepository;
pub use diesel_item_repository::DieselItemRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError, run_migrations};
