//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{ClaimWorkflow, ItemCatalogue, Statistics, UserAccounts};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn UserAccounts>,
    pub items: Arc<dyn ItemCatalogue>,
    pub claims: Arc<dyn ClaimWorkflow>,
    pub statistics: Arc<dyn Statistics>,
}

impl HttpState {
    /// Bundle the driving ports.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use lostfound::domain::ports::{ClaimWorkflow, ItemCatalogue, Statistics, UserAccounts};
    /// use lostfound::inbound::http::state::HttpState;
    ///
    /// fn state(
    ///     accounts: Arc<dyn UserAccounts>,
    ///     items: Arc<dyn ItemCatalogue>,
    ///     claims: Arc<dyn ClaimWorkflow>,
    ///     statistics: Arc<dyn Statistics>,
    /// ) -> HttpState {
    ///     HttpState::new(accounts, items, claims, statistics)
    /// }
    /// ```
    pub fn new(
        accounts: Arc<dyn UserAccounts>,
        items: Arc<dyn ItemCatalogue>,
        claims: Arc<dyn ClaimWorkflow>,
        statistics: Arc<dyn Statistics>,
    ) -> Self {
        Self {
            accounts,
            items,
            claims,
            statistics,
        }
    }
}
