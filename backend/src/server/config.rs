//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use lostfound::domain::TokenSigningKey;
use lostfound::domain::ports::UserDeletionPolicy;
use lostfound::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) signing_key: TokenSigningKey,
    pub(crate) deletion_policy: UserDeletionPolicy,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Configuration backed by in-memory stores.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, signing_key: TokenSigningKey) -> Self {
        Self {
            bind_addr,
            signing_key,
            deletion_policy: UserDeletionPolicy::default(),
            db_pool: None,
        }
    }

    /// Persist through PostgreSQL instead of the in-memory stores.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_deletion_policy(mut self, policy: UserDeletionPolicy) -> Self {
        self.deletion_policy = policy;
        self
    }

    /// Return the socket address the server will bind to.
    #[cfg_attr(
        not(any(test, doctest)),
        expect(dead_code, reason = "Exercised by tests; retained for fixture access")
    )]
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
