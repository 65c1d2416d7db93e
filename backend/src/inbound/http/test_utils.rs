//! Test helpers for inbound HTTP components.
//!
//! [`TestApp`] wires the real services over an in-memory store so handler
//! tests exercise the same stack the server runs, minus the network.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use argon2::Params;

use crate::domain::ports::{NoOpWorkflowNotifier, UserRepository};
use crate::domain::{
    AccessGate, ClaimWorkflowService, ItemCatalogueService, PublicRoutes, Role,
    StatisticsService, TokenService, User, UserAccountService,
};
use crate::inbound::http::configure_api;
use crate::inbound::http::state::HttpState;
use crate::middleware::Authenticate;
use crate::outbound::memory::MemoryStore;
use crate::outbound::password::Argon2PasswordHasher;
use crate::test_support::{MutableClock, fixture_now, token_service, user};

/// Argon2 hasher tuned down so tests stay fast.
pub fn fast_hasher() -> Argon2PasswordHasher {
    let params = Params::new(Params::MIN_M_COST, 1, 1, None)
        .unwrap_or_else(|err| panic!("argon2 test params: {err}"));
    Argon2PasswordHasher::with_params(params)
}

/// In-memory application under test.
pub struct TestApp {
    pub store: MemoryStore,
    pub clock: Arc<MutableClock>,
    pub tokens: TokenService,
    state: HttpState,
    gate: AccessGate,
}

impl TestApp {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let clock = Arc::new(MutableClock::new(fixture_now()));
        let tokens = token_service(clock.clone());
        let shared = Arc::new(store.clone());
        let notifier = Arc::new(NoOpWorkflowNotifier);

        let accounts = UserAccountService::new(
            shared.clone(),
            Arc::new(fast_hasher()),
            tokens.clone(),
            clock.clone(),
        );
        let items = ItemCatalogueService::new(
            shared.clone(),
            shared.clone(),
            notifier.clone(),
            clock.clone(),
        );
        let statistics = StatisticsService::new(shared.clone(), shared.clone(), shared.clone());
        let claims = ClaimWorkflowService::new(
            shared.clone(),
            shared.clone(),
            shared.clone(),
            notifier,
            clock.clone(),
        );
        let state = HttpState::new(
            Arc::new(accounts),
            Arc::new(items),
            Arc::new(claims),
            Arc::new(statistics),
        );
        let gate = AccessGate::new(PublicRoutes::default(), tokens.clone(), shared);

        Self {
            store,
            clock,
            tokens,
            state,
            gate,
        }
    }

    /// Actix app with authentication and every API route.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(web::Data::new(self.state.clone()))
            .wrap(Authenticate::new(self.gate.clone()))
            .service(web::scope("/api/v1").configure(configure_api))
    }

    /// Store a user directly and return it with a bearer header value.
    pub async fn seed_user(&self, email: &str, role: Role) -> (User, String) {
        let seeded = user(email, role);
        UserRepository::insert(&self.store, &seeded)
            .await
            .unwrap_or_else(|err| panic!("seed {email}: {err}"));
        let bearer = self.bearer(&seeded);
        (seeded, bearer)
    }

    /// `Authorization` header value for `user`.
    pub fn bearer(&self, user: &User) -> String {
        let issued = self
            .tokens
            .issue(user)
            .unwrap_or_else(|err| panic!("issue token: {err}"));
        format!("Bearer {}", issued.token)
    }
}
