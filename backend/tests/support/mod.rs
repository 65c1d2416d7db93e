//! Shared harness for HTTP integration tests.
//!
//! Builds the production service stack over in-memory stores with a clock
//! the tests can move forward.

use std::sync::{Arc, Mutex};

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use argon2::Params;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use lostfound::Trace;
use lostfound::domain::ports::{NoOpWorkflowNotifier, UserRepository};
use lostfound::domain::{
    AccessContext, AccessGate, ClaimWorkflowService, DisplayName, EmailAddress,
    ItemCatalogueService, PasswordHash, Principal, PublicRoutes, Role, StatisticsService,
    TokenService, TokenSigningKey, User, UserAccountService, UserId,
};
use lostfound::inbound::http::configure_api;
use lostfound::inbound::http::state::HttpState;
use lostfound::middleware::Authenticate;
use lostfound::outbound::memory::MemoryStore;
use lostfound::outbound::password::Argon2PasswordHasher;

/// Service type for the in-memory claim workflow.
pub type MemoryClaims = ClaimWorkflowService<MemoryStore, MemoryStore, MemoryStore>;

/// Clock pinned to an instant that tests advance by hand.
pub struct TestClock(Mutex<DateTime<Utc>>);

impl TestClock {
    pub fn new() -> Self {
        let start = Utc
            .with_ymd_and_hms(2026, 3, 14, 9, 0, 0)
            .single()
            .expect("valid start instant");
        Self(Mutex::new(start))
    }

    pub fn advance(&self, delta: TimeDelta) {
        *self.0.lock().expect("clock lock") += delta;
    }
}

impl Clock for TestClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock lock")
    }
}

/// In-memory deployment of the API.
pub struct Harness {
    pub clock: Arc<TestClock>,
    pub tokens: TokenService,
    pub claims: Arc<MemoryClaims>,
    pub store: MemoryStore,
    state: HttpState,
    gate: AccessGate,
}

impl Harness {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let shared = Arc::new(store.clone());
        let clock = Arc::new(TestClock::new());
        let key = TokenSigningKey::from_bytes(b"integration-tests-signing-key-32b".to_vec())
            .expect("valid key");
        let tokens = TokenService::new(key, clock.clone());
        let notifier = Arc::new(NoOpWorkflowNotifier);
        let params = Params::new(Params::MIN_M_COST, 1, 1, None).expect("argon2 params");

        let accounts = UserAccountService::new(
            shared.clone(),
            Arc::new(Argon2PasswordHasher::with_params(params)),
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
        let claims = Arc::new(ClaimWorkflowService::new(
            shared.clone(),
            shared.clone(),
            shared.clone(),
            notifier,
            clock.clone(),
        ));
        let state = HttpState::new(
            Arc::new(accounts),
            Arc::new(items),
            claims.clone(),
            Arc::new(statistics),
        );
        let gate = AccessGate::new(PublicRoutes::default(), tokens.clone(), shared);

        Self {
            clock,
            tokens,
            claims,
            store,
            state,
            gate,
        }
    }

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
            .wrap(Trace)
            .service(web::scope("/api/v1").configure(configure_api))
    }

    /// Change the stored role of a registered account.
    pub async fn promote(&self, email: &str, role: Role) {
        let email = EmailAddress::new(email).expect("valid email");
        let mut user = self
            .store
            .find_by_email(&email)
            .await
            .expect("lookup user")
            .expect("user registered");
        user.role = role;
        assert!(self.store.update(&user).await.expect("update user"));
    }

    /// Store an account directly and return the context it would resolve to.
    pub async fn seed(&self, email: &str, role: Role) -> (User, AccessContext) {
        let user = User {
            id: UserId::random(),
            email: EmailAddress::new(email).expect("valid email"),
            display_name: DisplayName::new(email).expect("valid name"),
            department: None,
            role,
            password_hash: PasswordHash::from_encoded("unused"),
            active: true,
            registered_at: self.clock.utc(),
        };
        UserRepository::insert(&self.store, &user)
            .await
            .expect("seed user");
        let context = AccessContext::Authenticated(Principal::from_user(&user));
        (user, context)
    }
}
