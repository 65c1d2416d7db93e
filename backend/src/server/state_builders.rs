//! Builders wiring stores, services and the access gate for the server.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use lostfound::domain::ports::{
    ClaimRequestRepository, ItemRepository, UserDeletionPolicy, UserRepository, WorkflowNotifier,
};
use lostfound::domain::{
    AccessGate, ClaimWorkflowService, ItemCatalogueService, PublicRoutes, StatisticsService,
    TokenService, UserAccountService,
};
use lostfound::inbound::http::state::HttpState;
use lostfound::outbound::memory::MemoryStore;
use lostfound::outbound::notifier::TracingWorkflowNotifier;
use lostfound::outbound::password::Argon2PasswordHasher;
use lostfound::outbound::persistence::{
    DieselClaimRequestRepository, DieselItemRepository, DieselUserRepository,
};

use super::ServerConfig;

/// Everything a worker's `App` needs, shared across workers.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) http: HttpState,
    pub(crate) gate: AccessGate,
}

struct Stores<U, I, R> {
    users: Arc<U>,
    items: Arc<I>,
    requests: Arc<R>,
}

fn wire<U, I, R>(
    stores: Stores<U, I, R>,
    tokens: TokenService,
    clock: Arc<dyn Clock>,
    deletion_policy: UserDeletionPolicy,
) -> AppState
where
    U: UserRepository + 'static,
    I: ItemRepository + 'static,
    R: ClaimRequestRepository + 'static,
{
    let Stores {
        users,
        items,
        requests,
    } = stores;
    let notifier: Arc<dyn WorkflowNotifier> = Arc::new(TracingWorkflowNotifier);

    let accounts = UserAccountService::new(
        users.clone(),
        Arc::new(Argon2PasswordHasher::new()),
        tokens.clone(),
        clock.clone(),
    )
    .with_deletion_policy(deletion_policy);
    let catalogue = ItemCatalogueService::new(
        users.clone(),
        items.clone(),
        notifier.clone(),
        clock.clone(),
    );
    let statistics = StatisticsService::new(users.clone(), items.clone(), requests.clone());
    let claims = ClaimWorkflowService::new(users.clone(), items, requests, notifier, clock);

    AppState {
        http: HttpState::new(
            Arc::new(accounts),
            Arc::new(catalogue),
            Arc::new(claims),
            Arc::new(statistics),
        ),
        gate: AccessGate::new(PublicRoutes::default(), tokens, users),
    }
}

/// Build application state over PostgreSQL when a pool is configured,
/// otherwise over a fresh in-memory store.
pub(crate) fn build_app_state(config: &ServerConfig) -> AppState {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let tokens = TokenService::new(config.signing_key.clone(), clock.clone());

    match &config.db_pool {
        Some(pool) => wire(
            Stores {
                users: Arc::new(DieselUserRepository::new(pool.clone())),
                items: Arc::new(DieselItemRepository::new(pool.clone())),
                requests: Arc::new(DieselClaimRequestRepository::new(pool.clone())),
            },
            tokens,
            clock,
            config.deletion_policy,
        ),
        None => {
            let store = Arc::new(MemoryStore::new());
            wire(
                Stores {
                    users: store.clone(),
                    items: store.clone(),
                    requests: store,
                },
                tokens,
                clock,
                config.deletion_policy,
            )
        }
    }
}
