//! In-memory entity stores.
//!
//! One [`MemoryStore`] holds users, items, and requests behind a single lock,
//! so every multi-record transition (file, approve, cascade delete) happens
//! atomically with respect to all other callers. Data lives for the lifetime
//! of the process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::ports::{
    ClaimRequestPersistenceError, ClaimRequestRepository, DecisionOutcome, FilingOutcome,
    ItemPersistenceError, ItemRepository, StatusTransition, UserDeletion, UserDeletionPolicy,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    ClaimRequest, ClaimRequestId, EmailAddress, Item, ItemDetails, ItemFilter, ItemId, ItemStatus,
    User, UserId,
};

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, User>,
    items: HashMap<ItemId, Item>,
    requests: HashMap<ClaimRequestId, ClaimRequest>,
}

impl State {
    fn requests_touching(&self, user: UserId) -> Vec<ClaimRequestId> {
        self.requests
            .values()
            .filter(|request| {
                request.requester == user
                    || self
                        .items
                        .get(&request.item_id)
                        .is_some_and(|item| item.reporter == user)
            })
            .map(|request| request.id)
            .collect()
    }
}

/// Shared in-memory store implementing every repository port.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

const POISONED: &str = "in-memory store lock poisoned";

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Option<MutexGuard<'_, State>> {
        self.state.lock().ok()
    }
}

fn newest_first(mut requests: Vec<ClaimRequest>) -> Vec<ClaimRequest> {
    requests.sort_by(|a, b| {
        b.requested_at
            .cmp(&a.requested_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    requests
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut state = self.lock().ok_or_else(|| UserPersistenceError::query(POISONED))?;
        if state.users.values().any(|existing| existing.email == user.email) {
            return Err(UserPersistenceError::duplicate_email(user.email.as_ref()));
        }
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<bool, UserPersistenceError> {
        let mut state = self.lock().ok_or_else(|| UserPersistenceError::query(POISONED))?;
        if !state.users.contains_key(&user.id) {
            return Ok(false);
        }
        let taken = state
            .users
            .values()
            .any(|existing| existing.id != user.id && existing.email == user.email);
        if taken {
            return Err(UserPersistenceError::duplicate_email(user.email.as_ref()));
        }
        state.users.insert(user.id, user.clone());
        Ok(true)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock().ok_or_else(|| UserPersistenceError::query(POISONED))?;
        Ok(state.users.get(id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock().ok_or_else(|| UserPersistenceError::query(POISONED))?;
        Ok(state.users.values().find(|user| &user.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let state = self.lock().ok_or_else(|| UserPersistenceError::query(POISONED))?;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by(|a, b| {
            a.registered_at
                .cmp(&b.registered_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(users)
    }

    async fn delete(
        &self,
        id: &UserId,
        policy: UserDeletionPolicy,
    ) -> Result<UserDeletion, UserPersistenceError> {
        let mut state = self.lock().ok_or_else(|| UserPersistenceError::query(POISONED))?;
        if !state.users.contains_key(id) {
            return Ok(UserDeletion::NotFound);
        }
        let owned_items: Vec<ItemId> = state
            .items
            .values()
            .filter(|item| item.reporter == *id)
            .map(|item| item.id)
            .collect();
        let requests = state.requests_touching(*id);

        let has_dependents = !owned_items.is_empty() || !requests.is_empty();
        if policy == UserDeletionPolicy::Refuse && has_dependents {
            return Ok(UserDeletion::Referenced {
                items: owned_items.len(),
                requests: requests.len(),
            });
        }

        for request in &requests {
            state.requests.remove(request);
        }
        for item in &owned_items {
            state.items.remove(item);
        }
        state.users.remove(id);
        Ok(UserDeletion::Deleted {
            items: owned_items.len(),
            requests: requests.len(),
        })
    }
}

#[async_trait]
impl ItemRepository for MemoryStore {
    async fn insert(&self, item: &Item) -> Result<(), ItemPersistenceError> {
        let mut state = self.lock().ok_or_else(|| ItemPersistenceError::query(POISONED))?;
        state.items.insert(item.id, item.clone());
        Ok(())
    }

    async fn update_details(
        &self,
        id: &ItemId,
        details: &ItemDetails,
    ) -> Result<Option<Item>, ItemPersistenceError> {
        let mut state = self.lock().ok_or_else(|| ItemPersistenceError::query(POISONED))?;
        Ok(state.items.get_mut(id).map(|item| {
            item.details = details.clone();
            item.clone()
        }))
    }

    async fn transition_status(
        &self,
        id: &ItemId,
        expected: ItemStatus,
        next: ItemStatus,
    ) -> Result<StatusTransition, ItemPersistenceError> {
        let mut state = self.lock().ok_or_else(|| ItemPersistenceError::query(POISONED))?;
        let Some(item) = state.items.get_mut(id) else {
            return Ok(StatusTransition::NotFound);
        };
        if item.status != expected {
            return Ok(StatusTransition::Stale {
                current: item.status,
            });
        }
        item.status = next;
        Ok(StatusTransition::Applied(item.clone()))
    }

    async fn find_by_id(&self, id: &ItemId) -> Result<Option<Item>, ItemPersistenceError> {
        let state = self.lock().ok_or_else(|| ItemPersistenceError::query(POISONED))?;
        Ok(state.items.get(id).cloned())
    }

    async fn list(&self, filter: &ItemFilter) -> Result<Vec<Item>, ItemPersistenceError> {
        let state = self.lock().ok_or_else(|| ItemPersistenceError::query(POISONED))?;
        let mut items: Vec<Item> = state
            .items
            .values()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            b.reported_at
                .cmp(&a.reported_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(items)
    }

    async fn delete(&self, id: &ItemId) -> Result<Option<usize>, ItemPersistenceError> {
        let mut state = self.lock().ok_or_else(|| ItemPersistenceError::query(POISONED))?;
        if state.items.remove(id).is_none() {
            return Ok(None);
        }
        let before = state.requests.len();
        state.requests.retain(|_, request| request.item_id != *id);
        Ok(Some(before - state.requests.len()))
    }
}

#[async_trait]
impl ClaimRequestRepository for MemoryStore {
    async fn file_if_claimable(
        &self,
        request: &ClaimRequest,
    ) -> Result<FilingOutcome, ClaimRequestPersistenceError> {
        let mut state = self
            .lock()
            .ok_or_else(|| ClaimRequestPersistenceError::query(POISONED))?;
        let Some(item) = state.items.get(&request.item_id) else {
            return Ok(FilingOutcome::ItemNotFound);
        };
        if !item.status.is_claimable() {
            return Ok(FilingOutcome::ItemUnavailable {
                status: item.status,
            });
        }
        state.requests.insert(request.id, request.clone());
        Ok(FilingOutcome::Filed)
    }

    async fn approve_pending(
        &self,
        id: &ClaimRequestId,
        approved_on: NaiveDate,
    ) -> Result<DecisionOutcome, ClaimRequestPersistenceError> {
        let mut guard = self
            .lock()
            .ok_or_else(|| ClaimRequestPersistenceError::query(POISONED))?;
        let state = &mut *guard;
        let Some(request) = state.requests.get_mut(id) else {
            return Ok(DecisionOutcome::NotFound);
        };
        if !request.status.is_pending() {
            return Ok(DecisionOutcome::AlreadyDecided {
                status: request.status,
            });
        }
        let Some(item) = state.items.get_mut(&request.item_id) else {
            return Err(ClaimRequestPersistenceError::query(
                "request references a missing item",
            ));
        };
        if !item.status.is_claimable() {
            return Ok(DecisionOutcome::ItemUnavailable {
                item_id: item.id,
                status: item.status,
            });
        }
        item.status = ItemStatus::Claimed;
        *request = request.clone().approved(approved_on);
        Ok(DecisionOutcome::Decided(request.clone()))
    }

    async fn reject_pending(
        &self,
        id: &ClaimRequestId,
    ) -> Result<DecisionOutcome, ClaimRequestPersistenceError> {
        let mut state = self
            .lock()
            .ok_or_else(|| ClaimRequestPersistenceError::query(POISONED))?;
        let Some(request) = state.requests.get_mut(id) else {
            return Ok(DecisionOutcome::NotFound);
        };
        if !request.status.is_pending() {
            return Ok(DecisionOutcome::AlreadyDecided {
                status: request.status,
            });
        }
        *request = request.clone().rejected();
        Ok(DecisionOutcome::Decided(request.clone()))
    }

    async fn find_by_id(
        &self,
        id: &ClaimRequestId,
    ) -> Result<Option<ClaimRequest>, ClaimRequestPersistenceError> {
        let state = self
            .lock()
            .ok_or_else(|| ClaimRequestPersistenceError::query(POISONED))?;
        Ok(state.requests.get(id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<ClaimRequest>, ClaimRequestPersistenceError> {
        let state = self
            .lock()
            .ok_or_else(|| ClaimRequestPersistenceError::query(POISONED))?;
        Ok(newest_first(state.requests.values().cloned().collect()))
    }

    async fn list_by_requester(
        &self,
        requester: &UserId,
    ) -> Result<Vec<ClaimRequest>, ClaimRequestPersistenceError> {
        let state = self
            .lock()
            .ok_or_else(|| ClaimRequestPersistenceError::query(POISONED))?;
        Ok(newest_first(
            state
                .requests
                .values()
                .filter(|request| request.requester == *requester)
                .cloned()
                .collect(),
        ))
    }

    async fn list_by_item(
        &self,
        item_id: &ItemId,
    ) -> Result<Vec<ClaimRequest>, ClaimRequestPersistenceError> {
        let state = self
            .lock()
            .ok_or_else(|| ClaimRequestPersistenceError::query(POISONED))?;
        Ok(newest_first(
            state
                .requests
                .values()
                .filter(|request| request.item_id == *item_id)
                .cloned()
                .collect(),
        ))
    }

    async fn delete(&self, id: &ClaimRequestId) -> Result<bool, ClaimRequestPersistenceError> {
        let mut state = self
            .lock()
            .ok_or_else(|| ClaimRequestPersistenceError::query(POISONED))?;
        Ok(state.requests.remove(id).is_some())
    }
}
