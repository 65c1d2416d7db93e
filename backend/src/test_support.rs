//! Shared test doubles for unit tests across the crate.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{
    DisplayName, EmailAddress, Item, ItemDetails, ItemId, ItemKind, ItemStatus, PasswordHash, Role,
    TokenService, TokenSigningKey, User, UserId,
};

/// Key material shared by tests that issue tokens.
pub const TEST_SIGNING_KEY: &[u8; 32] = b"0123456789abcdef0123456789abcdef";

/// Fixed instant used as "now" by fixtures.
pub fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0)
        .single()
        .unwrap_or_else(|| panic!("valid fixture timestamp"))
}

/// Clock whose current instant tests can move forward.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: TimeDelta) {
        *self.lock_clock() += delta;
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Token service over [`TEST_SIGNING_KEY`] and the supplied clock.
pub fn token_service(clock: Arc<MutableClock>) -> TokenService {
    let key = TokenSigningKey::from_bytes(TEST_SIGNING_KEY.to_vec())
        .unwrap_or_else(|err| panic!("fixture key: {err}"));
    TokenService::new(key, clock)
}

/// Plain user record with a placeholder verifier.
pub fn user(email: &str, role: Role) -> User {
    User {
        id: UserId::random(),
        email: EmailAddress::new(email).unwrap_or_else(|err| panic!("fixture email: {err}")),
        display_name: DisplayName::new(email.split('@').next().unwrap_or("user"))
            .unwrap_or_else(|err| panic!("fixture name: {err}")),
        department: None,
        role,
        password_hash: PasswordHash::from_encoded(format!("plain:{email}")),
        active: true,
        registered_at: fixture_now(),
    }
}

/// Item reported by `reporter` in the given status.
pub fn item(reporter: UserId, status: ItemStatus) -> Item {
    Item {
        id: ItemId::random(),
        details: ItemDetails::try_new(
            "Umbrella",
            "Black, folding",
            "Library foyer",
            None,
            Some(ItemKind::Found),
        )
        .unwrap_or_else(|err| panic!("fixture details: {err}")),
        reporter,
        status,
        reported_at: fixture_now(),
    }
}
