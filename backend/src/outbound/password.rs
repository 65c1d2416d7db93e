//! Argon2id adapter for the `PasswordHasher` port.
//!
//! Verifiers are PHC strings (`$argon2id$v=19$m=…`) so the parameters travel
//! with each stored hash; raising the cost later leaves existing verifiers
//! checkable.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash as EncodedHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use tracing::debug;

use crate::domain::PasswordHash;
use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Salted Argon2id hasher.
#[derive(Clone)]
pub struct Argon2PasswordHasher {
    params: Params,
}

impl Argon2PasswordHasher {
    /// Hasher using the library's recommended Argon2id cost.
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Hasher with explicit cost parameters.
    pub fn with_params(params: Params) -> Self {
        Self { params }
    }

    fn engine(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let encoded = self
            .engine()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| PasswordHashError::hashing(err.to_string()))?;
        Ok(PasswordHash::from_encoded(encoded.to_string()))
    }

    fn verify(&self, password: &str, verifier: &PasswordHash) -> bool {
        let parsed = match EncodedHash::new(verifier.as_encoded()) {
            Ok(parsed) => parsed,
            Err(error) => {
                debug!(%error, "stored password verifier is malformed");
                return false;
            }
        };
        // Parameters come from the verifier itself, not from `self.params`.
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
