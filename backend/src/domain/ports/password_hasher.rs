//! Port for one-way password verifiers.

use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Errors raised while producing a verifier.
    pub enum PasswordHashError {
        /// The hashing backend rejected the input or parameters.
        Hashing { message: String } => "password hashing failed: {message}",
    }
}

/// Produces and checks opaque password verifiers.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Derive a verifier for `password`.
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError>;

    /// Whether `password` matches `verifier`. Malformed verifiers never match.
    fn verify(&self, password: &str, verifier: &PasswordHash) -> bool;
}
