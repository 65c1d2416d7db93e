//! Signed, time-limited bearer tokens.
//!
//! Tokens are compact HS256 JSON Web Signatures: a base64url header, a
//! base64url claims object, and an HMAC-SHA256 tag over both. The signing key
//! is supplied once at construction and never changes for the lifetime of the
//! service.
//!
//! Expiry is strict: a token whose `exp` equals the current second is already
//! expired. Clock skew is not compensated.

use std::fmt;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use chrono::{DateTime, TimeDelta, Utc};
use hmac::{Hmac, Mac};
use mockable::Clock;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

use super::{Role, User, UserId};

type HmacSha256 = Hmac<Sha256>;

/// Minimum decoded length of a signing key.
pub const MIN_SIGNING_KEY_BYTES: usize = 32;

/// Lifetime of every issued token.
pub fn token_ttl() -> TimeDelta {
    TimeDelta::hours(24)
}

const HEADER: TokenHeader<'static> = TokenHeader {
    alg: "HS256",
    typ: "JWT",
};

/// Errors raised while loading signing key material.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenKeyError {
    #[error("signing key is not valid base64")]
    InvalidBase64,
    #[error("signing key must decode to at least {min} bytes, got {actual}")]
    TooShort { min: usize, actual: usize },
}

/// Errors raised while encoding or decoding a token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token algorithm is not supported")]
    UnsupportedAlgorithm,
    #[error("token signature is invalid")]
    BadSignature,
    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// Symmetric signing key, wiped from memory on drop.
#[derive(Clone)]
pub struct TokenSigningKey(Zeroizing<Vec<u8>>);

impl TokenSigningKey {
    /// Decode key material from standard base64.
    ///
    /// # Examples
    /// ```
    /// use lostfound::domain::TokenSigningKey;
    ///
    /// let encoded = "c2VjcmV0LWtleS1tYXRlcmlhbC1mb3ItdGVzdHMtb25seSE=";
    /// assert!(TokenSigningKey::from_base64(encoded).is_ok());
    /// assert!(TokenSigningKey::from_base64("c2hvcnQ=").is_err());
    /// ```
    pub fn from_base64(encoded: &str) -> Result<Self, TokenKeyError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| TokenKeyError::InvalidBase64)?;
        Self::from_bytes(bytes)
    }

    /// Wrap raw key material.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, TokenKeyError> {
        let bytes = Zeroizing::new(bytes);
        if bytes.len() < MIN_SIGNING_KEY_BYTES {
            return Err(TokenKeyError::TooShort {
                min: MIN_SIGNING_KEY_BYTES,
                actual: bytes.len(),
            });
        }
        Ok(Self(bytes))
    }

    /// Random key for development runs; tokens do not survive a restart.
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new(vec![0_u8; MIN_SIGNING_KEY_BYTES]);
        rand::rngs::OsRng.fill_bytes(bytes.as_mut_slice());
        Self(bytes)
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        <HmacSha256 as Mac>::new_from_slice(self.0.as_slice())
            .map_err(|err| TokenError::Encoding(err.to_string()))
    }
}

impl fmt::Debug for TokenSigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenSigningKey(..)")
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader<'a> {
    alg: &'a str,
    typ: &'a str,
}

/// Claims carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Login identifier the token was issued for.
    pub sub: String,
    /// User identifier.
    pub uid: UserId,
    /// Display name at issue time.
    pub name: String,
    /// Role at issue time.
    pub role: Role,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

/// A freshly issued token and the instant it stops validating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates bearer tokens with a fixed key and injectable clock.
#[derive(Clone)]
pub struct TokenService {
    key: TokenSigningKey,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Create a service signing with `key` and reading time from `clock`.
    pub fn new(key: TokenSigningKey, clock: Arc<dyn Clock>) -> Self {
        Self { key, clock }
    }

    /// Issue a token for `user`, valid from now for [`token_ttl`].
    pub fn issue(&self, user: &User) -> Result<IssuedToken, TokenError> {
        let issued_at = self.clock.utc().timestamp();
        let expires_at = issued_at + token_ttl().num_seconds();
        let claims = TokenClaims {
            sub: user.email.as_ref().to_owned(),
            uid: user.id,
            name: user.display_name.as_ref().to_owned(),
            role: user.role,
            iat: issued_at,
            exp: expires_at,
        };

        let header = encode_segment(&HEADER)?;
        let payload = encode_segment(&claims)?;
        let signing_input = format!("{header}.{payload}");
        let mut mac = self.key.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        let expires_at = DateTime::from_timestamp(expires_at, 0)
            .ok_or_else(|| TokenError::Encoding("expiry out of range".to_owned()))?;
        Ok(IssuedToken {
            token: format!("{signing_input}.{signature}"),
            expires_at,
        })
    }

    /// Whether `token` is authentic, unexpired, and issued for
    /// `expected_subject`. Never fails; every defect yields `false`.
    pub fn validate(&self, token: &str, expected_subject: &str) -> bool {
        let Ok(claims) = self.decode(token) else {
            return false;
        };
        let unexpired = self.clock.utc().timestamp() < claims.exp;
        unexpired && claims.sub == expected_subject
    }

    /// Subject the token nominally names. The signature is checked but expiry
    /// and subject are not.
    pub fn extract_subject(&self, token: &str) -> Result<String, TokenError> {
        self.decode(token).map(|claims| claims.sub)
    }

    /// Verify the signature and return the claims without time checks.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let mut segments = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::Malformed);
        };

        let header_bytes = decode_segment(header)?;
        let parsed: TokenHeader<'_> =
            serde_json::from_slice(&header_bytes).map_err(|_| TokenError::Malformed)?;
        if parsed.alg != HEADER.alg {
            return Err(TokenError::UnsupportedAlgorithm);
        }

        let tag = decode_segment(signature)?;
        let mut mac = self.key.mac()?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&tag).map_err(|_| TokenError::BadSignature)?;

        let payload_bytes = decode_segment(payload)?;
        serde_json::from_slice(&payload_bytes).map_err(|_| TokenError::Malformed)
    }
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String, TokenError> {
    let bytes = serde_json::to_vec(value).map_err(|err| TokenError::Encoding(err.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, TokenError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed)
}

#[cfg(test)]
mod tests;
