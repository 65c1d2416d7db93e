//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `LOSTFOUND_*` environment variables, or a
//! configuration file. Secrets are decoded here, once, into the immutable
//! key handed to the token service.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::warn;
use zeroize::Zeroizing;

use lostfound::domain::ports::UserDeletionPolicy;
use lostfound::domain::{TokenKeyError, TokenSigningKey};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Build mode used to decide whether an ephemeral signing key is tolerated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }
}

/// Errors raised while turning settings into server configuration.
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("unknown user deletion policy '{value}'; expected refuse|cascade")]
    DeletionPolicy { value: String },
    #[error("failed to read token secret at {path}: {source}")]
    SecretRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid token secret: {0}")]
    Secret(#[from] TokenKeyError),
    #[error("no token secret configured; set LOSTFOUND_TOKEN_SECRET or LOSTFOUND_TOKEN_SECRET_FILE")]
    MissingSecret,
}

/// Settings controlling the HTTP server and its stores.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LOSTFOUND")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string. In-memory stores are used when absent.
    pub database_url: Option<String>,
    /// Base64 token signing secret.
    pub token_secret: Option<String>,
    /// File holding the base64 token signing secret.
    pub token_secret_file: Option<PathBuf>,
    /// `refuse` or `cascade`.
    pub user_deletion: Option<String>,
    /// Permit a random signing key when no secret is configured.
    #[ortho_config(default = false)]
    pub allow_ephemeral_secret: bool,
}

impl AppSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    pub fn deletion_policy(&self) -> Result<UserDeletionPolicy, SettingsError> {
        match self.user_deletion.as_deref().map(str::trim) {
            None => Ok(UserDeletionPolicy::default()),
            Some(value) if value.eq_ignore_ascii_case("refuse") => Ok(UserDeletionPolicy::Refuse),
            Some(value) if value.eq_ignore_ascii_case("cascade") => {
                Ok(UserDeletionPolicy::Cascade)
            }
            Some(value) => Err(SettingsError::DeletionPolicy {
                value: value.to_owned(),
            }),
        }
    }

    /// Decode the configured signing key.
    ///
    /// An inline secret wins over a secret file. Without either, debug builds
    /// and deployments that set `allow_ephemeral_secret` get a random key;
    /// release builds refuse to start.
    pub fn signing_key(&self, mode: BuildMode) -> Result<TokenSigningKey, SettingsError> {
        if let Some(secret) = &self.token_secret {
            return Ok(TokenSigningKey::from_base64(secret)?);
        }
        if let Some(path) = &self.token_secret_file {
            let encoded = std::fs::read_to_string(path)
                .map(Zeroizing::new)
                .map_err(|source| SettingsError::SecretRead {
                    path: path.clone(),
                    source,
                })?;
            return Ok(TokenSigningKey::from_base64(&encoded)?);
        }
        if mode == BuildMode::Debug || self.allow_ephemeral_secret {
            warn!("no token secret configured; using an ephemeral key (tokens end with the process)");
            return Ok(TokenSigningKey::generate());
        }
        Err(SettingsError::MissingSecret)
    }
}
