//! Resolves the caller of each inbound operation.
//!
//! The gate never rejects a call. Public operations proceed unauthenticated
//! without looking at credentials; for everything else a valid bearer token
//! binds the matching user, and any defect (no header, wrong scheme, bad
//! signature, expired token, unknown or inactive user) leaves the call
//! unauthenticated for the operation's own checks to refuse.

use std::sync::Arc;

use tracing::{debug, warn};

use super::ports::UserRepository;
use super::{AccessContext, EmailAddress, Principal, TokenService};

const BEARER_PREFIX: &str = "Bearer ";

/// One allow-list entry: an optional method and a path pattern.
///
/// Pattern segments written `{name}` match any single non-empty segment; a
/// trailing `*` matches the remainder of the path, including nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicRoute {
    method: Option<&'static str>,
    pattern: &'static str,
}

impl PublicRoute {
    /// Route public for `method` only.
    pub const fn new(method: &'static str, pattern: &'static str) -> Self {
        Self {
            method: Some(method),
            pattern,
        }
    }

    /// Route public for every method.
    pub const fn any_method(pattern: &'static str) -> Self {
        Self {
            method: None,
            pattern,
        }
    }

    fn matches(&self, method: &str, path: &str) -> bool {
        if self
            .method
            .is_some_and(|expected| !expected.eq_ignore_ascii_case(method))
        {
            return false;
        }
        let mut wanted = self.pattern.trim_matches('/').split('/');
        let mut actual = path.trim_matches('/').split('/');
        loop {
            match (wanted.next(), actual.next()) {
                (Some("*"), _) => return true,
                (None, None) => return true,
                (Some(pattern), Some(segment)) => {
                    let placeholder = pattern.starts_with('{') && pattern.ends_with('}');
                    let matched = if placeholder {
                        !segment.is_empty()
                    } else {
                        pattern == segment
                    };
                    if !matched {
                        return false;
                    }
                }
                _ => return false,
            }
        }
    }
}

/// Fixed allow-list of operations that bypass token processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicRoutes(Vec<PublicRoute>);

impl PublicRoutes {
    pub fn new(routes: Vec<PublicRoute>) -> Self {
        Self(routes)
    }

    /// Whether `method` + `path` is on the allow-list.
    pub fn is_public(&self, method: &str, path: &str) -> bool {
        self.0.iter().any(|route| route.matches(method, path))
    }
}

impl Default for PublicRoutes {
    /// Registration, login, the email availability check, public item and
    /// claim-status listings, health probes, and API docs.
    fn default() -> Self {
        Self(vec![
            PublicRoute::new("POST", "/api/v1/users/register"),
            PublicRoute::new("POST", "/api/v1/login"),
            PublicRoute::new("GET", "/api/v1/users/check-email/{email}"),
            PublicRoute::new("GET", "/api/v1/items"),
            PublicRoute::new("GET", "/api/v1/items/{id}"),
            PublicRoute::new("GET", "/api/v1/items/{id}/requests"),
            PublicRoute::new("GET", "/health/*"),
            PublicRoute::any_method("/docs/*"),
            PublicRoute::any_method("/api-docs/*"),
        ])
    }
}

/// Token from an `Authorization` header value of the form `Bearer <token>`.
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolves bearer credentials into an [`AccessContext`].
#[derive(Clone)]
pub struct AccessGate {
    routes: PublicRoutes,
    tokens: TokenService,
    users: Arc<dyn UserRepository>,
}

impl AccessGate {
    pub fn new(routes: PublicRoutes, tokens: TokenService, users: Arc<dyn UserRepository>) -> Self {
        Self {
            routes,
            tokens,
            users,
        }
    }

    /// Whether the operation skips token processing.
    pub fn is_public(&self, method: &str, path: &str) -> bool {
        self.routes.is_public(method, path)
    }

    /// Authenticate into `context`. An already authenticated context is left
    /// untouched; failures leave it unauthenticated.
    pub async fn authenticate(
        &self,
        context: &mut AccessContext,
        method: &str,
        path: &str,
        authorization: Option<&str>,
    ) {
        if context.is_authenticated() || self.is_public(method, path) {
            return;
        }
        if let Some(principal) = self.resolve_principal(authorization).await {
            context.bind(principal);
        }
    }

    /// Resolve a fresh context for one call.
    ///
    /// # Examples
    /// ```no_run
    /// # async fn demo(gate: lostfound::domain::AccessGate) {
    /// let ctx = gate.resolve("GET", "/api/v1/items", None).await;
    /// assert!(!ctx.is_authenticated());
    /// # }
    /// ```
    pub async fn resolve(
        &self,
        method: &str,
        path: &str,
        authorization: Option<&str>,
    ) -> AccessContext {
        let mut context = AccessContext::default();
        self.authenticate(&mut context, method, path, authorization)
            .await;
        context
    }

    async fn resolve_principal(&self, authorization: Option<&str>) -> Option<Principal> {
        let Some(token) = authorization.and_then(bearer_token) else {
            debug!("no bearer credential presented");
            return None;
        };
        let subject = match self.tokens.extract_subject(token) {
            Ok(subject) => subject,
            Err(error) => {
                debug!(%error, "bearer token rejected");
                return None;
            }
        };
        let Ok(email) = EmailAddress::new(&subject) else {
            debug!("bearer token subject is not a login identifier");
            return None;
        };
        let user = match self.users.find_by_email(&email).await {
            Ok(Some(user)) if user.active => user,
            Ok(Some(_)) => {
                debug!("bearer token names an inactive user");
                return None;
            }
            Ok(None) => {
                debug!("bearer token names an unknown user");
                return None;
            }
            Err(error) => {
                warn!(%error, "credential store lookup failed during authentication");
                return None;
            }
        };
        if !self.tokens.validate(token, user.email.as_ref()) {
            debug!(user_id = %user.id, "bearer token failed validation");
            return None;
        }
        Some(Principal::from_user(&user))
    }
}

#[cfg(test)]
#[path = "access_gate_tests.rs"]
mod tests;
