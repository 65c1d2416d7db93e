//! Per-call access context and the authorization checks operations run on it.
//!
//! The access gate only resolves *who* is calling. Every protected operation
//! decides *whether* that caller may proceed by calling one of the `require*`
//! methods below, which is where unauthenticated callers are finally turned
//! away.

use super::{
    Capability, CapabilitySet, DisplayName, EmailAddress, Error, Role, User, UserId,
    capabilities_for,
};

/// Identity bound to an authenticated call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub email: EmailAddress,
    pub display_name: DisplayName,
    pub role: Role,
}

impl Principal {
    /// Principal for a stored user; the role comes from the record.
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            role: user.role,
        }
    }

    /// Capabilities granted by the principal's role.
    pub fn capabilities(&self) -> CapabilitySet {
        capabilities_for(self.role)
    }

    /// Whether the principal holds `capability`.
    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities().allows(capability)
    }
}

/// Authorization failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
    #[error("authentication required")]
    Unauthenticated,
    #[error("caller is not permitted to perform this operation")]
    Forbidden,
}

impl From<AccessDenied> for Error {
    fn from(value: AccessDenied) -> Self {
        match value {
            AccessDenied::Unauthenticated => Error::unauthorized(value.to_string()),
            AccessDenied::Forbidden => Error::forbidden(value.to_string()),
        }
    }
}

/// Identity state of a single inbound call.
///
/// # Examples
/// ```
/// use lostfound::domain::{AccessContext, AccessDenied, Capability};
///
/// let ctx = AccessContext::default();
/// assert_eq!(ctx.require(Capability::FileRequests), Err(AccessDenied::Unauthenticated));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AccessContext {
    #[default]
    Unauthenticated,
    Authenticated(Principal),
}

impl AccessContext {
    /// Bind `principal` unless the context is already authenticated. Returns
    /// whether the binding took place; an existing identity is never replaced.
    pub fn bind(&mut self, principal: Principal) -> bool {
        match self {
            Self::Authenticated(_) => false,
            Self::Unauthenticated => {
                *self = Self::Authenticated(principal);
                true
            }
        }
    }

    /// The bound principal, if any.
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Authenticated(principal) => Some(principal),
            Self::Unauthenticated => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Any authenticated caller.
    pub fn require_authenticated(&self) -> Result<&Principal, AccessDenied> {
        self.principal().ok_or(AccessDenied::Unauthenticated)
    }

    /// An authenticated caller holding `capability`.
    pub fn require(&self, capability: Capability) -> Result<&Principal, AccessDenied> {
        let principal = self.require_authenticated()?;
        if principal.can(capability) {
            Ok(principal)
        } else {
            Err(AccessDenied::Forbidden)
        }
    }

    /// The caller is `owner`, or holds `capability`.
    pub fn require_self_or(
        &self,
        owner: UserId,
        capability: Capability,
    ) -> Result<&Principal, AccessDenied> {
        let principal = self.require_authenticated()?;
        if principal.user_id == owner || principal.can(capability) {
            Ok(principal)
        } else {
            Err(AccessDenied::Forbidden)
        }
    }
}
