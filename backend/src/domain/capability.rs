//! Role to capability mapping.
//!
//! Operations ask "may this caller do X" through [`CapabilitySet::allows`]
//! instead of comparing role names, so the grant table lives in exactly one
//! pure function.

use super::Role;

/// A single permission checked by a workflow operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// File a claim request for oneself.
    FileRequests,
    /// Report a lost or found item for oneself.
    ReportItems,
    /// File requests or report items on behalf of another user.
    ActOnBehalf,
    /// Move items through the moderation statuses.
    ReviewItems,
    /// Read every claim request, not just one's own.
    ViewAllRequests,
    /// Approve or reject pending claim requests.
    DecideRequests,
    /// Delete items and requests.
    DeleteRecords,
    /// List, modify, and delete other users' accounts.
    ManageUsers,
    /// Read office-wide item, request, and account counts.
    ViewStatistics,
}

impl Capability {
    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// Immutable set of capabilities granted to a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilitySet(u16);

impl CapabilitySet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Build a set from a list of capabilities.
    pub const fn of(capabilities: &[Capability]) -> Self {
        let mut bits = 0;
        let mut index = 0;
        while index < capabilities.len() {
            bits |= capabilities[index].bit();
            index += 1;
        }
        Self(bits)
    }

    /// Union of two sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether `capability` is granted.
    pub const fn allows(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }
}

const USER_CAPABILITIES: CapabilitySet =
    CapabilitySet::of(&[Capability::FileRequests, Capability::ReportItems]);

const STAFF_CAPABILITIES: CapabilitySet = USER_CAPABILITIES.union(CapabilitySet::of(&[
    Capability::ActOnBehalf,
    Capability::ReviewItems,
]));

const ADMIN_CAPABILITIES: CapabilitySet = STAFF_CAPABILITIES.union(CapabilitySet::of(&[
    Capability::ViewAllRequests,
    Capability::DecideRequests,
    Capability::DeleteRecords,
    Capability::ManageUsers,
    Capability::ViewStatistics,
]));

/// Capabilities granted by `role`.
///
/// # Examples
/// ```
/// use lostfound::domain::{Capability, Role, capabilities_for};
///
/// assert!(capabilities_for(Role::Admin).allows(Capability::DecideRequests));
/// assert!(!capabilities_for(Role::User).allows(Capability::DecideRequests));
/// ```
pub const fn capabilities_for(role: Role) -> CapabilitySet {
    match role {
        Role::User => USER_CAPABILITIES,
        Role::Staff => STAFF_CAPABILITIES,
        Role::Admin => ADMIN_CAPABILITIES,
    }
}
