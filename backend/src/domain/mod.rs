//! Domain primitives, workflow services, and ports.
//!
//! Purpose: define the strongly typed entities of the lost-and-found registry
//! (users, items, claim requests), the bearer-token issuer and access gate
//! that resolve who is calling, and the services that enforce the claim
//! workflow. Nothing here depends on HTTP or on a particular store.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - TokenService: issues and validates signed bearer tokens.
//! - AccessGate / AccessContext: per-call identity resolution and checks.
//! - ClaimWorkflowService, ItemCatalogueService, UserAccountService,
//!   StatisticsService: driving port implementations.

pub mod access;
pub mod access_gate;
pub mod auth;
pub mod capability;
pub mod claim_request;
pub mod claim_workflow_service;
pub mod error;
mod identifier;
pub mod item;
pub mod item_catalogue_service;
pub mod ports;
pub mod statistics;
pub mod token;
pub mod trace_id;
pub mod user;
pub mod user_account_service;
pub mod workflow_error;

pub use self::access::{AccessContext, AccessDenied, Principal};
pub use self::access_gate::{AccessGate, PublicRoute, PublicRoutes, bearer_token};
pub use self::auth::{
    LoginCredentials, LoginValidationError, PASSWORD_MAX, PASSWORD_MIN, PasswordChange,
    PasswordChangeValidationError, Registration, RegistrationValidationError,
};
pub use self::capability::{Capability, CapabilitySet, capabilities_for};
pub use self::claim_request::{
    ClaimRequest, ClaimRequestId, ClaimRequestValidationError, ClaimStatus,
};
pub use self::claim_workflow_service::ClaimWorkflowService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::item::{
    Item, ItemDetails, ItemFilter, ItemId, ItemKind, ItemStatus, ItemValidationError,
};
pub use self::item_catalogue_service::ItemCatalogueService;
pub use self::token::{
    IssuedToken, MIN_SIGNING_KEY_BYTES, TokenClaims, TokenError, TokenKeyError, TokenService,
    TokenSigningKey, token_ttl,
};
pub use self::statistics::{
    ItemCounts, OfficeStatistics, RequestCounts, StatisticsService, UserCounts,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    DEPARTMENT_MAX, DISPLAY_NAME_MAX, DisplayName, EMAIL_MAX, EmailAddress, PasswordHash, Role,
    User, UserId, UserValidationError, normalise_department,
};
pub use self::user_account_service::{AccountError, UserAccountService};
pub use self::workflow_error::WorkflowError;
