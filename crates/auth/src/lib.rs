//! `sitegate-auth` — tenant-scoped access control (zero-trust).
//!
//! This crate is intentionally decoupled from HTTP and storage. Membership,
//! role and session storage are reached only through the collaborator traits
//! in [`provider`] and [`session`].

pub mod acl;
pub mod audit;
pub mod config;
pub mod gateway;
pub mod guard;
pub mod permissions;
pub mod provider;
pub mod resource;
pub mod roles;
pub mod session;

pub use acl::{AccessExplanation, AccessQuery, Ace, Acl, MatchTier};
pub use audit::CrossTenantReport;
pub use config::AccessConfig;
pub use gateway::{CheckMode, TenantAccessGateway, TenantCheck};
pub use guard::{DenialKind, GuardDecision, PermissionCheck, PermissionGuard};
pub use permissions::Permission;
pub use provider::{ProviderError, RoleProvider, TenantMembershipProvider};
pub use resource::{Resource, ResourceType};
pub use roles::{Role, TenantAce, TenantResource, UserRole, roles_grant_permission};
pub use session::{SessionClaims, SessionError, SessionResolver, validate_session};
