//! Infrastructure layer: collaborator implementations for the access gateway.
//!
//! Only in-memory stores live here (tests, dev, single-process deployments).
//! Durable backends implement the same `sitegate-auth` traits.

pub mod membership;
pub mod role_store;
pub mod session_store;

pub use membership::InMemoryMembershipStore;
pub use role_store::{InMemoryRoleStore, RoleStoreError};
pub use session_store::InMemorySessionStore;
