//! Collaborator contracts consumed by the tenant access gateway.
//!
//! Membership and role storage live behind these traits. The gateway receives
//! implementations by constructor injection, so tests substitute fakes
//! without any global state.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use sitegate_core::{TenantId, UserId};

use crate::{Permission, ResourceType, Role, roles_grant_permission};

/// Transport/infrastructure failure of a collaborator.
///
/// "Not a member" or "no roles" are ordinary answers, never errors.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("collaborator timed out: {0}")]
    Timeout(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl ProviderError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

/// Answers whether a user belongs to a tenant.
#[async_trait]
pub trait TenantMembershipProvider: Send + Sync {
    async fn is_tenant_member(&self, user_id: &UserId, tenant_id: &TenantId) -> Result<bool, ProviderError>;
}

/// Resolves a user's roles within a tenant and evaluates permissions over them.
#[async_trait]
pub trait RoleProvider: Send + Sync {
    /// Roles applicable to `user_id` in `tenant_id` (global roles included).
    async fn user_roles(&self, user_id: &UserId, tenant_id: &TenantId) -> Result<Vec<Role>, ProviderError>;

    /// Evaluate a single permission.
    ///
    /// The default resolves [`RoleProvider::user_roles`] and runs the role
    /// aggregator. Backends with a native policy engine may override it.
    async fn has_permission(
        &self,
        user_id: &UserId,
        tenant_id: &TenantId,
        resource_type: ResourceType,
        permission: Permission,
        resource_id: Option<&str>,
    ) -> Result<bool, ProviderError> {
        let roles = self.user_roles(user_id, tenant_id).await?;
        Ok(roles_grant_permission(&roles, resource_type, permission, tenant_id, resource_id))
    }
}

#[async_trait]
impl<T> TenantMembershipProvider for Arc<T>
where
    T: TenantMembershipProvider + ?Sized,
{
    async fn is_tenant_member(&self, user_id: &UserId, tenant_id: &TenantId) -> Result<bool, ProviderError> {
        (**self).is_tenant_member(user_id, tenant_id).await
    }
}

#[async_trait]
impl<T> RoleProvider for Arc<T>
where
    T: RoleProvider + ?Sized,
{
    async fn user_roles(&self, user_id: &UserId, tenant_id: &TenantId) -> Result<Vec<Role>, ProviderError> {
        (**self).user_roles(user_id, tenant_id).await
    }

    async fn has_permission(
        &self,
        user_id: &UserId,
        tenant_id: &TenantId,
        resource_type: ResourceType,
        permission: Permission,
        resource_id: Option<&str>,
    ) -> Result<bool, ProviderError> {
        (**self)
            .has_permission(user_id, tenant_id, resource_type, permission, resource_id)
            .await
    }
}
