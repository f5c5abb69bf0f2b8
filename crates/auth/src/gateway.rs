//! Tenant access gateway: membership verification composed with role evaluation.
//!
//! Every operation is fail-closed. Collaborator errors are logged here and
//! surface to callers only as a denial (`false` / empty list). Non-members
//! never trigger a role lookup.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, error};

use sitegate_core::{TenantId, UserId};

use crate::{Permission, ProviderError, ResourceType, RoleProvider, TenantMembershipProvider};

/// How a list of permissions combines.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckMode {
    /// At least one permission must be granted.
    #[default]
    Any,
    /// Every permission must be granted.
    All,
}

/// Outcome of [`TenantAccessGateway::check_in_tenant`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantCheck {
    Granted,
    NotMember,
    MissingPermission,
}

/// Entry point for tenant-scoped authorization checks.
#[derive(Debug, Clone)]
pub struct TenantAccessGateway<M, R> {
    membership: M,
    roles: R,
}

impl<M, R> TenantAccessGateway<M, R>
where
    M: TenantMembershipProvider,
    R: RoleProvider,
{
    pub fn new(membership: M, roles: R) -> Self {
        Self { membership, roles }
    }

    /// Whether `user_id` belongs to `tenant_id`. Errors deny.
    pub async fn is_tenant_member(&self, user_id: &UserId, tenant_id: &TenantId) -> bool {
        let result = self.membership.is_tenant_member(user_id, tenant_id).await;
        fail_closed("is_tenant_member", user_id, tenant_id, result, false)
    }

    /// Whether `user_id` may perform `permission` on a resource in `tenant_id`.
    pub async fn has_permission_in_tenant(
        &self,
        user_id: &UserId,
        tenant_id: &TenantId,
        resource_type: ResourceType,
        permission: Permission,
        resource_id: Option<&str>,
    ) -> bool {
        let result = self
            .try_has_any(user_id, tenant_id, resource_type, &[permission], resource_id)
            .await;
        fail_closed("has_permission_in_tenant", user_id, tenant_id, result, false)
    }

    /// Whether at least one of `permissions` is granted. Empty lists deny.
    ///
    /// Checks run sequentially and stop at the first grant.
    pub async fn has_any_permission_in_tenant(
        &self,
        user_id: &UserId,
        tenant_id: &TenantId,
        resource_type: ResourceType,
        permissions: &[Permission],
        resource_id: Option<&str>,
    ) -> bool {
        let result = self
            .try_has_any(user_id, tenant_id, resource_type, permissions, resource_id)
            .await;
        fail_closed("has_any_permission_in_tenant", user_id, tenant_id, result, false)
    }

    /// Whether every one of `permissions` is granted.
    ///
    /// An empty list is vacuously granted for members; callers wanting a
    /// default check must supply it (see [`crate::PermissionGuard`]).
    pub async fn has_all_permissions_in_tenant(
        &self,
        user_id: &UserId,
        tenant_id: &TenantId,
        resource_type: ResourceType,
        permissions: &[Permission],
        resource_id: Option<&str>,
    ) -> bool {
        let result = self
            .try_has_all(user_id, tenant_id, resource_type, permissions, resource_id)
            .await;
        fail_closed("has_all_permissions_in_tenant", user_id, tenant_id, result, false)
    }

    /// Membership and permission check behind a single membership lookup,
    /// reporting which of the two failed.
    ///
    /// Membership errors report [`TenantCheck::NotMember`]; role errors
    /// report [`TenantCheck::MissingPermission`].
    pub async fn check_in_tenant(
        &self,
        user_id: &UserId,
        tenant_id: &TenantId,
        resource_type: ResourceType,
        permissions: &[Permission],
        mode: CheckMode,
        resource_id: Option<&str>,
    ) -> TenantCheck {
        let member = self.member(user_id, tenant_id).await;
        if !fail_closed("check_in_tenant", user_id, tenant_id, member, false) {
            return TenantCheck::NotMember;
        }

        let result = match mode {
            CheckMode::Any => {
                self.any_granted(user_id, tenant_id, resource_type, permissions, resource_id)
                    .await
            }
            CheckMode::All => {
                self.all_granted(user_id, tenant_id, resource_type, permissions, resource_id)
                    .await
            }
        };
        if fail_closed("check_in_tenant", user_id, tenant_id, result, false) {
            TenantCheck::Granted
        } else {
            TenantCheck::MissingPermission
        }
    }

    /// Ids of resources of `resource_type` the user holds a resource-specific
    /// `permission` grant on. Type-wide grants are not listed.
    ///
    /// The result is sorted and de-duplicated.
    pub async fn accessible_resources_in_tenant(
        &self,
        user_id: &UserId,
        tenant_id: &TenantId,
        resource_type: ResourceType,
        permission: Permission,
    ) -> Vec<String> {
        let result = self
            .try_accessible_resources(user_id, tenant_id, resource_type, permission)
            .await;
        fail_closed("accessible_resources_in_tenant", user_id, tenant_id, result, Vec::new())
    }

    /// Whether the user holds a type-wide `permission` grant on `resource_type`,
    /// as opposed to grants on individual resources.
    pub async fn has_global_permission_in_tenant(
        &self,
        user_id: &UserId,
        tenant_id: &TenantId,
        resource_type: ResourceType,
        permission: Permission,
    ) -> bool {
        let result = self
            .try_has_global(user_id, tenant_id, resource_type, permission)
            .await;
        fail_closed("has_global_permission_in_tenant", user_id, tenant_id, result, false)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Fallible internals
    // ─────────────────────────────────────────────────────────────────────────

    async fn member(&self, user_id: &UserId, tenant_id: &TenantId) -> Result<bool, ProviderError> {
        let member = self.membership.is_tenant_member(user_id, tenant_id).await?;
        if !member {
            debug!(user_id = %user_id, tenant_id = %tenant_id, "not a tenant member");
        }
        Ok(member)
    }

    async fn try_has_any(
        &self,
        user_id: &UserId,
        tenant_id: &TenantId,
        resource_type: ResourceType,
        permissions: &[Permission],
        resource_id: Option<&str>,
    ) -> Result<bool, ProviderError> {
        if !self.member(user_id, tenant_id).await? {
            return Ok(false);
        }
        self.any_granted(user_id, tenant_id, resource_type, permissions, resource_id)
            .await
    }

    async fn try_has_all(
        &self,
        user_id: &UserId,
        tenant_id: &TenantId,
        resource_type: ResourceType,
        permissions: &[Permission],
        resource_id: Option<&str>,
    ) -> Result<bool, ProviderError> {
        if !self.member(user_id, tenant_id).await? {
            return Ok(false);
        }
        self.all_granted(user_id, tenant_id, resource_type, permissions, resource_id)
            .await
    }

    async fn any_granted(
        &self,
        user_id: &UserId,
        tenant_id: &TenantId,
        resource_type: ResourceType,
        permissions: &[Permission],
        resource_id: Option<&str>,
    ) -> Result<bool, ProviderError> {
        for &permission in permissions {
            if self
                .roles
                .has_permission(user_id, tenant_id, resource_type, permission, resource_id)
                .await?
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn all_granted(
        &self,
        user_id: &UserId,
        tenant_id: &TenantId,
        resource_type: ResourceType,
        permissions: &[Permission],
        resource_id: Option<&str>,
    ) -> Result<bool, ProviderError> {
        for &permission in permissions {
            if !self
                .roles
                .has_permission(user_id, tenant_id, resource_type, permission, resource_id)
                .await?
            {
                debug!(user_id = %user_id, tenant_id = %tenant_id, %resource_type, %permission, "missing permission");
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn try_accessible_resources(
        &self,
        user_id: &UserId,
        tenant_id: &TenantId,
        resource_type: ResourceType,
        permission: Permission,
    ) -> Result<Vec<String>, ProviderError> {
        if !self.member(user_id, tenant_id).await? {
            return Ok(Vec::new());
        }
        let roles = self.roles.user_roles(user_id, tenant_id).await?;
        let ids: BTreeSet<String> = roles
            .iter()
            .flat_map(|role| role.granted_resource_ids(resource_type, permission, tenant_id))
            .map(str::to_string)
            .collect();
        Ok(ids.into_iter().collect())
    }

    async fn try_has_global(
        &self,
        user_id: &UserId,
        tenant_id: &TenantId,
        resource_type: ResourceType,
        permission: Permission,
    ) -> Result<bool, ProviderError> {
        if !self.member(user_id, tenant_id).await? {
            return Ok(false);
        }
        let roles = self.roles.user_roles(user_id, tenant_id).await?;
        Ok(roles
            .iter()
            .any(|role| role.grants_type_wide(resource_type, permission, tenant_id)))
    }
}

fn fail_closed<T>(
    operation: &'static str,
    user_id: &UserId,
    tenant_id: &TenantId,
    result: Result<T, ProviderError>,
    denied: T,
) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            error!(operation, user_id = %user_id, tenant_id = %tenant_id, error = %err, "access check failed; denying");
            denied
        }
    }
}
