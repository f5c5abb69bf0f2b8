//! Tenant-scoped roles and the role aggregator.
//!
//! Roles carry no site concept: a role entry is either type-wide or names a
//! single resource within a tenant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sitegate_core::{Entity, RoleId, TenantId, UserId, ValueObject};

use crate::{Permission, ResourceType};

/// Role-layer analog of [`crate::Resource`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantResource {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub tenant_id: TenantId,
}

impl ValueObject for TenantResource {}

/// Role-layer grant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantAce {
    pub resource: TenantResource,
    pub permission: Permission,
}

impl ValueObject for TenantAce {}

impl TenantAce {
    /// Grant on every resource of `resource_type` in `tenant_id`.
    pub fn type_wide(resource_type: ResourceType, permission: Permission, tenant_id: TenantId) -> Self {
        Self {
            resource: TenantResource {
                resource_type,
                id: None,
                tenant_id,
            },
            permission,
        }
    }

    /// Grant on a single resource.
    pub fn on_resource(
        resource_type: ResourceType,
        permission: Permission,
        tenant_id: TenantId,
        id: impl Into<String>,
    ) -> Self {
        Self {
            resource: TenantResource {
                resource_type,
                id: Some(id.into()),
                tenant_id,
            },
            permission,
        }
    }

    fn grants(&self, resource_type: ResourceType, permission: Permission) -> bool {
        self.resource.resource_type == resource_type && self.permission == permission
    }
}

/// A named, reusable bundle of grants.
///
/// # Invariants
/// - A global role applies in every tenant, whatever its own `tenant_id`
///   (conventionally `system`).
/// - A non-global role applies only in its own tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub description: String,
    pub tenant_id: TenantId,
    pub is_global: bool,
    pub acl_entries: Vec<TenantAce>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Role {
    type Id = RoleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Role {
    /// New tenant-scoped role with no grants.
    pub fn new(id: RoleId, name: impl Into<String>, tenant_id: TenantId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            tenant_id,
            is_global: false,
            acl_entries: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// New global role owned by the `system` tenant.
    pub fn global(id: RoleId, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            is_global: true,
            ..Self::new(id, name, TenantId::system(), now)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_entries(mut self, entries: impl IntoIterator<Item = TenantAce>) -> Self {
        self.acl_entries.extend(entries);
        self
    }

    /// Whether this role participates in evaluations for `tenant_id`.
    pub fn applies_to(&self, tenant_id: &TenantId) -> bool {
        self.is_global || &self.tenant_id == tenant_id
    }

    /// Whether `entry` (one of this role's entries) counts for `tenant_id`.
    ///
    /// Non-global roles additionally require the entry to be recorded under
    /// the requested tenant. Global roles waive the entry-level check.
    pub fn entry_applies(&self, entry: &TenantAce, tenant_id: &TenantId) -> bool {
        self.is_global || (&self.tenant_id == tenant_id && &entry.resource.tenant_id == tenant_id)
    }

    fn applicable_entries<'a>(&'a self, tenant_id: &'a TenantId) -> impl Iterator<Item = &'a TenantAce> + 'a {
        self.acl_entries
            .iter()
            .filter(move |e| self.entry_applies(e, tenant_id))
    }

    /// Whether this role grants `permission` on a resource in `tenant_id`.
    ///
    /// Matches an exact resource grant first, then a type-wide grant.
    pub fn grants(
        &self,
        resource_type: ResourceType,
        permission: Permission,
        tenant_id: &TenantId,
        resource_id: Option<&str>,
    ) -> bool {
        if !self.applies_to(tenant_id) {
            return false;
        }

        let mut candidates = self
            .applicable_entries(tenant_id)
            .filter(|e| e.grants(resource_type, permission));

        candidates.any(|e| e.resource.id.is_none() || e.resource.id.as_deref() == resource_id)
    }

    /// Whether this role has a type-wide grant (no resource id) for `tenant_id`.
    pub fn grants_type_wide(&self, resource_type: ResourceType, permission: Permission, tenant_id: &TenantId) -> bool {
        self.applies_to(tenant_id)
            && self
                .applicable_entries(tenant_id)
                .any(|e| e.grants(resource_type, permission) && e.resource.id.is_none())
    }

    /// Ids of the specific resources this role grants `permission` on in `tenant_id`.
    pub fn granted_resource_ids<'a>(
        &'a self,
        resource_type: ResourceType,
        permission: Permission,
        tenant_id: &'a TenantId,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.acl_entries
            .iter()
            .filter(move |e| self.is_global || &e.resource.tenant_id == tenant_id)
            .filter(move |e| e.grants(resource_type, permission))
            .filter_map(|e| e.resource.id.as_deref())
    }
}

/// Assignment of a role to a user within a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRole {
    pub user_id: UserId,
    pub role_id: RoleId,
    pub tenant_id: TenantId,
    pub assigned_at: DateTime<Utc>,
}

/// Evaluate `permission` across a set of roles already resolved for a user.
///
/// A role is eligible when it is global or belongs to `tenant_id`; any
/// eligible role with an exact or type-wide grant is sufficient.
pub fn roles_grant_permission(
    roles: &[Role],
    resource_type: ResourceType,
    permission: Permission,
    tenant_id: &TenantId,
    resource_id: Option<&str>,
) -> bool {
    roles
        .iter()
        .any(|role| role.grants(resource_type, permission, tenant_id, resource_id))
}
