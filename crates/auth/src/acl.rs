//! Flat access-control lists: one user's grants, evaluated in memory.
//!
//! Tenant isolation at this layer is enforced field by field: every match
//! tier requires the entry's `tenant_id` to equal the queried tenant. There
//! is no tenant wildcard here; cross-tenant grants only exist at the role
//! layer through global roles.

use serde::{Deserialize, Serialize};
use tracing::debug;

use sitegate_core::{SiteId, TenantId, UserId, ValueObject};

use crate::{Permission, Resource, ResourceType};

/// Access control entry: one atomic grant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ace {
    pub resource: Resource,
    pub permission: Permission,
}

impl ValueObject for Ace {}

/// Access control list for a single user.
///
/// Entries form an unordered set; lookups are existential. Mutating
/// operations return a new `Acl` and leave `self` untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Acl {
    pub user_id: UserId,
    pub entries: Vec<Ace>,
}

impl ValueObject for Acl {}

/// Which tier of [`Acl::match_tier`] satisfied a query.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// Entry names exactly the queried resource (id and site included).
    Exact,
    /// Entry has no id and is scoped to the queried site.
    SiteWide,
    /// Entry has neither id nor site.
    TenantWide,
}

impl Acl {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            entries: Vec::new(),
        }
    }

    /// Return the first tier that grants `permission`, if any.
    ///
    /// Tiers are a union, checked in order: exact, site-wide (only when
    /// `site_id` is supplied), tenant-wide.
    pub fn match_tier(
        &self,
        resource_type: ResourceType,
        permission: Permission,
        tenant_id: &TenantId,
        resource_id: Option<&str>,
        site_id: Option<&SiteId>,
    ) -> Option<MatchTier> {
        let candidates: Vec<&Resource> = self
            .entries
            .iter()
            .filter(|e| {
                e.permission == permission
                    && e.resource.resource_type == resource_type
                    && &e.resource.tenant_id == tenant_id
            })
            .map(|e| &e.resource)
            .collect();

        if candidates
            .iter()
            .any(|r| r.id.as_deref() == resource_id && r.site_id.as_ref() == site_id)
        {
            return Some(MatchTier::Exact);
        }

        if let Some(site_id) = site_id {
            if candidates
                .iter()
                .any(|r| r.id.is_none() && r.site_id.as_ref() == Some(site_id))
            {
                return Some(MatchTier::SiteWide);
            }
        }

        if candidates.iter().any(|r| r.id.is_none() && r.site_id.is_none()) {
            return Some(MatchTier::TenantWide);
        }

        None
    }

    /// Whether this ACL grants `permission` on the described resource.
    pub fn has_permission(
        &self,
        resource_type: ResourceType,
        permission: Permission,
        tenant_id: &TenantId,
        resource_id: Option<&str>,
        site_id: Option<&SiteId>,
    ) -> bool {
        self.match_tier(resource_type, permission, tenant_id, resource_id, site_id)
            .is_some()
    }

    /// Return a new ACL that also grants `permission` on the described resource.
    ///
    /// Idempotent: if an identical entry already exists the ACL is returned unchanged.
    pub fn grant_permission(
        &self,
        resource_type: ResourceType,
        permission: Permission,
        tenant_id: &TenantId,
        resource_id: Option<&str>,
        site_id: Option<&SiteId>,
    ) -> Acl {
        let ace = Ace {
            resource: Resource {
                resource_type,
                id: resource_id.map(str::to_string),
                tenant_id: tenant_id.clone(),
                site_id: site_id.cloned(),
            },
            permission,
        };

        if self.entries.contains(&ace) {
            debug!(user_id = %self.user_id, %resource_type, %permission, tenant_id = %tenant_id, "grant already present");
            return self.clone();
        }

        let mut entries = self.entries.clone();
        entries.push(ace);
        Acl {
            user_id: self.user_id.clone(),
            entries,
        }
    }

    /// Return a new ACL without the entry that exactly matches the arguments.
    ///
    /// Revoking an absent grant is a no-op.
    pub fn revoke_permission(
        &self,
        resource_type: ResourceType,
        permission: Permission,
        tenant_id: &TenantId,
        resource_id: Option<&str>,
        site_id: Option<&SiteId>,
    ) -> Acl {
        let entries = self
            .entries
            .iter()
            .filter(|e| {
                !(e.resource.resource_type == resource_type
                    && e.permission == permission
                    && &e.resource.tenant_id == tenant_id
                    && e.resource.id.as_deref() == resource_id
                    && e.resource.site_id.as_ref() == site_id)
            })
            .cloned()
            .collect();

        Acl {
            user_id: self.user_id.clone(),
            entries,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Admin builders
    // ─────────────────────────────────────────────────────────────────────────

    /// Site administrator: `manage` on the site plus CRUD on its categories,
    /// listings and users, all scoped to `site_id` within `tenant_id`.
    pub fn site_admin(user_id: UserId, tenant_id: TenantId, site_id: SiteId) -> Acl {
        let scoped = |resource_type| {
            Resource::tenant_wide(resource_type, tenant_id.clone()).in_site(site_id.clone())
        };

        let mut entries = vec![Ace {
            resource: scoped(ResourceType::Site),
            permission: Permission::Manage,
        }];

        for resource_type in [ResourceType::Category, ResourceType::Listing, ResourceType::User] {
            entries.extend(Permission::CRUD.into_iter().map(|permission| Ace {
                resource: scoped(resource_type),
                permission,
            }));
        }

        Acl { user_id, entries }
    }

    /// Tenant administrator: every permission on every ordinary resource type,
    /// tenant-wide.
    pub fn tenant_admin(user_id: UserId, tenant_id: TenantId) -> Acl {
        Acl {
            user_id,
            entries: full_control(&tenant_id),
        }
    }

    /// Super administrator: `manage` on tenants themselves plus full control
    /// over every ordinary resource type, all within the `system` tenant.
    pub fn super_admin(user_id: UserId) -> Acl {
        let system = TenantId::system();

        let mut entries = vec![Ace {
            resource: Resource::tenant_wide(ResourceType::Tenant, system.clone()),
            permission: Permission::Manage,
        }];
        entries.extend(full_control(&system));

        Acl { user_id, entries }
    }
}

fn full_control(tenant_id: &TenantId) -> Vec<Ace> {
    ResourceType::ORDINARY
        .into_iter()
        .flat_map(|resource_type| {
            Permission::ALL.into_iter().map(move |permission| Ace {
                resource: Resource::tenant_wide(resource_type, tenant_id.clone()),
                permission,
            })
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Explanation (audit trail)
// ─────────────────────────────────────────────────────────────────────────────

/// The question an explanation answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessQuery {
    pub resource_type: ResourceType,
    pub permission: Permission,
    pub tenant_id: TenantId,
    pub resource_id: Option<String>,
    pub site_id: Option<SiteId>,
}

/// Auditable account of a flat-ACL decision.
#[derive(Debug, Clone, Serialize)]
pub struct AccessExplanation {
    pub user_id: UserId,
    pub query: AccessQuery,
    pub granted: bool,
    pub tier: Option<MatchTier>,
    pub reason: String,
    /// Empty when granted.
    pub suggestions: Vec<String>,
}

impl Acl {
    /// Explain why `has_permission` would return what it returns.
    pub fn explain(
        &self,
        resource_type: ResourceType,
        permission: Permission,
        tenant_id: &TenantId,
        resource_id: Option<&str>,
        site_id: Option<&SiteId>,
    ) -> AccessExplanation {
        let tier = self.match_tier(resource_type, permission, tenant_id, resource_id, site_id);
        let query = AccessQuery {
            resource_type,
            permission,
            tenant_id: tenant_id.clone(),
            resource_id: resource_id.map(str::to_string),
            site_id: site_id.cloned(),
        };

        let (reason, suggestions) = match tier {
            Some(MatchTier::Exact) => (
                format!("exact grant of '{permission}' on {resource_type}"),
                Vec::new(),
            ),
            Some(MatchTier::SiteWide) => (
                format!("site-wide grant of '{permission}' on {resource_type}"),
                Vec::new(),
            ),
            Some(MatchTier::TenantWide) => (
                format!("tenant-wide grant of '{permission}' on {resource_type} in tenant {tenant_id}"),
                Vec::new(),
            ),
            None => {
                let mut suggestions = vec![format!(
                    "Grant '{permission}' on {resource_type} in tenant {tenant_id}"
                )];
                let other_tenant = self.entries.iter().any(|e| {
                    e.permission == permission
                        && e.resource.resource_type == resource_type
                        && &e.resource.tenant_id != tenant_id
                });
                if other_tenant {
                    suggestions.insert(
                        0,
                        format!(
                            "A matching grant exists in another tenant; grants never apply across tenants (requested {tenant_id})"
                        ),
                    );
                }
                (
                    format!("no grant of '{permission}' on {resource_type} matches"),
                    suggestions,
                )
            }
        };

        AccessExplanation {
            user_id: self.user_id.clone(),
            query,
            granted: tier.is_some(),
            tier,
            reason,
            suggestions,
        }
    }
}
