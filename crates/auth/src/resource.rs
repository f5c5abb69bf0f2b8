//! Protectable resources.

use serde::{Deserialize, Serialize};

use sitegate_core::{DomainError, SiteId, TenantId, ValueObject};

/// Kind of resource a grant applies to.
///
/// `Tenant` is reserved for system-level grants (managing tenants themselves)
/// and is not part of [`ResourceType::ORDINARY`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    User,
    Site,
    Category,
    Listing,
    Setting,
    Audit,
    Role,
    Tenant,
}

impl ResourceType {
    pub const ORDINARY: [ResourceType; 7] = [
        ResourceType::User,
        ResourceType::Site,
        ResourceType::Category,
        ResourceType::Listing,
        ResourceType::Setting,
        ResourceType::Audit,
        ResourceType::Role,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::User => "user",
            ResourceType::Site => "site",
            ResourceType::Category => "category",
            ResourceType::Listing => "listing",
            ResourceType::Setting => "setting",
            ResourceType::Audit => "audit",
            ResourceType::Role => "role",
            ResourceType::Tenant => "tenant",
        }
    }
}

impl core::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for ResourceType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceType::ORDINARY
            .into_iter()
            .chain([ResourceType::Tenant])
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown resource type '{s}'")))
    }
}

/// A protectable target in the flat-ACL layer.
///
/// - `id: None` means every resource of this type (type-wide).
/// - `site_id: None` means not restricted to a single site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub tenant_id: TenantId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<SiteId>,
}

impl ValueObject for Resource {}

impl Resource {
    /// Tenant-wide resource: every resource of `resource_type` in `tenant_id`.
    pub fn tenant_wide(resource_type: ResourceType, tenant_id: TenantId) -> Self {
        Self {
            resource_type,
            id: None,
            tenant_id,
            site_id: None,
        }
    }

    /// Restrict to a single site.
    pub fn in_site(mut self, site_id: SiteId) -> Self {
        self.site_id = Some(site_id);
        self
    }

    /// Restrict to a single resource.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}
