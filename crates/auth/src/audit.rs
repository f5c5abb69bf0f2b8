//! Tenant-boundary audits over flat ACLs.

use std::collections::BTreeSet;

use serde::Serialize;

use sitegate_core::TenantId;

use crate::Acl;

/// Result of auditing an ACL against its home tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossTenantReport {
    pub home_tenant: TenantId,
    /// Tenants other than the home tenant and `system`, sorted.
    pub foreign_tenants: Vec<TenantId>,
    /// Number of entries referencing a foreign tenant.
    pub offending_entries: usize,
}

impl CrossTenantReport {
    pub fn is_clean(&self) -> bool {
        self.foreign_tenants.is_empty()
    }
}

impl Acl {
    /// Whether any entry references a tenant other than `tenant_id` or `system`.
    pub fn detect_cross_tenant_access(&self, tenant_id: &TenantId) -> bool {
        self.entries.iter().any(|e| is_foreign(&e.resource.tenant_id, tenant_id))
    }

    /// Every tenant referenced by this ACL, de-duplicated and sorted.
    pub fn referenced_tenants(&self) -> Vec<TenantId> {
        self.entries
            .iter()
            .map(|e| e.resource.tenant_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn cross_tenant_report(&self, tenant_id: &TenantId) -> CrossTenantReport {
        let offending: Vec<&TenantId> = self
            .entries
            .iter()
            .map(|e| &e.resource.tenant_id)
            .filter(|t| is_foreign(t, tenant_id))
            .collect();

        CrossTenantReport {
            home_tenant: tenant_id.clone(),
            offending_entries: offending.len(),
            foreign_tenants: offending
                .into_iter()
                .cloned()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        }
    }
}

fn is_foreign(entry_tenant: &TenantId, home: &TenantId) -> bool {
    entry_tenant != home && !entry_tenant.is_system()
}
