use std::collections::HashSet;
use std::sync::RwLock;

use async_trait::async_trait;

use sitegate_auth::{ProviderError, TenantMembershipProvider};
use sitegate_core::{TenantId, UserId};

/// In-memory tenant membership for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryMembershipStore {
    inner: RwLock<HashSet<(TenantId, UserId)>>,
}

impl InMemoryMembershipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the user was already a member.
    pub fn add_member(&self, tenant_id: TenantId, user_id: UserId) -> bool {
        match self.inner.write() {
            Ok(mut set) => set.insert((tenant_id, user_id)),
            Err(_) => false,
        }
    }

    /// Returns `false` if the user was not a member.
    pub fn remove_member(&self, tenant_id: &TenantId, user_id: &UserId) -> bool {
        match self.inner.write() {
            Ok(mut set) => set.remove(&(tenant_id.clone(), user_id.clone())),
            Err(_) => false,
        }
    }

    pub fn members(&self, tenant_id: &TenantId) -> Vec<UserId> {
        let set = match self.inner.read() {
            Ok(s) => s,
            Err(_) => return vec![],
        };

        let mut members: Vec<UserId> = set
            .iter()
            .filter_map(|(t, u)| if t == tenant_id { Some(u.clone()) } else { None })
            .collect();
        members.sort();
        members
    }
}

#[async_trait]
impl TenantMembershipProvider for InMemoryMembershipStore {
    async fn is_tenant_member(&self, user_id: &UserId, tenant_id: &TenantId) -> Result<bool, ProviderError> {
        let set = self
            .inner
            .read()
            .map_err(|_| ProviderError::unavailable("membership store lock poisoned"))?;
        Ok(set.contains(&(tenant_id.clone(), user_id.clone())))
    }
}
