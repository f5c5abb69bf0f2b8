use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use sitegate_auth::{ProviderError, Role, RoleProvider, UserRole};
use sitegate_core::{RoleId, TenantId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoleStoreError {
    #[error("unknown role: {0}")]
    UnknownRole(RoleId),

    #[error("role {role_id} belongs to tenant {role_tenant}, cannot be assigned in {tenant_id}")]
    TenantMismatch {
        role_id: RoleId,
        role_tenant: TenantId,
        tenant_id: TenantId,
    },

    #[error("role store lock poisoned")]
    Poisoned,
}

#[derive(Debug, Default)]
struct State {
    roles: HashMap<RoleId, Role>,
    assignments: Vec<UserRole>,
}

/// In-memory role definitions and user-role assignments for tests/dev.
///
/// Permission evaluation uses the default role aggregator of [`RoleProvider`].
#[derive(Debug, Default)]
pub struct InMemoryRoleStore {
    inner: RwLock<State>,
}

impl InMemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a role definition.
    pub fn upsert_role(&self, role: Role) -> Result<(), RoleStoreError> {
        let mut state = self.inner.write().map_err(|_| RoleStoreError::Poisoned)?;
        state.roles.insert(role.id.clone(), role);
        Ok(())
    }

    /// Remove a role and every assignment of it.
    pub fn remove_role(&self, role_id: &RoleId) -> Result<Option<Role>, RoleStoreError> {
        let mut state = self.inner.write().map_err(|_| RoleStoreError::Poisoned)?;
        state.assignments.retain(|a| &a.role_id != role_id);
        Ok(state.roles.remove(role_id))
    }

    pub fn role(&self, role_id: &RoleId) -> Option<Role> {
        self.inner.read().ok()?.roles.get(role_id).cloned()
    }

    /// Assign `role_id` to `user_id` within `tenant_id`.
    ///
    /// Non-global roles may only be assigned in their own tenant. Assigning
    /// an existing assignment again is a no-op.
    pub fn assign_role(
        &self,
        user_id: UserId,
        role_id: &RoleId,
        tenant_id: TenantId,
        assigned_at: DateTime<Utc>,
    ) -> Result<(), RoleStoreError> {
        let mut state = self.inner.write().map_err(|_| RoleStoreError::Poisoned)?;

        let role = state
            .roles
            .get(role_id)
            .ok_or_else(|| RoleStoreError::UnknownRole(role_id.clone()))?;

        if !role.applies_to(&tenant_id) {
            return Err(RoleStoreError::TenantMismatch {
                role_id: role_id.clone(),
                role_tenant: role.tenant_id.clone(),
                tenant_id,
            });
        }

        let exists = state
            .assignments
            .iter()
            .any(|a| a.user_id == user_id && &a.role_id == role_id && a.tenant_id == tenant_id);
        if exists {
            debug!(user_id = %user_id, role_id = %role_id, tenant_id = %tenant_id, "role already assigned");
            return Ok(());
        }

        state.assignments.push(UserRole {
            user_id,
            role_id: role_id.clone(),
            tenant_id,
            assigned_at,
        });
        Ok(())
    }

    /// Returns `true` if an assignment was removed.
    pub fn unassign_role(
        &self,
        user_id: &UserId,
        role_id: &RoleId,
        tenant_id: &TenantId,
    ) -> Result<bool, RoleStoreError> {
        let mut state = self.inner.write().map_err(|_| RoleStoreError::Poisoned)?;
        let before = state.assignments.len();
        state
            .assignments
            .retain(|a| !(&a.user_id == user_id && &a.role_id == role_id && &a.tenant_id == tenant_id));
        Ok(state.assignments.len() != before)
    }

    pub fn assignments(&self, user_id: &UserId) -> Vec<UserRole> {
        match self.inner.read() {
            Ok(state) => state
                .assignments
                .iter()
                .filter(|a| &a.user_id == user_id)
                .cloned()
                .collect(),
            Err(_) => vec![],
        }
    }
}

#[async_trait]
impl RoleProvider for InMemoryRoleStore {
    /// Roles assigned to the user in `tenant_id`, plus global roles assigned
    /// to the user anywhere. Sorted by role id, without duplicates.
    async fn user_roles(&self, user_id: &UserId, tenant_id: &TenantId) -> Result<Vec<Role>, ProviderError> {
        let state = self
            .inner
            .read()
            .map_err(|_| ProviderError::unavailable("role store lock poisoned"))?;

        let mut roles: Vec<Role> = state
            .assignments
            .iter()
            .filter(|a| &a.user_id == user_id)
            .filter_map(|a| {
                let role = state.roles.get(&a.role_id)?;
                (role.is_global || &a.tenant_id == tenant_id).then(|| role.clone())
            })
            .collect();

        roles.sort_by(|a, b| a.id.cmp(&b.id));
        roles.dedup_by(|a, b| a.id == b.id);
        Ok(roles)
    }
}
