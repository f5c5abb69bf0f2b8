//! Shared fakes for gateway and guard tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use sitegate_auth::{
    Permission, ProviderError, ResourceType, Role, RoleProvider, SessionClaims, SessionResolver, TenantAce,
    TenantAccessGateway, TenantMembershipProvider,
};
use sitegate_core::{RoleId, TenantId, UserId};

#[derive(Default)]
pub struct FakeMembership {
    pub members: Vec<(UserId, TenantId)>,
    pub fail: bool,
    pub calls: AtomicUsize,
}

#[async_trait]
impl TenantMembershipProvider for FakeMembership {
    async fn is_tenant_member(&self, user_id: &UserId, tenant_id: &TenantId) -> Result<bool, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProviderError::unavailable("membership backend down"));
        }
        Ok(self
            .members
            .iter()
            .any(|(u, t)| u == user_id && t == tenant_id))
    }
}

/// Role provider that uses the default aggregator and counts every call.
#[derive(Default)]
pub struct FakeRoles {
    pub roles: Vec<Role>,
    pub fail: bool,
    pub role_lookups: AtomicUsize,
    pub permission_checks: AtomicUsize,
}

#[async_trait]
impl RoleProvider for FakeRoles {
    async fn user_roles(&self, _user_id: &UserId, _tenant_id: &TenantId) -> Result<Vec<Role>, ProviderError> {
        self.role_lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow::anyhow!("role store corrupted").into());
        }
        Ok(self.roles.clone())
    }

    async fn has_permission(
        &self,
        user_id: &UserId,
        tenant_id: &TenantId,
        resource_type: ResourceType,
        permission: Permission,
        resource_id: Option<&str>,
    ) -> Result<bool, ProviderError> {
        self.permission_checks.fetch_add(1, Ordering::SeqCst);
        let roles = self.user_roles(user_id, tenant_id).await?;
        Ok(sitegate_auth::roles_grant_permission(
            &roles,
            resource_type,
            permission,
            tenant_id,
            resource_id,
        ))
    }
}

impl FakeRoles {
    pub fn total_calls(&self) -> usize {
        self.role_lookups.load(Ordering::SeqCst) + self.permission_checks.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct FakeSessions {
    pub tokens: HashMap<String, SessionClaims>,
    pub fail: bool,
}

#[async_trait]
impl SessionResolver for FakeSessions {
    async fn resolve(&self, token: &str) -> Result<Option<SessionClaims>, ProviderError> {
        if self.fail {
            return Err(ProviderError::Timeout("session store".to_string()));
        }
        Ok(self.tokens.get(token).cloned())
    }
}

pub type Gateway = TenantAccessGateway<Arc<FakeMembership>, Arc<FakeRoles>>;

pub fn user() -> UserId {
    UserId::new("alice")
}

pub fn acme() -> TenantId {
    TenantId::new("acme")
}

pub fn member_of_acme() -> FakeMembership {
    FakeMembership {
        members: vec![(user(), acme())],
        ..Default::default()
    }
}

/// Listing editor in acme: type-wide read, update on two specific listings.
pub fn acme_editor() -> Role {
    Role::new(RoleId::new("editor"), "Editor", acme(), Utc::now()).with_entries([
        TenantAce::type_wide(ResourceType::Listing, Permission::Read, acme()),
        TenantAce::on_resource(ResourceType::Listing, Permission::Update, acme(), "l-2"),
        TenantAce::on_resource(ResourceType::Listing, Permission::Update, acme(), "l-1"),
        TenantAce::on_resource(ResourceType::Category, Permission::Read, acme(), "c-1"),
    ])
}

pub fn gateway(membership: FakeMembership, roles: FakeRoles) -> (Gateway, Arc<FakeMembership>, Arc<FakeRoles>) {
    let membership = Arc::new(membership);
    let roles = Arc::new(roles);
    (
        TenantAccessGateway::new(Arc::clone(&membership), Arc::clone(&roles)),
        membership,
        roles,
    )
}
