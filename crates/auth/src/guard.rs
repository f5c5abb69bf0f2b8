//! Permission and tenant guards for presentation layers.
//!
//! A guard turns an opaque session token plus a requested check into a
//! single allow/deny decision. Every failure mode (unknown token, expired
//! session, collaborator error, missing grant) collapses to a denial; the
//! [`DenialKind`] is for logging and diagnostics only.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error};

use sitegate_core::{TenantId, UserId};

use crate::{
    AccessConfig, CheckMode, Permission, ResourceType, RoleProvider, SessionResolver, TenantAccessGateway,
    TenantCheck, TenantMembershipProvider, validate_session,
};

/// A guard's requirement on a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionCheck {
    pub resource_type: ResourceType,
    pub permissions: Vec<Permission>,
    pub resource_id: Option<String>,
    pub mode: CheckMode,
}

impl PermissionCheck {
    pub fn new(resource_type: ResourceType) -> Self {
        Self {
            resource_type,
            permissions: Vec::new(),
            resource_id: None,
            mode: CheckMode::Any,
        }
    }

    pub fn require(mut self, permission: Permission) -> Self {
        self.permissions.push(permission);
        self
    }

    pub fn on(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    pub fn all(mut self) -> Self {
        self.mode = CheckMode::All;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    Unauthenticated,
    InvalidSession,
    NotTenantMember,
    MissingPermission,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "decision", content = "kind")]
pub enum GuardDecision {
    Allow,
    Deny(DenialKind),
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }
}

/// Session-aware guard over a [`TenantAccessGateway`].
pub struct PermissionGuard<S, M, R> {
    sessions: S,
    gateway: TenantAccessGateway<M, R>,
    config: AccessConfig,
}

impl<S, M, R> PermissionGuard<S, M, R>
where
    S: SessionResolver,
    M: TenantMembershipProvider,
    R: RoleProvider,
{
    pub fn new(sessions: S, gateway: TenantAccessGateway<M, R>, config: AccessConfig) -> Self {
        Self {
            sessions,
            gateway,
            config,
        }
    }

    pub fn gateway(&self) -> &TenantAccessGateway<M, R> {
        &self.gateway
    }

    /// Tenant guard: allow any authenticated member of `tenant_id`.
    pub async fn evaluate_tenant(&self, token: &str, tenant_id: &TenantId) -> GuardDecision {
        self.evaluate_tenant_at(token, tenant_id, Utc::now()).await
    }

    pub async fn evaluate_tenant_at(
        &self,
        token: &str,
        tenant_id: &TenantId,
        now: DateTime<Utc>,
    ) -> GuardDecision {
        let user_id = match self.authenticate(token, now).await {
            Ok(user_id) => user_id,
            Err(kind) => return GuardDecision::Deny(kind),
        };

        if self.gateway.is_tenant_member(&user_id, tenant_id).await {
            GuardDecision::Allow
        } else {
            GuardDecision::Deny(DenialKind::NotTenantMember)
        }
    }

    /// Permission guard: allow when `check` is satisfied in `tenant_id`.
    ///
    /// An empty permission list checks the configured fallback permission.
    pub async fn evaluate(&self, token: &str, tenant_id: &TenantId, check: &PermissionCheck) -> GuardDecision {
        self.evaluate_at(token, tenant_id, check, Utc::now()).await
    }

    pub async fn evaluate_at(
        &self,
        token: &str,
        tenant_id: &TenantId,
        check: &PermissionCheck,
        now: DateTime<Utc>,
    ) -> GuardDecision {
        let user_id = match self.authenticate(token, now).await {
            Ok(user_id) => user_id,
            Err(kind) => return GuardDecision::Deny(kind),
        };

        let fallback = [self.config.fallback_permission];
        let (permissions, mode) = match check.permissions.as_slice() {
            [] => (&fallback[..], CheckMode::Any),
            permissions => (permissions, check.mode),
        };

        let outcome = self
            .gateway
            .check_in_tenant(
                &user_id,
                tenant_id,
                check.resource_type,
                permissions,
                mode,
                check.resource_id.as_deref(),
            )
            .await;

        match outcome {
            TenantCheck::Granted => GuardDecision::Allow,
            TenantCheck::NotMember => GuardDecision::Deny(DenialKind::NotTenantMember),
            TenantCheck::MissingPermission => {
                debug!(user_id = %user_id, tenant_id = %tenant_id, resource_type = %check.resource_type, "guard denied");
                GuardDecision::Deny(DenialKind::MissingPermission)
            }
        }
    }

    async fn authenticate(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, DenialKind> {
        let claims = match self.sessions.resolve(token).await {
            Ok(Some(claims)) => claims,
            Ok(None) => return Err(DenialKind::Unauthenticated),
            Err(err) => {
                error!(error = %err, "session resolution failed; denying");
                return Err(DenialKind::Unauthenticated);
            }
        };

        if let Err(err) = validate_session(&claims, now, self.config.clock_skew()) {
            debug!(user_id = %claims.sub, error = %err, "rejected session");
            return Err(DenialKind::InvalidSession);
        }

        Ok(claims.sub)
    }
}
