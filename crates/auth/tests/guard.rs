mod support;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use chrono::{Duration, Utc};

use sitegate_auth::{
    AccessConfig, CheckMode, DenialKind, GuardDecision, Permission, PermissionCheck, PermissionGuard, ResourceType,
    SessionClaims, TenantAccessGateway,
};
use sitegate_core::TenantId;

use support::{FakeMembership, FakeRoles, FakeSessions, acme, acme_editor, gateway, member_of_acme, user};

type Guard = PermissionGuard<FakeSessions, Arc<FakeMembership>, Arc<FakeRoles>>;

fn sessions() -> FakeSessions {
    let now = Utc::now();
    let mut tokens = HashMap::new();
    tokens.insert(
        "live".to_string(),
        SessionClaims {
            sub: user(),
            issued_at: now - Duration::minutes(5),
            expires_at: now + Duration::hours(1),
        },
    );
    tokens.insert(
        "stale".to_string(),
        SessionClaims {
            sub: user(),
            issued_at: now - Duration::hours(3),
            expires_at: now - Duration::hours(2),
        },
    );
    FakeSessions {
        tokens,
        ..Default::default()
    }
}

fn guard_with(sessions: FakeSessions, roles: FakeRoles, config: AccessConfig) -> Guard {
    let gateway = TenantAccessGateway::new(Arc::new(member_of_acme()), Arc::new(roles));
    PermissionGuard::new(sessions, gateway, config)
}

fn guard() -> Guard {
    guard_with(
        sessions(),
        FakeRoles {
            roles: vec![acme_editor()],
            ..Default::default()
        },
        AccessConfig::default(),
    )
}

#[tokio::test]
async fn unknown_token_is_unauthenticated() {
    let check = PermissionCheck::new(ResourceType::Listing).require(Permission::Read);
    assert_eq!(
        guard().evaluate("nope", &acme(), &check).await,
        GuardDecision::Deny(DenialKind::Unauthenticated)
    );
}

#[tokio::test]
async fn expired_session_is_rejected() {
    let check = PermissionCheck::new(ResourceType::Listing).require(Permission::Read);
    assert_eq!(
        guard().evaluate("stale", &acme(), &check).await,
        GuardDecision::Deny(DenialKind::InvalidSession)
    );
}

#[tokio::test]
async fn resolver_failure_denies() {
    let failing = FakeSessions {
        fail: true,
        ..sessions()
    };
    let guard = guard_with(failing, FakeRoles::default(), AccessConfig::default());

    assert_eq!(
        guard.evaluate_tenant("live", &acme()).await,
        GuardDecision::Deny(DenialKind::Unauthenticated)
    );
}

#[tokio::test]
async fn tenant_guard_checks_membership_only() {
    let guard = guard();
    assert!(guard.evaluate_tenant("live", &acme()).await.is_allowed());
    assert_eq!(
        guard.evaluate_tenant("live", &TenantId::new("globex")).await,
        GuardDecision::Deny(DenialKind::NotTenantMember)
    );
}

#[tokio::test]
async fn any_and_all_modes() {
    let guard = guard();
    let check = PermissionCheck::new(ResourceType::Listing)
        .require(Permission::Read)
        .require(Permission::Delete);

    assert_eq!(check.mode, CheckMode::Any);
    assert!(guard.evaluate("live", &acme(), &check).await.is_allowed());
    assert_eq!(
        guard.evaluate("live", &acme(), &check.clone().all()).await,
        GuardDecision::Deny(DenialKind::MissingPermission)
    );
}

#[tokio::test]
async fn resource_scoped_check() {
    let guard = guard();
    let check = PermissionCheck::new(ResourceType::Listing).require(Permission::Update);

    assert!(guard.evaluate("live", &acme(), &check.clone().on("l-2")).await.is_allowed());
    assert!(!guard.evaluate("live", &acme(), &check.on("l-3")).await.is_allowed());
}

#[tokio::test]
async fn empty_permission_list_falls_back_to_read() {
    let guard = guard();
    // Editor can read listings but not sites.
    assert!(guard.evaluate("live", &acme(), &PermissionCheck::new(ResourceType::Listing)).await.is_allowed());
    assert!(!guard.evaluate("live", &acme(), &PermissionCheck::new(ResourceType::Site)).await.is_allowed());
}

#[tokio::test]
async fn fallback_permission_is_configurable() {
    let guard = guard_with(
        sessions(),
        FakeRoles {
            roles: vec![acme_editor()],
            ..Default::default()
        },
        AccessConfig::default().with_fallback_permission(Permission::Manage),
    );

    assert!(!guard.evaluate("live", &acme(), &PermissionCheck::new(ResourceType::Listing)).await.is_allowed());
}

#[tokio::test]
async fn clock_skew_admits_slightly_future_sessions() {
    let now = Utc::now();
    let mut s = sessions();
    s.tokens.insert(
        "early".to_string(),
        SessionClaims {
            sub: user(),
            issued_at: now + Duration::seconds(20),
            expires_at: now + Duration::hours(1),
        },
    );
    let strict = guard_with(s, FakeRoles::default(), AccessConfig::default());
    assert_eq!(
        strict.evaluate_tenant_at("early", &acme(), now).await,
        GuardDecision::Deny(DenialKind::InvalidSession)
    );

    let mut s = sessions();
    s.tokens.insert(
        "early".to_string(),
        SessionClaims {
            sub: user(),
            issued_at: now + Duration::seconds(20),
            expires_at: now + Duration::hours(1),
        },
    );
    let lenient = guard_with(s, FakeRoles::default(), AccessConfig::default().with_clock_skew_secs(60));
    assert!(lenient.evaluate_tenant_at("early", &acme(), now).await.is_allowed());
}

#[tokio::test]
async fn permission_check_looks_up_membership_once() {
    let roles = FakeRoles {
        roles: vec![acme_editor()],
        ..Default::default()
    };
    let (gw, membership, _) = gateway(member_of_acme(), roles);
    let guard = PermissionGuard::new(sessions(), gw, AccessConfig::default());

    let checks = [
        PermissionCheck::new(ResourceType::Listing).require(Permission::Read),
        PermissionCheck::new(ResourceType::Listing)
            .require(Permission::Read)
            .require(Permission::Delete)
            .all(),
        PermissionCheck::new(ResourceType::Site),
    ];
    for check in &checks {
        let before = membership.calls.load(Ordering::SeqCst);
        guard.evaluate("live", &acme(), check).await;
        assert_eq!(membership.calls.load(Ordering::SeqCst) - before, 1);
    }

    let before = membership.calls.load(Ordering::SeqCst);
    assert_eq!(
        guard.evaluate("live", &TenantId::new("globex"), &checks[0]).await,
        GuardDecision::Deny(DenialKind::NotTenantMember)
    );
    assert_eq!(membership.calls.load(Ordering::SeqCst) - before, 1);
}

#[tokio::test]
async fn oversized_skew_setting_is_clamped_to_a_day() {
    let now = Utc::now();
    let mut s = sessions();
    s.tokens.insert(
        "ancient".to_string(),
        SessionClaims {
            sub: user(),
            issued_at: now - Duration::days(4),
            expires_at: now - Duration::days(3),
        },
    );
    let guard = guard_with(s, FakeRoles::default(), AccessConfig::default().with_clock_skew_secs(i64::MAX));

    assert!(guard.evaluate_tenant_at("live", &acme(), now).await.is_allowed());
    assert!(guard.evaluate_tenant_at("stale", &acme(), now).await.is_allowed());
    assert_eq!(
        guard.evaluate_tenant_at("ancient", &acme(), now).await,
        GuardDecision::Deny(DenialKind::InvalidSession)
    );
}

#[test]
fn decision_serializes_for_diagnostics() {
    let json = serde_json::to_value(GuardDecision::Deny(DenialKind::NotTenantMember)).unwrap();
    assert_eq!(json, serde_json::json!({"decision": "deny", "kind": "not_tenant_member"}));
}
