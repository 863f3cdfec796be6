//! Session resolver behavior against the seeded mock backend.

mod common;

use common::*;
use elverra_core::domains::auth::{
    normalize_phone, AuthError, RoleInfo, SessionState, DEFAULT_COUNTRY_CODE,
};
use std::time::Duration;
use test_context::test_context;

// ============================================================================
// Phone normalization
// ============================================================================

#[test]
fn eight_digit_locals_become_mali_e164() {
    let samples = [
        "76000001",
        "66 12 34 56",
        "70-00-00-00",
        "(90) 12.34.56",
        "00000000",
        " 99999999 ",
    ];
    for raw in samples {
        let e164 = normalize_phone(raw, DEFAULT_COUNTRY_CODE).unwrap();
        assert!(e164.starts_with("+223"), "{} -> {}", raw, e164);
        assert_eq!(e164.len(), 12, "{} -> {}", raw, e164);
        assert!(e164[1..].chars().all(|c| c.is_ascii_digit()), "{}", e164);
    }
}

#[test]
fn plus_prefixed_numbers_are_untouched() {
    for raw in ["+22376000001", "+33612345678", "+15550109999"] {
        assert_eq!(normalize_phone(raw, DEFAULT_COUNTRY_CODE).unwrap(), raw);
    }
    assert_eq!(
        normalize_phone("+1 (555) 010-9999", DEFAULT_COUNTRY_CODE).unwrap(),
        "+15550109999"
    );
    assert!(normalize_phone("+", DEFAULT_COUNTRY_CODE).is_err());
}

// ============================================================================
// Sign-in
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn email_sign_in_sets_email_and_no_phone(ctx: &TestHarness) {
    let resolver = ctx.resolver();
    let session = resolver
        .sign_in_with_password(MEMBER_EMAIL, PASSWORD)
        .await
        .unwrap();

    assert_eq!(session.user_id, MEMBER_ID);
    assert_eq!(session.email.as_deref(), Some(MEMBER_EMAIL));
    assert_eq!(session.phone, None);
    assert_eq!(resolver.state(), SessionState::Authenticated);
    assert_eq!(resolver.role().role, "USER");
    assert!(!resolver.is_admin());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn phone_sign_in_uses_phone_credential(ctx: &TestHarness) {
    let session = ctx
        .resolver()
        .sign_in_with_password("76 00 00 01", PASSWORD)
        .await
        .unwrap();
    assert_eq!(session.user_id, PHONE_MEMBER_ID);
    assert_eq!(session.phone.as_deref(), Some("22376000001"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn phone_sign_in_falls_back_to_linked_email(ctx: &TestHarness) {
    let session = ctx
        .resolver()
        .sign_in_with_password(LEGACY_LOCAL_PHONE, PASSWORD)
        .await
        .unwrap();

    assert_eq!(session.user_id, LEGACY_ID);
    assert_eq!(session.email.as_deref(), Some(LEGACY_EMAIL));
    assert_eq!(
        ctx.backend.sign_in_attempts(),
        vec!["+22376000002".to_string(), LEGACY_EMAIL.to_string()]
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn unknown_phone_reports_no_account(ctx: &TestHarness) {
    let resolver = ctx.resolver();
    let err = resolver
        .sign_in_with_password("+22379999999", PASSWORD)
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::NoAccountForPhone);
    assert_eq!(
        err.to_string(),
        "No account found for this phone. Please use your email."
    );
    assert_eq!(resolver.state(), SessionState::Anonymous);
    assert_eq!(resolver.session(), None);
}

// ============================================================================
// Role cache
// ============================================================================

#[tokio::test]
async fn concurrent_role_checks_issue_one_fetch() {
    let backend = seeded_backend().with_role_delay(Duration::from_millis(50));
    let ctx = TestHarness::new(backend, UNUSED_API_BASE);

    let first = ctx.resolver();
    let second = ctx.resolver();
    let support = first
        .sign_in_with_password(SUPPORT_EMAIL, PASSWORD)
        .await
        .unwrap();
    ctx.deps.role_cache.invalidate(support.user_id);
    second.restore(support.clone(), first.tokens().unwrap());

    let fetches_before = ctx.backend.role_fetches();
    let (a, b) = tokio::join!(first.check_user_role(false), second.check_user_role(false));

    assert_eq!(a, b);
    assert_eq!(a.role, "SUPPORT");
    assert_eq!(ctx.backend.role_fetches() - fetches_before, 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn role_is_cached_within_ttl_and_refetched_after(ctx: &TestHarness) {
    tokio::time::pause();
    let resolver = ctx.resolver();
    resolver
        .sign_in_with_password(SUPPORT_EMAIL, PASSWORD)
        .await
        .unwrap();
    assert_eq!(ctx.backend.role_fetches(), 1);

    tokio::time::advance(Duration::from_secs(29)).await;
    resolver.check_user_role(false).await;
    assert_eq!(ctx.backend.role_fetches(), 1);

    tokio::time::advance(Duration::from_secs(1)).await;
    resolver.check_user_role(false).await;
    assert_eq!(ctx.backend.role_fetches(), 2);

    // Forced checks always reach the backend
    resolver.check_user_role(true).await;
    assert_eq!(ctx.backend.role_fetches(), 3);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn sign_out_then_sign_in_sees_new_role(ctx: &TestHarness) {
    let resolver = ctx.resolver();
    resolver
        .sign_in_with_password(MEMBER_EMAIL, PASSWORD)
        .await
        .unwrap();
    assert_eq!(resolver.role(), RoleInfo::classify("USER", &[]));

    ctx.backend.set_role(MEMBER_ID, "SUPPORT");
    resolver.sign_out().await;
    assert_eq!(resolver.state(), SessionState::Anonymous);
    assert_eq!(ctx.deps.role_cache.get(MEMBER_ID), None);
    assert_eq!(ctx.backend.signed_out_tokens().len(), 1);

    resolver
        .sign_in_with_password(MEMBER_EMAIL, PASSWORD)
        .await
        .unwrap();
    assert_eq!(resolver.role().role, "SUPPORT");
    assert!(resolver.is_admin());
}

#[tokio::test]
async fn role_lookup_failures_degrade_to_default() {
    let ctx = TestHarness::new(seeded_backend().with_failing_role_rpc(), UNUSED_API_BASE);
    let resolver = ctx.resolver();
    resolver
        .sign_in_with_password(SUPERADMIN_EMAIL, PASSWORD)
        .await
        .unwrap();

    assert_eq!(resolver.role(), RoleInfo::default());
    assert!(!resolver.snapshot().role_loading);
}
