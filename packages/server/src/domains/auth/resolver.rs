//! Session resolver
//!
//! Owns one user's session and resolved role, publishes every change as an
//! `AuthSnapshot` on a watch channel, and delegates the network work to the
//! auth actions. Role lookups go through the shared `RoleCache`.

use std::sync::{Arc, Mutex, MutexGuard};
use supabase::{AuthSession, SignUpOutcome};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::actions::{self, SignUpRequest};
use super::email_lookup::EmailLookupChain;
use super::errors::AuthError;
use super::models::{
    AuthSnapshot, AuthStateChange, RoleInfo, Session, SessionState, SessionTokens,
};
use super::role_cache::RoleCache;
use super::AuthSettings;
use crate::kernel::BaseAuthBackend;

pub struct SessionResolver {
    backend: Arc<dyn BaseAuthBackend>,
    role_cache: Arc<RoleCache>,
    email_lookup: Arc<EmailLookupChain>,
    settings: AuthSettings,
    snapshot: watch::Sender<AuthSnapshot>,
    tokens: Mutex<Option<SessionTokens>>,
}

impl SessionResolver {
    pub fn new(
        backend: Arc<dyn BaseAuthBackend>,
        role_cache: Arc<RoleCache>,
        email_lookup: Arc<EmailLookupChain>,
        settings: AuthSettings,
    ) -> Self {
        let (snapshot, _) = watch::channel(AuthSnapshot::default());
        Self {
            backend,
            role_cache,
            email_lookup,
            settings,
            snapshot,
            tokens: Mutex::new(None),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        self.snapshot.borrow().state
    }

    pub fn session(&self) -> Option<Session> {
        self.snapshot.borrow().session.clone()
    }

    pub fn role(&self) -> RoleInfo {
        self.snapshot.borrow().role.clone()
    }

    pub fn is_admin(&self) -> bool {
        self.snapshot.borrow().role.is_admin
    }

    pub fn tokens(&self) -> Option<SessionTokens> {
        self.lock_tokens().clone()
    }

    fn lock_tokens(&self) -> MutexGuard<'_, Option<SessionTokens>> {
        self.tokens.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn current_user(&self) -> Option<Uuid> {
        self.snapshot.borrow().session.as_ref().map(|s| s.user_id)
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Adopt a session established elsewhere (e.g. a verified request token)
    pub fn restore(&self, session: Session, tokens: SessionTokens) {
        self.apply_session(session, tokens);
    }

    pub async fn sign_in_with_password(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let previous = self.begin_authenticating();
        let result = actions::sign_in_with_password(
            self.backend.as_ref(),
            &self.email_lookup,
            identifier,
            password,
            &self.settings.country_code,
        )
        .await;
        self.finish_authenticating(previous, result).await
    }

    /// Register; returns the session when the account is usable right away
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<Option<Session>, AuthError> {
        let outcome =
            actions::sign_up(self.backend.as_ref(), request, &self.settings.country_code).await?;

        match outcome {
            SignUpOutcome::Session(auth) => {
                let previous = self.begin_authenticating();
                self.finish_authenticating(previous, Ok(auth)).await.map(Some)
            }
            SignUpOutcome::PendingConfirmation(_) => Ok(None),
        }
    }

    pub async fn send_otp(&self, identifier: &str) -> Result<(), AuthError> {
        actions::send_otp(self.backend.as_ref(), identifier, &self.settings.country_code)
            .await
            .map(|_| ())
    }

    pub async fn verify_otp(&self, identifier: &str, code: &str) -> Result<Session, AuthError> {
        let previous = self.begin_authenticating();
        let result = actions::verify_otp(
            self.backend.as_ref(),
            identifier,
            code,
            &self.settings.country_code,
        )
        .await;
        self.finish_authenticating(previous, result).await
    }

    /// Trade the stored refresh token for fresh tokens
    ///
    /// The role is kept; a rejected refresh leaves the session untouched so
    /// the caller can decide whether to sign out.
    pub async fn refresh(&self) -> Result<Session, AuthError> {
        let refresh_token = self
            .tokens()
            .map(|t| t.refresh_token)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::NotAuthenticated)?;

        let auth = self
            .backend
            .refresh_session(&refresh_token)
            .await
            .map_err(|e| {
                warn!(error = %e, "Session refresh failed");
                AuthError::from_backend(e)
            })?;
        let (session, tokens) = Session::from_auth_session(&auth)?;

        let user_changed = self.current_user() != Some(session.user_id);
        self.apply_session(session.clone(), tokens);
        if user_changed {
            self.check_user_role(false).await;
        }
        Ok(session)
    }

    /// Resolve the current user's role and publish it
    ///
    /// Without a session the role is the default one. Lookup failures also
    /// end in the default role; this never fails.
    pub async fn check_user_role(&self, force: bool) -> RoleInfo {
        let Some(user_id) = self.current_user() else {
            self.snapshot.send_modify(|s| {
                s.role = RoleInfo::default();
                s.role_loading = false;
            });
            return RoleInfo::default();
        };

        self.snapshot.send_modify(|s| s.role_loading = true);

        let backend = self.backend.clone();
        let admin_roles = self.settings.admin_roles.clone();
        let info = self
            .role_cache
            .resolve(user_id, force, move || async move {
                actions::fetch_role(backend.as_ref(), user_id, &admin_roles).await
            })
            .await;

        // The user may have signed out while the lookup ran
        let published = info.clone();
        self.snapshot.send_modify(|s| {
            if s.session.as_ref().map(|s| s.user_id) == Some(user_id) {
                s.role = published;
            }
            s.role_loading = false;
        });
        debug!(%user_id, role = %info.role, "Role resolved");
        info
    }

    /// Drop the local session first, then revoke it with the vendor
    ///
    /// Vendor failures are logged; locally the user is signed out either way.
    pub async fn sign_out(&self) {
        let tokens = self.lock_tokens().take();
        self.clear_local();

        if let Some(tokens) = tokens {
            if let Err(e) = self.backend.sign_out(&tokens.access_token).await {
                warn!(error = %e, "Vendor sign-out failed");
            }
        }
    }

    /// Apply an auth state change relayed from the vendor
    pub async fn handle_auth_event(&self, change: AuthStateChange) {
        let auth = match change {
            AuthStateChange::SignedOut => {
                self.lock_tokens().take();
                self.clear_local();
                return;
            }
            AuthStateChange::SignedIn(auth)
            | AuthStateChange::TokenRefreshed(auth)
            | AuthStateChange::UserUpdated(auth) => auth,
        };

        let (session, tokens) = match Session::from_auth_session(&auth) {
            Ok(parts) => parts,
            Err(e) => {
                warn!(error = %e, "Ignoring auth event with unreadable session");
                return;
            }
        };

        let user_changed = self.current_user() != Some(session.user_id);
        self.apply_session(session, tokens);
        if user_changed {
            self.check_user_role(false).await;
        }
    }

    // =========================================================================
    // State transitions
    // =========================================================================

    fn begin_authenticating(&self) -> SessionState {
        let previous = self.state();
        self.snapshot
            .send_modify(|s| s.state = SessionState::Authenticating);
        previous
    }

    async fn finish_authenticating(
        &self,
        previous: SessionState,
        result: Result<AuthSession, AuthError>,
    ) -> Result<Session, AuthError> {
        let parts = result.and_then(|auth| Session::from_auth_session(&auth));
        match parts {
            Ok((session, tokens)) => {
                info!(user_id = %session.user_id, "Session established");
                self.apply_session(session.clone(), tokens);
                self.check_user_role(false).await;
                Ok(session)
            }
            Err(e) => {
                let settled = match previous {
                    SessionState::Authenticated => SessionState::Authenticated,
                    _ => SessionState::Anonymous,
                };
                self.snapshot.send_modify(|s| s.state = settled);
                Err(e)
            }
        }
    }

    fn apply_session(&self, session: Session, tokens: SessionTokens) {
        *self.lock_tokens() = Some(tokens);
        self.snapshot.send_modify(|s| {
            if s.session.as_ref().map(|s| s.user_id) != Some(session.user_id) {
                s.role = RoleInfo::default();
            }
            s.session = Some(session);
            s.state = SessionState::Authenticated;
        });
    }

    fn clear_local(&self) {
        if let Some(user_id) = self.current_user() {
            self.role_cache.invalidate(user_id);
            info!(%user_id, "Signed out");
        }
        self.snapshot.send_modify(|s| {
            *s = AuthSnapshot {
                state: SessionState::Anonymous,
                ..AuthSnapshot::default()
            };
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::SystemClock;
    use crate::kernel::MockAuthBackend;
    use std::time::Duration;

    fn resolver(backend: Arc<MockAuthBackend>) -> SessionResolver {
        let settings = AuthSettings::default();
        let cache = Arc::new(RoleCache::new(
            settings.role_cache_ttl,
            Arc::new(SystemClock),
        ));
        SessionResolver::new(
            backend,
            cache,
            Arc::new(EmailLookupChain::default()),
            settings,
        )
    }

    #[tokio::test]
    async fn test_email_sign_in_sets_email_only() {
        let id = Uuid::new_v4();
        let backend = Arc::new(
            MockAuthBackend::new()
                .with_account(id, Some("awa@example.com"), None, "secret1")
                .with_role(id, "SUPPORT"),
        );
        let resolver = resolver(backend);
        assert_eq!(resolver.state(), SessionState::Unknown);

        let session = resolver
            .sign_in_with_password("awa@example.com", "secret1")
            .await
            .unwrap();
        assert_eq!(session.email.as_deref(), Some("awa@example.com"));
        assert_eq!(session.phone, None);
        assert_eq!(resolver.state(), SessionState::Authenticated);
        assert_eq!(resolver.role().role, "SUPPORT");
        assert!(resolver.is_admin());
        assert!(resolver.tokens().is_some());
    }

    #[tokio::test]
    async fn test_failed_sign_in_settles_anonymous() {
        let backend = Arc::new(MockAuthBackend::new());
        let resolver = resolver(backend);
        let mut updates = resolver.subscribe();

        let err = resolver
            .sign_in_with_password("76543210", "secret1")
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::NoAccountForPhone);
        assert_eq!(resolver.state(), SessionState::Anonymous);
        assert!(updates.has_changed().unwrap());
        assert_eq!(updates.borrow_and_update().session, None);
    }

    #[tokio::test]
    async fn test_sign_out_purges_before_vendor_call() {
        let id = Uuid::new_v4();
        let backend = Arc::new(
            MockAuthBackend::new()
                .with_account(id, Some("awa@example.com"), None, "secret1")
                .with_role(id, "USER"),
        );
        let resolver = resolver(backend.clone());

        resolver
            .sign_in_with_password("awa@example.com", "secret1")
            .await
            .unwrap();
        let token = resolver.tokens().unwrap().access_token;

        // Promotion happens while the old role is cached
        backend.set_role(id, "SUPERADMIN");
        resolver.sign_out().await;
        assert_eq!(resolver.state(), SessionState::Anonymous);
        assert_eq!(resolver.session(), None);
        assert_eq!(resolver.tokens(), None);
        assert_eq!(resolver.role(), RoleInfo::default());
        assert_eq!(backend.signed_out_tokens(), vec![token]);

        // A fresh sign-in must not see the stale USER role
        resolver
            .sign_in_with_password("awa@example.com", "secret1")
            .await
            .unwrap();
        assert_eq!(resolver.role().role, "SUPERADMIN");
        assert_eq!(backend.role_fetches(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_role_checks_fetch_once() {
        let id = Uuid::new_v4();
        let backend = Arc::new(
            MockAuthBackend::new()
                .with_account(id, Some("awa@example.com"), None, "secret1")
                .with_role(id, "SUPPORT")
                .with_role_delay(Duration::from_millis(50)),
        );
        let resolver = resolver(backend.clone());
        resolver
            .sign_in_with_password("awa@example.com", "secret1")
            .await
            .unwrap();
        assert_eq!(backend.role_fetches(), 1);

        let (a, b) = tokio::join!(
            resolver.check_user_role(true),
            resolver.check_user_role(true)
        );
        assert_eq!(a, b);
        assert_eq!(backend.role_fetches(), 2);
        assert!(!resolver.snapshot().role_loading);
    }

    #[tokio::test]
    async fn test_refresh_replaces_tokens_and_keeps_role() {
        let id = Uuid::new_v4();
        let backend = Arc::new(
            MockAuthBackend::new()
                .with_account(id, Some("awa@example.com"), None, "secret1")
                .with_role(id, "SUPPORT"),
        );
        let resolver = resolver(backend.clone());

        assert_eq!(resolver.refresh().await, Err(AuthError::NotAuthenticated));

        resolver
            .sign_in_with_password("awa@example.com", "secret1")
            .await
            .unwrap();
        let session = resolver.refresh().await.unwrap();
        assert_eq!(session.user_id, id);
        assert_eq!(resolver.role().role, "SUPPORT");
        assert_eq!(backend.role_fetches(), 1);
    }

    #[tokio::test]
    async fn test_rejected_refresh_keeps_session() {
        let id = Uuid::new_v4();
        let backend = Arc::new(MockAuthBackend::new().with_account(
            id,
            Some("awa@example.com"),
            None,
            "secret1",
        ));
        let resolver = resolver(backend);
        resolver.restore(
            Session {
                user_id: id,
                email: Some("awa@example.com".to_string()),
                phone: None,
                full_name: None,
            },
            SessionTokens {
                access_token: "a".to_string(),
                refresh_token: "revoked".to_string(),
                expires_at: None,
            },
        );

        let err = resolver.refresh().await.unwrap_err();
        assert!(matches!(err, AuthError::Rejected(_)));
        assert_eq!(resolver.state(), SessionState::Authenticated);
    }

    #[tokio::test]
    async fn test_role_without_session_is_default() {
        let resolver = resolver(Arc::new(MockAuthBackend::new()));
        assert_eq!(resolver.check_user_role(false).await, RoleInfo::default());
    }

    #[tokio::test]
    async fn test_auth_events_drive_session() {
        let id = Uuid::new_v4();
        let backend = Arc::new(
            MockAuthBackend::new()
                .with_account(id, None, Some("+22376543210"), "secret1")
                .with_role(id, "SUPERADMIN"),
        );
        let resolver = resolver(backend.clone());

        let auth = backend.sign_in_with_phone("+22376543210", "secret1").await.unwrap();
        resolver
            .handle_auth_event(AuthStateChange::SignedIn(auth.clone()))
            .await;
        assert_eq!(resolver.state(), SessionState::Authenticated);
        assert_eq!(resolver.session().unwrap().phone.as_deref(), Some("22376543210"));
        assert!(resolver.is_admin());

        // Same user: no extra role lookup
        resolver
            .handle_auth_event(AuthStateChange::TokenRefreshed(auth))
            .await;
        assert_eq!(backend.role_fetches(), 1);

        resolver.handle_auth_event(AuthStateChange::SignedOut).await;
        assert_eq!(resolver.state(), SessionState::Anonymous);
        assert!(!resolver.is_admin());
        assert!(backend.signed_out_tokens().is_empty());
    }

    #[tokio::test]
    async fn test_sign_up_with_immediate_session() {
        let resolver = resolver(Arc::new(MockAuthBackend::new()));
        let request = SignUpRequest {
            identifier: "76543210".to_string(),
            password: "secret1".to_string(),
            full_name: Some("Awa".to_string()),
        };

        let session = resolver.sign_up(&request).await.unwrap().unwrap();
        assert_eq!(session.full_name.as_deref(), Some("Awa"));
        assert_eq!(resolver.state(), SessionState::Authenticated);
    }
}
