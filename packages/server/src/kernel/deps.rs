//! Server dependencies (using traits for testability)
//!
//! This module provides the central dependency container shared by the HTTP
//! layer and the session resolver. The auth backend sits behind a trait so
//! tests can swap in `MockAuthBackend`.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use supabase::{AuthSession, Credentials, OtpChannel, SignUpOutcome, SupabaseClient, User};
use tracing::debug;
use uuid::Uuid;

use crate::common::SystemClock;
use crate::domains::auth::{
    AccessTokenVerifier, AuthSettings, EmailLookupChain, RoleCache, SessionResolver,
};
use crate::domains::i18n::{Catalog, Language, Translator};
use crate::domains::membership::MembershipApiClient;
use crate::kernel::BaseAuthBackend;

/// Privileged Postgres functions and tables the adapter relies on
const ROLE_FUNCTION: &str = "get_user_role";
const EMAIL_BY_PHONE_FUNCTION: &str = "get_email_by_phone";
const ROLES_TABLE: &str = "user_roles";

// =============================================================================
// SupabaseClient Adapter (implements BaseAuthBackend trait)
// =============================================================================

/// Wrapper around SupabaseClient that implements BaseAuthBackend trait
pub struct SupabaseAdapter(pub Arc<SupabaseClient>);

impl SupabaseAdapter {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self(client)
    }
}

#[async_trait]
impl BaseAuthBackend for SupabaseAdapter {
    async fn sign_in_with_email(&self, email: &str, password: &str) -> Result<AuthSession> {
        Ok(self
            .0
            .sign_in_with_password(&Credentials::Email {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?)
    }

    async fn sign_in_with_phone(&self, phone: &str, password: &str) -> Result<AuthSession> {
        Ok(self
            .0
            .sign_in_with_password(&Credentials::Phone {
                phone: phone.to_string(),
                password: password.to_string(),
            })
            .await?)
    }

    async fn sign_up(
        &self,
        credentials: Credentials,
        full_name: Option<&str>,
    ) -> Result<SignUpOutcome> {
        let data = match full_name {
            Some(name) => json!({ "full_name": name }),
            None => json!({}),
        };
        Ok(self.0.sign_up(&credentials, data).await?)
    }

    async fn send_otp(&self, recipient: &str) -> Result<()> {
        Ok(self
            .0
            .send_otp(recipient, OtpChannel::for_recipient(recipient))
            .await?)
    }

    async fn verify_otp(&self, recipient: &str, code: &str) -> Result<AuthSession> {
        Ok(self
            .0
            .verify_otp(recipient, code, OtpChannel::for_recipient(recipient))
            .await?)
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        Ok(self.0.sign_out(access_token).await?)
    }

    async fn get_user(&self, access_token: &str) -> Result<User> {
        Ok(self.0.get_user(access_token).await?)
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession> {
        Ok(self.0.refresh_session(refresh_token).await?)
    }

    async fn role_for_user(&self, user_id: Uuid) -> Result<Option<String>> {
        let role: Option<String> = self
            .0
            .rpc(ROLE_FUNCTION, &json!({ "p_user_id": user_id }))
            .await?;
        Ok(role)
    }

    async fn role_from_table(&self, user_id: Uuid) -> Result<Option<String>> {
        let user_id = user_id.to_string();
        let rows = self
            .0
            .select_eq(ROLES_TABLE, "role", &[("user_id", user_id.as_str())], 1)
            .await?;
        Ok(first_string(&rows, "role"))
    }

    async fn email_for_phone(&self, phone: &str) -> Result<Option<String>> {
        // The function returns either a bare string or a one-row table
        let value: Value = self
            .0
            .rpc(EMAIL_BY_PHONE_FUNCTION, &json!({ "p_phone": phone }))
            .await?;
        Ok(match value {
            Value::String(email) => Some(email),
            Value::Array(rows) => first_string(&rows, "email"),
            _ => None,
        })
    }

    async fn find_email_by_phone(
        &self,
        table: &str,
        phone_column: &str,
        email_column: &str,
        phone: &str,
    ) -> Result<Option<String>> {
        let rows = self
            .0
            .select_eq(table, email_column, &[(phone_column, phone)], 1)
            .await?;
        debug!(table, phone_column, hits = rows.len(), "Email lookup by phone");
        Ok(first_string(&rows, email_column))
    }
}

/// `rows[0][column]` as a non-empty string
fn first_string(rows: &[Value], column: &str) -> Option<String> {
    rows.first()
        .and_then(|row| row.get(column))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Dependencies shared by every request
#[derive(Clone)]
pub struct ServerDeps {
    pub auth: Arc<dyn BaseAuthBackend>,
    /// Process-wide role cache, shared by every resolver and the role gate
    pub role_cache: Arc<RoleCache>,
    pub email_lookup: Arc<EmailLookupChain>,
    pub auth_settings: AuthSettings,
    pub token_verifier: Arc<AccessTokenVerifier>,
    pub catalog: Arc<Catalog>,
    pub default_language: Language,
    pub membership_api: MembershipApiClient,
}

impl ServerDeps {
    pub fn new(
        auth: Arc<dyn BaseAuthBackend>,
        auth_settings: AuthSettings,
        token_verifier: Arc<AccessTokenVerifier>,
        catalog: Arc<Catalog>,
        default_language: Language,
        membership_api: MembershipApiClient,
    ) -> Self {
        let role_cache = Arc::new(RoleCache::new(
            auth_settings.role_cache_ttl,
            Arc::new(SystemClock),
        ));
        Self {
            auth,
            role_cache,
            email_lookup: Arc::new(EmailLookupChain::default()),
            auth_settings,
            token_verifier,
            catalog,
            default_language,
            membership_api,
        }
    }

    /// Fresh resolver sharing this server's backend and role cache
    pub fn session_resolver(&self) -> SessionResolver {
        SessionResolver::new(
            self.auth.clone(),
            self.role_cache.clone(),
            self.email_lookup.clone(),
            self.auth_settings.clone(),
        )
    }

    pub fn translator(&self, language: Language) -> Translator {
        Translator::new(self.catalog.clone(), language)
    }
}
