// TestDependencies - mock implementations for testing
//
// Provides an in-memory auth backend that can be injected into ServerDeps or
// a SessionResolver in tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use supabase::{AuthSession, Credentials, SignUpOutcome, SupabaseError, User};
use uuid::Uuid;

use super::BaseAuthBackend;
use crate::domains::auth::{AccessClaims, AccessTokenVerifier};

/// Secret the mock signs its access tokens with
pub const MOCK_JWT_SECRET: &str = "mock-jwt-secret-for-tests";

// =============================================================================
// Mock Auth Backend
// =============================================================================

#[derive(Debug, Clone)]
struct MockAccount {
    user: User,
    password: String,
}

/// Row of a profile-like table used by the phone -> email table scan
#[derive(Debug, Clone)]
struct MockRow {
    table: String,
    phone_column: String,
    email_column: String,
    phone: String,
    email: String,
}

#[derive(Default)]
struct MockState {
    accounts: Vec<MockAccount>,
    roles_rpc: HashMap<Uuid, String>,
    roles_table: HashMap<Uuid, String>,
    phone_emails_rpc: HashMap<String, String>,
    rows: Vec<MockRow>,
    role_rpc_fails: bool,
    email_rpc_fails: bool,
    otp_codes: HashMap<String, String>,
    signed_out_tokens: Vec<String>,
    sign_in_attempts: Vec<String>,
    table_lookups: Vec<(String, String, String)>,
}

pub struct MockAuthBackend {
    state: Mutex<MockState>,
    role_fetches: AtomicUsize,
    role_delay: Mutex<Option<Duration>>,
}

fn invalid_credentials() -> anyhow::Error {
    SupabaseError::Auth {
        status: 400,
        message: "Invalid login credentials".to_string(),
    }
    .into()
}

impl MockAuthBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            role_fetches: AtomicUsize::new(0),
            role_delay: Mutex::new(None),
        }
    }

    /// Register an account. Either contact field may be absent; the phone is
    /// stored the way GoTrue stores it (E.164 without the `+`).
    pub fn with_account(
        self,
        user_id: Uuid,
        email: Option<&str>,
        phone: Option<&str>,
        password: &str,
    ) -> Self {
        let user = User {
            id: user_id.to_string(),
            email: email.map(str::to_string),
            phone: phone.map(|p| p.trim_start_matches('+').to_string()),
            role: Some("authenticated".to_string()),
            user_metadata: HashMap::from([(
                "full_name".to_string(),
                serde_json::Value::String("Test Member".to_string()),
            )]),
        };
        self.state.lock().unwrap().accounts.push(MockAccount {
            user,
            password: password.to_string(),
        });
        self
    }

    /// Role returned by the privileged lookup function
    pub fn with_role(self, user_id: Uuid, role: &str) -> Self {
        self.set_role(user_id, role);
        self
    }

    /// Role stored in the roles table (used when the function fails)
    pub fn with_table_role(self, user_id: Uuid, role: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .roles_table
            .insert(user_id, role.to_string());
        self
    }

    /// Make the privileged role lookup fail
    pub fn with_failing_role_rpc(self) -> Self {
        self.state.lock().unwrap().role_rpc_fails = true;
        self
    }

    /// Phone -> email mapping known to the privileged lookup function
    pub fn with_phone_email_rpc(self, phone: &str, email: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .phone_emails_rpc
            .insert(phone.to_string(), email.to_string());
        self
    }

    pub fn with_failing_email_rpc(self) -> Self {
        self.state.lock().unwrap().email_rpc_fails = true;
        self
    }

    /// A row in `table` linking `phone` (as stored) to `email`
    pub fn with_row(
        self,
        table: &str,
        phone_column: &str,
        email_column: &str,
        phone: &str,
        email: &str,
    ) -> Self {
        self.state.lock().unwrap().rows.push(MockRow {
            table: table.to_string(),
            phone_column: phone_column.to_string(),
            email_column: email_column.to_string(),
            phone: phone.to_string(),
            email: email.to_string(),
        });
        self
    }

    /// Slow down role fetches so concurrent callers overlap
    pub fn with_role_delay(self, delay: Duration) -> Self {
        *self.role_delay.lock().unwrap() = Some(delay);
        self
    }

    /// Change a role after construction (simulates an admin promoting someone)
    pub fn set_role(&self, user_id: Uuid, role: &str) {
        self.state
            .lock()
            .unwrap()
            .roles_rpc
            .insert(user_id, role.to_string());
    }

    /// Code that `verify_otp` will accept for a recipient
    pub fn set_otp_code(&self, recipient: &str, code: &str) {
        self.state
            .lock()
            .unwrap()
            .otp_codes
            .insert(recipient.to_string(), code.to_string());
    }

    /// Number of role lookups that reached the backend
    pub fn role_fetches(&self) -> usize {
        self.role_fetches.load(Ordering::SeqCst)
    }

    pub fn signed_out_tokens(&self) -> Vec<String> {
        self.state.lock().unwrap().signed_out_tokens.clone()
    }

    /// Identifiers passed to password sign-in, in call order
    pub fn sign_in_attempts(&self) -> Vec<String> {
        self.state.lock().unwrap().sign_in_attempts.clone()
    }

    /// `(table, phone_column, phone)` of every table scan
    pub fn table_lookups(&self) -> Vec<(String, String, String)> {
        self.state.lock().unwrap().table_lookups.clone()
    }

    /// Verifier accepting the tokens this mock issues
    pub fn token_verifier() -> AccessTokenVerifier {
        AccessTokenVerifier::new(MOCK_JWT_SECRET)
    }

    /// Signed access token for a user, valid for an hour
    pub fn access_token_for(user_id: Uuid, email: Option<&str>) -> String {
        let claims = AccessClaims::new(
            user_id,
            email.map(str::to_string),
            None,
            chrono::Duration::hours(1),
        );
        Self::token_verifier().issue(&claims).unwrap()
    }

    fn session_for(user: &User) -> AuthSession {
        let claims = AccessClaims {
            phone: user.phone.clone(),
            ..AccessClaims::new(
                Uuid::parse_str(&user.id).unwrap(),
                user.email.clone(),
                None,
                chrono::Duration::hours(1),
            )
        };
        AuthSession {
            access_token: Self::token_verifier().issue(&claims).unwrap(),
            refresh_token: format!("mock-refresh-{}", user.id),
            token_type: "bearer".to_string(),
            expires_in: 3600,
            expires_at: None,
            user: user.clone(),
        }
    }

    fn find_account<F>(&self, matches: F) -> Option<MockAccount>
    where
        F: Fn(&MockAccount) -> bool,
    {
        self.state
            .lock()
            .unwrap()
            .accounts
            .iter()
            .find(|a| matches(a))
            .cloned()
    }
}

impl Default for MockAuthBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseAuthBackend for MockAuthBackend {
    async fn sign_in_with_email(&self, email: &str, password: &str) -> Result<AuthSession> {
        self.state
            .lock()
            .unwrap()
            .sign_in_attempts
            .push(email.to_string());
        self.find_account(|a| a.user.email.as_deref() == Some(email) && a.password == password)
            .map(|a| Self::session_for(&a.user))
            .ok_or_else(invalid_credentials)
    }

    async fn sign_in_with_phone(&self, phone: &str, password: &str) -> Result<AuthSession> {
        self.state
            .lock()
            .unwrap()
            .sign_in_attempts
            .push(phone.to_string());
        let stored = phone.trim_start_matches('+');
        self.find_account(|a| a.user.phone.as_deref() == Some(stored) && a.password == password)
            .map(|a| Self::session_for(&a.user))
            .ok_or_else(invalid_credentials)
    }

    async fn sign_up(
        &self,
        credentials: Credentials,
        full_name: Option<&str>,
    ) -> Result<SignUpOutcome> {
        let user_id = Uuid::new_v4();
        let mut metadata = HashMap::new();
        if let Some(name) = full_name {
            metadata.insert(
                "full_name".to_string(),
                serde_json::Value::String(name.to_string()),
            );
        }

        let (user, password, confirm_first) = match credentials {
            Credentials::Email { email, password } => (
                User {
                    id: user_id.to_string(),
                    email: Some(email),
                    phone: None,
                    role: None,
                    user_metadata: metadata,
                },
                password,
                true,
            ),
            Credentials::Phone { phone, password } => (
                User {
                    id: user_id.to_string(),
                    email: None,
                    phone: Some(phone.trim_start_matches('+').to_string()),
                    role: None,
                    user_metadata: metadata,
                },
                password,
                false,
            ),
        };

        self.state.lock().unwrap().accounts.push(MockAccount {
            user: user.clone(),
            password,
        });

        // Email sign-ups wait for confirmation, phone sign-ups log straight in
        if confirm_first {
            Ok(SignUpOutcome::PendingConfirmation(user))
        } else {
            Ok(SignUpOutcome::Session(Self::session_for(&user)))
        }
    }

    async fn send_otp(&self, recipient: &str) -> Result<()> {
        let stored = recipient.trim_start_matches('+');
        let known = self
            .find_account(|a| {
                a.user.email.as_deref() == Some(recipient) || a.user.phone.as_deref() == Some(stored)
            })
            .is_some();
        if known {
            Ok(())
        } else {
            Err(SupabaseError::Auth {
                status: 422,
                message: "Signups not allowed for otp".to_string(),
            }
            .into())
        }
    }

    async fn verify_otp(&self, recipient: &str, code: &str) -> Result<AuthSession> {
        let expected = self.state.lock().unwrap().otp_codes.get(recipient).cloned();
        if expected.as_deref() != Some(code) {
            return Err(SupabaseError::Auth {
                status: 403,
                message: "Token has expired or is invalid".to_string(),
            }
            .into());
        }

        let stored = recipient.trim_start_matches('+');
        self.find_account(|a| {
            a.user.email.as_deref() == Some(recipient) || a.user.phone.as_deref() == Some(stored)
        })
        .map(|a| Self::session_for(&a.user))
        .ok_or_else(|| anyhow!("no account for {}", recipient))
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .signed_out_tokens
            .push(access_token.to_string());
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<User> {
        let user_id = Self::token_verifier()
            .verify(access_token)
            .map(|claims| claims.sub)
            .unwrap_or_default();
        self.find_account(|a| a.user.id == user_id)
            .map(|a| a.user)
            .ok_or_else(|| {
                SupabaseError::Auth {
                    status: 401,
                    message: "invalid JWT".to_string(),
                }
                .into()
            })
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession> {
        let user_id = refresh_token.strip_prefix("mock-refresh-").unwrap_or_default();
        self.find_account(|a| a.user.id == user_id)
            .map(|a| Self::session_for(&a.user))
            .ok_or_else(|| {
                SupabaseError::Auth {
                    status: 400,
                    message: "Invalid Refresh Token: Refresh Token Not Found".to_string(),
                }
                .into()
            })
    }

    async fn role_for_user(&self, user_id: Uuid) -> Result<Option<String>> {
        self.role_fetches.fetch_add(1, Ordering::SeqCst);

        let delay = *self.role_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.lock().unwrap();
        if state.role_rpc_fails {
            return Err(anyhow!("function get_user_role does not exist"));
        }
        Ok(state.roles_rpc.get(&user_id).cloned())
    }

    async fn role_from_table(&self, user_id: Uuid) -> Result<Option<String>> {
        Ok(self.state.lock().unwrap().roles_table.get(&user_id).cloned())
    }

    async fn email_for_phone(&self, phone: &str) -> Result<Option<String>> {
        let state = self.state.lock().unwrap();
        if state.email_rpc_fails {
            return Err(anyhow!("permission denied for function get_email_by_phone"));
        }
        Ok(state.phone_emails_rpc.get(phone).cloned())
    }

    async fn find_email_by_phone(
        &self,
        table: &str,
        phone_column: &str,
        email_column: &str,
        phone: &str,
    ) -> Result<Option<String>> {
        let mut state = self.state.lock().unwrap();
        state.table_lookups.push((
            table.to_string(),
            phone_column.to_string(),
            phone.to_string(),
        ));
        Ok(state
            .rows
            .iter()
            .find(|row| {
                row.table == table
                    && row.phone_column == phone_column
                    && row.email_column == email_column
                    && row.phone == phone
            })
            .map(|row| row.email.clone()))
    }
}
