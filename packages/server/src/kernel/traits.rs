// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Identifier resolution, role classification and caching live in domains/auth
// and talk to the backend only through these traits.
//
// Naming convention: Base* for trait names (e.g., BaseAuthBackend)

use anyhow::Result;
use async_trait::async_trait;
use supabase::{AuthSession, Credentials, SignUpOutcome, User};
use uuid::Uuid;

// =============================================================================
// Auth Backend Trait (Infrastructure - hosted auth + privileged lookups)
// =============================================================================

#[async_trait]
pub trait BaseAuthBackend: Send + Sync {
    /// Password check against an email credential
    async fn sign_in_with_email(&self, email: &str, password: &str) -> Result<AuthSession>;

    /// Password check against a phone credential (E.164)
    async fn sign_in_with_phone(&self, phone: &str, password: &str) -> Result<AuthSession>;

    async fn sign_up(
        &self,
        credentials: Credentials,
        full_name: Option<&str>,
    ) -> Result<SignUpOutcome>;

    /// Send a one-time code; phones get SMS, emails get email
    async fn send_otp(&self, recipient: &str) -> Result<()>;

    async fn verify_otp(&self, recipient: &str, code: &str) -> Result<AuthSession>;

    /// Revoke the session behind an access token
    async fn sign_out(&self, access_token: &str) -> Result<()>;

    async fn get_user(&self, access_token: &str) -> Result<User>;

    /// Exchange a refresh token for a new session
    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession>;

    // -------------------------------------------------------------------------
    // Privileged lookups
    // -------------------------------------------------------------------------

    /// Role through the privileged lookup function
    async fn role_for_user(&self, user_id: Uuid) -> Result<Option<String>>;

    /// Role read straight from the roles table
    async fn role_from_table(&self, user_id: Uuid) -> Result<Option<String>>;

    /// Email linked to a phone, through the privileged lookup function
    async fn email_for_phone(&self, phone: &str) -> Result<Option<String>>;

    /// Email column of the first row in `table` whose `phone_column` equals `phone`
    async fn find_email_by_phone(
        &self,
        table: &str,
        phone_column: &str,
        email_column: &str,
        phone: &str,
    ) -> Result<Option<String>>;
}
