//! Verify OTP action

use supabase::AuthSession;
use tracing::{info, warn};

use crate::domains::auth::errors::AuthError;
use crate::domains::auth::models::LoginIdentifier;
use crate::kernel::BaseAuthBackend;

/// Exchange a one-time code for a session
pub async fn verify_otp(
    backend: &dyn BaseAuthBackend,
    identifier: &str,
    code: &str,
    country_code: &str,
) -> Result<AuthSession, AuthError> {
    if identifier.trim().is_empty() {
        return Err(AuthError::MissingField("Email or phone"));
    }
    let code = code.trim();
    if code.is_empty() {
        return Err(AuthError::MissingField("Code"));
    }

    let identifier = LoginIdentifier::parse(identifier, country_code)?;
    match backend.verify_otp(identifier.as_str(), code).await {
        Ok(session) => {
            info!(user_id = %session.user.id, "OTP verified");
            Ok(session)
        }
        Err(e) => {
            warn!(error = %e, "OTP verification failed");
            Err(AuthError::from_backend(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::auth::actions::send_otp;
    use crate::kernel::MockAuthBackend;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_phone_otp_round_trip() {
        let id = Uuid::new_v4();
        let backend = MockAuthBackend::new().with_account(id, None, Some("+22376543210"), "pw");
        backend.set_otp_code("+22376543210", "123456");

        let sent_to = send_otp(&backend, "76-54-32-10", "223").await.unwrap();
        assert_eq!(sent_to, LoginIdentifier::Phone("+22376543210".to_string()));

        let session = verify_otp(&backend, "76543210", " 123456 ", "223").await.unwrap();
        assert_eq!(session.user.id, id.to_string());
    }

    #[tokio::test]
    async fn test_wrong_code() {
        let id = Uuid::new_v4();
        let backend = MockAuthBackend::new().with_account(id, Some("awa@example.com"), None, "pw");
        backend.set_otp_code("awa@example.com", "123456");

        let err = verify_otp(&backend, "awa@example.com", "000000", "223")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Token has expired or is invalid");
    }

    #[tokio::test]
    async fn test_missing_code() {
        let backend = MockAuthBackend::new();
        assert_eq!(
            verify_otp(&backend, "awa@example.com", "  ", "223").await.unwrap_err(),
            AuthError::MissingField("Code")
        );
    }
}
