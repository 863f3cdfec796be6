//! Password sign-in with email or phone

use supabase::AuthSession;
use tracing::{debug, info, warn};

use crate::domains::auth::email_lookup::EmailLookupChain;
use crate::domains::auth::errors::AuthError;
use crate::domains::auth::models::{phone_variants, LoginIdentifier};
use crate::kernel::BaseAuthBackend;

/// Check a password against whatever account the identifier points to.
///
/// Emails go straight to the email credential. Phones try the phone
/// credential first; accounts created with an email get a second chance
/// through the phone -> email lookup chain.
pub async fn sign_in_with_password(
    backend: &dyn BaseAuthBackend,
    email_lookup: &EmailLookupChain,
    identifier: &str,
    password: &str,
    country_code: &str,
) -> Result<AuthSession, AuthError> {
    if identifier.trim().is_empty() {
        return Err(AuthError::MissingField("Email or phone"));
    }
    if password.is_empty() {
        return Err(AuthError::MissingField("Password"));
    }

    match LoginIdentifier::parse(identifier, country_code)? {
        LoginIdentifier::Email(email) => backend
            .sign_in_with_email(&email, password)
            .await
            .map_err(AuthError::from_backend),
        LoginIdentifier::Phone(phone) => {
            match backend.sign_in_with_phone(&phone, password).await {
                Ok(session) => {
                    info!(user_id = %session.user.id, "Signed in with phone credential");
                    return Ok(session);
                }
                Err(e) => debug!(error = %e, "Phone credential rejected, looking up email"),
            }

            let variants = phone_variants(&phone, country_code);
            let Some(email) = email_lookup.resolve(backend, &variants).await else {
                warn!("No email linked to phone login");
                return Err(AuthError::NoAccountForPhone);
            };

            let session = backend
                .sign_in_with_email(&email, password)
                .await
                .map_err(AuthError::from_backend)?;
            info!(user_id = %session.user.id, "Signed in with email linked to phone");
            Ok(session)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::MockAuthBackend;
    use uuid::Uuid;

    const CC: &str = "223";

    async fn sign_in(
        backend: &MockAuthBackend,
        identifier: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        sign_in_with_password(backend, &EmailLookupChain::default(), identifier, password, CC).await
    }

    #[tokio::test]
    async fn test_email_identifier_is_normalized() {
        let id = Uuid::new_v4();
        let backend =
            MockAuthBackend::new().with_account(id, Some("awa@example.com"), None, "secret1");

        let session = sign_in(&backend, "  Awa@Example.COM ", "secret1").await.unwrap();
        assert_eq!(session.user.id, id.to_string());
        assert_eq!(backend.sign_in_attempts(), vec!["awa@example.com"]);
    }

    #[tokio::test]
    async fn test_phone_credential_first() {
        let id = Uuid::new_v4();
        let backend =
            MockAuthBackend::new().with_account(id, None, Some("+22376543210"), "secret1");

        let session = sign_in(&backend, "76 54 32 10", "secret1").await.unwrap();
        assert_eq!(session.user.id, id.to_string());
        assert_eq!(backend.sign_in_attempts(), vec!["+22376543210"]);
    }

    #[tokio::test]
    async fn test_phone_falls_back_to_linked_email() {
        let id = Uuid::new_v4();
        let backend = MockAuthBackend::new()
            .with_account(id, Some("moussa@example.com"), None, "secret1")
            .with_phone_email_rpc("+22376543210", "moussa@example.com");

        let session = sign_in(&backend, "76543210", "secret1").await.unwrap();
        assert_eq!(session.user.id, id.to_string());
        assert_eq!(
            backend.sign_in_attempts(),
            vec!["+22376543210", "moussa@example.com"]
        );
    }

    #[tokio::test]
    async fn test_unknown_phone_has_exact_message() {
        let backend = MockAuthBackend::new();
        let err = sign_in(&backend, "76543210", "secret1").await.unwrap_err();
        assert_eq!(err, AuthError::NoAccountForPhone);
        assert_eq!(
            err.to_string(),
            "No account found for this phone. Please use your email."
        );
    }

    #[tokio::test]
    async fn test_wrong_password_keeps_vendor_message() {
        let id = Uuid::new_v4();
        let backend =
            MockAuthBackend::new().with_account(id, Some("awa@example.com"), None, "secret1");

        let err = sign_in(&backend, "awa@example.com", "nope").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid login credentials");
    }

    #[tokio::test]
    async fn test_validation_happens_before_any_call() {
        let backend = MockAuthBackend::new();
        assert_eq!(
            sign_in(&backend, "", "secret1").await.unwrap_err(),
            AuthError::MissingField("Email or phone")
        );
        assert_eq!(
            sign_in(&backend, "76543210", "").await.unwrap_err(),
            AuthError::MissingField("Password")
        );
        assert!(matches!(
            sign_in(&backend, "12-34", "secret1").await.unwrap_err(),
            AuthError::InvalidPhone(_)
        ));
        assert!(backend.sign_in_attempts().is_empty());
    }

    #[tokio::test]
    async fn test_blank_phone_rows_never_match() {
        let id = Uuid::new_v4();
        let backend = MockAuthBackend::new()
            .with_account(id, Some("victim@example.com"), None, "secret1")
            .with_row("profiles", "phone", "email", "", "victim@example.com");

        for identifier in ["+", "+ ", "+()"] {
            assert!(matches!(
                sign_in(&backend, identifier, "secret1").await.unwrap_err(),
                AuthError::InvalidPhone(_)
            ));
        }
        assert!(backend.sign_in_attempts().is_empty());

        let err = sign_in(&backend, "76543210", "secret1").await.unwrap_err();
        assert_eq!(err, AuthError::NoAccountForPhone);
        assert_eq!(backend.sign_in_attempts(), vec!["+22376543210"]);
        assert!(backend
            .table_lookups()
            .iter()
            .all(|(_, _, phone)| !phone.is_empty()));
    }
}
