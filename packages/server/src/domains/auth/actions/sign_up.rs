//! Account registration

use serde::Deserialize;
use supabase::{Credentials, SignUpOutcome};
use tracing::info;

use crate::domains::auth::errors::AuthError;
use crate::domains::auth::models::LoginIdentifier;
use crate::kernel::BaseAuthBackend;

/// Registration form
#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
    /// Email or phone number
    pub identifier: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Register an account with an email or a (normalized) phone credential
pub async fn sign_up(
    backend: &dyn BaseAuthBackend,
    request: &SignUpRequest,
    country_code: &str,
) -> Result<SignUpOutcome, AuthError> {
    if request.identifier.trim().is_empty() {
        return Err(AuthError::MissingField("Email or phone"));
    }
    if request.password.is_empty() {
        return Err(AuthError::MissingField("Password"));
    }

    let credentials = match LoginIdentifier::parse(&request.identifier, country_code)? {
        LoginIdentifier::Email(email) => Credentials::Email {
            email,
            password: request.password.clone(),
        },
        LoginIdentifier::Phone(phone) => Credentials::Phone {
            phone,
            password: request.password.clone(),
        },
    };

    let full_name = request
        .full_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    let outcome = backend
        .sign_up(credentials, full_name)
        .await
        .map_err(AuthError::from_backend)?;

    match &outcome {
        SignUpOutcome::Session(session) => {
            info!(user_id = %session.user.id, "Account created and signed in")
        }
        SignUpOutcome::PendingConfirmation(user) => {
            info!(user_id = %user.id, "Account created, awaiting confirmation")
        }
    }
    Ok(outcome)
}
