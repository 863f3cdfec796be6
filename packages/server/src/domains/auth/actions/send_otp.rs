//! Send OTP action

use tracing::info;

use crate::domains::auth::errors::AuthError;
use crate::domains::auth::models::LoginIdentifier;
use crate::kernel::BaseAuthBackend;

/// Send a one-time code by SMS (phones) or email.
///
/// Returns the normalized identifier the code was sent to; verification must
/// use the same one.
pub async fn send_otp(
    backend: &dyn BaseAuthBackend,
    identifier: &str,
    country_code: &str,
) -> Result<LoginIdentifier, AuthError> {
    if identifier.trim().is_empty() {
        return Err(AuthError::MissingField("Email or phone"));
    }

    let identifier = LoginIdentifier::parse(identifier, country_code)?;
    backend
        .send_otp(identifier.as_str())
        .await
        .map_err(AuthError::from_backend)?;

    info!(
        channel = match identifier {
            LoginIdentifier::Email(_) => "email",
            LoginIdentifier::Phone(_) => "sms",
        },
        "OTP sent"
    );
    Ok(identifier)
}
