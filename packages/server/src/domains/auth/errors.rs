use thiserror::Error;

/// Shown when a phone login cannot be tied to any account
pub const NO_ACCOUNT_FOR_PHONE: &str = "No account found for this phone. Please use your email.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    #[error("Invalid phone number format: {0}")]
    InvalidFormat(String),
}

/// Failures surfaced to whoever drives a sign-in form
///
/// `Display` is the message meant for the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid phone number. Use 8 digits or the full international format.")]
    InvalidPhone(#[from] PhoneError),

    #[error("{0} is required")]
    MissingField(&'static str),

    /// Message as returned by the auth backend (wrong password, expired code, ...)
    #[error("{0}")]
    Rejected(String),

    #[error("No account found for this phone. Please use your email.")]
    NoAccountForPhone,

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Authentication service unavailable: {0}")]
    Backend(String),
}

impl AuthError {
    /// Backend errors keep the vendor's wording; everything we cannot classify is a backend fault
    pub fn from_backend(err: anyhow::Error) -> Self {
        match err.downcast_ref::<supabase::SupabaseError>() {
            Some(supabase::SupabaseError::Auth { message, .. }) => AuthError::Rejected(message.clone()),
            _ => AuthError::Backend(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_account_message_is_exact() {
        assert_eq!(AuthError::NoAccountForPhone.to_string(), NO_ACCOUNT_FOR_PHONE);
    }

    #[test]
    fn test_vendor_rejections_keep_their_wording() {
        let err = anyhow::Error::new(supabase::SupabaseError::Auth {
            status: 400,
            message: "Invalid login credentials".to_string(),
        });
        assert_eq!(
            AuthError::from_backend(err),
            AuthError::Rejected("Invalid login credentials".to_string())
        );

        let err = anyhow::Error::new(supabase::SupabaseError::Network("refused".to_string()));
        assert!(matches!(AuthError::from_backend(err), AuthError::Backend(_)));
    }
}
