//! Error types for the Supabase client.

use thiserror::Error;

/// Result type for Supabase client operations.
pub type Result<T> = std::result::Result<T, SupabaseError>;

/// Supabase client errors.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// GoTrue rejected the request (bad credentials, expired OTP, unknown user)
    #[error("{message}")]
    Auth { status: u16, message: String },

    /// PostgREST or RPC returned a non-2xx response
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl SupabaseError {
    /// HTTP status of the failed call, when the vendor answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            SupabaseError::Auth { status, .. } | SupabaseError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
