use thiserror::Error;

/// What users see whenever one of these calls fails
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Error, Debug)]
pub enum MembershipApiError {
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl MembershipApiError {
    /// Message safe to show in a toast; details stay in the logs
    pub fn user_message(&self) -> &'static str {
        GENERIC_FAILURE_MESSAGE
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            MembershipApiError::Status { status, .. } => Some(*status),
            MembershipApiError::Network(e) => e.status().map(|s| s.as_u16()),
            MembershipApiError::Decode(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MembershipApiError>;
