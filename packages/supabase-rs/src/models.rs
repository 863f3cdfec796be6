use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// GoTrue user record (only the fields the platform reads)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub user_metadata: HashMap<String, Value>,
}

impl User {
    /// Display name stored in `user_metadata.full_name` at sign-up
    pub fn full_name(&self) -> Option<String> {
        self.user_metadata
            .get("full_name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}

/// Session issued by GoTrue on sign-in, sign-up or OTP verification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Password credentials; GoTrue accepts either an email or a phone
#[derive(Debug, Clone)]
pub enum Credentials {
    Email { email: String, password: String },
    Phone { phone: String, password: String },
}

impl Credentials {
    pub(crate) fn to_json(&self) -> Value {
        match self {
            Credentials::Email { email, password } => {
                serde_json::json!({ "email": email, "password": password })
            }
            Credentials::Phone { phone, password } => {
                serde_json::json!({ "phone": phone, "password": password })
            }
        }
    }
}

/// Delivery channel for one-time passwords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpChannel {
    Sms,
    Email,
}

impl OtpChannel {
    /// Channel for a recipient: anything with an `@` is an email
    pub fn for_recipient(recipient: &str) -> Self {
        if recipient.contains('@') {
            OtpChannel::Email
        } else {
            OtpChannel::Sms
        }
    }

    pub(crate) fn recipient_field(self) -> &'static str {
        match self {
            OtpChannel::Sms => "phone",
            OtpChannel::Email => "email",
        }
    }

    pub(crate) fn verify_type(self) -> &'static str {
        match self {
            OtpChannel::Sms => "sms",
            OtpChannel::Email => "email",
        }
    }
}

/// Sign-up either logs the user straight in or waits on a confirmation
#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    Session(AuthSession),
    PendingConfirmation(User),
}

/// Error payloads differ between GoTrue versions; all fields are optional
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}
