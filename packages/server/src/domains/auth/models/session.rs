use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::RoleInfo;
use crate::domains::auth::errors::AuthError;

/// Signed-in identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub full_name: Option<String>,
}

/// Vendor tokens belonging to the current session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Narrow a vendor session into our types
    ///
    /// GoTrue hands back ids as strings and empty strings for absent contact
    /// fields; both are cleaned up here.
    pub fn from_auth_session(
        auth: &supabase::AuthSession,
    ) -> Result<(Self, SessionTokens), AuthError> {
        let session = Self::from_user(&auth.user)?;

        let expires_at = auth
            .expires_at
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .or_else(|| {
                (auth.expires_in > 0)
                    .then(|| Utc::now() + chrono::Duration::seconds(auth.expires_in))
            });

        Ok((
            session,
            SessionTokens {
                access_token: auth.access_token.clone(),
                refresh_token: auth.refresh_token.clone(),
                expires_at,
            },
        ))
    }

    pub fn from_user(user: &supabase::User) -> Result<Self, AuthError> {
        let user_id = Uuid::parse_str(&user.id)
            .map_err(|e| AuthError::Backend(format!("malformed user id {:?}: {}", user.id, e)))?;

        Ok(Self {
            user_id,
            email: non_empty(user.email.as_deref()),
            phone: non_empty(user.phone.as_deref()),
            full_name: user.full_name(),
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Session lifecycle
///
/// `Unknown -> Authenticating -> {Authenticated, Anonymous}`,
/// `Authenticated -> Anonymous` on sign-out or an external `SignedOut` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Unknown,
    Authenticating,
    Authenticated,
    Anonymous,
}

/// Everything a view needs to render auth-dependent UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub state: SessionState,
    pub session: Option<Session>,
    pub role: RoleInfo,
    pub role_loading: bool,
}

impl Default for AuthSnapshot {
    fn default() -> Self {
        Self {
            state: SessionState::Unknown,
            session: None,
            role: RoleInfo::default(),
            role_loading: false,
        }
    }
}

/// Auth state change pushed by the vendor SDK (or whoever relays it)
#[derive(Debug, Clone)]
pub enum AuthStateChange {
    SignedIn(supabase::AuthSession),
    TokenRefreshed(supabase::AuthSession),
    UserUpdated(supabase::AuthSession),
    SignedOut,
}
