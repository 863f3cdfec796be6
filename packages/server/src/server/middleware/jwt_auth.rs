use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::domains::auth::{AccessTokenVerifier, Session, SessionTokens};

/// Cookie the sign-in endpoints store the access token in
pub const ACCESS_TOKEN_COOKIE: &str = "elverra_access_token";

/// Authenticated user information from a verified access token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub access_token: String,
}

impl AuthUser {
    pub fn session(&self) -> Session {
        Session {
            user_id: self.user_id,
            email: self.email.clone(),
            phone: self.phone.clone(),
            full_name: None,
        }
    }

    /// Tokens for a resolver acting on this user's behalf (no refresh token on requests)
    pub fn tokens(&self) -> SessionTokens {
        SessionTokens {
            access_token: self.access_token.clone(),
            refresh_token: String::new(),
            expires_at: None,
        }
    }
}

/// JWT authentication middleware
///
/// Reads the access token from the Authorization header, falling back to the
/// session cookie, verifies it and adds `AuthUser` to request extensions.
/// If no token or invalid token, request continues without AuthUser (public access).
pub async fn jwt_auth_middleware(
    verifier: Arc<AccessTokenVerifier>,
    mut request: Request,
    next: Next,
) -> Response {
    match extract_auth_user(request.headers(), &verifier) {
        Some(user) => {
            debug!(user_id = %user.user_id, "Authenticated request");
            request.extensions_mut().insert(user);
        }
        None => debug!("No valid authentication token"),
    }

    next.run(request).await
}

fn extract_auth_user(headers: &HeaderMap, verifier: &AccessTokenVerifier) -> Option<AuthUser> {
    let token = bearer_token(headers).or_else(|| {
        CookieJar::from_headers(headers)
            .get(ACCESS_TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string())
    })?;

    let claims = verifier.verify(&token).ok()?;
    let user_id = claims.user_id().ok()?;

    Some(AuthUser {
        user_id,
        email: claims.email.filter(|e| !e.is_empty()),
        phone: claims.phone.filter(|p| !p.is_empty()),
        access_token: token,
    })
}

/// Handles both "Bearer <token>" and a raw token
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then(|| token.to_string())
}
