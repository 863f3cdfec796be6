//! JSON auth endpoints
//!
//! Each request gets a fresh `SessionResolver` sharing the process-wide role
//! cache. Successful sign-ins store the access token in an HttpOnly cookie so
//! the page router can gate on it.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::domains::auth::actions::SignUpRequest;
use crate::domains::auth::{AuthError, RoleInfo, Session, SessionResolver};
use crate::server::app::AppState;
use crate::server::middleware::{AuthUser, ACCESS_TOKEN_COOKIE};

// =============================================================================
// Payloads
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct OtpRequest {
    pub identifier: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub identifier: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: Session,
    pub role: RoleInfo,
}

// =============================================================================
// Errors
// =============================================================================

/// `AuthError` as an HTTP response; the body carries the user-facing message
pub struct ApiError(AuthError);

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AuthError::InvalidPhone(_) | AuthError::MissingField(_) => StatusCode::BAD_REQUEST,
            AuthError::Rejected(_) | AuthError::NoAccountForPhone | AuthError::NotAuthenticated => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Backend(detail) => {
                warn!(error = %detail, "Auth backend failure");
                StatusCode::BAD_GATEWAY
            }
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn sign_in_handler(
    Extension(state): Extension<AppState>,
    jar: CookieJar,
    Json(body): Json<SignInRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), ApiError> {
    let resolver = state.deps.session_resolver();
    let session = resolver
        .sign_in_with_password(&body.identifier, &body.password)
        .await?;
    Ok(signed_in(jar, &resolver, session))
}

pub async fn sign_up_handler(
    Extension(state): Extension<AppState>,
    jar: CookieJar,
    Json(body): Json<SignUpRequest>,
) -> Result<Response, ApiError> {
    let resolver = state.deps.session_resolver();
    match resolver.sign_up(&body).await? {
        Some(session) => Ok(signed_in(jar, &resolver, session).into_response()),
        None => Ok((
            StatusCode::ACCEPTED,
            Json(json!({ "confirmation_required": true })),
        )
            .into_response()),
    }
}

pub async fn send_otp_handler(
    Extension(state): Extension<AppState>,
    Json(body): Json<OtpRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .deps
        .session_resolver()
        .send_otp(&body.identifier)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn verify_otp_handler(
    Extension(state): Extension<AppState>,
    jar: CookieJar,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), ApiError> {
    let resolver = state.deps.session_resolver();
    let session = resolver.verify_otp(&body.identifier, &body.code).await?;
    Ok(signed_in(jar, &resolver, session))
}

/// Always succeeds; the cookie is cleared even when there was no session
///
/// Requests are authenticated by verifying the access token locally, so a
/// copy of the token taken before sign-out stays usable until its `exp`.
/// Revoking the vendor session only stops it from being refreshed.
pub async fn sign_out_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
    jar: CookieJar,
) -> (CookieJar, StatusCode) {
    if let Some(Extension(user)) = user {
        let resolver = state.deps.session_resolver();
        resolver.restore(user.session(), user.tokens());
        resolver.sign_out().await;
    }
    (
        jar.remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/")),
        StatusCode::NO_CONTENT,
    )
}

pub async fn me_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
) -> Result<Json<SessionResponse>, ApiError> {
    let Some(Extension(user)) = user else {
        return Err(AuthError::NotAuthenticated.into());
    };

    let resolver = state.deps.session_resolver();
    resolver.restore(user.session(), user.tokens());
    let role = resolver.check_user_role(false).await;
    Ok(Json(SessionResponse {
        session: user.session(),
        role,
    }))
}

fn signed_in(
    jar: CookieJar,
    resolver: &SessionResolver,
    session: Session,
) -> (CookieJar, Json<SessionResponse>) {
    let jar = match resolver.tokens() {
        Some(tokens) => {
            // Session cookie; the token's own expiry is enforced on every request
            let cookie = Cookie::build((ACCESS_TOKEN_COOKIE, tokens.access_token))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax);
            jar.add(cookie)
        }
        None => jar,
    };

    (
        jar,
        Json(SessionResponse {
            session,
            role: resolver.role(),
        }),
    )
}
