use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, error, info};

use super::jwt_auth::AuthUser;
use crate::server::app::AppState;
use crate::server::routes::table::Access;

/// Guard in front of a gated page
///
/// - no session: redirect to `/login?redirect=<requested path>`
/// - signed in with a role outside the allow-list: redirect to `/`
pub async fn role_gate(access: Access, request: Request, next: Next) -> Response {
    let allowed = match access {
        Access::Public => return next.run(request).await,
        Access::Authenticated => None,
        Access::Roles(roles) => Some(roles),
    };

    let Some(user) = request.extensions().get::<AuthUser>().cloned() else {
        let target = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| request.uri().path().to_string());
        debug!(path = %target, "Gated page without session");
        return Redirect::to(&login_redirect(&target)).into_response();
    };

    let Some(allowed) = allowed else {
        return next.run(request).await;
    };

    let Some(state) = request.extensions().get::<AppState>().cloned() else {
        error!("AppState missing from request extensions");
        return Redirect::to("/").into_response();
    };

    let resolver = state.deps.session_resolver();
    resolver.restore(user.session(), user.tokens());
    let role = resolver.check_user_role(false).await;

    if role.is_any_of(allowed) {
        next.run(request).await
    } else {
        info!(
            user_id = %user.user_id,
            role = %role.role,
            path = %request.uri().path(),
            "Role not allowed, redirecting home"
        );
        Redirect::to("/").into_response()
    }
}

pub fn login_redirect(path: &str) -> String {
    format!("/login?redirect={}", urlencoding::encode(path))
}
