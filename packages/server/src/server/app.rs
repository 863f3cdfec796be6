//! Application setup and server configuration.

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::kernel::ServerDeps;
use crate::server::error_boundary::error_boundary_layer;
use crate::server::middleware::{jwt_auth_middleware, role_gate};
use crate::server::routes::table::{Access, ROUTES};
use crate::server::routes::{
    dashboard_summary_handler, health_handler, me_handler, not_found_handler, page_handler,
    send_otp_handler, sign_in_handler, sign_out_handler, sign_up_handler, translations_handler,
    verify_otp_handler, RequestLanguage,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
}

/// JSON API and page routes, without the shared layers
pub fn build_routes() -> Router {
    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route("/api/auth/sign-in", post(sign_in_handler))
        .route("/api/auth/sign-up", post(sign_up_handler))
        .route("/api/auth/otp", post(send_otp_handler))
        .route("/api/auth/otp/verify", post(verify_otp_handler))
        .route("/api/auth/sign-out", post(sign_out_handler))
        .route("/api/auth/me", get(me_handler))
        .route("/api/me/summary", get(dashboard_summary_handler))
        .route("/api/translations/:lang", get(translations_handler));

    for def in ROUTES {
        let page = def.page;
        let handler = get(
            move |state: Extension<AppState>, language: RequestLanguage| {
                page_handler(page, state, language)
            },
        );

        router = match def.access {
            Access::Public => router.route(def.path, handler),
            access => router.route(
                def.path,
                handler.layer(middleware::from_fn(move |req, next| {
                    role_gate(access, req, next)
                })),
            ),
        };
    }

    router
}

/// Wrap routes with the not-found fallback, auth, CORS, tracing and the
/// panic boundary
///
/// Layers run outside-in: the panic boundary first, then tracing, CORS,
/// shared state and token verification.
pub fn into_app(routes: Router, deps: ServerDeps, allowed_origins: &[String]) -> Router {
    let boundary_translator = deps.translator(deps.default_language);
    let verifier = deps.token_verifier.clone();
    let state = AppState {
        deps: Arc::new(deps),
    };

    routes
        .fallback(not_found_handler)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(verifier.clone(), req, next)
        }))
        .layer(Extension(state))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .layer(error_boundary_layer(boundary_translator))
}

/// Build the Axum application router
pub fn build_app(deps: ServerDeps, allowed_origins: &[String]) -> Router {
    into_app(build_routes(), deps, allowed_origins)
}

/// Empty list means any origin (development)
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    if allowed_origins.is_empty() {
        return cors.allow_origin(tower_http::cors::Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}
