use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::domains::auth::AuthError;
use crate::domains::membership::{AffiliateStats, PaymentStats};
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub affiliate: AffiliateStats,
    pub payments: PaymentStats,
}

/// Affiliate and payment totals of the signed-in member
///
/// Upstream failures answer with the generic message; details are logged by
/// the client.
pub async fn dashboard_summary_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
) -> Response {
    let Some(Extension(user)) = user else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": AuthError::NotAuthenticated.to_string() })),
        )
            .into_response();
    };

    let client = state.deps.membership_api.with_access_token(&user.access_token);
    let user_id = user.user_id.to_string();
    let (affiliate, payments) = tokio::join!(
        client.affiliate_stats(&user_id),
        client.payment_stats(&user_id)
    );

    match (affiliate, payments) {
        (Ok(affiliate), Ok(payments)) => {
            Json(DashboardSummary { affiliate, payments }).into_response()
        }
        (Err(e), _) | (_, Err(e)) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": e.user_message() })),
        )
            .into_response(),
    }
}
