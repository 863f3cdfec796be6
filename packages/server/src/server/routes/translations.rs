use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domains::i18n::Language;
use crate::server::app::AppState;

/// Whole catalog of one language, for client bundles
pub async fn translations_handler(
    Extension(state): Extension<AppState>,
    Path(lang): Path<String>,
) -> Response {
    let messages = Language::parse(&lang).and_then(|language| state.deps.catalog.messages(language));
    match messages {
        Some(messages) => Json(messages.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("Unsupported language: {}", lang) })),
        )
            .into_response(),
    }
}
