//! Router-wide panic boundary
//!
//! A panicking handler renders the 500 page instead of dropping the
//! connection. Its retry button re-fetches the current URL and swaps the
//! document in place, so a recovered route renders without a full reload.

use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::error;

use crate::domains::i18n::Translator;
use crate::server::routes::pages::escape_html;
use crate::server::routes::table::Page;

const RETRY_SCRIPT: &str = r#"document.getElementById("retry").addEventListener("click", function () {
  fetch(window.location.href, { credentials: "same-origin" })
    .then(function (response) { return response.text(); })
    .then(function (html) { document.open(); document.write(html); document.close(); })
    .catch(function () { window.location.reload(); });
});"#;

/// Catch-panic layer rendering the error page in the default language
pub fn error_boundary_layer(
    translator: Translator,
) -> CatchPanicLayer<impl Fn(Box<dyn Any + Send + 'static>) -> Response + Clone + Send + Sync + 'static>
{
    CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
        error!(panic = %panic_message(panic.as_ref()), "Handler panicked");
        render_error_page(&translator)
    })
}

pub fn render_error_page(translator: &Translator) -> Response {
    let html = format!(
        r#"<!doctype html>
<html lang="{lang}">
<head>
<meta charset="utf-8">
<title>{title} | {app}</title>
</head>
<body>
<main data-page="{page}">
<h1>500</h1>
<h2>{title}</h2>
<p>{message}</p>
<button id="retry" type="button">{retry}</button>
</main>
<script>
{script}
</script>
</body>
</html>
"#,
        lang = translator.language(),
        title = escape_html(&translator.t("server_error.title")),
        app = escape_html(&translator.t("app_name")),
        page = Page::ServerError.key(),
        message = escape_html(&translator.t("server_error.message")),
        retry = escape_html(&translator.t("server_error.retry")),
        script = RETRY_SCRIPT,
    );

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CACHE_CONTROL, "no-store")],
        Html(html),
    )
        .into_response()
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
        let boxed: Box<dyn Any + Send> = Box::new(42);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic payload");
    }
}
