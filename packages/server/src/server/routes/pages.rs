//! HTML shells for the route table
//!
//! Each page is an empty mount point carrying the translated title and the
//! page id; the client bundle hydrates it.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use super::language::RequestLanguage;
use super::table::Page;
use crate::domains::i18n::Translator;
use crate::server::app::AppState;

const CLIENT_BUNDLE: &str = "/assets/app.js";

pub fn render_shell(page: Page, translator: &Translator) -> String {
    format!(
        r#"<!doctype html>
<html lang="{lang}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | {app}</title>
</head>
<body>
<div id="root" data-page="{page}"></div>
<script type="module" src="{bundle}"></script>
</body>
</html>
"#,
        lang = translator.language(),
        title = escape_html(&translator.t(&page.title_key())),
        app = escape_html(&translator.t("app_name")),
        page = page.key(),
        bundle = CLIENT_BUNDLE,
    )
}

pub fn render_not_found(translator: &Translator) -> String {
    format!(
        r#"<!doctype html>
<html lang="{lang}">
<head>
<meta charset="utf-8">
<title>{title} | {app}</title>
</head>
<body>
<main data-page="{page}">
<h1>404</h1>
<h2>{title}</h2>
<p>{message}</p>
<a href="/">{back}</a>
</main>
</body>
</html>
"#,
        lang = translator.language(),
        title = escape_html(&translator.t("not_found.title")),
        app = escape_html(&translator.t("app_name")),
        page = Page::NotFound.key(),
        message = escape_html(&translator.t("not_found.message")),
        back = escape_html(&translator.t("not_found.back_home")),
    )
}

pub async fn page_handler(
    page: Page,
    Extension(state): Extension<AppState>,
    RequestLanguage(language): RequestLanguage,
) -> Html<String> {
    Html(render_shell(page, &state.deps.translator(language)))
}

pub async fn not_found_handler(
    Extension(state): Extension<AppState>,
    RequestLanguage(language): RequestLanguage,
) -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(render_not_found(&state.deps.translator(language))),
    )
        .into_response()
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::i18n::{Catalog, Language};
    use std::sync::Arc;

    fn translator(language: Language) -> Translator {
        Translator::new(Arc::new(Catalog::embedded().unwrap()), language)
    }

    #[test]
    fn test_shell_carries_title_and_page() {
        let html = render_shell(Page::Dashboard, &translator(Language::Fr));
        assert!(html.contains(r#"<html lang="fr">"#));
        assert!(html.contains("<title>Mon tableau de bord | Elverra Global</title>"));
        assert!(html.contains(r#"data-page="dashboard""#));
    }

    #[test]
    fn test_titles_are_escaped() {
        let html = render_shell(Page::JobDetail, &translator(Language::Fr));
        assert!(html.contains("Offre d&#39;emploi"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }
}
