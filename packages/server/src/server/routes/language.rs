use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::{header::ACCEPT_LANGUAGE, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use std::collections::HashMap;
use std::convert::Infallible;

use crate::domains::i18n::Language;
use crate::server::app::AppState;

/// Cookie remembering the visitor's language choice
pub const LANGUAGE_COOKIE: &str = "lang";

/// Language a request should be answered in
///
/// `?lang=` wins, then the `lang` cookie, then `Accept-Language`, then the
/// configured default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLanguage(pub Language);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RequestLanguage {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let default = parts
            .extensions
            .get::<AppState>()
            .map(|state| state.deps.default_language)
            .unwrap_or_default();
        Ok(RequestLanguage(resolve_language(parts, default)))
    }
}

pub fn resolve_language(parts: &Parts, default: Language) -> Language {
    let from_query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(params)| params.get("lang").and_then(|l| Language::parse(l)));

    from_query
        .or_else(|| {
            CookieJar::from_headers(&parts.headers)
                .get(LANGUAGE_COOKIE)
                .and_then(|cookie| Language::parse(cookie.value()))
        })
        .or_else(|| {
            parts
                .headers
                .get(ACCEPT_LANGUAGE)
                .and_then(|value| value.to_str().ok())
                .and_then(Language::from_accept_language)
        })
        .unwrap_or(default)
}
