use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use tracing::warn;

use super::catalog::Catalog;
use super::language::Language;

lazy_static! {
    static ref PLACEHOLDER: Regex =
        Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("placeholder regex is valid");
}

/// Per-language view over the shared catalog
#[derive(Debug, Clone)]
pub struct Translator {
    catalog: Arc<Catalog>,
    language: Language,
}

impl Translator {
    pub fn new(catalog: Arc<Catalog>, language: Language) -> Self {
        Self { catalog, language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Translated string, or the key itself when there is none
    pub fn t(&self, key: &str) -> String {
        match self.catalog.lookup(self.language, key) {
            Some(serde_json::Value::String(text)) => text.clone(),
            Some(_) => {
                warn!(key, language = %self.language, "Translation key is not a string");
                key.to_string()
            }
            None => {
                warn!(key, language = %self.language, "Missing translation");
                key.to_string()
            }
        }
    }

    /// `t` with `{{name}}` placeholders filled in
    pub fn t_with<I, K, V>(&self, key: &str, values: I) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Display,
    {
        let values: HashMap<String, String> = values
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.to_string()))
            .collect();
        interpolate(&self.t(key), &values)
    }
}

/// Replace `{{name}}` tokens; unknown tokens are left as they are
pub fn interpolate(template: &str, values: &HashMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match values.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
