use anyhow::{anyhow, Context, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::language::Language;

const EN: &str = include_str!("../../../locales/en.json");
const FR: &str = include_str!("../../../locales/fr.json");

/// Translation messages of every supported language
#[derive(Debug, Clone)]
pub struct Catalog {
    messages: HashMap<Language, Map<String, Value>>,
}

impl Catalog {
    /// Catalogs compiled into the binary
    pub fn embedded() -> Result<Self> {
        Self::from_sources(&[(Language::En, EN), (Language::Fr, FR)])
    }

    /// Build from raw JSON documents; each must be an object
    pub fn from_sources(sources: &[(Language, &str)]) -> Result<Self> {
        let mut messages = HashMap::new();
        for (language, source) in sources {
            let value: Value = serde_json::from_str(source)
                .with_context(|| format!("Invalid {} translation catalog", language))?;
            let Value::Object(map) = value else {
                return Err(anyhow!("{} translation catalog must be a JSON object", language));
            };
            messages.insert(*language, map);
        }
        Ok(Self { messages })
    }

    /// Whole catalog of a language (served to client bundles)
    pub fn messages(&self, language: Language) -> Option<&Map<String, Value>> {
        self.messages.get(&language)
    }

    /// Direct key first, then the key as a dotted path into nested objects
    pub fn lookup(&self, language: Language, key: &str) -> Option<&Value> {
        let messages = self.messages.get(&language)?;
        if let Some(value) = messages.get(key) {
            return Some(value);
        }

        let mut parts = key.split('.');
        let first = messages.get(parts.next()?)?;
        parts.try_fold(first, |node, part| node.get(part))
    }
}
