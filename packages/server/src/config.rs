use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use crate::domains::auth::{AuthSettings, DEFAULT_ADMIN_ROLES, DEFAULT_COUNTRY_CODE, ROLE_CACHE_TTL};
use crate::domains::i18n::Language;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    /// Public origin of the app
    pub app_base_url: String,
    /// Origin serving the custom `/api/...` membership routes
    pub api_base_url: String,
    pub default_country_code: String,
    pub role_cache_ttl: Duration,
    pub admin_roles: Vec<String>,
    pub default_language: Language,
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let app_base_url = env::var("APP_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            supabase_url: env::var("SUPABASE_URL").context("SUPABASE_URL must be set")?,
            supabase_anon_key: env::var("SUPABASE_ANON_KEY")
                .context("SUPABASE_ANON_KEY must be set")?,
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .context("SUPABASE_JWT_SECRET must be set")?,
            api_base_url: env::var("API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| app_base_url.clone()),
            app_base_url,
            default_country_code: env::var("DEFAULT_COUNTRY_CODE")
                .map(|cc| cc.trim_start_matches('+').to_string())
                .unwrap_or_else(|_| DEFAULT_COUNTRY_CODE.to_string()),
            role_cache_ttl: match env::var("ROLE_CACHE_TTL_SECS") {
                Ok(secs) => Duration::from_secs(
                    secs.parse()
                        .context("ROLE_CACHE_TTL_SECS must be a whole number of seconds")?,
                ),
                Err(_) => ROLE_CACHE_TTL,
            },
            admin_roles: env::var("ADMIN_ROLES")
                .map(|roles| parse_list(&roles))
                .unwrap_or_else(|_| DEFAULT_ADMIN_ROLES.iter().map(|r| r.to_string()).collect()),
            default_language: env::var("DEFAULT_LANGUAGE")
                .ok()
                .and_then(|lang| Language::parse(&lang))
                .unwrap_or_default(),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|origins| parse_list(&origins))
                .unwrap_or_default(),
        })
    }

    /// Session-resolver knobs derived from this configuration
    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            country_code: self.default_country_code.clone(),
            role_cache_ttl: self.role_cache_ttl,
            admin_roles: self
                .admin_roles
                .iter()
                .map(|role| role.to_uppercase())
                .collect(),
        }
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
