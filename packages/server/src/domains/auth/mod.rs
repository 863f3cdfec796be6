//! Auth domain - sessions, roles and login identifiers
//!
//! Architecture:
//!   HTTP handler → SessionResolver → actions → BaseAuthBackend (Supabase)
//!
//! Responsibilities:
//! - Phone normalization and email/phone login resolution
//! - Short-lived per-user role cache
//! - Observable session state
//! - Local verification of vendor access tokens

pub mod actions;
pub mod email_lookup;
pub mod errors;
pub mod jwt;
pub mod models;
pub mod resolver;
pub mod role_cache;

use std::time::Duration;

pub use email_lookup::{EmailLookupChain, EmailLookupStrategy};
pub use errors::{AuthError, PhoneError};
pub use jwt::{AccessClaims, AccessTokenVerifier};
pub use models::*;
pub use resolver::SessionResolver;
pub use role_cache::RoleCache;

/// Mali
pub const DEFAULT_COUNTRY_CODE: &str = "223";

pub const ROLE_CACHE_TTL: Duration = Duration::from_secs(30);

/// Roles that unlock the back-office
pub const DEFAULT_ADMIN_ROLES: &[&str] = &["SUPERADMIN", "SUPPORT"];

/// Tunables of the auth domain
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Country calling code assumed for local phone numbers (no `+`)
    pub country_code: String,
    pub role_cache_ttl: Duration,
    /// Uppercase role names that count as admin
    pub admin_roles: Vec<String>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            role_cache_ttl: ROLE_CACHE_TTL,
            admin_roles: DEFAULT_ADMIN_ROLES.iter().map(|r| r.to_string()).collect(),
        }
    }
}
