//! Phone -> email resolution for password logins.
//!
//! Older accounts were created with an email credential while the member
//! only remembers their phone number. Each strategy tries to find the email
//! tied to a phone; the chain runs them in order and stops at the first hit.
//! Strategy failures are logged and treated as "not found".

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::kernel::BaseAuthBackend;

#[async_trait]
pub trait EmailLookupStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `variants` are the stored forms of one phone number, most canonical first
    async fn lookup(&self, backend: &dyn BaseAuthBackend, variants: &[String]) -> Option<String>;
}

/// Privileged server-side function (bypasses row-level security)
pub struct PrivilegedFunctionLookup;

#[async_trait]
impl EmailLookupStrategy for PrivilegedFunctionLookup {
    fn name(&self) -> &'static str {
        "privileged_function"
    }

    async fn lookup(&self, backend: &dyn BaseAuthBackend, variants: &[String]) -> Option<String> {
        for phone in variants {
            match backend.email_for_phone(phone).await {
                Ok(Some(email)) => return Some(email),
                Ok(None) => continue,
                Err(e) => {
                    // Missing function or no grant: the table scan may still work
                    warn!(error = %e, "Privileged email lookup failed");
                    return None;
                }
            }
        }
        None
    }
}

/// Where a phone number might sit next to an email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneColumn {
    pub table: &'static str,
    pub phone_column: &'static str,
    pub email_column: &'static str,
}

/// Profile tables and column spellings seen across the platform's schema history
pub const DEFAULT_PHONE_COLUMNS: &[PhoneColumn] = &[
    PhoneColumn { table: "profiles", phone_column: "phone", email_column: "email" },
    PhoneColumn { table: "profiles", phone_column: "phone_number", email_column: "email" },
    PhoneColumn { table: "users", phone_column: "phone", email_column: "email" },
    PhoneColumn { table: "users", phone_column: "phone_number", email_column: "email" },
    PhoneColumn { table: "clients", phone_column: "phone", email_column: "email" },
    PhoneColumn { table: "members", phone_column: "phone", email_column: "email" },
];

/// Best-effort scan over candidate table/column combinations
pub struct TableScanLookup {
    candidates: Vec<PhoneColumn>,
}

impl TableScanLookup {
    pub fn new(candidates: Vec<PhoneColumn>) -> Self {
        Self { candidates }
    }
}

impl Default for TableScanLookup {
    fn default() -> Self {
        Self::new(DEFAULT_PHONE_COLUMNS.to_vec())
    }
}

#[async_trait]
impl EmailLookupStrategy for TableScanLookup {
    fn name(&self) -> &'static str {
        "table_scan"
    }

    async fn lookup(&self, backend: &dyn BaseAuthBackend, variants: &[String]) -> Option<String> {
        for candidate in &self.candidates {
            for phone in variants {
                match backend
                    .find_email_by_phone(
                        candidate.table,
                        candidate.phone_column,
                        candidate.email_column,
                        phone,
                    )
                    .await
                {
                    Ok(Some(email)) => return Some(email),
                    Ok(None) => {}
                    Err(e) => {
                        // Unknown table or column; try the next spelling
                        debug!(
                            table = candidate.table,
                            column = candidate.phone_column,
                            error = %e,
                            "Email scan candidate unavailable"
                        );
                        break;
                    }
                }
            }
        }
        None
    }
}

/// Ordered list of strategies, first hit wins
pub struct EmailLookupChain {
    strategies: Vec<Box<dyn EmailLookupStrategy>>,
}

impl EmailLookupChain {
    pub fn new(strategies: Vec<Box<dyn EmailLookupStrategy>>) -> Self {
        Self { strategies }
    }

    pub async fn resolve(
        &self,
        backend: &dyn BaseAuthBackend,
        variants: &[String],
    ) -> Option<String> {
        for strategy in &self.strategies {
            if let Some(email) = strategy.lookup(backend, variants).await {
                debug!(strategy = strategy.name(), "Resolved email for phone login");
                return Some(email.trim().to_lowercase());
            }
        }
        None
    }
}

impl Default for EmailLookupChain {
    fn default() -> Self {
        Self::new(vec![
            Box::new(PrivilegedFunctionLookup),
            Box::new(TableScanLookup::default()),
        ])
    }
}
