//! Membership domain - client for the platform's custom REST routes
//!
//! Affiliate, payment, loan and CMS data that does not live behind the
//! vendor's table API. Bodies are narrowed into the types in `models`.

pub mod client;
pub mod errors;
pub mod models;

pub use client::MembershipApiClient;
pub use errors::{MembershipApiError, GENERIC_FAILURE_MESSAGE};
pub use models::*;
