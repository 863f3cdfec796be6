//! Response bodies of the membership routes
//!
//! Every field defaults so a partial body still decodes; the routes are
//! written in JavaScript and omit fields freely.

use serde::{Deserialize, Serialize};

/// Either `{ "data": ... }` or the bare payload
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(data) => data,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AffiliateStats {
    pub referral_code: Option<String>,
    pub total_referrals: u32,
    pub active_referrals: u32,
    pub total_earnings: f64,
    pub pending_earnings: f64,
    pub paid_earnings: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Referral {
    pub id: String,
    pub referred_name: Option<String>,
    pub status: String,
    pub commission: f64,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: String,
    pub full_name: Option<String>,
    pub total_referrals: u32,
    pub total_earnings: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentRecord {
    pub id: String,
    pub amount: f64,
    pub currency: Option<String>,
    pub status: String,
    pub payment_method: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentStats {
    pub total_paid: f64,
    pub total_pending: f64,
    pub payment_count: u32,
    pub last_payment_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoanRecord {
    pub id: String,
    pub amount: f64,
    pub status: String,
    pub interest_rate: Option<f64>,
    pub term_months: Option<u32>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CmsPage {
    pub id: String,
    pub slug: Option<String>,
    pub title: String,
    pub content: String,
    pub meta_description: Option<String>,
    pub status: Option<String>,
    pub view_count: u64,
    pub updated_at: Option<String>,
}
