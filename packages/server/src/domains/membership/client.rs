use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::errors::{MembershipApiError, Result};
use super::models::{
    AffiliateStats, CmsPage, Envelope, LeaderboardEntry, LoanRecord, PaymentRecord, PaymentStats,
    Referral,
};

/// Client for the custom `/api/...` routes
#[derive(Clone)]
pub struct MembershipApiClient {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl MembershipApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: None,
        }
    }

    /// Same client, calling on behalf of a signed-in user
    pub fn with_access_token(&self, access_token: &str) -> Self {
        Self {
            access_token: Some(access_token.to_string()),
            ..self.clone()
        }
    }

    pub async fn affiliate_stats(&self, user_id: &str) -> Result<AffiliateStats> {
        self.get(&format!("/api/affiliates/{}/stats", encode(user_id)))
            .await
    }

    pub async fn affiliate_referrals(&self, user_id: &str) -> Result<Vec<Referral>> {
        self.get(&format!("/api/affiliates/{}/referrals", encode(user_id)))
            .await
    }

    pub async fn affiliate_leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        self.get("/api/affiliates/leaderboard").await
    }

    pub async fn payment_history(&self, user_id: &str) -> Result<Vec<PaymentRecord>> {
        self.get(&format!("/api/payments/{}/history", encode(user_id)))
            .await
    }

    pub async fn payment_stats(&self, user_id: &str) -> Result<PaymentStats> {
        self.get(&format!("/api/payments/{}/stats", encode(user_id)))
            .await
    }

    pub async fn loan_history(&self, user_id: &str) -> Result<Vec<LoanRecord>> {
        self.get(&format!("/api/loans/{}/history", encode(user_id)))
            .await
    }

    pub async fn cms_page(&self, page_id: &str) -> Result<CmsPage> {
        self.get(&format!("/api/cms-pages/{}", encode(page_id)))
            .await
    }

    /// Count a page view; the response body is ignored
    pub async fn record_cms_page_view(&self, page_id: &str) -> Result<()> {
        let url = format!("{}/api/cms-pages/{}/views", self.base_url, encode(page_id));
        let mut request = self.client.post(&url).json(&Value::Object(Default::default()));
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(log_network)?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "Membership API request");

        let mut request = self.client.get(&url);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(log_network)?;
        let body = ensure_success(response).await?.text().await?;

        serde_json::from_str::<Envelope<T>>(&body)
            .map(Envelope::into_inner)
            .map_err(|e| {
                warn!(path, error = %e, "Membership API returned an unexpected body");
                MembershipApiError::Decode(e.to_string())
            })
    }
}

fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

fn log_network(e: reqwest::Error) -> MembershipApiError {
    warn!(error = %e, "Membership API unreachable");
    MembershipApiError::Network(e)
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    warn!(%url, status = status.as_u16(), body = %body, "Membership API error response");
    Err(MembershipApiError::Status {
        status: status.as_u16(),
        body,
    })
}
