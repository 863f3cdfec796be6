//! Thin Supabase REST client
//!
//! Covers the GoTrue auth endpoints (password sign-in, sign-up, OTP, logout,
//! user lookup, refresh) and the PostgREST calls the platform needs (RPC and
//! filtered single-table selects). Every request carries the project's anon
//! key; user-scoped calls add the caller's access token.

pub mod error;
pub mod models;

pub use error::{Result, SupabaseError};
pub use models::{AuthSession, Credentials, OtpChannel, SignUpOutcome, User};

use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::ErrorBody;

#[derive(Debug, Clone)]
pub struct SupabaseOptions {
    pub url: String,
    pub anon_key: String,
}

#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http_client: Client,
    options: SupabaseOptions,
}

impl SupabaseClient {
    pub fn new(options: SupabaseOptions) -> Self {
        Self {
            http_client: Client::new(),
            options,
        }
    }

    /// Project base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.options.url.trim_end_matches('/')
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url(), path)
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url(), path)
    }

    /// Request authorized with the anon key (public/privileged-function calls)
    fn request(&self, method: Method, url: String) -> RequestBuilder {
        self.request_as(method, url, &self.options.anon_key)
    }

    /// Request authorized as a signed-in user
    fn request_as(&self, method: Method, url: String, bearer: &str) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .header("apikey", &self.options.anon_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", bearer))
    }

    /// Password sign-in with an email or phone credential
    pub async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<AuthSession> {
        let response = self
            .request(Method::POST, self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .json(&credentials.to_json())
            .send()
            .await
            .map_err(network_error)?;

        auth_json(response).await
    }

    /// Register a new account; `data` lands in `user_metadata`
    pub async fn sign_up(&self, credentials: &Credentials, data: Value) -> Result<SignUpOutcome> {
        let mut body = credentials.to_json();
        body["data"] = data;

        let response = self
            .request(Method::POST, self.auth_url("signup"))
            .json(&body)
            .send()
            .await
            .map_err(network_error)?;

        let value: Value = auth_json(response).await?;

        // With auto-confirm GoTrue answers with a session, otherwise with the bare user
        if value.get("access_token").is_some() {
            serde_json::from_value(value)
                .map(SignUpOutcome::Session)
                .map_err(|e| SupabaseError::Parse(e.to_string()))
        } else {
            let user = value.get("user").cloned().unwrap_or(value);
            serde_json::from_value(user)
                .map(SignUpOutcome::PendingConfirmation)
                .map_err(|e| SupabaseError::Parse(e.to_string()))
        }
    }

    /// Send a one-time password to an existing account
    pub async fn send_otp(&self, recipient: &str, channel: OtpChannel) -> Result<()> {
        let mut body = serde_json::json!({ "create_user": false });
        body[channel.recipient_field()] = Value::String(recipient.to_string());
        if channel == OtpChannel::Sms {
            body["channel"] = Value::String("sms".to_string());
        }

        let response = self
            .request(Method::POST, self.auth_url("otp"))
            .json(&body)
            .send()
            .await
            .map_err(network_error)?;

        ensure_success(response, true).await?;
        debug!(channel = ?channel, "OTP requested");
        Ok(())
    }

    /// Exchange a one-time password for a session
    pub async fn verify_otp(
        &self,
        recipient: &str,
        token: &str,
        channel: OtpChannel,
    ) -> Result<AuthSession> {
        let mut body = serde_json::json!({
            "type": channel.verify_type(),
            "token": token,
        });
        body[channel.recipient_field()] = Value::String(recipient.to_string());

        let response = self
            .request(Method::POST, self.auth_url("verify"))
            .json(&body)
            .send()
            .await
            .map_err(network_error)?;

        auth_json(response).await
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession> {
        let response = self
            .request(Method::POST, self.auth_url("token"))
            .query(&[("grant_type", "refresh_token")])
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(network_error)?;

        auth_json(response).await
    }

    /// Fetch the user behind an access token
    pub async fn get_user(&self, access_token: &str) -> Result<User> {
        let response = self
            .request_as(Method::GET, self.auth_url("user"), access_token)
            .send()
            .await
            .map_err(network_error)?;

        auth_json(response).await
    }

    /// Revoke the session behind an access token
    pub async fn sign_out(&self, access_token: &str) -> Result<()> {
        let response = self
            .request_as(Method::POST, self.auth_url("logout"), access_token)
            .send()
            .await
            .map_err(network_error)?;

        ensure_success(response, true).await.map(|_| ())
    }

    /// Call a Postgres function exposed through PostgREST
    pub async fn rpc<T: DeserializeOwned>(&self, function: &str, args: &Value) -> Result<T> {
        let response = self
            .request(Method::POST, self.rest_url(&format!("rpc/{}", function)))
            .json(args)
            .send()
            .await
            .map_err(network_error)?;

        let response = ensure_success(response, false).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| SupabaseError::Parse(format!("rpc {}: {}", function, e)))
    }

    /// `SELECT <select> FROM <table> WHERE <col> = <value> ... LIMIT <limit>`
    pub async fn select_eq(
        &self,
        table: &str,
        select: &str,
        filters: &[(&str, &str)],
        limit: usize,
    ) -> Result<Vec<Value>> {
        let mut query: Vec<(String, String)> = vec![
            ("select".to_string(), select.to_string()),
            ("limit".to_string(), limit.to_string()),
        ];
        for (column, value) in filters {
            query.push((column.to_string(), format!("eq.{}", value)));
        }

        let response = self
            .request(Method::GET, self.rest_url(table))
            .query(&query)
            .send()
            .await
            .map_err(network_error)?;

        let response = ensure_success(response, false).await?;
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| SupabaseError::Parse(format!("select {}: {}", table, e)))
    }
}

fn network_error(e: reqwest::Error) -> SupabaseError {
    warn!(error = %e, "Supabase request failed");
    SupabaseError::Network(e.to_string())
}

/// Pass 2xx responses through; turn everything else into a typed error
async fn ensure_success(response: Response, auth: bool) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| format!("Supabase returned {}", status));

    warn!(status = %status, error = %message, "Supabase error response");

    if auth {
        Err(SupabaseError::Auth {
            status: status.as_u16(),
            message,
        })
    } else {
        Err(SupabaseError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

async fn auth_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = ensure_success(response, true).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| SupabaseError::Parse(e.to_string()))
}
