// Main entry point for the Elverra server

use anyhow::{Context, Result};
use elverra_core::domains::auth::AccessTokenVerifier;
use elverra_core::domains::i18n::Catalog;
use elverra_core::domains::membership::MembershipApiClient;
use elverra_core::kernel::{ServerDeps, SupabaseAdapter};
use elverra_core::{server::build_app, Config};
use std::sync::Arc;
use supabase::{SupabaseClient, SupabaseOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,elverra_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Elverra Global server");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        supabase_url = %config.supabase_url,
        country_code = %config.default_country_code,
        role_cache_ttl_secs = config.role_cache_ttl.as_secs(),
        default_language = %config.default_language,
        "Configuration loaded"
    );

    let supabase = Arc::new(SupabaseClient::new(SupabaseOptions {
        url: config.supabase_url.clone(),
        anon_key: config.supabase_anon_key.clone(),
    }));
    let catalog = Arc::new(Catalog::embedded().context("Failed to load translation catalogs")?);

    let deps = ServerDeps::new(
        Arc::new(SupabaseAdapter::new(supabase)),
        config.auth_settings(),
        Arc::new(AccessTokenVerifier::new(&config.supabase_jwt_secret)),
        catalog,
        config.default_language,
        MembershipApiClient::new(&config.api_base_url),
    );

    // Build application
    let app = build_app(deps, &config.allowed_origins);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);
    tracing::info!("Public URL: {}", config.app_base_url);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
