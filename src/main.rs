//! Application entry point.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use secrecy::SecretString;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use wallet_intel_aggregator::api::{RateLimitConfig, create_router, create_router_with_rate_limit};
use wallet_intel_aggregator::app::AppState;
use wallet_intel_aggregator::domain::WalletDataProvider;
use wallet_intel_aggregator::infra::cache::{
    DEFAULT_SWEEP_INTERVAL, DEFAULT_TTL, SnapshotCache, spawn_sweeper,
};
use wallet_intel_aggregator::infra::providers::{
    BlockCypherProvider, BlockchainInfoProvider, BlockchairProvider, BlockstreamProvider,
    FetchGate,
};
use wallet_intel_aggregator::infra::rate_limit::{ProviderRateLimiter, RateLimitBudgets};

/// Application configuration
struct Config {
    host: String,
    port: u16,
    cache_ttl: Duration,
    cache_sweep_interval: Duration,
    enable_rate_limiting: bool,
    rate_limit_config: RateLimitConfig,
    /// Base URL overrides, mainly for local testing against mock servers
    blockchain_info_url: Option<String>,
    blockstream_url: Option<String>,
    blockcypher_url: Option<String>,
    blockchair_url: Option<String>,
    /// BlockCypher API token (optional - public tier works without one)
    blockcypher_token: Option<SecretString>,
}

impl Config {
    fn from_env() -> Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let cache_ttl = env::var("CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TTL);

        let cache_sweep_interval = env::var("CACHE_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SWEEP_INTERVAL);

        let enable_rate_limiting = env::var("ENABLE_RATE_LIMITING")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let blockchain_info_url = env::var("BLOCKCHAIN_INFO_URL").ok().filter(|u| !u.is_empty());
        let blockstream_url = env::var("BLOCKSTREAM_URL").ok().filter(|u| !u.is_empty());
        let blockcypher_url = env::var("BLOCKCYPHER_URL").ok().filter(|u| !u.is_empty());
        let blockchair_url = env::var("BLOCKCHAIR_URL").ok().filter(|u| !u.is_empty());

        let blockcypher_token = env::var("BLOCKCYPHER_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .map(SecretString::from);

        Ok(Self {
            host,
            port,
            cache_ttl,
            cache_sweep_interval,
            enable_rate_limiting,
            rate_limit_config: RateLimitConfig::from_env(),
            blockchain_info_url,
            blockstream_url,
            blockcypher_url,
            blockchair_url,
            blockcypher_token,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    let cache = Arc::new(SnapshotCache::with_ttl(config.cache_ttl));
    let limiter = Arc::new(ProviderRateLimiter::new(RateLimitBudgets::default()));
    let gate = FetchGate::new(Arc::clone(&cache), Arc::clone(&limiter));

    let providers: Vec<Arc<dyn WalletDataProvider>> = vec![
        Arc::new(BlockchainInfoProvider::new(
            gate.clone(),
            config.blockchain_info_url.clone(),
        )),
        Arc::new(BlockstreamProvider::new(
            gate.clone(),
            config.blockstream_url.clone(),
        )),
        Arc::new(BlockCypherProvider::new(
            gate.clone(),
            config.blockcypher_token.clone(),
            config.blockcypher_url.clone(),
        )),
        Arc::new(BlockchairProvider::new(
            gate.clone(),
            config.blockchair_url.clone(),
        )),
    ];

    info!(
        providers = providers.len(),
        cache_ttl_secs = config.cache_ttl.as_secs(),
        "wallet intel aggregator starting"
    );

    // Redundant with lazy expiry on read; bounds memory during idle periods
    let sweeper = spawn_sweeper((*cache).clone(), config.cache_sweep_interval);

    let state = Arc::new(AppState::new(providers, cache, limiter));

    let router = if config.enable_rate_limiting {
        info!(
            requests_per_minute = config.rate_limit_config.requests_per_minute,
            "inbound rate limiting enabled"
        );
        create_router_with_rate_limit(state, config.rate_limit_config.clone())
    } else {
        create_router(state)
    };

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(addr = %addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    sweeper.abort();
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
