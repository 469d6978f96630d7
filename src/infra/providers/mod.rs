//! Provider adapters for external block-explorer APIs.
//!
//! Each adapter normalizes one provider's response shape into a
//! [`WalletSnapshot`](crate::domain::WalletSnapshot); provider-specific
//! field names never leak past this module. All adapters run the same
//! pre-flight pipeline through [`FetchGate`]: cache lookup, rate-limit
//! check, remote fetch, cache write.

pub mod blockchain_info;
pub mod blockchair;
pub mod blockcypher;
pub mod blockstream;

pub use blockchain_info::BlockchainInfoProvider;
pub use blockchair::BlockchairProvider;
pub use blockcypher::BlockCypherProvider;
pub use blockstream::BlockstreamProvider;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::{ProviderError, ProviderReport, WalletSnapshot};
use crate::infra::cache::SnapshotCache;
use crate::infra::rate_limit::ProviderRateLimiter;

/// Per-adapter HTTP timeout. A hung provider fails its own report instead
/// of stalling the whole analysis.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared pre-flight pipeline every adapter runs before touching the network.
///
/// 1. Cache hit: return immediately, no rate-limit check, no network call.
/// 2. Budget exhausted: fail the report without any network call.
/// 3. Otherwise fetch, convert any fault into a failed report, and cache
///    successful snapshots.
#[derive(Clone)]
pub struct FetchGate {
    cache: Arc<SnapshotCache>,
    limiter: Arc<ProviderRateLimiter>,
}

impl FetchGate {
    pub fn new(cache: Arc<SnapshotCache>, limiter: Arc<ProviderRateLimiter>) -> Self {
        Self { cache, limiter }
    }

    pub async fn run<F, Fut>(
        &self,
        provider: &'static str,
        address: &str,
        fetch_remote: F,
    ) -> ProviderReport
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<WalletSnapshot, ProviderError>>,
    {
        if let Some(snapshot) = self.cache.get(provider, address) {
            debug!(provider, address, "serving cached snapshot");
            return ProviderReport::success(provider, snapshot);
        }

        if !self.limiter.can_make_request(provider) {
            warn!(provider, "hourly request budget exhausted");
            return ProviderReport::failure(provider, ProviderError::RateLimited.to_string());
        }
        self.limiter.record_request(provider);

        match fetch_remote().await {
            Ok(snapshot) => {
                self.cache.insert(provider, address, snapshot.clone());
                ProviderReport::success(provider, snapshot)
            }
            Err(e) => {
                warn!(provider, address, error = %e, "provider fetch failed");
                ProviderReport::failure(provider, e.to_string())
            }
        }
    }
}

/// HTTP client shared by the adapters; the timeout is the per-adapter
/// deadline discussed in the concurrency model.
pub(crate) fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .expect("Failed to create HTTP client")
}

/// Convert satoshi integer amounts to decimal BTC
pub(crate) fn sats_to_btc(sats: u64) -> f64 {
    sats as f64 / 100_000_000.0
}

/// Fetch a JSON payload, mapping transport, status, and parse faults to
/// [`ProviderError`]
pub(crate) async fn get_json<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<T, ProviderError> {
    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| ProviderError::Network(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Api {
            status_code: status.as_u16(),
            message: body,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::Parse(e.to_string()))
}
