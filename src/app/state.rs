//! Application state management.

use std::sync::Arc;

use crate::domain::WalletDataProvider;
use crate::infra::cache::SnapshotCache;
use crate::infra::rate_limit::ProviderRateLimiter;

use super::aggregator::WalletAnalysisService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<WalletAnalysisService>,
}

impl AppState {
    /// Create application state from the injected provider set and the
    /// shared cache/rate-limit handles
    #[must_use]
    pub fn new(
        providers: Vec<Arc<dyn WalletDataProvider>>,
        cache: Arc<SnapshotCache>,
        limiter: Arc<ProviderRateLimiter>,
    ) -> Self {
        let service = Arc::new(WalletAnalysisService::new(providers, cache, limiter));
        Self { service }
    }
}
