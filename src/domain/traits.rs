//! Domain traits defining contracts for external data providers.

use async_trait::async_trait;

use super::types::ProviderReport;

/// Wallet data provider capability.
///
/// One implementation per external block explorer. `fetch` is infallible
/// by contract: every network, HTTP-status, or parse fault is contained
/// into a failed [`ProviderReport`] at the adapter boundary, so fan-out
/// callers can always join all outcomes without a provider failure
/// interrupting its siblings.
#[async_trait]
pub trait WalletDataProvider: Send + Sync {
    /// Stable provider name, used for cache keys, rate-limit budgets and logs
    fn name(&self) -> &'static str;

    /// Fetch and normalize wallet data for `address`
    async fn fetch(&self, address: &str) -> ProviderReport;
}
