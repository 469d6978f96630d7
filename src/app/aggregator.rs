//! Orchestration service: concurrent provider fan-out and reconciliation.
//!
//! `analyze_wallet` fans out to every configured adapter, waits for all of
//! them to settle, merges the successful snapshots into one canonical
//! record, and attaches the risk and counterparty analyses. Individual
//! provider failures are contained; only a total failure aborts the call.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{debug, info, instrument, warn};

use crate::domain::{
    AggregatedWalletData, AppError, DataQuality, ProviderApiStatus, Transaction,
    WalletDataProvider, WalletSnapshot,
};
use crate::infra::cache::{CacheStats, SnapshotCache};
use crate::infra::rate_limit::ProviderRateLimiter;

use super::network::analyze_counterparties;
use super::risk::score_wallet;

/// Most-recent transactions retained in the merged record
pub const MAX_MERGED_TRANSACTIONS: usize = 50;

/// Shared service coordinating adapters, cache, and rate-limit state.
///
/// Explicitly constructed and injected, never ambient: tests build one per
/// case with their own cache and limiter instances.
pub struct WalletAnalysisService {
    providers: Vec<Arc<dyn WalletDataProvider>>,
    cache: Arc<SnapshotCache>,
    limiter: Arc<ProviderRateLimiter>,
}

impl WalletAnalysisService {
    pub fn new(
        providers: Vec<Arc<dyn WalletDataProvider>>,
        cache: Arc<SnapshotCache>,
        limiter: Arc<ProviderRateLimiter>,
    ) -> Self {
        Self {
            providers,
            cache,
            limiter,
        }
    }

    /// Analyze an address across every configured provider.
    ///
    /// Fails only with [`AppError::AllProvidersFailed`]; partial provider
    /// failures show up as reduced confidence and data quality instead.
    #[instrument(skip(self), fields(address = %address))]
    pub async fn analyze_wallet(&self, address: &str) -> Result<AggregatedWalletData, AppError> {
        let attempted = self.providers.len();

        // Fan out to every adapter and wait for all of them to settle;
        // adapters contain their own failures, so join_all sees no errors.
        let reports = join_all(
            self.providers
                .iter()
                .map(|provider| provider.fetch(address)),
        )
        .await;

        let mut successes: Vec<(&'static str, WalletSnapshot)> = Vec::new();
        for report in reports {
            match report.snapshot() {
                Some(snapshot) => successes.push((report.provider, snapshot.clone())),
                None => debug!(
                    provider = report.provider,
                    error = report.error().unwrap_or("unknown"),
                    "provider did not contribute"
                ),
            }
        }

        if successes.is_empty() {
            warn!(attempted, "every provider failed, aborting analysis");
            return Err(AppError::AllProvidersFailed { attempted });
        }

        let sources: Vec<String> = successes
            .iter()
            .map(|(name, _)| (*name).to_string())
            .collect();
        let confidence = confidence(successes.len(), attempted);
        let data_quality = data_quality(successes.len());

        let totals = merge_totals(&successes);
        let transactions = merge_transactions(&successes);

        let assessment = score_wallet(
            totals.balance,
            totals.transaction_count,
            totals.last_seen,
            &transactions,
        );
        let network = analyze_counterparties(address, &transactions);

        info!(
            providers = successes.len(),
            attempted,
            confidence,
            risk_score = assessment.score,
            data_quality = %data_quality,
            "wallet analysis complete"
        );

        Ok(AggregatedWalletData {
            address: address.to_string(),
            balance: totals.balance,
            transaction_count: totals.transaction_count,
            first_seen: totals.first_seen,
            last_seen: totals.last_seen,
            total_received: totals.total_received,
            total_sent: totals.total_sent,
            risk_score: assessment.score,
            risk_factors: assessment.factors,
            confidence,
            data_quality,
            sources,
            transactions,
            network,
        })
    }

    /// Monitoring surface: remaining budget per configured provider
    pub fn api_status(&self) -> Vec<ProviderApiStatus> {
        self.limiter.statuses()
    }

    /// Administrative cache reset. Returns how many entries were dropped.
    pub fn clear_cache(&self) -> usize {
        self.cache.clear()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Providers whose budget currently allows a request
    pub fn providers_available(&self) -> usize {
        self.providers
            .iter()
            .filter(|p| self.limiter.can_make_request(p.name()))
            .count()
    }
}

#[derive(Debug, PartialEq)]
struct MergedTotals {
    balance: f64,
    transaction_count: u64,
    total_received: f64,
    total_sent: f64,
    first_seen: Option<DateTime<Utc>>,
    last_seen: Option<DateTime<Utc>>,
}

/// Numeric reconciliation: take the maximum of every reported value.
/// Providers under-report pending state more often than they over-report,
/// so the maximum is treated as the most-complete estimate. A documented
/// heuristic, not a provably correct reconciliation.
fn merge_totals(successes: &[(&'static str, WalletSnapshot)]) -> MergedTotals {
    let mut totals = MergedTotals {
        balance: 0.0,
        transaction_count: 0,
        total_received: 0.0,
        total_sent: 0.0,
        first_seen: None,
        last_seen: None,
    };

    for (_, snapshot) in successes {
        totals.balance = totals.balance.max(snapshot.balance);
        totals.transaction_count = totals.transaction_count.max(snapshot.transaction_count);
        totals.total_received = totals.total_received.max(snapshot.total_received);
        totals.total_sent = totals.total_sent.max(snapshot.total_sent);

        totals.first_seen = match (totals.first_seen, snapshot.first_seen) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        totals.last_seen = match (totals.last_seen, snapshot.last_seen) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }

    totals
}

/// Union of every provider's transactions, deduplicated by hash (first
/// occurrence wins), sorted descending by time, truncated to the 50 most
/// recent
fn merge_transactions(successes: &[(&'static str, WalletSnapshot)]) -> Vec<Transaction> {
    let mut seen = HashSet::new();
    let mut merged: Vec<Transaction> = Vec::new();

    for (_, snapshot) in successes {
        for tx in &snapshot.transactions {
            if seen.insert(tx.hash.clone()) {
                merged.push(tx.clone());
            }
        }
    }

    merged.sort_by(|a, b| b.time.cmp(&a.time));
    merged.truncate(MAX_MERGED_TRANSACTIONS);
    merged
}

fn confidence(successes: usize, attempted: usize) -> u8 {
    if attempted == 0 {
        return 0;
    }
    ((successes as f64 / attempted as f64) * 100.0).round() as u8
}

fn data_quality(successes: usize) -> DataQuality {
    match successes {
        n if n >= 3 => DataQuality::High,
        2 => DataQuality::Medium,
        _ => DataQuality::Low,
    }
}
