//! Mock implementations for testing.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    FetchOutcome, ProviderReport, Transaction, WalletDataProvider, WalletSnapshot,
};

/// Scripted provider that returns a fixed outcome and counts its calls.
///
/// Bypasses the cache/rate-limit gate on purpose: aggregation tests target
/// the merge step, not the pre-flight pipeline.
pub struct MockProvider {
    name: &'static str,
    outcome: FetchOutcome,
    calls: AtomicUsize,
}

impl MockProvider {
    #[must_use]
    pub fn succeeding(name: &'static str, snapshot: WalletSnapshot) -> Self {
        Self {
            name,
            outcome: FetchOutcome::Success(snapshot),
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn failing(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            outcome: FetchOutcome::Failure(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletDataProvider for MockProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, _address: &str) -> ProviderReport {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ProviderReport {
            provider: self.name,
            fetched_at: Utc::now(),
            outcome: self.outcome.clone(),
        }
    }
}

/// Snapshot with the given totals and no transactions
#[must_use]
pub fn snapshot_with(balance: f64, transaction_count: u64) -> WalletSnapshot {
    WalletSnapshot {
        balance,
        transaction_count,
        total_received: balance,
        total_sent: 0.0,
        first_seen: None,
        last_seen: None,
        transactions: Vec::new(),
    }
}

/// Minimal transaction at a fixed time, for merge and analyzer tests
#[must_use]
pub fn transaction_at(hash: &str, time: DateTime<Utc>, value: f64) -> Transaction {
    Transaction {
        hash: hash.to_string(),
        time,
        value,
        fee: 0.0001,
        confirmations: 1,
        inputs: Vec::new(),
        outputs: Vec::new(),
        risk_flags: Vec::new(),
    }
}
