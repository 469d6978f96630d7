//! Counterparty cluster analysis over the merged transaction set.

use std::collections::HashSet;

use crate::domain::{NetworkAnalysis, NetworkPattern, PatternSeverity, Transaction};

/// Sample addresses retained for display
pub const MAX_SAMPLE_ADDRESSES: usize = 20;

/// Cluster size beyond which the wallet is considered highly connected
pub const HIGH_CONNECTIVITY_THRESHOLD: usize = 50;

/// Walk every transaction's endpoints and build the distinct counterparty
/// set, excluding the analyzed address itself. Encounter order is kept so
/// the sample list is deterministic for a given merged transaction list.
pub fn analyze_counterparties(address: &str, transactions: &[Transaction]) -> NetworkAnalysis {
    let mut seen = HashSet::new();
    let mut counterparties: Vec<String> = Vec::new();

    let endpoints = transactions
        .iter()
        .flat_map(|tx| tx.inputs.iter().chain(tx.outputs.iter()));
    for endpoint in endpoints {
        if let Some(candidate) = &endpoint.address
            && candidate.as_str() != address
            && seen.insert(candidate.clone())
        {
            counterparties.push(candidate.clone());
        }
    }

    let cluster_size = counterparties.len();

    let mut patterns = Vec::new();
    if cluster_size > HIGH_CONNECTIVITY_THRESHOLD {
        patterns.push(NetworkPattern {
            name: "High Connectivity".to_string(),
            severity: PatternSeverity::Medium,
        });
    }

    let sample_addresses = counterparties
        .into_iter()
        .take(MAX_SAMPLE_ADDRESSES)
        .collect();

    NetworkAnalysis {
        cluster_size,
        sample_addresses,
        // reserved extension point; no external denylist is wired in
        risk_connections: Vec::new(),
        patterns,
    }
}
