//! HTTP-based integration tests for the provider adapters.
//!
//! Uses `wiremock` to stand in for the block-explorer APIs, exercising the
//! full adapter pipeline: cache lookup, rate-limit gate, network fetch,
//! normalization, and fault containment.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wallet_intel_aggregator::domain::WalletDataProvider;
use wallet_intel_aggregator::infra::cache::SnapshotCache;
use wallet_intel_aggregator::infra::providers::{
    BlockCypherProvider, BlockchainInfoProvider, BlockchairProvider, BlockstreamProvider,
    FetchGate,
};
use wallet_intel_aggregator::infra::rate_limit::{ProviderRateLimiter, RateLimitBudgets};

const ADDR: &str = "1TestWalletAddress";

fn fresh_gate() -> FetchGate {
    FetchGate::new(
        Arc::new(SnapshotCache::new()),
        Arc::new(ProviderRateLimiter::default()),
    )
}

/// Gate whose budget for `provider` is already exhausted
fn exhausted_gate(provider: &str) -> FetchGate {
    let mut budgets = BTreeMap::new();
    budgets.insert(provider.to_string(), 0);
    FetchGate::new(
        Arc::new(SnapshotCache::new()),
        Arc::new(ProviderRateLimiter::new(RateLimitBudgets::new(budgets))),
    )
}

// ============================================================================
// BLOCKCHAIN.INFO ADAPTER
// ============================================================================

mod blockchain_info_tests {
    use super::*;

    fn rawaddr_body() -> serde_json::Value {
        json!({
            "final_balance": 150_000_000u64,
            "n_tx": 2,
            "total_received": 250_000_000u64,
            "total_sent": 100_000_000u64,
            "txs": [
                {
                    "hash": "tx_recent",
                    "time": 1_700_000_600,
                    "result": -100_000_000i64,
                    "fee": 5_000,
                    "block_height": 820_001,
                    "inputs": [
                        { "prev_out": { "addr": "1Sender", "value": 100_005_000u64 } }
                    ],
                    "out": [
                        { "addr": "1Receiver", "value": 100_000_000u64 }
                    ]
                },
                {
                    "hash": "tx_old",
                    "time": 1_700_000_000,
                    "result": 250_000_000i64,
                    "fee": 2_000,
                    "block_height": 820_000,
                    "inputs": [],
                    "out": []
                }
            ]
        })
    }

    #[tokio::test]
    async fn test_successful_fetch_normalizes_payload() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/rawaddr/{}", ADDR)))
            .respond_with(ResponseTemplate::new(200).set_body_json(rawaddr_body()))
            .mount(&mock_server)
            .await;

        let provider = BlockchainInfoProvider::new(fresh_gate(), Some(mock_server.uri()));
        let report = provider.fetch(ADDR).await;

        assert!(report.is_success(), "error: {:?}", report.error());
        let snapshot = report.snapshot().unwrap();
        assert_eq!(snapshot.balance, 1.5);
        assert_eq!(snapshot.transaction_count, 2);
        assert_eq!(snapshot.transactions.len(), 2);
    }

    #[tokio::test]
    async fn test_http_error_contained_as_failed_report() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&mock_server)
            .await;

        let provider = BlockchainInfoProvider::new(fresh_gate(), Some(mock_server.uri()));
        let report = provider.fetch(ADDR).await;

        assert!(!report.is_success());
        assert!(report.error().unwrap().contains("500"));
    }

    #[tokio::test]
    async fn test_malformed_body_contained_as_failed_report() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not valid json"))
            .mount(&mock_server)
            .await;

        let provider = BlockchainInfoProvider::new(fresh_gate(), Some(mock_server.uri()));
        let report = provider.fetch(ADDR).await;

        assert!(!report.is_success());
        assert!(report.error().unwrap().contains("Parse error"));
    }

    #[tokio::test]
    async fn test_exhausted_budget_makes_no_network_call() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rawaddr_body()))
            .expect(0)
            .mount(&mock_server)
            .await;

        let provider = BlockchainInfoProvider::new(
            exhausted_gate("blockchain_info"),
            Some(mock_server.uri()),
        );
        let report = provider.fetch(ADDR).await;

        assert!(!report.is_success());
        assert_eq!(report.error(), Some("Rate limit exceeded"));
    }

    #[tokio::test]
    async fn test_second_fetch_served_from_cache() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/rawaddr/{}", ADDR)))
            .respond_with(ResponseTemplate::new(200).set_body_json(rawaddr_body()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = BlockchainInfoProvider::new(fresh_gate(), Some(mock_server.uri()));

        let first = provider.fetch(ADDR).await;
        let second = provider.fetch(ADDR).await;

        assert!(first.is_success());
        assert!(second.is_success());
        assert_eq!(first.snapshot(), second.snapshot());
    }
}

// ============================================================================
// BLOCKSTREAM (ESPLORA) ADAPTER
// ============================================================================

mod blockstream_tests {
    use super::*;

    fn summary_body() -> serde_json::Value {
        json!({
            "chain_stats": {
                "funded_txo_sum": 300_000_000u64,
                "spent_txo_sum": 100_000_000u64,
                "tx_count": 3
            }
        })
    }

    fn txs_body() -> serde_json::Value {
        json!([
            {
                "txid": "esplora_tx",
                "fee": 1_000,
                "status": { "confirmed": true, "block_time": 1_700_000_000 },
                "vin": [
                    { "prevout": { "scriptpubkey_address": "bc1qsender", "value": 50_000_000u64 } }
                ],
                "vout": [
                    { "scriptpubkey_address": ADDR, "value": 49_999_000u64 }
                ]
            }
        ])
    }

    #[tokio::test]
    async fn test_dual_request_joins_both_endpoints() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/address/{}", ADDR)))
            .respond_with(ResponseTemplate::new(200).set_body_json(summary_body()))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/address/{}/txs", ADDR)))
            .respond_with(ResponseTemplate::new(200).set_body_json(txs_body()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = BlockstreamProvider::new(fresh_gate(), Some(mock_server.uri()));
        let report = provider.fetch(ADDR).await;

        assert!(report.is_success(), "error: {:?}", report.error());
        let snapshot = report.snapshot().unwrap();
        assert_eq!(snapshot.balance, 2.0);
        assert_eq!(snapshot.transaction_count, 3);
        assert_eq!(snapshot.transactions.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_sub_request_fails_adapter_as_unit() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/address/{}", ADDR)))
            .respond_with(ResponseTemplate::new(200).set_body_json(summary_body()))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/address/{}/txs", ADDR)))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&mock_server)
            .await;

        let provider = BlockstreamProvider::new(fresh_gate(), Some(mock_server.uri()));
        let report = provider.fetch(ADDR).await;

        assert!(
            !report.is_success(),
            "summary alone must not produce a result"
        );
        assert!(report.error().unwrap().contains("503"));
    }
}

// ============================================================================
// BLOCKCYPHER ADAPTER
// ============================================================================

mod blockcypher_tests {
    use super::*;
    use secrecy::SecretString;

    fn full_addr_body() -> serde_json::Value {
        json!({
            "final_balance": 75_000_000u64,
            "n_tx": 1,
            "total_received": 75_000_000u64,
            "total_sent": 0,
            "txs": [
                {
                    "hash": "cypher_tx",
                    "confirmed": "2023-11-14T22:13:20Z",
                    "received": "2023-11-14T22:12:00Z",
                    "total": 75_000_000u64,
                    "fees": 1_500,
                    "confirmations": 12,
                    "inputs": [
                        { "addresses": ["1CypherSender"], "output_value": 75_001_500u64 }
                    ],
                    "outputs": [
                        { "addresses": [ADDR], "value": 75_000_000u64 }
                    ]
                }
            ]
        })
    }

    #[tokio::test]
    async fn test_successful_fetch_with_api_token() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v1/btc/main/addrs/{}/full", ADDR)))
            .and(query_param("token", "test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(full_addr_body()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = BlockCypherProvider::new(
            fresh_gate(),
            Some(SecretString::from("test-token")),
            Some(mock_server.uri()),
        );
        let report = provider.fetch(ADDR).await;

        assert!(report.is_success(), "error: {:?}", report.error());
        let snapshot = report.snapshot().unwrap();
        assert_eq!(snapshot.balance, 0.75);
        assert_eq!(snapshot.transactions[0].confirmations, 12);
    }

    #[tokio::test]
    async fn test_works_without_token_on_public_tier() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v1/btc/main/addrs/{}/full", ADDR)))
            .respond_with(ResponseTemplate::new(200).set_body_json(full_addr_body()))
            .mount(&mock_server)
            .await;

        let provider = BlockCypherProvider::new(fresh_gate(), None, Some(mock_server.uri()));
        let report = provider.fetch(ADDR).await;

        assert!(report.is_success());
    }

    #[tokio::test]
    async fn test_too_many_requests_contained() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&mock_server)
            .await;

        let provider = BlockCypherProvider::new(fresh_gate(), None, Some(mock_server.uri()));
        let report = provider.fetch(ADDR).await;

        assert!(!report.is_success());
        assert!(report.error().unwrap().contains("429"));
    }
}

// ============================================================================
// BLOCKCHAIR ADAPTER
// ============================================================================

mod blockchair_tests {
    use super::*;

    fn dashboard_body() -> serde_json::Value {
        json!({
            "data": {
                "1TestWalletAddress": {
                    "address": {
                        "balance": 42_000_000u64,
                        "received": 500_000_000u64,
                        "spent": 458_000_000u64,
                        "transaction_count": 61,
                        "first_seen_receiving": "2019-03-01 10:15:00",
                        "last_seen_receiving": "2023-11-10 08:00:00",
                        "first_seen_spending": "2019-05-20 17:45:30",
                        "last_seen_spending": "2023-12-01 23:59:59"
                    }
                }
            }
        })
    }

    #[tokio::test]
    async fn test_successful_fetch_contributes_summary_only() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/bitcoin/dashboards/address/{}", ADDR)))
            .respond_with(ResponseTemplate::new(200).set_body_json(dashboard_body()))
            .mount(&mock_server)
            .await;

        let provider = BlockchairProvider::new(fresh_gate(), Some(mock_server.uri()));
        let report = provider.fetch(ADDR).await;

        assert!(report.is_success(), "error: {:?}", report.error());
        let snapshot = report.snapshot().unwrap();
        assert_eq!(snapshot.balance, 0.42);
        assert_eq!(snapshot.transaction_count, 61);
        assert!(snapshot.transactions.is_empty());
        assert!(snapshot.first_seen.is_some());
    }

    #[tokio::test]
    async fn test_missing_address_key_is_parse_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
            .mount(&mock_server)
            .await;

        let provider = BlockchairProvider::new(fresh_gate(), Some(mock_server.uri()));
        let report = provider.fetch(ADDR).await;

        assert!(!report.is_success());
        assert!(report.error().unwrap().contains("Parse error"));
    }
}
