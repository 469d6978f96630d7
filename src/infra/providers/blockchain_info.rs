//! Blockchain.info provider adapter.
//!
//! Single `rawaddr` lookup returning summary statistics and the full
//! transaction list in one payload. Amounts are satoshi integers; the
//! per-transaction `result` field is the signed net effect on the queried
//! address.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::{
    ProviderError, ProviderReport, Transaction, TxEndpoint, WalletDataProvider, WalletSnapshot,
};

use super::{FetchGate, build_http_client, get_json, sats_to_btc};

pub const DEFAULT_BLOCKCHAIN_INFO_URL: &str = "https://blockchain.info";

pub const PROVIDER_NAME: &str = "blockchain_info";

#[derive(Debug, Deserialize)]
struct RawAddrResponse {
    final_balance: u64,
    n_tx: u64,
    total_received: u64,
    total_sent: u64,
    #[serde(default)]
    txs: Vec<RawTx>,
}

#[derive(Debug, Deserialize)]
struct RawTx {
    hash: String,
    time: i64,
    #[serde(default)]
    result: i64,
    #[serde(default)]
    fee: u64,
    block_height: Option<u64>,
    #[serde(default)]
    inputs: Vec<RawInput>,
    #[serde(rename = "out", default)]
    outputs: Vec<RawOutput>,
}

#[derive(Debug, Deserialize)]
struct RawInput {
    prev_out: Option<RawOutput>,
}

#[derive(Debug, Deserialize)]
struct RawOutput {
    addr: Option<String>,
    #[serde(default)]
    value: u64,
}

pub struct BlockchainInfoProvider {
    http_client: reqwest::Client,
    base_url: String,
    gate: FetchGate,
}

impl BlockchainInfoProvider {
    /// # Arguments
    /// * `base_url` - Optional override, used by tests. Defaults to the
    ///   public Blockchain.info endpoint.
    pub fn new(gate: FetchGate, base_url: Option<String>) -> Self {
        Self {
            http_client: build_http_client(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BLOCKCHAIN_INFO_URL.to_string()),
            gate,
        }
    }

    async fn fetch_remote(&self, address: &str) -> Result<WalletSnapshot, ProviderError> {
        let url = format!("{}/rawaddr/{}", self.base_url, address);
        let response: RawAddrResponse =
            get_json(&self.http_client, &url, &[("limit", "50")]).await?;
        Ok(normalize(response))
    }
}

fn normalize(response: RawAddrResponse) -> WalletSnapshot {
    let transactions: Vec<Transaction> = response
        .txs
        .into_iter()
        .map(|tx| Transaction {
            value: sats_to_btc(tx.result.unsigned_abs()),
            fee: sats_to_btc(tx.fee),
            // rawaddr carries no confirmation count; record mined txs as 1
            confirmations: u64::from(tx.block_height.is_some()),
            time: DateTime::from_timestamp(tx.time, 0).unwrap_or_else(Utc::now),
            inputs: tx
                .inputs
                .into_iter()
                .filter_map(|input| input.prev_out)
                .map(|out| TxEndpoint {
                    address: out.addr,
                    value: sats_to_btc(out.value),
                })
                .collect(),
            outputs: tx
                .outputs
                .into_iter()
                .map(|out| TxEndpoint {
                    address: out.addr,
                    value: sats_to_btc(out.value),
                })
                .collect(),
            hash: tx.hash,
            risk_flags: Vec::new(),
        })
        .collect();

    let first_seen = transactions.iter().map(|tx| tx.time).min();
    let last_seen = transactions.iter().map(|tx| tx.time).max();

    WalletSnapshot {
        balance: sats_to_btc(response.final_balance),
        transaction_count: response.n_tx,
        total_received: sats_to_btc(response.total_received),
        total_sent: sats_to_btc(response.total_sent),
        first_seen,
        last_seen,
        transactions,
    }
}

#[async_trait]
impl WalletDataProvider for BlockchainInfoProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn fetch(&self, address: &str) -> ProviderReport {
        self.gate
            .run(self.name(), address, || self.fetch_remote(address))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_response() -> RawAddrResponse {
        serde_json::from_value(serde_json::json!({
            "final_balance": 150_000_000u64,
            "n_tx": 2,
            "total_received": 250_000_000u64,
            "total_sent": 100_000_000u64,
            "txs": [
                {
                    "hash": "tx_b",
                    "time": 1_700_000_600,
                    "result": -100_000_000i64,
                    "fee": 5_000,
                    "block_height": 820_001,
                    "inputs": [
                        { "prev_out": { "addr": "1SenderAddr", "value": 100_005_000u64 } }
                    ],
                    "out": [
                        { "addr": "1ReceiverAddr", "value": 100_000_000u64 }
                    ]
                },
                {
                    "hash": "tx_a",
                    "time": 1_700_000_000,
                    "result": 250_000_000i64,
                    "fee": 2_000,
                    "block_height": 820_000,
                    "inputs": [],
                    "out": [
                        { "addr": "1FundingAddr", "value": 250_000_000u64 }
                    ]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_normalize_summary_fields() {
        let snapshot = normalize(sample_response());

        assert_eq!(snapshot.balance, 1.5);
        assert_eq!(snapshot.transaction_count, 2);
        assert_eq!(snapshot.total_received, 2.5);
        assert_eq!(snapshot.total_sent, 1.0);
    }

    #[test]
    fn test_normalize_signed_result_becomes_absolute_value() {
        let snapshot = normalize(sample_response());

        let spend = snapshot
            .transactions
            .iter()
            .find(|tx| tx.hash == "tx_b")
            .unwrap();
        assert_eq!(spend.value, 1.0);
        assert_eq!(spend.fee, 0.00005);
        assert_eq!(spend.confirmations, 1);
    }

    #[test]
    fn test_normalize_derives_activity_bounds_from_transactions() {
        let snapshot = normalize(sample_response());

        assert_eq!(
            snapshot.first_seen.unwrap().timestamp(),
            1_700_000_000
        );
        assert_eq!(snapshot.last_seen.unwrap().timestamp(), 1_700_000_600);
    }

    #[test]
    fn test_normalize_extracts_counterparty_endpoints() {
        let snapshot = normalize(sample_response());

        let spend = snapshot
            .transactions
            .iter()
            .find(|tx| tx.hash == "tx_b")
            .unwrap();
        assert_eq!(
            spend.inputs[0].address.as_deref(),
            Some("1SenderAddr")
        );
        assert_eq!(
            spend.outputs[0].address.as_deref(),
            Some("1ReceiverAddr")
        );
    }

    #[test]
    fn test_normalize_empty_wallet() {
        let response: RawAddrResponse = serde_json::from_value(serde_json::json!({
            "final_balance": 0,
            "n_tx": 0,
            "total_received": 0,
            "total_sent": 0,
            "txs": []
        }))
        .unwrap();

        let snapshot = normalize(response);
        assert_eq!(snapshot.balance, 0.0);
        assert!(snapshot.first_seen.is_none());
        assert!(snapshot.transactions.is_empty());
    }
}
