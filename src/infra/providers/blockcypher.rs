//! BlockCypher provider adapter.
//!
//! Single "full address" lookup. Unlike the other explorers BlockCypher
//! reports RFC3339 timestamps, a real confirmation count per transaction,
//! and groups endpoint addresses into arrays. An optional API token lifts
//! the public tier's throttling.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::{
    ProviderError, ProviderReport, Transaction, TxEndpoint, WalletDataProvider, WalletSnapshot,
};

use super::{FetchGate, build_http_client, get_json, sats_to_btc};

pub const DEFAULT_BLOCKCYPHER_URL: &str = "https://api.blockcypher.com";

pub const PROVIDER_NAME: &str = "blockcypher";

#[derive(Debug, Deserialize)]
struct FullAddrResponse {
    final_balance: u64,
    n_tx: u64,
    total_received: u64,
    total_sent: u64,
    #[serde(default)]
    txs: Vec<CypherTx>,
}

#[derive(Debug, Deserialize)]
struct CypherTx {
    hash: String,
    confirmed: Option<DateTime<Utc>>,
    received: Option<DateTime<Utc>>,
    #[serde(default)]
    total: u64,
    #[serde(default)]
    fees: u64,
    #[serde(default)]
    confirmations: u64,
    #[serde(default)]
    inputs: Vec<CypherInput>,
    #[serde(default)]
    outputs: Vec<CypherOutput>,
}

#[derive(Debug, Deserialize)]
struct CypherInput {
    addresses: Option<Vec<String>>,
    #[serde(default)]
    output_value: u64,
}

#[derive(Debug, Deserialize)]
struct CypherOutput {
    addresses: Option<Vec<String>>,
    #[serde(default)]
    value: u64,
}

pub struct BlockCypherProvider {
    http_client: reqwest::Client,
    base_url: String,
    api_token: Option<SecretString>,
    gate: FetchGate,
}

impl BlockCypherProvider {
    /// # Arguments
    /// * `api_token` - Optional BlockCypher token; the adapter works
    ///   without one on the public tier.
    /// * `base_url` - Optional override, used by tests.
    pub fn new(gate: FetchGate, api_token: Option<SecretString>, base_url: Option<String>) -> Self {
        Self {
            http_client: build_http_client(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BLOCKCYPHER_URL.to_string()),
            api_token,
            gate,
        }
    }

    async fn fetch_remote(&self, address: &str) -> Result<WalletSnapshot, ProviderError> {
        let url = format!("{}/v1/btc/main/addrs/{}/full", self.base_url, address);

        let mut query: Vec<(&str, &str)> = vec![("limit", "50")];
        if let Some(token) = &self.api_token {
            query.push(("token", token.expose_secret()));
        }

        let response: FullAddrResponse = get_json(&self.http_client, &url, &query).await?;
        Ok(normalize(response))
    }
}

fn first_address(addresses: Option<Vec<String>>) -> Option<String> {
    addresses.and_then(|mut list| {
        if list.is_empty() {
            None
        } else {
            Some(list.remove(0))
        }
    })
}

fn normalize(response: FullAddrResponse) -> WalletSnapshot {
    let fetched_at = Utc::now();

    let transactions: Vec<Transaction> = response
        .txs
        .into_iter()
        .map(|tx| Transaction {
            value: sats_to_btc(tx.total),
            fee: sats_to_btc(tx.fees),
            confirmations: tx.confirmations,
            time: tx.confirmed.or(tx.received).unwrap_or(fetched_at),
            inputs: tx
                .inputs
                .into_iter()
                .map(|input| TxEndpoint {
                    address: first_address(input.addresses),
                    value: sats_to_btc(input.output_value),
                })
                .collect(),
            outputs: tx
                .outputs
                .into_iter()
                .map(|output| TxEndpoint {
                    address: first_address(output.addresses),
                    value: sats_to_btc(output.value),
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
impl WalletDataProvider for BlockCypherProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn fetch(&self, address: &str) -> ProviderReport {
        self.gate
            .run(self.name(), address, || self.fetch_remote(address))
            .await
    }
}
