//! Blockstream (Esplora) provider adapter.
//!
//! Esplora splits address data across two endpoints: `/address/{addr}`
//! for summary statistics and `/address/{addr}/txs` for recent
//! transactions. Both lookups run concurrently and must both succeed
//! before this adapter reports a result.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::{
    ProviderError, ProviderReport, Transaction, TxEndpoint, WalletDataProvider, WalletSnapshot,
};

use super::{FetchGate, build_http_client, get_json, sats_to_btc};

pub const DEFAULT_BLOCKSTREAM_URL: &str = "https://blockstream.info/api";

pub const PROVIDER_NAME: &str = "blockstream";

#[derive(Debug, Deserialize)]
struct AddressResponse {
    chain_stats: ChainStats,
}

#[derive(Debug, Deserialize)]
struct ChainStats {
    funded_txo_sum: u64,
    spent_txo_sum: u64,
    tx_count: u64,
}

#[derive(Debug, Deserialize)]
struct EsploraTx {
    txid: String,
    #[serde(default)]
    fee: u64,
    status: TxStatus,
    #[serde(default)]
    vin: Vec<Vin>,
    #[serde(default)]
    vout: Vec<Vout>,
}

#[derive(Debug, Deserialize)]
struct TxStatus {
    confirmed: bool,
    block_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Vin {
    prevout: Option<Vout>,
}

#[derive(Debug, Deserialize)]
struct Vout {
    scriptpubkey_address: Option<String>,
    #[serde(default)]
    value: u64,
}

pub struct BlockstreamProvider {
    http_client: reqwest::Client,
    base_url: String,
    gate: FetchGate,
}

impl BlockstreamProvider {
    pub fn new(gate: FetchGate, base_url: Option<String>) -> Self {
        Self {
            http_client: build_http_client(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BLOCKSTREAM_URL.to_string()),
            gate,
        }
    }

    /// Both sub-requests run concurrently; either failure fails the adapter
    /// as a unit.
    async fn fetch_remote(&self, address: &str) -> Result<WalletSnapshot, ProviderError> {
        let summary_url = format!("{}/address/{}", self.base_url, address);
        let txs_url = format!("{}/address/{}/txs", self.base_url, address);

        let (summary, txs) = tokio::join!(
            get_json::<AddressResponse>(&self.http_client, &summary_url, &[]),
            get_json::<Vec<EsploraTx>>(&self.http_client, &txs_url, &[]),
        );

        Ok(normalize(address, summary?, txs?))
    }
}

fn normalize(address: &str, summary: AddressResponse, txs: Vec<EsploraTx>) -> WalletSnapshot {
    let fetched_at = Utc::now();
    let stats = summary.chain_stats;

    let transactions: Vec<Transaction> = txs
        .into_iter()
        .map(|tx| {
            let received: u64 = tx
                .vout
                .iter()
                .filter(|out| out.scriptpubkey_address.as_deref() == Some(address))
                .map(|out| out.value)
                .sum();
            let spent: u64 = tx
                .vin
                .iter()
                .filter_map(|vin| vin.prevout.as_ref())
                .filter(|out| out.scriptpubkey_address.as_deref() == Some(address))
                .map(|out| out.value)
                .sum();

            Transaction {
                value: sats_to_btc(received.abs_diff(spent)),
                fee: sats_to_btc(tx.fee),
                confirmations: u64::from(tx.status.confirmed),
                // unconfirmed txs carry no block_time yet
                time: tx
                    .status
                    .block_time
                    .and_then(|t| DateTime::from_timestamp(t, 0))
                    .unwrap_or(fetched_at),
                inputs: tx
                    .vin
                    .into_iter()
                    .filter_map(|vin| vin.prevout)
                    .map(|out| TxEndpoint {
                        address: out.scriptpubkey_address,
                        value: sats_to_btc(out.value),
                    })
                    .collect(),
                outputs: tx
                    .vout
                    .into_iter()
                    .map(|out| TxEndpoint {
                        address: out.scriptpubkey_address,
                        value: sats_to_btc(out.value),
                    })
                    .collect(),
                hash: tx.txid,
                risk_flags: Vec::new(),
            }
        })
        .collect();

    let first_seen = transactions.iter().map(|tx| tx.time).min();
    let last_seen = transactions.iter().map(|tx| tx.time).max();

    WalletSnapshot {
        balance: sats_to_btc(stats.funded_txo_sum.saturating_sub(stats.spent_txo_sum)),
        transaction_count: stats.tx_count,
        total_received: sats_to_btc(stats.funded_txo_sum),
        total_sent: sats_to_btc(stats.spent_txo_sum),
        first_seen,
        last_seen,
        transactions,
    }
}

#[async_trait]
impl WalletDataProvider for BlockstreamProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn fetch(&self, address: &str) -> ProviderReport {
        self.gate
            .run(self.name(), address, || self.fetch_remote(address))
            .await
    }
}
