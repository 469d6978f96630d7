//! Blockchair provider adapter.
//!
//! The dashboard endpoint reports rich summary statistics but only bare
//! transaction hashes, so this adapter contributes balances, counts, and
//! activity bounds without any transaction entries. Timestamps arrive as
//! `"YYYY-MM-DD HH:MM:SS"` strings in UTC.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

use crate::domain::{ProviderError, ProviderReport, WalletDataProvider, WalletSnapshot};

use super::{FetchGate, build_http_client, get_json, sats_to_btc};

pub const DEFAULT_BLOCKCHAIR_URL: &str = "https://api.blockchair.com";

pub const PROVIDER_NAME: &str = "blockchair";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Deserialize)]
struct DashboardResponse {
    data: HashMap<String, AddressDashboard>,
}

#[derive(Debug, Deserialize)]
struct AddressDashboard {
    address: AddressStats,
}

#[derive(Debug, Deserialize)]
struct AddressStats {
    balance: u64,
    received: u64,
    spent: u64,
    transaction_count: u64,
    first_seen_receiving: Option<String>,
    last_seen_receiving: Option<String>,
    first_seen_spending: Option<String>,
    last_seen_spending: Option<String>,
}

pub struct BlockchairProvider {
    http_client: reqwest::Client,
    base_url: String,
    gate: FetchGate,
}

impl BlockchairProvider {
    pub fn new(gate: FetchGate, base_url: Option<String>) -> Self {
        Self {
            http_client: build_http_client(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BLOCKCHAIR_URL.to_string()),
            gate,
        }
    }

    async fn fetch_remote(&self, address: &str) -> Result<WalletSnapshot, ProviderError> {
        let url = format!(
            "{}/bitcoin/dashboards/address/{}",
            self.base_url, address
        );
        let mut response: DashboardResponse =
            get_json(&self.http_client, &url, &[("limit", "50")]).await?;

        let dashboard = response.data.remove(address).ok_or_else(|| {
            ProviderError::Parse(format!("address {} missing from dashboard response", address))
        })?;

        Ok(normalize(dashboard.address))
    }
}

fn parse_timestamp(raw: Option<&String>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).ok())
        .map(|naive| naive.and_utc())
}

fn normalize(stats: AddressStats) -> WalletSnapshot {
    let first_seen = [
        parse_timestamp(stats.first_seen_receiving.as_ref()),
        parse_timestamp(stats.first_seen_spending.as_ref()),
    ]
    .into_iter()
    .flatten()
    .min();

    let last_seen = [
        parse_timestamp(stats.last_seen_receiving.as_ref()),
        parse_timestamp(stats.last_seen_spending.as_ref()),
    ]
    .into_iter()
    .flatten()
    .max();

    WalletSnapshot {
        balance: sats_to_btc(stats.balance),
        transaction_count: stats.transaction_count,
        total_received: sats_to_btc(stats.received),
        total_sent: sats_to_btc(stats.spent),
        first_seen,
        last_seen,
        // the dashboard lists bare hashes only; summary statistics is all
        // this provider contributes
        transactions: Vec::new(),
    }
}

#[async_trait]
impl WalletDataProvider for BlockchairProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn fetch(&self, address: &str) -> ProviderReport {
        self.gate
            .run(self.name(), address, || self.fetch_remote(address))
            .await
    }
}
