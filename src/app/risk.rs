//! Heuristic risk scoring over the merged wallet record.
//!
//! Pure functions: same merged record, same score. Rules are additive and
//! the total is clamped to 100.

use chrono::{DateTime, Utc};

use crate::domain::Transaction;

pub const MAX_RISK_SCORE: u8 = 100;

const HIGH_TX_COUNT_THRESHOLD: u64 = 1000;
const LARGE_BALANCE_THRESHOLD_BTC: f64 = 100.0;
const RECENT_ACTIVITY_WINDOW_SECS: i64 = 24 * 60 * 60;
const ROUND_NUMBER_MIN_VALUE_BTC: f64 = 1.0;
const RAPID_SUCCESSION_WINDOW_SECS: i64 = 60;
const RAPID_SUCCESSION_PAIR_THRESHOLD: usize = 5;

/// Outcome of the risk heuristics: a clamped score plus one label per rule
/// that fired
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskAssessment {
    pub score: u8,
    pub factors: Vec<String>,
}

/// Score a merged wallet record against the heuristic rule set.
///
/// `transactions` must be sorted descending by time, as produced by the
/// merge step; the rapid-succession rule relies on that order and does
/// not re-sort.
pub fn score_wallet(
    balance: f64,
    transaction_count: u64,
    last_seen: Option<DateTime<Utc>>,
    transactions: &[Transaction],
) -> RiskAssessment {
    score_wallet_at(balance, transaction_count, last_seen, transactions, Utc::now())
}

/// Clock-injected variant of [`score_wallet`] for deterministic tests
pub fn score_wallet_at(
    balance: f64,
    transaction_count: u64,
    last_seen: Option<DateTime<Utc>>,
    transactions: &[Transaction],
    now: DateTime<Utc>,
) -> RiskAssessment {
    let mut score: u32 = 0;
    let mut factors = Vec::new();

    if transaction_count > HIGH_TX_COUNT_THRESHOLD {
        score += 20;
        factors.push("High transaction frequency".to_string());
    }

    if balance > LARGE_BALANCE_THRESHOLD_BTC {
        score += 15;
        factors.push("Large balance holder".to_string());
    }

    if let Some(last) = last_seen
        && (now - last).num_seconds() < RECENT_ACTIVITY_WINDOW_SECS
    {
        score += 10;
        factors.push("Very recent activity".to_string());
    }

    if has_round_number_majority(transactions) {
        score += 25;
        factors.push("Suspicious round number transactions".to_string());
    }

    if rapid_succession_pairs(transactions) > RAPID_SUCCESSION_PAIR_THRESHOLD {
        score += 20;
        factors.push("Rapid succession transactions detected".to_string());
    }

    RiskAssessment {
        score: score.min(u32::from(MAX_RISK_SCORE)) as u8,
        factors,
    }
}

/// True when transactions with an integral value of at least one BTC make
/// up more than half of the sampled set
fn has_round_number_majority(transactions: &[Transaction]) -> bool {
    if transactions.is_empty() {
        return false;
    }
    let round = transactions
        .iter()
        .filter(|tx| tx.value >= ROUND_NUMBER_MIN_VALUE_BTC && tx.value.fract() == 0.0)
        .count();
    round * 2 > transactions.len()
}

/// Count adjacent pairs in the (time-descending) list that settled within
/// the rapid-succession window of each other
fn rapid_succession_pairs(transactions: &[Transaction]) -> usize {
    transactions
        .windows(2)
        .filter(|pair| (pair[0].time - pair[1].time).num_seconds() < RAPID_SUCCESSION_WINDOW_SECS)
        .count()
}
