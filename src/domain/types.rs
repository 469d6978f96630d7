//! Core data model for wallet aggregation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Coarse data-quality label derived from how many providers contributed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    /// Three or more providers succeeded
    High,
    /// Exactly two providers succeeded
    Medium,
    /// Exactly one provider succeeded
    Low,
}

impl DataQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl std::str::FromStr for DataQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(format!("Invalid data quality: {}", s)),
        }
    }
}

impl std::fmt::Display for DataQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One side of a transaction: who funded it or who received it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct TxEndpoint {
    /// Counterparty address, when the provider exposes one
    #[schema(example = "bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh")]
    pub address: Option<String>,
    /// Amount moved through this endpoint, in BTC
    #[schema(example = 0.25)]
    pub value: f64,
}

/// A normalized transaction, deduplicated across providers by `hash`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Transaction {
    /// Transaction hash, the unique key for deduplication
    #[schema(example = "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b")]
    pub hash: String,
    /// Block (or first-seen) time
    pub time: DateTime<Utc>,
    /// Net amount moved relative to the analyzed address, in BTC
    #[schema(example = 1.5)]
    pub value: f64,
    /// Transaction fee in BTC
    #[schema(example = 0.0001)]
    pub fee: f64,
    /// Confirmation count as reported by the contributing provider
    pub confirmations: u64,
    /// Funding endpoints
    pub inputs: Vec<TxEndpoint>,
    /// Receiving endpoints
    pub outputs: Vec<TxEndpoint>,
    /// Per-transaction heuristic flags
    #[serde(default)]
    pub risk_flags: Vec<String>,
}

/// Normalized per-provider view of a wallet.
///
/// This is the payload adapters cache and the merge step consumes; every
/// provider-specific field name has already been erased by the adapter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WalletSnapshot {
    /// Current balance in BTC
    pub balance: f64,
    /// Total number of transactions the provider knows about
    pub transaction_count: u64,
    /// Lifetime received amount in BTC
    pub total_received: f64,
    /// Lifetime sent amount in BTC
    pub total_sent: f64,
    /// Earliest activity the provider reports, if any
    pub first_seen: Option<DateTime<Utc>>,
    /// Latest activity the provider reports, if any
    pub last_seen: Option<DateTime<Utc>>,
    /// Parsed transactions; most providers cap these server-side
    pub transactions: Vec<Transaction>,
}

/// Tagged outcome of one adapter fetch, so fan-in logic stays branch-free
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Success(WalletSnapshot),
    Failure(String),
}

/// Result of a single provider fetch. Ephemeral: created per fetch,
/// consumed by the merge step, never retained.
#[derive(Debug, Clone)]
pub struct ProviderReport {
    /// Stable provider name
    pub provider: &'static str,
    /// When the fetch settled
    pub fetched_at: DateTime<Utc>,
    /// Success payload or contained failure message
    pub outcome: FetchOutcome,
}

impl ProviderReport {
    #[must_use]
    pub fn success(provider: &'static str, snapshot: WalletSnapshot) -> Self {
        Self {
            provider,
            fetched_at: Utc::now(),
            outcome: FetchOutcome::Success(snapshot),
        }
    }

    #[must_use]
    pub fn failure(provider: &'static str, error: impl Into<String>) -> Self {
        Self {
            provider,
            fetched_at: Utc::now(),
            outcome: FetchOutcome::Failure(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, FetchOutcome::Success(_))
    }

    pub fn snapshot(&self) -> Option<&WalletSnapshot> {
        match &self.outcome {
            FetchOutcome::Success(snapshot) => Some(snapshot),
            FetchOutcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            FetchOutcome::Success(_) => None,
            FetchOutcome::Failure(message) => Some(message),
        }
    }
}

/// Severity attached to a detected network pattern
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PatternSeverity {
    Low,
    Medium,
    High,
}

/// A pattern detected while walking the counterparty graph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct NetworkPattern {
    /// Pattern name
    #[schema(example = "High Connectivity")]
    pub name: String,
    /// How concerning the pattern is
    pub severity: PatternSeverity,
}

/// A counterparty flagged against an external risk source.
/// Reserved extension point; no denylist is wired in yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct RiskConnection {
    /// The flagged counterparty address
    pub address: String,
    /// Why the connection was flagged
    pub reason: String,
}

/// Counterparty cluster derived from the merged transaction set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct NetworkAnalysis {
    /// Count of distinct counterparty addresses observed
    pub cluster_size: usize,
    /// Up to 20 sample counterparty addresses, encounter order
    pub sample_addresses: Vec<String>,
    /// Reserved, empty by default
    pub risk_connections: Vec<RiskConnection>,
    /// Detected patterns with severity
    pub patterns: Vec<NetworkPattern>,
}

/// The canonical merged record returned by a wallet analysis.
///
/// Constructed once per call and never partially populated: either the
/// full record is built or the analysis fails entirely.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AggregatedWalletData {
    /// The analyzed address
    #[schema(example = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa")]
    pub address: String,
    /// Maximum balance reported by any successful provider, in BTC
    pub balance: f64,
    /// Maximum transaction count reported by any successful provider
    pub transaction_count: u64,
    /// Earliest activity across providers that report one
    pub first_seen: Option<DateTime<Utc>>,
    /// Latest activity across providers that report one
    pub last_seen: Option<DateTime<Utc>>,
    /// Maximum lifetime received amount, in BTC
    pub total_received: f64,
    /// Maximum lifetime sent amount, in BTC
    pub total_sent: f64,
    /// Heuristic risk score, 0-100
    #[schema(example = 35)]
    pub risk_score: u8,
    /// Human-readable labels for each risk rule that fired
    pub risk_factors: Vec<String>,
    /// Percentage of configured providers that contributed, 0-100
    #[schema(example = 75)]
    pub confidence: u8,
    /// Quality label derived from the contributing-provider count
    pub data_quality: DataQuality,
    /// Names of the providers that actually contributed
    pub sources: Vec<String>,
    /// Up to 50 most-recent transactions, deduplicated, newest first
    pub transactions: Vec<Transaction>,
    /// Counterparty cluster analysis
    pub network: NetworkAnalysis,
}

/// Health of one provider's request budget
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProviderHealth {
    /// Budget remaining in the current window
    Healthy,
    /// Budget exhausted until the window rolls over
    Limited,
}

impl ProviderHealth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Limited => "limited",
        }
    }
}

impl std::fmt::Display for ProviderHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Monitoring view of one provider's remaining request budget
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProviderApiStatus {
    /// Provider name
    #[schema(example = "blockchain_info")]
    pub provider: String,
    /// Requests left in the current rolling window
    #[schema(example = 280)]
    pub remaining_requests: u32,
    /// Derived health label
    pub status: ProviderHealth,
}

/// Request body for the analyze endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AnalyzeWalletRequest {
    /// The address to analyze
    #[validate(length(min = 1, message = "Address is required"))]
    #[schema(example = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa")]
    pub address: String,
}

/// Health status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All provider budgets available
    Healthy,
    /// Some provider budgets exhausted
    Degraded,
    /// No provider budget available
    Unhealthy,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Overall status
    pub status: HealthStatus,
    /// Providers with budget remaining
    pub providers_available: usize,
    /// Total configured providers
    pub providers_total: usize,
    /// Entries currently held in the snapshot cache
    pub cache_entries: usize,
    /// Current server timestamp
    pub timestamp: DateTime<Utc>,
    /// Application version
    #[schema(example = "0.1.0")]
    pub version: String,
}

impl HealthResponse {
    #[must_use]
    pub fn new(providers_available: usize, providers_total: usize, cache_entries: usize) -> Self {
        let status = if providers_available == providers_total {
            HealthStatus::Healthy
        } else if providers_available > 0 {
            HealthStatus::Degraded
        } else {
            HealthStatus::Unhealthy
        };
        Self {
            status,
            providers_available,
            providers_total,
            cache_entries,
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Error response structure
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error details
    pub error: ErrorDetail,
}

/// Error detail structure
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Error type identifier
    #[schema(example = "all_providers_failed")]
    pub r#type: String,
    /// Human-readable error message
    #[schema(example = "All 4 data providers failed; no wallet data available")]
    pub message: String,
}

/// Rate limit exceeded response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RateLimitResponse {
    /// Error details
    pub error: ErrorDetail,
    /// Seconds until the inbound rate limit resets
    #[schema(example = 60)]
    pub retry_after: u64,
}
