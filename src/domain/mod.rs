//! Domain layer containing core business types, traits, and error definitions.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{AppError, ConfigError, ProviderError, ValidationError};
pub use traits::WalletDataProvider;
pub use types::{
    AggregatedWalletData, AnalyzeWalletRequest, DataQuality, ErrorDetail, ErrorResponse,
    FetchOutcome, HealthResponse, HealthStatus, NetworkAnalysis, NetworkPattern, PatternSeverity,
    ProviderApiStatus, ProviderHealth, ProviderReport, RateLimitResponse, RiskConnection,
    Transaction, TxEndpoint, WalletSnapshot,
};
