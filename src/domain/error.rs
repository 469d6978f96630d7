//! Error taxonomy for the aggregation core.

use thiserror::Error;

/// Failure inside a single provider adapter.
///
/// Always recovered at the adapter boundary into a failed `ProviderReport`
/// so sibling fetches keep running; never surfaces to `analyze_wallet`
/// callers on its own.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Transport-level failure (DNS, connect, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Provider returned a non-success HTTP status
    #[error("API error ({status_code}): {message}")]
    Api { status_code: u16, message: String },

    /// Response body did not match the provider's documented shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// The hourly request budget for this provider is exhausted
    #[error("Rate limit exceeded")]
    RateLimited,
}

/// Configuration errors raised during startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(String),

    #[error("Invalid configuration for {field}: {message}")]
    Invalid { field: String, message: String },
}

/// Request validation errors
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid {field}: {message}")]
    InvalidField { field: String, message: String },
}

/// Top-level application error.
#[derive(Debug, Error)]
pub enum AppError {
    /// Every configured provider failed for the requested address.
    /// The only error an analysis call surfaces to its caller.
    #[error("All {attempted} data providers failed; no wallet data available")]
    AllProvidersFailed { attempted: usize },

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_providers_failed_message_includes_count() {
        let err = AppError::AllProvidersFailed { attempted: 4 };
        assert!(err.to_string().contains('4'));
    }

    #[test]
    fn test_provider_error_converts_into_app_error() {
        let err: AppError = ProviderError::RateLimited.into();
        assert!(matches!(
            err,
            AppError::Provider(ProviderError::RateLimited)
        ));
    }

    #[test]
    fn test_api_error_message_carries_status() {
        let err = ProviderError::Api {
            status_code: 503,
            message: "unavailable".to_string(),
        };
        assert!(err.to_string().contains("503"));
    }
}
