//! HTTP request handlers with OpenAPI documentation.

use std::sync::Arc;

use axum::{
    Json,
    http::StatusCode,
    response::IntoResponse,
    extract::State,
};
use utoipa::OpenApi;
use tracing::error;
use validator::Validate;

use crate::app::AppState;
use crate::domain::{
    AggregatedWalletData, AnalyzeWalletRequest, AppError, ErrorDetail, ErrorResponse,
    HealthResponse, HealthStatus, ProviderApiStatus, ProviderError, RateLimitResponse,
    ValidationError,
};

use super::admin::{CacheClearResponse, CacheStatsResponse};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Wallet Intel Aggregator API",
        version = "0.1.0",
        description = "Multi-provider blockchain wallet analysis with heuristic risk scoring",
        license(
            name = "MIT"
        )
    ),
    paths(
        analyze_wallet_handler,
        provider_status_handler,
        health_check_handler,
        liveness_handler,
        readiness_handler,
        super::admin::clear_cache_handler,
        super::admin::cache_stats_handler,
    ),
    components(
        schemas(
            AnalyzeWalletRequest,
            AggregatedWalletData,
            crate::domain::DataQuality,
            crate::domain::Transaction,
            crate::domain::TxEndpoint,
            crate::domain::NetworkAnalysis,
            crate::domain::NetworkPattern,
            crate::domain::PatternSeverity,
            crate::domain::RiskConnection,
            ProviderApiStatus,
            crate::domain::ProviderHealth,
            ApiStatusResponse,
            HealthResponse,
            HealthStatus,
            ErrorResponse,
            ErrorDetail,
            RateLimitResponse,
            CacheClearResponse,
            CacheStatsResponse,
        )
    ),
    tags(
        (name = "analysis", description = "Wallet analysis endpoints"),
        (name = "monitoring", description = "Provider budget monitoring endpoints"),
        (name = "admin", description = "Administrative cache endpoints"),
        (name = "health", description = "Health check endpoints")
    )
)]
pub struct ApiDoc;

/// Response for the provider status listing
#[derive(Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ApiStatusResponse {
    /// Number of tracked budgets
    pub count: usize,
    /// Per-provider remaining budget and health
    pub providers: Vec<ProviderApiStatus>,
}

/// Analyze a wallet address
///
/// Fans out to every configured data provider concurrently, reconciles the
/// answers into one canonical record, and attaches risk and counterparty
/// analyses. Partial provider failures lower `confidence` and
/// `data_quality`; the call only fails when every provider fails.
#[utoipa::path(
    post,
    path = "/analyze",
    tag = "analysis",
    request_body = AnalyzeWalletRequest,
    responses(
        (status = 200, description = "Analysis complete", body = AggregatedWalletData),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = RateLimitResponse),
        (status = 502, description = "All data providers failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn analyze_wallet_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AnalyzeWalletRequest>,
) -> Result<Json<AggregatedWalletData>, AppError> {
    payload.validate().map_err(|e| {
        AppError::Validation(ValidationError::InvalidField {
            field: "address".to_string(),
            message: e.to_string(),
        })
    })?;

    let result = state.service.analyze_wallet(payload.address.trim()).await?;
    Ok(Json(result))
}

/// List per-provider request budgets
#[utoipa::path(
    get,
    path = "/providers/status",
    tag = "monitoring",
    responses(
        (status = 200, description = "Provider budget list", body = ApiStatusResponse)
    )
)]
pub async fn provider_status_handler(
    State(state): State<Arc<AppState>>,
) -> Json<ApiStatusResponse> {
    let providers = state.service.api_status();
    Json(ApiStatusResponse {
        count: providers.len(),
        providers,
    })
}

/// Detailed health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Health status", body = HealthResponse)
    )
)]
pub async fn health_check_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let health = HealthResponse::new(
        state.service.providers_available(),
        state.service.provider_count(),
        state.service.cache_stats().entries,
    );
    Json(health)
}

/// Kubernetes liveness probe
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "health",
    responses(
        (status = 200, description = "Application is alive")
    )
)]
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

/// Kubernetes readiness probe
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Application is ready to serve traffic"),
        (status = 503, description = "No provider budget available")
    )
)]
pub async fn readiness_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.service.providers_available() > 0 {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_type, message) = match &self {
            AppError::AllProvidersFailed { .. } => (
                StatusCode::BAD_GATEWAY,
                "all_providers_failed",
                self.to_string(),
            ),
            AppError::Provider(provider_err) => match provider_err {
                ProviderError::RateLimited => (
                    StatusCode::TOO_MANY_REQUESTS,
                    "rate_limited",
                    self.to_string(),
                ),
                _ => (
                    StatusCode::BAD_GATEWAY,
                    "provider_error",
                    self.to_string(),
                ),
            },
            AppError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "configuration_error",
                self.to_string(),
            ),
            AppError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                self.to_string(),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                self.to_string(),
            ),
        };

        if status.is_server_error() {
            error!(error_type = %error_type, message = %message, "Server error");
        }

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                r#type: error_type.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}
