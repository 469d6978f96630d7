//! Router construction and inbound rate limiting.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{Next, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::app::AppState;
use crate::domain::{ErrorDetail, RateLimitResponse};

use super::admin::{cache_stats_handler, clear_cache_handler};
use super::handlers::{
    ApiDoc, analyze_wallet_handler, health_check_handler, liveness_handler,
    provider_status_handler, readiness_handler,
};

/// Whole-request timeout for the HTTP surface; generous compared to the
/// per-adapter deadline so a full fan-out still fits.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Inbound rate-limit configuration for the HTTP surface.
///
/// Separate concern from the per-provider outbound budgets: this guards
/// the service itself, those guard the upstream APIs.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub requests_per_minute: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 60,
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let requests_per_minute = std::env::var("API_RATE_LIMIT_PER_MINUTE")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(60);
        Self {
            requests_per_minute,
        }
    }
}

async fn rate_limit_middleware(
    State(limiter): State<Arc<DefaultDirectRateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    if limiter.check().is_err() {
        let body = Json(RateLimitResponse {
            error: ErrorDetail {
                r#type: "rate_limited".to_string(),
                message: "Too many requests, slow down".to_string(),
            },
            retry_after: 60,
        });
        return (StatusCode::TOO_MANY_REQUESTS, body).into_response();
    }
    next.run(request).await
}

fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/analyze", post(analyze_wallet_handler))
        .route("/providers/status", get(provider_status_handler))
        .route("/admin/cache/clear", post(clear_cache_handler))
        .route("/admin/cache/stats", get(cache_stats_handler))
        .route("/health", get(health_check_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .with_state(state)
}

/// Build the router without inbound rate limiting
pub fn create_router(state: Arc<AppState>) -> Router {
    routes(state)
}

/// Build the router with a governor-backed inbound rate limit
pub fn create_router_with_rate_limit(state: Arc<AppState>, config: RateLimitConfig) -> Router {
    let quota = Quota::per_minute(
        NonZeroU32::new(config.requests_per_minute).unwrap_or(NonZeroU32::new(60).unwrap()),
    );
    let limiter: Arc<DefaultDirectRateLimiter> = Arc::new(RateLimiter::direct(quota));

    routes(state).layer(from_fn_with_state(limiter, rate_limit_middleware))
}
