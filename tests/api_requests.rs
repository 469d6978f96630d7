//! Integration tests for the HTTP API.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use wallet_intel_aggregator::api::{
    ApiStatusResponse, CacheClearResponse, RateLimitConfig, create_router,
    create_router_with_rate_limit,
};
use wallet_intel_aggregator::app::AppState;
use wallet_intel_aggregator::domain::{
    AggregatedWalletData, DataQuality, ErrorResponse, HealthResponse, HealthStatus,
    WalletDataProvider,
};
use wallet_intel_aggregator::infra::cache::SnapshotCache;
use wallet_intel_aggregator::infra::rate_limit::ProviderRateLimiter;
use wallet_intel_aggregator::test_utils::{MockProvider, snapshot_with};

const ADDRESS: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";

fn create_test_state(providers: Vec<Arc<dyn WalletDataProvider>>) -> Arc<AppState> {
    Arc::new(AppState::new(
        providers,
        Arc::new(SnapshotCache::new()),
        Arc::new(ProviderRateLimiter::default()),
    ))
}

fn three_of_four() -> Vec<Arc<dyn WalletDataProvider>> {
    vec![
        Arc::new(MockProvider::succeeding("provider_a", snapshot_with(1.0, 50))),
        Arc::new(MockProvider::succeeding("provider_b", snapshot_with(1.0, 40))),
        Arc::new(MockProvider::succeeding("provider_c", snapshot_with(2.0, 60))),
        Arc::new(MockProvider::failing("provider_d", "connection refused")),
    ]
}

fn analyze_request(address: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("Content-Type", "application/json")
        .body(Body::from(format!(r#"{{"address":"{}"}}"#, address)))
        .unwrap()
}

#[tokio::test]
async fn test_analyze_success() {
    let router = create_router(create_test_state(three_of_four()));

    let response = router.oneshot(analyze_request(ADDRESS)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let data: AggregatedWalletData = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(data.address, ADDRESS);
    assert_eq!(data.balance, 2.0);
    assert_eq!(data.transaction_count, 60);
    assert_eq!(data.confidence, 75);
    assert_eq!(data.data_quality, DataQuality::High);
}

#[tokio::test]
async fn test_analyze_empty_address_rejected() {
    let router = create_router(create_test_state(three_of_four()));

    let response = router.oneshot(analyze_request("")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let error: ErrorResponse = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(error.error.r#type, "validation_error");
}

#[tokio::test]
async fn test_analyze_total_failure_is_bad_gateway() {
    let providers: Vec<Arc<dyn WalletDataProvider>> = vec![
        Arc::new(MockProvider::failing("provider_a", "down")),
        Arc::new(MockProvider::failing("provider_b", "down")),
    ];
    let router = create_router(create_test_state(providers));

    let response = router.oneshot(analyze_request(ADDRESS)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let error: ErrorResponse = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(error.error.r#type, "all_providers_failed");
}

#[tokio::test]
async fn test_provider_status_lists_configured_budgets() {
    let router = create_router(create_test_state(three_of_four()));

    let request = Request::builder()
        .method("GET")
        .uri("/providers/status")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let status: ApiStatusResponse = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(status.count, 5);
    assert!(status.providers.iter().all(|p| p.remaining_requests > 0));
}

#[tokio::test]
async fn test_admin_cache_clear() {
    let router = create_router(create_test_state(three_of_four()));

    let request = Request::builder()
        .method("POST")
        .uri("/admin/cache/clear")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let result: CacheClearResponse = serde_json::from_slice(&body_bytes).unwrap();
    assert!(result.success);
    assert_eq!(result.entries_removed, 0);
}

#[tokio::test]
async fn test_health_endpoint() {
    let router = create_router(create_test_state(three_of_four()));

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let health: HealthResponse = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(health.status, HealthStatus::Healthy);
    assert_eq!(health.providers_total, 4);
}

#[tokio::test]
async fn test_liveness_probe() {
    let router = create_router(create_test_state(three_of_four()));

    let request = Request::builder()
        .method("GET")
        .uri("/health/live")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_inbound_rate_limit_returns_429() {
    let state = create_test_state(three_of_four());
    let router = create_router_with_rate_limit(
        state,
        RateLimitConfig {
            requests_per_minute: 1,
        },
    );

    let first = router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health/live")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health/live")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
}
