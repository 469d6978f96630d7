//! The API layer, containing web handlers and routing.

pub mod admin;
pub mod handlers;
pub mod router;

pub use admin::{CacheClearResponse, CacheStatsResponse, cache_stats_handler, clear_cache_handler};
pub use handlers::{ApiDoc, ApiStatusResponse};
pub use router::{RateLimitConfig, create_router, create_router_with_rate_limit};
