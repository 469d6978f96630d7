//! Infrastructure layer implementations.

pub mod cache;
pub mod providers;
pub mod rate_limit;

pub use cache::{SnapshotCache, spawn_sweeper};
pub use providers::{
    BlockCypherProvider, BlockchainInfoProvider, BlockchairProvider, BlockstreamProvider,
    FetchGate,
};
pub use rate_limit::{ProviderRateLimiter, RateLimitBudgets};
