//! Multi-provider blockchain wallet intelligence aggregator.
//!
//! The core fans out concurrent requests to several independent,
//! partially-overlapping block-explorer APIs, reconciles their disagreeing
//! answers into one canonical [`domain::AggregatedWalletData`] record, and
//! derives heuristic risk and counterparty analyses. Individual provider
//! failures are contained at the adapter boundary; only a total failure
//! aborts an analysis.
//!
//! Layers:
//! - [`domain`]: data model, provider trait, error taxonomy
//! - [`infra`]: snapshot cache, rate-limit windows, provider adapters
//! - [`app`]: orchestration, risk scoring, network analysis
//! - [`api`]: HTTP surface consumed by the presentation layer

pub mod api;
pub mod app;
pub mod domain;
pub mod infra;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
