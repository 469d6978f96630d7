//! Shared test helpers, available behind the `test-utils` feature.

pub mod mocks;

pub use mocks::{MockProvider, snapshot_with, transaction_at};
