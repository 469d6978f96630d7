//! Application layer containing business logic and shared state.

pub mod aggregator;
pub mod network;
pub mod risk;
pub mod state;

pub use aggregator::WalletAnalysisService;
pub use network::analyze_counterparties;
pub use risk::{RiskAssessment, score_wallet, score_wallet_at};
pub use state::AppState;
