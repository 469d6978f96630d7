//! Per-provider request budgets over a rolling hourly window.
//!
//! Windows reset lazily on the first check after expiry; no background
//! timer is involved. An unconfigured provider name is always allowed
//! (fail-open) and reports a generous default remaining budget.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::one::RefMut;
use tracing::debug;

use crate::domain::{ProviderApiStatus, ProviderHealth};

/// Rolling window length: one hour
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(3600);

/// Remaining budget reported for provider names with no configured maximum
pub const FAIL_OPEN_REMAINING: u32 = 1000;

/// Static per-provider hourly budgets.
///
/// `coingecko` is the auxiliary price-lookup budget; it has no fetch
/// adapter but shares the same bookkeeping.
#[derive(Debug, Clone)]
pub struct RateLimitBudgets {
    budgets: BTreeMap<String, u32>,
    window: Duration,
}

impl Default for RateLimitBudgets {
    fn default() -> Self {
        let mut budgets = BTreeMap::new();
        budgets.insert("blockchain_info".to_string(), 300);
        budgets.insert("blockstream".to_string(), 200);
        budgets.insert("blockcypher".to_string(), 100);
        budgets.insert("blockchair".to_string(), 100);
        budgets.insert("coingecko".to_string(), 1000);
        Self {
            budgets,
            window: DEFAULT_WINDOW,
        }
    }
}

impl RateLimitBudgets {
    /// Custom budgets with the default hourly window
    pub fn new(budgets: BTreeMap<String, u32>) -> Self {
        Self {
            budgets,
            window: DEFAULT_WINDOW,
        }
    }

    /// Override the window length; intended for tests simulating rollover
    #[must_use]
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    fn max_for(&self, provider: &str) -> Option<u32> {
        self.budgets.get(provider).copied()
    }
}

#[derive(Debug)]
struct WindowState {
    count: u32,
    resets_at: Instant,
}

/// Tracks request counts per provider against the configured budgets.
///
/// Shared mutable state: every adapter call mutates it, so the map is
/// concurrent and safe under overlapping analyses.
pub struct ProviderRateLimiter {
    budgets: RateLimitBudgets,
    windows: DashMap<String, WindowState>,
}

impl Default for ProviderRateLimiter {
    fn default() -> Self {
        Self::new(RateLimitBudgets::default())
    }
}

impl ProviderRateLimiter {
    pub fn new(budgets: RateLimitBudgets) -> Self {
        Self {
            budgets,
            windows: DashMap::new(),
        }
    }

    /// Fetch the provider's window, rolling it over if it has expired
    fn window_mut(&self, provider: &str) -> RefMut<'_, String, WindowState> {
        let now = Instant::now();
        let mut entry = self
            .windows
            .entry(provider.to_string())
            .or_insert_with(|| WindowState {
                count: 0,
                resets_at: now + self.budgets.window,
            });
        if now >= entry.resets_at {
            debug!(provider, "rate-limit window rolled over");
            entry.count = 0;
            entry.resets_at = now + self.budgets.window;
        }
        entry
    }

    /// True iff the current window's count is below the provider's maximum.
    /// Unconfigured providers are always allowed.
    pub fn can_make_request(&self, provider: &str) -> bool {
        match self.budgets.max_for(provider) {
            Some(max) => self.window_mut(provider).count < max,
            None => true,
        }
    }

    /// Count one request against the provider's current window
    pub fn record_request(&self, provider: &str) {
        if self.budgets.max_for(provider).is_some() {
            let mut window = self.window_mut(provider);
            window.count += 1;
        }
    }

    /// Budget left in the current window, floored at zero
    pub fn remaining_requests(&self, provider: &str) -> u32 {
        match self.budgets.max_for(provider) {
            Some(max) => max.saturating_sub(self.window_mut(provider).count),
            None => FAIL_OPEN_REMAINING,
        }
    }

    /// Monitoring snapshot for every configured budget, in name order
    pub fn statuses(&self) -> Vec<ProviderApiStatus> {
        self.budgets
            .budgets
            .keys()
            .map(|provider| {
                let remaining = self.remaining_requests(provider);
                ProviderApiStatus {
                    provider: provider.clone(),
                    remaining_requests: remaining,
                    status: if remaining > 0 {
                        ProviderHealth::Healthy
                    } else {
                        ProviderHealth::Limited
                    },
                }
            })
            .collect()
    }
}
