//! Fixed-window request limiting per client key.
//!
//! State lives behind [`RateLimitStore`]; the in-memory store is per process,
//! so horizontally scaled deployments need a shared implementation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{debug, error, warn};

use super::ScanError;

/// Counter for the window a key is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    pub count: u32,
    pub reset_at: Instant,
}

impl WindowState {
    fn is_expired(&self, now: Instant) -> bool {
        now > self.reset_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { count: u32 },
    Limited { reset_at: Instant },
}

#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Current window for `key`, if one exists and has not expired.
    async fn get(&self, key: &str, now: Instant) -> anyhow::Result<Option<WindowState>>;

    /// Counts one request against `key`.
    ///
    /// Must be atomic per key. Starts a fresh window when none exists or the
    /// old one has expired; refuses without counting once `limit` is reached.
    async fn increment(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
        now: Instant,
    ) -> anyhow::Result<RateDecision>;

    /// Drops the window for `key`. Returns whether one existed.
    async fn expire(&self, key: &str) -> anyhow::Result<bool>;
}

/// Key count above which `increment` sweeps out expired windows.
const DEFAULT_PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug)]
pub struct MemoryRateLimitStore {
    windows: DashMap<String, WindowState>,
    prune_threshold: usize,
}

impl Default for MemoryRateLimitStore {
    fn default() -> Self {
        Self::with_prune_threshold(DEFAULT_PRUNE_THRESHOLD)
    }
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prune_threshold(prune_threshold: usize) -> Self {
        Self {
            windows: DashMap::new(),
            prune_threshold,
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.windows.len()
    }

    fn prune_expired(&self, now: Instant) {
        let before = self.windows.len();
        self.windows.retain(|_, w| !w.is_expired(now));
        debug!(before, after = self.windows.len(), "pruned expired rate limit windows");
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    async fn get(&self, key: &str, now: Instant) -> anyhow::Result<Option<WindowState>> {
        Ok(self
            .windows
            .get(key)
            .map(|w| *w)
            .filter(|w| !w.is_expired(now)))
    }

    async fn increment(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
        now: Instant,
    ) -> anyhow::Result<RateDecision> {
        // Must run before the entry guard is taken; `retain` locks every shard.
        if self.windows.len() >= self.prune_threshold {
            self.prune_expired(now);
        }

        // The entry guard holds the shard lock for the whole read-modify-write.
        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert(WindowState {
                count: 0,
                reset_at: now + window,
            });
        let state = entry.value_mut();

        if state.is_expired(now) {
            *state = WindowState {
                count: 0,
                reset_at: now + window,
            };
        }
        if state.count >= limit {
            return Ok(RateDecision::Limited {
                reset_at: state.reset_at,
            });
        }
        state.count += 1;
        Ok(RateDecision::Allowed { count: state.count })
    }

    async fn expire(&self, key: &str) -> anyhow::Result<bool> {
        Ok(self.windows.remove(key).is_some())
    }
}

/// Per-IP limiter used in front of scan submissions.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, limit: u32, window: Duration) -> Self {
        Self {
            store,
            limit,
            window,
        }
    }

    pub async fn check(&self, key: &str) -> Result<(), ScanError> {
        self.check_at(key, Instant::now()).await
    }

    /// A failing store lets the request through.
    pub async fn check_at(&self, key: &str, now: Instant) -> Result<(), ScanError> {
        match self.store.increment(key, self.limit, self.window, now).await {
            Ok(RateDecision::Allowed { .. }) => Ok(()),
            Ok(RateDecision::Limited { .. }) => {
                warn!(%key, limit = self.limit, "rate limit exceeded");
                Err(ScanError::RateLimited)
            }
            Err(e) => {
                error!(error = %e, %key, "rate limit store failed; allowing request");
                Ok(())
            }
        }
    }
}
