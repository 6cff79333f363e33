use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::app_error::{AppError, AppResult};

/// Which cap applies to a request. Every request counts against `Global`;
/// order creation and admin calls additionally count against their own caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateScope {
    Global,
    OrderCreate,
    Admin,
}

/// Trait for rate limiting implementations.
#[async_trait]
pub trait RateLimiterTrait: Send + Sync {
    /// Returns Ok(()) if within limits, Err(AppError::RateLimited) if exceeded.
    async fn check(&self, scope: RateScope, client: &str) -> AppResult<()>;
}

struct Bucket {
    count: u64,
    window_start: Instant,
}

/// Fixed-window counter keyed by (scope, client address). Counters live in
/// process memory, like every other store in this service; a shared limiter
/// substitutes behind the same trait for multi-instance deployments.
pub struct FixedWindowRateLimiter {
    window: Duration,
    per_ip: u64,
    per_create: u64,
    per_admin: u64,
    buckets: Mutex<HashMap<(RateScope, String), Bucket>>,
}

impl FixedWindowRateLimiter {
    pub fn new(window_secs: u64, per_ip: u64, per_create: u64, per_admin: u64) -> Self {
        Self {
            window: Duration::from_secs(window_secs),
            per_ip,
            per_create,
            per_admin,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    fn limit_for(&self, scope: RateScope) -> u64 {
        match scope {
            RateScope::Global => self.per_ip,
            RateScope::OrderCreate => self.per_create,
            RateScope::Admin => self.per_admin,
        }
    }

    fn bump(&self, scope: RateScope, client: &str) -> AppResult<()> {
        let mut buckets = self
            .buckets
            .lock()
            .map_err(|_| AppError::Internal("rate limiter lock poisoned".into()))?;

        let now = Instant::now();
        let bucket = buckets
            .entry((scope, client.to_string()))
            .or_insert(Bucket {
                count: 0,
                window_start: now,
            });
        if now.duration_since(bucket.window_start) >= self.window {
            bucket.count = 0;
            bucket.window_start = now;
        }
        bucket.count += 1;

        if bucket.count > self.limit_for(scope) {
            return Err(AppError::RateLimited);
        }
        Ok(())
    }
}

#[async_trait]
impl RateLimiterTrait for FixedWindowRateLimiter {
    async fn check(&self, scope: RateScope, client: &str) -> AppResult<()> {
        self.bump(scope, client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn allows_up_to_the_cap() {
        let limiter = FixedWindowRateLimiter::new(60, 3, 1, 1);
        for _ in 0..3 {
            limiter.check(RateScope::Global, "1.2.3.4").await.unwrap();
        }
        let err = limiter
            .check(RateScope::Global, "1.2.3.4")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RateLimited));
    }

    #[tokio::test]
    async fn clients_are_tracked_separately() {
        let limiter = FixedWindowRateLimiter::new(60, 1, 1, 1);
        limiter.check(RateScope::Global, "1.2.3.4").await.unwrap();
        limiter.check(RateScope::Global, "5.6.7.8").await.unwrap();
    }

    #[tokio::test]
    async fn scopes_are_tracked_separately() {
        let limiter = FixedWindowRateLimiter::new(60, 10, 1, 1);
        limiter
            .check(RateScope::OrderCreate, "1.2.3.4")
            .await
            .unwrap();
        // The create cap is spent, the admin cap is not.
        let err = limiter
            .check(RateScope::OrderCreate, "1.2.3.4")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RateLimited));
        limiter.check(RateScope::Admin, "1.2.3.4").await.unwrap();
    }

    #[tokio::test]
    async fn counts_reset_when_the_window_elapses() {
        // Zero-length window: every check starts a fresh window.
        let limiter = FixedWindowRateLimiter::new(0, 1, 1, 1);
        limiter.check(RateScope::Global, "1.2.3.4").await.unwrap();
        limiter.check(RateScope::Global, "1.2.3.4").await.unwrap();
    }
}
