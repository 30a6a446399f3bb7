//! Token-bucket rate limiter shared across specialist service calls (§4.2.3, §5).
//!
//! One `RateLimiter` is constructed per `Context` and shared by `Arc` across
//! every specialist call the way `InMemoryAuditWriter` is shared across
//! scenario steps — `std::sync::Mutex` behind `Arc`, never held across an
//! `.await` point.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// A simple fixed-window token-bucket: at most `max_requests` calls are
/// admitted within any `window`-second sliding span; callers beyond the
/// limit cooperatively wait.
pub struct RateLimiter {
    inner: Arc<Mutex<Inner>>,
    max_requests: u32,
    window: Duration,
}

struct Inner {
    /// Timestamps of admitted requests still inside the current window.
    timestamps: Vec<Instant>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window_seconds: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                timestamps: Vec::new(),
            })),
            max_requests,
            window: Duration::from_secs(window_seconds),
        }
    }

    /// Returns `Some(wait)` with the duration the caller should sleep before
    /// retrying, or `None` when a token is immediately available (and the
    /// request has already been recorded).
    pub fn try_acquire(&self) -> Option<Duration> {
        let now = Instant::now();
        let mut inner = self.inner.lock().expect("rate limiter lock poisoned");
        inner.timestamps.retain(|t| now.duration_since(*t) < self.window);

        if (inner.timestamps.len() as u32) < self.max_requests {
            inner.timestamps.push(now);
            None
        } else {
            let oldest = inner.timestamps[0];
            let wait = self.window.saturating_sub(now.duration_since(oldest));
            Some(wait)
        }
    }

    /// Cooperatively wait (via `tokio::time::sleep`) until a token is
    /// available, then consume it.
    pub async fn acquire(&self) {
        loop {
            match self.try_acquire() {
                None => return,
                Some(wait) => tokio::time::sleep(wait.max(Duration::from_millis(1))).await,
            }
        }
    }
}

impl Clone for RateLimiter {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            max_requests: self.max_requests,
            window: self.window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_up_to_max_requests_immediately() {
        let limiter = RateLimiter::new(3, 60);
        assert!(limiter.try_acquire().is_none());
        assert!(limiter.try_acquire().is_none());
        assert!(limiter.try_acquire().is_none());
        assert!(limiter.try_acquire().is_some());
    }

    #[tokio::test]
    async fn acquire_eventually_returns_once_window_allows() {
        let limiter = RateLimiter::new(1, 0);
        limiter.acquire().await;
        // window_seconds = 0 means the timestamp is always stale on next check.
        limiter.acquire().await;
    }
}
