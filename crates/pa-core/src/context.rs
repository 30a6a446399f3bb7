//! Explicit dependency injection, replacing global/singleton logger and
//! connection managers (§9). Every specialist and the orchestrator receives
//! a `Context` rather than reaching for process-wide state.

use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Source of wall-clock time. Production uses `SystemClock`; tests use a
/// `FixedClock` so TTL and timeout behavior is deterministic.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Cross-cutting configuration every layer may need, injected rather than
/// read from environment variables ad hoc at point of use.
#[derive(Debug, Clone)]
pub struct Config {
    pub cache_ttl_seconds: u64,
    pub max_cache_size: usize,
    pub timeout_seconds: u64,
    pub max_prompt_tokens: u32,
    pub rate_limit_requests: u32,
    pub rate_limit_window_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: 3600,
            max_cache_size: 1000,
            timeout_seconds: 30,
            max_prompt_tokens: 4000,
            rate_limit_requests: 100,
            rate_limit_window_seconds: 60,
        }
    }
}

/// The dependency-injection record passed to every orchestrator and
/// specialist call. Cheap to clone (everything is `Arc`-backed).
#[derive(Clone)]
pub struct Context {
    pub clock: Arc<dyn Clock>,
    pub config: Arc<Config>,
}

impl Context {
    pub fn new(clock: Arc<dyn Clock>, config: Config) -> Self {
        Self {
            clock,
            config: Arc::new(config),
        }
    }

    pub fn production(config: Config) -> Self {
        Self::new(Arc::new(SystemClock), config)
    }
}
