//! Per-process metrics counters and a bounded latency ring buffer (§4.5.3).
//!
//! Everything lives behind one mutex — the hot request path only ever holds
//! it for the duration of a handful of arithmetic updates, never across an
//! `.await` point.

use std::collections::VecDeque;
use std::sync::Mutex;

const LATENCY_RING_CAPACITY: usize = 1000;

struct MetricsState {
    total_predictions: u64,
    successful_predictions: u64,
    failed_predictions: u64,
    cache_hits: u64,
    cache_misses: u64,
    total_llm_tokens: u64,
    latencies_ms: VecDeque<u64>,
}

impl Default for MetricsState {
    fn default() -> Self {
        Self {
            total_predictions: 0,
            successful_predictions: 0,
            failed_predictions: 0,
            cache_hits: 0,
            cache_misses: 0,
            total_llm_tokens: 0,
            latencies_ms: VecDeque::with_capacity(LATENCY_RING_CAPACITY),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub total_predictions: u64,
    pub successful_predictions: u64,
    pub failed_predictions: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub total_llm_tokens: u64,
    pub error_rate: f64,
    pub average_processing_time_ms: f64,
    pub p95_latency_ms: u64,
    pub p99_latency_ms: u64,
}

/// Process-shared prediction metrics (§4.5.3).
#[derive(Default)]
pub struct Metrics {
    state: Mutex<MetricsState>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_latency(state: &mut MetricsState, latency_ms: u64) {
        if state.latencies_ms.len() >= LATENCY_RING_CAPACITY {
            state.latencies_ms.pop_front();
        }
        state.latencies_ms.push_back(latency_ms);
    }

    pub fn record_success(&self, latency_ms: u64, tokens_used: u32) {
        let mut state = self.state.lock().expect("metrics lock poisoned");
        state.total_predictions += 1;
        state.successful_predictions += 1;
        state.total_llm_tokens += tokens_used as u64;
        Self::push_latency(&mut state, latency_ms);
    }

    pub fn record_failure(&self, latency_ms: u64) {
        let mut state = self.state.lock().expect("metrics lock poisoned");
        state.total_predictions += 1;
        state.failed_predictions += 1;
        Self::push_latency(&mut state, latency_ms);
    }

    pub fn record_cache_hit(&self) {
        self.state.lock().expect("metrics lock poisoned").cache_hits += 1;
    }

    pub fn record_cache_miss(&self) {
        self.state.lock().expect("metrics lock poisoned").cache_misses += 1;
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let state = self.state.lock().expect("metrics lock poisoned");

        let mut sorted: Vec<u64> = state.latencies_ms.iter().copied().collect();
        sorted.sort_unstable();
        let percentile = |p: f64| -> u64 {
            if sorted.is_empty() {
                return 0;
            }
            let idx = ((sorted.len() as f64 - 1.0) * p).round() as usize;
            sorted[idx]
        };

        let average_processing_time_ms = if sorted.is_empty() {
            0.0
        } else {
            sorted.iter().sum::<u64>() as f64 / sorted.len() as f64
        };

        let error_rate = if state.total_predictions == 0 {
            0.0
        } else {
            state.failed_predictions as f64 / state.total_predictions as f64
        };

        MetricsSnapshot {
            total_predictions: state.total_predictions,
            successful_predictions: state.successful_predictions,
            failed_predictions: state.failed_predictions,
            cache_hits: state.cache_hits,
            cache_misses: state.cache_misses,
            total_llm_tokens: state.total_llm_tokens,
            error_rate,
            average_processing_time_ms,
            p95_latency_ms: percentile(0.95),
            p99_latency_ms: percentile(0.99),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_rate_reflects_failures() {
        let metrics = Metrics::new();
        metrics.record_success(10, 100);
        metrics.record_failure(20);
        metrics.record_failure(30);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_predictions, 3);
        assert!((snapshot.error_rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn ring_buffer_caps_at_1000_entries() {
        let metrics = Metrics::new();
        for i in 0..1500u64 {
            metrics.record_success(i, 0);
        }
        let snapshot = metrics.snapshot();
        assert!(snapshot.p95_latency_ms >= 500);
    }

    #[test]
    fn cache_hit_and_miss_counters() {
        let metrics = Metrics::new();
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_miss();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.cache_hits, 2);
        assert_eq!(snapshot.cache_misses, 1);
    }
}
