//! Lock-free resolution counters.
//!
//! Counters are relaxed atomics: they feed dashboards, not control flow,
//! so cross-counter consistency is not required.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Live counters for one resolution path.
#[derive(Debug, Default)]
pub struct ResolverStats {
    requests: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
    fallbacks: AtomicU64,
    processing_time_ms: AtomicU64,
}

impl ResolverStats {
    /// Create zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an incoming request.
    pub fn record_request(&self) {
        let _ = self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful resolution.
    pub fn record_success(&self) {
        let _ = self.successes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed resolution.
    pub fn record_failure(&self) {
        let _ = self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a resolution that fell through to a lower tier.
    pub fn record_fallback(&self) {
        let _ = self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Accumulate resolution wall-clock time.
    pub fn record_processing_time(&self, elapsed_ms: u64) {
        let _ = self.processing_time_ms.fetch_add(elapsed_ms, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters.
    #[must_use]
    pub fn snapshot(&self, service_type: &'static str) -> StatsSnapshot {
        StatsSnapshot {
            service_type,
            requests: self.requests.load(Ordering::Relaxed),
            successes: self.successes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            processing_time_ms: self.processing_time_ms.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of [`ResolverStats`].
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    /// Which resolution path these counters describe.
    pub service_type: &'static str,
    /// Requests received.
    pub requests: u64,
    /// Successful resolutions.
    pub successes: u64,
    /// Failed resolutions.
    pub failures: u64,
    /// Resolutions that fell through to a lower tier.
    pub fallbacks: u64,
    /// Cumulative resolution wall-clock time in milliseconds.
    pub processing_time_ms: u64,
}

impl StatsSnapshot {
    /// Fraction of requests that succeeded (0 when no requests).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.requests == 0 {
            return 0.0;
        }
        self.successes as f64 / self.requests as f64
    }

    /// Mean resolution time per successful request (0 when none).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_processing_time_ms(&self) -> f64 {
        if self.successes == 0 {
            return 0.0;
        }
        self.processing_time_ms as f64 / self.successes as f64
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let stats = ResolverStats::new();
        let snap = stats.snapshot("local");
        assert_eq!(snap.requests, 0);
        assert_eq!(snap.successes, 0);
        assert_eq!(snap.failures, 0);
        assert_eq!(snap.fallbacks, 0);
    }

    #[test]
    fn counters_accumulate() {
        let stats = ResolverStats::new();
        stats.record_request();
        stats.record_request();
        stats.record_success();
        stats.record_failure();
        stats.record_fallback();

        let snap = stats.snapshot("remote");
        assert_eq!(snap.requests, 2);
        assert_eq!(snap.successes, 1);
        assert_eq!(snap.failures, 1);
        assert_eq!(snap.fallbacks, 1);
        assert_eq!(snap.service_type, "remote");
    }

    #[test]
    fn success_rate_zero_requests() {
        let stats = ResolverStats::new();
        assert!((stats.snapshot("local").success_rate() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn success_rate_half() {
        let stats = ResolverStats::new();
        stats.record_request();
        stats.record_request();
        stats.record_success();
        assert!((stats.snapshot("local").success_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn average_processing_time() {
        let stats = ResolverStats::new();
        stats.record_success();
        stats.record_success();
        stats.record_processing_time(10);
        stats.record_processing_time(30);
        let snap = stats.snapshot("local");
        assert!((snap.average_processing_time_ms() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn average_processing_time_no_successes() {
        let stats = ResolverStats::new();
        stats.record_processing_time(10);
        assert!((stats.snapshot("local").average_processing_time_ms() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let stats = ResolverStats::new();
        let json = serde_json::to_value(stats.snapshot("local")).unwrap();
        assert!(json.get("serviceType").is_some());
        assert!(json.get("requests").is_some());
    }
}
