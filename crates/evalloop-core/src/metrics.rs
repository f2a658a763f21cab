//! Global atomic counters for evalloop observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. at the end of a batch).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters, safe to bump from any task.
pub struct Metrics {
    attempts: AtomicU64,
    generation_failures: AtomicU64,
    runs_accepted: AtomicU64,
    runs_exhausted: AtomicU64,
    emissions_sent: AtomicU64,
    emissions_failed: AtomicU64,
    emissions_skipped: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of every counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub attempts: u64,
    pub generation_failures: u64,
    pub runs_accepted: u64,
    pub runs_exhausted: u64,
    pub emissions_sent: u64,
    pub emissions_failed: u64,
    pub emissions_skipped: u64,
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            attempts: AtomicU64::new(0),
            generation_failures: AtomicU64::new(0),
            runs_accepted: AtomicU64::new(0),
            runs_exhausted: AtomicU64::new(0),
            emissions_sent: AtomicU64::new(0),
            emissions_failed: AtomicU64::new(0),
            emissions_skipped: AtomicU64::new(0),
        }
    }

    pub fn inc_attempts(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "attempts", "counter incremented");
    }

    pub fn inc_generation_failures(&self) {
        self.generation_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "generation_failures", "counter incremented");
    }

    pub fn inc_runs_accepted(&self) {
        self.runs_accepted.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "runs_accepted", "counter incremented");
    }

    pub fn inc_runs_exhausted(&self) {
        self.runs_exhausted.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "runs_exhausted", "counter incremented");
    }

    pub fn inc_emissions_sent(&self) {
        self.emissions_sent.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "emissions_sent", "counter incremented");
    }

    pub fn inc_emissions_failed(&self) {
        self.emissions_failed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "emissions_failed", "counter incremented");
    }

    pub fn inc_emissions_skipped(&self) {
        self.emissions_skipped.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "emissions_skipped", "counter incremented");
    }

    /// Read every counter at once.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            attempts: self.attempts.load(Ordering::Relaxed),
            generation_failures: self.generation_failures.load(Ordering::Relaxed),
            runs_accepted: self.runs_accepted.load(Ordering::Relaxed),
            runs_exhausted: self.runs_exhausted.load(Ordering::Relaxed),
            emissions_sent: self.emissions_sent.load(Ordering::Relaxed),
            emissions_failed: self.emissions_failed.load(Ordering::Relaxed),
            emissions_skipped: self.emissions_skipped.load(Ordering::Relaxed),
        }
    }

    /// Emit all current counter values as a single `info!` event.
    ///
    /// Call this at natural boundaries (end of a batch, service tick, etc.)
    /// rather than on every increment.
    pub fn flush(&self) {
        let s = self.snapshot();
        tracing::info!(
            metric = "flush",
            attempts = s.attempts,
            generation_failures = s.generation_failures,
            runs_accepted = s.runs_accepted,
            runs_exhausted = s.runs_exhausted,
            emissions_sent = s.emissions_sent,
            emissions_failed = s.emissions_failed,
            emissions_skipped = s.emissions_skipped,
        );
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        for counter in [
            &self.attempts,
            &self.generation_failures,
            &self.runs_accepted,
            &self.runs_exhausted,
            &self.emissions_sent,
            &self.emissions_failed,
            &self.emissions_skipped,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment() {
        let m = Metrics::new();
        m.inc_attempts();
        m.inc_attempts();
        m.inc_generation_failures();
        m.inc_runs_exhausted();
        m.inc_emissions_skipped();

        let s = m.snapshot();
        assert_eq!(s.attempts, 2);
        assert_eq!(s.generation_failures, 1);
        assert_eq!(s.runs_exhausted, 1);
        assert_eq!(s.emissions_skipped, 1);
        assert_eq!(s.runs_accepted, 0);
    }

    #[test]
    fn reset_zeroes_all() {
        let m = Metrics::new();
        m.inc_attempts();
        m.inc_runs_accepted();
        m.inc_emissions_sent();
        m.inc_emissions_failed();
        m.reset();
        assert_eq!(m.snapshot(), MetricsSnapshot::default());
    }
}
