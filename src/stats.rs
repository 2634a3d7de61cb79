use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Conversion counters owned by one converter.
#[derive(Debug, Default)]
pub struct ConversionStats {
    total: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
}

/// A point-in-time copy of [`ConversionStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
}

impl StatsSnapshot {
    /// Fraction of conversions that succeeded, `0.0` when none ran.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.total as f64
        }
    }
}

impl ConversionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record<T, E>(&self, result: &Result<T, E>) {
        self.total.fetch_add(1, Ordering::Relaxed);
        let counter = if result.is_ok() {
            &self.succeeded
        } else {
            &self.failed
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total: self.total.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.total.store(0, Ordering::Relaxed);
        self.succeeded.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
    }
}
