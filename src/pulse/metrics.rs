//! Metrics collection for scheduler runs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::pulse::unit::UnitOutcome;

/// Summary of one scheduler run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerStats {
    /// Units in the dataset.
    pub units_total: u64,

    /// Units whose function returned a value.
    pub units_succeeded: u64,

    /// Units whose function returned an error or panicked.
    pub units_failed: u64,

    /// Units never started because the run was cancelled.
    pub units_cancelled: u64,

    /// Pulses whose barrier was reached.
    pub pulses_completed: u64,

    /// Highest number of simultaneously active units.
    pub peak_active: u64,

    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

/// Collector for gathering metrics during a run.
#[derive(Debug, Default)]
pub struct SchedulerMetricsCollector {
    units_total: AtomicU64,
    units_succeeded: AtomicU64,
    units_failed: AtomicU64,
    units_cancelled: AtomicU64,
    pulses_completed: AtomicU64,
}

impl SchedulerMetricsCollector {
    pub fn new(units_total: usize) -> Self {
        let collector = Self::default();
        collector
            .units_total
            .store(units_total as u64, Ordering::Relaxed);
        collector
    }

    /// Record the outcome of one unit.
    pub fn record_outcome<R>(&self, outcome: &UnitOutcome<R>) {
        let counter = match outcome {
            UnitOutcome::Completed(_) => &self.units_succeeded,
            UnitOutcome::Failed(_) => &self.units_failed,
            UnitOutcome::Cancelled => &self.units_cancelled,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a pulse reaching its barrier.
    pub fn record_pulse(&self) {
        self.pulses_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current metrics snapshot.
    pub fn snapshot(&self, peak_active: usize, elapsed: Duration) -> SchedulerStats {
        SchedulerStats {
            units_total: self.units_total.load(Ordering::Relaxed),
            units_succeeded: self.units_succeeded.load(Ordering::Relaxed),
            units_failed: self.units_failed.load(Ordering::Relaxed),
            units_cancelled: self.units_cancelled.load(Ordering::Relaxed),
            pulses_completed: self.pulses_completed.load(Ordering::Relaxed),
            peak_active: peak_active as u64,
            elapsed,
        }
    }
}

/// Helper for timing operations.
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed time.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return elapsed time.
    pub fn stop(self) -> Duration {
        self.start.elapsed()
    }
}
