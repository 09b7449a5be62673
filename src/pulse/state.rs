//! Shared scheduler state: the active-unit counter and the run phase.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::error;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Phase of a scheduler.
///
/// `Idle -> PulseRunning -> PulseBarrier -> (Idle | Done)`. `Done` is
/// reached only once every unit of the last pulse has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulerPhase {
    /// Between pulses, or before the first one.
    Idle,
    /// Units of the current pulse are being admitted.
    PulseRunning,
    /// Waiting for every unit of the current pulse to finish.
    PulseBarrier,
    /// All pulses finished.
    Done,
}

impl fmt::Display for SchedulerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchedulerPhase::Idle => "idle",
            SchedulerPhase::PulseRunning => "pulse-running",
            SchedulerPhase::PulseBarrier => "pulse-barrier",
            SchedulerPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// State shared by the controlling loop and every running unit.
#[derive(Debug)]
pub struct SchedulerState {
    active: AtomicUsize,
    peak_active: AtomicUsize,
    max_concurrency: usize,
    pulse_size: usize,
    phase: Mutex<SchedulerPhase>,
}

impl SchedulerState {
    pub fn new(pulse_size: usize, max_concurrency: usize) -> Self {
        Self {
            active: AtomicUsize::new(0),
            peak_active: AtomicUsize::new(0),
            max_concurrency,
            pulse_size,
            phase: Mutex::new(SchedulerPhase::Idle),
        }
    }

    /// Mark one unit active until the returned guard is dropped.
    ///
    /// The guard decrements on every exit path, including errors and
    /// unwinding panics.
    pub fn enter(self: &Arc<Self>) -> ActiveGuard {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_active.fetch_max(now, Ordering::SeqCst);
        if now > self.max_concurrency {
            error!(
                "active units {} exceed max_concurrency {}",
                now, self.max_concurrency
            );
        }
        ActiveGuard {
            state: Arc::clone(self),
        }
    }

    /// Units currently running.
    pub fn active_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Highest `active_count` observed since the last reset.
    pub fn peak_active(&self) -> usize {
        self.peak_active.load(Ordering::SeqCst)
    }

    pub fn reset_peak(&self) {
        self.peak_active.store(0, Ordering::SeqCst);
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn pulse_size(&self) -> usize {
        self.pulse_size
    }

    pub fn phase(&self) -> SchedulerPhase {
        *self.phase.lock()
    }

    pub fn set_phase(&self, phase: SchedulerPhase) {
        *self.phase.lock() = phase;
    }
}

/// Keeps one unit counted as active.
#[must_use = "the unit stops counting as active when the guard is dropped"]
pub struct ActiveGuard {
    state: Arc<SchedulerState>,
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.state.active.fetch_sub(1, Ordering::SeqCst);
    }
}
