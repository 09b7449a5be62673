//! Pulse scheduler for blocking work on a dedicated rayon pool.
//!
//! Same contract as [`PulseScheduler`](crate::pulse::scheduler::PulseScheduler)
//! for synchronous functions. The pool has exactly `max_concurrency`
//! threads, which bounds the number of active units. Each pulse is one
//! `broadcast`: every worker drains a shared queue of the pulse's units, and
//! the call returns only when the whole pulse has finished.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::Mutex;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::Result;
use crate::pulse::cancel::CancellationToken;
use crate::pulse::config::PulseConfig;
use crate::pulse::metrics::{SchedulerMetricsCollector, Timer};
use crate::pulse::state::{SchedulerPhase, SchedulerState};
use crate::pulse::unit::{Pulse, PulseReport, UnitFailure, UnitOutcome};

/// Bounded-concurrency executor for blocking functions.
pub struct BlockingPulseScheduler {
    config: PulseConfig,
    state: Arc<SchedulerState>,
    thread_pool: ThreadPool,
    run_lock: Mutex<()>,
}

impl std::fmt::Debug for BlockingPulseScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingPulseScheduler")
            .field("config", &self.config)
            .field("phase", &self.state.phase())
            .finish()
    }
}

impl BlockingPulseScheduler {
    /// Create a scheduler and its thread pool.
    pub fn new(config: PulseConfig) -> Result<Self> {
        config.validate()?;

        let thread_pool = ThreadPoolBuilder::new()
            .num_threads(config.max_concurrency)
            .thread_name(|i| format!("pulse-worker-{i}"))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create thread pool: {e}"))?;

        Ok(Self {
            config,
            state: Arc::new(SchedulerState::new(
                config.pulse_size,
                config.max_concurrency,
            )),
            thread_pool,
            run_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &PulseConfig {
        &self.config
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.state.phase()
    }

    pub fn active_count(&self) -> usize {
        self.state.active_count()
    }

    /// Apply `f` to every element of `dataset`.
    pub fn run<T, R, F>(&self, dataset: Vec<T>, f: F) -> PulseReport<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> Result<R> + Send + Sync,
    {
        self.run_with_cancel(dataset, f, &CancellationToken::new())
    }

    /// Apply `f` to every element of `dataset`, skipping units not yet
    /// started once `cancel` fires.
    pub fn run_with_cancel<T, R, F>(
        &self,
        dataset: Vec<T>,
        f: F,
        cancel: &CancellationToken,
    ) -> PulseReport<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> Result<R> + Send + Sync,
    {
        let _run = self.run_lock.lock();
        let timer = Timer::start();

        let total = dataset.len();
        let metrics = SchedulerMetricsCollector::new(total);
        let mut outcomes: Vec<Option<UnitOutcome<R>>> = (0..total).map(|_| None).collect();

        let pulses = Pulse::partition(dataset, self.config.pulse_size);
        let pulse_count = pulses.len();

        self.state.reset_peak();
        self.state.set_phase(SchedulerPhase::Idle);
        debug!(
            "blocking pulse run: {} units in {} pulses on {} threads",
            total, pulse_count, self.config.max_concurrency
        );

        for pulse in pulses {
            let pulse_index = pulse.index;
            if cancel.is_cancelled() {
                for unit in &pulse.units {
                    outcomes[unit.id] = Some(UnitOutcome::Cancelled);
                }
                continue;
            }

            self.state.set_phase(SchedulerPhase::PulseRunning);
            let queue = Mutex::new(pulse.units.into_iter());
            let state = &self.state;
            let f = &f;

            // One job per worker thread; broadcast jobs cannot be stolen, so
            // nested rayon work inside `f` never starts a second unit on a
            // worker.
            let per_thread: Vec<Vec<(usize, UnitOutcome<R>)>> =
                self.thread_pool.broadcast(|_| {
                    let mut finished = Vec::new();
                    loop {
                        let Some(unit) = queue.lock().next() else {
                            break;
                        };
                        let id = unit.id;
                        if cancel.is_cancelled() {
                            finished.push((id, UnitOutcome::Cancelled));
                            continue;
                        }
                        let _active = state.enter();
                        let outcome = match catch_unwind(AssertUnwindSafe(|| f(unit.input))) {
                            Ok(Ok(value)) => UnitOutcome::Completed(value),
                            Ok(Err(e)) => UnitOutcome::Failed(UnitFailure::from_error(id, &e)),
                            Err(payload) => {
                                UnitOutcome::Failed(UnitFailure::from_panic(id, payload))
                            }
                        };
                        finished.push((id, outcome));
                    }
                    finished
                });
            // broadcast() returning is the barrier.
            self.state.set_phase(SchedulerPhase::PulseBarrier);

            for (id, outcome) in per_thread.into_iter().flatten() {
                if let UnitOutcome::Failed(failure) = &outcome {
                    warn!("unit {} failed: {}", id, failure.message);
                }
                outcomes[id] = Some(outcome);
            }
            metrics.record_pulse();

            self.state.set_phase(if pulse_index + 1 < pulse_count {
                SchedulerPhase::Idle
            } else {
                SchedulerPhase::Done
            });
        }
        self.state.set_phase(SchedulerPhase::Done);

        let outcomes: Vec<UnitOutcome<R>> = outcomes
            .into_iter()
            .map(|outcome| outcome.unwrap_or(UnitOutcome::Cancelled))
            .collect();
        for outcome in &outcomes {
            metrics.record_outcome(outcome);
        }
        let stats = metrics.snapshot(self.state.peak_active(), timer.stop());
        info!(
            "blocking pulse run finished: {} succeeded, {} failed, {} cancelled, peak active {} in {:?}",
            stats.units_succeeded,
            stats.units_failed,
            stats.units_cancelled,
            stats.peak_active,
            stats.elapsed
        );

        PulseReport { outcomes, stats }
    }

    /// Like [`run`](Self::run), but fails on the first failed unit.
    pub fn map<T, R, F>(&self, dataset: Vec<T>, f: F) -> Result<Vec<R>>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> Result<R> + Send + Sync,
    {
        self.run(dataset, f).into_results()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PulseRankError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn scheduler(pulse_size: usize, max_concurrency: usize) -> BlockingPulseScheduler {
        BlockingPulseScheduler::new(PulseConfig::new(pulse_size, max_concurrency).unwrap())
            .unwrap()
    }

    #[test]
    fn test_doubling_scenario() {
        let scheduler = scheduler(2, 1);
        let report = scheduler.run(vec![1, 2, 3, 4, 5], |x| Ok(x * 2));

        assert_eq!(report.stats.peak_active, 1);
        assert_eq!(report.stats.pulses_completed, 3);
        assert_eq!(report.into_results().unwrap(), vec![2, 4, 6, 8, 10]);
        assert_eq!(scheduler.phase(), SchedulerPhase::Done);
    }

    #[test]
    fn test_concurrency_ceiling() {
        let scheduler = scheduler(16, 2);
        let current = AtomicUsize::new(0);
        let observed = AtomicUsize::new(0);

        let results = scheduler
            .map((0..32).collect::<Vec<i32>>(), |x| {
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                observed.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(1));
                current.fetch_sub(1, Ordering::SeqCst);
                Ok(x)
            })
            .unwrap();

        assert_eq!(results, (0..32).collect::<Vec<_>>());
        assert!(observed.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn test_nested_rayon_work_keeps_ceiling() {
        use rayon::prelude::*;

        let scheduler = scheduler(8, 2);
        let report = scheduler.run((0..8u64).collect::<Vec<_>>(), |x| {
            Ok((0..10_000u64).into_par_iter().map(|i| i % (x + 1)).sum::<u64>())
        });

        assert!(report.is_complete_success());
        assert!(report.stats.peak_active <= 2);
    }

    #[test]
    fn test_failures_and_panics_are_isolated() {
        let scheduler = scheduler(3, 2);
        let report = scheduler.run(vec![0, 1, 2, 3], |x: i32| {
            match x {
                1 => Err(PulseRankError::internal("odd one out")),
                2 => panic!("blocking unit panicked"),
                _ => Ok(x),
            }
        });

        assert_eq!(report.outcomes[0], UnitOutcome::Completed(0));
        assert!(report.outcomes[1].is_failed());
        assert!(report.outcomes[2].is_failed());
        assert_eq!(report.outcomes[3], UnitOutcome::Completed(3));
        assert_eq!(report.stats.units_failed, 2);

        let failures = report.failures();
        assert!(!failures[0].panicked);
        assert!(failures[1].panicked);
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn test_cancelled_before_run() {
        let scheduler = scheduler(2, 2);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = scheduler.run_with_cancel(vec![1, 2, 3], |x: i32| Ok(x), &cancel);
        assert!(report.outcomes.iter().all(UnitOutcome::is_cancelled));
        assert_eq!(report.stats.pulses_completed, 0);
    }

    #[test]
    fn test_invalid_config() {
        let config = PulseConfig {
            pulse_size: 1,
            max_concurrency: 0,
        };
        assert!(matches!(
            BlockingPulseScheduler::new(config),
            Err(PulseRankError::InvalidConfig(_))
        ));
    }
}
