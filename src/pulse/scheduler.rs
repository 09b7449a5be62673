//! Async pulse scheduler on tokio.
//!
//! A dataset is cut into pulses of at most `pulse_size` units. Pulses run
//! strictly one after another: the next pulse is not admitted until every
//! unit of the current one has finished. Inside a pulse at most
//! `max_concurrency` units are active; admission waits on a semaphore
//! permit, and each finishing unit frees exactly one permit.
//!
//! ```
//! use pulse_rank::pulse::config::PulseConfig;
//! use pulse_rank::pulse::scheduler::PulseScheduler;
//!
//! # tokio_test::block_on(async {
//! let scheduler = PulseScheduler::new(PulseConfig::new(2, 1).unwrap()).unwrap();
//! let report = scheduler.run(vec![1, 2, 3, 4, 5], |x| async move { Ok(x * 2) }).await;
//!
//! assert_eq!(report.into_results().unwrap(), vec![2, 4, 6, 8, 10]);
//! # });
//! ```

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use log::{debug, info, warn};
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;

use crate::error::Result;
use crate::pulse::cancel::CancellationToken;
use crate::pulse::config::PulseConfig;
use crate::pulse::metrics::{SchedulerMetricsCollector, Timer};
use crate::pulse::state::{SchedulerPhase, SchedulerState};
use crate::pulse::unit::{Pulse, PulseReport, UnitFailure, UnitOutcome};

/// Bounded-concurrency executor running async units in sequential pulses.
#[derive(Debug)]
pub struct PulseScheduler {
    config: PulseConfig,
    state: Arc<SchedulerState>,

    /// Serializes runs on this instance so the active counter and phase
    /// describe a single run.
    run_lock: Mutex<()>,
}

impl PulseScheduler {
    /// Create a scheduler. Fails with `InvalidConfig` on zero values.
    pub fn new(config: PulseConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: Arc::new(SchedulerState::new(
                config.pulse_size,
                config.max_concurrency,
            )),
            run_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &PulseConfig {
        &self.config
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.state.phase()
    }

    /// Units currently running.
    pub fn active_count(&self) -> usize {
        self.state.active_count()
    }

    /// Apply `f` to every element of `dataset`.
    pub async fn run<T, R, F, Fut>(&self, dataset: Vec<T>, f: F) -> PulseReport<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        self.run_with_cancel(dataset, f, &CancellationToken::new())
            .await
    }

    /// Apply `f` to every element of `dataset`, stopping admission once
    /// `cancel` fires.
    ///
    /// Units already running finish normally; units never started report
    /// [`UnitOutcome::Cancelled`]. Errors and panics of `f` are recorded
    /// in that unit's outcome and never abort sibling units.
    pub async fn run_with_cancel<T, R, F, Fut>(
        &self,
        dataset: Vec<T>,
        f: F,
        cancel: &CancellationToken,
    ) -> PulseReport<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        let _run = self.run_lock.lock().await;
        let timer = Timer::start();

        let total = dataset.len();
        let metrics = SchedulerMetricsCollector::new(total);
        let mut outcomes: Vec<Option<UnitOutcome<R>>> = (0..total).map(|_| None).collect();

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency));
        let f = Arc::new(f);
        let pulses = Pulse::partition(dataset, self.config.pulse_size);
        let pulse_count = pulses.len();

        self.state.reset_peak();
        self.state.set_phase(SchedulerPhase::Idle);
        debug!(
            "pulse run: {} units in {} pulses (pulse_size={}, max_concurrency={})",
            total, pulse_count, self.config.pulse_size, self.config.max_concurrency
        );

        for pulse in pulses {
            self.state.set_phase(SchedulerPhase::PulseRunning);
            debug!("pulse {} admitting {} units", pulse.index, pulse.len());

            let pulse_index = pulse.index;
            let mut running = JoinSet::new();

            for unit in pulse.units {
                let id = unit.id;
                if cancel.is_cancelled() {
                    outcomes[id] = Some(UnitOutcome::Cancelled);
                    continue;
                }

                let permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        outcomes[id] = Some(UnitOutcome::Cancelled);
                        continue;
                    }
                    permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => {
                            // Semaphore closed
                            outcomes[id] = Some(UnitOutcome::Failed(UnitFailure {
                                id,
                                message: "admission semaphore closed".to_string(),
                                panicked: false,
                            }));
                            continue;
                        }
                    },
                };

                let f = Arc::clone(&f);
                let state = Arc::clone(&self.state);
                let cancel = cancel.clone();
                let input = unit.input;

                running.spawn(async move {
                    let _permit = permit;
                    if cancel.is_cancelled() {
                        return (id, UnitOutcome::Cancelled);
                    }

                    // Dropped before the permit, so active never exceeds the permit count.
                    let _active = state.enter();
                    let outcome = match AssertUnwindSafe(async move { f(input).await })
                        .catch_unwind()
                        .await
                    {
                        Ok(Ok(value)) => UnitOutcome::Completed(value),
                        Ok(Err(e)) => UnitOutcome::Failed(UnitFailure::from_error(id, &e)),
                        Err(payload) => UnitOutcome::Failed(UnitFailure::from_panic(id, payload)),
                    };
                    (id, outcome)
                });
            }

            self.state.set_phase(SchedulerPhase::PulseBarrier);
            while let Some(joined) = running.join_next().await {
                match joined {
                    Ok((id, outcome)) => {
                        if let UnitOutcome::Failed(failure) = &outcome {
                            warn!("unit {} failed: {}", id, failure.message);
                        }
                        outcomes[id] = Some(outcome);
                    }
                    Err(e) => warn!("unit task did not complete: {e}"),
                }
            }
            metrics.record_pulse();

            let next = if pulse_index + 1 < pulse_count {
                SchedulerPhase::Idle
            } else {
                SchedulerPhase::Done
            };
            self.state.set_phase(next);
            debug!("pulse {pulse_index} reached its barrier");
        }
        self.state.set_phase(SchedulerPhase::Done);

        let outcomes: Vec<UnitOutcome<R>> = outcomes
            .into_iter()
            .enumerate()
            .map(|(id, outcome)| {
                outcome.unwrap_or_else(|| {
                    UnitOutcome::Failed(UnitFailure {
                        id,
                        message: "unit task was aborted".to_string(),
                        panicked: false,
                    })
                })
            })
            .collect();
        for outcome in &outcomes {
            metrics.record_outcome(outcome);
        }

        let stats = metrics.snapshot(self.state.peak_active(), timer.stop());
        if cancel.is_cancelled() {
            warn!(
                "pulse run cancelled: {} of {} units not started",
                stats.units_cancelled, stats.units_total
            );
        }
        info!(
            "pulse run finished: {} succeeded, {} failed, {} cancelled, {} pulses, peak active {} in {:?}",
            stats.units_succeeded,
            stats.units_failed,
            stats.units_cancelled,
            stats.pulses_completed,
            stats.peak_active,
            stats.elapsed
        );

        PulseReport { outcomes, stats }
    }

    /// Like [`run`](Self::run), but fails on the first failed unit (in
    /// dataset order) instead of returning a report.
    pub async fn map<T, R, F, Fut>(&self, dataset: Vec<T>, f: F) -> Result<Vec<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        self.run(dataset, f).await.into_results()
    }
}

/// Validate `config` and run `f` over `dataset` on a fresh scheduler.
pub async fn run_pulses<T, R, F, Fut>(
    dataset: Vec<T>,
    f: F,
    config: PulseConfig,
) -> Result<PulseReport<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R>> + Send + 'static,
{
    let scheduler = PulseScheduler::new(config)?;
    Ok(scheduler.run(dataset, f).await)
}
