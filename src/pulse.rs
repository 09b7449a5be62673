//! Bounded-concurrency pulse execution.
//!
//! A pulse run maps a function over a dataset in fixed-size, strictly
//! sequential batches ("pulses") while capping how many invocations are in
//! flight at once. Results are always returned indexed like the dataset.
//!
//! - [`scheduler::PulseScheduler`] runs async functions on tokio
//! - [`blocking::BlockingPulseScheduler`] runs blocking functions on a rayon pool

pub mod blocking;
pub mod cancel;
pub mod config;
pub mod metrics;
pub mod scheduler;
pub mod state;
pub mod unit;

pub use self::blocking::BlockingPulseScheduler;
pub use self::cancel::CancellationToken;
pub use self::config::PulseConfig;
pub use self::metrics::SchedulerStats;
pub use self::scheduler::{PulseScheduler, run_pulses};
pub use self::state::SchedulerPhase;
pub use self::unit::{ExecutionUnit, Pulse, PulseReport, UnitFailure, UnitOutcome};
