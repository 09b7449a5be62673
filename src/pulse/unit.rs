//! Execution units, pulses and per-unit outcomes.

use std::any::Any;

use serde::Serialize;

use crate::error::{PulseRankError, Result};
use crate::pulse::metrics::SchedulerStats;

/// One dataset element paired with its position in the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionUnit<T> {
    /// Index of the element in the original dataset.
    pub id: usize,
    pub input: T,
}

/// A bounded, ordered slice of execution units.
#[derive(Debug, Clone)]
pub struct Pulse<T> {
    /// Position of this pulse in the run, starting at 0.
    pub index: usize,
    pub units: Vec<ExecutionUnit<T>>,
}

impl<T> Pulse<T> {
    /// Split `dataset` into consecutive pulses of at most `pulse_size` units.
    ///
    /// Unit ids are the dataset positions, so concatenating the pulses
    /// restores the input order.
    pub fn partition<I>(dataset: I, pulse_size: usize) -> Vec<Pulse<T>>
    where
        I: IntoIterator<Item = T>,
    {
        let pulse_size = pulse_size.max(1);
        let mut pulses: Vec<Pulse<T>> = Vec::new();

        for (id, input) in dataset.into_iter().enumerate() {
            if id % pulse_size == 0 {
                pulses.push(Pulse {
                    index: pulses.len(),
                    units: Vec::with_capacity(pulse_size),
                });
            }
            if let Some(pulse) = pulses.last_mut() {
                pulse.units.push(ExecutionUnit { id, input });
            }
        }

        pulses
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Id of the first unit, if any.
    pub fn first_id(&self) -> Option<usize> {
        self.units.first().map(|u| u.id)
    }
}

/// A unit that returned an error or panicked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitFailure {
    /// Dataset index of the unit.
    pub id: usize,
    pub message: String,
    /// True when the failure was a caught panic.
    pub panicked: bool,
}

impl UnitFailure {
    pub fn from_error(id: usize, error: &PulseRankError) -> Self {
        UnitFailure {
            id,
            message: error.to_string(),
            panicked: false,
        }
    }

    pub fn from_panic(id: usize, payload: Box<dyn Any + Send>) -> Self {
        UnitFailure {
            id,
            message: panic_message(payload.as_ref()),
            panicked: true,
        }
    }

    /// Convert into the crate error type.
    pub fn into_error(self) -> PulseRankError {
        let message = if self.panicked {
            format!("panicked: {}", self.message)
        } else {
            self.message
        };
        PulseRankError::unit_failure(self.id, message)
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Result of one execution unit.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitOutcome<R> {
    /// The function returned a value.
    Completed(R),
    /// The function returned an error or panicked.
    Failed(UnitFailure),
    /// The unit was never started because the run was cancelled.
    Cancelled,
}

impl<R> UnitOutcome<R> {
    pub fn is_completed(&self) -> bool {
        matches!(self, UnitOutcome::Completed(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, UnitOutcome::Failed(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, UnitOutcome::Cancelled)
    }

    pub fn value(&self) -> Option<&R> {
        match self {
            UnitOutcome::Completed(value) => Some(value),
            _ => None,
        }
    }

    /// Convert into a `Result`, attributing errors to unit `id`.
    pub fn into_result(self, id: usize) -> Result<R> {
        match self {
            UnitOutcome::Completed(value) => Ok(value),
            UnitOutcome::Failed(failure) => Err(failure.into_error()),
            UnitOutcome::Cancelled => Err(PulseRankError::cancelled(format!(
                "unit {id} was not started"
            ))),
        }
    }
}

/// Outcome of a whole scheduler run.
///
/// `outcomes[i]` always belongs to `dataset[i]`, whatever the completion
/// order was.
#[derive(Debug, Clone)]
pub struct PulseReport<R> {
    pub outcomes: Vec<UnitOutcome<R>>,
    pub stats: SchedulerStats,
}

impl<R> PulseReport<R> {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// True when every unit completed.
    pub fn is_complete_success(&self) -> bool {
        self.outcomes.iter().all(UnitOutcome::is_completed)
    }

    /// `(id, value)` of every completed unit, in dataset order.
    pub fn successes(&self) -> impl Iterator<Item = (usize, &R)> {
        self.outcomes
            .iter()
            .enumerate()
            .filter_map(|(id, outcome)| outcome.value().map(|value| (id, value)))
    }

    /// Every failed unit, in dataset order.
    pub fn failures(&self) -> Vec<&UnitFailure> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                UnitOutcome::Failed(failure) => Some(failure),
                _ => None,
            })
            .collect()
    }

    /// Index-aligned results. The first failed or cancelled unit (in
    /// dataset order) becomes the error.
    pub fn into_results(self) -> Result<Vec<R>> {
        self.outcomes
            .into_iter()
            .enumerate()
            .map(|(id, outcome)| outcome.into_result(id))
            .collect()
    }
}
