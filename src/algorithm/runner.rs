//! Run loop driving repeated ticks to completion or failure
//!
//! The loop is a three-state machine: it starts `Running`, becomes
//! `Complete` when a tick reports that every cell is collapsed, and becomes
//! `Failed` on a contradiction, an exhausted iteration budget, or a
//! cancellation observed at a tick boundary. Every successful tick appends
//! the post-tick state to the history unless recording is switched off.

use crate::algorithm::executor::{TickEvent, WfcState};
use crate::algorithm::selection::RandomSelector;
use crate::io::error::{Result, WfcError};
use log::{info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Why a run stopped without completing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// A cell's domain became empty
    Contradiction {
        /// Column of the emptied cell
        x: usize,
        /// Row of the emptied cell
        y: usize,
    },
    /// The iteration budget ran out first
    MaxIterationsExceeded {
        /// Budget that was reached
        limit: usize,
    },
    /// The cancellation flag was raised or the deadline passed
    Cancelled,
}

impl FailureReason {
    /// Error equivalent, given the number of ticks completed
    pub const fn into_error(self, iteration: usize) -> WfcError {
        match self {
            Self::Contradiction { x, y } => WfcError::Contradiction { x, y },
            Self::MaxIterationsExceeded { limit } => WfcError::MaxIterationsExceeded { limit },
            Self::Cancelled => WfcError::Cancelled { iteration },
        }
    }
}

/// Position of the run loop's state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// More ticks are needed
    Running,
    /// Every cell is collapsed
    Complete,
    /// The run stopped for good
    Failed(FailureReason),
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Fully collapsed state
    pub final_state: WfcState,
    /// State after each tick, oldest first
    pub history: Vec<WfcState>,
    /// Ticks performed
    pub iterations: usize,
}

/// Drives a state tick by tick under an iteration budget
pub struct RunLoop<'a> {
    state: WfcState,
    selector: RandomSelector,
    max_iterations: usize,
    iterations: usize,
    status: RunStatus,
    history: Vec<WfcState>,
    record_history: bool,
    cancel: Option<Arc<AtomicBool>>,
    deadline: Option<Instant>,
    observer: Option<Box<dyn FnMut(&TickEvent) + 'a>>,
}

impl<'a> RunLoop<'a> {
    /// Take ownership of `state` and prepare to run it
    ///
    /// A state that already reported completion starts out `Complete`.
    pub fn new(state: WfcState, selector: RandomSelector, max_iterations: usize) -> Self {
        let status = if state.is_complete() {
            RunStatus::Complete
        } else {
            RunStatus::Running
        };
        Self {
            state,
            selector,
            max_iterations,
            iterations: 0,
            status,
            history: Vec::new(),
            record_history: true,
            cancel: None,
            deadline: None,
            observer: None,
        }
    }

    /// Stop at the next tick boundary once `flag` is set
    #[must_use]
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Stop at the first tick boundary after `deadline`
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Keep (the default) or skip a copy of the state after every tick
    ///
    /// Without a history only the live state is held, so memory stays flat
    /// however many ticks the run takes.
    #[must_use]
    pub fn with_history(mut self, record: bool) -> Self {
        self.record_history = record;
        self
    }

    /// Call `observer` after every successful tick
    #[must_use]
    pub fn with_observer(mut self, observer: impl FnMut(&TickEvent) + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Current state machine position
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    /// Ticks performed so far
    pub const fn iterations(&self) -> usize {
        self.iterations
    }

    /// Latest state; after a contradiction this is the last state before the failing tick
    pub const fn state(&self) -> &WfcState {
        &self.state
    }

    /// States recorded so far, oldest first; empty when recording is off
    pub fn history(&self) -> &[WfcState] {
        &self.history
    }

    fn cancellation_requested(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Advance by at most one tick
    ///
    /// # Errors
    ///
    /// Returns an error only when the tick fails for a reason that is not a
    /// run outcome (calling tick on an already complete state)
    pub fn step(&mut self) -> Result<RunStatus> {
        if self.status != RunStatus::Running {
            return Ok(self.status);
        }

        if self.cancellation_requested() {
            self.status = RunStatus::Failed(FailureReason::Cancelled);
            return Ok(self.status);
        }

        if self.iterations >= self.max_iterations {
            self.status = RunStatus::Failed(FailureReason::MaxIterationsExceeded {
                limit: self.max_iterations,
            });
            return Ok(self.status);
        }

        match self.state.clone().tick_with_event(&mut self.selector) {
            Ok((next, event)) => {
                self.iterations += 1;
                if let Some(observer) = self.observer.as_mut() {
                    observer(&event);
                }
                if next.is_complete() {
                    self.status = RunStatus::Complete;
                }
                if self.record_history {
                    self.history.push(next.clone());
                }
                self.state = next;
            }
            Err(WfcError::Contradiction { x, y }) => {
                self.iterations += 1;
                self.status = RunStatus::Failed(FailureReason::Contradiction { x, y });
            }
            Err(other) => return Err(other),
        }

        Ok(self.status)
    }

    /// Tick until the loop leaves `Running`
    ///
    /// # Errors
    ///
    /// Returns the failure reason as an error: `Contradiction`,
    /// `MaxIterationsExceeded` or `Cancelled`
    pub fn run_to_end(mut self) -> Result<RunOutcome> {
        while self.step()? == RunStatus::Running {}

        match self.status {
            RunStatus::Complete => {
                info!("Run completed after {} iterations", self.iterations);
                Ok(RunOutcome {
                    final_state: self.state,
                    history: self.history,
                    iterations: self.iterations,
                })
            }
            RunStatus::Failed(reason) => {
                warn!("Run failed after {} iterations: {reason:?}", self.iterations);
                Err(reason.into_error(self.iterations))
            }
            RunStatus::Running => Err(FailureReason::Cancelled.into_error(self.iterations)),
        }
    }

    /// Consume the loop, returning status, latest state and history
    pub fn into_parts(self) -> (RunStatus, WfcState, Vec<WfcState>) {
        (self.status, self.state, self.history)
    }
}

/// Run `state` to the end with a fresh selector seeded from `seed`
///
/// # Errors
///
/// Returns `Contradiction` or `MaxIterationsExceeded` when the run fails
pub fn run(state: WfcState, max_iterations: usize, seed: u64) -> Result<RunOutcome> {
    RunLoop::new(state, RandomSelector::new(seed), max_iterations).run_to_end()
}

/// Restart the whole run with the next seed after each contradiction
///
/// Attempt `k` (starting at 0) uses seed `seed + k`. Only contradictions are
/// retried; an exhausted budget or any other error is returned as is.
///
/// # Errors
///
/// Returns the last attempt's error when every attempt fails
pub fn run_with_retries(
    initial: &WfcState,
    max_iterations: usize,
    seed: u64,
    retries: usize,
) -> Result<RunOutcome> {
    let mut attempt = 0;
    loop {
        let attempt_seed = seed.wrapping_add(attempt as u64);
        match run(initial.clone(), max_iterations, attempt_seed) {
            Err(WfcError::Contradiction { x, y }) if attempt < retries => {
                warn!("Attempt {attempt} hit a contradiction at ({x}, {y}), retrying");
                attempt += 1;
            }
            result => return result,
        }
    }
}
