//! The narrow boundary between this crate and the symbolic-execution
//! backend it drives.
//!
//! Everything the host does internally — choice generation, stack frames,
//! instruction objects, solver backends — is out of scope here. What is in
//! scope is the *protocol*: the host delivers [`BranchEvent`]s and
//! [`TerminalEvent`]s, in order, to an [`Observer`]; the observer may prune
//! the choices the host explores at each branch. Modeling this as a
//! single-method strategy trait rather than an inheritance hierarchy keeps
//! the observer's job narrow: react to one callback kind at a time.

use crate::decision::{BranchId, ChoiceIndex, ContextId, Decision};

/// A branch the host has reached, with the choices it is prepared to
/// explore and the decision history leading up to it (oldest first, not
/// yet including this branch).
pub struct BranchEvent<'a> {
    pub branch: BranchId,
    pub available_choices: &'a [ChoiceIndex],
    pub context: ContextId,
    pub history: &'a [Decision],
}

/// A terminal state the host has reached, with the resource cost of the
/// path and its full decision sequence.
pub struct TerminalEvent<'a> {
    pub cost: f64,
    pub history: &'a [Decision],
}

/// The capability a [`Host`] invokes synchronously at each branch and
/// terminal event. Implementations never time out or cancel the host —
/// the only suspensions are the host's own synchronous calls into this
/// trait.
pub trait Observer {
    /// Called at a branch point. The returned set restricts which of
    /// `event.available_choices` the host will explore next; returning the
    /// full slice explores everything. Must return a non-empty subset of
    /// `event.available_choices` (single-threaded, no concurrent callers).
    fn on_branch(&mut self, event: &BranchEvent) -> Vec<ChoiceIndex>;

    /// Called when the host completes a path.
    fn on_terminal(&mut self, event: &TerminalEvent);
}

/// The symbolic-execution engine. Out of scope for this crate's
/// implementation — consumers supply a real backend; `tests/` supplies an
/// in-memory double to exercise the pipeline deterministically.
pub trait Host {
    /// Runs one complete exploration at `input_size`, driving `observer`
    /// through every reachable branch and terminal event before returning.
    /// An `Err` here is a fatal host failure (§7): the current phase
    /// aborts and the error propagates to the Driver.
    fn explore(&mut self, input_size: u64, observer: &mut dyn Observer) -> Result<(), String>;
}
