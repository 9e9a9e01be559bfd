//! Phase 2: a policy-guided heuristic sweep over a single input size.
//!
//! [`HeuristicSearch`] consults the [`PolicyTrie`] built in phase 1 at every
//! branch, restricting the host to the recommended choices instead of
//! exploring exhaustively. It never mutates the trie — phase 2 is read-only
//! with respect to the policy — and tracks exactly one path: the single
//! worst-cost terminal seen during the sweep.

use std::collections::HashSet;

use crate::decision::{ChoiceIndex, Decision};
use crate::host::{BranchEvent, Observer, TerminalEvent};
use crate::path::Path;
use crate::policy::trie::PolicyTrie;

/// What a branch does when the policy has no recommendation for its
/// context-preserving history (a "policy miss").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoSolverFallback {
    /// Explore every choice the host offers, as if running phase 1 again.
    ExploreAll,
    /// Take only the first offered choice, deterministically.
    FirstChoice,
}

pub struct HeuristicSearch<'p> {
    policy: &'p PolicyTrie,
    max_history: Option<usize>,
    fallback: NoSolverFallback,
    worst_cost: f64,
    worst_history: Option<Vec<Decision>>,
}

impl<'p> HeuristicSearch<'p> {
    pub fn new(policy: &'p PolicyTrie, max_history: Option<usize>, fallback: NoSolverFallback) -> Self {
        Self {
            policy,
            max_history,
            fallback,
            worst_cost: f64::NEG_INFINITY,
            worst_history: None,
        }
    }

    /// The worst (maximum) cost observed across the sweep, i.e. `WC(n)` for
    /// whatever input size the host was driven at.
    pub fn worst_cost(&self) -> f64 {
        self.worst_cost
    }

    /// The decision sequence that realized [`Self::worst_cost`].
    pub fn worst_history(&self) -> Option<&[Decision]> {
        self.worst_history.as_deref()
    }

    fn apply_fallback(&self, available: &[ChoiceIndex]) -> Vec<ChoiceIndex> {
        match self.fallback {
            NoSolverFallback::ExploreAll => available.to_vec(),
            NoSolverFallback::FirstChoice => available.first().copied().into_iter().collect(),
        }
    }
}

impl<'p> Observer for HeuristicSearch<'p> {
    fn on_branch(&mut self, event: &BranchEvent) -> Vec<ChoiceIndex> {
        let history = Path::new(event.history, true, event.context, self.max_history);
        let recommended: HashSet<ChoiceIndex> = self.policy.choices_for_longest_suffix(&history);

        if recommended.is_empty() {
            return self.apply_fallback(event.available_choices);
        }

        let pruned: Vec<ChoiceIndex> = event
            .available_choices
            .iter()
            .copied()
            .filter(|choice| recommended.contains(choice))
            .collect();

        if pruned.is_empty() {
            // The policy recommends choices the host isn't offering at this
            // input size (e.g. the branch's choice set shifted between the
            // generation and this sweep's size). Treat it as a miss.
            self.apply_fallback(event.available_choices)
        } else {
            pruned
        }
    }

    fn on_terminal(&mut self, event: &TerminalEvent) {
        if event.cost > self.worst_cost {
            self.worst_cost = event.cost;
            self.worst_history = Some(event.history.to_vec());
        }
    }
}
