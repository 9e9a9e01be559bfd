//! Phase 1: turn an exhaustive exploration into a branch policy.
//!
//! [`PolicyGenerator`] is attached to the host during the single exhaustive
//! exploration at `N0`. It never prunes — every branch returns its full set
//! of available choices — and only watches for the heaviest terminal. Once
//! the exploration ends, [`PolicyGenerator::finish`] walks the heaviest
//! path and inserts one key per decision on it, each key the
//! context-preserving prefix ending just before that decision.

use crate::decision::{ChoiceIndex, Decision};
use crate::host::{BranchEvent, Observer, TerminalEvent};
use crate::path::Path;
use crate::policy::trie::{PolicyTrie, PolicyTrieBuilder};

pub struct PolicyGenerator {
    builder: PolicyTrieBuilder,
    max_history: Option<usize>,
    heaviest_cost: f64,
    heaviest_history: Option<Vec<Decision>>,
}

impl PolicyGenerator {
    /// `max_history` bounds the context-preserving key length inserted per
    /// decision — the same bound [`crate::policy::search::HeuristicSearch`]
    /// uses for lookup, so keys and queries agree on suffix length.
    pub fn new(max_history: Option<usize>) -> Self {
        Self {
            builder: PolicyTrieBuilder::new(),
            max_history,
            heaviest_cost: f64::NEG_INFINITY,
            heaviest_history: None,
        }
    }

    /// Finalizes the recorded heaviest path into an immutable [`PolicyTrie`].
    /// If the exploration never reached a terminal (e.g. the host found no
    /// branches at all), the resulting trie is empty.
    pub fn finish(mut self) -> PolicyTrie {
        if let Some(history) = self.heaviest_history.take() {
            let full = Path::from(history);
            for idx in 0..full.len() {
                let key = full.ctx_preserving_suffix(idx, self.max_history);
                self.builder.put(&key, full[idx].choice);
            }
        }
        self.builder.build()
    }
}

impl Observer for PolicyGenerator {
    fn on_branch(&mut self, event: &BranchEvent) -> Vec<ChoiceIndex> {
        event.available_choices.to_vec()
    }

    fn on_terminal(&mut self, event: &TerminalEvent) {
        // Ties favor the earliest-discovered heaviest path: only a strictly
        // greater cost replaces the current record.
        if event.cost > self.heaviest_cost {
            self.heaviest_cost = event.cost;
            self.heaviest_history = Some(event.history.to_vec());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::Decision;

    fn d(branch: u64, choice: u32, context: u64) -> Decision {
        Decision::new(branch, choice, context)
    }

    #[test]
    fn no_terminal_yields_empty_trie() {
        let generator = PolicyGenerator::new(None);
        let trie = generator.finish();
        assert!(trie
            .choices_for_longest_suffix(&Path::empty())
            .is_empty());
    }

    #[test]
    fn heaviest_leaf_is_recorded() {
        let mut generator = PolicyGenerator::new(None);
        generator.on_terminal(&TerminalEvent {
            cost: 3.0,
            history: &[d(1, 0, 0)],
        });
        generator.on_terminal(&TerminalEvent {
            cost: 9.0,
            history: &[d(1, 1, 0)],
        });
        generator.on_terminal(&TerminalEvent {
            cost: 5.0,
            history: &[d(1, 0, 0)],
        });
        let trie = generator.finish();
        let result = trie.choices_for_longest_suffix(&Path::empty());
        assert_eq!(result.len(), 1);
        assert!(result.contains(&1));
    }

    #[test]
    fn ties_prefer_earliest_discovered() {
        let mut generator = PolicyGenerator::new(None);
        generator.on_terminal(&TerminalEvent {
            cost: 9.0,
            history: &[d(1, 0, 0)],
        });
        generator.on_terminal(&TerminalEvent {
            cost: 9.0,
            history: &[d(1, 1, 0)],
        });
        let trie = generator.finish();
        let result = trie.choices_for_longest_suffix(&Path::empty());
        assert!(result.contains(&0));
        assert!(!result.contains(&1));
    }

    #[test]
    fn key_construction_is_context_preserving_and_bounded() {
        let mut generator = PolicyGenerator::new(Some(1));
        generator.on_terminal(&TerminalEvent {
            cost: 1.0,
            history: &[d(1, 0, 10), d(2, 1, 10), d(3, 0, 10)],
        });
        let trie = generator.finish();
        // key for the last decision is bounded to the single preceding
        // decision in the same context (max_history = 1).
        let history = Path::from(vec![d(1, 0, 10), d(2, 1, 10), d(3, 0, 10)]);
        let query = history.ctx_preserving_suffix(2, Some(1));
        let result = trie.choices_for_longest_suffix(&query);
        assert!(result.contains(&0));
    }
}
