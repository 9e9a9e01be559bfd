//! The branch policy: a trie from decision prefixes to recommended choices.
//!
//! Keys are inserted in chronological order (oldest decision first), so the
//! trie encodes decision *prefixes*. Lookup instead matches the *suffix* of
//! a live history by walking a candidate terminal upward through parent
//! links — the policy is most predictive near the branch being decided, and
//! a history's suffix is stable across input sizes while its prefix is not.
//!
//! Nodes live in a flat arena (`Vec<TrieNode>`) addressed by index rather
//! than behind `Rc`/`RefCell` parent pointers — cycle-free, trivially
//! serializable, and the trie owns its arena outright rather than
//! borrowing against an external graph library.

use crate::decision::{ChoiceIndex, Decision};
use crate::error::PolicyIoError;
use crate::path::Path;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub type NodeId = usize;
const ROOT: NodeId = 0;

const MAGIC: &[u8; 4] = b"WCPT";
const VERSION: u8 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TrieNode {
    parent: Option<NodeId>,
    /// The Decision labeling the edge from `parent` into this node. `None`
    /// only for the root.
    incoming: Option<Decision>,
    children: HashMap<Decision, NodeId>,
    /// Non-empty iff this node is a terminal.
    choices: HashSet<ChoiceIndex>,
}

impl TrieNode {
    fn root() -> Self {
        Self {
            parent: None,
            incoming: None,
            children: HashMap::new(),
            choices: HashSet::new(),
        }
    }

    fn is_terminal(&self) -> bool {
        !self.choices.is_empty()
    }
}

/// Wire format: the arena plus raw insertion counts. `end_index` is
/// intentionally absent — it is rebuilt from `nodes` on load.
#[derive(Serialize, Deserialize)]
struct Wire {
    nodes: Vec<TrieNode>,
    choice_counts: HashMap<ChoiceIndex, u64>,
}

/// Accumulates `(key, choice)` insertions during an exhaustive exploration,
/// then freezes into an immutable [`PolicyTrie`].
pub struct PolicyTrieBuilder {
    nodes: Vec<TrieNode>,
    choice_counts: HashMap<ChoiceIndex, u64>,
}

impl Default for PolicyTrieBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyTrieBuilder {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::root()],
            choice_counts: HashMap::new(),
        }
    }

    /// Inserts `choice` at the terminal reached by following `key` from the
    /// root, creating intermediate nodes as needed. Only the terminal
    /// receives the choice — intermediate nodes along the key never do.
    /// Repeated `put`s with an identical `(key, choice)` leave the trie
    /// structurally unchanged but still increment `choice_counts[choice]`.
    pub fn put(&mut self, key: &Path, choice: ChoiceIndex) {
        let mut current = ROOT;
        for decision in key.iter() {
            current = self.child_or_insert(current, *decision);
        }
        self.nodes[current].choices.insert(choice);
        *self.choice_counts.entry(choice).or_insert(0) += 1;
    }

    fn child_or_insert(&mut self, parent: NodeId, label: Decision) -> NodeId {
        if let Some(&existing) = self.nodes[parent].children.get(&label) {
            return existing;
        }
        let id = self.nodes.len();
        self.nodes.push(TrieNode {
            parent: Some(parent),
            incoming: Some(label),
            children: HashMap::new(),
            choices: HashSet::new(),
        });
        self.nodes[parent].children.insert(label, id);
        id
    }

    pub fn build(self) -> PolicyTrie {
        PolicyTrie::from_wire(Wire {
            nodes: self.nodes,
            choice_counts: self.choice_counts,
        })
    }
}

/// An immutable, queryable branch policy. Constructed only via
/// [`PolicyTrieBuilder::build`] or by deserializing bytes written by a
/// prior phase-1 run.
pub struct PolicyTrie {
    nodes: Vec<TrieNode>,
    /// Every terminal node whose incoming edge carries a given Decision —
    /// `None` indexes the root when it was inserted with an empty key.
    end_index: HashMap<Option<Decision>, HashSet<NodeId>>,
    choice_counts: HashMap<ChoiceIndex, u64>,
}

impl PolicyTrie {
    fn from_wire(wire: Wire) -> Self {
        let mut end_index: HashMap<Option<Decision>, HashSet<NodeId>> = HashMap::new();
        for (id, node) in wire.nodes.iter().enumerate() {
            if node.is_terminal() {
                end_index.entry(node.incoming).or_default().insert(id);
            }
        }
        Self {
            nodes: wire.nodes,
            end_index,
            choice_counts: wire.choice_counts,
        }
    }

    pub fn empty() -> Self {
        PolicyTrieBuilder::new().build()
    }

    /// Raw frequency of `choice` across every `put` call, regardless of
    /// how many distinct terminals ended up recommending it.
    pub fn count_for_choice(&self, choice: ChoiceIndex) -> u64 {
        self.choice_counts.get(&choice).copied().unwrap_or(0)
    }

    /// The central operation: the union of choices recommended by every
    /// terminal whose incoming-edge chain matches the longest suffix of
    /// `history`. Returns the empty set when `history` is empty and no
    /// empty key was ever inserted, or when no terminal matches even its
    /// own last edge.
    pub fn choices_for_longest_suffix(&self, history: &Path) -> HashSet<ChoiceIndex> {
        let last = history.last().copied();
        let Some(candidates) = self.end_index.get(&last) else {
            return HashSet::new();
        };
        let matches: Vec<(usize, NodeId)> = candidates
            .iter()
            .map(|&terminal| (self.match_length(terminal, history), terminal))
            .collect();
        let Some(&best) = matches.iter().map(|(len, _)| len).max() else {
            return HashSet::new();
        };
        matches
            .into_iter()
            .filter(|(len, _)| *len == best)
            .flat_map(|(_, terminal)| self.nodes[terminal].choices.iter().copied())
            .collect()
    }

    /// How many edges, walking upward from `terminal`, agree in order with
    /// the tail of `history`. Defensive against an empty or short history —
    /// a comparison that would run off the front of `history` simply breaks
    /// the walk rather than panicking.
    fn match_length(&self, terminal: NodeId, history: &Path) -> usize {
        let mut node = terminal;
        let mut matched = 0usize;
        loop {
            let Some(label) = self.nodes[node].incoming else {
                break;
            };
            let Some(hist_idx) = history.len().checked_sub(1 + matched) else {
                break;
            };
            if history.get(hist_idx) != Some(&label) {
                break;
            }
            matched += 1;
            match self.nodes[node].parent {
                Some(parent) => node = parent,
                None => break,
            }
        }
        matched
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, PolicyIoError> {
        let wire = Wire {
            nodes: self.nodes.clone(),
            choice_counts: self.choice_counts.clone(),
        };
        let payload = bincode::serialize(&wire)?;
        let mut bytes = Vec::with_capacity(MAGIC.len() + 1 + payload.len());
        bytes.extend_from_slice(MAGIC);
        bytes.push(VERSION);
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PolicyIoError> {
        let header_len = MAGIC.len() + 1;
        if bytes.len() < header_len {
            return Err(PolicyIoError::Truncated {
                expected: header_len,
                actual: bytes.len(),
            });
        }
        if &bytes[..MAGIC.len()] != MAGIC {
            return Err(PolicyIoError::BadMagic);
        }
        let version = bytes[MAGIC.len()];
        if version != VERSION {
            return Err(PolicyIoError::UnsupportedVersion(version));
        }
        let wire: Wire = bincode::deserialize(&bytes[header_len..])?;
        Ok(Self::from_wire(wire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(branch: u64, choice: u32, context: u64) -> Decision {
        Decision::new(branch, choice, context)
    }

    #[test]
    fn trie_shape_reaches_terminal_containing_choice() {
        let mut builder = PolicyTrieBuilder::new();
        let key = Path::from(vec![d(1, 0, 0), d(2, 1, 0)]);
        builder.put(&key, 7);
        let trie = builder.build();
        let result = trie.choices_for_longest_suffix(&key);
        assert!(result.contains(&7));
    }

    #[test]
    fn count_conservation() {
        let mut builder = PolicyTrieBuilder::new();
        let a = Path::from(vec![d(1, 0, 0)]);
        let b = Path::from(vec![d(2, 0, 0)]);
        builder.put(&a, 1);
        builder.put(&b, 1);
        builder.put(&b, 2);
        let trie = builder.build();
        let total: u64 = [1u32, 2].iter().map(|&c| trie.count_for_choice(c)).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn suffix_lookup_matches_inserted_key() {
        let mut builder = PolicyTrieBuilder::new();
        let key = Path::from(vec![d(1, 0, 0), d(2, 1, 0), d(3, 0, 0)]);
        builder.put(&key, 9);
        let trie = builder.build();
        let history = Path::from(vec![d(9, 9, 0), d(1, 0, 0), d(2, 1, 0), d(3, 0, 0)]);
        let result = trie.choices_for_longest_suffix(&history);
        assert!(result.contains(&9));
    }

    #[test]
    fn longest_match_dominates_shorter_match() {
        let mut builder = PolicyTrieBuilder::new();
        let short = Path::from(vec![d(3, 0, 0)]);
        let long = Path::from(vec![d(2, 1, 0), d(3, 0, 0)]);
        builder.put(&short, 100);
        builder.put(&long, 200);
        let trie = builder.build();
        let history = Path::from(vec![d(2, 1, 0), d(3, 0, 0)]);
        let result = trie.choices_for_longest_suffix(&history);
        assert!(result.contains(&200));
        assert!(!result.contains(&100));
    }

    #[test]
    fn ties_are_broken_by_union() {
        let mut builder = PolicyTrieBuilder::new();
        let a = Path::from(vec![d(5, 0, 0), d(3, 0, 0)]);
        let b = Path::from(vec![d(5, 1, 0), d(3, 0, 0)]);
        builder.put(&a, 1);
        builder.put(&b, 2);
        let trie = builder.build();
        // history suffix only matches the length-1 edge (3,0) for both
        // candidates since the second-to-last decisions disagree with each.
        let history = Path::from(vec![d(9, 9, 0), d(3, 0, 0)]);
        let result = trie.choices_for_longest_suffix(&history);
        assert!(result.contains(&1));
        assert!(result.contains(&2));
    }

    #[test]
    fn empty_trie_returns_empty_set() {
        let trie = PolicyTrie::empty();
        let history = Path::from(vec![d(1, 0, 0)]);
        assert!(trie.choices_for_longest_suffix(&history).is_empty());
        assert!(trie.choices_for_longest_suffix(&Path::empty()).is_empty());
    }

    #[test]
    fn empty_key_insert_is_looked_up_via_empty_history() {
        let mut builder = PolicyTrieBuilder::new();
        builder.put(&Path::empty(), 42);
        let trie = builder.build();
        let result = trie.choices_for_longest_suffix(&Path::empty());
        assert!(result.contains(&42));
    }

    #[test]
    fn lookup_on_history_shorter_than_key_does_not_panic() {
        let mut builder = PolicyTrieBuilder::new();
        let key = Path::from(vec![d(1, 0, 0), d(2, 0, 0), d(3, 0, 0)]);
        builder.put(&key, 5);
        let trie = builder.build();
        let short_history = Path::from(vec![d(3, 0, 0)]);
        // must not panic; matches only the single shared edge
        let result = trie.choices_for_longest_suffix(&short_history);
        assert!(result.contains(&5));
    }

    #[test]
    fn serialization_round_trips() {
        let mut builder = PolicyTrieBuilder::new();
        builder.put(&Path::from(vec![d(1, 0, 0), d(2, 1, 0)]), 3);
        builder.put(&Path::empty(), 9);
        let trie = builder.build();
        let bytes = trie.to_bytes().unwrap();
        let restored = PolicyTrie::from_bytes(&bytes).unwrap();

        let history = Path::from(vec![d(1, 0, 0), d(2, 1, 0)]);
        assert_eq!(
            trie.choices_for_longest_suffix(&history),
            restored.choices_for_longest_suffix(&history)
        );
        assert_eq!(
            trie.choices_for_longest_suffix(&Path::empty()),
            restored.choices_for_longest_suffix(&Path::empty())
        );
        assert_eq!(trie.count_for_choice(3), restored.count_for_choice(3));
        assert_eq!(trie.count_for_choice(9), restored.count_for_choice(9));
    }

    #[test]
    fn bad_magic_is_rejected() {
        let bytes = vec![0u8; 16];
        assert!(matches!(
            PolicyTrie::from_bytes(&bytes),
            Err(PolicyIoError::BadMagic)
        ));
    }
}
