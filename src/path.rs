//! Ordered decision history.
//!
//! A [`Path`] is the local execution history the policy components reason
//! about: either the full chronological record up to a branching point
//! (context-free) or the record filtered down to the current stack frame
//! (context-preserving). Once built it does not change — it is consumed as
//! a trie key or as a lookup query, never mutated in place.

use crate::decision::{ContextId, Decision};

/// A finite, ordered sequence of [`Decision`]s, index 0 = oldest.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Path(Vec<Decision>);

impl Path {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Builds a path from the most recent decisions in `history`, in
    /// chronological order (oldest first), bounded by `max_size`.
    ///
    /// When `ctx_preserving` is set, traversal walks backward from the end
    /// of `history` and stops as soon as it meets a decision whose context
    /// differs from `anchor_context` — the decisions kept are exactly those
    /// made in the same stack frame as the branch about to be decided.
    pub fn new(
        history: &[Decision],
        ctx_preserving: bool,
        anchor_context: ContextId,
        max_size: Option<usize>,
    ) -> Self {
        let mut collected: Vec<Decision> = Vec::new();
        for decision in history.iter().rev() {
            if ctx_preserving && decision.context != anchor_context {
                break;
            }
            if let Some(limit) = max_size {
                if collected.len() >= limit {
                    break;
                }
            }
            collected.push(*decision);
        }
        collected.reverse();
        Self(collected)
    }

    /// The longest contiguous run of `self[..from_idx]` whose decisions all
    /// share `self[from_idx]`'s context, walking backward from `from_idx-1`,
    /// bounded by `max_size`. Used by [`crate::policy::generator`] to build
    /// the context-preserving prefix ending just before a recorded decision.
    pub fn ctx_preserving_suffix(&self, from_idx: usize, max_size: Option<usize>) -> Self {
        let Some(anchor) = self.0.get(from_idx) else {
            return Self::empty();
        };
        let anchor_context = anchor.context;
        let mut collected: Vec<Decision> = Vec::new();
        for idx in (0..from_idx).rev() {
            let decision = &self.0[idx];
            if decision.context != anchor_context {
                break;
            }
            if let Some(limit) = max_size {
                if collected.len() >= limit {
                    break;
                }
            }
            collected.push(*decision);
        }
        collected.reverse();
        Self(collected)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&Decision> {
        self.0.last()
    }

    pub fn get(&self, idx: usize) -> Option<&Decision> {
        self.0.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Decision> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Decision] {
        &self.0
    }
}

impl std::ops::Index<usize> for Path {
    type Output = Decision;
    fn index(&self, idx: usize) -> &Decision {
        &self.0[idx]
    }
}

impl From<Vec<Decision>> for Path {
    fn from(decisions: Vec<Decision>) -> Self {
        Self(decisions)
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, decision) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", decision)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(branch: u64, choice: u32, context: u64) -> Decision {
        Decision::new(branch, choice, context)
    }

    #[test]
    fn context_free_bounds_by_max_size() {
        let history = vec![d(1, 0, 1), d(2, 0, 1), d(3, 0, 2)];
        let path = Path::new(&history, false, 2, Some(2));
        assert_eq!(path.len(), 2);
        assert_eq!(path[0], d(2, 0, 1));
        assert_eq!(path[1], d(3, 0, 2));
    }

    #[test]
    fn context_preserving_stops_at_foreign_frame() {
        let history = vec![d(1, 0, 1), d(2, 0, 2), d(3, 0, 2)];
        let path = Path::new(&history, true, 2, Some(8));
        assert_eq!(path.len(), 2);
        assert_eq!(path[0], d(2, 0, 2));
        assert_eq!(path[1], d(3, 0, 2));
    }

    #[test]
    fn suffix_within_context_from_existing_path() {
        let full = Path::from(vec![d(1, 1, 9), d(5, 0, 9), d(9, 1, 9)]);
        let suffix = full.ctx_preserving_suffix(2, Some(8));
        assert_eq!(suffix.len(), 2);
        assert_eq!(suffix[0], d(1, 1, 9));
        assert_eq!(suffix[1], d(5, 0, 9));
    }

    #[test]
    fn suffix_out_of_range_is_empty() {
        let full = Path::from(vec![d(1, 1, 9)]);
        assert!(full.ctx_preserving_suffix(5, None).is_empty());
    }
}
