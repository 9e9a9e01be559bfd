//! Identity of a single branch choice.
//!
//! A [`Decision`] is a plain value: no construction can fail, and there is
//! nothing to validate. It is produced once per branch event the host
//! delivers and is otherwise inert.

use std::hash::{Hash, Hasher};

/// Uniquely identifies a branch site, typically derived from the
/// program-counter location of the conditional instruction.
pub type BranchId = u64;

/// The non-negative label of the taken edge at a branch site.
/// 0/1 for binary branches; wider for switches.
pub type ChoiceIndex = u32;

/// Opaque handle to the enclosing procedure activation, supplied by the
/// host. Two activations compare equal only when they denote the same
/// frame — the host is responsible for minting fresh ids per activation.
pub type ContextId = u64;

/// A single branching decision: (branch site, choice taken, enclosing frame).
///
/// Equality and hashing use only `branch` and `choice`; `context` rides
/// along as metadata for history extraction (see [`crate::path::Path`]) and
/// plays no part in trie keying. Two decisions from different stack frames
/// that happened to pick the same edge are the *same* key.
#[derive(Debug, Clone, Copy, Eq, serde::Serialize, serde::Deserialize)]
pub struct Decision {
    pub branch: BranchId,
    pub choice: ChoiceIndex,
    pub context: ContextId,
}

impl Decision {
    pub fn new(branch: BranchId, choice: ChoiceIndex, context: ContextId) -> Self {
        Self {
            branch,
            choice,
            context,
        }
    }
}

impl PartialEq for Decision {
    fn eq(&self, other: &Self) -> bool {
        self.branch == other.branch && self.choice == other.choice
    }
}

impl Hash for Decision {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.branch.hash(state);
        self.choice.hash(state);
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "b{}:{}@{}", self.branch, self.choice, self.context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_context() {
        let a = Decision::new(1, 0, 100);
        let b = Decision::new(1, 0, 200);
        assert_eq!(a, b);
    }

    #[test]
    fn inequality_on_branch_or_choice() {
        let a = Decision::new(1, 0, 100);
        let b = Decision::new(2, 0, 100);
        let c = Decision::new(1, 1, 100);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn hash_matches_eq_contract() {
        use std::collections::hash_map::DefaultHasher;
        let a = Decision::new(1, 0, 100);
        let b = Decision::new(1, 0, 200);
        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }
}
