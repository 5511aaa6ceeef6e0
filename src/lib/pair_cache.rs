//! Per-chromosome memo of read-pair assignments.
//!
//! Keys are bare query names, so the cache is only valid for the chromosome it was filled on
//! and must be reset on every chromosome transition.

use ahash::AHashMap;

use crate::assignment::AssignmentDecision;

/// Assignment decisions keyed by read-pair name.
#[derive(Debug, Default)]
pub struct PairAssignmentCache {
    decisions: AHashMap<Vec<u8>, AssignmentDecision>,
}

impl PairAssignmentCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached decision for `name`, if any.
    #[must_use]
    pub fn get(&self, name: &[u8]) -> Option<&AssignmentDecision> {
        self.decisions.get(name)
    }

    /// Records the decision for `name`, replacing any previous one.
    pub fn put(&mut self, name: &[u8], decision: AssignmentDecision) {
        self.decisions.insert(name.to_vec(), decision);
    }

    /// Forgets every cached decision.
    pub fn reset_all(&mut self) {
        self.decisions.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }
}
