//! Choosing the amplicon for a fragment.

use std::fmt;

use crate::interval_index::{ChromosomeIndex, FragmentSpan, IntervalHit};

/// Outcome of resolving a fragment against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentDecision {
    /// The fragment was attributed to the named amplicon.
    Assigned(String),
    /// No amplicon was close enough.
    Unassigned,
}

impl AssignmentDecision {
    /// The assigned amplicon name, if any.
    #[must_use]
    pub fn amplicon(&self) -> Option<&str> {
        match self {
            AssignmentDecision::Assigned(name) => Some(name),
            AssignmentDecision::Unassigned => None,
        }
    }

    #[must_use]
    pub fn is_assigned(&self) -> bool {
        matches!(self, AssignmentDecision::Assigned(_))
    }
}

impl fmt::Display for AssignmentDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentDecision::Assigned(name) => write!(f, "{name}"),
            AssignmentDecision::Unassigned => write!(f, "*"),
        }
    }
}

/// A decision together with what the index returned, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub decision: AssignmentDecision,
    /// Number of candidate intervals inside the distance window
    pub candidates: usize,
    /// Distance of the closest candidate
    pub best_distance: Option<i64>,
}

/// Resolves a fragment to the closest amplicon on its strand.
///
/// The closest candidate is accepted only if its distance is strictly less than `max_dist`.
#[must_use]
pub fn resolve(index: &ChromosomeIndex<'_>, span: &FragmentSpan, max_dist: i64) -> Resolution {
    let hits = index.query(span, max_dist);
    let best: Option<&IntervalHit<'_>> = hits.first();

    let decision = match best {
        Some(hit) if hit.distance < max_dist => {
            AssignmentDecision::Assigned(hit.interval.name.clone())
        }
        _ => AssignmentDecision::Unassigned,
    };

    Resolution { decision, candidates: hits.len(), best_distance: best.map(|h| h.distance) }
}
