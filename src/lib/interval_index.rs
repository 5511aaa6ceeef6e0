//! Chromosome-scoped view of the amplicon catalog.
//!
//! A [`ChromosomeIndex`] holds the catalog intervals of exactly one chromosome, sorted by
//! start so that a query only visits intervals whose start can satisfy the distance window.
//! Each interval keeps its catalog ordinal; hits are returned ordered by
//! `(distance, ordinal)`, which is the same order a stable sort by distance over the
//! catalog order would produce.

use crate::catalog::{AmpliconCatalog, AmpliconInterval, Strand};

/// Genomic span and orientation of a sequenced fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentSpan {
    /// Reference sequence name
    pub chromosome: String,
    /// 0-based start of the fragment
    pub start: i64,
    /// End of the fragment (`start + |tlen| - 1`)
    pub end: i64,
    /// Fragment orientation
    pub strand: Strand,
}

/// An interval satisfying a query, with its combined end distance to the fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalHit<'c> {
    /// The matching catalog interval
    pub interval: &'c AmpliconInterval,
    /// `|interval.end - span.end| + |interval.start - span.start|`
    pub distance: i64,
    /// Position of the interval in the catalog
    pub ordinal: usize,
}

#[derive(Debug, Clone, Copy)]
struct Entry<'c> {
    interval: &'c AmpliconInterval,
    ordinal: usize,
}

/// The intervals of one chromosome.
#[derive(Debug, Clone, Default)]
pub struct ChromosomeIndex<'c> {
    chromosome: Option<String>,
    entries: Vec<Entry<'c>>,
}

impl<'c> ChromosomeIndex<'c> {
    /// Builds the index of all catalog intervals on `chromosome`.
    ///
    /// This is a pure function of its inputs.
    #[must_use]
    pub fn for_chromosome(catalog: &'c AmpliconCatalog, chromosome: &str) -> Self {
        let mut entries: Vec<Entry<'c>> = catalog
            .intervals()
            .iter()
            .enumerate()
            .filter(|(_, interval)| interval.chromosome == chromosome)
            .map(|(ordinal, interval)| Entry { interval, ordinal })
            .collect();
        // Stable: equal starts stay in catalog order.
        entries.sort_by_key(|e| e.interval.start);

        Self { chromosome: Some(chromosome.to_string()), entries }
    }

    /// An index that matches nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The chromosome this index covers, if any.
    #[must_use]
    pub fn chromosome(&self) -> Option<&str> {
        self.chromosome.as_deref()
    }

    /// Number of intervals on this chromosome.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the chromosome has no intervals.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds all intervals on the fragment's strand with
    /// `interval.end <= span.end + max_dist` and `interval.start >= span.start - max_dist`,
    /// ordered by ascending distance with ties in catalog order.
    ///
    /// The span's chromosome is not consulted; callers query the index built for it.
    #[must_use]
    pub fn query(&self, span: &FragmentSpan, max_dist: i64) -> Vec<IntervalHit<'c>> {
        let min_start = span.start - max_dist;
        let max_end = span.end + max_dist;

        let first = self.entries.partition_point(|e| e.interval.start < min_start);

        let mut hits: Vec<IntervalHit<'c>> = self.entries[first..]
            .iter()
            // start <= end <= max_end, so nothing further right can match.
            .take_while(|e| e.interval.start <= max_end)
            .filter(|e| e.interval.end <= max_end && e.interval.strand == span.strand)
            .map(|e| IntervalHit {
                interval: e.interval,
                distance: (e.interval.end - span.end).abs() + (e.interval.start - span.start).abs(),
                ordinal: e.ordinal,
            })
            .collect();

        hits.sort_by_key(|h| (h.distance, h.ordinal));
        hits
    }
}
