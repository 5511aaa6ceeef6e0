//! Record-by-record amplicon annotation.
//!
//! [`AmpliconAnnotator`] is fed records in genomic order and tags each one with the amplicon
//! its fragment most plausibly came from. The first record of a pair to be resolved fixes the
//! decision for the pair; its mate reuses the cached decision.
//!
//! Each record falls in one of three states (see [`RecordState`]):
//!
//! - **cache hit**: the pair name has a cached decision, which is applied directly. An
//!   unassigned decision writes an empty tag unless [`UnassignedTagPolicy::Omit`] is set.
//! - **eligible, unseen**: the span is computed, resolved against the current chromosome's
//!   index, cached, and applied if assigned.
//! - **ineligible**: an unassigned decision is cached for the pair and no tag is written.
//!
//! Input must be grouped by chromosome. Chromosome transitions are detected on the eligible
//! path, before the cache lookup; each one rebuilds the [`ChromosomeContext`] (index and
//! cache). Ineligible records never switch chromosome. A chromosome that reappears after the
//! stream has left it is an error.

use ahash::{AHashMap, AHashSet};
use clap::ValueEnum;
use log::{debug, info};
use noodles::sam::alignment::record::data::field::Tag;

use crate::assignment::{AssignmentDecision, resolve};
use crate::catalog::AmpliconCatalog;
use crate::errors::{Result, TagbamError};
use crate::fragment::{AlignmentView, compute_span};
use crate::interval_index::ChromosomeIndex;
use crate::metrics::{AmpliconCountMetric, AnnotationMetrics};
use crate::pair_cache::PairAssignmentCache;

/// Default tag holding the amplicon name.
pub const AMPLICON_TAG: Tag = Tag::new(b'X', b'N');

/// Default maximum combined end distance.
pub const DEFAULT_MAX_DIST: i64 = 5;

/// What to write on a mate whose pair was resolved as unassigned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum UnassignedTagPolicy {
    /// Write the tag with an empty string value.
    #[default]
    #[value(name = "empty")]
    Empty,
    /// Leave the record untagged.
    #[value(name = "omit")]
    Omit,
}

/// How a record was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    CacheHit,
    EligibleUnseen,
    Ineligible,
}

/// Annotation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotatorOptions {
    pub max_dist: i64,
    pub tag: Tag,
    pub unassigned_policy: UnassignedTagPolicy,
}

impl Default for AnnotatorOptions {
    fn default() -> Self {
        Self {
            max_dist: DEFAULT_MAX_DIST,
            tag: AMPLICON_TAG,
            unassigned_policy: UnassignedTagPolicy::default(),
        }
    }
}

/// The index and pair cache of the chromosome currently being processed.
#[derive(Debug)]
pub struct ChromosomeContext<'c> {
    index: ChromosomeIndex<'c>,
    cache: PairAssignmentCache,
    entered: bool,
}

impl<'c> ChromosomeContext<'c> {
    /// Builds a fresh context for `chromosome`, or an empty one for `None`.
    #[must_use]
    pub fn new(catalog: &'c AmpliconCatalog, chromosome: Option<&str>) -> Self {
        let index = match chromosome {
            Some(name) => ChromosomeIndex::for_chromosome(catalog, name),
            None => ChromosomeIndex::empty(),
        };
        Self { index, cache: PairAssignmentCache::new(), entered: false }
    }

    #[must_use]
    pub fn chromosome(&self) -> Option<&str> {
        self.index.chromosome()
    }

    #[must_use]
    pub fn index(&self) -> &ChromosomeIndex<'c> {
        &self.index
    }

    #[must_use]
    pub fn cache(&self) -> &PairAssignmentCache {
        &self.cache
    }
}

/// Drives the annotation state machine over a stream of records.
#[derive(Debug)]
pub struct AmpliconAnnotator<'c> {
    catalog: &'c AmpliconCatalog,
    options: AnnotatorOptions,
    context: ChromosomeContext<'c>,
    visited: AHashSet<String>,
    metrics: AnnotationMetrics,
    amplicon_records: AHashMap<String, u64>,
}

impl<'c> AmpliconAnnotator<'c> {
    /// Creates an annotator positioned on the catalog's first chromosome.
    #[must_use]
    pub fn new(catalog: &'c AmpliconCatalog, options: AnnotatorOptions) -> Self {
        Self {
            catalog,
            options,
            context: ChromosomeContext::new(catalog, catalog.first_chromosome()),
            visited: AHashSet::new(),
            metrics: AnnotationMetrics::new(),
            amplicon_records: AHashMap::new(),
        }
    }

    #[must_use]
    pub fn options(&self) -> &AnnotatorOptions {
        &self.options
    }

    #[must_use]
    pub fn context(&self) -> &ChromosomeContext<'c> {
        &self.context
    }

    /// Annotates one record in place and reports which state it was handled in.
    ///
    /// # Errors
    ///
    /// Returns [`TagbamError::UnsortedInput`] if the record's chromosome was already left.
    pub fn annotate<R: AlignmentView + ?Sized>(&mut self, record: &mut R) -> Result<RecordState> {
        self.metrics.total_records += 1;

        // An eligible record switches chromosome before the cache is consulted, so a name
        // cached on the previous chromosome can never answer for it.
        let span = compute_span(record);
        if let Some(span) = &span {
            self.enter_chromosome(&span.chromosome)?;
        }

        if let Some(decision) = self.context.cache.get(record.query_name()).cloned() {
            self.metrics.cache_hits += 1;
            self.apply_cached(record, &decision);
            return Ok(RecordState::CacheHit);
        }

        let Some(span) = span else {
            self.metrics.ineligible_records += 1;
            self.context.cache.put(record.query_name(), AssignmentDecision::Unassigned);
            return Ok(RecordState::Ineligible);
        };

        self.metrics.eligible_records += 1;

        let resolution = resolve(&self.context.index, &span, self.options.max_dist);
        debug!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            span.chromosome,
            span.start,
            span.end,
            String::from_utf8_lossy(record.query_name()),
            span.strand,
            resolution.decision,
            resolution.candidates,
            resolution.best_distance.map_or_else(|| "*".to_string(), |d| d.to_string()),
        );

        match resolution.decision.amplicon() {
            Some(name) => {
                self.metrics.assigned_fragments += 1;
                self.tag_with_amplicon(record, name);
            }
            None => self.metrics.unassigned_fragments += 1,
        }
        self.context.cache.put(record.query_name(), resolution.decision);

        Ok(RecordState::EligibleUnseen)
    }

    /// Run metrics so far, with derived fields filled in.
    #[must_use]
    pub fn metrics(&self) -> AnnotationMetrics {
        let mut metrics = self.metrics.clone();
        metrics.finalize();
        metrics
    }

    /// Tagged-record counts for every catalog interval, in catalog order.
    #[must_use]
    pub fn amplicon_counts(&self) -> Vec<AmpliconCountMetric> {
        self.catalog
            .intervals()
            .iter()
            .map(|interval| AmpliconCountMetric {
                name: interval.name.clone(),
                chrom: interval.chromosome.clone(),
                start: interval.start,
                end: interval.end,
                strand: interval.strand.as_char(),
                records: self.amplicon_records.get(&interval.name).copied().unwrap_or(0),
            })
            .collect()
    }

    fn apply_cached<R: AlignmentView + ?Sized>(&mut self, record: &mut R, decision: &AssignmentDecision) {
        match decision {
            AssignmentDecision::Assigned(name) => self.tag_with_amplicon(record, name),
            AssignmentDecision::Unassigned => {
                if self.options.unassigned_policy == UnassignedTagPolicy::Empty {
                    record.set_string_tag(self.options.tag, "");
                    self.metrics.empty_tagged_records += 1;
                }
            }
        }
    }

    fn tag_with_amplicon<R: AlignmentView + ?Sized>(&mut self, record: &mut R, name: &str) {
        record.set_string_tag(self.options.tag, name);
        self.metrics.tagged_records += 1;
        *self.amplicon_records.entry(name.to_string()).or_insert(0) += 1;
    }

    /// Makes `chromosome` the current context, rebuilding the index and clearing the pair
    /// cache if it differs from the current one.
    fn enter_chromosome(&mut self, chromosome: &str) -> Result<()> {
        if self.context.chromosome() == Some(chromosome) {
            if !self.context.entered {
                self.context.entered = true;
                self.visited.insert(chromosome.to_string());
                self.metrics.chromosomes += 1;
            }
            return Ok(());
        }

        if self.visited.contains(chromosome) {
            return Err(TagbamError::UnsortedInput { chromosome: chromosome.to_string() });
        }

        self.context = ChromosomeContext::new(self.catalog, Some(chromosome));
        self.context.entered = true;
        self.visited.insert(chromosome.to_string());
        self.metrics.chromosomes += 1;
        info!(
            "Now on chromosome {chromosome} ({} amplicon intervals)",
            self.context.index.len()
        );
        Ok(())
    }
}
