//! Run metrics for amplicon annotation and their TSV output.

use anyhow::{Context, Result};
use fgoxide::io::DelimFile;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A serializable metric type with a name used in error messages.
pub trait Metric: Serialize {
    /// Human-readable name of the metric type.
    fn metric_name() -> &'static str;
}

/// Counts describing one annotation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationMetrics {
    /// Records read from the input
    pub total_records: u64,
    /// Records whose fragment span was computed and resolved
    pub eligible_records: u64,
    /// Records whose read-pair name was already cached
    pub cache_hits: u64,
    /// Records that failed the eligibility check and had no cached decision
    pub ineligible_records: u64,
    /// Records tagged with an amplicon name
    pub tagged_records: u64,
    /// Records given an empty tag from a cached unassigned decision
    pub empty_tagged_records: u64,
    /// Resolved fragments attributed to an amplicon
    pub assigned_fragments: u64,
    /// Resolved fragments with no amplicon close enough
    pub unassigned_fragments: u64,
    /// Chromosomes entered while resolving fragments
    pub chromosomes: u64,
    /// `tagged_records / total_records`
    pub fraction_tagged: f64,
}

impl AnnotationMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes the derived fraction from the counts.
    pub fn finalize(&mut self) {
        self.fraction_tagged = if self.total_records == 0 {
            0.0
        } else {
            self.tagged_records as f64 / self.total_records as f64
        };
    }
}

impl Metric for AnnotationMetrics {
    fn metric_name() -> &'static str {
        "annotation"
    }
}

/// Number of records tagged with one amplicon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmpliconCountMetric {
    pub name: String,
    pub chrom: String,
    pub start: i64,
    pub end: i64,
    pub strand: char,
    pub records: u64,
}

impl Metric for AmpliconCountMetric {
    fn metric_name() -> &'static str {
        "amplicon count"
    }
}

/// Write metrics to a TSV file with consistent error handling.
///
/// # Errors
/// Returns an error if the file cannot be created or written to
pub fn write_metrics<P: AsRef<Path>, T: Metric>(path: P, metrics: &[T]) -> Result<()> {
    let path_ref = path.as_ref();
    DelimFile::default().write_tsv(&path_ref, metrics).with_context(|| {
        format!("Failed to write {} metrics: {}", T::metric_name(), path_ref.display())
    })
}
