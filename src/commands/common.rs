//! CLI option groups, composed into commands with `#[command(flatten)]`.

use std::path::PathBuf;

use clap::Args;
use noodles::sam::Header;

use tagbam_lib::bam_io::DEFAULT_COMPRESSION_LEVEL;
use tagbam_lib::validation::{validate_files_exist, validate_output_parent};

/// Adds this program's @PG record, chained to the input's last program.
pub fn add_pg_record(header: Header, command_line: &str) -> anyhow::Result<Header> {
    tagbam_lib::header::add_pg_record(header, crate::version::VERSION.as_str(), command_line)
}

/// Input BAM, amplicon catalog and output BAM, given positionally.
#[derive(Debug, Clone, Args)]
pub struct AnnotateIoOptions {
    /// Coordinate-sorted input BAM of paired-end alignments
    #[arg(value_name = "INPUT_BAM")]
    pub input: PathBuf,

    /// Amplicon catalog in BED6 format (optionally gzipped)
    #[arg(value_name = "AMPLICONS_BED")]
    pub amplicons: PathBuf,

    /// Output BAM
    #[arg(value_name = "OUTPUT_BAM")]
    pub output: PathBuf,
}

impl AnnotateIoOptions {
    /// Validates that both inputs exist and the output directory is writable in principle.
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_files_exist(&[(&self.input, "Input BAM"), (&self.amplicons, "Amplicon catalog")])?;
        validate_output_parent(&self.output, "Output BAM")?;
        Ok(())
    }
}

/// Optional metrics outputs.
#[derive(Debug, Clone, Default, Args)]
pub struct MetricsOptions {
    /// Write run metrics as a one-row TSV
    #[arg(long = "metrics", value_name = "PATH")]
    pub metrics: Option<PathBuf>,

    /// Write per-amplicon tagged-record counts as a TSV, in catalog order
    #[arg(long = "amplicon-counts", value_name = "PATH")]
    pub amplicon_counts: Option<PathBuf>,
}

/// Threads used for BGZF (de)compression.
#[derive(Debug, Clone, Args)]
pub struct ThreadingOptions {
    /// Number of BGZF compression/decompression threads (1 = no worker threads)
    #[arg(long = "threads", default_value_t = 1)]
    pub threads: usize,
}

impl Default for ThreadingOptions {
    fn default() -> Self {
        Self { threads: 1 }
    }
}

impl ThreadingOptions {
    #[must_use]
    pub fn new(threads: usize) -> Self {
        Self { threads }
    }

    /// Thread count, treating 0 as 1.
    #[must_use]
    pub fn num_threads(&self) -> usize {
        self.threads.max(1)
    }

    #[must_use]
    pub fn log_message(&self) -> String {
        match self.num_threads() {
            1 => "Single-threaded BGZF".to_string(),
            n => format!("Using {n} BGZF threads"),
        }
    }
}

/// Output compression.
#[derive(Debug, Clone, Args)]
pub struct CompressionOptions {
    /// BGZF compression level for the output BAM. Level 1 is fastest.
    #[arg(long, default_value_t = DEFAULT_COMPRESSION_LEVEL)]
    pub compression_level: u32,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self { compression_level: DEFAULT_COMPRESSION_LEVEL }
    }
}
