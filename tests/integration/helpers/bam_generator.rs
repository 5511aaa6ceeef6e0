//! Utilities for generating test inputs and running the binary.

#![allow(dead_code)]

use noodles::bam;
use noodles::sam::alignment::record_buf::RecordBuf;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tagbam_lib::sam::builder::SamBuilder;
use tempfile::TempDir;

/// One BED6 catalog line: chrom, start, end, name, strand.
pub type BedEntry<'a> = (&'a str, i64, i64, &'a str, char);

/// Paths of one test run inside a temporary directory.
pub struct TestRun {
    pub dir: TempDir,
    pub input: PathBuf,
    pub amplicons: PathBuf,
    pub output: PathBuf,
}

impl TestRun {
    /// Writes `builder`'s records (in their current order) and `entries` as the catalog.
    pub fn new(builder: &SamBuilder, entries: &[BedEntry<'_>]) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let input = dir.path().join("input.bam");
        let amplicons = dir.path().join("amplicons.bed");
        let output = dir.path().join("output.bam");

        builder.write_bam(&input).expect("Failed to write input BAM");
        write_amplicon_bed(&amplicons, entries);

        Self { dir, input, amplicons, output }
    }

    /// A path inside the run's temporary directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Runs the binary on this run's files with `extra` arguments appended.
    pub fn run(&self, extra: &[&str]) -> Output {
        let mut args = vec![
            self.input.to_str().unwrap(),
            self.amplicons.to_str().unwrap(),
            self.output.to_str().unwrap(),
        ];
        args.extend_from_slice(extra);
        run_tagbam(&args)
    }

    /// Runs the binary and panics with its stderr if it fails.
    pub fn run_ok(&self, extra: &[&str]) -> Vec<RecordBuf> {
        let output = self.run(extra);
        assert!(
            output.status.success(),
            "tagbam failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        read_records(&self.output)
    }
}

/// Writes a BED6 catalog.
pub fn write_amplicon_bed(path: &Path, entries: &[BedEntry<'_>]) {
    let content: String = entries
        .iter()
        .map(|(chrom, start, end, name, strand)| {
            format!("{chrom}\t{start}\t{end}\t{name}\t0\t{strand}\n")
        })
        .collect();
    fs::write(path, content).expect("Failed to write amplicon catalog");
}

/// Runs the tagbam binary with `args`.
pub fn run_tagbam(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tagbam"))
        .args(args)
        .output()
        .expect("Failed to run tagbam")
}

/// Reads all records of a BAM file.
pub fn read_records(path: &Path) -> Vec<RecordBuf> {
    let mut reader =
        bam::io::reader::Builder.build_from_path(path).expect("Failed to open output BAM");
    let header = reader.read_header().expect("Failed to read header");
    reader.record_bufs(&header).map(|r| r.expect("Failed to read record")).collect()
}

/// Reads the header of a BAM file.
pub fn read_header(path: &Path) -> noodles::sam::Header {
    let mut reader =
        bam::io::reader::Builder.build_from_path(path).expect("Failed to open output BAM");
    reader.read_header().expect("Failed to read header")
}
