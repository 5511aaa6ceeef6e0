//! Tag paired-end BAM records with the amplicon each fragment was sequenced from.
//!
//! Each fragment's outer extent is matched against a BED6 amplicon catalog on the same
//! chromosome and strand. The closest amplicon, by the summed distance of both ends, is
//! written to the `XN` tag of both mates when that distance is below `--max-dist`.

use anyhow::Result;
use clap::Parser;
use log::{info, warn};
use noodles::sam::Header;
use noodles::sam::alignment::io::Write as AlignmentWrite;

use tagbam_lib::annotator::{AmpliconAnnotator, AnnotatorOptions, UnassignedTagPolicy};
use tagbam_lib::bam_io::{
    BamReaderAuto, BamWriter, create_bam_reader, create_bam_writer, finish_bam_writer,
};
use tagbam_lib::catalog::AmpliconCatalog;
use tagbam_lib::errors::TagbamError;
use tagbam_lib::header::check_coordinate_sort;
use tagbam_lib::logging::{OperationTimer, format_count, log_annotation_summary};
use tagbam_lib::metrics::write_metrics;
use tagbam_lib::progress::{DEFAULT_PROGRESS_INTERVAL, ProgressTracker};
use tagbam_lib::sam::MappedRecord;
use tagbam_lib::validation::string_to_tag;

use crate::commands::command::Command;
use crate::commands::common::{
    AnnotateIoOptions, CompressionOptions, MetricsOptions, ThreadingOptions, add_pg_record,
};

/// Tag paired-end alignments with their source amplicon.
#[derive(Debug, Parser)]
#[command(
    name = "tagbam",
    version,
    about = "Tag paired-end BAM records with the amplicon they were sequenced from",
    long_about = r#"
Tag paired-end BAM records with the amplicon they were sequenced from.

For every mapped proper pair the fragment extent is computed from the record's position
and template length. It is compared with the amplicons in the BED6 catalog that lie on the
same chromosome and strand, scoring each by |fragment end - amplicon end| +
|amplicon start - fragment start|. The closest amplicon is written to the XN tag of both
mates when its score is strictly below --max-dist.

The fragment strand is '+' when read 1 is on the forward strand and '-' otherwise, so the
strand column of the catalog must follow the same convention.

The input must be coordinate sorted (at least grouped by reference sequence). Records that
are not in a mapped proper pair are written unchanged. When the pair was seen but not
assigned, the mate gets an empty XN tag unless --unassigned-tag omit is given.

Example usage:
  tagbam aligned.bam amplicons.bed tagged.bam
  tagbam aligned.bam amplicons.bed.gz tagged.bam -d 10 --metrics tagged.metrics.txt
"#
)]
pub struct TagAmplicons {
    #[command(flatten)]
    pub io: AnnotateIoOptions,

    /// Combined end distance at or above which a fragment is left unassigned
    #[arg(short = 'd', long = "max-dist", default_value_t = 5)]
    pub max_dist: u32,

    /// Tag to write the amplicon name to
    #[arg(long = "tag", default_value = "XN")]
    pub tag: String,

    /// What to write on the second mate of a pair that was not assigned
    #[arg(long = "unassigned-tag", value_enum, default_value_t = UnassignedTagPolicy::Empty)]
    pub unassigned_tag: UnassignedTagPolicy,

    #[command(flatten)]
    pub metrics: MetricsOptions,

    #[command(flatten)]
    pub threading: ThreadingOptions,

    #[command(flatten)]
    pub compression: CompressionOptions,

    /// Log one line per resolved fragment
    #[arg(short = 'v', long = "verbose", default_value_t = false)]
    pub verbose: bool,
}

impl TagAmplicons {
    fn annotator_options(&self) -> Result<AnnotatorOptions> {
        Ok(AnnotatorOptions {
            max_dist: i64::from(self.max_dist),
            tag: string_to_tag(&self.tag, "--tag")?,
            unassigned_policy: self.unassigned_tag,
        })
    }
}

impl TagAmplicons {
    /// Annotates every input record and writes it out, then finishes the writer.
    ///
    /// Returns the number of records written.
    fn stream_records(
        &self,
        reader: &mut BamReaderAuto,
        header: &Header,
        output_header: &Header,
        mut writer: BamWriter,
        annotator: &mut AmpliconAnnotator<'_>,
    ) -> Result<u64> {
        let mut progress = ProgressTracker::new("Processed records")
            .with_interval(DEFAULT_PROGRESS_INTERVAL);
        let input_path = self.io.input.display().to_string();
        let output_path = self.io.output.display().to_string();

        for result in reader.record_bufs(header) {
            let mut record = result
                .map_err(|source| TagbamError::InputStream { path: input_path.clone(), source })?;

            annotator.annotate(&mut MappedRecord::new(&mut record, header))?;

            writer.write_alignment_record(output_header, &record).map_err(|source| {
                TagbamError::OutputStream { path: output_path.clone(), source }
            })?;
            progress.record(1);
        }
        progress.log_final();

        finish_bam_writer(writer, &self.io.output)?;
        Ok(progress.count())
    }
}

impl Command for TagAmplicons {
    fn execute(&self, command_line: &str) -> Result<()> {
        self.io.validate()?;
        let options = self.annotator_options()?;

        info!("Input: {}", self.io.input.display());
        info!("Amplicons: {}", self.io.amplicons.display());
        info!("Output: {}", self.io.output.display());
        info!("Max distance: {}", options.max_dist);
        info!("Tag: {}", self.tag);
        info!("{}", self.threading.log_message());

        let catalog = AmpliconCatalog::load(&self.io.amplicons)?;
        info!("Loaded {} amplicon intervals", format_count(catalog.len() as u64));

        let threads = self.threading.num_threads();
        let (mut reader, header) = create_bam_reader(&self.io.input, threads)?;
        check_coordinate_sort(&header, "Input BAM");

        let output_header = add_pg_record(header.clone(), command_line)?;
        let writer = create_bam_writer(
            &self.io.output,
            &output_header,
            threads,
            self.compression.compression_level,
        )?;

        let timer = OperationTimer::new("Annotating records");
        let mut annotator = AmpliconAnnotator::new(&catalog, options);

        let count = match self.stream_records(
            &mut reader,
            &header,
            &output_header,
            writer,
            &mut annotator,
        ) {
            Ok(count) => count,
            Err(e) => {
                // The writer is dropped by now, so the partially tagged BAM can be removed.
                if let Err(remove_err) = std::fs::remove_file(&self.io.output) {
                    warn!(
                        "Failed to remove incomplete output {}: {remove_err}",
                        self.io.output.display()
                    );
                }
                return Err(e);
            }
        };
        timer.log_completion(count);

        let metrics = annotator.metrics();
        log_annotation_summary(&metrics, options.max_dist);

        if let Some(path) = &self.metrics.metrics {
            write_metrics(path, &[metrics])?;
            info!("Wrote run metrics to {}", path.display());
        }
        if let Some(path) = &self.metrics.amplicon_counts {
            write_metrics(path, &annotator.amplicon_counts())?;
            info!("Wrote amplicon counts to {}", path.display());
        }

        Ok(())
    }
}
