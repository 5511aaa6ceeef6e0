//! End-to-end tests for amplicon tagging.

use fgoxide::io::DelimFile;
use noodles::sam::alignment::record::data::field::Tag;
use std::fs;
use std::io::Write;
use tagbam_lib::metrics::{AmpliconCountMetric, AnnotationMetrics};
use tagbam_lib::sam::builder::{SamBuilder, Strand};

use crate::helpers::assertions::{XN, assert_pair_tags, assert_tag, name_of, tag_table};
use crate::helpers::bam_generator::{TestRun, read_header, read_records, run_tagbam};

const AMP1: (&str, i64, i64, &str, char) = ("chr1", 100, 200, "AMP1", '+');

/// One forward pair whose read 1 starts at 0-based `start` with template length `tlen`.
fn add_forward_pair(builder: &mut SamBuilder, name: &str, contig: usize, start: usize, tlen: i32) {
    let _ = builder
        .add_pair()
        .name(name)
        .contig(contig)
        .start1(start + 1)
        .start2(start + 1 + tlen as usize - 100)
        .template_length(tlen)
        .build();
}

#[test]
fn test_tags_both_mates_within_max_dist() {
    let mut builder = SamBuilder::new();
    add_forward_pair(&mut builder, "near", 0, 98, 103);
    builder.sort_by_coordinate();

    let run = TestRun::new(&builder, &[AMP1]);
    let records = run.run_ok(&[]);

    assert_eq!(records.len(), 2);
    assert_pair_tags(&records, "near", [Some("AMP1"), Some("AMP1")]);
}

#[test]
fn test_distance_equal_to_max_dist_is_not_assigned() {
    let mut builder = SamBuilder::new();
    // span [100, 205]: distance 5
    add_forward_pair(&mut builder, "far", 0, 100, 106);
    builder.sort_by_coordinate();

    let run = TestRun::new(&builder, &[AMP1]);
    let records = run.run_ok(&[]);

    // First mate resolves to nothing, second mate picks up the cached unassigned decision.
    assert_eq!(
        tag_table(&records, XN),
        vec![("far".to_string(), true, None), ("far".to_string(), false, Some(String::new()))]
    );

    let records = run.run_ok(&["--max-dist", "6"]);
    assert_pair_tags(&records, "far", [Some("AMP1"), Some("AMP1")]);
}

#[test]
fn test_unassigned_tag_omit() {
    let mut builder = SamBuilder::new();
    add_forward_pair(&mut builder, "far", 0, 500, 150);
    builder.sort_by_coordinate();

    let run = TestRun::new(&builder, &[AMP1]);
    let records = run.run_ok(&["--unassigned-tag", "omit"]);

    assert_pair_tags(&records, "far", [None, None]);
}

#[test]
fn test_reverse_strand_fragment() {
    let mut builder = SamBuilder::new();
    // Read 2 is forward at 0-based 100, read 1 reverse; template [100, 249] on '-'.
    let _ = builder
        .add_pair()
        .name("rev")
        .start1(151)
        .start2(101)
        .strand1(Strand::Minus)
        .strand2(Strand::Plus)
        .build();
    builder.sort_by_coordinate();

    let entries = [("chr1", 100, 249, "PLUS", '+'), ("chr1", 100, 249, "MINUS", '-')];
    let run = TestRun::new(&builder, &entries);
    let records = run.run_ok(&[]);

    assert_pair_tags(&records, "rev", [Some("MINUS"), Some("MINUS")]);
}

#[test]
fn test_unmapped_mate_is_never_assigned() {
    let mut builder = SamBuilder::new();
    let _ = builder.add_pair().name("lonely").start1(101).unmapped2().build();
    add_forward_pair(&mut builder, "near", 0, 98, 103);
    builder.sort_by_coordinate();

    let run = TestRun::new(&builder, &[AMP1]);
    let records = run.run_ok(&[]);

    assert_eq!(records.len(), 4);
    assert_pair_tags(&records, "near", [Some("AMP1"), Some("AMP1")]);
    // The mapped read is written untagged; its unmapped mate hits the cached decision.
    assert_pair_tags(&records, "lonely", [None, Some("")]);
}

#[test]
fn test_improper_pair_is_written_through() {
    let mut builder = SamBuilder::new();
    let _ = builder.add_pair().name("improper").start1(99).start2(102).improper().build();
    builder.sort_by_coordinate();

    let run = TestRun::new(&builder, &[AMP1]);
    let records = run.run_ok(&["--unassigned-tag", "omit"]);

    assert_pair_tags(&records, "improper", [None, None]);
}

#[test]
fn test_chromosome_transition() {
    let mut builder = SamBuilder::new();
    add_forward_pair(&mut builder, "a", 0, 100, 101);
    add_forward_pair(&mut builder, "b", 1, 1000, 201);
    add_forward_pair(&mut builder, "c", 1, 100, 101);
    add_forward_pair(&mut builder, "d", 2, 100, 101);
    builder.sort_by_coordinate();

    let entries = [
        AMP1,
        ("chr2", 100, 200, "AMP2", '+'),
        ("chr2", 1000, 1200, "AMP3", '+'),
        ("chr3", 5000, 5200, "AMP4", '+'),
    ];
    let run = TestRun::new(&builder, &entries);
    let records = run.run_ok(&["--unassigned-tag", "omit"]);

    assert_pair_tags(&records, "a", [Some("AMP1"), Some("AMP1")]);
    assert_pair_tags(&records, "b", [Some("AMP3"), Some("AMP3")]);
    assert_pair_tags(&records, "c", [Some("AMP2"), Some("AMP2")]);
    assert_pair_tags(&records, "d", [None, None]);
}

#[test]
fn test_chromosome_without_amplicons() {
    let mut builder = SamBuilder::new();
    add_forward_pair(&mut builder, "a", 1, 100, 101);
    add_forward_pair(&mut builder, "b", 2, 100, 101);
    builder.sort_by_coordinate();

    let run = TestRun::new(&builder, &[("chr3", 100, 200, "AMP3", '+')]);
    let records = run.run_ok(&["--unassigned-tag", "omit"]);

    assert_pair_tags(&records, "a", [None, None]);
    assert_pair_tags(&records, "b", [Some("AMP3"), Some("AMP3")]);
}

#[test]
fn test_equidistant_amplicons_use_catalog_order() {
    let mut builder = SamBuilder::new();
    // span [98, 202]: distance 4 to both amplicons
    add_forward_pair(&mut builder, "tie", 0, 98, 105);
    builder.sort_by_coordinate();

    let first_wins = [("chr1", 100, 200, "INNER", '+'), ("chr1", 96, 204, "OUTER", '+')];
    let run = TestRun::new(&builder, &first_wins);
    assert_pair_tags(&run.run_ok(&[]), "tie", [Some("INNER"), Some("INNER")]);

    let reversed = [first_wins[1], first_wins[0]];
    let run = TestRun::new(&builder, &reversed);
    assert_pair_tags(&run.run_ok(&[]), "tie", [Some("OUTER"), Some("OUTER")]);
}

#[test]
fn test_closest_amplicon_wins() {
    let mut builder = SamBuilder::new();
    add_forward_pair(&mut builder, "frag", 0, 100, 101);
    builder.sort_by_coordinate();

    let entries = [("chr1", 98, 201, "OFF_BY_3", '+'), ("chr1", 100, 201, "OFF_BY_1", '+')];
    let run = TestRun::new(&builder, &entries);

    assert_pair_tags(&run.run_ok(&[]), "frag", [Some("OFF_BY_1"), Some("OFF_BY_1")]);
}

#[test]
fn test_custom_tag_and_existing_attributes() {
    let mut builder = SamBuilder::new();
    let _ = builder
        .add_pair()
        .name("near")
        .start1(99)
        .start2(102)
        .template_length(103)
        .attr("RG", "A")
        .build();
    builder.sort_by_coordinate();

    let run = TestRun::new(&builder, &[AMP1]);
    let records = run.run_ok(&["--tag", "ZA"]);

    for record in &records {
        assert_tag(record, Tag::new(b'Z', b'A'), Some("AMP1"));
        assert_tag(record, XN, None);
        assert_tag(record, Tag::READ_GROUP, Some("A"));
    }
}

#[test]
fn test_records_pass_through_in_order() {
    let mut builder = SamBuilder::new();
    for i in 0..20 {
        add_forward_pair(&mut builder, &format!("p{i:02}"), i % 3, 100 + 10 * i, 150);
    }
    builder.sort_by_coordinate();

    let run = TestRun::new(&builder, &[AMP1]);
    let records = run.run_ok(&[]);

    let expected: Vec<String> = builder.records().iter().map(name_of).collect();
    let actual: Vec<String> = records.iter().map(name_of).collect();
    assert_eq!(actual, expected);
}

#[test]
fn test_gzipped_catalog() {
    let mut builder = SamBuilder::new();
    add_forward_pair(&mut builder, "near", 0, 98, 103);
    builder.sort_by_coordinate();

    let run = TestRun::new(&builder, &[]);
    let gz_path = run.path("amplicons.bed.gz");
    let file = fs::File::create(&gz_path).unwrap();
    let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    encoder.write_all(b"# amplicons\nchr1\t100\t200\tAMP1\t0\t+\n").unwrap();
    encoder.finish().unwrap();

    let output = run_tagbam(&[
        run.input.to_str().unwrap(),
        gz_path.to_str().unwrap(),
        run.output.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    assert_pair_tags(&read_records(&run.output), "near", [Some("AMP1"), Some("AMP1")]);
}

#[test]
fn test_output_is_deterministic() {
    let mut builder = SamBuilder::new();
    for i in 0..50 {
        add_forward_pair(&mut builder, &format!("p{i:02}"), i % 2, 90 + 3 * i, 103);
    }
    builder.sort_by_coordinate();

    let run = TestRun::new(&builder, &[AMP1, ("chr2", 100, 200, "AMP2", '+')]);

    // Same arguments both times, so the @PG command line matches too.
    assert!(run.run(&[]).status.success());
    let first_bytes = fs::read(&run.output).unwrap();
    let first_tags = tag_table(&read_records(&run.output), XN);

    assert!(run.run(&[]).status.success());
    assert_eq!(tag_table(&read_records(&run.output), XN), first_tags);
    assert_eq!(fs::read(&run.output).unwrap(), first_bytes);
}

#[test]
fn test_metrics_outputs() {
    let mut builder = SamBuilder::new();
    add_forward_pair(&mut builder, "near", 0, 98, 103);
    add_forward_pair(&mut builder, "far", 0, 500, 150);
    let _ = builder.add_pair().name("lonely").start1(801).unmapped2().build();
    builder.sort_by_coordinate();

    let run = TestRun::new(&builder, &[AMP1, ("chr1", 2000, 2200, "AMP2", '+')]);
    let metrics_path = run.path("run.metrics.txt");
    let counts_path = run.path("amplicon_counts.txt");
    run.run_ok(&[
        "--metrics",
        metrics_path.to_str().unwrap(),
        "--amplicon-counts",
        counts_path.to_str().unwrap(),
    ]);

    let metrics: Vec<AnnotationMetrics> = DelimFile::default().read_tsv(&metrics_path).unwrap();
    assert_eq!(metrics.len(), 1);
    let m = &metrics[0];
    assert_eq!(m.total_records, 6);
    assert_eq!(m.eligible_records, 2);
    assert_eq!(m.cache_hits, 3);
    assert_eq!(m.ineligible_records, 1);
    assert_eq!(m.tagged_records, 2);
    assert_eq!(m.empty_tagged_records, 2);
    assert_eq!(m.assigned_fragments, 1);
    assert_eq!(m.unassigned_fragments, 1);
    assert_eq!(m.chromosomes, 1);
    assert!((m.fraction_tagged - 2.0 / 6.0).abs() < 1e-9);

    let counts: Vec<AmpliconCountMetric> = DelimFile::default().read_tsv(&counts_path).unwrap();
    let summary: Vec<(&str, u64)> = counts.iter().map(|c| (c.name.as_str(), c.records)).collect();
    assert_eq!(summary, vec![("AMP1", 2), ("AMP2", 0)]);
    assert_eq!(counts[0].chrom, "chr1");
    assert_eq!(counts[0].strand, '+');
}

#[test]
fn test_program_record_added() {
    let mut builder = SamBuilder::new();
    add_forward_pair(&mut builder, "near", 0, 98, 103);
    builder.sort_by_coordinate();

    let run = TestRun::new(&builder, &[AMP1]);
    run.run_ok(&["-d", "7"]);

    let header = read_header(&run.output);
    let program = header.programs().as_ref().get("tagbam".as_bytes()).expect("missing @PG tagbam");
    let command_line = program
        .other_fields()
        .get(b"CL")
        .map(|cl| String::from_utf8_lossy(cl.as_ref()).into_owned())
        .unwrap_or_default();
    assert!(command_line.contains("-d 7"), "unexpected CL: {command_line}");
    assert_eq!(header.reference_sequences().len(), 3);
}
