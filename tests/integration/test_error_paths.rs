//! Failure modes of the binary: each must exit non-zero with a useful message.

use std::fs;

use tagbam_lib::sam::builder::SamBuilder;

use crate::helpers::bam_generator::{TestRun, run_tagbam};

fn simple_builder() -> SamBuilder {
    let mut builder = SamBuilder::new();
    let _ = builder.add_pair().name("p").start1(101).start2(151).build();
    builder.sort_by_coordinate();
    builder
}

fn stderr_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_missing_catalog() {
    let run = TestRun::new(&simple_builder(), &[]);
    let missing = run.path("missing.bed");

    let output = run_tagbam(&[
        run.input.to_str().unwrap(),
        missing.to_str().unwrap(),
        run.output.to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("Amplicon catalog"), "{}", stderr_of(&output));
    assert!(!run.output.exists(), "no output should be written without a catalog");
}

#[test]
fn test_missing_input_bam() {
    let run = TestRun::new(&simple_builder(), &[("chr1", 100, 200, "AMP1", '+')]);
    let missing = run.path("missing.bam");

    let output = run_tagbam(&[
        missing.to_str().unwrap(),
        run.amplicons.to_str().unwrap(),
        run.output.to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("Input BAM"), "{}", stderr_of(&output));
}

#[test]
fn test_malformed_catalog_lines() {
    let cases = [
        "chr1\t100\t200\tAMP1\t0\n",
        "chr1\tabc\t200\tAMP1\t0\t+\n",
        "chr1\t100\t200\tAMP1\t0\t*\n",
    ];

    for content in cases {
        let run = TestRun::new(&simple_builder(), &[]);
        fs::write(&run.amplicons, content).unwrap();

        let output = run.run(&[]);
        assert!(!output.status.success(), "catalog {content:?} should be rejected");
        let stderr = stderr_of(&output);
        assert!(stderr.contains("Invalid amplicon catalog"), "{stderr}");
        assert!(stderr.contains("line 1"), "{stderr}");
    }
}

#[test]
fn test_unsorted_input() {
    let mut builder = SamBuilder::new();
    let _ = builder.add_pair().name("a").contig(0).start1(101).start2(151).build();
    let _ = builder.add_pair().name("b").contig(1).start1(101).start2(151).build();
    let _ = builder.add_pair().name("c").contig(0).start1(301).start2(351).build();

    let run = TestRun::new(&builder, &[("chr1", 100, 250, "AMP1", '+')]);
    let output = run.run(&[]);

    assert!(!output.status.success());
    let stderr = stderr_of(&output);
    assert!(stderr.contains("'chr1' reappeared"), "{stderr}");
    assert!(!run.output.exists(), "a failed run must not leave a truncated BAM behind");
}

#[test]
fn test_invalid_options() {
    let run = TestRun::new(&simple_builder(), &[("chr1", 100, 250, "AMP1", '+')]);

    let invalid: [&[&str]; 4] = [
        &["--tag", "X"],
        &["--tag", "1X"],
        &["--max-dist", "-3"],
        &["--unassigned-tag", "skip"],
    ];
    for args in invalid {
        let output = run.run(args);
        assert!(!output.status.success(), "{args:?} should be rejected");
        assert!(!run.output.exists());
    }
}

#[test]
fn test_missing_output_directory() {
    let run = TestRun::new(&simple_builder(), &[("chr1", 100, 250, "AMP1", '+')]);
    let output_path = run.path("no/such/dir/out.bam");

    let output = run_tagbam(&[
        run.input.to_str().unwrap(),
        run.amplicons.to_str().unwrap(),
        output_path.to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("Output BAM"), "{}", stderr_of(&output));
}
