//! Assertion helpers for amplicon tags on output records.

#![allow(dead_code)]

use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record_buf::RecordBuf;
use tagbam_lib::sam::string_tag;

pub const XN: Tag = Tag::new(b'X', b'N');

/// The read name of a record, or an empty string.
pub fn name_of(record: &RecordBuf) -> String {
    record.name().map(|n| n.to_string()).unwrap_or_default()
}

/// `(name, is_read1, tag value)` for every record, in file order.
pub fn tag_table(records: &[RecordBuf], tag: Tag) -> Vec<(String, bool, Option<String>)> {
    records
        .iter()
        .map(|r| (name_of(r), r.flags().is_first_segment(), string_tag(r, tag)))
        .collect()
}

/// Asserts the value of `tag` on `record`, where `None` means the tag is absent.
///
/// # Panics
///
/// Panics if the tag value differs.
pub fn assert_tag(record: &RecordBuf, tag: Tag, expected: Option<&str>) {
    assert_eq!(
        string_tag(record, tag).as_deref(),
        expected,
        "tag mismatch for record {}",
        name_of(record)
    );
}

/// Asserts the XN value of every record with the given name.
///
/// # Panics
///
/// Panics if no record has the name or any of them has a different value.
pub fn assert_pair_tags(records: &[RecordBuf], name: &str, expected: [Option<&str>; 2]) {
    let mut mates: Vec<&RecordBuf> = records.iter().filter(|r| name_of(r) == name).collect();
    assert_eq!(mates.len(), 2, "expected two records named {name}");
    // File order is coordinate order; compare in read1, read2 order.
    mates.sort_by_key(|r| !r.flags().is_first_segment());
    assert_tag(mates[0], XN, expected[0]);
    assert_tag(mates[1], XN, expected[1]);
}
