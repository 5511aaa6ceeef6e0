//! Fragment coordinates from a single alignment record of a pair.
//!
//! The pipeline never looks at a concrete record type. Anything implementing
//! [`AlignmentView`] can be annotated; the noodles binding lives in
//! [`crate::sam::record`].

use noodles::sam::alignment::record::data::field::Tag;

use crate::catalog::Strand;
use crate::interval_index::FragmentSpan;

/// The record fields the annotation engine reads, plus the one mutation it performs.
pub trait AlignmentView {
    /// Query (read-pair) name.
    fn query_name(&self) -> &[u8];

    /// Name of the reference sequence the record is placed on.
    fn reference_name(&self) -> Option<&[u8]>;

    /// The proper-pair flag (0x2).
    fn is_proper_pair(&self) -> bool;

    /// The unmapped flag (0x4).
    fn is_unmapped(&self) -> bool;

    /// The mate-unmapped flag (0x8).
    fn is_mate_unmapped(&self) -> bool;

    /// The first-segment flag (0x40).
    fn is_read1(&self) -> bool;

    /// The reverse-complemented flag (0x10).
    fn is_reverse(&self) -> bool;

    /// 0-based alignment start.
    fn reference_start(&self) -> Option<i64>;

    /// 0-based alignment start of the mate.
    fn mate_reference_start(&self) -> Option<i64>;

    /// Signed template length, `None` when unavailable (stored as 0).
    fn template_length(&self) -> Option<i64>;

    /// Sets a string-valued tag, replacing any existing value.
    fn set_string_tag(&mut self, tag: Tag, value: &str);
}

/// Returns the fragment orientation: `+` for a forward-strand first read, `-` otherwise.
#[must_use]
pub fn fragment_strand<R: AlignmentView + ?Sized>(record: &R) -> Strand {
    if record.is_read1() && !record.is_reverse() { Strand::Forward } else { Strand::Reverse }
}

/// Returns true if a span can be computed for this record: a mapped proper pair with a
/// mapped mate, a template length, and the start coordinate the span is anchored on.
#[must_use]
pub fn is_eligible<R: AlignmentView + ?Sized>(record: &R) -> bool {
    let flags_ok = record.is_proper_pair() && !record.is_unmapped() && !record.is_mate_unmapped();
    if !flags_ok || record.template_length().is_none() || record.reference_name().is_none() {
        return false;
    }
    if record.is_reverse() {
        record.mate_reference_start().is_some()
    } else {
        record.reference_start().is_some()
    }
}

/// Computes the outer extent of the fragment that produced `record`.
///
/// A forward record spans `[start, start + tlen - 1]`; a reverse record borrows its mate's
/// start and spans `[mate_start, mate_start + |tlen| - 1]`.
///
/// Returns `None` if the record is not [eligible](is_eligible).
#[must_use]
pub fn compute_span<R: AlignmentView + ?Sized>(record: &R) -> Option<FragmentSpan> {
    if !is_eligible(record) {
        return None;
    }
    let chromosome = String::from_utf8_lossy(record.reference_name()?).into_owned();
    let tlen = record.template_length()?;

    let (start, end) = if record.is_reverse() {
        let start = record.mate_reference_start()?;
        (start, start + tlen.abs() - 1)
    } else {
        let start = record.reference_start()?;
        (start, start + tlen - 1)
    };

    Some(FragmentSpan { chromosome, start, end, strand: fragment_strand(record) })
}

/// A plain in-memory record, used by the engine's tests and benchmarks.
#[doc(hidden)]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleRecord {
    pub name: Vec<u8>,
    pub reference_name: Option<Vec<u8>>,
    pub proper_pair: bool,
    pub unmapped: bool,
    pub mate_unmapped: bool,
    pub read1: bool,
    pub reverse: bool,
    pub start: Option<i64>,
    pub mate_start: Option<i64>,
    pub tlen: Option<i64>,
    pub tags: Vec<(Tag, String)>,
}

impl SimpleRecord {
    /// A mapped proper-pair record on `chromosome`.
    #[must_use]
    pub fn proper(name: &str, chromosome: &str, read1: bool, reverse: bool) -> Self {
        Self {
            name: name.as_bytes().to_vec(),
            reference_name: Some(chromosome.as_bytes().to_vec()),
            proper_pair: true,
            read1,
            reverse,
            ..Self::default()
        }
    }

    /// Sets alignment start, mate start and template length.
    #[must_use]
    pub fn placed(mut self, start: i64, mate_start: i64, tlen: i64) -> Self {
        self.start = Some(start);
        self.mate_start = Some(mate_start);
        self.tlen = (tlen != 0).then_some(tlen);
        self
    }

    /// The value of `tag`, if set.
    #[must_use]
    pub fn tag(&self, tag: Tag) -> Option<&str> {
        self.tags.iter().find(|(t, _)| *t == tag).map(|(_, v)| v.as_str())
    }
}

impl AlignmentView for SimpleRecord {
    fn query_name(&self) -> &[u8] {
        &self.name
    }

    fn reference_name(&self) -> Option<&[u8]> {
        self.reference_name.as_deref()
    }

    fn is_proper_pair(&self) -> bool {
        self.proper_pair
    }

    fn is_unmapped(&self) -> bool {
        self.unmapped
    }

    fn is_mate_unmapped(&self) -> bool {
        self.mate_unmapped
    }

    fn is_read1(&self) -> bool {
        self.read1
    }

    fn is_reverse(&self) -> bool {
        self.reverse
    }

    fn reference_start(&self) -> Option<i64> {
        self.start
    }

    fn mate_reference_start(&self) -> Option<i64> {
        self.mate_start
    }

    fn template_length(&self) -> Option<i64> {
        self.tlen
    }

    fn set_string_tag(&mut self, tag: Tag, value: &str) {
        self.tags.retain(|(t, _)| *t != tag);
        self.tags.push((tag, value.to_string()));
    }
}
