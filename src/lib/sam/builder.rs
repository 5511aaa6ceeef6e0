//! Builder for paired-end test records and BAM files.
//!
//! ```rust
//! use tagbam_lib::sam::builder::SamBuilder;
//!
//! let mut builder = SamBuilder::new();
//! let (r1, r2) = builder.add_pair().name("q1").start1(101).start2(151).build();
//! assert_eq!(r1.template_length(), -r2.template_length());
//! ```

use anyhow::Result;
use bstr::BString;
use noodles::core::Position;
use noodles::sam::Header;
use noodles::sam::alignment::io::Write as AlignmentWrite;
use noodles::sam::alignment::record::Flags;
use noodles::sam::alignment::record::MappingQuality;
use noodles::sam::alignment::record::cigar::Op;
use noodles::sam::alignment::record::cigar::op::Kind;
use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record_buf::data::field::Value as BufValue;
use noodles::sam::alignment::record_buf::{QualityScores, RecordBuf, Sequence};
use noodles::sam::header::record::value::Map;
use noodles::sam::header::record::value::map::header::tag::Tag as HeaderTag;
use noodles::sam::header::record::value::map::{Header as HeaderRecord, ReferenceSequence};
use std::num::NonZeroUsize;
use std::path::Path;

pub const DEFAULT_READ_LENGTH: usize = 100;
pub const DEFAULT_BASE_QUALITY: u8 = 30;
pub const DEFAULT_MAPQ: u8 = 60;
pub const DEFAULT_REFERENCE_LENGTH: usize = 1_000_000;

/// Read orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    Plus,
    Minus,
}

impl Strand {
    #[must_use]
    pub fn is_negative(&self) -> bool {
        matches!(self, Strand::Minus)
    }
}

/// Accumulates paired records under a coordinate-sorted header.
#[derive(Debug)]
pub struct SamBuilder {
    pub header: Header,
    records: Vec<RecordBuf>,
    read_length: usize,
    counter: u64,
}

impl Default for SamBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SamBuilder {
    /// A builder with references chr1, chr2 and chr3.
    #[must_use]
    pub fn new() -> Self {
        Self::with_references(&["chr1", "chr2", "chr3"])
    }

    /// A builder whose header declares `names`, in order, as reference sequences.
    ///
    /// # Panics
    ///
    /// Panics if the @HD record cannot be built.
    #[must_use]
    pub fn with_references(names: &[&str]) -> Self {
        let HeaderTag::Other(sort_order_tag) = HeaderTag::from([b'S', b'O']) else {
            unreachable!()
        };
        let hd = Map::<HeaderRecord>::builder()
            .insert(sort_order_tag, "coordinate")
            .build()
            .expect("valid header map");

        let mut header = Header::builder().set_header(hd);
        for name in names {
            let length = NonZeroUsize::new(DEFAULT_REFERENCE_LENGTH).expect("non-zero length");
            header = header
                .add_reference_sequence(BString::from(*name), Map::<ReferenceSequence>::new(length));
        }

        Self {
            header: header.build(),
            records: Vec::new(),
            read_length: DEFAULT_READ_LENGTH,
            counter: 0,
        }
    }

    #[must_use]
    pub fn records(&self) -> &[RecordBuf] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push_record(&mut self, record: RecordBuf) {
        self.records.push(record);
    }

    /// Starts building a read pair; the built records are kept and also returned.
    #[must_use]
    pub fn add_pair(&mut self) -> PairBuilder<'_> {
        PairBuilder::new(self)
    }

    /// Stable-sorts records by reference and start, unplaced records last.
    pub fn sort_by_coordinate(&mut self) {
        self.records.sort_by_key(|r| {
            (
                r.reference_sequence_id().unwrap_or(usize::MAX),
                r.alignment_start().map_or(usize::MAX, |p| p.get()),
            )
        });
    }

    /// Writes the records, in their current order, to a BAM file.
    pub fn write_bam(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let mut writer = noodles::bam::io::Writer::new(file);
        writer.write_header(&self.header)?;

        for record in &self.records {
            writer.write_alignment_record(&self.header, record)?;
        }
        writer.finish(&self.header)?;

        Ok(())
    }

    fn next_name(&mut self) -> String {
        let name = format!("{:04}", self.counter);
        self.counter += 1;
        name
    }
}

/// Builder for one read pair. Read 1 is forward and read 2 reverse unless set otherwise;
/// a read without a start is unmapped.
pub struct PairBuilder<'a> {
    parent: &'a mut SamBuilder,
    name: Option<String>,
    contig: usize,
    start1: Option<usize>,
    start2: Option<usize>,
    read_length: usize,
    strand1: Strand,
    strand2: Strand,
    proper: bool,
    template_length: Option<i32>,
    attrs: Vec<(String, BufValue)>,
}

impl<'a> PairBuilder<'a> {
    fn new(parent: &'a mut SamBuilder) -> Self {
        let read_length = parent.read_length;
        Self {
            parent,
            name: None,
            contig: 0,
            start1: None,
            start2: None,
            read_length,
            strand1: Strand::Plus,
            strand2: Strand::Minus,
            proper: true,
            template_length: None,
            attrs: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Reference sequence index for both reads.
    #[must_use]
    pub fn contig(mut self, contig: usize) -> Self {
        self.contig = contig;
        self
    }

    /// 1-based alignment start of read 1.
    #[must_use]
    pub fn start1(mut self, start: usize) -> Self {
        self.start1 = Some(start);
        self
    }

    /// 1-based alignment start of read 2.
    #[must_use]
    pub fn start2(mut self, start: usize) -> Self {
        self.start2 = Some(start);
        self
    }

    #[must_use]
    pub fn read_length(mut self, length: usize) -> Self {
        self.read_length = length;
        self
    }

    #[must_use]
    pub fn strand1(mut self, strand: Strand) -> Self {
        self.strand1 = strand;
        self
    }

    #[must_use]
    pub fn strand2(mut self, strand: Strand) -> Self {
        self.strand2 = strand;
        self
    }

    #[must_use]
    pub fn unmapped1(mut self) -> Self {
        self.start1 = None;
        self
    }

    #[must_use]
    pub fn unmapped2(mut self) -> Self {
        self.start2 = None;
        self
    }

    /// Clears the proper-pair flag on both reads.
    #[must_use]
    pub fn improper(mut self) -> Self {
        self.proper = false;
        self
    }

    /// Overrides the computed template length; read 1 gets `tlen`, read 2 `-tlen`.
    #[must_use]
    pub fn template_length(mut self, tlen: i32) -> Self {
        self.template_length = Some(tlen);
        self
    }

    #[must_use]
    pub fn attr<V: Into<BufValue>>(mut self, tag: &str, value: V) -> Self {
        self.attrs.push((tag.to_string(), value.into()));
        self
    }

    /// Builds the pair and adds both records to the parent.
    ///
    /// # Panics
    ///
    /// Panics if a start is zero or the read length does not fit a CIGAR.
    #[must_use]
    pub fn build(self) -> (RecordBuf, RecordBuf) {
        let name = self.name.clone().unwrap_or_else(|| self.parent.next_name());
        let both_mapped = self.start1.is_some() && self.start2.is_some();
        let proper = self.proper && both_mapped;

        let tlen = match (self.template_length, self.start1, self.start2) {
            (Some(tlen), _, _) => tlen,
            (None, Some(s1), Some(s2)) => {
                let (left, right) = (s1.min(s2), s1.max(s2) + self.read_length - 1);
                let tlen = i32::try_from(right - left + 1).expect("template length fits in i32");
                if s1 <= s2 { tlen } else { -tlen }
            }
            _ => 0,
        };

        let first = self.build_read(&name, true, proper, tlen);
        let second = self.build_read(&name, false, proper, -tlen);

        self.parent.records.push(first.clone());
        self.parent.records.push(second.clone());
        (first, second)
    }

    fn build_read(&self, name: &str, is_first: bool, proper: bool, tlen: i32) -> RecordBuf {
        let (start, mate_start, strand, mate_strand) = if is_first {
            (self.start1, self.start2, self.strand1, self.strand2)
        } else {
            (self.start2, self.start1, self.strand2, self.strand1)
        };

        let mut record = RecordBuf::default();
        *record.name_mut() = Some(BString::from(name.as_bytes()));
        *record.sequence_mut() = Sequence::from(vec![b'A'; self.read_length]);
        *record.quality_scores_mut() =
            QualityScores::from(vec![DEFAULT_BASE_QUALITY; self.read_length]);

        let mut flags = Flags::SEGMENTED;
        flags |= if is_first { Flags::FIRST_SEGMENT } else { Flags::LAST_SEGMENT };
        if proper {
            flags |= Flags::PROPERLY_SEGMENTED;
        }
        if start.is_none() {
            flags |= Flags::UNMAPPED;
        }
        if mate_start.is_none() {
            flags |= Flags::MATE_UNMAPPED;
        }
        if strand.is_negative() {
            flags |= Flags::REVERSE_COMPLEMENTED;
        }
        if mate_strand.is_negative() {
            flags |= Flags::MATE_REVERSE_COMPLEMENTED;
        }
        *record.flags_mut() = flags;

        if let Some(start) = start {
            *record.reference_sequence_id_mut() = Some(self.contig);
            *record.alignment_start_mut() =
                Some(Position::try_from(start).expect("1-based start must be non-zero"));
            *record.cigar_mut() = [Op::new(Kind::Match, self.read_length)].into_iter().collect();
            *record.mapping_quality_mut() = MappingQuality::new(DEFAULT_MAPQ);
        }
        if let Some(mate_start) = mate_start {
            *record.mate_reference_sequence_id_mut() = Some(self.contig);
            *record.mate_alignment_start_mut() =
                Some(Position::try_from(mate_start).expect("1-based start must be non-zero"));
        }
        if proper {
            *record.template_length_mut() = tlen;
        }

        for (tag_str, value) in &self.attrs {
            if let &[a, b] = tag_str.as_bytes() {
                record.data_mut().insert(Tag::new(a, b), value.clone());
            }
        }

        record
    }
}
