//! [`AlignmentView`] over a noodles record buffer.

use bstr::ByteSlice;
use noodles::sam::Header;
use noodles::sam::alignment::RecordBuf;
use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record_buf::data::field::Value as BufValue;

use crate::fragment::AlignmentView;

/// A record paired with the header that resolves its reference sequence ID.
///
/// Positions are converted from 1-based noodles positions to 0-based coordinates, and a
/// stored template length of 0 reads as absent.
pub struct MappedRecord<'a> {
    record: &'a mut RecordBuf,
    header: &'a Header,
}

impl<'a> MappedRecord<'a> {
    pub fn new(record: &'a mut RecordBuf, header: &'a Header) -> Self {
        Self { record, header }
    }

    #[must_use]
    pub fn record(&self) -> &RecordBuf {
        self.record
    }
}

impl AlignmentView for MappedRecord<'_> {
    fn query_name(&self) -> &[u8] {
        self.record.name().map_or(&[][..], |name| name.as_bytes())
    }

    fn reference_name(&self) -> Option<&[u8]> {
        let id = self.record.reference_sequence_id()?;
        self.header.reference_sequences().get_index(id).map(|(name, _)| name.as_slice())
    }

    fn is_proper_pair(&self) -> bool {
        self.record.flags().is_properly_segmented()
    }

    fn is_unmapped(&self) -> bool {
        self.record.flags().is_unmapped()
    }

    fn is_mate_unmapped(&self) -> bool {
        self.record.flags().is_mate_unmapped()
    }

    fn is_read1(&self) -> bool {
        self.record.flags().is_first_segment()
    }

    fn is_reverse(&self) -> bool {
        self.record.flags().is_reverse_complemented()
    }

    fn reference_start(&self) -> Option<i64> {
        self.record.alignment_start().map(|pos| pos.get() as i64 - 1)
    }

    fn mate_reference_start(&self) -> Option<i64> {
        self.record.mate_alignment_start().map(|pos| pos.get() as i64 - 1)
    }

    fn template_length(&self) -> Option<i64> {
        match self.record.template_length() {
            0 => None,
            tlen => Some(i64::from(tlen)),
        }
    }

    fn set_string_tag(&mut self, tag: Tag, value: &str) {
        self.record.data_mut().insert(tag, BufValue::from(value.to_string()));
    }
}

/// The string value of `tag` on `record`, if present and string-typed.
#[must_use]
pub fn string_tag(record: &RecordBuf, tag: Tag) -> Option<String> {
    match record.data().get(&tag)? {
        BufValue::String(s) => Some(s.to_str_lossy().into_owned()),
        _ => None,
    }
}
