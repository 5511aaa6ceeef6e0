//! noodles bindings for the annotation engine.
//!
//! - [`record::MappedRecord`] lets a noodles [`RecordBuf`](noodles::sam::alignment::RecordBuf)
//!   be annotated through [`AlignmentView`](crate::fragment::AlignmentView).
//! - [`builder`] builds paired records and BAM files for tests and benchmarks.

pub mod builder;
pub mod record;

pub use builder::{PairBuilder, SamBuilder, Strand};
pub use record::{MappedRecord, string_tag};
