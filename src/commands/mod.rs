//! CLI command implementations for tagbam.
//!
//! - [`annotate`] - Tag paired-end BAM records with the amplicon they came from

#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::uninlined_format_args
)]

pub mod annotate;
pub mod command;
pub mod common;
