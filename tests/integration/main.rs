//! Integration tests for the tagbam binary.
//!
//! These tests build BAM inputs with noodles, run the compiled binary on them and inspect
//! the output BAM and metrics files.

mod test_annotate_command;
mod test_error_paths;
