//! Command trait for the CLI.

use anyhow::Result;

/// A runnable CLI command.
///
/// `command_line` is the full invocation, recorded in the output @PG record.
pub trait Command {
    #[allow(clippy::missing_errors_doc)]
    fn execute(&self, command_line: &str) -> Result<()>;
}
