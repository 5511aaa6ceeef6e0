//! Custom error types for tagbam operations.

use thiserror::Error;

/// Result type alias for tagbam operations
pub type Result<T> = std::result::Result<T, TagbamError>;

/// Error type for tagbam operations
#[derive(Error, Debug)]
pub enum TagbamError {
    /// A line of the amplicon catalog could not be parsed into an interval
    #[error("Invalid amplicon catalog '{path}' at line {line}: {reason}")]
    CatalogLoad {
        /// Path to the catalog file
        path: String,
        /// 1-based line number of the offending entry (0 when the file could not be read)
        line: usize,
        /// Explanation of the problem
        reason: String,
    },

    /// The input alignment stream could not be read
    #[error("Failed to read input alignments from '{path}': {source}")]
    InputStream {
        /// Path to the input file
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The output alignment stream could not be written
    #[error("Failed to write output alignments to '{path}': {source}")]
    OutputStream {
        /// Path to the output file
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A chromosome reappeared after the stream had moved past it
    #[error(
        "Reference sequence '{chromosome}' reappeared after other reference sequences; \
         input must be coordinate sorted"
    )]
    UnsortedInput {
        /// The chromosome seen out of order
        chromosome: String,
    },

    /// Invalid parameter value provided
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// The parameter name
        parameter: String,
        /// Explanation of why it's invalid
        reason: String,
    },

    /// File format error
    #[error("Invalid {file_type} file '{path}': {reason}")]
    InvalidFileFormat {
        /// Type of file (e.g., "BAM", "BED")
        file_type: String,
        /// Path to the file
        path: String,
        /// Explanation of the problem
        reason: String,
    },
}
