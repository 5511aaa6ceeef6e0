//! Validation of command-line inputs.
//!
//! Failures are reported with the structured errors in [`crate::errors`].

use crate::errors::{Result, TagbamError};
use noodles::sam::alignment::record::data::field::Tag;
use std::path::Path;

/// Validate that a file exists.
///
/// # Example
/// ```
/// use tagbam_lib::validation::validate_file_exists;
///
/// let result = validate_file_exists("/nonexistent/file.bam", "Input BAM");
/// assert!(result.is_err());
/// ```
pub fn validate_file_exists<P: AsRef<Path>>(path: P, description: &str) -> Result<()> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        return Err(TagbamError::InvalidFileFormat {
            file_type: description.to_string(),
            path: path_ref.display().to_string(),
            reason: "File does not exist".to_string(),
        });
    }
    Ok(())
}

/// Validate that each `(path, description)` exists, failing on the first missing one.
pub fn validate_files_exist<P: AsRef<Path>>(files: &[(P, &str)]) -> Result<()> {
    for (path, desc) in files {
        validate_file_exists(path, desc)?;
    }
    Ok(())
}

/// Parse a two-character SAM tag name.
///
/// # Example
/// ```
/// use tagbam_lib::validation::string_to_tag;
///
/// assert!(string_to_tag("XN", "tag").is_ok());
/// assert!(string_to_tag("XNN", "tag").is_err());
/// ```
pub fn string_to_tag(tag: &str, name: &str) -> Result<Tag> {
    match tag.as_bytes() {
        &[a, b] if a.is_ascii_alphabetic() && b.is_ascii_alphanumeric() => Ok(Tag::new(a, b)),
        &[_, _] => Err(TagbamError::InvalidParameter {
            parameter: name.to_string(),
            reason: format!("Tag must match [A-Za-z][A-Za-z0-9], got: '{tag}'"),
        }),
        _ => Err(TagbamError::InvalidParameter {
            parameter: name.to_string(),
            reason: format!("Tag must be exactly 2 characters, got: '{tag}'"),
        }),
    }
}

/// Validate that an output path's parent directory exists.
pub fn validate_output_parent<P: AsRef<Path>>(path: P, description: &str) -> Result<()> {
    let path_ref = path.as_ref();
    match path_ref.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            Err(TagbamError::InvalidFileFormat {
                file_type: description.to_string(),
                path: path_ref.display().to_string(),
                reason: format!("Parent directory does not exist: {}", parent.display()),
            })
        }
        _ => Ok(()),
    }
}
