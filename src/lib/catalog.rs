//! Amplicon interval catalog.
//!
//! The catalog is the immutable set of targeted intervals loaded once, before any alignment
//! record is processed. It is read from a BED6 file (plain or gzip-compressed):
//!
//! ```text
//! chrom  start  end  name  score  strand
//! ```
//!
//! Columns past the sixth are ignored. Blank lines, `#` comments and `track`/`browser`
//! header lines are skipped. Entries are kept in file order, which is the order used to break
//! ties between equidistant amplicons.

use std::fmt;
use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;

use fgoxide::io::Io;

use crate::errors::{Result, TagbamError};

/// Buffer size used when reading the catalog file.
const BUFFER_SIZE: usize = 64 * 1024;

/// Minimum number of tab-separated columns in a catalog line.
const MIN_COLUMNS: usize = 6;

/// Orientation of an amplicon or of a sequenced fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    /// `+`
    Forward,
    /// `-`
    Reverse,
}

impl Strand {
    /// Returns the single-character BED representation.
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Strand {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            other => Err(format!("strand must be '+' or '-', found '{other}'")),
        }
    }
}

/// A single targeted interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmpliconInterval {
    /// Reference sequence name
    pub chromosome: String,
    /// Start coordinate as written in the catalog (0-based)
    pub start: i64,
    /// End coordinate as written in the catalog
    pub end: i64,
    /// Strand of the amplicon
    pub strand: Strand,
    /// Amplicon name, written as the tag value
    pub name: String,
}

impl AmpliconInterval {
    /// Creates a new interval, checking that `start <= end`.
    ///
    /// # Errors
    ///
    /// Returns the reason as a string if `start > end`.
    pub fn new(
        chromosome: impl Into<String>,
        start: i64,
        end: i64,
        strand: Strand,
        name: impl Into<String>,
    ) -> std::result::Result<Self, String> {
        if start > end {
            return Err(format!("start {start} is greater than end {end}"));
        }
        Ok(Self { chromosome: chromosome.into(), start, end, strand, name: name.into() })
    }
}

/// Immutable, ordered collection of amplicon intervals.
#[derive(Debug, Clone, Default)]
pub struct AmpliconCatalog {
    intervals: Vec<AmpliconInterval>,
}

impl AmpliconCatalog {
    /// Builds a catalog from already-validated intervals, keeping their order.
    #[must_use]
    pub fn from_intervals(intervals: Vec<AmpliconInterval>) -> Self {
        Self { intervals }
    }

    /// Loads a catalog from a BED file. Gzip-compressed files are detected by extension.
    ///
    /// # Errors
    ///
    /// Returns [`TagbamError::CatalogLoad`] if the file cannot be opened or any entry is
    /// malformed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = Io::new(5, BUFFER_SIZE).new_reader(path).map_err(|e| {
            TagbamError::CatalogLoad {
                path: path.display().to_string(),
                line: 0,
                reason: e.to_string(),
            }
        })?;
        Self::from_reader(reader, &path.display().to_string())
    }

    /// Parses a catalog from any buffered reader. `source` names the input in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`TagbamError::CatalogLoad`] on a read failure or a malformed entry.
    pub fn from_reader<R: BufRead>(reader: R, source: &str) -> Result<Self> {
        let mut intervals = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line_number = index + 1;
            let line = line.map_err(|e| TagbamError::CatalogLoad {
                path: source.to_string(),
                line: line_number,
                reason: e.to_string(),
            })?;

            if is_header_or_blank(&line) {
                continue;
            }

            let interval = parse_bed_line(&line).map_err(|reason| TagbamError::CatalogLoad {
                path: source.to_string(),
                line: line_number,
                reason,
            })?;
            intervals.push(interval);
        }

        Ok(Self { intervals })
    }

    /// All intervals in catalog order.
    #[must_use]
    pub fn intervals(&self) -> &[AmpliconInterval] {
        &self.intervals
    }

    /// Number of intervals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Returns true if the catalog holds no intervals.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// The chromosome of the first interval in catalog order.
    #[must_use]
    pub fn first_chromosome(&self) -> Option<&str> {
        self.intervals.first().map(|i| i.chromosome.as_str())
    }
}

fn is_header_or_blank(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with("track")
        || trimmed.starts_with("browser")
}

/// Parses one BED6 line into an interval.
fn parse_bed_line(line: &str) -> std::result::Result<AmpliconInterval, String> {
    let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
    if fields.len() < MIN_COLUMNS {
        return Err(format!(
            "expected at least {MIN_COLUMNS} tab-separated columns, found {}",
            fields.len()
        ));
    }

    let chromosome = fields[0];
    if chromosome.is_empty() {
        return Err("chromosome is empty".to_string());
    }
    let start = parse_coordinate(fields[1], "start")?;
    let end = parse_coordinate(fields[2], "end")?;
    let name = fields[3];
    if name.is_empty() {
        return Err("name is empty".to_string());
    }
    let strand = fields[5].parse::<Strand>()?;

    AmpliconInterval::new(chromosome, start, end, strand, name)
}

fn parse_coordinate(value: &str, column: &str) -> std::result::Result<i64, String> {
    value.parse::<i64>().map_err(|_| format!("{column} '{value}' is not an integer"))
}
