//! BAM reader and writer construction.
//!
//! BGZF (de)compression runs on the calling thread when `threads` is 1 and on a worker pool
//! otherwise. Record decoding and annotation stay on the calling thread in both cases, so
//! output order always equals input order.

use anyhow::{Context, Result};
use noodles::sam::Header;
use noodles_bgzf::{
    MultithreadedReader, MultithreadedWriter, Reader as BgzfReader, Writer as BgzfWriter,
    multithreaded_writer, writer, writer::CompressionLevel,
};
use std::fs::File;
use std::io::{self, BufRead, Read, Write};
use std::num::NonZero;
use std::path::Path;

use crate::errors::TagbamError;

/// Compression level used when none is given.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 1;

/// Single- or multi-threaded BGZF reader.
pub enum BgzfReaderEnum {
    SingleThreaded(BgzfReader<File>),
    MultiThreaded(MultithreadedReader<File>),
}

impl Read for BgzfReaderEnum {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            BgzfReaderEnum::SingleThreaded(r) => r.read(buf),
            BgzfReaderEnum::MultiThreaded(r) => r.read(buf),
        }
    }
}

impl BufRead for BgzfReaderEnum {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            BgzfReaderEnum::SingleThreaded(r) => r.fill_buf(),
            BgzfReaderEnum::MultiThreaded(r) => r.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            BgzfReaderEnum::SingleThreaded(r) => r.consume(amt),
            BgzfReaderEnum::MultiThreaded(r) => r.consume(amt),
        }
    }
}

/// BAM reader over either BGZF reader flavour.
pub type BamReaderAuto = noodles::bam::io::Reader<BgzfReaderEnum>;

/// Single- or multi-threaded BGZF writer.
pub enum BgzfWriterEnum {
    SingleThreaded(BgzfWriter<File>),
    MultiThreaded(MultithreadedWriter<File>),
}

impl Write for BgzfWriterEnum {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            BgzfWriterEnum::SingleThreaded(w) => w.write(buf),
            BgzfWriterEnum::MultiThreaded(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            BgzfWriterEnum::SingleThreaded(w) => w.flush(),
            BgzfWriterEnum::MultiThreaded(w) => w.flush(),
        }
    }
}

impl BgzfWriterEnum {
    /// Flushes all pending blocks and writes the BGZF EOF marker once.
    pub fn finish(self) -> io::Result<()> {
        match self {
            // Consuming `finish` releases the inner file, so drop does not write a second EOF.
            BgzfWriterEnum::SingleThreaded(w) => w.finish().map(|_| ()),
            BgzfWriterEnum::MultiThreaded(mut w) => w.finish().map(|_| ()),
        }
    }
}

/// BAM writer over either BGZF writer flavour.
pub type BamWriter = noodles::bam::io::Writer<BgzfWriterEnum>;

/// Opens a BAM file and reads its header.
///
/// # Example
/// ```no_run
/// use tagbam_lib::bam_io::create_bam_reader;
///
/// let (mut reader, header) = create_bam_reader("input.bam", 1).unwrap();
/// for result in reader.record_bufs(&header) {
///     let record = result.unwrap();
/// }
/// ```
pub fn create_bam_reader<P: AsRef<Path>>(
    path: P,
    threads: usize,
) -> Result<(BamReaderAuto, Header)> {
    let path_ref = path.as_ref();
    let file = File::open(path_ref).map_err(|source| TagbamError::InputStream {
        path: path_ref.display().to_string(),
        source,
    })?;

    let bgzf_reader = match NonZero::new(threads) {
        Some(worker_count) if threads > 1 => {
            BgzfReaderEnum::MultiThreaded(MultithreadedReader::with_worker_count(worker_count, file))
        }
        _ => BgzfReaderEnum::SingleThreaded(BgzfReader::new(file)),
    };

    let mut reader = noodles::bam::io::Reader::from(bgzf_reader);
    let header = reader
        .read_header()
        .with_context(|| format!("Failed to read header from: {}", path_ref.display()))?;

    Ok((reader, header))
}

/// Creates a BAM file and writes `header` to it.
///
/// `compression_level` outside the range the BGZF encoder accepts falls back to its default.
pub fn create_bam_writer<P: AsRef<Path>>(
    path: P,
    header: &Header,
    threads: usize,
    compression_level: u32,
) -> Result<BamWriter> {
    let path_ref = path.as_ref();
    let output_file = File::create(path_ref).map_err(|source| TagbamError::OutputStream {
        path: path_ref.display().to_string(),
        source,
    })?;

    let level = u8::try_from(compression_level).ok().and_then(CompressionLevel::new);
    if level.is_none() {
        log::warn!("Unsupported compression level {compression_level}, using the default");
    }

    let bgzf_writer = match NonZero::new(threads) {
        Some(worker_count) if threads > 1 => {
            let mut builder =
                multithreaded_writer::Builder::default().set_worker_count(worker_count);
            if let Some(level) = level {
                builder = builder.set_compression_level(level);
            }
            BgzfWriterEnum::MultiThreaded(builder.build_from_writer(output_file))
        }
        _ => {
            let mut builder = writer::Builder::default();
            if let Some(level) = level {
                builder = builder.set_compression_level(level);
            }
            BgzfWriterEnum::SingleThreaded(builder.build_from_writer(output_file))
        }
    };

    let mut writer = noodles::bam::io::Writer::from(bgzf_writer);
    writer
        .write_header(header)
        .with_context(|| format!("Failed to write header to: {}", path_ref.display()))?;
    Ok(writer)
}

/// Finishes a writer from [`create_bam_writer`], writing the BGZF EOF marker.
pub fn finish_bam_writer<P: AsRef<Path>>(writer: BamWriter, path: P) -> Result<()> {
    let path_ref = path.as_ref();
    writer.into_inner().finish().map_err(|source| TagbamError::OutputStream {
        path: path_ref.display().to_string(),
        source,
    })?;
    Ok(())
}
