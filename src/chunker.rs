//! Byte-range splitting of a CSV file into header-bearing chunk files.
//!
//! The source body (everything after the header line) is cut into
//! `chunk_count` contiguous pieces of roughly `body_size / chunk_count` bytes.
//! Each piece is written to its own transient file that starts with a verbatim
//! copy of the header, so every chunk parses on its own.
//!
//! # Boundary heuristic
//! Bytes are copied in `read_buffer`-sized reads until the chunk holds at least
//! the target number of body bytes, then one more line is read to finish the
//! record the last read landed in. Chunk sizes therefore overshoot by up to one
//! buffer plus one line, and later chunks may end up small or header-only.
//! The heuristic splits on raw `\n` bytes: a quoted field that contains a
//! newline can be cut in half. Inputs with multi-line records are not supported.

use crate::config::Config;
use crate::error::{IoContext, Result, ShardError};
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::{debug, info};

/// One header-bearing slice of the source, stored in a transient file.
///
/// The file is deleted when the chunk is dropped, so a chunk that never
/// reaches a worker does not leak.
#[derive(Debug)]
pub struct Chunk {
    index: usize,
    path: TempPath,
    body_bytes: u64,
}

impl Chunk {
    /// Position in the original split, `0..chunk_count`.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes copied from the source body, header excluded.
    #[must_use]
    pub fn body_bytes(&self) -> u64 {
        self.body_bytes
    }

    /// Delete the backing file, reporting failures instead of ignoring them.
    pub(crate) fn delete(self) -> Result<()> {
        let display = self.path.display().to_string();
        self.path
            .close()
            .io_context(|| format!("remove chunk {display}"))
    }
}

/// Split `source` into `chunk_count` chunk files and return them in order.
///
/// `chunk_count` is clamped to at least one. A header-only source yields
/// `chunk_count` header-only chunks.
///
/// # Errors
/// [`ShardError::Io`] when the source cannot be read or a chunk cannot be
/// written, [`ShardError::EmptyInput`] when the source has zero bytes. Chunks
/// created before a failure are deleted.
pub fn split(source: impl AsRef<Path>, chunk_count: usize, config: &Config) -> Result<Vec<Chunk>> {
    ChunkSplitter::open(source, chunk_count, config)?.collect()
}

/// Lazily produces chunks one at a time.
///
/// Each item is yielded only after its file is completely written and closed,
/// which lets a coordinator hand chunk `i` to a worker while chunk `i + 1` is
/// still being cut.
pub struct ChunkSplitter {
    source: PathBuf,
    reader: BufReader<File>,
    header: Vec<u8>,
    config: Config,
    chunk_count: usize,
    target_bytes: u64,
    next_index: usize,
    buf: Vec<u8>,
    failed: bool,
}

impl ChunkSplitter {
    /// Open `source`, read its header, and compute the per-chunk byte target.
    ///
    /// # Errors
    /// See [`split`].
    pub fn open(source: impl AsRef<Path>, chunk_count: usize, config: &Config) -> Result<Self> {
        let source = source.as_ref().to_path_buf();
        let file = File::open(&source).io_context(|| format!("open {}", source.display()))?;
        let total = file
            .metadata()
            .io_context(|| format!("stat {}", source.display()))?
            .len();
        if total == 0 {
            return Err(ShardError::EmptyInput { path: source });
        }

        let mut reader = BufReader::with_capacity(config.read_buffer, file);
        let mut header = Vec::new();
        reader
            .read_until(b'\n', &mut header)
            .io_context(|| format!("read header of {}", source.display()))?;

        let chunk_count = chunk_count.max(1);
        let body_size = total.saturating_sub(header.len() as u64);
        let target_bytes = body_size / chunk_count as u64;
        info!(
            source = %source.display(),
            bytes = total,
            chunks = chunk_count,
            target_bytes,
            "splitting {} ({} bytes) into {} chunks (of ~{} bytes each)",
            source.display(),
            total,
            chunk_count,
            target_bytes + header.len() as u64,
        );

        Ok(Self {
            source,
            reader,
            header,
            buf: vec![0; config.read_buffer.max(1)],
            config: config.clone(),
            chunk_count,
            target_bytes,
            next_index: 0,
            failed: false,
        })
    }

    /// The raw header line, terminator included.
    #[must_use]
    pub fn header(&self) -> &[u8] {
        &self.header
    }

    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    /// Body bytes each chunk aims for before finishing its last line.
    #[must_use]
    pub fn target_bytes(&self) -> u64 {
        self.target_bytes
    }

    fn write_chunk(&mut self) -> Result<Chunk> {
        let index = self.next_index;
        let last = index + 1 == self.chunk_count;
        let mut tmp = self
            .config
            .tempfile("ironshard-chunk-")
            .io_context(|| format!("create chunk {index}"))?;
        let context = || format!("write chunk {index} from {}", self.source.display());

        let out = tmp.as_file_mut();
        out.write_all(&self.header).io_context(context)?;

        let mut body_bytes = 0u64;
        while body_bytes < self.target_bytes {
            let n = self.reader.read(&mut self.buf).io_context(context)?;
            if n == 0 {
                break;
            }
            out.write_all(&self.buf[..n]).io_context(context)?;
            body_bytes += n as u64;
        }

        // Finish whatever record the last read stopped inside.
        let mut tail = Vec::new();
        self.reader.read_until(b'\n', &mut tail).io_context(context)?;
        out.write_all(&tail).io_context(context)?;
        body_bytes += tail.len() as u64;

        // Integer division can leave a few bytes behind; they belong to the last chunk.
        if last {
            body_bytes += std::io::copy(&mut self.reader, &mut *out).io_context(context)?;
        }
        out.flush().io_context(context)?;

        debug!(chunk = index, body_bytes, path = %tmp.path().display(), "chunk written");
        self.next_index += 1;
        Ok(Chunk {
            index,
            path: tmp.into_temp_path(),
            body_bytes,
        })
    }
}

impl Iterator for ChunkSplitter {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.next_index >= self.chunk_count {
            return None;
        }
        let chunk = self.write_chunk();
        self.failed = chunk.is_err();
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = if self.failed {
            0
        } else {
            self.chunk_count - self.next_index
        };
        (0, Some(left))
    }
}
