//! Order-preserving concatenation of transformed chunks.
//!
//! The header line of the first chunk is written once; every chunk then
//! contributes its body verbatim, in the order given. Output goes to a
//! temporary file beside the destination and is renamed into place only after
//! the last chunk has been copied, so a failed merge never leaves a truncated
//! output behind.

use crate::config::Config;
use crate::error::{IoContext, Result, ShardError};
use crate::processor::TransformedChunk;
use serde::Serialize;
use std::fs::{File, create_dir_all};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, info};

/// Totals reported by [`merge`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub chunks: usize,
    pub rows: u64,
    pub bytes_written: u64,
}

/// Check that every chunk carries the same header as the first one.
///
/// # Errors
/// [`ShardError::SchemaMismatch`] naming the first chunk that disagrees.
pub fn check_schemas(chunks: &[TransformedChunk]) -> Result<()> {
    let Some(first) = chunks.first() else {
        return Err(ShardError::NothingToMerge);
    };
    match chunks.iter().find(|c| c.header() != first.header()) {
        Some(bad) => Err(ShardError::SchemaMismatch {
            chunk: bad.index(),
            expected: first.header().to_vec(),
            found: bad.header().to_vec(),
        }),
        None => Ok(()),
    }
}

/// Write `chunks` into `output` in the given order, consuming them.
///
/// Each chunk file is deleted as soon as its body has been copied. Parent
/// directories of `output` are created when missing and an existing file is
/// replaced.
///
/// # Errors
/// - [`ShardError::NothingToMerge`] for an empty list.
/// - [`ShardError::SchemaMismatch`] when headers disagree; nothing is written.
/// - [`ShardError::Io`] on read or write failures; `output` is left untouched.
pub fn merge(output: impl AsRef<Path>, chunks: Vec<TransformedChunk>, config: &Config) -> Result<MergeStats> {
    let output = output.as_ref();
    check_schemas(&chunks)?;
    info!(files = chunks.len(), output = %output.display(), "merging {} files into {}", chunks.len(), output.display());

    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => {
            create_dir_all(p).io_context(|| format!("mkdir -p {}", p.display()))?;
            p
        }
        _ => Path::new("."),
    };
    let staging = tempfile::Builder::new()
        .prefix(".ironshard-merge-")
        .tempfile_in(parent)
        .io_context(|| format!("create staging file in {}", parent.display()))?;
    let mut out = BufWriter::with_capacity(config.read_buffer, staging);
    let mut buf = vec![0u8; config.read_buffer.max(1)];

    let mut stats = MergeStats::default();
    for (position, chunk) in chunks.into_iter().enumerate() {
        let context = || format!("copy transformed chunk {}", chunk.index());
        let file = File::open(chunk.path()).io_context(context)?;
        let mut reader = BufReader::with_capacity(config.read_buffer, file);

        let mut header = Vec::new();
        reader.read_until(b'\n', &mut header).io_context(context)?;
        if position == 0 {
            out.write_all(&header).io_context(context)?;
            stats.bytes_written += header.len() as u64;
        }

        let copied = copy_body(&mut reader, &mut out, &mut buf).io_context(context)?;
        stats.bytes_written += copied;
        stats.rows += chunk.rows();
        stats.chunks += 1;
        debug!(chunk = chunk.index(), bytes = copied, "chunk merged");

        drop(reader);
        chunk.delete()?;
    }

    let staging = out
        .into_inner()
        .map_err(|e| ShardError::io(format!("flush {}", output.display()), e.into_error()))?;
    staging
        .persist(output)
        .map_err(|e| ShardError::io(format!("persist {}", output.display()), e.error))?;

    info!(rows = stats.rows, bytes = stats.bytes_written, "finished merging");
    Ok(stats)
}

fn copy_body(reader: &mut impl Read, out: &mut impl Write, buf: &mut [u8]) -> std::io::Result<u64> {
    let mut copied = 0u64;
    loop {
        let n = reader.read(buf)?;
        if n == 0 {
            return Ok(copied);
        }
        out.write_all(&buf[..n])?;
        copied += n as u64;
    }
}
