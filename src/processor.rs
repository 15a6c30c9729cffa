//! Applies a [`RowTransform`] to every record of one chunk.
//!
//! The output schema of a chunk is discovered with a probe record before any
//! real row is touched; see [`derive_schema`].

use crate::chunker::Chunk;
use crate::config::Config;
use crate::error::{IoContext, Result, ShardError};
use crate::record::Record;
use crate::transform::RowTransform;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tempfile::TempPath;
use tracing::debug;

/// Value every field of the probe record is set to.
pub const PROBE_PLACEHOLDER: &str = "";

/// Output of one chunk: its derived header plus the transformed rows on disk.
///
/// The file is deleted when this value is dropped.
#[derive(Debug)]
pub struct TransformedChunk {
    index: usize,
    header: Vec<String>,
    rows: u64,
    path: TempPath,
}

impl TransformedChunk {
    /// Index of the input chunk this was produced from.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    #[must_use]
    pub fn rows(&self) -> u64 {
        self.rows
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn delete(self) -> Result<()> {
        let display = self.path.display().to_string();
        self.path
            .close()
            .io_context(|| format!("remove transformed chunk {display}"))
    }
}

/// Discover the field order `transform` produces for records with header `input`.
///
/// Input fields that survive the transform keep their original order; fields the
/// transform introduces follow in the order it inserted them.
///
/// # Errors
/// Whatever `transform` returns when applied to the probe record.
pub fn derive_schema(input: &[String], transform: &dyn RowTransform) -> anyhow::Result<Vec<String>> {
    let mut probe = Record::placeholder(input.iter().map(String::as_str), PROBE_PLACEHOLDER);
    transform.apply(&mut probe)?;

    let mut schema: Vec<String> = input.iter().filter(|f| probe.contains(f)).cloned().collect();
    schema.extend(
        probe
            .field_names()
            .filter(|f| !input.iter().any(|i| i.as_str() == *f))
            .map(str::to_string),
    );
    Ok(schema)
}

/// Transform every record of `chunk` into a new transient file.
///
/// The input chunk is deleted once it has been fully read. On failure it is
/// deleted as well, together with the partial output.
///
/// # Errors
/// - [`ShardError::Transform`] when the transform fails on the probe (`record == 0`)
///   or on any row.
/// - [`ShardError::ExtraValues`] when a row has more values than the header.
/// - [`ShardError::UnexpectedField`] when a row gains a field the probe did not.
/// - [`ShardError::Csv`] / [`ShardError::Io`] for malformed input or write failures.
pub fn process(chunk: Chunk, transform: &dyn RowTransform, config: &Config) -> Result<TransformedChunk> {
    let index = chunk.index();
    let file = File::open(chunk.path())
        .io_context(|| format!("open chunk {index} at {}", chunk.path().display()))?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::with_capacity(config.read_buffer, file));
    let csv_err = |source: csv::Error| ShardError::Csv { chunk: index, source };

    let input: Vec<String> = rdr.headers().map_err(csv_err)?.iter().map(str::to_string).collect();
    let header = derive_schema(&input, transform).map_err(|cause| ShardError::Transform {
        chunk: index,
        record: 0,
        cause,
    })?;
    let known: HashSet<&str> = header.iter().map(String::as_str).collect();

    let out = config
        .tempfile("ironshard-out-")
        .io_context(|| format!("create output for chunk {index}"))?;
    let mut wtr = csv::WriterBuilder::new()
        .buffer_capacity(config.read_buffer)
        .from_writer(out);
    wtr.write_record(&header).map_err(csv_err)?;

    let mut raw = csv::StringRecord::new();
    let mut rows = 0u64;
    while rdr.read_record(&mut raw).map_err(csv_err)? {
        rows += 1;
        if raw.len() > input.len() {
            return Err(ShardError::ExtraValues {
                chunk: index,
                record: rows,
                expected: input.len(),
                found: raw.len(),
            });
        }
        // Short rows are padded with empty values.
        let mut record = Record::from_row(input.iter().map(String::as_str), raw.iter());
        transform
            .apply(&mut record)
            .map_err(|cause| ShardError::Transform {
                chunk: index,
                record: rows,
                cause,
            })?;
        if let Some(field) = record.field_names().find(|f| !known.contains(f)) {
            return Err(ShardError::UnexpectedField {
                chunk: index,
                record: rows,
                field: field.to_string(),
            });
        }
        wtr.write_record(header.iter().map(|f| record.get(f).unwrap_or_default()))
            .map_err(csv_err)?;
    }

    let out = wtr
        .into_inner()
        .map_err(|e| ShardError::io(format!("flush output for chunk {index}"), e.into_error()))?;
    drop(rdr);
    chunk.delete()?;

    debug!(chunk = index, rows, fields = header.len(), "chunk transformed");
    Ok(TransformedChunk {
        index,
        header,
        rows,
        path: out.into_temp_path(),
    })
}
