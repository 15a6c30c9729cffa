//! Error type shared by every stage of the shard pipeline.
//!
//! Every failure is fatal to a run. Variants that originate inside a single
//! chunk carry that chunk's index so callers can report which piece of the
//! input broke; see [`ShardError::chunk_index`].

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, ShardError>;

/// Failure kinds raised while splitting, transforming, or merging.
#[derive(Debug, Error)]
pub enum ShardError {
    // ── I/O ───────────────────────────────────────────────────────────────────
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("input file {} is empty", .path.display())]
    EmptyInput { path: PathBuf },

    #[error("malformed CSV in chunk {chunk}: {source}")]
    Csv {
        chunk: usize,
        #[source]
        source: csv::Error,
    },

    // ── Transformation ────────────────────────────────────────────────────────
    #[error("transform failed in chunk {chunk} at record {record}: {cause:#}")]
    Transform {
        chunk: usize,
        /// 1-based position inside the chunk; `0` is the schema probe.
        record: u64,
        cause: anyhow::Error,
    },

    #[error("chunk {chunk} record {record} has {found} values for {expected} header fields")]
    ExtraValues {
        chunk: usize,
        record: u64,
        expected: usize,
        found: usize,
    },

    #[error("chunk {chunk} record {record} produced field {field:?} that the probe record did not")]
    UnexpectedField {
        chunk: usize,
        record: u64,
        field: String,
    },

    #[error("chunk {chunk} header {found:?} does not match {expected:?}")]
    SchemaMismatch {
        chunk: usize,
        expected: Vec<String>,
        found: Vec<String>,
    },

    // ── Coordination ──────────────────────────────────────────────────────────
    #[error("worker processing chunk {chunk} panicked")]
    WorkerPanic { chunk: usize },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("no transformed chunks to merge")]
    NothingToMerge,
}

impl ShardError {
    /// Wrap an I/O error with a short description of the operation.
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Index of the chunk that failed, when the failure belongs to one chunk.
    #[must_use]
    pub fn chunk_index(&self) -> Option<usize> {
        match self {
            Self::Csv { chunk, .. }
            | Self::Transform { chunk, .. }
            | Self::ExtraValues { chunk, .. }
            | Self::UnexpectedField { chunk, .. }
            | Self::SchemaMismatch { chunk, .. }
            | Self::WorkerPanic { chunk } => Some(*chunk),
            _ => None,
        }
    }
}

/// Attach a description to `std::io::Result`s, in the spirit of `anyhow::Context`.
pub(crate) trait IoContext<T> {
    fn io_context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|e| ShardError::io(f(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_index_is_reported_for_chunk_errors() {
        let err = ShardError::Transform {
            chunk: 3,
            record: 2,
            cause: anyhow::anyhow!("boom"),
        };
        assert_eq!(err.chunk_index(), Some(3));
        assert!(err.to_string().contains("chunk 3 at record 2"));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn extra_values_name_both_counts() {
        let err = ShardError::ExtraValues {
            chunk: 1,
            record: 4,
            expected: 2,
            found: 3,
        };
        assert_eq!(err.chunk_index(), Some(1));
        assert_eq!(err.to_string(), "chunk 1 record 4 has 3 values for 2 header fields");
    }

    #[test]
    fn io_errors_have_no_chunk() {
        let res: std::io::Result<()> = Err(std::io::Error::other("disk full"));
        let err = res.io_context(|| "write out.csv").unwrap_err();
        assert_eq!(err.chunk_index(), None);
        assert_eq!(err.to_string(), "write out.csv: disk full");
    }
}
