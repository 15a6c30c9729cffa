//! # Ironshard
//!
//! Parallel row-wise transformation of large CSV files.
//!
//! Ironshard cuts a CSV into byte-balanced chunks, applies a row transform to
//! every chunk on a bounded worker pool, and stitches the transformed chunks
//! back together in the original row order.
//!
//! ## Key Features
//!
//! - **Byte-range splitting** - chunks are cut by size, never through a record
//! - **Self-describing chunks** - every chunk carries the header and parses on its own
//! - **Schema discovery** - a probe record reveals which columns a transform adds or drops
//! - **Order preservation** - workers finish in any order; output rows never move
//! - **Clean failure** - a failing row aborts the run, names its chunk, and leaves no files behind
//!
//! ## Quick Start
//!
//! ```no_run
//! use ironshard::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! // Append `new_column=default_value` to every row, using every CPU.
//! let summary = process_csv("trips.csv", "output.csv", &AddColumn::default(), &Config::default())?;
//! println!("{} rows in {} chunks", summary.rows, summary.chunks);
//! # Ok(())
//! # }
//! ```
//!
//! Any closure over a [`Record`] works as a transform:
//!
//! ```no_run
//! use ironshard::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let cents = |r: &mut Record| -> anyhow::Result<()> {
//!     let fare: f64 = r.get("fare").unwrap_or("0").parse()?;
//!     r.set("fare_cents", format!("{}", (fare * 100.0).round()));
//!     r.remove("fare");
//!     Ok(())
//! };
//! process_csv("trips.csv", "cents.csv", &cents, &Config::default().with_workers(8))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! 1. [`chunker`] splits the source into `chunk_count` transient files.
//! 2. [`coordinator`] hands each chunk to a worker running [`processor::process`].
//! 3. [`merger`] writes the first chunk's header once, then every chunk body in index order.
//!
//! With [`Config::overlap_split`] enabled (the default) chunks are dispatched
//! while the rest of the file is still being split.
//!
//! ## Limitations
//!
//! Chunk boundaries are found by scanning for `\n`. Quoted fields containing
//! newlines are not supported.
//!
//! ## Module Overview
//!
//! - [`record`] - ordered field → value mapping
//! - [`transform`] - the [`RowTransform`] trait and built-in transforms
//! - [`chunker`] - byte-range splitting
//! - [`processor`] - per-chunk transformation and schema derivation
//! - [`coordinator`] - worker pool and order restoration
//! - [`merger`] - final concatenation
//! - [`pipeline`] - the [`process_csv`] entry point
//! - [`metrics`] - the [`RunSummary`] report
//! - [`testing`] - fixtures and assertions for tests

pub mod chunker;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod merger;
pub mod metrics;
pub mod pipeline;
pub mod processor;
pub mod record;
pub mod testing;
pub mod transform;

pub use chunker::{Chunk, ChunkSplitter, split};
pub use config::{Config, DEFAULT_READ_BUFFER};
pub use coordinator::Coordinator;
pub use error::{Result, ShardError};
pub use merger::{MergeStats, merge};
pub use metrics::RunSummary;
pub use pipeline::process_csv;
pub use processor::{TransformedChunk, derive_schema, process};
pub use record::Record;
pub use transform::{AddColumn, Identity, RowTransform};
