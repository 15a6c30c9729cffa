//! End-to-end entry point: split, transform in parallel, merge.

use crate::chunker::{ChunkSplitter, split};
use crate::config::Config;
use crate::coordinator::Coordinator;
use crate::error::{IoContext, Result};
use crate::merger::merge;
use crate::metrics::RunSummary;
use crate::transform::RowTransform;
use std::path::Path;
use std::time::Instant;
use tracing::{info, info_span};

/// Apply `transform` to every row of `input` and write the result to `output`.
///
/// Row order in `output` matches `input`. The output header is the input
/// header minus the fields the transform removes, followed by the fields it
/// adds. Every transient file is deleted whether the run succeeds or not, and
/// `output` is only created once all chunks have been transformed and merged.
///
/// # Errors
/// The first fatal [`ShardError`](crate::ShardError) raised by any stage; use
/// [`ShardError::chunk_index`](crate::ShardError::chunk_index) to find the
/// chunk that failed.
pub fn process_csv(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    transform: &dyn RowTransform,
    config: &Config,
) -> Result<RunSummary> {
    let input = input.as_ref();
    let output = output.as_ref();
    let _run = info_span!("process_csv", input = %input.display()).entered();
    info!(
        "will apply {} to {} in {} workers",
        transform.name(),
        input.display(),
        config.max_workers
    );

    let mut summary = RunSummary {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        transform: transform.name().to_string(),
        input_bytes: std::fs::metadata(input)
            .io_context(|| format!("stat {}", input.display()))?
            .len(),
        ..RunSummary::default()
    };

    let coordinator = Coordinator::new(config)?;
    summary.workers = coordinator.workers();

    let transformed = if config.overlap_split {
        let started = Instant::now();
        let splitter = ChunkSplitter::open(input, config.chunk_count, config)?;
        info!("applying {} to all {} pieces", transform.name(), splitter.chunk_count());
        let out = coordinator.run_streaming(splitter, transform)?;
        summary.record_phase("split+apply", started.elapsed());
        out
    } else {
        let started = Instant::now();
        let chunks = split(input, config.chunk_count, config)?;
        summary.record_phase("split", started.elapsed());

        let started = Instant::now();
        info!("applying {} to all {} pieces", transform.name(), chunks.len());
        let out = coordinator.run_all(chunks, transform)?;
        summary.record_phase("apply", started.elapsed());
        out
    };
    summary.chunks = transformed.len();
    summary.output_header = transformed
        .first()
        .map(|c| c.header().to_vec())
        .unwrap_or_default();

    let started = Instant::now();
    let stats = merge(output, transformed, config)?;
    summary.record_phase("merge", started.elapsed());
    summary.rows = stats.rows;
    summary.output_bytes = stats.bytes_written;

    Ok(summary)
}
