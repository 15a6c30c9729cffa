//! Fans chunks out to a bounded worker pool and restores their order.
//!
//! Workers report a tagged [`Completion`] over an `mpsc` channel in whatever
//! order they finish. The coordinator receives one completion per dispatched
//! chunk and sorts the successes by chunk index; that sort is the only place
//! ordering is enforced.
//!
//! The first failing worker raises a shared cancellation flag. Chunks that have
//! not started yet are then dropped unprocessed, and every output already
//! produced is deleted before the error is returned.

use crate::chunker::Chunk;
use crate::config::Config;
use crate::error::{Result, ShardError};
use crate::processor::{self, TransformedChunk};
use crate::transform::RowTransform;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use tracing::{debug, warn};

/// What happened to one dispatched chunk.
#[derive(Debug)]
pub enum Outcome {
    Done(TransformedChunk),
    Failed(ShardError),
    /// Dropped without processing because another chunk failed first.
    Skipped,
}

/// A worker's report, tagged with the chunk index it belongs to.
#[derive(Debug)]
pub struct Completion {
    pub index: usize,
    pub outcome: Outcome,
}

/// Owns the worker pool for one or more runs.
pub struct Coordinator {
    pool: ThreadPool,
    config: Config,
}

impl Coordinator {
    /// Build a pool of `config.max_workers` threads.
    ///
    /// # Errors
    /// [`ShardError::ThreadPool`] if the threads cannot be spawned.
    pub fn new(config: &Config) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.max_workers.max(1))
            .thread_name(|i| format!("ironshard-worker-{i}"))
            .build()?;
        Ok(Self {
            pool,
            config: config.clone(),
        })
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Process already-split chunks and return the outputs ordered by index.
    ///
    /// # Errors
    /// The failure of the lowest-indexed chunk that failed.
    pub fn run_all(
        &self,
        chunks: Vec<Chunk>,
        transform: &dyn RowTransform,
    ) -> Result<Vec<TransformedChunk>> {
        self.run_streaming(chunks.into_iter().map(Ok), transform)
    }

    /// Dispatch each chunk as soon as `chunks` yields it.
    ///
    /// Splitting happens on the calling thread while workers already process
    /// earlier chunks. A splitting error stops dispatch, cancels pending work,
    /// and is returned in preference to worker failures.
    ///
    /// # Errors
    /// See [`Coordinator::run_all`].
    pub fn run_streaming<I>(&self, chunks: I, transform: &dyn RowTransform) -> Result<Vec<TransformedChunk>>
    where
        I: IntoIterator<Item = Result<Chunk>>,
    {
        let (tx, rx) = mpsc::channel::<Completion>();
        let cancelled = AtomicBool::new(false);
        let cancel = &cancelled;
        let config = &self.config;
        let mut dispatched = 0usize;
        let mut split_error = None;

        self.pool.in_place_scope(|scope| {
            for chunk in chunks {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        cancel.store(true, Ordering::SeqCst);
                        split_error = Some(e);
                        break;
                    }
                };
                if cancel.load(Ordering::SeqCst) {
                    // A worker already failed; stop cutting the rest of the file.
                    break;
                }
                dispatched += 1;
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let completion = run_worker(chunk, transform, config, cancel);
                    // The receiver outlives the scope.
                    let _ = tx.send(completion);
                });
            }
        });
        drop(tx);

        let mut done = Vec::with_capacity(dispatched);
        let mut failures = Vec::new();
        for completion in rx.iter().take(dispatched) {
            match completion.outcome {
                Outcome::Done(out) => done.push(out),
                Outcome::Failed(e) => failures.push((completion.index, e)),
                Outcome::Skipped => debug!(chunk = completion.index, "chunk skipped after failure"),
            }
        }

        if let Some(e) = split_error {
            return Err(e);
        }
        if !failures.is_empty() {
            failures.sort_by_key(|(index, _)| *index);
            let (index, err) = failures.swap_remove(0);
            warn!(
                chunk = index,
                failed = failures.len() + 1,
                discarded = done.len(),
                "aborting run"
            );
            return Err(err);
        }

        done.sort_by_key(TransformedChunk::index);
        Ok(done)
    }
}

/// Process one chunk unless the run has been cancelled.
fn run_worker(
    chunk: Chunk,
    transform: &dyn RowTransform,
    config: &Config,
    cancel: &AtomicBool,
) -> Completion {
    let index = chunk.index();
    if cancel.load(Ordering::SeqCst) {
        return Completion {
            index,
            outcome: Outcome::Skipped,
        };
    }

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        processor::process(chunk, transform, config)
    }))
    .unwrap_or(Err(ShardError::WorkerPanic { chunk: index }));

    let outcome = match result {
        Ok(out) => Outcome::Done(out),
        Err(e) => {
            cancel.store(true, Ordering::SeqCst);
            Outcome::Failed(e)
        }
    };
    Completion { index, outcome }
}
