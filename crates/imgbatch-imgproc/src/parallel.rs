use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::error::KernelError;

/// Errors that can occur while setting up parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// The requested partition count is invalid.
    #[error("partition count must be > 0, got {0}")]
    InvalidPartitionCount(usize),
}

/// Controls how rows are processed by the calling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExecutionStrategy {
    /// Use the global Rayon thread pool to process rows in parallel.
    #[default]
    ParallelRows,

    /// Run sequentially on the current thread.
    ///
    /// Useful for small batches, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    Serial,

    /// Run on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead.
    Fixed(usize),
}

/// Where the rows of a batch are processed.
///
/// Both modes produce bit-identical output for the same kernel and batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// Rows are processed by the calling process.
    Local(ExecutionStrategy),

    /// Rows are split into contiguous partitions, each processed by an independent worker
    /// that never communicates with the other workers.
    Partitioned {
        /// Number of partitions (and workers).
        partitions: usize,
    },
}

impl Default for ExecutionMode {
    fn default() -> Self {
        ExecutionMode::Local(ExecutionStrategy::default())
    }
}

impl ExecutionMode {
    /// Check the mode parameters.
    pub fn validate(&self) -> Result<(), ParallelError> {
        match *self {
            ExecutionMode::Local(ExecutionStrategy::Fixed(0)) => {
                Err(ParallelError::InvalidThreadCount(0))
            }
            ExecutionMode::Partitioned { partitions: 0 } => {
                Err(ParallelError::InvalidPartitionCount(0))
            }
            _ => Ok(()),
        }
    }
}

/// The execution settings of one batch call.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    /// The execution mode.
    pub mode: ExecutionMode,
    cancel_token: Option<CancellationToken>,
}

impl ExecutionContext {
    /// Create a context with the given mode and no cancellation.
    pub fn new(mode: ExecutionMode) -> Self {
        Self {
            mode,
            cancel_token: None,
        }
    }

    /// Create a context running on the current thread.
    pub fn serial() -> Self {
        Self::new(ExecutionMode::Local(ExecutionStrategy::Serial))
    }

    /// Create a context running `partitions` independent workers.
    pub fn partitioned(partitions: usize) -> Self {
        Self::new(ExecutionMode::Partitioned { partitions })
    }

    /// Attach a cancellation token checked before every row.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel_token = Some(token);
        self
    }

    /// Returns true if the attached token was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    fn check_cancelled(&self) -> Result<(), KernelError> {
        if self.is_cancelled() {
            return Err(KernelError::Cancelled);
        }
        Ok(())
    }
}

fn build_pool(num_threads: usize) -> Result<rayon::ThreadPool, ParallelError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|e| ParallelError::BuildError(e.to_string()))
}

/// Apply a row function to every row of a batch with the given execution context.
///
/// `src` holds `dst.len() / dst_len` rows of `src_len` values, `dst` the output rows of
/// `dst_len` values. Row `i` of `dst` is written from row `i` of `src` only.
///
/// # Errors
///
/// The first error returned by `f`, [`KernelError::Cancelled`] if the token is cancelled,
/// or [`KernelError::Parallel`] if the mode cannot be set up. On error the content of
/// `dst` is unspecified.
pub fn par_map_rows<T, F>(
    src: &[T],
    src_len: usize,
    dst: &mut [T],
    dst_len: usize,
    ctx: &ExecutionContext,
    f: F,
) -> Result<(), KernelError>
where
    T: Send + Sync,
    F: Fn(&[T], &mut [T]) -> Result<(), KernelError> + Send + Sync,
{
    ctx.mode.validate()?;
    ctx.check_cancelled()?;

    if dst_len == 0 {
        return Ok(());
    }

    let num_rows = dst.len() / dst_len;
    if dst.len() != num_rows * dst_len {
        return Err(KernelError::ShapeMismatch(dst.len(), num_rows * dst_len));
    }
    if src.len() != num_rows * src_len {
        return Err(KernelError::ShapeMismatch(src.len(), num_rows * src_len));
    }

    let src_row = |i: usize| &src[i * src_len..(i + 1) * src_len];

    let par_rows = |dst: &mut [T]| {
        dst.par_chunks_exact_mut(dst_len)
            .enumerate()
            .try_for_each(|(i, dst_row)| {
                ctx.check_cancelled()?;
                f(src_row(i), dst_row)
            })
    };

    match ctx.mode {
        ExecutionMode::Local(ExecutionStrategy::Serial) => dst
            .chunks_exact_mut(dst_len)
            .enumerate()
            .try_for_each(|(i, dst_row)| {
                ctx.check_cancelled()?;
                f(src_row(i), dst_row)
            }),
        ExecutionMode::Local(ExecutionStrategy::ParallelRows) => par_rows(dst),
        ExecutionMode::Local(ExecutionStrategy::Fixed(n)) => {
            let pool = build_pool(n)?;
            pool.install(|| par_rows(dst))
        }
        ExecutionMode::Partitioned { partitions } => {
            let rows_per_partition = num_rows.div_ceil(partitions).max(1);
            let num_workers = num_rows.div_ceil(rows_per_partition).max(1);
            log::debug!(
                "partitioned execution: {} rows in {} partitions of up to {} rows",
                num_rows,
                num_workers,
                rows_per_partition
            );

            let pool = build_pool(num_workers)?;
            let failed = AtomicBool::new(false);

            let results = pool.install(|| {
                dst.par_chunks_mut(rows_per_partition * dst_len)
                    .enumerate()
                    .map(|(p, dst_partition)| {
                        let first_row = p * rows_per_partition;
                        for (k, dst_row) in dst_partition.chunks_exact_mut(dst_len).enumerate() {
                            if failed.load(Ordering::Relaxed) {
                                // another worker failed, stop issuing rows
                                break;
                            }
                            let res = ctx
                                .check_cancelled()
                                .and_then(|_| f(src_row(first_row + k), dst_row));
                            if let Err(err) = res {
                                failed.store(true, Ordering::Relaxed);
                                return Err(err);
                            }
                        }
                        Ok(())
                    })
                    .collect::<Vec<Result<(), KernelError>>>()
            });

            results.into_iter().collect()
        }
    }
}
