//! Chunked parallel execution over [`crate::types::Frame`] rows.
//!
//! [`Frame::map_parallel`](crate::types::Frame::map_parallel) runs on rayon's global pool with no
//! limits. This module sits next to it and adds:
//!
//! - a dedicated worker pool with a configurable thread count
//! - fixed-size chunking with a bound on in-flight chunks (throttling)
//! - real-time metrics and observer hooks for monitoring
//! - decimal aggregates whose per-chunk partial sums are combined in chunk order, so the result
//!   is identical to the sequential one
//!
//! Output order always equals input order. A failing caller closure stops its own chunk; the
//! error reported is the one from the lowest input position.

mod observer;
mod semaphore;

use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{FrameError, FrameResult};
use crate::number::{DecimalAcc, ToDecimal};
use crate::processing::ReduceOp;
use crate::types::Frame;

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver,
    TracingExecutionObserver,
};

use semaphore::Semaphore;

/// Configuration for the [`ExecutionEngine`].
///
/// Missing fields fall back to [`ExecutionOptions::default`] when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionOptions {
    /// Number of worker threads used by the engine.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Number of rows per chunk.
    pub chunk_size: usize,
    /// Upper bound on concurrently executing chunks, on top of `num_threads`.
    pub max_in_flight_chunks: usize,
}

fn available_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let n = available_threads();
        Self {
            num_threads: Some(n),
            chunk_size: 4_096,
            max_in_flight_chunks: n.max(1),
        }
    }
}

impl ExecutionOptions {
    fn validate(&self) -> FrameResult<()> {
        if self.chunk_size == 0 {
            return Err(FrameError::invalid_argument("chunk_size must be > 0"));
        }
        if self.max_in_flight_chunks == 0 {
            return Err(FrameError::invalid_argument("max_in_flight_chunks must be > 0"));
        }
        if self.num_threads == Some(0) {
            return Err(FrameError::invalid_argument("num_threads must be > 0 when set"));
        }
        Ok(())
    }
}

/// A configurable execution engine for parallel frame pipelines.
pub struct ExecutionEngine {
    pool: ThreadPool,
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Create a new engine with the given options.
    ///
    /// Fails with [`FrameError::InvalidArgument`] if `chunk_size == 0`,
    /// `max_in_flight_chunks == 0` or `num_threads == Some(0)`.
    pub fn new(opts: ExecutionOptions) -> FrameResult<Self> {
        opts.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(opts.num_threads.unwrap_or_else(available_threads))
            .build()?;
        Ok(Self {
            pool,
            opts,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        })
    }

    /// Attach an observer for execution events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.opts
    }

    /// Get a handle to real-time execution metrics.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Map every row in parallel, keeping input order.
    pub fn map_parallel<T, R, F>(&self, frame: &Frame<T>, mapper: F) -> Frame<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Send + Sync,
    {
        let chunks = self.run_chunks("map_parallel", frame.rows(), |rows| {
            Ok::<_, std::convert::Infallible>(rows.iter().map(&mapper).collect::<Vec<_>>())
        });
        let Ok(chunks) = chunks;
        frame.derive(chunks.into_iter().flatten().collect())
    }

    /// Fallible [`Self::map_parallel`]; fails with the error of the lowest failing row.
    pub fn try_map_parallel<T, R, E, F>(&self, frame: &Frame<T>, mapper: F) -> Result<Frame<R>, E>
    where
        T: Sync,
        R: Send,
        E: Send,
        F: Fn(&T) -> Result<R, E> + Send + Sync,
    {
        let chunks = self.run_chunks("try_map_parallel", frame.rows(), |rows| {
            rows.iter().map(&mapper).collect::<Result<Vec<_>, E>>()
        })?;
        Ok(frame.derive(chunks.into_iter().flatten().collect()))
    }

    /// Keep rows matching `predicate`, evaluated in parallel.
    pub fn filter_parallel<T, F>(&self, frame: &Frame<T>, predicate: F) -> Frame<T>
    where
        T: Clone + Send + Sync,
        F: Fn(&T) -> bool + Send + Sync,
    {
        let kept = self.map_parallel(frame, |r| predicate(r).then(|| r.clone()));
        frame.derive(kept.into_iter().flatten().collect())
    }

    /// Run `action` for every row in parallel.
    pub fn for_each_parallel<T, F>(&self, frame: &Frame<T>, action: F)
    where
        T: Sync,
        F: Fn(&T) + Send + Sync,
    {
        let done = self.run_chunks("for_each_parallel", frame.rows(), |rows| {
            rows.iter().for_each(&action);
            Ok::<_, std::convert::Infallible>(())
        });
        let Ok(_) = done;
    }

    /// Fallible [`Self::for_each_parallel`]; fails with the error of the lowest failing row.
    ///
    /// Rows in other chunks may still have been visited when an error is returned.
    pub fn try_for_each_parallel<T, E, F>(&self, frame: &Frame<T>, action: F) -> Result<(), E>
    where
        T: Sync,
        E: Send,
        F: Fn(&T) -> Result<(), E> + Send + Sync,
    {
        self.run_chunks("try_for_each_parallel", frame.rows(), |rows| {
            rows.iter().try_for_each(&action)
        })?;
        Ok(())
    }

    /// Chunked decimal reduction.
    ///
    /// Each chunk folds its own partial sum; partials are combined in chunk order and finished
    /// with the frame's [`crate::NumberFormat`], so the result matches
    /// [`crate::processing::reduce`] exactly.
    pub fn reduce<T, V, F>(&self, frame: &Frame<T>, value: F, op: ReduceOp) -> FrameResult<Decimal>
    where
        T: Sync,
        V: ToDecimal,
        F: Fn(&T) -> V + Send + Sync,
    {
        let partials = self.run_chunks(op.name(), frame.rows(), |rows| {
            let mut acc = DecimalAcc::default();
            if op != ReduceOp::Count {
                for r in rows {
                    acc.push(&value(r), op.name())?;
                }
            }
            Ok::<_, FrameError>(acc)
        })?;
        let acc = partials
            .into_iter()
            .try_fold(DecimalAcc::default(), |total, part| total.merge(part, op.name()))?;
        op.finish(acc, frame.len(), &frame.number_format())
    }

    pub fn sum<T, V, F>(&self, frame: &Frame<T>, value: F) -> FrameResult<Decimal>
    where
        T: Sync,
        V: ToDecimal,
        F: Fn(&T) -> V + Send + Sync,
    {
        self.reduce(frame, value, ReduceOp::Sum)
    }

    pub fn avg<T, V, F>(&self, frame: &Frame<T>, value: F) -> FrameResult<Decimal>
    where
        T: Sync,
        V: ToDecimal,
        F: Fn(&T) -> V + Send + Sync,
    {
        self.reduce(frame, value, ReduceOp::Avg)
    }

    pub fn count<T: Sync>(&self, frame: &Frame<T>) -> FrameResult<Decimal> {
        self.reduce(frame, |_| 0i64, ReduceOp::Count)
    }

    /// Run `per_chunk` over fixed-size chunks on the pool, returning chunk outputs in chunk order.
    ///
    /// The first error in chunk order wins, which is the lowest-positioned failing row as long
    /// as `per_chunk` stops at its own first error.
    fn run_chunks<T, O, E, F>(&self, operation: &'static str, rows: &[T], per_chunk: F) -> Result<Vec<O>, E>
    where
        T: Sync,
        O: Send,
        E: Send,
        F: Fn(&[T]) -> Result<O, E> + Send + Sync,
    {
        let start = Instant::now();
        let ranges = chunk_ranges(rows.len(), self.opts.chunk_size);
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted {
            operation,
            rows: rows.len(),
            chunks: ranges.len(),
        });

        let sem = Semaphore::new(self.opts.max_in_flight_chunks);
        let results: Vec<Result<O, E>> = self.pool.install(|| {
            ranges
                .into_par_iter()
                .map(|range| self.run_chunk(&sem, rows, range, &per_chunk))
                .collect()
        });
        let out = results.into_iter().collect::<Result<Vec<_>, E>>();

        self.metrics.end_run(start.elapsed());
        self.emit(ExecutionEvent::RunFinished {
            operation,
            elapsed: start.elapsed(),
            metrics: self.metrics.snapshot(),
        });
        out
    }

    fn run_chunk<T, O, E, F>(&self, sem: &Semaphore, rows: &[T], range: Range<usize>, per_chunk: &F) -> Result<O, E>
    where
        F: Fn(&[T]) -> Result<O, E>,
    {
        let (_permit, waited) = sem.acquire();
        if waited > Duration::ZERO {
            self.metrics.on_throttle_wait(waited);
            self.emit(ExecutionEvent::ThrottleWaited { duration: waited });
        }

        let start_row = range.start;
        let row_count = range.len();
        self.metrics.on_chunk_start();
        self.emit(ExecutionEvent::ChunkStarted {
            start_row,
            row_count,
        });

        let result = per_chunk(&rows[range]);
        match &result {
            Ok(_) => {
                self.metrics.on_rows_processed(row_count);
                self.emit(ExecutionEvent::ChunkFinished {
                    start_row,
                    row_count,
                });
            }
            Err(_) => self.emit(ExecutionEvent::ChunkFailed { start_row }),
        }
        self.metrics.on_chunk_end(result.is_err());
        result
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

fn chunk_ranges(row_count: usize, chunk_size: usize) -> Vec<Range<usize>> {
    (0..row_count)
        .step_by(chunk_size)
        .map(|start| start..(start + chunk_size).min(row_count))
        .collect()
}
