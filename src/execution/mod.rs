//! Parallel execution of an encoding [`Pipeline`].
//!
//! The engine produces exactly the same [`EncodedDataset`] as [`Pipeline::run`], but:
//!
//! - builds each column's plan (category ordering, mode) on its own task
//! - encodes rows in chunks across a rayon pool, merging chunks back in row order
//! - bounds in-flight chunks with a semaphore
//! - exposes real-time metrics and observer hooks

mod observer;
mod semaphore;

use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Deserialize;

use crate::error::{EncodingError, EncodingResult};
use crate::processing::{EncodedChunk, Pipeline};
use crate::types::{EncodedDataset, IndexedTable, ValueIndex};

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver, StdErrExecutionObserver,
};

use semaphore::Semaphore;

/// Chunking and threading knobs for the [`ExecutionEngine`].
///
/// Deserializes from JSON with every field optional, e.g. `{"chunk_size": 1024}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExecutionOptions {
    /// Worker threads; `None` means the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Rows encoded per task.
    pub chunk_size: usize,
    /// Chunks allowed to encode at the same time, independent of `num_threads`.
    pub max_in_flight_chunks: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let n = available_threads();
        Self {
            num_threads: None,
            chunk_size: 4_096,
            max_in_flight_chunks: n,
        }
    }
}

impl ExecutionOptions {
    fn validate(&self) -> EncodingResult<()> {
        let bad = if self.chunk_size == 0 {
            Some("chunk_size")
        } else if self.max_in_flight_chunks == 0 {
            Some("max_in_flight_chunks")
        } else if self.num_threads == Some(0) {
            Some("num_threads")
        } else {
            None
        };
        match bad {
            Some(field) => Err(EncodingError::Config {
                message: format!("execution option `{field}` must be greater than zero"),
            }),
            None => Ok(()),
        }
    }
}

fn available_threads() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

/// Runs a [`Pipeline`] on a dedicated rayon pool.
pub struct ExecutionEngine {
    pool: ThreadPool,
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Build the engine's thread pool.
    ///
    /// Zero-valued options and pool construction failures are reported as
    /// [`EncodingError::Config`].
    pub fn new(opts: ExecutionOptions) -> EncodingResult<Self> {
        opts.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(opts.num_threads.unwrap_or_else(available_threads))
            .thread_name(|i| format!("encode-{i}"))
            .build()
            .map_err(|e| EncodingError::Config {
                message: format!("cannot start encoding pool: {e}"),
            })?;

        Ok(Self {
            pool,
            opts,
            observer: None,
            metrics: Arc::default(),
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to real-time execution metrics.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Encode `indexed` with `pipeline` on the engine's pool.
    pub fn run(&self, pipeline: &Pipeline, indexed: &IndexedTable) -> EncodingResult<EncodedDataset> {
        self.pool.install(|| {
            let start = Instant::now();
            self.metrics.begin_run();
            self.emit(ExecutionEvent::RunStarted {
                rows: indexed.table.row_count(),
                columns: indexed.table.column_count(),
            });

            let result = self.run_impl(pipeline, indexed);

            self.metrics.end_run(start.elapsed());
            match &result {
                Ok(_) => self.emit(ExecutionEvent::RunFinished {
                    elapsed: start.elapsed(),
                    metrics: self.metrics.snapshot(),
                }),
                Err(e) => self.emit(ExecutionEvent::RunFailed {
                    message: e.to_string(),
                }),
            }
            result
        })
    }

    fn run_impl(&self, pipeline: &Pipeline, indexed: &IndexedTable) -> EncodingResult<EncodedDataset> {
        let table = &indexed.table;
        pipeline.check_table(table)?;
        if table.row_count() == 0 {
            return Ok(EncodedDataset::default());
        }

        // Column plans are independent of each other.
        let empty = ValueIndex::new();
        let columns = (0..table.column_count())
            .into_par_iter()
            .map(|j| pipeline.plan_column(j, indexed.index.column(j).unwrap_or(&empty)))
            .collect::<EncodingResult<Vec<_>>>()?;
        let plan = pipeline.assemble(columns);
        self.emit(ExecutionEvent::PlanBuilt {
            features: plan.feature_count(),
        });

        let sem = Semaphore::new(self.opts.max_in_flight_chunks);
        let chunks = chunk_ranges(table.row_count(), self.opts.chunk_size)
            .into_par_iter()
            .map(|range| {
                let (_permit, waited) = sem.acquire();
                if waited > Duration::ZERO {
                    self.metrics.on_throttle_wait(waited);
                    self.emit(ExecutionEvent::ThrottleWaited { duration: waited });
                }

                self.metrics.on_chunk_start();
                self.emit(ExecutionEvent::ChunkStarted {
                    start_row: range.start,
                    row_count: range.end - range.start,
                });

                let start_row = range.start;
                let encoded = plan.encode_rows(start_row, &table.rows[range.clone()]);
                if let Ok(chunk) = &encoded {
                    self.record_chunk(start_row, range.len(), chunk);
                }

                self.metrics.on_chunk_end();
                encoded
            })
            .collect::<EncodingResult<Vec<EncodedChunk>>>()?;

        Ok(plan.finish(table.row_count(), chunks))
    }

    fn record_chunk(&self, start_row: usize, rows: usize, chunk: &EncodedChunk) {
        let issues = &chunk.report.conversion_issues;
        self.metrics
            .on_rows_encoded(rows, issues.len(), chunk.report.imputed_cells);
        for issue in issues {
            self.emit(ExecutionEvent::ConversionIssue {
                row: issue.row,
                column: issue.column.clone(),
                raw: issue.raw.clone(),
            });
        }
        self.emit(ExecutionEvent::ChunkFinished {
            start_row,
            conversion_issues: issues.len(),
        });
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
        .map(|start| start..row_count.min(start + chunk_size))
        .collect()
}
