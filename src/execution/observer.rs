use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Progress of one [`super::ExecutionEngine::run`] call.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted { rows: usize, columns: usize },
    PlanBuilt { features: usize },
    ThrottleWaited { duration: Duration },
    ChunkStarted { start_row: usize, row_count: usize },
    ChunkFinished { start_row: usize, conversion_issues: usize },
    /// A numeric cell was replaced by zero.
    ConversionIssue { row: usize, column: String, raw: String },
    RunFailed { message: String },
    RunFinished {
        elapsed: Duration,
        metrics: ExecutionMetricsSnapshot,
    },
}

impl fmt::Display for ExecutionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunStarted { rows, columns } => write!(f, "start rows={rows} cols={columns}"),
            Self::PlanBuilt { features } => write!(f, "plan features={features}"),
            Self::ThrottleWaited { duration } => write!(f, "throttled {duration:?}"),
            Self::ChunkStarted { start_row, row_count } => {
                write!(f, "chunk rows={start_row}..{}", start_row + row_count)
            }
            Self::ChunkFinished {
                start_row,
                conversion_issues,
            } => write!(f, "chunk@{start_row} done issues={conversion_issues}"),
            Self::ConversionIssue { row, column, raw } => {
                write!(f, "zero-substituted row={row} column={column} raw={raw:?}")
            }
            Self::RunFailed { message } => write!(f, "failed: {message}"),
            Self::RunFinished { elapsed, metrics } => write!(f, "finished in {elapsed:?}: {metrics}"),
        }
    }
}

pub trait ExecutionObserver: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent);
}

/// Prints each event to stderr, prefixed with `[encode]`.
#[derive(Debug, Default)]
pub struct StdErrExecutionObserver;

impl ExecutionObserver for StdErrExecutionObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        eprintln!("[encode] {event}");
    }
}

/// Live counters for the engine's current (or last) run.
///
/// Counters are reset when a run starts and can be read with [`Self::snapshot`] from any
/// thread while the run is in progress.
#[derive(Debug, Default)]
pub struct ExecutionMetrics {
    runs: AtomicU64,
    elapsed_ns: AtomicU64,
    rows_encoded: AtomicU64,
    chunks_started: AtomicU64,
    chunks_finished: AtomicU64,
    conversion_issues: AtomicU64,
    imputed_cells: AtomicU64,
    throttle_wait_ns: AtomicU64,
    active_chunks: AtomicUsize,
    peak_chunks: AtomicUsize,
}

impl ExecutionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_run(&self) {
        self.runs.fetch_add(1, Ordering::Relaxed);
        for counter in [
            &self.elapsed_ns,
            &self.rows_encoded,
            &self.chunks_started,
            &self.chunks_finished,
            &self.conversion_issues,
            &self.imputed_cells,
            &self.throttle_wait_ns,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
        self.active_chunks.store(0, Ordering::Relaxed);
        self.peak_chunks.store(0, Ordering::Relaxed);
    }

    pub fn end_run(&self, elapsed: Duration) {
        self.elapsed_ns.store(nanos(elapsed), Ordering::Relaxed);
    }

    /// Record one finished chunk's row and data-quality counts.
    pub fn on_rows_encoded(&self, rows: usize, conversion_issues: usize, imputed_cells: usize) {
        self.rows_encoded.fetch_add(rows as u64, Ordering::Relaxed);
        self.conversion_issues
            .fetch_add(conversion_issues as u64, Ordering::Relaxed);
        self.imputed_cells.fetch_add(imputed_cells as u64, Ordering::Relaxed);
    }

    pub fn on_chunk_start(&self) {
        self.chunks_started.fetch_add(1, Ordering::Relaxed);
        let active = self.active_chunks.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak_chunks.fetch_max(active, Ordering::AcqRel);
    }

    pub fn on_chunk_end(&self) {
        self.chunks_finished.fetch_add(1, Ordering::Relaxed);
        self.active_chunks.fetch_sub(1, Ordering::AcqRel);
    }

    pub fn on_throttle_wait(&self, waited: Duration) {
        self.throttle_wait_ns.fetch_add(nanos(waited), Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ExecutionMetricsSnapshot {
        let elapsed_ns = self.elapsed_ns.load(Ordering::Relaxed);
        ExecutionMetricsSnapshot {
            run_id: self.runs.load(Ordering::Relaxed),
            elapsed: (elapsed_ns > 0).then(|| Duration::from_nanos(elapsed_ns)),
            rows_encoded: self.rows_encoded.load(Ordering::Relaxed),
            chunks_started: self.chunks_started.load(Ordering::Relaxed),
            chunks_finished: self.chunks_finished.load(Ordering::Relaxed),
            conversion_issues: self.conversion_issues.load(Ordering::Relaxed),
            imputed_cells: self.imputed_cells.load(Ordering::Relaxed),
            throttle_wait: Duration::from_nanos(self.throttle_wait_ns.load(Ordering::Relaxed)),
            max_active_chunks: self.peak_chunks.load(Ordering::Acquire),
        }
    }
}

fn nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Point-in-time copy of [`ExecutionMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionMetricsSnapshot {
    /// Number of runs started on this engine; the first run is 1.
    pub run_id: u64,
    /// `None` while the run is still in progress.
    pub elapsed: Option<Duration>,
    pub rows_encoded: u64,
    pub chunks_started: u64,
    pub chunks_finished: u64,
    pub conversion_issues: u64,
    pub imputed_cells: u64,
    pub throttle_wait: Duration,
    pub max_active_chunks: usize,
}

impl fmt::Display for ExecutionMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run #{} rows={} chunks={}/{} zero_substituted={} imputed={} peak_chunks={} throttled={:?}",
            self.run_id,
            self.rows_encoded,
            self.chunks_finished,
            self.chunks_started,
            self.conversion_issues,
            self.imputed_cells,
            self.max_active_chunks,
            self.throttle_wait,
        )?;
        if let Some(elapsed) = self.elapsed {
            write!(f, " elapsed={elapsed:?}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{ExecutionEvent, ExecutionMetrics};

    #[test]
    fn begin_run_resets_counters_but_not_run_id() {
        let m = ExecutionMetrics::new();
        m.begin_run();
        m.on_chunk_start();
        m.on_rows_encoded(10, 2, 1);
        m.on_chunk_end();
        m.end_run(Duration::from_millis(1));

        m.begin_run();
        let snap = m.snapshot();
        assert_eq!(snap.run_id, 2);
        assert_eq!(snap.rows_encoded, 0);
        assert_eq!(snap.max_active_chunks, 0);
        assert_eq!(snap.elapsed, None);
    }

    #[test]
    fn peak_tracks_concurrent_chunks() {
        let m = ExecutionMetrics::new();
        m.on_chunk_start();
        m.on_chunk_start();
        m.on_chunk_end();
        m.on_chunk_start();
        let snap = m.snapshot();
        assert_eq!(snap.max_active_chunks, 2);
        assert_eq!((snap.chunks_started, snap.chunks_finished), (3, 1));
    }

    #[test]
    fn events_render_as_one_line() {
        let e = ExecutionEvent::ConversionIssue {
            row: 7,
            column: "LotFrontage".into(),
            raw: "n/a".into(),
        };
        assert_eq!(e.to_string(), "zero-substituted row=7 column=LotFrontage raw=\"n/a\"");
        let e = ExecutionEvent::ChunkStarted {
            start_row: 8,
            row_count: 4,
        };
        assert_eq!(e.to_string(), "chunk rows=8..12");
    }
}
