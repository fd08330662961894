//! Ingestion outcome reporting.
//!
//! [`super::ingest`] reports exactly one outcome per call to the configured
//! [`IngestionObserver`]: a success with table statistics, or a failure with a severity
//! (plus an alert when the severity reaches the configured threshold).

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::IngestionError;

/// How bad an ingestion failure is. Ordered, so it can be used as an alert threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    /// The input itself is malformed (no header, ragged row, bad quoting).
    Error,
    /// The source could not be read at all.
    Critical,
}

impl IngestionSeverity {
    /// Severity assigned to an ingestion failure.
    ///
    /// I/O failures (including I/O surfaced through the CSV reader) are `Critical`;
    /// malformed input is `Error`.
    pub fn for_error(e: &IngestionError) -> Self {
        match e {
            IngestionError::Io(_) => Self::Critical,
            IngestionError::Csv(err) if matches!(err.kind(), csv::ErrorKind::Io(_)) => Self::Critical,
            IngestionError::Csv(_) | IngestionError::EmptyInput | IngestionError::RowLengthMismatch { .. } => {
                Self::Error
            }
        }
    }
}

/// Which source an outcome refers to.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    /// Output of [`super::TableSource::describe`].
    pub source: String,
}

/// Shape of a successfully indexed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    pub rows: usize,
    pub columns: usize,
    /// Sum of per-column cardinalities.
    pub distinct_values: usize,
}

/// Receives ingestion outcomes. All methods default to doing nothing.
pub trait IngestionObserver: Send + Sync {
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &IngestionError) {}

    /// Called after [`Self::on_failure`] when the severity reaches the alert threshold.
    ///
    /// Forwards to `on_failure` unless overridden.
    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Several observers behind one handle; each receives every callback in order.
impl IngestionObserver for Vec<Arc<dyn IngestionObserver>> {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.iter().for_each(|o| o.on_success(ctx, stats));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.iter().for_each(|o| o.on_failure(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.iter().for_each(|o| o.on_alert(ctx, severity, error));
    }
}

/// One reportable outcome, rendered as a single log line.
enum Outcome<'a> {
    Indexed(IngestionStats),
    Failed(IngestionSeverity, &'a IngestionError),
    Alert(IngestionSeverity, &'a IngestionError),
}

struct Line<'a> {
    ctx: &'a IngestionContext,
    outcome: Outcome<'a>,
}

impl fmt::Display for Line<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = &self.ctx.source;
        match &self.outcome {
            Outcome::Indexed(s) => write!(
                f,
                "ok source={source} rows={} cols={} distinct={}",
                s.rows, s.columns, s.distinct_values
            ),
            Outcome::Failed(sev, e) => write!(f, "fail severity={sev:?} source={source} err={e}"),
            Outcome::Alert(sev, e) => write!(f, "ALERT severity={sev:?} source={source} err={e}"),
        }
    }
}

/// Writes one line per outcome to stderr, prefixed with `[ingest]`.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl StdErrObserver {
    fn log(&self, ctx: &IngestionContext, outcome: Outcome<'_>) {
        eprintln!("[ingest] {}", Line { ctx, outcome });
    }
}

impl IngestionObserver for StdErrObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.log(ctx, Outcome::Indexed(stats));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.log(ctx, Outcome::Failed(severity, error));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.log(ctx, Outcome::Alert(severity, error));
    }
}

/// Appends timestamped outcome lines to a log file.
///
/// The file is opened on the first outcome. Logging never fails ingestion: if the file
/// cannot be opened or written, the line is dropped.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl FileObserver {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            file: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn log(&self, ctx: &IngestionContext, outcome: Outcome<'_>) {
        let Ok(mut slot) = self.file.lock() else {
            return;
        };
        if slot.is_none() {
            *slot = OpenOptions::new().create(true).append(true).open(&self.path).ok();
        }
        if let Some(file) = slot.as_mut() {
            let secs = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default();
            let _ = writeln!(file, "{secs} {}", Line { ctx, outcome });
        }
    }
}

impl IngestionObserver for FileObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.log(ctx, Outcome::Indexed(stats));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.log(ctx, Outcome::Failed(severity, error));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.log(ctx, Outcome::Alert(severity, error));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};
    use crate::error::IngestionError;

    #[test]
    fn io_errors_are_critical_and_structural_errors_are_not() {
        let io = IngestionError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(IngestionSeverity::for_error(&io), IngestionSeverity::Critical);

        let ragged = IngestionError::RowLengthMismatch {
            row: 5,
            expected: 3,
            actual: 2,
        };
        assert_eq!(IngestionSeverity::for_error(&ragged), IngestionSeverity::Error);
        assert_eq!(IngestionSeverity::for_error(&IngestionError::EmptyInput), IngestionSeverity::Error);
        assert!(IngestionSeverity::Error < IngestionSeverity::Critical);
    }

    #[derive(Default)]
    struct Count(Mutex<usize>);

    impl IngestionObserver for Count {
        fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {
            *self.0.lock().unwrap() += 1;
        }
    }

    #[test]
    fn vec_of_observers_fans_out() {
        let a = Arc::new(Count::default());
        let b = Arc::new(Count::default());
        let all: Vec<Arc<dyn IngestionObserver>> = vec![a.clone(), b.clone()];
        let ctx = IngestionContext { source: "x".into() };
        all.on_success(
            &ctx,
            IngestionStats {
                rows: 1,
                columns: 1,
                distinct_values: 1,
            },
        );
        assert_eq!(*a.0.lock().unwrap(), 1);
        assert_eq!(*b.0.lock().unwrap(), 1);
    }
}
