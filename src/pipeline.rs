//! End-to-end detection over a CSV file.
//!
//! [`detect_from_path`] wires the whole pipeline together: infer a schema
//! from a read-ahead pass, rewind, stream the file as batches, extract the
//! target column, and run z-score detection. If an
//! [`crate::observability::PipelineObserver`] is provided, success/failure/
//! alerts are reported to it.

use std::fmt;
use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::detect::{DetectionResult, detect};
use crate::error::{PipelineError, PipelineResult};
use crate::extract::{extract_column, extract_column_pipelined};
use crate::infer::infer_schema;
use crate::observability::{PipelineContext, PipelineObserver, PipelineStats, Severity};
use crate::reader::{BatchReader, ReadOptions};

/// Default z-score threshold.
pub const DEFAULT_THRESHOLD: f64 = 3.0;

/// Options controlling an end-to-end detection run.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct PipelineOptions {
    /// Column to analyze. If `None`, the first numeric column is used.
    pub column: Option<String>,
    /// Z-score threshold (default 3.0). Callers should keep it positive; a
    /// non-positive threshold makes the detector flag every non-null value.
    pub threshold: f64,
    /// Reader configuration (delimiter, comment prefix, batch capacity, ...).
    pub read: ReadOptions,
    /// Overlap batch reading with column appending via a bounded queue.
    pub pipelined: bool,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn PipelineObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: Severity,
}

impl fmt::Debug for PipelineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineOptions")
            .field("column", &self.column)
            .field("threshold", &self.threshold)
            .field("read", &self.read)
            .field("pipelined", &self.pipelined)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            column: None,
            threshold: DEFAULT_THRESHOLD,
            read: ReadOptions::default(),
            pipelined: false,
            observer: None,
            alert_at_or_above: Severity::Critical,
        }
    }
}

/// Outcome of [`detect_from_path`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// The column that was analyzed (named or auto-selected).
    pub column: String,
    /// Total rows in the extracted column, nulls included.
    pub rows: usize,
    /// The detection outcome.
    pub result: DetectionResult,
}

/// Run the full pipeline over a CSV file.
///
/// Steps, in order:
///
/// 1. Open the file and infer a [`crate::types::Schema`] from a bounded
///    read-ahead sample, then rewind to the start (inference consumes from
///    the stream).
/// 2. Resolve the target column: `options.column`, or the schema's first
///    numeric column when absent ([`PipelineError::SchemaMismatch`] if the
///    schema has none).
/// 3. Stream the file as batches, extract the column, and detect outliers
///    against `options.threshold`.
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with row/anomaly counts
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ```no_run
/// use csv_anomaly::pipeline::{detect_from_path, PipelineOptions};
///
/// # fn main() -> Result<(), csv_anomaly::PipelineError> {
/// let report = detect_from_path("readings.csv", &PipelineOptions::default())?;
/// println!(
///     "{}: {} of {} rows anomalous",
///     report.column,
///     report.result.anomalies.len(),
///     report.rows
/// );
/// # Ok(())
/// # }
/// ```
pub fn detect_from_path(
    path: impl AsRef<Path>,
    options: &PipelineOptions,
) -> PipelineResult<Report> {
    let path = path.as_ref();
    let mut ctx = PipelineContext {
        path: path.to_path_buf(),
        column: options.column.clone(),
    };

    let result = run(path, options, &mut ctx);

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok(report) => obs.on_success(
                &ctx,
                PipelineStats {
                    rows: report.rows,
                    anomalies: report.result.anomalies.len(),
                },
            ),
            Err(e) => {
                let sev = severity_for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result
}

fn run(
    path: &Path,
    options: &PipelineOptions,
    ctx: &mut PipelineContext,
) -> PipelineResult<Report> {
    let mut file = File::open(path)?;
    let schema = infer_schema(&mut file, &options.read)?;
    // Inference consumed from the stream; the reader needs the whole file.
    file.seek(SeekFrom::Start(0))?;

    let column = match &options.column {
        Some(name) => name.clone(),
        None => schema
            .first_numeric()
            .map(|f| f.name.clone())
            .ok_or_else(|| PipelineError::SchemaMismatch {
                message: format!(
                    "no numeric column to auto-select. columns={:?}",
                    schema.field_names().collect::<Vec<_>>()
                ),
            })?,
    };
    ctx.column = Some(column.clone());

    let mut reader = BatchReader::new(file, schema, options.read.clone());
    let extracted = if options.pipelined {
        extract_column_pipelined(&mut reader, &column)?
    } else {
        extract_column(&mut reader, &column)?
    };
    let result = detect(&extracted, options.threshold)?;

    Ok(Report {
        column,
        rows: extracted.len(),
        result,
    })
}

fn severity_for_error(e: &PipelineError) -> Severity {
    match e {
        PipelineError::Io(_) => Severity::Critical,
        PipelineError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => Severity::Critical,
            _ => Severity::Error,
        },
        PipelineError::Cancelled => Severity::Warning,
        _ => Severity::Error,
    }
}
