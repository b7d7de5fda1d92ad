//! Null-aware z-score outlier detection.
//!
//! [`detect`] computes population statistics (divisor N, not N-1) over the
//! non-null values of an [`ExtractedColumn`] in two passes, scores every
//! non-null row as `abs(value - mean) / stddev`, and flags rows whose score
//! is strictly greater than the threshold. Null rows are excluded from the
//! statistics, never flagged, and carry no score.

use serde::Serialize;

use crate::error::{PipelineError, PipelineResult};
use crate::extract::ExtractedColumn;

/// Population statistics over the non-null values of a column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnStats {
    /// Population mean.
    pub mean: f64,
    /// Population standard deviation (divisor N).
    pub stddev: f64,
    /// Number of non-null values.
    pub non_null: usize,
}

/// Outcome of a detection run.
///
/// `mask`, `scores`, and the input column all have the same length and row
/// order. `anomalies` holds the original (not standardized) values at masked
/// positions, in row order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionResult {
    /// Per-row flag; null rows are always `false`.
    pub mask: Vec<bool>,
    /// Original values at flagged positions.
    pub anomalies: Vec<f64>,
    /// Per-row z-score; `None` at null rows.
    pub scores: Vec<Option<f64>>,
    /// The statistics the scores were derived from.
    pub stats: ColumnStats,
}

/// Compute population mean and standard deviation over a column's non-null
/// values, in two exact passes.
///
/// Fails with [`PipelineError::EmptyInput`] for a zero-row column and
/// [`PipelineError::NoValidData`] when every row is null.
pub fn population_stats(column: &ExtractedColumn) -> PipelineResult<ColumnStats> {
    if column.is_empty() {
        return Err(PipelineError::EmptyInput {
            message: format!("column '{}' has no rows", column.name()),
        });
    }
    let non_null = column.non_null_count();
    if non_null == 0 {
        return Err(PipelineError::NoValidData {
            column: column.name().to_owned(),
        });
    }

    let sum: f64 = column.iter().flatten().sum();
    let mean = sum / non_null as f64;

    let sq_sum: f64 = column
        .iter()
        .flatten()
        .map(|v| (v - mean) * (v - mean))
        .sum();
    let variance = sq_sum / non_null as f64;

    Ok(ColumnStats {
        mean,
        stddev: variance.sqrt(),
        non_null,
    })
}

/// Flag rows whose z-score strictly exceeds `threshold`.
///
/// The boundary is exclusive: a row scoring exactly `threshold` is not
/// flagged. Callers should reject non-positive thresholds; if one slips
/// through, every non-null row is flagged. The degenerate all-identical
/// column (`stddev == 0`) yields zero anomalies regardless of threshold and
/// is not an error.
///
/// The input column is not mutated; running twice with the same threshold
/// yields identical results.
pub fn detect(column: &ExtractedColumn, threshold: f64) -> PipelineResult<DetectionResult> {
    let stats = population_stats(column)?;

    let len = column.len();
    let mut mask = Vec::with_capacity(len);
    let mut scores = Vec::with_capacity(len);
    let mut anomalies = Vec::new();

    for value in column.iter() {
        let Some(v) = value else {
            mask.push(false);
            scores.push(None);
            continue;
        };
        if stats.stddev == 0.0 {
            // All non-null values equal the mean.
            mask.push(false);
            scores.push(Some(0.0));
            continue;
        }
        let score = (v - stats.mean).abs() / stats.stddev;
        let flagged = threshold <= 0.0 || score > threshold;
        if flagged {
            anomalies.push(v);
        }
        mask.push(flagged);
        scores.push(Some(score));
    }

    Ok(DetectionResult {
        mask,
        anomalies,
        scores,
        stats,
    })
}
