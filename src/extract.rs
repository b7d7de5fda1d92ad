//! Single-column extraction from a batch stream.
//!
//! [`extract_column`] drains a [`BatchReader`] and concatenates the target
//! column's values and validity bits, batch by batch, into one contiguous
//! null-aware `f64` sequence. Memory stays proportional to total row count;
//! no batch outlives one iteration of the read loop.
//!
//! [`extract_column_pipelined`] does the same work with the read side on its
//! own thread behind a bounded handoff queue, overlapping "read next batch"
//! with "append previous batch". Batch order is preserved by the queue.

use std::io::Read;
use std::sync::mpsc;
use std::thread;

use crate::error::{PipelineError, PipelineResult};
use crate::reader::BatchReader;
use crate::types::{Batch, ValidityBitmap};

/// Bounded depth of the reader -> appender handoff queue.
const PIPELINE_QUEUE_DEPTH: usize = 2;

/// A contiguous null-aware `f64` column assembled from a batch stream.
///
/// Row order follows batch order. Null rows hold a placeholder in the value
/// buffer; the validity bitmap is the source of truth.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedColumn {
    name: String,
    values: Vec<f64>,
    validity: ValidityBitmap,
}

impl ExtractedColumn {
    /// Build a column directly from optional values (`None` = null).
    ///
    /// Mostly useful for feeding [`crate::detect::detect`] with data that did
    /// not come from a CSV stream.
    pub fn from_values(
        name: impl Into<String>,
        values: impl IntoIterator<Item = Option<f64>>,
    ) -> Self {
        let mut out = Self::empty(name);
        for v in values {
            out.push(v);
        }
        out
    }

    fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
            validity: ValidityBitmap::new(),
        }
    }

    fn push(&mut self, value: Option<f64>) {
        match value {
            Some(v) => {
                self.values.push(v);
                self.validity.push(true);
            }
            None => {
                self.values.push(0.0);
                self.validity.push(false);
            }
        }
    }

    /// The extracted column's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total row count, nulls included.
    pub fn len(&self) -> usize {
        self.validity.len()
    }

    /// Whether the column holds zero rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the row at `idx` is null.
    pub fn is_null(&self, idx: usize) -> bool {
        !self.validity.get(idx)
    }

    /// The value at `idx`, or `None` for a null row.
    pub fn value(&self, idx: usize) -> Option<f64> {
        if self.validity.get(idx) {
            Some(self.values[idx])
        } else {
            None
        }
    }

    /// Number of non-null rows.
    pub fn non_null_count(&self) -> usize {
        self.validity.count_set()
    }

    /// The validity bitmap.
    pub fn validity(&self) -> &ValidityBitmap {
        &self.validity
    }

    /// Iterate rows in order as `Option<f64>`.
    pub fn iter(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        (0..self.len()).map(move |i| self.value(i))
    }
}

/// Drain `reader` and extract `column` as a contiguous `f64` sequence.
///
/// The column name is resolved to a schema index once
/// ([`PipelineError::ColumnNotFound`] if absent) and its type must be numeric
/// ([`PipelineError::TypeMismatch`] for text columns). Narrower numeric types
/// are widened to `f64` during the append. A reader that yields zero batches
/// is [`PipelineError::EmptyInput`].
pub fn extract_column<R: Read>(
    reader: &mut BatchReader<R>,
    column: &str,
) -> PipelineResult<ExtractedColumn> {
    let idx = resolve_numeric(reader, column)?;

    let mut out = ExtractedColumn::empty(column);
    let mut batches = 0usize;
    while let Some(batch) = reader.next_batch()? {
        batches += 1;
        append_batch(&mut out, batch, idx, column)?;
    }
    if batches == 0 {
        return Err(PipelineError::EmptyInput {
            message: format!("no data rows for column '{column}'"),
        });
    }
    Ok(out)
}

/// Like [`extract_column`], but reads batches on a dedicated thread behind a
/// bounded queue of depth 2.
///
/// Each batch is cloned before crossing the queue (the explicit retain step;
/// the reader's own buffers are reused for the next read). Row order is that
/// of the input: single producer, single consumer, FIFO queue. Read errors
/// and cancellation travel through the queue and surface on the caller's
/// side.
pub fn extract_column_pipelined<R: Read + Send>(
    reader: &mut BatchReader<R>,
    column: &str,
) -> PipelineResult<ExtractedColumn> {
    let idx = resolve_numeric(reader, column)?;

    let mut out = ExtractedColumn::empty(column);
    let mut batches = 0usize;
    thread::scope(|scope| -> PipelineResult<()> {
        let (tx, rx) = mpsc::sync_channel::<PipelineResult<Batch>>(PIPELINE_QUEUE_DEPTH);
        scope.spawn(move || {
            loop {
                match reader.next_batch() {
                    // A send failure means the consumer bailed; stop reading.
                    Ok(Some(batch)) => {
                        if tx.send(Ok(batch.clone())).is_err() {
                            return;
                        }
                    }
                    Ok(None) => return,
                    Err(e) => {
                        let _ = tx.send(Err(e));
                        return;
                    }
                }
            }
        });

        for msg in rx {
            let batch = msg?;
            batches += 1;
            append_batch(&mut out, &batch, idx, column)?;
        }
        Ok(())
    })?;

    if batches == 0 {
        return Err(PipelineError::EmptyInput {
            message: format!("no data rows for column '{column}'"),
        });
    }
    Ok(out)
}

fn resolve_numeric<R: Read>(reader: &BatchReader<R>, column: &str) -> PipelineResult<usize> {
    let schema = reader.schema();
    let idx = schema
        .index_of(column)
        .ok_or_else(|| PipelineError::ColumnNotFound {
            column: column.to_owned(),
        })?;
    let field = &schema.fields[idx];
    if !field.data_type.is_numeric() {
        return Err(PipelineError::TypeMismatch {
            column: column.to_owned(),
            data_type: field.data_type.clone(),
        });
    }
    Ok(idx)
}

fn append_batch(
    out: &mut ExtractedColumn,
    batch: &Batch,
    idx: usize,
    column: &str,
) -> PipelineResult<()> {
    // Schema/batch width mismatch would mean the reader broke its own
    // invariant; treat it as fatal rather than guessing.
    let col = batch
        .column(idx)
        .ok_or_else(|| PipelineError::ColumnNotFound {
            column: column.to_owned(),
        })?;
    for row in 0..batch.row_count() {
        out.push(col.value_f64(row));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::ExtractedColumn;

    #[test]
    fn from_values_tracks_nulls() {
        let col = ExtractedColumn::from_values("x", vec![Some(1.0), None, Some(3.0)]);
        assert_eq!(col.len(), 3);
        assert_eq!(col.non_null_count(), 2);
        assert_eq!(col.value(0), Some(1.0));
        assert_eq!(col.value(1), None);
        assert!(col.is_null(1));
        assert_eq!(col.iter().collect::<Vec<_>>(), vec![Some(1.0), None, Some(3.0)]);
    }
}
