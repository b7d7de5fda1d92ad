//! Schema inference over a bounded sample of the input.
//!
//! [`infer_schema`] reads the header row plus at most [`INFER_SAMPLE_ROWS`]
//! data rows and classifies each column as [`DataType::Int64`],
//! [`DataType::Float64`], or [`DataType::Utf8`]. Null tokens never influence
//! the decision; a column whose entire sample is null defaults to
//! [`DataType::Float64`].
//!
//! Inference is a pure read-ahead: it consumes from the stream, so callers
//! must reposition the input to the start before opening a
//! [`crate::reader::BatchReader`] on it.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};
use crate::reader::ReadOptions;
use crate::types::{DataType, Field, Schema};

/// Upper bound on sampled data rows.
pub const INFER_SAMPLE_ROWS: usize = 128;

/// Narrowest classification consistent with the values seen so far.
/// Only ever widens: Int -> Float -> Text.
enum ColumnClass {
    AllNull,
    Int,
    Float,
    Text,
}

impl ColumnClass {
    fn observe(&mut self, token: &str) {
        if matches!(self, ColumnClass::Text) {
            return;
        }
        if token.parse::<i64>().is_ok() {
            if matches!(self, ColumnClass::AllNull) {
                *self = ColumnClass::Int;
            }
        } else if token.parse::<f64>().is_ok() {
            *self = ColumnClass::Float;
        } else {
            *self = ColumnClass::Text;
        }
    }

    fn into_data_type(self) -> DataType {
        match self {
            ColumnClass::AllNull | ColumnClass::Float => DataType::Float64,
            ColumnClass::Int => DataType::Int64,
            ColumnClass::Text => DataType::Utf8,
        }
    }
}

/// Infer a schema from the header and a bounded row sample.
///
/// The first non-comment line is always treated as the header, regardless of
/// the header flag in `options` (there is nothing to name columns by
/// otherwise). Header names must be non-empty and unique after trimming.
///
/// Fails with [`PipelineError::EmptyInput`] if the input has no header or no
/// data rows to sample.
pub fn infer_schema<R: Read>(input: R, options: &ReadOptions) -> PipelineResult<Schema> {
    let mut rdr = options.clone().with_headers(true).csv_reader(input);

    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Err(PipelineError::EmptyInput {
            message: "no header row".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for name in headers.iter() {
        if name.is_empty() {
            return Err(PipelineError::SchemaMismatch {
                message: format!(
                    "empty column name in header {:?}",
                    headers.iter().collect::<Vec<_>>()
                ),
            });
        }
        if !seen.insert(name) {
            return Err(PipelineError::SchemaMismatch {
                message: format!("duplicate column name '{name}' in header"),
            });
        }
    }

    let mut classes: Vec<ColumnClass> = headers.iter().map(|_| ColumnClass::AllNull).collect();
    let mut record = csv::StringRecord::new();
    let mut sampled = 0usize;
    while sampled < INFER_SAMPLE_ROWS {
        if !rdr.read_record(&mut record)? {
            break;
        }
        sampled += 1;
        for (idx, class) in classes.iter_mut().enumerate() {
            let token = record.get(idx).unwrap_or("");
            if options.is_null_token(token) {
                continue;
            }
            class.observe(token);
        }
    }

    if sampled == 0 {
        return Err(PipelineError::EmptyInput {
            message: "no data rows to sample".to_string(),
        });
    }

    let fields = headers
        .iter()
        .zip(classes)
        .map(|(name, class)| Field::new(name, class.into_data_type()))
        .collect();
    Ok(Schema::new(fields))
}

/// Infer a schema from a file path.
pub fn infer_schema_from_path(
    path: impl AsRef<Path>,
    options: &ReadOptions,
) -> PipelineResult<Schema> {
    let file = File::open(path)?;
    infer_schema(file, options)
}
