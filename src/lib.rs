//! `csv-anomaly` is a small library for streaming a delimited text file into
//! typed columnar batches and flagging statistical outliers in one of its
//! numeric columns with null-aware population z-scores.
//!
//! The primary entrypoint is [`pipeline::detect_from_path`], which infers the
//! schema, streams the file in fixed-capacity batches, extracts the target
//! column, and runs detection in one call. Each stage is also usable on its
//! own.
//!
//! ## What the pipeline does
//!
//! - **Schema inference** ([`infer`]): classifies each column as
//!   [`types::DataType::Int64`], [`types::DataType::Float64`], or
//!   [`types::DataType::Utf8`] from a bounded sample, recognizing the null
//!   tokens `NULL`, `null`, the empty string, `N/A`, and `n/a`.
//! - **Chunked reading** ([`reader`]): streams the file as
//!   [`types::Batch`]es of at most 1024 rows (configurable), each column
//!   pairing a typed value buffer with a validity bitmap. Comment lines
//!   (default prefix `#`) are skipped; the delimiter defaults to `,`.
//! - **Column extraction** ([`extract`]): concatenates one column across all
//!   batches into a contiguous null-aware `f64` sequence, widening narrower
//!   numeric types.
//! - **Detection** ([`detect`]): two-pass population mean/stddev over the
//!   non-null values, then flags rows whose `abs(value - mean) / stddev`
//!   strictly exceeds the threshold. Null rows are never flagged.
//!
//! ## Quick example: end-to-end over a file
//!
//! ```no_run
//! use csv_anomaly::pipeline::{detect_from_path, PipelineOptions};
//!
//! # fn main() -> Result<(), csv_anomaly::PipelineError> {
//! let opts = PipelineOptions {
//!     column: Some("temperature".to_string()),
//!     threshold: 3.0,
//!     ..Default::default()
//! };
//! let report = detect_from_path("readings.csv", &opts)?;
//! println!("{} anomalies in {} rows", report.result.anomalies.len(), report.rows);
//! # Ok(())
//! # }
//! ```
//!
//! ## Quick example: stage by stage over an in-memory input
//!
//! ```rust
//! use csv_anomaly::detect::detect;
//! use csv_anomaly::extract::extract_column;
//! use csv_anomaly::infer::infer_schema;
//! use csv_anomaly::reader::{BatchReader, ReadOptions};
//!
//! # fn main() -> Result<(), csv_anomaly::PipelineError> {
//! let data = "reading\n1.0\n2.0\nNULL\n3.0\n100.0\n2.0\n";
//! let opts = ReadOptions::default();
//!
//! // Inference consumes from the stream; hand the reader a fresh one.
//! let schema = infer_schema(data.as_bytes(), &opts)?;
//! let mut reader = BatchReader::new(data.as_bytes(), schema, opts);
//!
//! let column = extract_column(&mut reader, "reading")?;
//! let result = detect(&column, 1.9)?;
//! assert_eq!(result.anomalies, vec![100.0]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`infer`]: schema inference from a bounded read-ahead sample
//! - [`reader`]: chunked batch reading with null tracking and cancellation
//! - [`extract`]: single-column extraction (sequential or pipelined)
//! - [`detect`]: population z-score outlier detection
//! - [`pipeline`]: end-to-end entrypoint with observer reporting
//! - [`observability`]: observer trait and stock implementations
//! - [`types`]: schema + columnar batch types
//! - [`error`]: error types used across the pipeline

pub mod detect;
pub mod error;
pub mod extract;
pub mod infer;
pub mod observability;
pub mod pipeline;
pub mod reader;
pub mod types;

pub use error::{PipelineError, PipelineResult};
