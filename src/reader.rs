//! Chunked CSV reading into columnar [`Batch`]es.
//!
//! [`BatchReader`] wraps a [`csv::Reader`] and materializes the input as a
//! sequence of fixed-capacity batches, parsing each field against the schema
//! and tracking nulls in a validity bitmap. The final batch of a file may be
//! shorter; end of input is the `Ok(None)` sentinel, not an error.
//!
//! Each call to [`BatchReader::next_batch`] reuses the reader's internal
//! buffers, so the returned batch borrow ends at the next call. Consumers
//! that need a batch longer clone it.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{PipelineError, PipelineResult};
use crate::types::{Batch, Schema};

/// Default rows per batch.
pub const DEFAULT_BATCH_CAPACITY: usize = 1024;

/// Tokens recognized as null out of the box (case-sensitive).
pub const DEFAULT_NULL_TOKENS: [&str; 5] = ["NULL", "null", "", "N/A", "n/a"];

/// Cooperative cancellation flag for the read loop.
///
/// Cloning shares the flag; once [`cancel`](CancelToken::cancel) is called,
/// the next [`BatchReader::next_batch`] returns [`PipelineError::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a new, un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Options controlling schema inference and batch reading.
///
/// Use [`Default`] for common cases and the `with_*` methods to adjust. The
/// null-token set starts at [`DEFAULT_NULL_TOKENS`] and can only grow.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    delimiter: u8,
    comment: Option<u8>,
    has_headers: bool,
    batch_capacity: usize,
    null_tokens: Vec<String>,
    cancel: Option<CancelToken>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            comment: Some(b'#'),
            has_headers: true,
            batch_capacity: DEFAULT_BATCH_CAPACITY,
            null_tokens: DEFAULT_NULL_TOKENS.iter().map(|s| s.to_string()).collect(),
            cancel: None,
        }
    }
}

impl ReadOptions {
    /// Set the field delimiter (default `,`).
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the comment-line prefix, or `None` to disable comment skipping
    /// (default `#`).
    pub fn with_comment(mut self, comment: Option<u8>) -> Self {
        self.comment = comment;
        self
    }

    /// Set whether the first non-comment line is a header row (default true).
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Set the batch row capacity (default 1024).
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_batch_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "batch_capacity must be > 0");
        self.batch_capacity = capacity;
        self
    }

    /// Add a token to the null vocabulary. The default tokens always stay.
    pub fn with_null_token(mut self, token: impl Into<String>) -> Self {
        self.null_tokens.push(token.into());
        self
    }

    /// Attach a cancellation token checked by the read loop.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// The configured delimiter.
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// The configured comment prefix, if any.
    pub fn comment(&self) -> Option<u8> {
        self.comment
    }

    /// Whether a header row is expected.
    pub fn has_headers(&self) -> bool {
        self.has_headers
    }

    /// The configured batch row capacity.
    pub fn batch_capacity(&self) -> usize {
        self.batch_capacity
    }

    /// The current null vocabulary.
    pub fn null_tokens(&self) -> &[String] {
        &self.null_tokens
    }

    /// Whether a trimmed field is a null token.
    pub fn is_null_token(&self, field: &str) -> bool {
        self.null_tokens.iter().any(|t| t == field)
    }

    pub(crate) fn cancel_token(&self) -> Option<&CancelToken> {
        self.cancel.as_ref()
    }

    /// Build a [`csv::Reader`] over `input` with these options applied.
    pub(crate) fn csv_reader<R: Read>(&self, input: R) -> csv::Reader<R> {
        csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .comment(self.comment)
            .has_headers(self.has_headers)
            .trim(csv::Trim::All)
            .from_reader(input)
    }
}

/// Streams a delimited input as columnar [`Batch`]es against a fixed schema.
///
/// The reader owns its batch buffers and reuses them across calls; see
/// [`next_batch`](Self::next_batch). Dropping the reader releases the input
/// and all buffers.
pub struct BatchReader<R: Read> {
    rdr: csv::Reader<R>,
    schema: Schema,
    options: ReadOptions,
    batch: Batch,
    record: csv::StringRecord,
    rows_seen: u64,
    done: bool,
}

impl BatchReader<File> {
    /// Open a file for batch reading.
    pub fn from_path(
        path: impl AsRef<Path>,
        schema: Schema,
        options: ReadOptions,
    ) -> PipelineResult<Self> {
        let file = File::open(path)?;
        Ok(Self::new(file, schema, options))
    }
}

impl<R: Read> BatchReader<R> {
    /// Create a reader over `input` with the given schema and options.
    pub fn new(input: R, schema: Schema, options: ReadOptions) -> Self {
        let rdr = options.csv_reader(input);
        let batch = Batch::new_for_schema(&schema, options.batch_capacity());
        Self {
            rdr,
            schema,
            options,
            batch,
            record: csv::StringRecord::new(),
            rows_seen: 0,
            done: false,
        }
    }

    /// The schema this reader parses against.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The options this reader was opened with.
    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// Read the next batch.
    ///
    /// Returns `Ok(Some(batch))` with at most `batch_capacity` rows,
    /// `Ok(None)` once the input is exhausted (repeatably), or an error. A
    /// parse failure in a non-null field of a numeric column is
    /// [`PipelineError::MalformedRow`]; the reader never substitutes null for
    /// an unparseable token.
    ///
    /// The returned batch borrows the reader's internal buffers and is only
    /// valid until the next call; clone it to retain it.
    pub fn next_batch(&mut self) -> PipelineResult<Option<&Batch>> {
        self.check_cancelled()?;
        if self.done {
            return Ok(None);
        }

        self.batch.clear();
        while self.batch.row_count() < self.options.batch_capacity() {
            self.check_cancelled()?;
            if !self.rdr.read_record(&mut self.record)? {
                self.done = true;
                break;
            }
            self.rows_seen += 1;
            self.append_record()?;
        }

        if self.batch.row_count() == 0 {
            return Ok(None);
        }
        Ok(Some(&self.batch))
    }

    fn check_cancelled(&self) -> PipelineResult<()> {
        match self.options.cancel_token() {
            Some(tok) if tok.is_cancelled() => Err(PipelineError::Cancelled),
            _ => Ok(()),
        }
    }

    fn append_record(&mut self) -> PipelineResult<()> {
        if self.record.len() < self.schema.len() {
            return Err(PipelineError::SchemaMismatch {
                message: format!(
                    "row {} has {} fields, schema expects {}",
                    self.row_number(),
                    self.record.len(),
                    self.schema.len()
                ),
            });
        }

        for idx in 0..self.schema.len() {
            // Trim::All already stripped surrounding whitespace.
            let raw = self.record.get(idx).unwrap_or("");
            if self.options.is_null_token(raw) {
                self.batch.column_mut(idx).push_null();
                continue;
            }
            if let Err(message) = self.batch.column_mut(idx).push_parsed(raw) {
                return Err(PipelineError::MalformedRow {
                    row: self.row_number(),
                    column: self.schema.fields[idx].name.clone(),
                    raw: raw.to_owned(),
                    message,
                });
            }
        }
        self.batch.commit_row();
        Ok(())
    }

    /// 1-based input line of the record just read. Comment lines and the
    /// header shift it, which is why the csv position is preferred over a
    /// plain data-row counter.
    fn row_number(&self) -> u64 {
        self.record
            .position()
            .map(|p| p.line())
            .unwrap_or(self.rows_seen)
    }
}
