//! Core data model types: schemas and columnar record batches.
//!
//! Reading happens against a [`Schema`] (a list of typed [`Field`]s), either
//! inferred from the input ([`crate::infer`]) or supplied by the caller. The
//! reader materializes rows as [`Batch`]es: fixed-capacity groups of columns,
//! each pairing a typed value buffer with a [`ValidityBitmap`] so nulls are
//! tracked out-of-band instead of as sentinel values.

/// Logical data type for a schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit floating point number.
    Float32,
    /// 64-bit floating point number.
    Float64,
    /// UTF-8 string.
    Utf8,
}

impl DataType {
    /// Whether values of this type can be widened to `f64` for detection.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, DataType::Utf8)
    }
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// An ordered list of fields describing the columns of the input.
///
/// Immutable once built: inference produces it, the reader only consults it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Returns the first numeric field, if any.
    ///
    /// Used by callers that ask for "the first numeric column" instead of a
    /// column by name.
    pub fn first_numeric(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.data_type.is_numeric())
    }
}

/// Packed per-row presence flags: one bit per row, set = value present.
///
/// Kept separate from the value buffer so a null row never needs a sentinel
/// value; the buffer holds a type default at null positions and the bit is
/// the only source of truth.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidityBitmap {
    words: Vec<u64>,
    len: usize,
}

impl ValidityBitmap {
    /// Create an empty bitmap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty bitmap with room for `rows` bits.
    pub fn with_capacity(rows: usize) -> Self {
        Self {
            words: Vec::with_capacity(rows.div_ceil(64)),
            len: 0,
        }
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the bitmap holds zero bits.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append one bit.
    pub fn push(&mut self, set: bool) {
        let word = self.len / 64;
        if word == self.words.len() {
            self.words.push(0);
        }
        if set {
            self.words[word] |= 1u64 << (self.len % 64);
        }
        self.len += 1;
    }

    /// Read the bit at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= len()`.
    pub fn get(&self, idx: usize) -> bool {
        assert!(
            idx < self.len,
            "bit index {idx} out of range (len {})",
            self.len
        );
        self.words[idx / 64] & (1u64 << (idx % 64)) != 0
    }

    /// Number of set bits.
    pub fn count_set(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterate all bits in order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }

    /// Remove all bits, keeping allocated capacity.
    pub fn clear(&mut self) {
        self.words.clear();
        self.len = 0;
    }
}

/// Typed value storage for one column of a [`Batch`].
///
/// Null positions hold the type default; [`ValidityBitmap`] decides presence.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    /// 32-bit integers.
    Int32(Vec<i32>),
    /// 64-bit integers.
    Int64(Vec<i64>),
    /// 32-bit floats.
    Float32(Vec<f32>),
    /// 64-bit floats.
    Float64(Vec<f64>),
    /// Strings.
    Utf8(Vec<String>),
}

impl ColumnValues {
    /// Create an empty buffer of the right variant for `data_type`.
    pub fn new_for(data_type: &DataType, capacity: usize) -> Self {
        match data_type {
            DataType::Int32 => ColumnValues::Int32(Vec::with_capacity(capacity)),
            DataType::Int64 => ColumnValues::Int64(Vec::with_capacity(capacity)),
            DataType::Float32 => ColumnValues::Float32(Vec::with_capacity(capacity)),
            DataType::Float64 => ColumnValues::Float64(Vec::with_capacity(capacity)),
            DataType::Utf8 => ColumnValues::Utf8(Vec::with_capacity(capacity)),
        }
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Int32(v) => v.len(),
            ColumnValues::Int64(v) => v.len(),
            ColumnValues::Float32(v) => v.len(),
            ColumnValues::Float64(v) => v.len(),
            ColumnValues::Utf8(v) => v.len(),
        }
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the value at `idx` widened to `f64`, or `None` for string buffers.
    pub fn get_f64(&self, idx: usize) -> Option<f64> {
        match self {
            ColumnValues::Int32(v) => Some(f64::from(v[idx])),
            ColumnValues::Int64(v) => Some(v[idx] as f64),
            ColumnValues::Float32(v) => Some(f64::from(v[idx])),
            ColumnValues::Float64(v) => Some(v[idx]),
            ColumnValues::Utf8(_) => None,
        }
    }

    /// Parse `raw` (already trimmed, known non-null) and append it.
    ///
    /// Returns a parse-failure message on error; the caller attaches row and
    /// column context.
    pub fn push_parsed(&mut self, raw: &str) -> Result<(), String> {
        match self {
            ColumnValues::Int32(v) => {
                v.push(raw.parse::<i32>().map_err(|e| e.to_string())?);
            }
            ColumnValues::Int64(v) => {
                v.push(raw.parse::<i64>().map_err(|e| e.to_string())?);
            }
            ColumnValues::Float32(v) => {
                v.push(raw.parse::<f32>().map_err(|e| e.to_string())?);
            }
            ColumnValues::Float64(v) => {
                v.push(raw.parse::<f64>().map_err(|e| e.to_string())?);
            }
            ColumnValues::Utf8(v) => v.push(raw.to_owned()),
        }
        Ok(())
    }

    /// Append the type default as a placeholder for a null slot.
    pub fn push_default(&mut self) {
        match self {
            ColumnValues::Int32(v) => v.push(0),
            ColumnValues::Int64(v) => v.push(0),
            ColumnValues::Float32(v) => v.push(0.0),
            ColumnValues::Float64(v) => v.push(0.0),
            ColumnValues::Utf8(v) => v.push(String::new()),
        }
    }

    /// Remove all values, keeping allocated capacity.
    pub fn clear(&mut self) {
        match self {
            ColumnValues::Int32(v) => v.clear(),
            ColumnValues::Int64(v) => v.clear(),
            ColumnValues::Float32(v) => v.clear(),
            ColumnValues::Float64(v) => v.clear(),
            ColumnValues::Utf8(v) => v.clear(),
        }
    }
}

/// One column of a [`Batch`]: a typed value buffer plus validity bits.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    data_type: DataType,
    values: ColumnValues,
    validity: ValidityBitmap,
}

impl Column {
    pub(crate) fn new(data_type: DataType, capacity: usize) -> Self {
        let values = ColumnValues::new_for(&data_type, capacity);
        Self {
            data_type,
            values,
            validity: ValidityBitmap::with_capacity(capacity),
        }
    }

    /// The column's declared type.
    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    /// The typed value buffer.
    pub fn values(&self) -> &ColumnValues {
        &self.values
    }

    /// The validity bitmap.
    pub fn validity(&self) -> &ValidityBitmap {
        &self.validity
    }

    /// Number of rows in the column.
    pub fn len(&self) -> usize {
        self.validity.len()
    }

    /// Whether the column holds zero rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the value at `row` is null.
    pub fn is_null(&self, row: usize) -> bool {
        !self.validity.get(row)
    }

    /// The value at `row` widened to `f64`.
    ///
    /// Returns `None` for null rows and for string columns.
    pub fn value_f64(&self, row: usize) -> Option<f64> {
        if self.is_null(row) {
            return None;
        }
        self.values.get_f64(row)
    }

    pub(crate) fn push_null(&mut self) {
        self.values.push_default();
        self.validity.push(false);
    }

    pub(crate) fn push_parsed(&mut self, raw: &str) -> Result<(), String> {
        self.values.push_parsed(raw)?;
        self.validity.push(true);
        Ok(())
    }

    pub(crate) fn clear(&mut self) {
        self.values.clear();
        self.validity.clear();
    }
}

/// A fixed-capacity group of rows materialized together during streaming read.
///
/// A batch borrowed from [`crate::reader::BatchReader::next_batch`] is only
/// valid until the next read call; consumers that need it longer must take an
/// explicit copy with [`Clone`].
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    columns: Vec<Column>,
    rows: usize,
}

impl Batch {
    pub(crate) fn new_for_schema(schema: &Schema, capacity: usize) -> Self {
        let columns = schema
            .fields
            .iter()
            .map(|f| Column::new(f.data_type.clone(), capacity))
            .collect();
        Self { columns, rows: 0 }
    }

    /// Number of rows in the batch.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Number of columns in the batch.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Access a column by schema index.
    pub fn column(&self, idx: usize) -> Option<&Column> {
        self.columns.get(idx)
    }

    pub(crate) fn column_mut(&mut self, idx: usize) -> &mut Column {
        &mut self.columns[idx]
    }

    pub(crate) fn commit_row(&mut self) {
        self.rows += 1;
    }

    pub(crate) fn clear(&mut self) {
        for col in &mut self.columns {
            col.clear();
        }
        self.rows = 0;
    }
}
