//! The in-memory table under analysis.
//!
//! A [`Table`] is an ordered sequence of named columns, each an ordered
//! sequence of nullable scalar values of a single logical type. The logical
//! type is an explicit tagged union ([`ColumnData`]) decided once when the
//! table is constructed; downstream profiling branches on the tag and never
//! re-inspects values.
//!
//! Structural invariants are validated at construction: duplicate column
//! names and ragged column lengths fail with [`Error::Schema`]. Non-finite
//! floats (NaN, infinities) are normalized to null so every downstream
//! aggregate is NaN-safe by construction.

use std::{
    collections::HashSet,
    io::{Read, Seek, SeekFrom},
    path::Path,
    sync::Arc,
};

use arrow::{
    array::{
        Array, ArrayRef, BooleanArray, Date64Array, Float64Array, LargeStringArray, RecordBatch,
        StringArray, TimestampMillisecondArray,
    },
    compute::cast,
    datatypes::{DataType, Schema, SchemaRef, TimeUnit},
    util::display::array_value_to_string,
};
use arrow_csv::{reader::Format, ReaderBuilder};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::{Error, Result};

/// The values of one column, tagged by logical type.
///
/// Datetime values are epoch milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Floating point values (all integer and float storage widens to f64).
    Numeric(Vec<Option<f64>>),
    /// Boolean values.
    Boolean(Vec<Option<bool>>),
    /// UTF-8 text values.
    Text(Vec<Option<String>>),
    /// Datetime values as epoch milliseconds.
    Datetime(Vec<Option<i64>>),
}

impl ColumnData {
    /// Returns the number of entries, including nulls.
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Boolean(v) => v.len(),
            Self::Text(v) => v.len(),
            Self::Datetime(v) => v.len(),
        }
    }

    /// Returns true if the column has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn for_data_type(data_type: &DataType) -> Self {
        match data_type {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float16
            | DataType::Float32
            | DataType::Float64 => Self::Numeric(Vec::new()),
            DataType::Boolean => Self::Boolean(Vec::new()),
            DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
                Self::Datetime(Vec::new())
            }
            _ => Self::Text(Vec::new()),
        }
    }
}

/// A single named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    /// Creates a column from a name and tagged data.
    ///
    /// Non-finite numeric values are normalized to null.
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        let data = match data {
            ColumnData::Numeric(values) => ColumnData::Numeric(
                values
                    .into_iter()
                    .map(|v| v.filter(|x| x.is_finite()))
                    .collect(),
            ),
            other => other,
        };
        Self {
            name: name.into(),
            data,
        }
    }

    /// Creates a numeric column.
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self::new(name, ColumnData::Numeric(values))
    }

    /// Creates a boolean column.
    pub fn boolean(name: impl Into<String>, values: Vec<Option<bool>>) -> Self {
        Self::new(name, ColumnData::Boolean(values))
    }

    /// Creates a text column.
    pub fn text(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self::new(name, ColumnData::Text(values))
    }

    /// Creates a datetime column from epoch milliseconds.
    pub fn datetime(name: impl Into<String>, values: Vec<Option<i64>>) -> Self {
        Self::new(name, ColumnData::Datetime(values))
    }

    /// Returns the column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tagged column values.
    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    /// Returns the number of entries, including nulls.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the column has no entries.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns true iff the column's storage type is numeric.
    ///
    /// Classification is by the tag only; numeric-looking text is never
    /// promoted.
    pub fn is_numeric(&self) -> bool {
        matches!(self.data, ColumnData::Numeric(_))
    }

    /// Returns the logical type label.
    pub fn dtype_label(&self) -> &'static str {
        match self.data {
            ColumnData::Numeric(_) => "numeric",
            ColumnData::Boolean(_) => "boolean",
            ColumnData::Text(_) => "text",
            ColumnData::Datetime(_) => "datetime",
        }
    }

    /// Returns the number of non-null entries.
    pub fn non_null_count(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v.iter().filter(|x| x.is_some()).count(),
            ColumnData::Boolean(v) => v.iter().filter(|x| x.is_some()).count(),
            ColumnData::Text(v) => v.iter().filter(|x| x.is_some()).count(),
            ColumnData::Datetime(v) => v.iter().filter(|x| x.is_some()).count(),
        }
    }

    /// Renders the value at `index` as a canonical string, or `None` for
    /// null. Used for unique counting, example values and category tables.
    pub fn value_to_string(&self, index: usize) -> Option<String> {
        match &self.data {
            ColumnData::Numeric(v) => v.get(index).copied().flatten().map(|x| x.to_string()),
            ColumnData::Boolean(v) => v.get(index).copied().flatten().map(|x| x.to_string()),
            ColumnData::Text(v) => v.get(index).cloned().flatten(),
            ColumnData::Datetime(v) => v.get(index).copied().flatten().map(|x| x.to_string()),
        }
    }
}

/// Options for CSV parsing.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter; `None` uses the default comma.
    pub delimiter: Option<u8>,
    /// Whether the first row is a header.
    pub has_header: bool,
    /// Rows per record batch while reading.
    pub batch_size: usize,
    /// Explicit schema; `None` infers from the first 1000 records.
    pub schema: Option<Schema>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            batch_size: 1024,
            schema: None,
        }
    }
}

impl CsvOptions {
    /// Sets the field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Sets whether the first row is a header.
    #[must_use]
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Sets an explicit schema, skipping inference.
    #[must_use]
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Sets the batch size used while reading.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

/// An immutable in-memory table: ordered named columns of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Creates a table from columns, validating the structural invariants.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if two columns share a name or the columns
    /// have unequal lengths.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(Error::schema(format!(
                    "duplicate column name '{}'",
                    column.name()
                )));
            }
        }

        let n_rows = columns.first().map(|c| c.len()).unwrap_or(0);
        for column in &columns {
            if column.len() != n_rows {
                return Err(Error::schema(format!(
                    "column '{}' has {} rows, expected {}",
                    column.name(),
                    column.len(),
                    n_rows
                )));
            }
        }

        Ok(Self { columns, n_rows })
    }

    /// Creates an empty table with no columns and no rows.
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            n_rows: 0,
        }
    }

    /// Returns the number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Returns the number of columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Returns the columns in table order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Loads a table from a CSV file with default options.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is not valid CSV.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_csv_with_options(path, CsvOptions::default())
    }

    /// Loads a table from a CSV file with options.
    ///
    /// Input must be UTF-8; other encodings surface as a load error before
    /// any profiling occurs.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    pub fn from_csv_with_options(path: impl AsRef<Path>, options: CsvOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| Error::io(e, path))?;
        let reader = std::io::BufReader::new(file);
        let (schema, batches) = read_csv(reader, &options)?;
        Self::from_batches(&schema, &batches)
    }

    /// Parses a table from an in-memory CSV buffer.
    ///
    /// Used by the HTTP adapter for uploaded files.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is not valid UTF-8 CSV.
    pub fn from_csv_bytes(bytes: &[u8], options: CsvOptions) -> Result<Self> {
        let cursor = std::io::Cursor::new(bytes);
        let (schema, batches) = read_csv(cursor, &options)?;
        Self::from_batches(&schema, &batches)
    }

    /// Loads a table from a Parquet file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is not valid
    /// Parquet.
    pub fn from_parquet(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| Error::io(e, path))?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(Error::Parquet)?;
        let schema = builder.schema().clone();
        let reader = builder.build().map_err(Error::Parquet)?;

        let batches: Vec<RecordBatch> = reader
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::Arrow)?;

        Self::from_batches(&schema, &batches)
    }

    /// Converts Arrow record batches into a table.
    ///
    /// An empty batch vector yields the empty table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the batches have mismatched schemas.
    pub fn from_record_batches(batches: Vec<RecordBatch>) -> Result<Self> {
        match batches.first() {
            Some(first) => {
                let schema = first.schema();
                Self::from_batches(&schema, &batches)
            }
            None => Ok(Self::empty()),
        }
    }

    fn from_batches(schema: &SchemaRef, batches: &[RecordBatch]) -> Result<Self> {
        for (i, batch) in batches.iter().enumerate() {
            if batch.schema().as_ref() != schema.as_ref() {
                return Err(Error::schema(format!(
                    "record batch {i} has a different schema than batch 0"
                )));
            }
        }

        let mut columns = Vec::with_capacity(schema.fields().len());
        for (idx, field) in schema.fields().iter().enumerate() {
            let mut data = ColumnData::for_data_type(field.data_type());
            for batch in batches {
                append_array(&mut data, batch.column(idx))?;
            }
            columns.push(Column::new(field.name().clone(), data));
        }
        Self::new(columns)
    }
}

fn read_csv<R: Read + Seek>(
    mut reader: R,
    options: &CsvOptions,
) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let schema: SchemaRef = if let Some(schema) = &options.schema {
        Arc::new(schema.clone())
    } else {
        let mut format = Format::default().with_header(options.has_header);
        if let Some(delimiter) = options.delimiter {
            format = format.with_delimiter(delimiter);
        }
        let (inferred, _) = format
            .infer_schema(&mut reader, Some(1000))
            .map_err(Error::Arrow)?;

        reader
            .seek(SeekFrom::Start(0))
            .map_err(Error::io_no_path)?;

        Arc::new(inferred)
    };

    let mut builder = ReaderBuilder::new(schema.clone())
        .with_batch_size(options.batch_size)
        .with_header(options.has_header);
    if let Some(delimiter) = options.delimiter {
        builder = builder.with_delimiter(delimiter);
    }

    let csv_reader = builder.build(reader).map_err(Error::Arrow)?;
    let batches: Vec<RecordBatch> = csv_reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::Arrow)?;

    Ok((schema, batches))
}

fn append_array(data: &mut ColumnData, array: &ArrayRef) -> Result<()> {
    match data {
        ColumnData::Numeric(values) => {
            let casted = cast(array, &DataType::Float64)?;
            let floats = casted
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| Error::schema("expected Float64 array after cast"))?;
            for i in 0..floats.len() {
                if floats.is_null(i) {
                    values.push(None);
                } else {
                    let v = floats.value(i);
                    values.push(v.is_finite().then_some(v));
                }
            }
        }
        ColumnData::Boolean(values) => {
            let bools = array
                .as_any()
                .downcast_ref::<BooleanArray>()
                .ok_or_else(|| Error::schema("expected Boolean array"))?;
            for i in 0..bools.len() {
                values.push((!bools.is_null(i)).then(|| bools.value(i)));
            }
        }
        ColumnData::Datetime(values) => {
            let casted = match array.data_type() {
                DataType::Date32 | DataType::Date64 => cast(array, &DataType::Date64)?,
                _ => cast(array, &DataType::Timestamp(TimeUnit::Millisecond, None))?,
            };
            if let Some(dates) = casted.as_any().downcast_ref::<Date64Array>() {
                for i in 0..dates.len() {
                    values.push((!dates.is_null(i)).then(|| dates.value(i)));
                }
            } else if let Some(ts) = casted.as_any().downcast_ref::<TimestampMillisecondArray>() {
                for i in 0..ts.len() {
                    values.push((!ts.is_null(i)).then(|| ts.value(i)));
                }
            } else {
                return Err(Error::schema("expected datetime array after cast"));
            }
        }
        ColumnData::Text(values) => {
            if let Some(strings) = array.as_any().downcast_ref::<StringArray>() {
                for i in 0..strings.len() {
                    values.push((!strings.is_null(i)).then(|| strings.value(i).to_string()));
                }
            } else if let Some(strings) = array.as_any().downcast_ref::<LargeStringArray>() {
                for i in 0..strings.len() {
                    values.push((!strings.is_null(i)).then(|| strings.value(i).to_string()));
                }
            } else {
                // Fallback for unclassified storage types: render through
                // Arrow's display formatting.
                for i in 0..array.len() {
                    if array.is_null(i) {
                        values.push(None);
                    } else {
                        values.push(Some(array_value_to_string(array, i).map_err(Error::Arrow)?));
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use arrow::{
        array::{Float64Array, Int32Array, StringArray},
        datatypes::Field,
    };

    use super::*;

    fn sample_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("age", DataType::Float64, true),
            Field::new("count", DataType::Int32, true),
            Field::new("city", DataType::Utf8, true),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Float64Array::from(vec![
                    Some(10.0),
                    Some(20.0),
                    None,
                    Some(f64::NAN),
                ])),
                Arc::new(Int32Array::from(vec![Some(1), Some(2), Some(3), None])),
                Arc::new(StringArray::from(vec![
                    Some("A"),
                    Some("B"),
                    None,
                    Some("A"),
                ])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_duplicate_column_names_rejected() {
        let result = Table::new(vec![
            Column::numeric("id", vec![Some(1.0)]),
            Column::numeric("id", vec![Some(2.0)]),
        ]);
        assert!(matches!(result, Err(Error::Schema { .. })));
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let result = Table::new(vec![
            Column::numeric("a", vec![Some(1.0), Some(2.0)]),
            Column::numeric("b", vec![Some(1.0)]),
        ]);
        assert!(matches!(result, Err(Error::Schema { .. })));
    }

    #[test]
    fn test_empty_table() {
        let table = Table::empty();
        assert_eq!(table.n_rows(), 0);
        assert_eq!(table.n_cols(), 0);
        assert!(table.is_empty());
    }

    #[test]
    fn test_zero_row_columns() {
        let table = Table::new(vec![
            Column::numeric("a", vec![]),
            Column::text("b", vec![]),
        ])
        .unwrap();
        assert_eq!(table.n_rows(), 0);
        assert_eq!(table.n_cols(), 2);
    }

    #[test]
    fn test_nan_normalized_to_null() {
        let column = Column::numeric(
            "x",
            vec![Some(1.0), Some(f64::NAN), Some(f64::INFINITY), None],
        );
        assert_eq!(column.non_null_count(), 1);
    }

    #[test]
    fn test_from_record_batches_classification() {
        let table = Table::from_record_batches(vec![sample_batch()]).unwrap();
        assert_eq!(table.n_rows(), 4);
        assert_eq!(table.n_cols(), 3);

        let age = table.column("age").unwrap();
        assert!(age.is_numeric());
        // NaN from the source array becomes null.
        assert_eq!(age.non_null_count(), 2);

        let count = table.column("count").unwrap();
        assert!(count.is_numeric());
        assert_eq!(count.dtype_label(), "numeric");

        let city = table.column("city").unwrap();
        assert!(!city.is_numeric());
        assert_eq!(city.dtype_label(), "text");
        assert_eq!(city.value_to_string(0).as_deref(), Some("A"));
        assert_eq!(city.value_to_string(2), None);
    }

    #[test]
    fn test_from_record_batches_empty() {
        let table = Table::from_record_batches(vec![]).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.n_cols(), 0);
    }

    #[test]
    fn test_from_csv_bytes() {
        let csv = b"age,city\n10,A\n20,B\n,A\n";
        let table = Table::from_csv_bytes(csv, CsvOptions::default()).unwrap();
        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.n_cols(), 2);
        assert!(table.column("age").unwrap().is_numeric());
        assert_eq!(table.column("age").unwrap().non_null_count(), 2);
        assert!(!table.column("city").unwrap().is_numeric());
    }

    #[test]
    fn test_from_csv_bytes_with_delimiter() {
        let csv = b"age;city\n10;A\n20;B\n";
        let options = CsvOptions::default().with_delimiter(b';');
        let table = Table::from_csv_bytes(csv, options).unwrap();
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.n_cols(), 2);
    }

    #[test]
    fn test_csv_roundtrip_via_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "id,name\n1,alpha\n2,beta\n").unwrap();

        let table = Table::from_csv(&path).unwrap();
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.column("name").unwrap().dtype_label(), "text");
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let result = Table::from_csv("/nonexistent/definitely_missing.csv");
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
