//! Table types for tablimpa.
//!
//! Provides the [`Table`] wrapper around an Arrow `RecordBatch`, the
//! [`TabularInput`] classification of loose loader output, and the
//! [`ColumnKind`] tag that downstream logic dispatches on.

use std::{path::Path, sync::Arc};

use arrow::{
    array::{Array, ArrayRef, RecordBatch},
    datatypes::{DataType, Field, Schema, SchemaRef},
};

use crate::error::{Error, Result};

/// The inferred kind of a column, derived once from its Arrow data type.
///
/// Imputation and encoding dispatch on this tag rather than re-inspecting
/// the data type at each use site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Integer or floating-point column.
    Numeric,
    /// Anything else (strings, booleans, dates, ...).
    Categorical,
}

impl ColumnKind {
    /// Classifies an Arrow data type.
    pub fn of(dtype: &DataType) -> Self {
        match dtype {
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
            | DataType::Float64 => Self::Numeric,
            _ => Self::Categorical,
        }
    }

    /// Returns true for numeric columns.
    pub fn is_numeric(self) -> bool {
        self == Self::Numeric
    }
}

/// A two-dimensional labeled table backed by an Arrow `RecordBatch`.
///
/// Column names are unique strings and all columns share the same row
/// count, both guaranteed by the underlying batch.
///
/// # Example
///
/// ```
/// use tablimpa::Table;
///
/// let table = Table::from_csv_str("x,y\n1,p\n2,q\n").unwrap();
/// assert_eq!(table.num_rows(), 2);
/// assert_eq!(table.num_columns(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Table {
    batch: RecordBatch,
}

impl Table {
    /// Wraps an existing `RecordBatch`.
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    /// Loads a table from a CSV file, inferring the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, is not valid CSV,
    /// or contains no rows.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        use std::io::{BufReader, Seek, SeekFrom};

        use arrow_csv::{reader::Format, ReaderBuilder};

        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| Error::io(e, path))?;
        let mut buf_reader = BufReader::new(file);

        let format = Format::default().with_header(true);
        let (inferred, _) = format
            .infer_schema(&mut buf_reader, Some(1000))
            .map_err(Error::Arrow)?;
        buf_reader
            .seek(SeekFrom::Start(0))
            .map_err(|e| Error::io(e, path))?;

        let reader = ReaderBuilder::new(Arc::new(inferred))
            .with_header(true)
            .build(buf_reader)
            .map_err(Error::Arrow)?;

        Self::from_batches(reader.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Loads a table from a CSV string, inferring the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid CSV or has no rows.
    pub fn from_csv_str(data: &str) -> Result<Self> {
        use std::io::Cursor;

        use arrow_csv::{reader::Format, ReaderBuilder};

        let format = Format::default().with_header(true);
        let mut cursor = Cursor::new(data.as_bytes());
        let (inferred, _) = format
            .infer_schema(&mut cursor, Some(1000))
            .map_err(Error::Arrow)?;

        let reader = ReaderBuilder::new(Arc::new(inferred))
            .with_header(true)
            .build(Cursor::new(data.as_bytes()))
            .map_err(Error::Arrow)?;

        Self::from_batches(reader.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn from_batches(batches: Vec<RecordBatch>) -> Result<Self> {
        if batches.is_empty() {
            return Err(Error::EmptyTable);
        }
        if batches.len() == 1 {
            let mut batches = batches;
            return Ok(Self::new(batches.remove(0)));
        }
        let schema = batches[0].schema();
        let batch =
            arrow::compute::concat_batches(&schema, batches.iter()).map_err(Error::Arrow)?;
        Ok(Self::new(batch))
    }

    /// Returns the underlying `RecordBatch`.
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Consumes the table, returning the underlying `RecordBatch`.
    pub fn into_batch(self) -> RecordBatch {
        self.batch
    }

    /// Returns the schema.
    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    /// Returns the number of rows.
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Returns the number of columns.
    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    /// Returns the column names in schema order.
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Returns a column by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnNotFound`] if no column has that name.
    pub fn column(&self, name: &str) -> Result<&ArrayRef> {
        self.batch
            .column_by_name(name)
            .ok_or_else(|| Error::column_not_found(name))
    }

    /// Returns the kind of each column, in schema order.
    pub fn column_kinds(&self) -> Vec<(String, ColumnKind)> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| (f.name().clone(), ColumnKind::of(f.data_type())))
            .collect()
    }

    /// Returns true iff every column is numeric.
    pub fn is_fully_numeric(&self) -> bool {
        let numeric = self
            .batch
            .schema()
            .fields()
            .iter()
            .filter(|f| ColumnKind::of(f.data_type()).is_numeric())
            .count();
        numeric == self.batch.num_columns()
    }

    /// Returns a new table restricted to the named columns, in the given
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnNotFound`] if any name is absent.
    pub fn select(&self, names: &[String]) -> Result<Self> {
        let schema = self.batch.schema();
        let mut fields = Vec::with_capacity(names.len());
        let mut arrays = Vec::with_capacity(names.len());
        for name in names {
            let (idx, field) = schema
                .column_with_name(name)
                .ok_or_else(|| Error::column_not_found(name))?;
            fields.push(field.clone());
            arrays.push(Arc::clone(self.batch.column(idx)));
        }
        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
        Ok(Self::new(batch))
    }

    /// Returns a new table with `array` appended after all existing
    /// columns, under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the array length does not match the row count.
    pub fn with_column(&self, name: &str, array: ArrayRef) -> Result<Self> {
        let schema = self.batch.schema();
        let mut fields: Vec<Field> = schema
            .fields()
            .iter()
            .map(|f| f.as_ref().clone())
            .collect();
        fields.push(Field::new(
            name,
            array.data_type().clone(),
            array.null_count() > 0,
        ));

        let mut arrays: Vec<ArrayRef> = self.batch.columns().to_vec();
        arrays.push(array);

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
        Ok(Self::new(batch))
    }

    /// Imputes missing values in place, replacing this table's columns.
    ///
    /// This is the mutating counterpart of [`crate::Imputer::apply`],
    /// which returns a new table and leaves its input untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is empty or a column's type cannot
    /// be filled.
    pub fn impute_in_place(&mut self, imputer: &crate::impute::Imputer) -> Result<()> {
        self.batch = imputer.apply(self)?.into_batch();
        Ok(())
    }
}

impl From<RecordBatch> for Table {
    fn from(batch: RecordBatch) -> Self {
        Self::new(batch)
    }
}

/// Loose input as a loader might hand it over, before shape validation.
///
/// This replaces dynamic type inspection with an explicit tag: callers
/// classify their value once and the validator dispatches on the variant.
#[derive(Debug, Clone)]
pub enum TabularInput {
    /// A two-dimensional labeled table.
    Table(Table),
    /// A single labeled column.
    Series {
        /// The column label.
        name: String,
        /// The column values.
        values: ArrayRef,
    },
    /// A bare number.
    Scalar(f64),
}

impl TabularInput {
    /// Validates the shape of the input, returning the table on success.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SingleColumn`] for a series and
    /// [`Error::UnsupportedInput`] for anything else non-tabular.
    pub fn as_table(&self) -> Result<&Table> {
        match self {
            Self::Table(table) => Ok(table),
            Self::Series { .. } => Err(Error::SingleColumn),
            Self::Scalar(_) => Err(Error::UnsupportedInput),
        }
    }

    /// Consuming variant of [`TabularInput::as_table`].
    ///
    /// # Errors
    ///
    /// Same as [`TabularInput::as_table`].
    pub fn into_table(self) -> Result<Table> {
        match self {
            Self::Table(table) => Ok(table),
            Self::Series { .. } => Err(Error::SingleColumn),
            Self::Scalar(_) => Err(Error::UnsupportedInput),
        }
    }
}

impl From<Table> for TabularInput {
    fn from(table: Table) -> Self {
        Self::Table(table)
    }
}

/// Validates the input shape, then reports whether every column of the
/// table is numeric.
///
/// # Errors
///
/// Propagates the shape validation errors of [`TabularInput::as_table`].
pub fn is_fully_numeric(input: &TabularInput) -> Result<bool> {
    Ok(input.as_table()?.is_fully_numeric())
}
